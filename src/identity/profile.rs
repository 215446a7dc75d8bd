// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile file holding the persisted OTK.
//!
//! ## Layout
//!
//! ```text
//! { "otk": { "name", "type", "uuid", "identity", "key": { "pub", "prv" } } }
//! ```
//!
//! The file holds a private key. It is written with owner-only permissions on
//! unix, and always via a temp file + rename so a crash mid-write never leaves
//! a truncated profile behind.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{IdentityError, Otk};

#[derive(Serialize, Deserialize)]
struct Profile {
    otk: Otk,
}

/// Location of the OTK profile on disk.
#[derive(Debug, Clone)]
pub struct ProfileFile {
    path: PathBuf,
}

impl ProfileFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the stored OTK.
    pub fn load(&self) -> Result<Otk, IdentityError> {
        let file = File::open(&self.path)?;
        let profile: Profile = serde_json::from_reader(BufReader::new(file))?;
        Ok(profile.otk)
    }

    /// Persist `otk`, replacing any previous profile atomically.
    pub fn save(&self, otk: &Otk) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        {
            let file = owner_only_options().open(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &Profile { otk: otk.clone() })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}
