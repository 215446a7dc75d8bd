// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key document store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `key`: document id → serialized [`WalletKey`] (JSON bytes)
//! - `user`: user id → user document (JSON bytes)
//!
//! ## Single Process
//!
//! redb holds an exclusive lock on the database file for as long as the
//! [`KeyDatabase`] is open. No other process can open the same file while the
//! daemon runs, so services that claim keys from the pool need a different
//! [`KeyStore`] backend shared with them.
//!
//! Documents that are not key cache [`WalletKey`]s (foreign ids, missing
//! fields) are skipped with a warning rather than failing the query.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::warn;

use super::{KeyStore, StoreError, StoreResult};
use crate::models::WalletKey;

// =============================================================================
// Table Definitions
// =============================================================================

/// Key collection: document id → serialized WalletKey.
const KEYS: TableDefinition<&str, &[u8]> = TableDefinition::new("key");

/// User collection: user id → user document.
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("user");

// =============================================================================
// KeyDatabase
// =============================================================================

/// Embedded document store holding the `user` and `key` collections.
pub struct KeyDatabase {
    db: Database,
}

impl KeyDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KEYS)?;
            let _ = write_txn.open_table(USERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Visit the raw documents whose pool fields match `filter`.
    ///
    /// Only `userId` and `symbol` are decoded here; a document without them
    /// is logged and skipped.
    fn scan<F, D, T>(&self, mut filter: F, mut decode: D) -> StoreResult<Vec<T>>
    where
        F: FnMut(&PoolFields) -> bool,
        D: FnMut(&str, &[u8]) -> Option<T>,
    {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KEYS)?;

        let mut matches = Vec::new();
        for entry in table.iter()? {
            let (id, value) = entry?;
            let fields: PoolFields = match serde_json::from_slice(value.value()) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!(id = id.value(), error = %e, "Skipping undecodable key document");
                    continue;
                }
            };
            if filter(&fields) {
                if let Some(item) = decode(id.value(), value.value()) {
                    matches.push(item);
                }
            }
        }
        Ok(matches)
    }
}

/// The fields a pool query filters on.
#[derive(Deserialize)]
struct PoolFields {
    #[serde(rename = "userId", default)]
    user_id: Option<IgnoredAny>,
    symbol: String,
}

impl PoolFields {
    fn is_unclaimed_of(&self, symbol: &str) -> bool {
        self.user_id.is_none() && self.symbol.eq_ignore_ascii_case(symbol)
    }
}

impl KeyStore for KeyDatabase {
    fn count_unclaimed(&self, symbol: &str) -> StoreResult<u64> {
        let matches = self.scan(|fields| fields.is_unclaimed_of(symbol), |_, _| Some(()))?;
        Ok(matches.len() as u64)
    }

    fn find_unclaimed(&self, symbol: &str) -> StoreResult<Vec<WalletKey>> {
        let mut keys = self.scan(
            |fields| fields.is_unclaimed_of(symbol),
            |id, bytes| match serde_json::from_slice::<WalletKey>(bytes) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(id, error = %e, "Skipping malformed unclaimed key document");
                    None
                }
            },
        )?;
        keys.sort_by_key(|key| key.created);
        Ok(keys)
    }

    fn insert(&self, key: &WalletKey) -> StoreResult<()> {
        let id = key.id.to_string();
        let json = serde_json::to_vec(key)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KEYS)?;
            if table.get(id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Key {id}")));
            }
            table.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
