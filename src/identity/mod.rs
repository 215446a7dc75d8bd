// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # OTK Identity
//!
//! The daemon authorizes every ledger operation with a single local signing
//! identity, the OTK. It is generated on first boot, onboarded with the trust
//! service (which assigns it a ledger identity reference) and persisted to the
//! profile file so later boots reuse it.
//!
//! ## Boot
//!
//! [`ensure_identity`] is the first phase of boot:
//! - profile present: load it, no network calls
//! - profile absent: generate, onboard, persist, then continue as if loaded
//!
//! An OTK without a ledger identity reference cannot sign for anything and is
//! never persisted or returned.

pub mod keys;
pub mod profile;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ledger::{transaction, LedgerClient, LedgerError};

pub use keys::KeyError;
pub use profile::ProfileFile;

/// Name under which the OTK signs its own onboarding transaction.
pub const OTK_NAME: &str = "otk";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("profile I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OTK key error: {0}")]
    Key(#[from] KeyError),

    #[error("OTK has no ledger identity reference; onboarding did not complete")]
    MissingLedgerIdentity,

    #[error("OTK onboarding failed: {0}")]
    Ledger(#[from] LedgerError),
}

/// Signature scheme of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Secp256k1,
}

/// One half of a key pair in PEM form, with its SHA-256 fingerprint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PemKey {
    pub pkcs8pem: String,
    pub hash: String,
}

/// Public/private key pair of an OTK.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    #[serde(rename = "pub")]
    pub public: PemKey,
    #[serde(rename = "prv")]
    pub private: PemKey,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public", &self.public.pkcs8pem)
            .field("public_hash", &self.public.hash)
            .field("private", &"<redacted>")
            .finish()
    }
}

/// The local signing identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Otk {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub uuid: Uuid,
    /// Ledger identity reference, assigned by onboarding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub key: KeyMaterial,
}

impl Otk {
    pub fn public_key_pem(&self) -> &str {
        &self.key.public.pkcs8pem
    }

    pub fn ledger_identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// Load the OTK from `profile`, or create and onboard a new one.
pub async fn ensure_identity(
    profile: &ProfileFile,
    ledger: &dyn LedgerClient,
) -> Result<Otk, IdentityError> {
    if profile.exists() {
        let otk = profile.load()?;
        let Some(identity) = otk.ledger_identity() else {
            return Err(IdentityError::MissingLedgerIdentity);
        };
        info!(
            uuid = %otk.uuid,
            identity = %identity,
            path = %profile.path().display(),
            "Loaded OTK profile"
        );
        return Ok(otk);
    }

    info!("Generating new OTK");
    let mut otk = Otk::generate()?;

    info!(uuid = %otk.uuid, "OTK needs onboarding");
    let onboard_tx = transaction::build_onboard_tx(&otk)?;
    let receipt = ledger
        .submit_onboard(otk.public_key_pem(), &onboard_tx, otk.uuid)
        .await?;

    let identity = receipt
        .nota_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(IdentityError::MissingLedgerIdentity)?;
    otk.identity = Some(identity);

    profile.save(&otk)?;
    info!(
        uuid = %otk.uuid,
        identity = otk.ledger_identity().unwrap_or_default(),
        path = %profile.path().display(),
        "OTK onboarded and saved"
    );

    Ok(otk)
}
