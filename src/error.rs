// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::ledger::LedgerError;
use crate::provisioning::ProvisionError;
use crate::storage::StoreError;

/// Any failure that stops the daemon.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("trust service error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("key store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Endpoint;

    #[test]
    fn conversions_keep_the_cause_in_the_message() {
        let err: CacheError = ConfigError::Missing("TRUST_SERVICE_URL").into();
        assert!(matches!(err, CacheError::Config(_)));
        assert!(err.to_string().contains("TRUST_SERVICE_URL"));

        let err: CacheError = LedgerError::Status {
            endpoint: Endpoint::Onboard,
            status: 502,
            body: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "trust service error: POST /otk returned 502: bad gateway"
        );

        let err: CacheError = StoreError::AlreadyExists("Key 1".to_string()).into();
        assert_eq!(err.to_string(), "key store error: already exists: Key 1");
    }
}
