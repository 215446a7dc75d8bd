// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Provisioning
//!
//! Provisions one wallet key into the pool:
//!
//! 1. open create: the trust service creates an ownerless key under the
//!    OTK's ledger identity and returns its stream, address and creation
//!    hashes
//! 2. differential consensus: the OTK asserts that those hashes belong to
//!    the address, linking its identity to the new key stream
//! 3. persist: the verified key is inserted into the store with no owner
//!
//! Each step runs only after the previous one succeeded. A failure stops the
//! run; nothing is retried and nothing is stored. A key created in step 1 is
//! left orphaned on the ledger if a later step fails, and is logged with
//! enough detail to find it.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::ledger::{transaction, Endpoint, LedgerError};
use crate::models::WalletKey;
use crate::state::CacheContext;
use crate::storage::StoreError;

/// Last step a provisioning run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Requested,
    KeyCreated,
    ConsensusVerified,
    Persisted,
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisioningState::Requested => "requested",
            ProvisioningState::KeyCreated => "key created",
            ProvisioningState::ConsensusVerified => "consensus verified",
            ProvisioningState::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageFailure {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
#[error("provisioning {symbol} failed after {reached}: {source}")]
pub struct ProvisionError {
    pub symbol: String,
    /// Last step that completed before the failure.
    pub reached: ProvisioningState,
    #[source]
    pub source: StageFailure,
}

/// Create, verify and store one unclaimed key of `symbol`.
pub async fn provision_wallet(ctx: &CacheContext, symbol: &str) -> Result<WalletKey, ProvisionError> {
    let symbol = symbol.to_ascii_lowercase();
    let symbol = symbol.as_str();
    let fail = |reached: ProvisioningState, source: StageFailure| ProvisionError {
        symbol: symbol.to_string(),
        reached,
        source,
    };

    let otk = ctx.otk();
    let identity = otk
        .ledger_identity()
        .ok_or_else(|| fail(ProvisioningState::Requested, LedgerError::MissingIdentity.into()))?;

    let create_tx = transaction::build_open_create_tx(symbol, identity, otk)
        .map_err(|e| fail(ProvisioningState::Requested, e.into()))?;
    let created = ctx
        .ledger
        .submit_create(symbol, identity, &create_tx, otk.uuid)
        .await
        .map_err(|e| fail(ProvisioningState::Requested, e.into()))?;

    if created.key.n_id.is_empty() || created.key.address.is_empty() || created.hashes.is_empty() {
        return Err(fail(
            ProvisioningState::Requested,
            LedgerError::InvalidResponse {
                endpoint: Endpoint::WalletCache,
                message: "created key is missing its stream, address or hashes".to_string(),
            }
            .into(),
        ));
    }
    debug!(symbol, n_id = %created.key.n_id, address = %created.key.address, "Wallet key created");

    let orphaned = |reached: ProvisioningState, source: StageFailure| {
        warn!(
            symbol,
            n_id = %created.key.n_id,
            address = %created.key.address,
            error = %source,
            "Created wallet key was not pooled and is orphaned on the ledger"
        );
        fail(reached, source)
    };

    let consensus_tx = transaction::build_diff_consensus_tx(
        &created.key.n_id,
        &created.key.address,
        &created.hashes,
        otk,
    )
    .map_err(|e| orphaned(ProvisioningState::KeyCreated, e.into()))?;
    ctx.ledger
        .submit_diff_consensus(&consensus_tx, otk.uuid)
        .await
        .map_err(|e| orphaned(ProvisioningState::KeyCreated, e.into()))?;

    let key = WalletKey::unclaimed(symbol, created.clone(), Utc::now());
    ctx.keys
        .insert(&key)
        .map_err(|e| orphaned(ProvisioningState::ConsensusVerified, e.into()))?;

    info!(symbol, n_id = %key.n_id, address = %key.address, "Wallet key pooled");
    Ok(key)
}
