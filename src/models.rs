// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Document Models
//!
//! Documents stored in the `key` collection. Field names follow the wallet
//! document schema (camelCase, `_id`).
//!
//! A [`WalletKey`] is *unclaimed* while `userId` is unset. The key cache never
//! sets the owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::CreatedKey;

/// Token known to live on a wallet's network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Decimal places of the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    pub name: String,
    pub contract: String,
    pub symbol: String,
    pub network: String,
}

/// A ledger-verified wallet key held in the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletKey {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Owning user; `None` while the key sits in the pool.
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    /// Ledger stream of the key.
    #[serde(rename = "nId")]
    pub n_id: String,
    pub symbol: String,
    pub address: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub hashes: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl WalletKey {
    /// Pool record for a key the trust service created and verified.
    pub fn unclaimed(symbol: &str, created: CreatedKey, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            n_id: created.key.n_id,
            symbol: symbol.to_ascii_lowercase(),
            address: created.key.address,
            chain_id: created.chain_id,
            hashes: created.hashes,
            tokens: created.tokens,
            created: now,
            updated: now,
        }
    }

    pub fn is_unclaimed(&self) -> bool {
        self.user_id.is_none()
    }
}
