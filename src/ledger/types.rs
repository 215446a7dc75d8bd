// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request and response bodies of the trust service endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transaction::SignedTransaction;
use crate::models::Token;

/// Body of `POST /otk`.
#[derive(Debug, Serialize)]
pub struct OnboardRequest<'a> {
    pub otpk: &'a str,
    pub ntx: &'a SignedTransaction,
}

/// Key description inside a `POST /wallet/cache` body.
#[derive(Debug, Serialize)]
pub struct CacheKeySpec<'a> {
    pub symbol: &'a str,
    #[serde(rename = "nId")]
    pub n_id: &'a str,
    /// Always set; the trust service seeds the key itself.
    pub seeded: bool,
}

/// Body of `POST /wallet/cache`.
#[derive(Debug, Serialize)]
pub struct CacheKeyRequest<'a> {
    pub key: CacheKeySpec<'a>,
    pub ntx: &'a SignedTransaction,
}

/// Body of `POST /wallet/cache/diffconsensus`.
#[derive(Debug, Serialize)]
pub struct DiffConsensusRequest<'a> {
    #[serde(rename = "notaTx")]
    pub nota_tx: &'a SignedTransaction,
}

/// Response of `POST /otk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OnboardReceipt {
    /// Ledger identity reference assigned to the OTK.
    #[serde(rename = "notaId", default)]
    pub nota_id: Option<String>,
}

/// Ledger stream and address of a newly created key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedKeyRef {
    #[serde(rename = "nId")]
    pub n_id: String,
    pub address: String,
}

/// Response of `POST /wallet/cache`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedKey {
    pub key: CreatedKeyRef,
    #[serde(rename = "chainId", default)]
    pub chain_id: u64,
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// Response of `POST /wallet/cache/diffconsensus`.
///
/// Only its arrival matters; the content is kept for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confirmation(pub Value);
