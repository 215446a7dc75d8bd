// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust service client.
//!
//! Every submission is a POST carrying the OTK uuid in the `x-api-uuid`
//! header. Submissions change ledger state and are not idempotent, so a
//! failure is logged and returned as-is: there is no retry here and callers
//! treat any [`LedgerError`] as fatal for the running cycle.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;
use uuid::Uuid;

use super::transaction::SignedTransaction;
use super::types::{
    CacheKeyRequest, CacheKeySpec, Confirmation, CreatedKey, DiffConsensusRequest, OnboardReceipt,
    OnboardRequest,
};
use crate::config::LedgerConfig;

/// Header correlating a request with the OTK that issued it.
pub const UUID_HEADER: &str = "x-api-uuid";

/// Trust service endpoints used by the key cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Onboard,
    WalletCache,
    DiffConsensus,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Onboard => "/otk",
            Endpoint::WalletCache => "/wallet/cache",
            Endpoint::DiffConsensus => "/wallet/cache/diffconsensus",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POST {}", self.path())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{endpoint} failed: {message}")]
    Request { endpoint: Endpoint, message: String },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    #[error("{endpoint} response was invalid: {message}")]
    InvalidResponse { endpoint: Endpoint, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("transaction signing failed: {0}")]
    Signing(String),

    #[error("OTK has no ledger identity reference")]
    MissingIdentity,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Submission side of the trust service.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Onboard an OTK, returning its ledger identity reference if assigned.
    async fn submit_onboard(
        &self,
        public_key_pem: &str,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<OnboardReceipt>;

    /// Create a new ownerless wallet key of `symbol` under `identity`.
    async fn submit_create(
        &self,
        symbol: &str,
        identity: &str,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<CreatedKey>;

    /// Run differential consensus over a freshly created key.
    async fn submit_diff_consensus(
        &self,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<Confirmation>;
}

/// [`LedgerClient`] over the trust service REST API.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    base_url: String,
    http: Client,
}

impl HttpLedgerClient {
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LedgerError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B, uuid: Uuid) -> LedgerResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let result = self.send(endpoint, body, uuid).await;
        if let Err(e) = &result {
            error!(endpoint = %endpoint, uuid = %uuid, error = %e, "Trust service call failed");
        }
        result
    }

    async fn send<B, R>(&self, endpoint: Endpoint, body: &B, uuid: Uuid) -> LedgerResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint.path()))
            .header(UUID_HEADER, uuid.to_string())
            .json(body)
            .send()
            .await
            .map_err(|e| LedgerError::Request {
                endpoint,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Status {
                endpoint,
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse {
                endpoint,
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit_onboard(
        &self,
        public_key_pem: &str,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<OnboardReceipt> {
        let body = OnboardRequest {
            otpk: public_key_pem,
            ntx: tx,
        };
        self.post_json(Endpoint::Onboard, &body, uuid).await
    }

    async fn submit_create(
        &self,
        symbol: &str,
        identity: &str,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<CreatedKey> {
        let body = CacheKeyRequest {
            key: CacheKeySpec {
                symbol,
                n_id: identity,
                seeded: true,
            },
            ntx: tx,
        };
        self.post_json(Endpoint::WalletCache, &body, uuid).await
    }

    async fn submit_diff_consensus(
        &self,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<Confirmation> {
        let body = DiffConsensusRequest { nota_tx: tx };
        self.post_json(Endpoint::DiffConsensus, &body, uuid).await
    }
}
