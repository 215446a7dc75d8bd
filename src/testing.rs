// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::identity::{Otk, OTK_NAME};
use crate::ledger::transaction::TxInputs;
use crate::ledger::{
    Confirmation, CreatedKey, CreatedKeyRef, Endpoint, LedgerClient, LedgerError, LedgerResult,
    OnboardReceipt, SignedTransaction,
};
use crate::state::CacheContext;
use crate::storage::InMemoryKeyStore;

/// Submission observed by [`FakeLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Onboard { uuid: Uuid },
    Create { symbol: String, identity: String },
    DiffConsensus { n_id: String, address: String },
}

/// Submission a [`FakeLedger`] should fail with a 503.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Onboard,
    Create,
    DiffConsensus,
}

#[derive(Default)]
struct Inner {
    calls: Vec<LedgerCall>,
    fail_on: Option<FailOn>,
    assign_identity: bool,
    empty_hashes: bool,
    /// Public key learned at onboarding, used to check later signatures.
    known_key: Option<String>,
    /// Keys created so far: stream → address.
    created: HashMap<String, String>,
}

/// In-memory trust service.
///
/// Checks every transaction signature against the key it learned at
/// onboarding and refuses consensus for keys it never created.
pub struct FakeLedger {
    inner: Mutex<Inner>,
}

impl FakeLedger {
    pub const IDENTITY: &'static str = "nota-identity-1";

    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                assign_identity: true,
                ..Inner::default()
            }),
        }
    }

    /// Onboarding succeeds but assigns no ledger identity.
    pub fn without_onboard_identity() -> Self {
        let ledger = Self::new();
        ledger.lock().assign_identity = false;
        ledger
    }

    /// A ledger that already onboarded the OTK holding `public_key_pem`.
    pub fn with_known_key(public_key_pem: &str) -> Self {
        let ledger = Self::new();
        ledger.lock().known_key = Some(public_key_pem.to_string());
        ledger
    }

    pub fn fail_on(&self, call: FailOn) {
        self.lock().fail_on = Some(call);
    }

    /// Answer creates with no hashes.
    pub fn return_empty_hashes(&self) {
        self.lock().empty_hashes = true;
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn unavailable(endpoint: Endpoint) -> LedgerError {
        LedgerError::Status {
            endpoint,
            status: 503,
            body: "service unavailable".to_string(),
        }
    }

    fn rejected(endpoint: Endpoint, message: impl Into<String>) -> LedgerError {
        LedgerError::Status {
            endpoint,
            status: 400,
            body: message.into(),
        }
    }

    fn check_signed_by(
        inner: &Inner,
        endpoint: Endpoint,
        tx: &SignedTransaction,
        signer: &str,
    ) -> LedgerResult<()> {
        let key = inner
            .known_key
            .as_deref()
            .ok_or_else(|| Self::rejected(endpoint, "OTK was never onboarded"))?;
        if tx.signer() != Some(signer) || tx.self_sign {
            return Err(Self::rejected(endpoint, "unexpected signer"));
        }
        tx.verify(key)
            .map_err(|e| Self::rejected(endpoint, e.to_string()))
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn submit_onboard(
        &self,
        public_key_pem: &str,
        tx: &SignedTransaction,
        uuid: Uuid,
    ) -> LedgerResult<OnboardReceipt> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::Onboard { uuid });
        if inner.fail_on == Some(FailOn::Onboard) {
            return Err(Self::unavailable(Endpoint::Onboard));
        }
        if !tx.self_sign || tx.signer() != Some(OTK_NAME) {
            return Err(Self::rejected(Endpoint::Onboard, "onboarding must be self-signed"));
        }
        tx.verify(public_key_pem)
            .map_err(|e| Self::rejected(Endpoint::Onboard, e.to_string()))?;

        inner.known_key = Some(public_key_pem.to_string());
        Ok(OnboardReceipt {
            nota_id: inner.assign_identity.then(|| Self::IDENTITY.to_string()),
        })
    }

    async fn submit_create(
        &self,
        symbol: &str,
        identity: &str,
        tx: &SignedTransaction,
        _uuid: Uuid,
    ) -> LedgerResult<CreatedKey> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::Create {
            symbol: symbol.to_string(),
            identity: identity.to_string(),
        });
        if inner.fail_on == Some(FailOn::Create) {
            return Err(Self::unavailable(Endpoint::WalletCache));
        }
        Self::check_signed_by(&inner, Endpoint::WalletCache, tx, identity)?;

        let n = inner.created.len() + 1;
        let n_id = format!("key-{symbol}-{n}");
        let address = format!("addr-{symbol}-{n}");
        inner.created.insert(n_id.clone(), address.clone());

        let hashes = match inner.empty_hashes {
            true => Vec::new(),
            false => vec![format!("0x{n:064x}")],
        };
        Ok(CreatedKey {
            key: CreatedKeyRef { n_id, address },
            chain_id: 1,
            hashes,
            tokens: Vec::new(),
        })
    }

    async fn submit_diff_consensus(
        &self,
        tx: &SignedTransaction,
        _uuid: Uuid,
    ) -> LedgerResult<Confirmation> {
        let mut inner = self.lock();
        let n_id = tx
            .tx
            .outputs
            .as_ref()
            .map(|o| o.key.stream.clone())
            .unwrap_or_default();
        let (identity, address) = match &tx.tx.inputs {
            TxInputs::DiffConsensus { owner } => (owner.stream.clone(), owner.address.clone()),
            _ => (String::new(), String::new()),
        };
        inner.calls.push(LedgerCall::DiffConsensus {
            n_id: n_id.clone(),
            address: address.clone(),
        });
        if inner.fail_on == Some(FailOn::DiffConsensus) {
            return Err(Self::unavailable(Endpoint::DiffConsensus));
        }
        Self::check_signed_by(&inner, Endpoint::DiffConsensus, tx, &identity)?;

        if inner.created.get(&n_id) != Some(&address) {
            return Err(Self::rejected(Endpoint::DiffConsensus, "unknown key"));
        }
        Ok(Confirmation(serde_json::json!({ "verified": true })))
    }
}

/// Fresh OTK that the trust service has already onboarded.
pub fn onboarded_otk() -> Otk {
    let mut otk = Otk::generate().unwrap();
    otk.identity = Some(FakeLedger::IDENTITY.to_string());
    otk
}

/// Context over a fake ledger and an in-memory store, with an onboarded OTK.
pub fn test_context() -> (CacheContext, Arc<FakeLedger>, Arc<InMemoryKeyStore>) {
    let otk = onboarded_otk();
    let ledger = Arc::new(FakeLedger::with_known_key(otk.public_key_pem()));
    let store = Arc::new(InMemoryKeyStore::new());
    let ctx = CacheContext::new(otk, ledger.clone(), store.clone());
    (ctx, ledger, store)
}
