// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::identity::Otk;
use crate::ledger::LedgerClient;
use crate::storage::KeyStore;

/// Everything a provisioning run needs, shared by all replenishment tasks.
#[derive(Clone)]
pub struct CacheContext {
    pub otk: Arc<Otk>,
    pub ledger: Arc<dyn LedgerClient>,
    pub keys: Arc<dyn KeyStore>,
}

impl CacheContext {
    pub fn new(otk: Otk, ledger: Arc<dyn LedgerClient>, keys: Arc<dyn KeyStore>) -> Self {
        Self {
            otk: Arc::new(otk),
            ledger,
            keys,
        }
    }

    pub fn otk(&self) -> &Otk {
        &self.otk
    }
}
