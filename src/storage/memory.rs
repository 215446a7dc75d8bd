// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local key store used by the unit tests.

use std::sync::{PoisonError, RwLock};

use super::{KeyStore, StoreError, StoreResult};
use crate::models::WalletKey;

#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<Vec<WalletKey>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every unclaimed key of `symbol` to `user_id`, as a claiming
    /// service would.
    pub fn claim_all(&self, symbol: &str, user_id: &str) {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys.iter_mut().filter(|k| k.is_unclaimed() && k.symbol == symbol) {
            key.user_id = Some(user_id.to_string());
        }
    }

    /// Copy of every stored document, in insertion order.
    pub fn snapshot(&self) -> Vec<WalletKey> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyStore for InMemoryKeyStore {
    fn count_unclaimed(&self, symbol: &str) -> StoreResult<u64> {
        Ok(self.find_unclaimed(symbol)?.len() as u64)
    }

    fn find_unclaimed(&self, symbol: &str) -> StoreResult<Vec<WalletKey>> {
        let symbol = symbol.to_ascii_lowercase();
        Ok(self
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|key| key.is_unclaimed() && key.symbol == symbol)
            .cloned()
            .collect())
    }

    fn insert(&self, key: &WalletKey) -> StoreResult<()> {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        if keys.iter().any(|existing| existing.id == key.id) {
            return Err(StoreError::AlreadyExists(format!("Key {}", key.id)));
        }
        keys.push(key.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CreatedKey, CreatedKeyRef};
    use chrono::Utc;

    fn key(symbol: &str) -> WalletKey {
        WalletKey::unclaimed(
            symbol,
            CreatedKey {
                key: CreatedKeyRef {
                    n_id: "key-1".to_string(),
                    address: "addr-1".to_string(),
                },
                chain_id: 1,
                hashes: vec!["0x01".to_string()],
                tokens: Vec::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn counts_only_unclaimed_keys_of_symbol() {
        let store = InMemoryKeyStore::new();
        store.insert(&key("eth")).unwrap();
        store.insert(&key("eth")).unwrap();
        store.insert(&key("btc")).unwrap();
        let mut claimed = key("eth");
        claimed.user_id = Some("user-1".to_string());
        store.insert(&claimed).unwrap();

        assert_eq!(store.count_unclaimed("eth").unwrap(), 2);
        assert_eq!(store.count_unclaimed("btc").unwrap(), 1);
        assert_eq!(store.snapshot().len(), 4);
    }

    #[test]
    fn claimed_keys_leave_the_pool() {
        let store = InMemoryKeyStore::new();
        store.insert(&key("eth")).unwrap();
        store.insert(&key("btc")).unwrap();

        store.claim_all("eth", "user-1");

        assert_eq!(store.count_unclaimed("eth").unwrap(), 0);
        assert_eq!(store.count_unclaimed("btc").unwrap(), 1);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = InMemoryKeyStore::new();
        let k = key("eth");
        store.insert(&k).unwrap();

        assert!(matches!(store.insert(&k), Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.snapshot().len(), 1);
    }
}
