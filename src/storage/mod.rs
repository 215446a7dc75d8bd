// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key Store
//!
//! Document store holding the wallet key pool. The key cache only ever
//! counts, finds and inserts unclaimed keys; claiming happens outside it.
//!
//! ## Implementations
//!
//! - [`KeyDatabase`]: embedded redb database with `user` and `key` tables.
//!   The file is locked to a single process, so a deployment where other
//!   services claim keys needs a shared backend behind [`KeyStore`].
//!
//! Implementations accept concurrent inserts from several tasks.

pub mod key_database;
#[cfg(test)]
pub mod memory;

pub use key_database::KeyDatabase;
#[cfg(test)]
pub use memory::InMemoryKeyStore;

use crate::models::WalletKey;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the `key` collection.
pub trait KeyStore: Send + Sync {
    /// Number of keys of `symbol` with no owner.
    fn count_unclaimed(&self, symbol: &str) -> StoreResult<u64>;

    /// Keys of `symbol` with no owner, oldest first.
    fn find_unclaimed(&self, symbol: &str) -> StoreResult<Vec<WalletKey>>;

    /// Store a newly provisioned key. Fails if its id is already present.
    fn insert(&self, key: &WalletKey) -> StoreResult<()>;
}
