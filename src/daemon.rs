// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Daemon boot and supervision.
//!
//! Boot has two phases: ensure the OTK identity exists (onboarding it on
//! first run), then hand over to the pool replenisher. Any error from either
//! phase is returned to `main`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Config, ReplenishConfig};
use crate::error::CacheError;
use crate::identity::{ensure_identity, ProfileFile};
use crate::ledger::{HttpLedgerClient, LedgerClient};
use crate::replenisher::PoolReplenisher;
use crate::state::CacheContext;
use crate::storage::{KeyDatabase, KeyStore};

/// Open the store and trust service client, boot, and replenish until
/// `shutdown` fires.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), CacheError> {
    let db_path = config.store.database_file();
    let keys = Arc::new(KeyDatabase::open(&db_path)?);
    info!(path = %db_path.display(), "Key store opened");

    let ledger = Arc::new(HttpLedgerClient::new(&config.ledger)?);
    info!(url = %config.ledger.base_url, "Trust service client ready");

    let profile = ProfileFile::new(config.profile_path);
    let replenisher = boot(&profile, ledger, keys, config.replenish).await?;
    replenisher.run(shutdown).await
}

/// Load or onboard the OTK and build the replenisher around it.
pub async fn boot(
    profile: &ProfileFile,
    ledger: Arc<dyn LedgerClient>,
    keys: Arc<dyn KeyStore>,
    config: ReplenishConfig,
) -> Result<PoolReplenisher, CacheError> {
    let otk = ensure_identity(profile, ledger.as_ref()).await?;
    let ctx = CacheContext::new(otk, ledger, keys);
    Ok(PoolReplenisher::new(ctx, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::replenisher::{CycleOutcome, ReplenishStrategy};
    use crate::storage::InMemoryKeyStore;
    use crate::symbols::SymbolSet;
    use crate::testing::{FakeLedger, LedgerCall};

    fn replenish_config() -> ReplenishConfig {
        ReplenishConfig {
            per_cycle: 1,
            interval: Duration::from_secs(30),
            strategy: ReplenishStrategy::FullTarget,
            symbols: SymbolSet::default(),
        }
    }

    #[tokio::test]
    async fn fresh_environment_onboards_then_fills_every_pool() {
        let dir = tempfile::tempdir().unwrap();
        let profile = ProfileFile::new(dir.path().join(".summit.profile"));
        let ledger = Arc::new(FakeLedger::new());
        let store = Arc::new(KeyDatabase::open(&dir.path().join("keys.redb")).unwrap());

        let replenisher = boot(&profile, ledger.clone(), store.clone(), replenish_config())
            .await
            .unwrap();
        let outcome = replenisher.replenish_all().await.unwrap();

        let calls = ledger.calls();
        let onboards = calls
            .iter()
            .filter(|c| matches!(c, LedgerCall::Onboard { .. }))
            .count();
        assert_eq!(onboards, 1);
        assert!(matches!(calls[0], LedgerCall::Onboard { .. }));

        let symbols = SymbolSet::default();
        for symbol in symbols.production() {
            assert_eq!(store.count_unclaimed(symbol).unwrap(), 2, "{symbol}");
        }
        for symbol in symbols.test() {
            assert_eq!(store.count_unclaimed(symbol).unwrap(), 1, "{symbol}");
        }
        match outcome {
            CycleOutcome::Completed(report) => assert_eq!(report.total_created(), 12),
            CycleOutcome::Skipped => panic!("cycle was skipped"),
        }
        assert!(profile.exists());
    }

    #[tokio::test]
    async fn second_boot_reuses_the_saved_identity() {
        let dir = tempfile::tempdir().unwrap();
        let profile = ProfileFile::new(dir.path().join(".summit.profile"));
        let store = Arc::new(InMemoryKeyStore::new());

        boot(&profile, Arc::new(FakeLedger::new()), store.clone(), replenish_config())
            .await
            .unwrap();
        let saved = profile.load().unwrap();

        let ledger = Arc::new(FakeLedger::with_known_key(saved.public_key_pem()));
        let replenisher = boot(&profile, ledger.clone(), store.clone(), replenish_config())
            .await
            .unwrap();
        replenisher.replenish_all().await.unwrap();

        let calls = ledger.calls();
        assert!(calls.iter().all(|c| !matches!(c, LedgerCall::Onboard { .. })));
        assert!(!calls.is_empty());
    }

    #[tokio::test]
    async fn failed_onboarding_stops_boot() {
        let dir = tempfile::tempdir().unwrap();
        let profile = ProfileFile::new(dir.path().join(".summit.profile"));

        let result = boot(
            &profile,
            Arc::new(FakeLedger::without_onboard_identity()),
            Arc::new(InMemoryKeyStore::new()),
            replenish_config(),
        )
        .await;

        assert!(matches!(result, Err(CacheError::Identity(_))));
    }
}
