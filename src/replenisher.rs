// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Pool Replenisher
//!
//! Background task that keeps a stock of unclaimed wallet keys for every
//! configured symbol.
//!
//! ## Strategy
//!
//! Every cycle the replenisher, one symbol at a time:
//! 1. Counts the unclaimed keys of the symbol.
//! 2. Compares the count with the symbol's target (`per_cycle`, doubled for
//!    production networks).
//! 3. When under target, provisions keys sequentially: the full target with
//!    [`ReplenishStrategy::FullTarget`], or just the shortfall with
//!    [`ReplenishStrategy::Deficit`].
//!
//! Any provisioning failure aborts the whole cycle and is returned to the
//! caller.
//!
//! ## Scheduling
//!
//! A cycle runs immediately, then again `interval` after the previous one
//! finished. Shutdown is observed between cycles through a
//! `tokio_util::sync::CancellationToken`.

use std::str::FromStr;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ReplenishConfig;
use crate::error::CacheError;
use crate::provisioning::provision_wallet;
use crate::state::CacheContext;
use crate::symbols::SymbolTarget;

/// How many keys to provision for a symbol that is under target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplenishStrategy {
    /// Provision the whole target whenever the pool is short.
    #[default]
    FullTarget,
    /// Provision only the missing keys.
    Deficit,
}

impl ReplenishStrategy {
    /// Keys to provision given the current unclaimed count.
    pub fn planned(self, current: u64, target: u64) -> u64 {
        if current >= target {
            return 0;
        }
        match self {
            ReplenishStrategy::FullTarget => target,
            ReplenishStrategy::Deficit => target - current,
        }
    }
}

impl FromStr for ReplenishStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "target" | "full" => Ok(ReplenishStrategy::FullTarget),
            "deficit" => Ok(ReplenishStrategy::Deficit),
            other => Err(format!("unknown replenish strategy `{other}` (expected target or deficit)")),
        }
    }
}

/// Outcome of one symbol within a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReport {
    pub symbol: String,
    pub before: u64,
    pub target: u64,
    pub created: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub symbols: Vec<SymbolReport>,
}

impl CycleReport {
    pub fn total_created(&self) -> u64 {
        self.symbols.iter().map(|s| s.created).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was still running.
    Skipped,
}

pub struct PoolReplenisher {
    ctx: CacheContext,
    config: ReplenishConfig,
    cycle_guard: Mutex<()>,
}

impl PoolReplenisher {
    pub fn new(ctx: CacheContext, config: ReplenishConfig) -> Self {
        Self {
            ctx,
            config,
            cycle_guard: Mutex::new(()),
        }
    }

    /// Run cycles until the cancellation token is triggered or a cycle fails.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), CacheError> {
        info!(
            interval_secs = self.config.interval.as_secs(),
            per_cycle = self.config.per_cycle,
            strategy = ?self.config.strategy,
            "Pool replenisher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Pool replenisher shutting down");
                return Ok(());
            }

            self.replenish_all().await?;

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Pool replenisher shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Run one cycle over every configured symbol.
    pub async fn replenish_all(&self) -> Result<CycleOutcome, CacheError> {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            warn!("Replenishment cycle already in progress, skipping");
            return Ok(CycleOutcome::Skipped);
        };

        let mut report = CycleReport::default();
        for target in self.config.symbols.targets(self.config.per_cycle) {
            report.symbols.push(self.replenish_symbol(&target).await?);
        }

        info!(
            symbols = report.symbols.len(),
            created = report.total_created(),
            "Replenishment cycle complete"
        );
        Ok(CycleOutcome::Completed(report))
    }

    async fn replenish_symbol(&self, target: &SymbolTarget) -> Result<SymbolReport, CacheError> {
        let symbol = target.symbol.as_str();
        let before = self.ctx.keys.count_unclaimed(symbol)?;
        let planned = self.config.strategy.planned(before, target.target);
        debug!(symbol, count = before, target = target.target, planned, "Checked key pool");

        if planned > 0 {
            info!(symbol, count = before, target = target.target, planned, "Replenishing key pool");
        }

        for n in 1..=planned {
            let key = provision_wallet(&self.ctx, symbol).await?;
            info!(
                symbol,
                n_id = %key.n_id,
                address = %key.address,
                n,
                planned,
                "Wallet key created"
            );
        }

        Ok(SymbolReport {
            symbol: target.symbol.clone(),
            before,
            target: target.target,
            created: planned,
        })
    }
}
