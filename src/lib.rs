// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Key Cache - Pre-provisioned Wallet Key Pool
//!
//! This crate keeps a stock of ledger-verified, unclaimed wallet keys per
//! blockchain symbol so that user-facing services can hand out wallets
//! without waiting on key creation.
//!
//! ## Modules
//!
//! - `identity` - OTK signing identity, onboarding and the profile file
//! - `ledger` - Trust service transactions and client
//! - `provisioning` - Create, verify and store one wallet key
//! - `replenisher` - Periodic pool top-up
//! - `storage` - Key document store (redb)
//! - `daemon` - Boot sequence

pub mod config;
pub mod daemon;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod provisioning;
pub mod replenisher;
pub mod state;
pub mod storage;
pub mod symbols;

#[cfg(test)]
mod testing;
