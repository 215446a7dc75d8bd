// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust service integration.
//!
//! This module provides:
//! - Building and signing the three ledger transactions (onboard, open
//!   create, differential consensus)
//! - The [`LedgerClient`] seam used by the provisioning protocol
//! - An HTTP implementation of that seam

pub mod client;
pub mod transaction;
pub mod types;

pub use client::{Endpoint, HttpLedgerClient, LedgerClient, LedgerError, LedgerResult};
pub use transaction::SignedTransaction;
pub use types::{Confirmation, CreatedKey, CreatedKeyRef, OnboardReceipt};
