// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger transaction construction and signing.
//!
//! ## Wire Shape
//!
//! ```text
//! {
//!   "$tx": { "$namespace", "$contract", "$i": {...}, "$o": {...}? },
//!   "$sigs": { "<signer>": "<base64 DER signature over $tx>" },
//!   "$selfsign": bool
//! }
//! ```
//!
//! Only onboarding is self-signed; its signature is keyed by the OTK's input
//! name. Every other transaction is signed by the OTK on behalf of its ledger
//! identity reference and keyed by that reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::client::LedgerError;
use crate::identity::keys::verify_with_public_pem;
use crate::identity::{KeyType, Otk};

/// Namespace holding the key management contracts.
pub const NAMESPACE: &str = "notabox.keys";

/// Contracts invoked by the key cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    Onboard,
    OpenCreate,
    DiffConsensus,
}

impl Contract {
    pub fn id(self) -> &'static str {
        match self {
            Contract::Onboard => "df9e4e242c58cc6a03ca1679f007c7a04cad72c97fdb74bdfe9a4e1688077a79",
            Contract::OpenCreate => "a79a09ed05e377060e823e3304a349b4d7f10978fb4f500b08243cd3ef8c96f3",
            Contract::DiffConsensus => {
                "a9711259f9c0322c6eb1cca4c0baf1b460266be79c5c0f78cf1602a8476e0744"
            }
        }
    }
}

/// Reference to a ledger stream (an identity or a key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRef {
    #[serde(rename = "$stream")]
    pub stream: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardInput {
    #[serde(rename = "publicKey")]
    pub public_key: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub uuid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCreateOwner {
    #[serde(rename = "$stream")]
    pub stream: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConsensusOwner {
    #[serde(rename = "$stream")]
    pub stream: String,
    pub address: String,
    pub hashes: Vec<String>,
}

/// Transaction inputs (`$i`), one shape per contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxInputs {
    Onboard { otk: OnboardInput },
    OpenCreate { owner: OpenCreateOwner },
    DiffConsensus { owner: DiffConsensusOwner },
}

/// Transaction outputs (`$o`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutputs {
    pub key: StreamRef,
}

/// The signed part of a transaction (`$tx`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    #[serde(rename = "$namespace")]
    pub namespace: String,
    #[serde(rename = "$contract")]
    pub contract: String,
    #[serde(rename = "$i")]
    pub inputs: TxInputs,
    #[serde(rename = "$o", default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<TxOutputs>,
}

impl TxBody {
    fn new(contract: Contract, inputs: TxInputs, outputs: Option<TxOutputs>) -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            contract: contract.id().to_string(),
            inputs,
            outputs,
        }
    }

    /// Bytes covered by the signature.
    fn signing_payload(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Signing(format!("serialize $tx: {e}")))
    }
}

/// A transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(rename = "$tx")]
    pub tx: TxBody,
    #[serde(rename = "$sigs")]
    pub sigs: BTreeMap<String, String>,
    #[serde(rename = "$selfsign")]
    pub self_sign: bool,
}

impl SignedTransaction {
    /// Key of the single signature, if there is exactly one.
    pub fn signer(&self) -> Option<&str> {
        match self.sigs.len() {
            1 => self.sigs.keys().next().map(String::as_str),
            _ => None,
        }
    }

    /// Check that the transaction carries exactly one signature and that it
    /// is valid for `public_pem`.
    pub fn verify(&self, public_pem: &str) -> Result<(), LedgerError> {
        let (_, signature) = match self.sigs.len() {
            1 => self.sigs.iter().next(),
            _ => None,
        }
        .ok_or_else(|| {
            LedgerError::Signing(format!("expected one signature, found {}", self.sigs.len()))
        })?;

        verify_with_public_pem(public_pem, &self.tx.signing_payload()?, signature)
            .map_err(|e| LedgerError::Signing(e.to_string()))
    }
}

/// Self-signed onboarding of a freshly generated OTK.
pub fn build_onboard_tx(otk: &Otk) -> Result<SignedTransaction, LedgerError> {
    let body = TxBody::new(
        Contract::Onboard,
        TxInputs::Onboard {
            otk: OnboardInput {
                public_key: otk.public_key_pem().to_string(),
                key_type: otk.key_type,
                uuid: otk.uuid,
            },
        },
        None,
    );
    sign(body, otk, otk.name.clone(), true)
}

/// Request a new, ownerless wallet key of `symbol`.
pub fn build_open_create_tx(
    symbol: &str,
    identity: &str,
    otk: &Otk,
) -> Result<SignedTransaction, LedgerError> {
    let body = TxBody::new(
        Contract::OpenCreate,
        TxInputs::OpenCreate {
            owner: OpenCreateOwner {
                stream: identity.to_string(),
                symbol: symbol.to_string(),
            },
        },
        None,
    );
    sign(body, otk, identity.to_string(), false)
}

/// Assert that `hashes` are the creation hashes of `address`, linking the
/// OTK's identity to the new key stream `key_n_id`.
pub fn build_diff_consensus_tx(
    key_n_id: &str,
    address: &str,
    hashes: &[String],
    otk: &Otk,
) -> Result<SignedTransaction, LedgerError> {
    let identity = otk.ledger_identity().ok_or(LedgerError::MissingIdentity)?;
    let body = TxBody::new(
        Contract::DiffConsensus,
        TxInputs::DiffConsensus {
            owner: DiffConsensusOwner {
                stream: identity.to_string(),
                address: address.to_string(),
                hashes: hashes.to_vec(),
            },
        },
        Some(TxOutputs {
            key: StreamRef {
                stream: key_n_id.to_string(),
            },
        }),
    );
    sign(body, otk, identity.to_string(), false)
}

fn sign(
    tx: TxBody,
    otk: &Otk,
    signer: String,
    self_sign: bool,
) -> Result<SignedTransaction, LedgerError> {
    let signature = otk
        .sign(&tx.signing_payload()?)
        .map_err(|e| LedgerError::Signing(e.to_string()))?;

    Ok(SignedTransaction {
        tx,
        sigs: BTreeMap::from([(signer, signature)]),
        self_sign,
    })
}
