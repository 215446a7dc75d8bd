// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! secp256k1 key handling for the OTK.
//!
//! Keys are kept in PEM form (PKCS#8 private, SPKI public) so the profile
//! file stays readable by the trust service's own tooling. Signatures are
//! ECDSA over SHA-256, DER encoded, then base64.

use base64ct::{Base64, Encoding};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::rand_core::OsRng;
use k256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{KeyMaterial, KeyType, Otk, PemKey, OTK_NAME};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to encode key: {0}")]
    Encoding(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl Otk {
    /// Generate a fresh, not yet onboarded OTK.
    pub fn generate() -> Result<Self, KeyError> {
        let signing_key = SigningKey::random(&mut OsRng);

        let private_pem = signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encoding(format!("private key: {e}")))?
            .to_string();
        let public_pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encoding(format!("public key: {e}")))?;

        Ok(Self {
            name: OTK_NAME.to_string(),
            key_type: KeyType::Secp256k1,
            uuid: Uuid::new_v4(),
            identity: None,
            key: KeyMaterial {
                public: pem_key(public_pem),
                private: pem_key(private_pem),
            },
        })
    }

    fn signing_key(&self) -> Result<SigningKey, KeyError> {
        SigningKey::from_pkcs8_pem(&self.key.private.pkcs8pem)
            .map_err(|e| KeyError::InvalidKey(format!("private key: {e}")))
    }

    /// Sign `message`, returning the base64 DER signature.
    pub fn sign(&self, message: &[u8]) -> Result<String, KeyError> {
        let signature: Signature = self.signing_key()?.sign(message);
        Ok(Base64::encode_string(signature.to_der().as_bytes()))
    }

    /// Check a base64 DER signature against this OTK's public key.
    pub fn verify(&self, message: &[u8], signature: &str) -> Result<(), KeyError> {
        verify_with_public_pem(self.public_key_pem(), message, signature)
    }
}

/// Check a base64 DER signature against a PEM encoded public key.
pub fn verify_with_public_pem(
    public_pem: &str,
    message: &[u8],
    signature: &str,
) -> Result<(), KeyError> {
    let verifying_key = VerifyingKey::from_public_key_pem(public_pem)
        .map_err(|e| KeyError::InvalidKey(format!("public key: {e}")))?;
    let der = Base64::decode_vec(signature)
        .map_err(|e| KeyError::InvalidSignature(format!("base64: {e}")))?;
    let signature = Signature::from_der(&der)
        .map_err(|e| KeyError::InvalidSignature(format!("DER: {e}")))?;

    verifying_key
        .verify(message, &signature)
        .map_err(|e| KeyError::InvalidSignature(e.to_string()))
}

fn pem_key(pkcs8pem: String) -> PemKey {
    let hash = format!("{:x}", Sha256::digest(pkcs8pem.as_bytes()));
    PemKey { pkcs8pem, hash }
}
