//! RS256 verification key material.
//!
//! The configured value is a base64-encoded SPKI PEM (`-----BEGIN PUBLIC KEY-----`).
//! Import happens on first use and the outcome (key or failure) is memoized;
//! the configured value never changes for the lifetime of the process.
//!
//! `DecodingKey::from_rsa_pem` only unwraps the PEM/ASN.1 envelope, so the
//! RSA key inside is parsed once more with the same verifier `decode` uses.
//! A key that can't verify anything is an import failure, not a bad token.
use std::sync::OnceLock;

use aws_lc_rs::signature::{ParsedPublicKey, RSA_PKCS1_2048_8192_SHA256};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use jsonwebtoken::DecodingKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("public key configuration is not set")]
    Missing,
    #[error("public key is not valid base64: {0}")]
    Base64(String),
    #[error("decoded public key is not UTF-8 PEM text")]
    NotUtf8,
    #[error("public key pem is not SPKI (expected 'BEGIN PUBLIC KEY')")]
    NotSpki,
    #[error("invalid RS256 public key pem: {0}")]
    Import(String),
}

const SPKI_LABEL: &str = "-----BEGIN PUBLIC KEY-----";

/// Key material is intentionally not printable via Debug.
pub struct KeyMaterial {
    encoded: Option<String>,
    imported: OnceLock<Result<DecodingKey, KeyError>>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("configured", &self.encoded.is_some())
            .field("imported", &self.imported.get().map(|r| r.is_ok()))
            .finish()
    }
}

impl KeyMaterial {
    pub fn new(encoded: Option<String>) -> Self {
        Self {
            encoded: encoded.filter(|s| !s.trim().is_empty()),
            imported: OnceLock::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.encoded.is_some()
    }

    pub fn decoding_key(&self) -> Result<&DecodingKey, KeyError> {
        self.imported
            .get_or_init(|| import(self.encoded.as_deref()))
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn import(encoded: Option<&str>) -> Result<DecodingKey, KeyError> {
    let encoded = encoded.ok_or(KeyError::Missing)?;

    let pem = STANDARD
        .decode(encoded.trim())
        .map_err(|e| KeyError::Base64(e.to_string()))?;
    let pem = String::from_utf8(pem).map_err(|_| KeyError::NotUtf8)?;
    if !pem.trim_start().starts_with(SPKI_LABEL) {
        return Err(KeyError::NotSpki);
    }

    let key = DecodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| KeyError::Import(e.to_string()))?;
    ParsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, key.as_bytes())
        .map_err(|e| KeyError::Import(e.to_string()))?;

    Ok(key)
}
