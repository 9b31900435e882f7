//! Credential verifiers
//!
//! `Sha256Verifier` reproduces the unsalted hex digest the mock login has
//! always used. It only proves that plaintext is not stored; it is not a
//! security boundary. `BcryptVerifier` is the salted, slow replacement.

use budget_core::error::{BudgetError, Result};
use budget_core::traits::CredentialVerifier;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Unsalted SHA-256, hex encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl CredentialVerifier for Sha256Verifier {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, password: &str) -> Result<String> {
        Ok(hex::encode(Sha256::digest(password.as_bytes())))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        Ok(self.digest(password)? == digest)
    }
}

/// Salted bcrypt
#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl CredentialVerifier for BcryptVerifier {
    fn name(&self) -> &'static str {
        "bcrypt"
    }

    fn digest(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).map_err(|e| BudgetError::Credential(e.to_string()))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        bcrypt::verify(password, digest).map_err(|e| BudgetError::Credential(e.to_string()))
    }
}

/// Which verifier to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HasherKind {
    #[default]
    Sha256,
    Bcrypt { cost: u32 },
}

impl HasherKind {
    pub fn build(self) -> Arc<dyn CredentialVerifier> {
        match self {
            Self::Sha256 => Arc::new(Sha256Verifier),
            Self::Bcrypt { cost } => Arc::new(BcryptVerifier::new(cost)),
        }
    }
}
