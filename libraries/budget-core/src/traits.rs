/// Core traits for the budget tracker
use crate::error::Result;

/// Credential verifier
///
/// Turns a plaintext password into a stored digest and checks a password
/// against one. Plaintext never leaves this seam.
pub trait CredentialVerifier: Send + Sync {
    /// Short name for logs and configuration ("sha256", "bcrypt")
    fn name(&self) -> &'static str;

    /// Derive the digest to store for `password`
    ///
    /// # Errors
    /// Returns an error if the hashing backend fails
    fn digest(&self, password: &str) -> Result<String>;

    /// Check `password` against a stored digest
    ///
    /// # Errors
    /// Returns an error if the digest is unreadable by this backend
    fn verify(&self, password: &str, digest: &str) -> Result<bool>;
}

/// Key-value storage for persisted slices
///
/// Implementers behave like browser local storage: one string value per
/// key, last write wins.
pub trait SliceStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if never written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
