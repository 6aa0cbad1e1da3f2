//! Vault error types for `cadenas-vault`.

use cadenas_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    /// Decryption failures on reveal arrive here as
    /// [`CryptoError::Decryption`] — tampering or wrong key, not user error.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Login failed. The message is deliberately generic: past the service
    /// boundary, "wrong password" is indistinguishable from any other
    /// authentication failure.
    #[error("invalid password")]
    InvalidPassword,

    /// Too many failed attempts — all logins are blocked until the
    /// persisted lockout expires.
    #[error("account locked: {remaining_secs}s remaining")]
    LockedOut {
        /// Whole seconds remaining in the lockout window (rounded up).
        remaining_secs: u64,
    },

    /// Vault metadata missing or inconsistent where a vault should exist.
    /// Not recoverable without a reset.
    #[error("vault corrupted: {0}")]
    Corruption(String),

    /// Storage I/O failure or a persisted record that no longer parses.
    #[error("storage error: {0}")]
    Storage(String),

    /// Entry not found by ID.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Registration attempted while a vault already exists.
    #[error("vault already exists")]
    VaultAlreadyExists,
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
