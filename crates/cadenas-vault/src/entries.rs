//! Entry lifecycle — the operations available once a session is unlocked.
//!
//! Each stored secret is encrypted individually with the session key and
//! a fresh IV before it reaches the store. There is no update operation:
//! changing a password is an add followed by a delete, so an entry's
//! (key, IV) pair is used exactly once for its lifetime.

use cadenas_crypto_core::memory::SecretBuffer;
use cadenas_crypto_core::symmetric;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::auth::{current_epoch_ms, SessionKey};
use crate::error::VaultError;
use crate::store::{PasswordEntry, VaultStore};

// ---------------------------------------------------------------------------
// Parameters and views
// ---------------------------------------------------------------------------

/// Parameters for creating a new entry.
pub struct AddEntryParams<'a> {
    /// Site or service the credential belongs to.
    pub site: &'a str,
    /// Account username.
    pub username: &'a str,
    /// The plaintext secret to encrypt and store.
    pub secret: &'a [u8],
}

/// Metadata-only view for list operations — no ciphertext, no decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListItem {
    /// Unique identifier.
    pub id: String,
    /// Site or service.
    pub site: String,
    /// Account username.
    pub username: String,
    /// Creation time, milliseconds since Unix epoch.
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Encrypt a secret and persist it as a new entry.
///
/// Generates the entry's UUID and timestamp; the IV comes from the
/// encryption itself and is unique to this entry.
///
/// # Errors
///
/// - [`VaultError::Crypto`] if encryption fails
/// - [`VaultError::Storage`] if persistence fails
pub fn add_entry(
    store: &mut VaultStore,
    key: &SessionKey,
    params: &AddEntryParams<'_>,
) -> Result<PasswordEntry, VaultError> {
    let sealed = symmetric::encrypt(params.secret, key.expose())?;

    let entry = PasswordEntry {
        id: generate_uuid(),
        site: params.site.to_string(),
        username: params.username.to_string(),
        encrypted_password: sealed.ciphertext,
        iv: sealed.iv.to_vec(),
        created_at: current_epoch_ms(),
    };
    store.save_entry(&entry)?;

    tracing::debug!(id = %entry.id, site = %entry.site, "entry added");
    Ok(entry)
}

/// Decrypt one entry's secret.
///
/// A missing id is [`VaultError::EntryNotFound`]; a present entry whose
/// tag fails to verify surfaces as the distinct decryption error —
/// potential tampering or corruption, not user error.
///
/// # Errors
///
/// - [`VaultError::EntryNotFound`] if no entry matches the id
/// - [`VaultError::Crypto`] ([`CryptoError::Decryption`]) on tag mismatch
/// - [`VaultError::Storage`] if the store cannot be read
///
/// [`CryptoError::Decryption`]: cadenas_crypto_core::CryptoError::Decryption
pub fn reveal_entry(
    store: &VaultStore,
    key: &SessionKey,
    id: &str,
) -> Result<SecretBuffer, VaultError> {
    let entries = store.entries()?;
    let entry = entries
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;

    Ok(symmetric::decrypt(
        &entry.encrypted_password,
        &entry.iv,
        key.expose(),
    )?)
}

/// Remove an entry from the store. No-op if the id is absent.
///
/// Callers holding decrypted plaintext for this id must invalidate it
/// (the session cache does this automatically).
///
/// # Errors
///
/// Returns [`VaultError::Storage`] if the store cannot be updated.
pub fn delete_entry(store: &mut VaultStore, id: &str) -> Result<(), VaultError> {
    store.delete_entry(id)?;
    tracing::debug!(%id, "entry deleted");
    Ok(())
}

/// List entry metadata without touching any ciphertext.
///
/// # Errors
///
/// Returns [`VaultError::Storage`] if the store cannot be read.
pub fn list_entries(store: &VaultStore) -> Result<Vec<EntryListItem>, VaultError> {
    Ok(store
        .entries()?
        .into_iter()
        .map(|e| EntryListItem {
            id: e.id,
            site: e.site,
            username: e.username,
            created_at: e.created_at,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Generate a UUIDv4-like string using `OsRng`.
///
/// Format: `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx` where x is random hex
/// and y is one of `{8, 9, a, b}`.
pub(crate) fn generate_uuid() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);

    // Set version (4) and variant (RFC 4122).
    bytes[6] = (bytes[6] & 0x0F) | 0x40; // version 4
    bytes[8] = (bytes[8] & 0x3F) | 0x80; // variant 1

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
