//! In-memory session state for an unlocked vault.
//!
//! A [`VaultSession`] owns the derived session key and a reveal cache of
//! decrypted secrets keyed by entry id. Neither is ever persisted; both
//! are zeroized when the session is locked or dropped.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use cadenas_crypto_core::memory::SecretBuffer;

use crate::auth::SessionKey;
use crate::entries::{self, AddEntryParams};
use crate::error::VaultError;
use crate::store::{PasswordEntry, VaultStore};

/// Holder of the session key and decrypted-secret cache for the duration
/// of an unlocked session.
pub struct VaultSession {
    key: SessionKey,
    cache: HashMap<String, SecretBuffer>,
}

impl VaultSession {
    /// Start a session from a key returned by `register` or `login`.
    #[must_use]
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            cache: HashMap::new(),
        }
    }

    /// The session key, for callers driving the crypto primitives directly.
    #[must_use]
    pub const fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Number of decrypted secrets currently cached.
    #[must_use]
    pub fn cached_reveals(&self) -> usize {
        self.cache.len()
    }

    /// Add a new entry through this session.
    ///
    /// # Errors
    ///
    /// Propagates [`VaultError::Crypto`] and [`VaultError::Storage`] from
    /// the entry lifecycle.
    pub fn add(
        &self,
        store: &mut VaultStore,
        params: &AddEntryParams<'_>,
    ) -> Result<PasswordEntry, VaultError> {
        entries::add_entry(store, &self.key, params)
    }

    /// Reveal an entry's secret, decrypting on first access and serving
    /// repeats from the cache.
    ///
    /// # Errors
    ///
    /// - [`VaultError::EntryNotFound`] if the id is absent
    /// - [`VaultError::Crypto`] on tag-verification failure
    /// - [`VaultError::Storage`] if the store cannot be read
    pub fn reveal(&mut self, store: &VaultStore, id: &str) -> Result<&SecretBuffer, VaultError> {
        match self.cache.entry(id.to_string()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let plaintext = entries::reveal_entry(store, &self.key, id)?;
                Ok(slot.insert(plaintext))
            }
        }
    }

    /// Delete an entry and drop any cached plaintext for it.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the store cannot be updated.
    pub fn delete(&mut self, store: &mut VaultStore, id: &str) -> Result<(), VaultError> {
        entries::delete_entry(store, id)?;
        self.cache.remove(id);
        Ok(())
    }

    /// End the session: clear the reveal cache and consume the key.
    ///
    /// Both the cached plaintexts and the key zeroize as they drop.
    pub fn lock(mut self) {
        self.cache.clear();
        tracing::debug!("session locked");
    }
}

impl fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultSession(***)")
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
