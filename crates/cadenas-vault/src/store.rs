//! Durable key-value persistence for the vault's three records.
//!
//! The store is a single SQLite table `kv(key, value)` holding JSON under
//! three well-known keys:
//!
//! - `vault.metadata` — salt + authentication hash, written once
//! - `vault.entries`  — the ordered encrypted entry list
//! - `vault.security` — attempt counter, lockout expiry, attempt log
//!
//! Binary fields (salt, hash, IV, ciphertext) are base64 text inside the
//! JSON. Multi-record writes run in one transaction so the store never
//! holds a partially initialized or partially reset vault. Absence of a
//! record is a valid state (no vault yet / zeroed security state); a
//! record that is present but unparsable is an error, never a default.

use std::fmt;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Storage key for [`VaultMetadata`].
const KEY_METADATA: &str = "vault.metadata";

/// Storage key for the [`PasswordEntry`] list.
const KEY_ENTRIES: &str = "vault.entries";

/// Storage key for [`SecurityState`].
const KEY_SECURITY: &str = "vault.security";

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// Vault metadata — created once at registration, immutable afterward.
///
/// `auth_hash` is a one-way digest; the master password is not
/// recoverable from anything in this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    /// 16-byte KDF salt, generated once for the vault's lifetime.
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    /// SHA-256 verification digest of (password ‖ salt).
    #[serde(with = "b64")]
    pub auth_hash: Vec<u8>,
}

/// One stored secret. Never mutated in place — update is add + delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Site or service the credential belongs to.
    pub site: String,
    /// Account username (plaintext metadata).
    pub username: String,
    /// AES-256-GCM ciphertext with the 16-byte tag appended.
    #[serde(with = "b64")]
    pub encrypted_password: Vec<u8>,
    /// 12-byte IV, unique to this entry's encryption.
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    /// Creation time, milliseconds since Unix epoch.
    pub created_at: u64,
}

/// Brute-force tracking state, rewritten after every login attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityState {
    /// Consecutive failed attempts since the last success.
    pub count: u32,
    /// Lockout expiry, milliseconds since Unix epoch; 0 when not locked.
    pub lockout_until: u64,
    /// Append-only log of every attempt. Never pruned.
    pub logs: Vec<AttemptLog>,
}

/// One line of the attempt log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptLog {
    /// Attempt time, milliseconds since Unix epoch.
    pub timestamp: u64,
    /// Whether the attempt succeeded.
    pub success: bool,
}

// ---------------------------------------------------------------------------
// VaultStore
// ---------------------------------------------------------------------------

/// Handle to the open vault store.
///
/// Mutation requires `&mut self`: the design assumes a single active
/// session per process, and exclusive access makes the read-modify-write
/// record updates race-free by construction.
pub struct VaultStore {
    conn: Connection,
}

impl fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultStore")
    }
}

impl VaultStore {
    /// Open (or create) the vault store at `path`.
    ///
    /// Enables WAL journaling and creates the `kv` table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, VaultError> {
        let conn = Connection::open(path)?;
        Self::setup(conn)
    }

    /// Open an in-memory store. Test substrate — nothing survives drop.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the database cannot be opened.
    pub fn open_in_memory() -> Result<Self, VaultError> {
        let conn = Connection::open_in_memory()?;
        Self::setup(conn)
    }

    fn setup(conn: Connection) -> Result<Self, VaultError> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
        )?;
        Ok(Self { conn })
    }

    /// Whether vault metadata exists.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure.
    pub fn has_vault(&self) -> Result<bool, VaultError> {
        Ok(get_raw(&self.conn, KEY_METADATA)?.is_some())
    }

    /// Atomically create metadata, an empty entry list, and a zeroed
    /// [`SecurityState`]. One transaction — the store never ends up with
    /// metadata but no entry list.
    ///
    /// # Errors
    ///
    /// - [`VaultError::VaultAlreadyExists`] if metadata is already present
    /// - [`VaultError::Storage`] on I/O failure
    pub fn init_vault(&mut self, metadata: &VaultMetadata) -> Result<(), VaultError> {
        let metadata_json = encode_record(metadata, KEY_METADATA)?;
        let entries_json = encode_record(&Vec::<PasswordEntry>::new(), KEY_ENTRIES)?;
        let security_json = encode_record(&SecurityState::default(), KEY_SECURITY)?;

        let tx = self.conn.transaction()?;
        if get_raw(&tx, KEY_METADATA)?.is_some() {
            return Err(VaultError::VaultAlreadyExists);
        }
        put_raw(&tx, KEY_METADATA, &metadata_json)?;
        put_raw(&tx, KEY_ENTRIES, &entries_json)?;
        put_raw(&tx, KEY_SECURITY, &security_json)?;
        tx.commit()?;

        tracing::info!("vault store initialized");
        Ok(())
    }

    /// Read the vault metadata. `None` means no vault exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure or if the stored
    /// record no longer parses.
    pub fn metadata(&self) -> Result<Option<VaultMetadata>, VaultError> {
        self.read_record(KEY_METADATA)
    }

    /// Read the full entry list, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure or a corrupt record.
    pub fn entries(&self) -> Result<Vec<PasswordEntry>, VaultError> {
        Ok(self.read_record(KEY_ENTRIES)?.unwrap_or_default())
    }

    /// Append one entry to the stored list.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure or a corrupt record.
    pub fn save_entry(&mut self, entry: &PasswordEntry) -> Result<(), VaultError> {
        let tx = self.conn.transaction()?;
        let mut entries: Vec<PasswordEntry> = match get_raw(&tx, KEY_ENTRIES)? {
            Some(json) => parse_record(&json, KEY_ENTRIES)?,
            None => Vec::new(),
        };
        entries.push(entry.clone());
        let json = encode_record(&entries, KEY_ENTRIES)?;
        put_raw(&tx, KEY_ENTRIES, &json)?;
        tx.commit()?;
        Ok(())
    }

    /// Remove an entry by id. No-op if the id is absent.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure or a corrupt record.
    pub fn delete_entry(&mut self, id: &str) -> Result<(), VaultError> {
        let tx = self.conn.transaction()?;
        let mut entries: Vec<PasswordEntry> = match get_raw(&tx, KEY_ENTRIES)? {
            Some(json) => parse_record(&json, KEY_ENTRIES)?,
            None => Vec::new(),
        };
        entries.retain(|e| e.id != id);
        let json = encode_record(&entries, KEY_ENTRIES)?;
        put_raw(&tx, KEY_ENTRIES, &json)?;
        tx.commit()?;
        Ok(())
    }

    /// Read the security state. A missing record is the zeroed state.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure or a corrupt record.
    pub fn security_state(&self) -> Result<SecurityState, VaultError> {
        Ok(self.read_record(KEY_SECURITY)?.unwrap_or_default())
    }

    /// Overwrite the security state wholesale. Durable once this returns.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure.
    pub fn update_security_state(&mut self, state: &SecurityState) -> Result<(), VaultError> {
        let json = encode_record(state, KEY_SECURITY)?;
        put_raw(&self.conn, KEY_SECURITY, &json)
    }

    /// Irreversibly delete all three records in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] on I/O failure.
    pub fn reset_vault(&mut self) -> Result<(), VaultError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM kv WHERE key IN (?1, ?2, ?3)",
            params![KEY_METADATA, KEY_ENTRIES, KEY_SECURITY],
        )?;
        tx.commit()?;

        tracing::warn!("vault store reset");
        Ok(())
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, VaultError> {
        match get_raw(&self.conn, key)? {
            Some(json) => Ok(Some(parse_record(&json, key)?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn get_raw(conn: &Connection, key: &str) -> Result<Option<String>, VaultError> {
    conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
        row.get(0)
    })
    .optional()
    .map_err(VaultError::from)
}

fn put_raw(conn: &Connection, key: &str, value: &str) -> Result<(), VaultError> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn parse_record<T: DeserializeOwned>(json: &str, key: &str) -> Result<T, VaultError> {
    serde_json::from_str(json)
        .map_err(|e| VaultError::Storage(format!("corrupt record {key}: {e}")))
}

fn encode_record<T: Serialize>(value: &T, key: &str) -> Result<String, VaultError> {
    serde_json::to_string(value)
        .map_err(|e| VaultError::Storage(format!("failed to serialize record {key}: {e}")))
}

/// Base64 (de)serialization for binary record fields.
mod b64 {
    use data_encoding::BASE64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        BASE64
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::{encode_record, parse_record, PasswordEntry};

    proptest! {
        /// Arbitrary binary fields survive the base64 record codec intact.
        #[test]
        fn entry_records_reparse_exactly(
            ciphertext in proptest::collection::vec(any::<u8>(), 16..256),
            iv in proptest::collection::vec(any::<u8>(), 12..=12),
            created_at in any::<u64>(),
        ) {
            let entry = PasswordEntry {
                id: "prop-id".to_string(),
                site: "example.com".to_string(),
                username: "alice".to_string(),
                encrypted_password: ciphertext,
                iv,
                created_at,
            };
            let json = encode_record(&entry, "vault.entries").expect("encode should succeed");
            let parsed: PasswordEntry =
                parse_record(&json, "vault.entries").expect("parse should succeed");
            prop_assert_eq!(parsed, entry);
        }
    }
}
