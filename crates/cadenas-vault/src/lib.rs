//! `cadenas-vault` — Vault business logic for CADENAS.
//!
//! Orchestrates the crypto primitives and the durable key-value store
//! into the master-password vault: registration, login with brute-force
//! lockout, and the encrypted entry lifecycle. The UI layer is the only
//! intended consumer and talks to this crate exclusively through
//! call/return contracts.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod auth;
pub mod entries;
pub mod error;
pub mod session;
pub mod store;

pub use auth::{
    login, lockout_status, register, LockoutStatus, SessionKey, LOCKOUT_DURATION_MS, MAX_ATTEMPTS,
};
pub use entries::{add_entry, delete_entry, list_entries, reveal_entry, AddEntryParams, EntryListItem};
pub use error::VaultError;
pub use session::VaultSession;
pub use store::{AttemptLog, PasswordEntry, SecurityState, VaultMetadata, VaultStore};
