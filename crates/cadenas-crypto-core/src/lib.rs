//! `cadenas-crypto-core` — Pure cryptographic primitives for CADENAS.
//!
//! This crate is the audit target: zero storage, zero async, zero UI
//! dependencies. It covers the three primitives the vault is built on —
//! password-based key derivation, password verification hashing, and
//! authenticated symmetric encryption — plus the secret-holding memory
//! types they hand out.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod auth_hash;
pub mod error;
pub mod kdf;
pub mod memory;
pub mod symmetric;

pub use auth_hash::{hash_password, verify_password, DIGEST_LEN};
pub use error::CryptoError;
pub use kdf::{derive_key, generate_salt, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
pub use memory::{SecretBuffer, SecretBytes};
pub use symmetric::{decrypt, encrypt, SealedSecret, IV_LEN, TAG_LEN};
