//! PBKDF2 key derivation for the master password.
//!
//! This module provides:
//! - [`generate_salt`] — 16 cryptographically random bytes, drawn once per vault
//! - [`derive_key`] — derive the 256-bit session key from a password + salt
//!
//! The derived key is a deterministic function of (password, salt) alone:
//! the same password against the same salt always recreates the same key,
//! which is what lets a correct login decrypt entries written in any
//! earlier session. The iteration count is fixed — it is part of the
//! stored-data contract, not a tunable.

use core::num::NonZeroU32;

use rand::rngs::OsRng;
use rand::RngCore;
use ring::pbkdf2;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBytes;

/// Output length of the KDF in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Salt length in bytes. Generated once at vault creation, never rotated.
pub const SALT_LEN: usize = 16;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Minimum salt length accepted by [`derive_key`].
const MIN_SALT_LEN: usize = 16;

const ITERATIONS: NonZeroU32 = match NonZeroU32::new(PBKDF2_ITERATIONS) {
    Some(n) => n,
    None => panic!("PBKDF2 iteration count must be non-zero"),
};

/// Generate a fresh random salt.
///
/// This is the only source of salts in the system; a vault's salt is
/// generated at registration and lives for the lifetime of the vault.
#[must_use]
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a password and salt using PBKDF2-HMAC-SHA256.
///
/// Returns a [`SecretBytes<32>`] suitable as an AES-256-GCM key. The
/// intermediate buffer is zeroized after the key is constructed.
///
/// # Password Validation
///
/// Any password length is accepted, including empty. Password strength
/// policy (minimum length, confirmation match) is enforced by the caller
/// before reaching this function.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt is shorter than 16 bytes.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<SecretBytes<KEY_LEN>, CryptoError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt too short: {} bytes (minimum {MIN_SALT_LEN})",
            salt.len()
        )));
    }

    let mut output = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONS,
        salt,
        password,
        &mut output,
    );

    let key = SecretBytes::new(output);
    output.zeroize();
    Ok(key)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
