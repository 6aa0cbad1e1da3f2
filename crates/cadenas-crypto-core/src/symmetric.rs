//! AES-256-GCM authenticated encryption for stored secrets.
//!
//! This module provides:
//! - [`encrypt`] — encrypt plaintext with a fresh random IV, returning [`SealedSecret`]
//! - [`decrypt`] — decrypt and authenticate, returning a [`SecretBuffer`]
//!
//! Each call to [`encrypt`] draws a new 96-bit IV from the CSPRNG; an IV
//! is never reused under the same key. The 128-bit authentication tag is
//! appended to the ciphertext, so `SealedSecret::ciphertext` is exactly
//! the `encryptedPassword` bytes a vault entry stores.

use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBuffer;

/// AES-256-GCM IV length in bytes (96 bits).
pub const IV_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Authenticated ciphertext container.
///
/// `ciphertext` is `encrypted bytes ‖ tag (16 bytes)`; the IV travels
/// alongside it and must be presented unchanged at decryption. Any
/// modification to either field makes decryption fail.
#[must_use = "encrypted data must be stored or it is lost"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedSecret {
    /// 96-bit random IV, unique per encryption.
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Core operations
// ---------------------------------------------------------------------------

/// Encrypt plaintext using AES-256-GCM with a fresh random 96-bit IV.
///
/// # Arguments
///
/// - `plaintext` — data to encrypt (may be empty)
/// - `key` — exactly 32 bytes (256-bit AES key)
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not exactly 32 bytes
/// or the underlying encryption operation fails.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<SealedSecret, CryptoError> {
    let sealing_key = build_key(key)?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = aead::Nonce::assume_unique_for_key(iv);

    // Encrypt in place; the tag is appended to the buffer.
    let mut in_out = plaintext.to_vec();
    if sealing_key
        .seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut in_out)
        .is_err()
    {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    }

    Ok(SealedSecret {
        iv,
        ciphertext: in_out,
    })
}

/// Decrypt AES-256-GCM authenticated ciphertext.
///
/// Returns the plaintext as a [`SecretBuffer`] (zeroized on drop). The
/// intermediate decryption buffer is zeroized after copying.
///
/// # Arguments
///
/// - `ciphertext` — encrypted bytes with the tag appended
/// - `iv` — the 12-byte IV produced at encryption
/// - `key` — exactly 32 bytes (must match the encryption key)
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key or IV has the wrong length.
/// Returns `CryptoError::Decryption` if the tag does not verify (tampered
/// data, truncation, or wrong key) — no partial plaintext is exposed.
pub fn decrypt(ciphertext: &[u8], iv: &[u8], key: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let opening_key = build_key(key)?;

    let iv_arr: [u8; IV_LEN] = iv.try_into().map_err(|_| {
        CryptoError::Encryption(format!(
            "invalid IV length: {} bytes (expected {IV_LEN})",
            iv.len()
        ))
    })?;
    let nonce = aead::Nonce::assume_unique_for_key(iv_arr);

    let mut in_out = ciphertext.to_vec();
    let plaintext = opening_key
        .open_in_place(nonce, aead::Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Decryption)?;

    let result = SecretBuffer::new(plaintext);
    in_out.zeroize();
    Ok(result)
}

/// Build a `LessSafeKey` from raw key bytes, validating the length.
fn build_key(key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::Encryption(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
