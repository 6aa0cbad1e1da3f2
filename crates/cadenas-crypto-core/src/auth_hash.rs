//! Password verification digest, distinct from the encryption key.
//!
//! This module provides:
//! - [`hash_password`] — SHA-256 over `password ‖ salt`, stored at
//!   registration as the vault's `authHash`
//! - [`verify_password`] — recompute and compare in constant time
//!
//! The verification digest and the PBKDF2-derived encryption key are
//! deliberately separate functions of the same (password, salt) pair: an
//! attacker who obtains the stored digest cannot use it as a decryption
//! key, and the login check never has the encryption key in scope.

use ring::constant_time;
use ring::digest;
use zeroize::Zeroize;

/// Digest length in bytes (SHA-256 width).
pub const DIGEST_LEN: usize = 32;

/// Compute the authentication digest for a password and salt.
///
/// Deterministic: `SHA-256(password ‖ salt)`. One-way — the password is
/// not recoverable from the output.
#[must_use]
pub fn hash_password(password: &[u8], salt: &[u8]) -> [u8; DIGEST_LEN] {
    let mut input = Vec::with_capacity(password.len().saturating_add(salt.len()));
    input.extend_from_slice(password);
    input.extend_from_slice(salt);

    let computed = digest::digest(&digest::SHA256, &input);
    input.zeroize();

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(computed.as_ref());
    out
}

/// Verify a password attempt against a stored digest.
///
/// The comparison is constant-time over the digest contents, so equality
/// checking leaks no timing signal proportional to match length. A stored
/// digest of the wrong length fails immediately — length is not secret.
#[must_use]
pub fn verify_password(password: &[u8], salt: &[u8], expected: &[u8]) -> bool {
    let mut computed = hash_password(password, salt);
    let matches = constant_time::verify_slices_are_equal(&computed, expected).is_ok();
    computed.zeroize();
    matches
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SALT: &[u8; 16] = b"0123456789abcdef";

    #[test]
    fn hash_password_is_deterministic() {
        let a = hash_password(b"hunter2", TEST_SALT);
        let b = hash_password(b"hunter2", TEST_SALT);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_password_is_32_bytes() {
        assert_eq!(hash_password(b"pw", TEST_SALT).len(), DIGEST_LEN);
    }

    #[test]
    fn hash_password_differs_by_password() {
        let a = hash_password(b"password_a", TEST_SALT);
        let b = hash_password(b"password_b", TEST_SALT);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_password_differs_by_salt() {
        let a = hash_password(b"password", b"salt_aaaaaaaaaaaa");
        let b = hash_password(b"password", b"salt_bbbbbbbbbbbb");
        assert_ne!(a, b);
    }

    #[test]
    fn hash_password_differs_from_derived_key() {
        // The verification digest must not double as the encryption key.
        let digest = hash_password(b"password", TEST_SALT);
        let key = crate::kdf::derive_key(b"password", TEST_SALT).expect("derive should succeed");
        assert_ne!(&digest, key.expose());
    }

    #[test]
    fn verify_password_accepts_correct_password() {
        let stored = hash_password(b"CorrectHorse1", TEST_SALT);
        assert!(verify_password(b"CorrectHorse1", TEST_SALT, &stored));
    }

    #[test]
    fn verify_password_rejects_wrong_password() {
        let stored = hash_password(b"CorrectHorse1", TEST_SALT);
        assert!(!verify_password(b"wrongpass", TEST_SALT, &stored));
    }

    #[test]
    fn verify_password_rejects_wrong_salt() {
        let stored = hash_password(b"CorrectHorse1", b"salt_aaaaaaaaaaaa");
        assert!(!verify_password(b"CorrectHorse1", b"salt_bbbbbbbbbbbb", &stored));
    }

    #[test]
    fn verify_password_rejects_truncated_digest() {
        let stored = hash_password(b"CorrectHorse1", TEST_SALT);
        assert!(!verify_password(b"CorrectHorse1", TEST_SALT, &stored[..16]));
    }

    #[test]
    fn verify_password_rejects_empty_digest() {
        assert!(!verify_password(b"CorrectHorse1", TEST_SALT, &[]));
    }
}
