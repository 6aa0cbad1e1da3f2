#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for PBKDF2 key derivation.
//!
//! The derivation runs at the full production iteration count, so the
//! case count is kept low to hold the suite under a few seconds.

use proptest::prelude::*;

use cadenas_crypto_core::kdf::derive_key;
use cadenas_crypto_core::symmetric::{decrypt, encrypt};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Derived key is always exactly 32 bytes regardless of password/salt content.
    #[test]
    fn derive_always_32_bytes(
        password in proptest::collection::vec(any::<u8>(), 0..64),
        salt in proptest::collection::vec(any::<u8>(), 16..32),
    ) {
        let key = derive_key(&password, &salt)
            .expect("derive should succeed with valid inputs");
        prop_assert_eq!(key.expose().len(), 32);
    }

    /// Two independent derivations of the same (password, salt) produce
    /// interchangeable keys: one decrypts what the other encrypted.
    #[test]
    fn independent_derivations_are_interchangeable(
        password in proptest::collection::vec(any::<u8>(), 1..64),
        plaintext in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let salt = b"proptest_salt_16b";
        let key_a = derive_key(&password, salt).expect("derive should succeed");
        let key_b = derive_key(&password, salt).expect("derive should succeed");

        let sealed = encrypt(&plaintext, key_a.expose()).expect("encrypt should succeed");
        let decrypted = decrypt(&sealed.ciphertext, &sealed.iv, key_b.expose())
            .expect("the re-derived key should decrypt");
        prop_assert_eq!(decrypted.expose(), plaintext.as_slice());
    }
}
