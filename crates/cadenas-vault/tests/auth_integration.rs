#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Integration tests for registration, login, and the lockout policy
//! against an on-disk store.

use cadenas_vault::auth::{self, LOCKOUT_DURATION_MS, MAX_ATTEMPTS};
use cadenas_vault::error::VaultError;
use cadenas_vault::store::VaultStore;

const PASSWORD: &[u8] = b"CorrectHorse1";

/// Open the store at the standard file name inside `dir`.
fn open_store(dir: &std::path::Path) -> VaultStore {
    VaultStore::open(&dir.join("vault.db")).expect("open should succeed")
}

#[test]
fn register_then_login_roundtrip_on_disk() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());

    let reg_key = auth::register(&mut store, PASSWORD).expect("register should succeed");
    drop(store);

    // A fresh process sees the same vault and derives the same key.
    let mut store = open_store(tmp.path());
    let login_key = auth::login(&mut store, PASSWORD).expect("login should succeed");
    assert_eq!(reg_key.expose(), login_key.expose());
}

#[test]
fn wrong_password_then_correct_password_recovers() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");

    assert!(matches!(
        auth::login(&mut store, b"wrongpass"),
        Err(VaultError::InvalidPassword)
    ));
    auth::login(&mut store, PASSWORD).expect("correct password should still work");

    let state = store.security_state().expect("state should succeed");
    assert_eq!(state.count, 0);
    assert_eq!(state.logs.len(), 2);
}

#[test]
fn max_attempts_engages_lockout_with_thirty_second_countdown() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");

    for _ in 0..MAX_ATTEMPTS - 1 {
        assert!(matches!(
            auth::login(&mut store, b"wrongpass"),
            Err(VaultError::InvalidPassword)
        ));
    }

    match auth::login(&mut store, b"wrongpass") {
        Err(VaultError::LockedOut { remaining_secs }) => {
            assert!((29..=LOCKOUT_DURATION_MS / 1000).contains(&remaining_secs));
        }
        other => panic!("expected LockedOut, got {other:?}"),
    }

    let status = auth::lockout_status(&store).expect("status should succeed");
    assert!(status.is_locked);
}

#[test]
fn lockout_survives_store_reopen() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");
    for _ in 0..MAX_ATTEMPTS {
        let _ = auth::login(&mut store, b"wrongpass");
    }
    drop(store);

    // The lockout is persisted, not held in memory: a restarted process
    // still refuses the correct password.
    let mut store = open_store(tmp.path());
    let status = auth::lockout_status(&store).expect("status should succeed");
    assert!(status.is_locked);
    assert!(status.remaining_secs > 0);
    assert!(matches!(
        auth::login(&mut store, PASSWORD),
        Err(VaultError::LockedOut { .. })
    ));
}

#[test]
fn crash_after_failed_attempt_does_not_lose_the_increment() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");

    // Each failure is committed before login returns, so dropping the
    // store between attempts (a crash stand-in) changes nothing.
    for expected_count in 1..MAX_ATTEMPTS {
        let _ = auth::login(&mut store, b"wrongpass");
        drop(store);
        store = open_store(tmp.path());
        let state = store.security_state().expect("state should succeed");
        assert_eq!(state.count, expected_count);
    }

    assert!(matches!(
        auth::login(&mut store, b"wrongpass"),
        Err(VaultError::LockedOut { .. })
    ));
}

#[test]
fn expired_lockout_unlocks_and_correct_password_succeeds() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");
    for _ in 0..MAX_ATTEMPTS {
        let _ = auth::login(&mut store, b"wrongpass");
    }

    // Simulate the lockout window elapsing by rewinding the persisted expiry.
    let mut state = store.security_state().expect("state should succeed");
    assert!(state.lockout_until > 0);
    state.lockout_until = 1;
    store
        .update_security_state(&state)
        .expect("update should succeed");

    let status = auth::lockout_status(&store).expect("status should succeed");
    assert!(!status.is_locked);
    assert_eq!(status.remaining_secs, 0);

    auth::login(&mut store, PASSWORD).expect("login should succeed after expiry");
    let state = store.security_state().expect("state should succeed");
    assert_eq!(state.count, 0);
    assert_eq!(state.lockout_until, 0);
}

#[test]
fn attempt_log_only_grows() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");

    let mut last_len = 0;
    let attempts: &[&[u8]] = &[b"wrong-1", PASSWORD, b"wrong-2", PASSWORD];
    for password in attempts {
        let _ = auth::login(&mut store, password);
        let logs = store.security_state().expect("state should succeed").logs;
        assert_eq!(logs.len(), last_len + 1);
        last_len = logs.len();
    }

    let logs = store.security_state().expect("state should succeed").logs;
    let outcomes: Vec<bool> = logs.iter().map(|l| l.success).collect();
    assert_eq!(outcomes, vec![false, true, false, true]);
}

#[test]
fn register_on_existing_vault_is_rejected_until_reset() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut store = open_store(tmp.path());
    auth::register(&mut store, PASSWORD).expect("register should succeed");

    assert!(matches!(
        auth::register(&mut store, b"AnotherPass2"),
        Err(VaultError::VaultAlreadyExists)
    ));

    store.reset_vault().expect("reset should succeed");
    assert!(!store.has_vault().expect("has_vault should succeed"));
    auth::register(&mut store, b"AnotherPass2").expect("register should succeed after reset");
    auth::login(&mut store, b"AnotherPass2").expect("login with the new password should succeed");
}
