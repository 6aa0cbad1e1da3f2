//! Registration, login, and the brute-force lockout policy.
//!
//! The state machine:
//!
//! - no vault → `register` → unlocked (key returned)
//! - locked → `login` success → unlocked; failure → locked, counter bumped
//! - counter reaches [`MAX_ATTEMPTS`] → locked out until a persisted
//!   expiry timestamp; the expiry passing returns the vault to locked
//! - unlocked is session-local and ends when the caller drops the key
//!
//! Every attempt's effect on [`SecurityState`](crate::store::SecurityState)
//! is committed to the store
//! before the result is returned, so a crash between attempts cannot roll
//! back the counter, and a lockout survives process restarts.

use cadenas_crypto_core::memory::SecretBytes;
use cadenas_crypto_core::{auth_hash, kdf};

use crate::error::VaultError;
use crate::store::{AttemptLog, VaultMetadata, VaultStore};

/// Failed attempts tolerated before the lockout engages.
pub const MAX_ATTEMPTS: u32 = 3;

/// Lockout window in milliseconds once [`MAX_ATTEMPTS`] is reached.
/// Demonstration-scale; production deployments should use minutes.
pub const LOCKOUT_DURATION_MS: u64 = 30_000;

/// The symmetric session key, derived fresh on every register/login.
/// Held only in memory; zeroized on drop.
pub type SessionKey = SecretBytes<{ kdf::KEY_LEN }>;

/// Snapshot of the lockout gate, for resuming a countdown after restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutStatus {
    /// Whether logins are currently blocked.
    pub is_locked: bool,
    /// Whole seconds until the block lifts (rounded up); 0 when unlocked.
    pub remaining_secs: u64,
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Create a new vault gated by `password` and return the session key.
///
/// Generates the one salt of the vault's lifetime, stores the
/// verification digest, and initializes the empty entry list and zeroed
/// security state in a single transaction. Password strength policy
/// (minimum length, confirmation match) is the caller's responsibility
/// before this point.
///
/// # Errors
///
/// - [`VaultError::VaultAlreadyExists`] if a vault is already registered
/// - [`VaultError::Storage`] on persistence failure
/// - [`VaultError::Crypto`] if key derivation fails
pub fn register(store: &mut VaultStore, password: &[u8]) -> Result<SessionKey, VaultError> {
    if store.has_vault()? {
        return Err(VaultError::VaultAlreadyExists);
    }

    let salt = kdf::generate_salt();
    let auth_hash = auth_hash::hash_password(password, &salt);
    store.init_vault(&VaultMetadata {
        salt: salt.to_vec(),
        auth_hash: auth_hash.to_vec(),
    })?;

    tracing::info!("vault registered");
    Ok(kdf::derive_key(password, &salt)?)
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Attempt to unlock the vault with `password`.
///
/// The lockout gate runs first, before any password computation, so
/// rapid retries cannot race past it. On success the failure counter
/// resets; on failure it increments, engaging the lockout at
/// [`MAX_ATTEMPTS`]. Either way the updated state (including the
/// append-only attempt log) is durably persisted before this returns.
///
/// # Errors
///
/// - [`VaultError::LockedOut`] while the lockout window is active, and
///   again on the attempt that engages it
/// - [`VaultError::InvalidPassword`] on a wrong password below the
///   threshold — deliberately indistinguishable from other auth failures
/// - [`VaultError::Corruption`] if vault metadata is missing
/// - [`VaultError::Storage`] on persistence failure
pub fn login(store: &mut VaultStore, password: &[u8]) -> Result<SessionKey, VaultError> {
    let mut state = store.security_state()?;
    let now = current_epoch_ms();

    if let Some(remaining_ms) = lockout_remaining_ms(state.lockout_until, now) {
        return Err(VaultError::LockedOut {
            remaining_secs: ms_to_secs_ceil(remaining_ms),
        });
    }

    let metadata = store
        .metadata()?
        .ok_or_else(|| VaultError::Corruption("vault metadata missing".into()))?;

    if auth_hash::verify_password(password, &metadata.salt, &metadata.auth_hash) {
        state.count = 0;
        state.lockout_until = 0;
        state.logs.push(AttemptLog {
            timestamp: now,
            success: true,
        });
        store.update_security_state(&state)?;

        tracing::debug!("login succeeded");
        return Ok(kdf::derive_key(password, &metadata.salt)?);
    }

    state.count = state.count.saturating_add(1);
    state.logs.push(AttemptLog {
        timestamp: now,
        success: false,
    });

    if state.count >= MAX_ATTEMPTS {
        state.lockout_until = now.saturating_add(LOCKOUT_DURATION_MS);
        store.update_security_state(&state)?;

        tracing::warn!(attempts = state.count, "lockout engaged");
        return Err(VaultError::LockedOut {
            remaining_secs: ms_to_secs_ceil(LOCKOUT_DURATION_MS),
        });
    }

    store.update_security_state(&state)?;
    tracing::warn!(attempts = state.count, "failed login attempt");
    Err(VaultError::InvalidPassword)
}

// ---------------------------------------------------------------------------
// Lockout status
// ---------------------------------------------------------------------------

/// Read the lockout gate without mutating anything.
///
/// Shares the strict-greater clock comparison with [`login`], so the two
/// can never disagree about the boundary instant.
///
/// # Errors
///
/// Returns [`VaultError::Storage`] if the security record cannot be read.
pub fn lockout_status(store: &VaultStore) -> Result<LockoutStatus, VaultError> {
    let state = store.security_state()?;
    let now = current_epoch_ms();

    Ok(
        lockout_remaining_ms(state.lockout_until, now).map_or(
            LockoutStatus {
                is_locked: false,
                remaining_secs: 0,
            },
            |remaining_ms| LockoutStatus {
                is_locked: true,
                remaining_secs: ms_to_secs_ceil(remaining_ms),
            },
        ),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Milliseconds left on the lockout, or `None` when logins may proceed.
///
/// Strict-greater: the boundary instant (`lockout_until == now`) is
/// already unlocked.
const fn lockout_remaining_ms(lockout_until: u64, now_ms: u64) -> Option<u64> {
    if lockout_until > now_ms {
        Some(lockout_until.saturating_sub(now_ms))
    } else {
        None
    }
}

/// Round milliseconds up to whole seconds for user-facing countdowns.
const fn ms_to_secs_ceil(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

/// Current time as milliseconds since Unix epoch.
pub(crate) fn current_epoch_ms() -> u64 {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
