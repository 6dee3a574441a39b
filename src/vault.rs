//! Passcode gate for healthbinder.
//!
//! A BLAKE3 digest of the passcode is kept in the metadata table. While a
//! passcode is set, data-touching commands must present it; the comparison
//! is digest against digest, the passcode itself is never stored.

use tracing::info;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Metadata key holding the passcode digest.
const PIN_HASH_KEY: &str = "pin_hash";

/// Minimum accepted passcode length.
pub const MIN_PIN_LEN: usize = 4;

/// Compute the digest of a passcode.
#[must_use]
pub fn pin_digest(pin: &str) -> String {
    blake3::hash(pin.as_bytes()).to_hex().to_string()
}

/// Whether a passcode is currently set.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn is_set(storage: &Storage) -> Result<bool> {
    Ok(storage.get_meta(PIN_HASH_KEY)?.is_some())
}

/// Set or change the passcode.
///
/// When a passcode is already set, the current one must be supplied.
///
/// # Errors
///
/// Returns [`Error::PinTooShort`] for a short passcode, [`Error::VaultLocked`]
/// or [`Error::PinMismatch`] if the current passcode is required and wrong.
pub fn set_pin(storage: &Storage, new_pin: &str, current: Option<&str>) -> Result<()> {
    let new_pin = new_pin.trim();
    if new_pin.len() < MIN_PIN_LEN {
        return Err(Error::PinTooShort { min: MIN_PIN_LEN });
    }

    if is_set(storage)? {
        verify(storage, current.ok_or(Error::VaultLocked)?)?;
    }

    storage.set_meta(PIN_HASH_KEY, &pin_digest(new_pin))?;
    info!("Passcode updated");
    Ok(())
}

/// Remove the passcode, unlocking the vault permanently.
///
/// # Errors
///
/// Returns [`Error::PinMismatch`] if the supplied passcode is wrong.
pub fn clear_pin(storage: &Storage, current: &str) -> Result<()> {
    if !is_set(storage)? {
        return Ok(());
    }
    verify(storage, current)?;
    storage.delete_meta(PIN_HASH_KEY)?;
    info!("Passcode removed");
    Ok(())
}

/// Verify a passcode against the stored digest.
///
/// Succeeds trivially when no passcode is set.
///
/// # Errors
///
/// Returns [`Error::PinMismatch`] if the digest does not match.
pub fn verify(storage: &Storage, pin: &str) -> Result<()> {
    match storage.get_meta(PIN_HASH_KEY)? {
        None => Ok(()),
        Some(stored) if stored == pin_digest(pin.trim()) => Ok(()),
        Some(_) => Err(Error::PinMismatch),
    }
}

/// Gate a data-touching command: require and verify the passcode when set.
///
/// # Errors
///
/// Returns [`Error::VaultLocked`] when a passcode is set but none was given,
/// or [`Error::PinMismatch`] when the given one is wrong.
pub fn ensure_unlocked(storage: &Storage, pin: Option<&str>) -> Result<()> {
    if !is_set(storage)? {
        return Ok(());
    }
    match pin {
        Some(pin) => verify(storage, pin),
        None => Err(Error::VaultLocked),
    }
}
