//! Passphrase key derivation.
//!
//! A passphrase whose character count already equals the key size is used
//! as-is. Any other passphrase is stretched with PBKDF2-HMAC-SHA256.

use hmac::Hmac;
use sha2::Sha256;
use tracing::debug;

use crate::keys::DerivedKey;
use cryptoshield_common::{Error, KeyLength, Result};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Parameters for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Size of the derived key.
    pub key_length: KeyLength,
    /// PBKDF2 iteration count.
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            key_length: KeyLength::default(),
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Where the PBKDF2 salt comes from.
#[derive(Debug, Clone, Copy)]
pub enum SaltSource<'a> {
    /// The passphrase bytes double as the salt (legacy format).
    Secret,
    /// A salt stored alongside the ciphertext.
    Explicit(&'a [u8]),
}

/// Which derivation a passphrase takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationPath {
    PassThrough,
    Stretched,
}

/// Decide the derivation path for `secret` at `key_length`.
///
/// The secret length is counted in Unicode scalar values, so a secret with
/// characters outside the Basic Multilingual Plane counts each of them once
/// rather than as a UTF-16 surrogate pair. A pass-through secret must also be
/// exactly `key_length` bytes of UTF-8; one that only matches some other AES
/// size is rejected at key import instead of being accepted at that size.
pub fn derivation_path(secret: &str, key_length: KeyLength) -> DerivationPath {
    if secret.chars().count() == key_length.bytes() {
        DerivationPath::PassThrough
    } else {
        DerivationPath::Stretched
    }
}

/// Derive raw key bytes from a passphrase.
///
/// # Preconditions
/// - `secret` must not be empty after trimming
///
/// # Postconditions
/// - Pass-through: returns the UTF-8 bytes of `secret` unchanged
/// - Stretched: returns exactly `key_length / 8` bytes
/// - The result is deterministic given the same inputs
///
/// # Errors
/// - Returns error if the secret is empty or whitespace
/// - Returns error if PBKDF2 rejects the parameters
pub fn derive_key(secret: &str, salt: SaltSource<'_>, params: &KdfParams) -> Result<DerivedKey> {
    if secret.trim().is_empty() {
        return Err(Error::InvalidSecretKey(
            "Secret key cannot be empty".to_string(),
        ));
    }

    let password = secret.as_bytes();

    if derivation_path(secret, params.key_length) == DerivationPath::PassThrough {
        debug!(key_length = %params.key_length, "Using passphrase bytes as key");
        return Ok(DerivedKey::from_bytes(password.to_vec()));
    }

    if params.iterations == 0 {
        return Err(Error::KeyDerivation(
            "PBKDF2 iterations must be at least 1".to_string(),
        ));
    }

    let salt = match salt {
        SaltSource::Secret => password,
        SaltSource::Explicit(bytes) => bytes,
    };

    debug!(
        key_length = %params.key_length,
        iterations = params.iterations,
        salt_len = salt.len(),
        "Stretching passphrase with PBKDF2-HMAC-SHA256"
    );

    let mut key = vec![0u8; params.key_length.bytes()];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, params.iterations, &mut key)
        .map_err(|e| Error::KeyDerivation(format!("PBKDF2 failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key))
}
