//! Key types with secure memory handling.
//!
//! Both key types zeroize their bytes on drop. Neither prints its bytes
//! through `Debug`.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use cryptoshield_common::{Algorithm, Error, KeyLength, KeyUsage, Result};

/// Raw key bytes produced from a passphrase.
///
/// Recomputed on every call and never persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: Vec<u8>,
}

impl DerivedKey {
    /// Create a derived key from raw bytes.
    pub fn from_bytes(key: Vec<u8>) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED; {}])", self.key.len())
    }
}

/// Cipher key bound to one algorithm and a set of permitted usages.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ImportedKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    algorithm: Algorithm,
    #[zeroize(skip)]
    key_length: KeyLength,
    #[zeroize(skip)]
    usages: Vec<KeyUsage>,
    #[zeroize(skip)]
    extractable: bool,
}

impl ImportedKey {
    pub(crate) fn new(
        key: Vec<u8>,
        algorithm: Algorithm,
        key_length: KeyLength,
        usages: Vec<KeyUsage>,
        extractable: bool,
    ) -> Self {
        Self {
            key,
            algorithm,
            key_length,
            usages,
            extractable,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_length(&self) -> KeyLength {
        self.key_length
    }

    pub fn usages(&self) -> &[KeyUsage] {
        &self.usages
    }

    /// Whether the key may be used for `usage`.
    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.usages.contains(&usage)
    }

    pub fn is_extractable(&self) -> bool {
        self.extractable
    }

    /// Export the raw key bytes.
    ///
    /// # Errors
    /// - Returns error if the key was imported as non-extractable
    pub fn export(&self) -> Result<Vec<u8>> {
        if !self.extractable {
            return Err(Error::KeyImport("Key is not extractable".to_string()));
        }
        Ok(self.key.clone())
    }
}

impl fmt::Debug for ImportedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportedKey")
            .field("key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("key_length", &self.key_length)
            .field("usages", &self.usages)
            .field("extractable", &self.extractable)
            .finish()
    }
}
