//! Algorithm parameter assembly.
//!
//! Combines the derived key with the cipher settings of one call.

use tracing::debug;

use crate::cipher::import_key;
use crate::kdf::{derive_key, KdfParams, SaltSource};
use crate::keys::ImportedKey;
use crate::rng::random_array;
use cryptoshield_common::{Algorithm, KeyLength, KeyUsage, Result, TagLength};

/// IV / nonce size shared by both modes (16 bytes).
pub const IV_SIZE: usize = 16;

/// Per-call cipher parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmParameters {
    pub algorithm: Algorithm,
    pub iv: [u8; IV_SIZE],
    /// Ignored for AES-CBC.
    pub tag_length: TagLength,
}

impl AlgorithmParameters {
    pub fn new(algorithm: Algorithm, tag_length: TagLength, iv: [u8; IV_SIZE]) -> Self {
        Self {
            algorithm,
            iv,
            tag_length,
        }
    }

    /// Parameters with an all-zero IV.
    ///
    /// # Warning
    /// Every message encrypted under the same key shares this IV. Under
    /// AES-GCM that breaks both confidentiality and authentication. Only
    /// used to read and write the legacy format.
    pub fn zero_iv(algorithm: Algorithm, tag_length: TagLength) -> Self {
        Self::new(algorithm, tag_length, [0u8; IV_SIZE])
    }

    /// Parameters with a fresh random IV.
    pub fn random_iv(algorithm: Algorithm, tag_length: TagLength) -> Self {
        Self::new(algorithm, tag_length, random_array())
    }
}

/// Cipher settings captured from a configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSpec {
    pub algorithm: Algorithm,
    pub key_length: KeyLength,
    pub tag_length: TagLength,
    pub usages: Vec<KeyUsage>,
    pub extractable: bool,
    pub iterations: u32,
}

impl Default for CipherSpec {
    fn default() -> Self {
        let kdf = KdfParams::default();
        Self {
            algorithm: Algorithm::default(),
            key_length: kdf.key_length,
            tag_length: TagLength::default(),
            usages: KeyUsage::all(),
            extractable: false,
            iterations: kdf.iterations,
        }
    }
}

impl CipherSpec {
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            key_length: self.key_length,
            iterations: self.iterations,
        }
    }

    /// Derive a key from `secret` and build the matching parameters.
    ///
    /// # Postconditions
    /// - The key is restricted to the configured usages and algorithm
    /// - The parameters carry `iv` and the configured tag length
    ///
    /// # Errors
    /// - Invalid secret
    /// - Derivation failure
    /// - Key import rejection
    pub fn prepare(
        &self,
        secret: &str,
        salt: SaltSource<'_>,
        iv: [u8; IV_SIZE],
    ) -> Result<(ImportedKey, AlgorithmParameters)> {
        let derived = derive_key(secret, salt, &self.kdf_params())?;
        let key = import_key(
            derived,
            self.algorithm,
            self.key_length,
            &self.usages,
            self.extractable,
        )?;

        debug!(algorithm = %self.algorithm, key_length = %self.key_length, "Key imported");

        Ok((key, AlgorithmParameters::new(self.algorithm, self.tag_length, iv)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptoshield_common::ErrorKind;

    #[test]
    fn test_zero_iv_is_constant() {
        let p1 = AlgorithmParameters::zero_iv(Algorithm::AesGcm, TagLength::Bits128);
        let p2 = AlgorithmParameters::zero_iv(Algorithm::AesGcm, TagLength::Bits128);

        assert_eq!(p1.iv, [0u8; IV_SIZE]);
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_random_iv_differs() {
        let p1 = AlgorithmParameters::random_iv(Algorithm::AesCbc, TagLength::Bits128);
        let p2 = AlgorithmParameters::random_iv(Algorithm::AesCbc, TagLength::Bits128);

        assert_ne!(p1.iv, p2.iv);
    }

    #[test]
    fn test_prepare_builds_key_and_params() {
        let spec = CipherSpec {
            algorithm: Algorithm::AesCbc,
            key_length: KeyLength::Bits192,
            tag_length: TagLength::Bits64,
            usages: vec![KeyUsage::Encrypt],
            extractable: true,
            iterations: 10,
        };

        let (key, params) = spec
            .prepare("a passphrase", SaltSource::Secret, [3u8; IV_SIZE])
            .unwrap();

        assert_eq!(key.algorithm(), Algorithm::AesCbc);
        assert_eq!(key.export().unwrap().len(), 24);
        assert!(!key.allows(KeyUsage::Decrypt));
        assert_eq!(params.iv, [3u8; IV_SIZE]);
        assert_eq!(params.tag_length, TagLength::Bits64);
    }

    #[test]
    fn test_prepare_rejects_blank_secret() {
        let err = CipherSpec::default()
            .prepare(" \t ", SaltSource::Secret, [0u8; IV_SIZE])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidSecretKey);
    }

    #[test]
    fn test_prepare_rejects_empty_usages() {
        let spec = CipherSpec {
            usages: Vec::new(),
            ..CipherSpec::default()
        };

        let err = spec
            .prepare("passphrase", SaltSource::Secret, [0u8; IV_SIZE])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyImport);
    }
}
