//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encoding::Encoding;
use cryptoshield_common::{Algorithm, Error, KeyLength, KeyUsage, Result, TagLength};
use cryptoshield_crypto::CipherSpec;

pub use cryptoshield_crypto::frame::DEFAULT_SALT_LEN;
pub use cryptoshield_crypto::kdf::DEFAULT_ITERATIONS;

/// Wire layout of encrypted buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `padding || ciphertext || padding` with an all-zero IV and the
    /// passphrase as its own PBKDF2 salt. Kept to read and write buffers
    /// produced by older deployments.
    Legacy,
    /// `salt || iv || ciphertext` with a random salt and IV per message.
    #[default]
    Sealed,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Legacy => f.write_str("legacy"),
            Format::Sealed => f.write_str("sealed"),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Format::Legacy),
            "sealed" => Ok(Format::Sealed),
            _ => Err(Error::Serialization(format!("Unknown format: {}", s))),
        }
    }
}

/// Options for one engine instance.
///
/// Every field falls back to its default independently, both through the
/// `with_*` builders and when deserializing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    pub algorithm: Algorithm,
    /// Stored passphrase, trimmed. Never serialized.
    #[serde(skip_serializing)]
    pub secret_key: String,
    /// Whether derived keys may be exported.
    pub extractable: bool,
    pub key_length: KeyLength,
    /// Only meaningful for AES-GCM.
    pub tag_length: TagLength,
    pub key_usages: Vec<KeyUsage>,
    /// Encoding of string payloads.
    pub encoding: Encoding,
    /// PBKDF2 iteration count.
    pub iterations: u32,
    /// Padding length (legacy) or KDF salt length (sealed), in bytes.
    pub salt: usize,
    pub format: Format,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AesGcm,
            secret_key: String::new(),
            extractable: false,
            key_length: KeyLength::Bits256,
            tag_length: TagLength::Bits128,
            key_usages: KeyUsage::all(),
            encoding: Encoding::Hex,
            iterations: DEFAULT_ITERATIONS,
            salt: DEFAULT_SALT_LEN,
            format: Format::Sealed,
        }
    }
}

impl fmt::Debug for ShieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShieldConfig")
            .field("algorithm", &self.algorithm)
            .field("secret_key", &"[REDACTED]")
            .field("extractable", &self.extractable)
            .field("key_length", &self.key_length)
            .field("tag_length", &self.tag_length)
            .field("key_usages", &self.key_usages)
            .field("encoding", &self.encoding)
            .field("iterations", &self.iterations)
            .field("salt", &self.salt)
            .field("format", &self.format)
            .finish()
    }
}

impl ShieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_secret_key(mut self, secret: &str) -> Self {
        self.set_secret_key(secret);
        self
    }

    pub fn with_extractable(mut self, extractable: bool) -> Self {
        self.extractable = extractable;
        self
    }

    pub fn with_key_length(mut self, key_length: KeyLength) -> Self {
        self.key_length = key_length;
        self
    }

    pub fn with_tag_length(mut self, tag_length: TagLength) -> Self {
        self.tag_length = tag_length;
        self
    }

    pub fn with_key_usages(mut self, usages: Vec<KeyUsage>) -> Self {
        self.key_usages = usages;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_salt(mut self, salt: usize) -> Self {
        self.salt = salt;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Replace the stored secret with `secret`, trimmed.
    pub fn set_secret_key(&mut self, secret: &str) {
        self.secret_key = secret.trim().to_string();
    }

    /// Update algorithm and key length together.
    pub fn set_algorithm(&mut self, algorithm: Algorithm, key_length: KeyLength) {
        self.algorithm = algorithm;
        self.key_length = key_length;
    }

    /// Cipher settings for the crypto layer.
    pub fn cipher_spec(&self) -> CipherSpec {
        CipherSpec {
            algorithm: self.algorithm,
            key_length: self.key_length,
            tag_length: self.tag_length,
            usages: self.key_usages.clone(),
            extractable: self.extractable,
            iterations: self.iterations,
        }
    }

    /// Serialize configuration to JSON. The secret is left out.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize configuration from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.secret_key = config.secret_key.trim().to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShieldConfig::default();

        assert_eq!(config.algorithm, Algorithm::AesGcm);
        assert_eq!(config.key_length, KeyLength::Bits256);
        assert_eq!(config.tag_length, TagLength::Bits128);
        assert_eq!(config.key_usages, vec![KeyUsage::Encrypt, KeyUsage::Decrypt]);
        assert!(!config.extractable);
        assert_eq!(config.encoding, Encoding::Hex);
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.salt, 16);
        assert!(config.secret_key.is_empty());
    }

    #[test]
    fn test_secret_key_is_trimmed() {
        let mut config = ShieldConfig::new().with_secret_key("  padded secret \n");
        assert_eq!(config.secret_key, "padded secret");

        config.set_secret_key("\tother ");
        assert_eq!(config.secret_key, "other");
    }

    #[test]
    fn test_set_algorithm_updates_both() {
        let mut config = ShieldConfig::default();
        config.set_algorithm(Algorithm::AesCbc, KeyLength::Bits128);

        assert_eq!(config.algorithm, Algorithm::AesCbc);
        assert_eq!(config.key_length, KeyLength::Bits128);
        assert_eq!(config.cipher_spec().key_length, KeyLength::Bits128);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ShieldConfig::from_json(
            r#"{ "algorithm": "AES-CBC", "key_length": 192, "secret_key": "  pw  ", "encoding": "base64" }"#,
        )
        .unwrap();

        assert_eq!(config.algorithm, Algorithm::AesCbc);
        assert_eq!(config.key_length, KeyLength::Bits192);
        assert_eq!(config.secret_key, "pw");
        assert_eq!(config.encoding, Encoding::Base64);
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.format, Format::Sealed);
    }

    #[test]
    fn test_from_json_rejects_bad_key_length() {
        assert!(ShieldConfig::from_json(r#"{ "key_length": 100 }"#).is_err());
    }

    #[test]
    fn test_to_json_omits_secret() {
        let config = ShieldConfig::new()
            .with_secret_key("do-not-write-me")
            .with_format(Format::Legacy);
        let json = config.to_json().unwrap();

        assert!(!json.contains("do-not-write-me"));
        assert!(!format!("{:?}", config).contains("do-not-write-me"));

        let restored = ShieldConfig::from_json(&json).unwrap();
        assert_eq!(restored.format, Format::Legacy);
        assert!(restored.secret_key.is_empty());
    }
}
