//! Cipher configuration types used throughout CryptoShield.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Block cipher mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// AES in CBC mode with PKCS#7 padding. Not authenticated.
    #[serde(rename = "AES-CBC")]
    AesCbc,
    /// AES in GCM mode. Authenticated.
    #[default]
    #[serde(rename = "AES-GCM")]
    AesGcm,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::AesCbc => "AES-CBC",
            Algorithm::AesGcm => "AES-GCM",
        }
    }

    /// Whether ciphertext carries an authentication tag.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Algorithm::AesGcm)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AES-CBC" | "CBC" => Ok(Algorithm::AesCbc),
            "AES-GCM" | "GCM" => Ok(Algorithm::AesGcm),
            _ => Err(Error::Serialization(format!("Unknown algorithm: {}", s))),
        }
    }
}

/// AES key size in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum KeyLength {
    Bits128,
    Bits192,
    #[default]
    Bits256,
}

impl KeyLength {
    pub fn bits(&self) -> u16 {
        match self {
            KeyLength::Bits128 => 128,
            KeyLength::Bits192 => 192,
            KeyLength::Bits256 => 256,
        }
    }

    /// Raw key size in bytes.
    pub fn bytes(&self) -> usize {
        usize::from(self.bits() / 8)
    }
}

impl TryFrom<u16> for KeyLength {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            128 => Ok(KeyLength::Bits128),
            192 => Ok(KeyLength::Bits192),
            256 => Ok(KeyLength::Bits256),
            other => Err(Error::Serialization(format!(
                "Invalid key length: {} (expected 128, 192 or 256)",
                other
            ))),
        }
    }
}

impl From<KeyLength> for u16 {
    fn from(length: KeyLength) -> Self {
        length.bits()
    }
}

impl FromStr for KeyLength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: u16 = s
            .parse()
            .map_err(|_| Error::Serialization(format!("Invalid key length: {}", s)))?;
        KeyLength::try_from(bits)
    }
}

impl fmt::Display for KeyLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// GCM authentication tag size in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum TagLength {
    Bits32,
    Bits64,
    #[default]
    Bits128,
}

impl TagLength {
    pub fn bits(&self) -> u16 {
        match self {
            TagLength::Bits32 => 32,
            TagLength::Bits64 => 64,
            TagLength::Bits128 => 128,
        }
    }

    pub fn bytes(&self) -> usize {
        usize::from(self.bits() / 8)
    }
}

impl TryFrom<u16> for TagLength {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(TagLength::Bits32),
            64 => Ok(TagLength::Bits64),
            128 => Ok(TagLength::Bits128),
            other => Err(Error::Serialization(format!(
                "Invalid tag length: {} (expected 32, 64 or 128)",
                other
            ))),
        }
    }
}

impl From<TagLength> for u16 {
    fn from(length: TagLength) -> Self {
        length.bits()
    }
}

impl FromStr for TagLength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: u16 = s
            .parse()
            .map_err(|_| Error::Serialization(format!("Invalid tag length: {}", s)))?;
        TagLength::try_from(bits)
    }
}

/// Operation a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
}

impl KeyUsage {
    /// Both usages, the default for a freshly configured engine.
    pub fn all() -> Vec<KeyUsage> {
        vec![KeyUsage::Encrypt, KeyUsage::Decrypt]
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyUsage::Encrypt => f.write_str("encrypt"),
            KeyUsage::Decrypt => f.write_str("decrypt"),
        }
    }
}
