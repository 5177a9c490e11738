//! Buffer framing.
//!
//! Two layouts are supported:
//! - legacy: `padding(N) || ciphertext || padding(N)`, where both padding
//!   blocks are random, non-authenticated filler stripped by length
//! - sealed: `salt(N) || iv(16) || ciphertext`, where the salt feeds the key
//!   derivation and the IV is fresh per message

use crate::params::IV_SIZE;
use crate::rng::random_bytes;
use cryptoshield_common::{Error, Result};

/// Default padding / salt length in bytes.
pub const DEFAULT_SALT_LEN: usize = 16;

/// Legacy framer that surrounds ciphertext with random padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFramer {
    salt_len: usize,
}

impl BufferFramer {
    pub fn new(salt_len: usize) -> Self {
        Self { salt_len }
    }

    /// Bytes of padding added around a ciphertext.
    fn overhead(&self) -> Result<usize> {
        self.salt_len.checked_mul(2).ok_or_else(|| {
            Error::Framing(format!("Padding length {} is too large", self.salt_len))
        })
    }

    /// Wrap `ciphertext` between two independent random blocks.
    ///
    /// # Postconditions
    /// - Output length is `ciphertext.len() + 2 * salt_len`
    ///
    /// # Errors
    /// - Returns error if the framed length does not fit in `usize`
    pub fn frame(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let capacity = self
            .overhead()?
            .checked_add(ciphertext.len())
            .ok_or_else(|| Error::Framing("Framed buffer is too large".to_string()))?;

        let mut framed = Vec::with_capacity(capacity);
        framed.extend_from_slice(&random_bytes(self.salt_len));
        framed.extend_from_slice(ciphertext);
        framed.extend_from_slice(&random_bytes(self.salt_len));
        Ok(framed)
    }

    /// Strip `salt_len` bytes from each end. The padding content is not checked.
    ///
    /// # Errors
    /// - Returns error if `framed` is shorter than `2 * salt_len`
    pub fn deframe<'a>(&self, framed: &'a [u8]) -> Result<&'a [u8]> {
        let overhead = self.overhead()?;
        if framed.len() < overhead {
            return Err(Error::Framing(format!(
                "Buffer too short: {} bytes, padding alone needs {}",
                framed.len(),
                overhead
            )));
        }
        Ok(&framed[self.salt_len..framed.len() - self.salt_len])
    }
}

impl Default for BufferFramer {
    fn default() -> Self {
        Self::new(DEFAULT_SALT_LEN)
    }
}

/// Parsed sealed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedEnvelope<'a> {
    /// Key derivation salt.
    pub salt: &'a [u8],
    pub iv: [u8; IV_SIZE],
    /// Ciphertext including any authentication tag.
    pub ciphertext: &'a [u8],
}

impl<'a> SealedEnvelope<'a> {
    /// Serialize as `salt || iv || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.salt.len() + IV_SIZE + self.ciphertext.len());
        out.extend_from_slice(self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(self.ciphertext);
        out
    }

    /// Length of the `salt || iv` header.
    ///
    /// # Errors
    /// - Returns error if the header length does not fit in `usize`
    pub fn header_len(salt_len: usize) -> Result<usize> {
        salt_len
            .checked_add(IV_SIZE)
            .ok_or_else(|| Error::Framing(format!("Salt length {} is too large", salt_len)))
    }

    /// Split `bytes` into salt, IV and ciphertext.
    ///
    /// # Errors
    /// - Returns error if `bytes` cannot hold the salt and IV
    pub fn parse(bytes: &'a [u8], salt_len: usize) -> Result<Self> {
        let header = Self::header_len(salt_len)?;
        if bytes.len() < header {
            return Err(Error::Framing(format!(
                "Envelope too short: {} bytes, header needs {}",
                bytes.len(),
                header
            )));
        }

        let (salt, rest) = bytes.split_at(salt_len);
        let (iv_bytes, ciphertext) = rest.split_at(IV_SIZE);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(iv_bytes);

        Ok(Self {
            salt,
            iv,
            ciphertext,
        })
    }
}
