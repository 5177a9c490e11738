//! Common error types for CryptoShield.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Public operation that wraps a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EncryptText,
    DecryptText,
    EncryptFile,
    DecryptFile,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::EncryptText => "encrypt the text",
            Operation::DecryptText => "decrypt the text",
            Operation::EncryptFile => "encrypt file",
            Operation::DecryptFile => "decrypt file",
        };
        f.write_str(name)
    }
}

/// Failure category, independent of which operation surfaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSecretKey,
    KeyDerivation,
    KeyImport,
    Encryption,
    Decryption,
    Framing,
    Encoding,
    FileIo,
    Serialization,
}

/// Top-level error type for CryptoShield operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The secret is empty after trimming.
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Password-based key derivation failed.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Derived bytes could not be turned into a cipher key.
    #[error("Key import error: {0}")]
    KeyImport(String),

    /// Cipher encrypt call failed.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Cipher decrypt call failed, including authentication tag mismatch.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Framed buffer is malformed or too short.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Textual encoding could not be decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A public operation failed; carries the operation and the original cause.
    #[error("Error while {operation}! {source}")]
    Operation {
        operation: Operation,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with the operation that surfaced it.
    ///
    /// Already wrapped errors are returned unchanged so a failure is only
    /// ever reported under one operation.
    pub fn within(self, operation: Operation) -> Self {
        match self {
            Error::Operation { .. } => self,
            other => Error::Operation {
                operation,
                source: Box::new(other),
            },
        }
    }

    /// Category of the underlying failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSecretKey(_) => ErrorKind::InvalidSecretKey,
            Error::KeyDerivation(_) => ErrorKind::KeyDerivation,
            Error::KeyImport(_) => ErrorKind::KeyImport,
            Error::Encryption(_) => ErrorKind::Encryption,
            Error::Decryption(_) => ErrorKind::Decryption,
            Error::Framing(_) => ErrorKind::Framing,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::FileIo { .. } => ErrorKind::FileIo,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Operation { source, .. } => source.kind(),
        }
    }

    /// Operation that reported this error, if it has been wrapped.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Error::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
