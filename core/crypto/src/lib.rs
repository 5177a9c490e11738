//! Cryptographic primitives for CryptoShield.
//!
//! This module provides:
//! - Passphrase key derivation (pass-through or PBKDF2-HMAC-SHA256)
//! - Algorithm parameter assembly for AES-CBC and AES-GCM
//! - Key import with usage restrictions and cipher invocation
//! - Buffer framing for the legacy and sealed wire formats
//!
//! # Security Guarantees
//! - Derived and imported key material is zeroized on drop
//! - No passphrase or key material is ever logged
//! - Truncated GCM tags are compared in constant time

pub mod cipher;
pub mod frame;
pub mod kdf;
pub mod keys;
pub mod params;
pub mod rng;

pub use cipher::{decrypt_bytes, encrypt_bytes, import_key};
pub use frame::{BufferFramer, SealedEnvelope};
pub use kdf::{derivation_path, derive_key, DerivationPath, KdfParams, SaltSource};
pub use keys::{DerivedKey, ImportedKey};
pub use params::{AlgorithmParameters, CipherSpec, IV_SIZE};
