//! Encryption engine for CryptoShield.
//!
//! This module provides:
//! - Engine configuration with per-option defaults
//! - Text encryption rendered in a textual encoding
//! - Whole-file encryption, in place or to a separate output
//!
//! # Architecture
//! Every public operation takes a snapshot of the configuration, then runs
//! derive key -> build parameters -> cipher -> frame on a blocking worker.

pub mod config;
pub mod encoding;
pub mod file;
mod pipeline;
pub mod shield;
pub mod text;

pub use config::{Format, ShieldConfig};
pub use encoding::Encoding;
pub use shield::Shield;

pub use cryptoshield_common::{
    Algorithm, Error, ErrorKind, KeyLength, KeyUsage, Operation, Result, TagLength,
};
