//! Common types shared across the CryptoShield crates.
//!
//! This module provides the error type used by every layer and the
//! algorithm enums that describe a cipher configuration.

pub mod error;
pub mod types;

pub use error::{Error, ErrorKind, Operation, Result};
pub use types::{Algorithm, KeyLength, KeyUsage, TagLength};
