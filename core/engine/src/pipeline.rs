//! Per-call encryption pipeline shared by the text and file services.
//!
//! These functions are synchronous and CPU-bound; `Shield` runs them on a
//! blocking worker.

use tracing::debug;

use crate::config::{Format, ShieldConfig};
use cryptoshield_common::{Error, Result};
use cryptoshield_crypto::rng::{random_array, random_bytes};
use cryptoshield_crypto::{
    decrypt_bytes, encrypt_bytes, BufferFramer, SaltSource, SealedEnvelope, IV_SIZE,
};

/// Pick the per-call secret if one was given, the stored secret otherwise.
///
/// # Errors
/// - Returns error if the chosen secret is blank
pub(crate) fn resolve_secret(stored: &str, secret: Option<&str>) -> Result<String> {
    let chosen = match secret {
        Some(s) if !s.is_empty() => s,
        _ => stored,
    };

    if chosen.trim().is_empty() {
        return Err(Error::InvalidSecretKey(
            "Secret key cannot be empty".to_string(),
        ));
    }
    Ok(chosen.to_string())
}

/// Encrypt `plaintext` and wrap it in the configured format.
pub(crate) fn seal(config: &ShieldConfig, secret: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let spec = config.cipher_spec();

    match config.format {
        Format::Legacy => {
            let (key, params) = spec.prepare(secret, SaltSource::Secret, [0u8; IV_SIZE])?;
            let ciphertext = encrypt_bytes(plaintext, &key, &params)?;
            let framed = BufferFramer::new(config.salt).frame(&ciphertext)?;

            debug!(
                algorithm = %config.algorithm,
                plaintext_len = plaintext.len(),
                framed_len = framed.len(),
                "Sealed legacy frame"
            );
            Ok(framed)
        }
        Format::Sealed => {
            SealedEnvelope::header_len(config.salt)?;
            let salt = random_bytes(config.salt);
            let iv = random_array::<IV_SIZE>();
            let (key, params) = spec.prepare(secret, SaltSource::Explicit(&salt), iv)?;
            let ciphertext = encrypt_bytes(plaintext, &key, &params)?;
            let envelope = SealedEnvelope {
                salt: &salt,
                iv,
                ciphertext: &ciphertext,
            }
            .to_bytes();

            debug!(
                algorithm = %config.algorithm,
                plaintext_len = plaintext.len(),
                envelope_len = envelope.len(),
                "Sealed envelope"
            );
            Ok(envelope)
        }
    }
}

/// Unwrap `framed` according to the configured format and decrypt it.
pub(crate) fn open(config: &ShieldConfig, secret: &str, framed: &[u8]) -> Result<Vec<u8>> {
    let spec = config.cipher_spec();

    let plaintext = match config.format {
        Format::Legacy => {
            let (key, params) = spec.prepare(secret, SaltSource::Secret, [0u8; IV_SIZE])?;
            let ciphertext = BufferFramer::new(config.salt).deframe(framed)?;
            decrypt_bytes(ciphertext, &key, &params)?
        }
        Format::Sealed => {
            let envelope = SealedEnvelope::parse(framed, config.salt)?;
            let (key, params) = spec.prepare(secret, SaltSource::Explicit(envelope.salt), envelope.iv)?;
            decrypt_bytes(envelope.ciphertext, &key, &params)?
        }
    };

    debug!(
        algorithm = %config.algorithm,
        format = %config.format,
        authenticated = config.algorithm.is_authenticated(),
        framed_len = framed.len(),
        plaintext_len = plaintext.len(),
        "Opened buffer"
    );
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptoshield_common::{Algorithm, ErrorKind};

    fn config(format: Format) -> ShieldConfig {
        ShieldConfig::new().with_format(format).with_iterations(10)
    }

    #[test]
    fn test_resolve_secret_prefers_call_secret() {
        assert_eq!(resolve_secret("stored", Some("call")).unwrap(), "call");
        assert_eq!(resolve_secret("stored", None).unwrap(), "stored");
        assert_eq!(resolve_secret("stored", Some("")).unwrap(), "stored");
    }

    #[test]
    fn test_resolve_secret_rejects_blank() {
        let err = resolve_secret("", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSecretKey);

        let err = resolve_secret("stored", Some("   ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSecretKey);
    }

    #[test]
    fn test_legacy_length_invariant() {
        let config = config(Format::Legacy).with_salt(8);
        let framed = seal(&config, "pw", b"hello").unwrap();

        // GCM ciphertext is plaintext + 16-byte tag.
        assert_eq!(framed.len(), 5 + 16 + 2 * 8);
        assert_eq!(open(&config, "pw", &framed).unwrap(), b"hello");
    }

    #[test]
    fn test_legacy_ciphertext_is_deterministic() {
        let config = config(Format::Legacy);

        let f1 = seal(&config, "pw", b"same").unwrap();
        let f2 = seal(&config, "pw", b"same").unwrap();

        // Fixed IV and self-salted key: only the padding differs.
        assert_ne!(f1, f2);
        assert_eq!(f1[16..f1.len() - 16], f2[16..f2.len() - 16]);
    }

    #[test]
    fn test_sealed_layout() {
        let config = config(Format::Sealed);
        let e1 = seal(&config, "pw", b"hello").unwrap();
        let e2 = seal(&config, "pw", b"hello").unwrap();

        assert_eq!(e1.len(), 16 + IV_SIZE + 5 + 16);
        assert_ne!(e1[..16 + IV_SIZE], e2[..16 + IV_SIZE]);
        assert_ne!(e1[16 + IV_SIZE..], e2[16 + IV_SIZE..]);
        assert_eq!(open(&config, "pw", &e1).unwrap(), b"hello");
    }

    #[test]
    fn test_formats_do_not_mix() {
        let sealed = seal(&config(Format::Sealed), "pw", b"hello").unwrap();
        assert!(open(&config(Format::Legacy), "pw", &sealed).is_err());
    }

    #[test]
    fn test_cbc_sealed_roundtrip() {
        let config = config(Format::Sealed).with_algorithm(Algorithm::AesCbc);
        let envelope = seal(&config, "pw", b"block cipher text").unwrap();

        assert_eq!(open(&config, "pw", &envelope).unwrap(), b"block cipher text");
    }

    #[test]
    fn test_short_buffer_is_framing_error() {
        let err = open(&config(Format::Legacy), "pw", &[0u8; 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Framing);

        let err = open(&config(Format::Sealed), "pw", &[0u8; 10]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Framing);
    }

    #[test]
    fn test_oversized_salt_is_framing_error() {
        for format in [Format::Legacy, Format::Sealed] {
            let config = config(format).with_salt(usize::MAX);

            assert_eq!(seal(&config, "pw", b"hello").unwrap_err().kind(), ErrorKind::Framing);
            assert_eq!(open(&config, "pw", &[0u8; 64]).unwrap_err().kind(), ErrorKind::Framing);
        }
    }
}
