//! Text encryption service.

use tracing::debug;

use crate::shield::Shield;
use cryptoshield_common::{Error, Operation, Result};

impl Shield {
    /// Encrypt `text` and render the result in the configured encoding.
    ///
    /// # Postconditions
    /// - Decrypting the result with the same secret and configuration
    ///   returns `text`
    ///
    /// # Errors
    /// - Any failure is wrapped under `Operation::EncryptText`
    pub async fn encrypt_text(&self, text: &str, secret: Option<&str>) -> Result<String> {
        self.encrypt_text_inner(text, secret)
            .await
            .map_err(|e| e.within(Operation::EncryptText))
    }

    async fn encrypt_text_inner(&self, text: &str, secret: Option<&str>) -> Result<String> {
        let encoding = self.config().encoding;
        let secret = self.resolve_secret(secret)?;
        let framed = self.seal(text.as_bytes().to_vec(), secret).await?;

        debug!(%encoding, text_len = text.len(), "Text encrypted");
        Ok(encoding.encode(&framed))
    }

    /// Decode `encoded` and decrypt it back to text.
    ///
    /// # Errors
    /// - Any failure is wrapped under `Operation::DecryptText`
    /// - Wrong secret or tampered data under AES-GCM reports a decryption error
    pub async fn decrypt_text(&self, encoded: &str, secret: Option<&str>) -> Result<String> {
        self.decrypt_text_inner(encoded, secret)
            .await
            .map_err(|e| e.within(Operation::DecryptText))
    }

    async fn decrypt_text_inner(&self, encoded: &str, secret: Option<&str>) -> Result<String> {
        let encoding = self.config().encoding;
        let secret = self.resolve_secret(secret)?;
        let framed = encoding.decode(encoded)?;
        let plaintext = self.open(framed, secret).await?;

        debug!(%encoding, text_len = plaintext.len(), "Text decrypted");
        String::from_utf8(plaintext)
            .map_err(|e| Error::Decryption(format!("Plaintext is not valid UTF-8: {}", e)))
    }
}
