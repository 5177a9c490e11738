//! Engine instance shared by the text and file services.

use tokio::task;
use zeroize::Zeroizing;

use crate::config::ShieldConfig;
use crate::pipeline;
use cryptoshield_common::{Algorithm, Error, KeyLength, Result};

/// Symmetric encryption engine.
///
/// Operations take `&self` and may run concurrently. Reconfiguration takes
/// `&mut self`, so it cannot overlap an operation borrowed from the same
/// instance. Each operation works on a snapshot of the configuration taken
/// when it starts.
#[derive(Debug, Clone, Default)]
pub struct Shield {
    config: ShieldConfig,
}

impl Shield {
    pub fn new(config: ShieldConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    /// Replace the stored secret. Whitespace is trimmed.
    pub fn set_secret_key(&mut self, secret: &str) {
        self.config.set_secret_key(secret);
    }

    /// Update algorithm and key length together.
    pub fn set_algorithm(&mut self, algorithm: Algorithm, key_length: KeyLength) {
        self.config.set_algorithm(algorithm, key_length);
    }

    /// Pick the per-call secret, falling back to the stored one.
    ///
    /// # Errors
    /// - Returns error if the chosen secret is blank
    pub(crate) fn resolve_secret(&self, secret: Option<&str>) -> Result<Zeroizing<String>> {
        pipeline::resolve_secret(&self.config.secret_key, secret).map(Zeroizing::new)
    }

    /// Encrypt and frame `plaintext` on a blocking worker.
    pub(crate) async fn seal(&self, plaintext: Vec<u8>, secret: Zeroizing<String>) -> Result<Vec<u8>> {
        let config = self.config.clone();
        let plaintext = Zeroizing::new(plaintext);

        task::spawn_blocking(move || pipeline::seal(&config, &secret, &plaintext))
            .await
            .map_err(|e| Error::Encryption(format!("Cipher task failed: {}", e)))?
    }

    /// Deframe and decrypt `framed` on a blocking worker.
    pub(crate) async fn open(&self, framed: Vec<u8>, secret: Zeroizing<String>) -> Result<Vec<u8>> {
        let config = self.config.clone();

        task::spawn_blocking(move || pipeline::open(&config, &secret, &framed))
            .await
            .map_err(|e| Error::Decryption(format!("Cipher task failed: {}", e)))?
    }
}
