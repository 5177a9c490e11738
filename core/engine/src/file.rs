//! File encryption service.
//!
//! Files are processed whole: the full content is read into memory,
//! transformed, then written back in one call.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::shield::Shield;
use cryptoshield_common::{Error, Operation, Result};

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).await.map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })
}

impl Shield {
    /// Encrypt the file at `input`.
    ///
    /// # Postconditions
    /// - The framed ciphertext is written to `output`, or over `input` when
    ///   no output is given
    ///
    /// # Errors
    /// - Any failure is wrapped under `Operation::EncryptFile`
    pub async fn encrypt_file(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        secret: Option<&str>,
    ) -> Result<bool> {
        let input = input.as_ref();
        self.encrypt_file_inner(input, output.unwrap_or(input), secret)
            .await
            .map_err(|e| e.within(Operation::EncryptFile))
    }

    /// Decrypt the file at `encrypted`.
    ///
    /// # Postconditions
    /// - The plaintext is written to `output`, or over `encrypted` when no
    ///   output is given
    ///
    /// # Errors
    /// - Any failure is wrapped under `Operation::DecryptFile`
    /// - Nothing is written when decryption fails
    pub async fn decrypt_file(
        &self,
        encrypted: impl AsRef<Path>,
        output: Option<&Path>,
        secret: Option<&str>,
    ) -> Result<bool> {
        let encrypted = encrypted.as_ref();
        self.decrypt_file_inner(encrypted, output.unwrap_or(encrypted), secret)
            .await
            .map_err(|e| e.within(Operation::DecryptFile))
    }

    async fn encrypt_file_inner(&self, input: &Path, output: &Path, secret: Option<&str>) -> Result<bool> {
        debug!(input = %input.display(), "Encrypting file");

        let secret = self.resolve_secret(secret)?;
        let plaintext = read_file(input).await?;
        let size = plaintext.len();
        let framed = self.seal(plaintext, secret).await?;
        write_file(output, &framed).await?;

        info!(output = %output.display(), size, "File encrypted");
        Ok(true)
    }

    async fn decrypt_file_inner(&self, input: &Path, output: &Path, secret: Option<&str>) -> Result<bool> {
        debug!(input = %input.display(), "Decrypting file");

        let secret = self.resolve_secret(secret)?;
        let framed = read_file(input).await?;
        let plaintext = Zeroizing::new(self.open(framed, secret).await?);
        write_file(output, &plaintext).await?;

        info!(output = %output.display(), size = plaintext.len(), "File decrypted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Format, ShieldConfig};
    use crate::shield::Shield;
    use cryptoshield_common::{Algorithm, ErrorKind, KeyLength, Operation};
    use tempfile::TempDir;

    const SECRET: &str = "correct-horse-battery-staple";

    #[tokio::test]
    async fn test_encrypt_file_in_place() {
        for format in [Format::Sealed, Format::Legacy] {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("plain.txt");
            std::fs::write(&path, b"Hello, file!").unwrap();

            let shield = Shield::new(ShieldConfig::new().with_format(format));

            assert!(shield.encrypt_file(&path, None, Some(SECRET)).await.unwrap());
            let encrypted = std::fs::read(&path).unwrap();
            assert_ne!(encrypted, b"Hello, file!");
            assert_eq!(encrypted.len(), 12 + 16 + 32);

            assert!(shield.decrypt_file(&path, None, Some(SECRET)).await.unwrap());
            assert_eq!(std::fs::read(&path).unwrap(), b"Hello, file!");
        }
    }

    #[tokio::test]
    async fn test_encrypt_file_to_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.bin");
        let sealed = temp.path().join("input.bin.enc");
        let restored = temp.path().join("restored.bin");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&input, &content).unwrap();

        let shield = Shield::new(ShieldConfig::new().with_secret_key(SECRET));

        shield.encrypt_file(&input, Some(sealed.as_path()), None).await.unwrap();
        shield.decrypt_file(&sealed, Some(restored.as_path()), None).await.unwrap();

        assert_eq!(std::fs::read(&input).unwrap(), content);
        assert_eq!(std::fs::read(&restored).unwrap(), content);
    }

    #[tokio::test]
    async fn test_empty_file_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        let mut shield = Shield::default();
        shield.set_algorithm(Algorithm::AesCbc, KeyLength::Bits128);

        shield.encrypt_file(&path, None, Some(SECRET)).await.unwrap();
        shield.decrypt_file(&path, None, Some(SECRET)).await.unwrap();

        assert!(std::fs::read(&path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_fails_with_io() {
        let temp = TempDir::new().unwrap();
        let shield = Shield::default();

        let err = shield
            .encrypt_file(temp.path().join("missing.txt"), None, Some(SECRET))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileIo);
        assert_eq!(err.operation(), Some(Operation::EncryptFile));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_blank_secret_checked_before_reading() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.txt");
        let shield = Shield::default();

        let err = shield.encrypt_file(&missing, None, Some("  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSecretKey);
        assert_eq!(err.operation(), Some(Operation::EncryptFile));

        let err = shield.decrypt_file(&missing, None, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSecretKey);
        assert_eq!(err.operation(), Some(Operation::DecryptFile));
    }

    #[tokio::test]
    async fn test_tampered_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.txt");
        std::fs::write(&path, b"integrity matters").unwrap();

        let shield = Shield::default();
        shield.encrypt_file(&path, None, Some(SECRET)).await.unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[35] ^= 0x80;
        std::fs::write(&path, &bytes).unwrap();

        let err = shield.decrypt_file(&path, None, Some(SECRET)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
        assert_eq!(err.operation(), Some(Operation::DecryptFile));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_wrong_secret_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.txt");
        std::fs::write(&path, b"secret contents").unwrap();

        let shield = Shield::new(ShieldConfig::new().with_format(Format::Legacy));
        shield.encrypt_file(&path, None, Some("P1-secret")).await.unwrap();

        let err = shield.decrypt_file(&path, None, Some("P2-secret")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }
}
