//! CryptoShield CLI - passphrase encryption for text and files.
//!
//! This tool wraps the encryption engine: strings are printed in the
//! configured encoding, files are rewritten in place or to an output path.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use cryptoshield_common::{Algorithm, KeyLength, TagLength};
use cryptoshield_engine::{Encoding, Format, Shield, ShieldConfig};

#[derive(Parser)]
#[command(name = "cryptoshield")]
#[command(about = "CryptoShield - Passphrase-based AES encryption for text and files")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file. Flags override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: CipherOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CipherOptions {
    /// Cipher mode: AES-GCM or AES-CBC.
    #[arg(short, long, global = true)]
    algorithm: Option<Algorithm>,

    /// Key size in bits: 128, 192 or 256.
    #[arg(short, long, global = true)]
    key_length: Option<KeyLength>,

    /// GCM tag size in bits: 32, 64 or 128.
    #[arg(long, global = true)]
    tag_length: Option<TagLength>,

    /// Text encoding: hex, base64 or base64url.
    #[arg(short, long, global = true)]
    encoding: Option<Encoding>,

    /// PBKDF2 iteration count.
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Salt / padding length in bytes.
    #[arg(long, global = true)]
    salt: Option<usize>,

    /// Read and write the legacy padded format.
    #[arg(long, global = true)]
    legacy: bool,

    /// Passphrase. Prompted for when neither this nor the config provides one.
    #[arg(short, long, global = true, env = "CRYPTOSHIELD_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a string and print it in the configured encoding.
    EncryptText {
        /// Text to encrypt. Read from stdin when omitted.
        text: Option<String>,
    },

    /// Decrypt an encoded string and print the plaintext.
    DecryptText {
        /// Encoded ciphertext. Read from stdin when omitted.
        text: Option<String>,
    },

    /// Encrypt a file.
    EncryptFile {
        /// File to encrypt.
        input: PathBuf,

        /// Destination (default: overwrite the input).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a file.
    DecryptFile {
        /// Encrypted file.
        input: PathBuf,

        /// Destination (default: overwrite the input).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON.
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref(), &cli.options)?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::EncryptText { text } => cmd_encrypt_text(config, text).await,
        Commands::DecryptText { text } => cmd_decrypt_text(config, text).await,
        Commands::EncryptFile { input, output } => {
            cmd_encrypt_file(config, &input, output.as_deref()).await
        }
        Commands::DecryptFile { input, output } => {
            cmd_decrypt_file(config, &input, output.as_deref()).await
        }
        Commands::ShowConfig => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

/// Build the configuration from an optional file and the command-line flags.
fn load_config(path: Option<&Path>, options: &CipherOptions) -> Result<ShieldConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ShieldConfig::from_json(&json).context("Invalid configuration file")?
        }
        None => ShieldConfig::default(),
    };

    if let Some(algorithm) = options.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(key_length) = options.key_length {
        config.key_length = key_length;
    }
    if let Some(tag_length) = options.tag_length {
        config.tag_length = tag_length;
    }
    if let Some(encoding) = options.encoding {
        config.encoding = encoding;
    }
    if let Some(iterations) = options.iterations {
        config.iterations = iterations;
    }
    if let Some(salt) = options.salt {
        config.salt = salt;
    }
    if options.legacy {
        config.format = Format::Legacy;
    }
    if let Some(secret) = &options.secret {
        config.set_secret_key(secret);
    }

    Ok(config)
}

/// Build the engine, prompting for a passphrase if none is configured.
fn shield_with_secret(mut config: ShieldConfig) -> Result<Shield> {
    if config.secret_key.is_empty() {
        let secret = Zeroizing::new(
            rpassword::prompt_password("Enter passphrase: ").context("Failed to read passphrase")?,
        );
        if secret.trim().is_empty() {
            anyhow::bail!("Passphrase cannot be empty");
        }
        config.set_secret_key(&secret);
    }
    Ok(Shield::new(config))
}

/// Use the argument, or read all of stdin.
fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

async fn cmd_encrypt_text(config: ShieldConfig, text: Option<String>) -> Result<()> {
    let text = Zeroizing::new(text_or_stdin(text)?);
    let shield = shield_with_secret(config)?;

    let encrypted = shield.encrypt_text(&text, None).await?;
    println!("{}", encrypted);
    Ok(())
}

async fn cmd_decrypt_text(config: ShieldConfig, text: Option<String>) -> Result<()> {
    let encoded = text_or_stdin(text)?;
    let shield = shield_with_secret(config)?;

    let decrypted = Zeroizing::new(shield.decrypt_text(encoded.trim(), None).await?);
    println!("{}", decrypted.as_str());
    Ok(())
}

async fn cmd_encrypt_file(config: ShieldConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let shield = shield_with_secret(config)?;

    shield.encrypt_file(input, output, None).await?;

    println!("Encrypted: {}", output.unwrap_or(input).display());
    Ok(())
}

async fn cmd_decrypt_file(config: ShieldConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let shield = shield_with_secret(config)?;

    shield.decrypt_file(input, output, None).await?;

    println!("Decrypted: {}", output.unwrap_or(input).display());
    Ok(())
}
