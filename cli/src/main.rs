//! owo: OwO1 encryption tool.
//!
//! Essentially a NaCl sealed box with chunk support. Files are encrypted for a
//! recipient public key; decryption reads the private key from `PRIVATE_KEY`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use owo_core::crypto::{decode_key_b64, encode_key_b64, open_message_with_public_key, seal_message, KeyPair};
use owo_core::headers::ChunkSize;
use owo_core::stream::{decrypt_file, encrypt_file, encrypt_file_with_chunk_size};
use owo_core::telemetry::TelemetrySnapshot;

/// OwO1 Encryption Standard. Essentially NaCl box with chunk support.
#[derive(Parser, Debug)]
#[command(name = "owo")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "OWO_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log format
    #[arg(long, global = true, env = "OWO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    /// Print the telemetry snapshot of file commands as JSON
    #[arg(long, global = true)]
    stats: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate public and private key, then print them (base64)
    Genkey,

    /// Encrypt a file with a public key, saving to <filepath>.enc
    EncryptFile {
        /// Recipient public key (base64)
        publickey: String,

        filepath: PathBuf,

        /// Plaintext bytes per chunk (default: file size, capped at 128 MiB)
        #[arg(long, value_parser = parse_chunk_size)]
        chunk_size: Option<ChunkSize>,
    },

    /// Decrypt a file, saving to <filepath>.dec
    DecryptFile {
        /// Recipient public key (base64)
        publickey: String,

        filepath: PathBuf,

        /// Private key (base64)
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },

    /// Encrypt a message with a public key and print it (base64)
    EncryptNacl {
        /// Recipient public key (base64)
        publickey: String,

        message: String,
    },

    /// Decrypt an anonymous NaCl box message (base64) and print it
    DecryptNacl {
        /// Recipient public key (base64)
        publickey: String,

        /// Sealed message (base64)
        message: String,

        /// Private key (base64)
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
}

fn parse_chunk_size(s: &str) -> Result<ChunkSize, String> {
    let raw: u32 = s.parse().map_err(|e| format!("{e}"))?;
    ChunkSize::new(raw).map_err(|e| e.to_string())
}

fn setup_logging(log_level: &str, log_format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    match log_format {
        LogFormat::Json => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
        LogFormat::Plain => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
    }

    Ok(())
}

fn decode_key(text: &str, what: &str) -> Result<[u8; 32]> {
    decode_key_b64(text).with_context(|| format!("invalid {what}"))
}

/// `<path>.<ext>`, keeping any extension the input already has.
fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn print_stats(out: &mut dyn Write, snapshot: &TelemetrySnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize stats")?;
    writeln!(out, "{json}")?;
    Ok(())
}

fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Commands::Genkey => {
            let keys = KeyPair::generate();
            writeln!(out, "Public Key (Base64):")?;
            writeln!(out, "{}", encode_key_b64(&keys.public_bytes()))?;
            writeln!(out, "Private Key (Base64):")?;
            writeln!(out, "{}", encode_key_b64(&keys.secret_bytes()))?;
        }

        Commands::EncryptFile { publickey, filepath, chunk_size } => {
            let public_key = decode_key(publickey, "public key")?;
            let out_path = with_suffix(filepath, "enc");
            info!(input = %filepath.display(), output = %out_path.display(), "encrypting file");

            let snapshot = match chunk_size {
                Some(cs) => encrypt_file_with_chunk_size(filepath, &out_path, &public_key, *cs),
                None => encrypt_file(filepath, &out_path, &public_key),
            }
            .with_context(|| format!("Failed to encrypt {}", filepath.display()))?;

            writeln!(out, "File encrypted and saved to {}", out_path.display())?;
            if cli.stats {
                print_stats(out, &snapshot)?;
            }
        }

        Commands::DecryptFile { publickey, filepath, private_key } => {
            let public_key = decode_key(publickey, "public key")?;
            let private_key = decode_key(private_key, "PRIVATE_KEY")?;
            let out_path = with_suffix(filepath, "dec");
            info!(input = %filepath.display(), output = %out_path.display(), "decrypting file");

            let snapshot = decrypt_file(filepath, &out_path, &private_key, Some(&public_key[..]))
                .with_context(|| format!("Failed to decrypt {}", filepath.display()))?;

            writeln!(out, "File decrypted and saved to {}", out_path.display())?;
            if cli.stats {
                print_stats(out, &snapshot)?;
            }
        }

        Commands::EncryptNacl { publickey, message } => {
            let public_key = decode_key(publickey, "public key")?;
            let sealed = seal_message(&public_key, message.as_bytes())?;
            writeln!(out, "Encrypted message (Base64):")?;
            writeln!(out, "{}", STANDARD.encode(sealed))?;
        }

        Commands::DecryptNacl { publickey, message, private_key } => {
            let public_key = decode_key(publickey, "public key")?;
            let private_key = decode_key(private_key, "PRIVATE_KEY")?;
            let sealed = STANDARD
                .decode(message.trim())
                .context("message is not valid base64")?;
            if sealed.is_empty() {
                bail!("message is empty");
            }

            let plain = open_message_with_public_key(&public_key, &private_key, &sealed)
                .context("Failed to decrypt message")?;
            match String::from_utf8(plain) {
                Ok(text) => {
                    writeln!(out, "Message:")?;
                    writeln!(out, "{text}")?;
                }
                Err(e) => {
                    debug!("plaintext is not UTF-8, printing base64");
                    writeln!(out, "Message (Base64):")?;
                    writeln!(out, "{}", STANDARD.encode(e.into_bytes()))?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli.log_level, cli.log_format) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
