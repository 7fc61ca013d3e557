//! # CLI Interface
//!
//! Defines the command-line argument structure for `cfx-signer` using
//! `clap` derive. Everything runs offline: keys come in through flags or
//! the environment, results go to stdout as JSON or plain hex.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Offline Conflux account signer.
///
/// Derives addresses, signs transactions and personal messages, recovers
/// signers from raw transactions, and drives the post-quantum lattice
/// primitive when one is configured.
#[derive(Parser, Debug)]
#[command(
    name = "cfx-signer",
    about = "Offline Conflux account signer",
    version,
    propagate_version = true
)]
pub struct SignerCli {
    /// Path to an account configuration file (JSON).
    #[arg(long, short = 'c', env = "CFX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Network id new accounts are bound to. Overrides the configuration file.
    #[arg(long, env = "CFX_NETWORK_ID", global = true)]
    pub network_id: Option<u64>,

    /// Shared library exporting the Dilithium2 reference API.
    /// Overrides the configuration file.
    #[arg(long, env = "CFX_LATTICE_LIBRARY", global = true)]
    pub lattice_library: Option<PathBuf>,

    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh secp256k1 key and print it with its address.
    New,
    /// Print the address of a private key.
    Address(KeyArgs),
    /// Sign a transaction given as a JSON field mapping.
    Sign(SignArgs),
    /// Recover the signer of a raw signed transaction.
    Recover(RawArgs),
    /// Decode a raw signed transaction into its fields.
    Decode(RawArgs),
    /// Sign a personal message.
    SignMessage(SignMessageArgs),
    /// Recover the signer of a personal message.
    RecoverMessage(RecoverMessageArgs),
    /// Post-quantum lattice operations. Requires a lattice library.
    #[command(subcommand)]
    Lattice(LatticeCommands),
}

/// A secp256k1 private key.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Hex-encoded private key, with or without `0x`.
    ///
    /// Prefer the environment variable over the flag; flags end up in shell
    /// history.
    #[arg(long, env = "CFX_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

/// Arguments for `sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// The transaction: inline JSON, `@path` to read a file, or `-` for stdin.
    pub transaction: String,
}

/// A raw signed transaction.
#[derive(Args, Debug)]
pub struct RawArgs {
    /// `0x`-prefixed (or bare) hex of the signed wire bytes.
    pub raw: String,
}

/// How a message argument is interpreted.
#[derive(Args, Debug)]
pub struct MessageArgs {
    /// The message.
    pub message: String,

    /// Treat the message as hex bytes instead of UTF-8 text.
    #[arg(long)]
    pub hex: bool,
}

/// Arguments for `sign-message`.
#[derive(Args, Debug)]
pub struct SignMessageArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub message: MessageArgs,
}

/// Arguments for `recover-message`.
#[derive(Args, Debug)]
pub struct RecoverMessageArgs {
    #[command(flatten)]
    pub message: MessageArgs,

    /// The 65-byte `r ‖ s ‖ v` signature in hex.
    #[arg(long)]
    pub signature: String,
}

/// Lattice subcommands.
#[derive(Subcommand, Debug)]
pub enum LatticeCommands {
    /// Generate a key pair and print both halves with the derived address.
    Keygen,
    /// Sign a message with a lattice key pair.
    Sign(LatticeSignArgs),
    /// Verify a lattice signature.
    Verify(LatticeVerifyArgs),
}

/// Arguments for `lattice sign`.
#[derive(Args, Debug)]
pub struct LatticeSignArgs {
    /// Hex-encoded public key.
    #[arg(long)]
    pub public_key: String,

    /// Hex-encoded secret key.
    #[arg(long)]
    pub secret_key: String,

    #[command(flatten)]
    pub message: MessageArgs,
}

/// Arguments for `lattice verify`.
#[derive(Args, Debug)]
pub struct LatticeVerifyArgs {
    /// Hex-encoded public key.
    #[arg(long)]
    pub public_key: String,

    /// Hex-encoded signature.
    #[arg(long)]
    pub signature: String,

    #[command(flatten)]
    pub message: MessageArgs,
}
