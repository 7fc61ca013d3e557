// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Conflux Offline Signer
//!
//! Entry point for the `cfx-signer` binary. Parses CLI arguments, builds an
//! account facade from the configuration file and environment, runs one
//! command, and prints its result on stdout.
//!
//! - `new`             — generate a classical key
//! - `address`         — derive the address of a key
//! - `sign`            — sign a transaction field mapping
//! - `recover`         — recover the signer of raw wire bytes
//! - `decode`          — decode raw wire bytes
//! - `sign-message`    — sign a personal message
//! - `recover-message` — recover the signer of a personal message
//! - `lattice`         — keygen / sign / verify with the lattice primitive

mod cli;
mod logging;

use std::io::Read;
use std::path::Path;

use alloy_primitives::{B256, U256};
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use cfx_account::config::{network_name, AccountConfig, LatticeConfig};
use cfx_account::crypto::{EcdsaSignature, KeyMaterial, LatticeSignature, Signature};
use cfx_account::transaction::{Transaction, TxType};
use cfx_account::Account;

use cli::{Commands, LatticeCommands, MessageArgs, SignerCli};

fn main() -> Result<()> {
    let cli = SignerCli::parse();
    logging::init_logging("cfx_signer=info,cfx_account=warn", cli.log_format);

    let config = build_config(&cli)?;
    let facade = Account::from_config(&config).context("failed to configure account facade")?;

    match cli.command {
        Commands::New => new_account(&facade),
        Commands::Address(args) => show_address(&facade, &args.private_key),
        Commands::Sign(args) => sign(&facade, &args.key.private_key, &args.transaction),
        Commands::Recover(args) => {
            let signer = facade
                .recover_transaction_hex(&args.raw)
                .context("failed to recover transaction signer")?;
            println!("{}", signer);
            Ok(())
        }
        Commands::Decode(args) => decode(&facade, &args.raw),
        Commands::SignMessage(args) => {
            let message = message_bytes(&args.message)?;
            let signed = facade
                .sign_message(&message, &args.key.private_key)
                .context("failed to sign message")?;
            print_json(&signed)
        }
        Commands::RecoverMessage(args) => {
            let message = message_bytes(&args.message)?;
            let signature = EcdsaSignature::from_bytes(&parse_hex("signature", &args.signature)?)
                .context("invalid signature")?;
            let signer = facade
                .recover_message(&message, &Signature::Ecdsa(signature))
                .context("failed to recover message signer")?;
            println!("{}", signer);
            Ok(())
        }
        Commands::Lattice(command) => lattice(&facade, command),
    }
}

/// Loads the configuration file (if any) and applies flag and environment
/// overrides on top of it.
fn build_config(cli: &SignerCli) -> Result<AccountConfig> {
    let mut config = match &cli.config {
        Some(path) => AccountConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AccountConfig::default(),
    };

    if let Some(network_id) = cli.network_id {
        config.default_network_id = Some(network_id);
    }
    if let Some(library) = &cli.lattice_library {
        match config.lattice.as_mut() {
            Some(lattice) => lattice.library_path = library.clone(),
            None => config.lattice = Some(LatticeConfig::dilithium2(library)),
        }
    }

    tracing::debug!(
        network = %config.default_network_id.map(network_name).unwrap_or_default(),
        lattice = config.lattice.is_some(),
        "configuration resolved"
    );
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountOutput {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<String>,
}

impl AccountOutput {
    fn new(address: String, network_id: Option<u64>) -> Self {
        Self {
            address,
            private_key: None,
            network_id,
            network: network_id.map(network_name),
        }
    }
}

fn new_account(facade: &Account) -> Result<()> {
    let account = facade.create().context("failed to create account")?;
    let mut output = AccountOutput::new(account.hex_address(), account.network_id());
    if let KeyMaterial::Secp256k1(key) = account.key() {
        output.private_key = Some(format!("0x{}", hex::encode(key.to_bytes())));
    }
    tracing::info!(address = %output.address, "generated account");
    print_json(&output)
}

fn show_address(facade: &Account, private_key: &str) -> Result<()> {
    let account = facade
        .from_key(private_key, None)
        .context("invalid private key")?;
    print_json(&AccountOutput::new(account.hex_address(), account.network_id()))
}

fn sign(facade: &Account, private_key: &str, transaction: &str) -> Result<()> {
    let text = read_input(transaction)?;
    let fields: serde_json::Value =
        serde_json::from_str(&text).context("transaction is not valid JSON")?;
    let account = facade
        .from_key(private_key, None)
        .context("invalid private key")?;
    let signed = account
        .sign_transaction(&fields)
        .context("failed to sign transaction")?;
    tracing::info!(hash = %signed.hash, from = %account.hex_address(), "signed transaction");
    print_json(&signed)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodeOutput<'a> {
    tx_type: TxType,
    transaction: &'a Transaction,
    from: String,
    hash: B256,
    v: u64,
    r: U256,
    s: U256,
}

fn decode(facade: &Account, raw_hex: &str) -> Result<()> {
    let raw = parse_hex("rawTransaction", raw_hex)?;
    let decoded = facade
        .decode_transaction(&raw)
        .context("failed to decode transaction")?;
    let from = facade
        .recover_transaction(&raw)
        .context("failed to recover transaction signer")?;
    print_json(&DecodeOutput {
        tx_type: decoded.tx_type(),
        transaction: &decoded.transaction,
        from,
        hash: decoded.hash,
        v: decoded.v,
        r: decoded.signature.r,
        s: decoded.signature.s,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LatticeKeygenOutput {
    address: String,
    public_key: String,
    secret_key: String,
}

fn lattice(facade: &Account, command: LatticeCommands) -> Result<()> {
    match command {
        LatticeCommands::Keygen => {
            let account = facade
                .create_lattice()
                .context("failed to generate lattice key pair")?;
            let KeyMaterial::Dilithium(pair) = account.key() else {
                bail!("lattice key generation returned a classical key");
            };
            print_json(&LatticeKeygenOutput {
                address: account.hex_address(),
                public_key: hex::encode(pair.public_key()),
                secret_key: hex::encode(pair.secret_key()),
            })
        }
        LatticeCommands::Sign(args) => {
            let message = message_bytes(&args.message)?;
            let account = facade
                .from_lattice_keys(
                    parse_hex("publicKey", &args.public_key)?,
                    parse_hex("secretKey", &args.secret_key)?,
                    None,
                )
                .context("invalid lattice key pair")?;
            let Signature::Lattice(signature) = account
                .sign_bytes(&message)
                .context("lattice signing failed")?
            else {
                bail!("lattice account produced a classical signature");
            };
            println!("{}", hex::encode(signature.as_bytes()));
            Ok(())
        }
        LatticeCommands::Verify(args) => {
            let message = message_bytes(&args.message)?;
            let public_key = parse_hex("publicKey", &args.public_key)?;
            let signature = LatticeSignature::new(parse_hex("signature", &args.signature)?);
            let valid = facade
                .engine()
                .lattice()?
                .verify(&message, &signature, &public_key)
                .context("lattice verification failed")?;
            println!("{}", valid);
            Ok(())
        }
    }
}

/// Resolves a command-line payload: `-` reads stdin, `@path` reads a file,
/// anything else is taken literally.
fn read_input(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("failed to read {}", path))
    } else {
        Ok(arg.to_string())
    }
}

fn message_bytes(args: &MessageArgs) -> Result<Vec<u8>> {
    if args.hex {
        parse_hex("message", &args.message)
    } else {
        Ok(args.message.as_bytes().to_vec())
    }
}

fn parse_hex(field: &str, text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).with_context(|| format!("{} is not valid hex", field))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
