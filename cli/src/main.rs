// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # tx
//!
//! Entry point for the `tx` binary. Parses CLI arguments, initializes
//! logging, then runs one pipeline and exits.
//!
//! - `payment` — build, sign and emit a Payment
//! - `trust`   — build, sign and emit a TrustSet
//! - `submit`  — read a signed transaction from stdin and emit or submit it
//! - `keys`    — show the account behind a seed, or generate a seed
//!
//! Any failure exits non-zero with the error category in the message.

mod cli;
mod logging;

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;

use ripple_tx::config::SigningConfig;
use ripple_tx::crypto::{Algorithm, KeyPair, Seed};
use ripple_tx::transaction::{
    decode_signed, read_encoded, sign_with_config, OutputRouter, SignedTransaction,
    WebSocketSubmitter,
};
use ripple_tx::TxError;

use cli::{Commands, KeysArgs, TxCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TxCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    let config = stage(cli.signing_config(), "reading options")?;
    tracing::debug!(
        sequence = config.sequence,
        fee = config.fee_drops(),
        output = %config.output,
        submit = config.submit,
        "configuration resolved"
    );

    match &cli.command {
        Commands::Payment(args) => {
            let tx = stage(args.builder().build(), "building payment")?;
            let signed = stage(sign_with_config(tx, &config), "signing")?;
            emit(&signed, &config).await
        }
        Commands::Trust(args) => {
            let tx = stage(args.builder().build(), "building trust set")?;
            let signed = stage(sign_with_config(tx, &config), "signing")?;
            emit(&signed, &config).await
        }
        Commands::Submit => {
            let mut input = Vec::new();
            io::stdin()
                .read_to_end(&mut input)
                .context("failed to read transaction from stdin")?;
            let bytes = stage(read_encoded(&input), "reading input")?;
            let signed = stage(decode_signed(&bytes), "decoding input")?;
            emit(&signed, &config).await
        }
        Commands::Keys(args) => show_keys(args, &cli, &config),
    }
}

/// Writes the configured representations to stdout and, if asked, submits.
async fn emit(signed: &SignedTransaction, config: &SigningConfig) -> Result<()> {
    let submitter = WebSocketSubmitter::from_config(config);
    let router = OutputRouter::from_config(config, &submitter);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let routed = stage(router.route(signed, &mut out).await, "writing output")?;
    let (encoded, verdict) = stage(routed.into_result(), "submitting")?;

    match verdict {
        Some(result) => {
            tracing::info!(hash = %encoded.hash_hex(), %result, "transaction submitted")
        }
        None => tracing::info!(hash = %encoded.hash_hex(), "transaction emitted"),
    }
    Ok(())
}

/// Prints the account derived from `--seed`, or from a freshly generated seed.
fn show_keys(args: &KeysArgs, cli: &TxCli, config: &SigningConfig) -> Result<()> {
    let (seed, generated) = if args.generate {
        let algorithm = config.algorithm.unwrap_or(Algorithm::Secp256k1);
        (Seed::generate(algorithm), true)
    } else {
        let seed = config.seed.clone().ok_or(TxError::MissingSeed);
        (stage(seed, "deriving keys")?, false)
    };
    let algorithm = config.algorithm.unwrap_or_else(|| seed.algorithm());
    let keypair = stage(
        KeyPair::derive(&seed, config.account_index, algorithm),
        "deriving keys",
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let mut doc = serde_json::json!({
            "account": keypair.account_id().to_string(),
            "algorithm": keypair.algorithm().name(),
            "public_key": keypair.public_key_hex(),
            "public_key_base58": keypair.public_key_base58(),
        });
        if generated {
            doc["seed"] = serde_json::Value::String(seed.to_base58());
        }
        writeln!(out, "{doc}")?;
    } else {
        if generated {
            writeln!(out, "Seed: {}", seed.to_base58())?;
        }
        writeln!(out, "Account: {}", keypair.account_id())?;
        writeln!(out, "Algorithm: {}", keypair.algorithm())?;
        writeln!(out, "PublicKey: {}", keypair.public_key_hex())?;
        writeln!(out, "PublicKeyBase58: {}", keypair.public_key_base58())?;
    }
    out.flush()?;
    Ok(())
}

/// Attaches the error category and the failing stage to a library error.
fn stage<T>(result: ripple_tx::Result<T>, what: &str) -> Result<T> {
    result.map_err(|err| {
        let kind = err.kind();
        anyhow::Error::new(err).context(format!("{kind} while {what}"))
    })
}
