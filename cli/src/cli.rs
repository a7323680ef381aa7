//! # CLI Interface
//!
//! Defines the command-line argument structure for `tx` using `clap`
//! derive. Global options configure keys, sequencing and output; the
//! subcommands `payment`, `trust`, `submit` and `keys` pick the pipeline.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use ripple_tx::config::{OutputMode, SigningConfig, DEFAULT_SUBMIT_ENDPOINT};
use ripple_tx::crypto::{Algorithm, Seed};
use ripple_tx::transaction::{PaymentBuilder, TransactionBuilder, TrustSetBuilder};
use ripple_tx::TxError;

/// Create a Ripple transaction.
///
/// Sequence and seed must be specified for every command that signs.
#[derive(Parser, Debug)]
#[command(name = "tx", version, propagate_version = true)]
pub struct TxCli {
    /// The seed for the submitting account.
    #[arg(long, short = 's', env = "TX_SEED", global = true, hide_env_values = true)]
    pub seed: Option<String>,

    /// The fee you want to pay, in drops.
    #[arg(long, short = 'f', env = "TX_FEE", global = true)]
    pub fee: Option<u64>,

    /// The sequence for the transaction.
    #[arg(long, short = 'q', env = "TX_SEQUENCE", global = true, default_value_t = 0)]
    pub sequence: u32,

    /// Highest ledger number that the transaction can appear in.
    #[arg(long, short = 'l', env = "TX_LAST_LEDGER", global = true, default_value_t = 0)]
    pub lastledger: u32,

    /// Signing algorithm: secp256k1 or ed25519. Inferred from the seed if
    /// omitted.
    #[arg(long, env = "TX_ALGORITHM", global = true)]
    pub algorithm: Option<String>,

    /// Account index for secp256k1 key derivation.
    #[arg(long, env = "TX_ACCOUNT_INDEX", global = true, default_value_t = 0)]
    pub index: u32,

    /// Source tag to stamp on the transaction.
    #[arg(long, global = true)]
    pub source_tag: Option<u32>,

    /// Submits the transaction via websocket.
    #[arg(long, short = 't', global = true)]
    pub submit: bool,

    /// Raw output in binary.
    #[arg(long, short = 'b', global = true)]
    pub binary: bool,

    /// Output only the resulting JSON.
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Websocket endpoint used by --submit.
    #[arg(long, env = "TX_ENDPOINT", global = true, default_value = DEFAULT_SUBMIT_ENDPOINT)]
    pub endpoint: String,

    /// Seconds to wait for a submission reply.
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log format: pretty or json.
    #[arg(long, env = "TX_LOG_FORMAT", global = true, default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a payment.
    Payment(PaymentArgs),
    /// Create or modify a trust line.
    Trust(TrustArgs),
    /// Re-emit or re-submit a signed transaction read from stdin (binary or hex).
    Submit,
    /// Show the account derived from the seed, or generate a new seed.
    Keys(KeysArgs),
}

/// Arguments for the `payment` subcommand.
#[derive(Args, Debug)]
pub struct PaymentArgs {
    /// Destination account.
    #[arg(long, short = 'd', default_value = "")]
    pub dest: String,

    /// Amount to send: `1.5` (native) or `value/CUR/issuer`.
    #[arg(long, short = 'a', default_value = "")]
    pub amount: String,

    /// Destination tag.
    #[arg(long)]
    pub tag: Option<u32>,

    /// Invoice id (will be passed through SHA512Half).
    #[arg(long, short = 'i')]
    pub invoice: Option<String>,

    /// Paths, e.g. `rAccount=>USD/rIssuer,EUR`.
    #[arg(long)]
    pub paths: Option<String>,

    /// Maximum to send.
    #[arg(long, short = 'm')]
    pub sendmax: Option<String>,

    /// Do not look for direct path.
    #[arg(long, short = 'r')]
    pub nodirect: bool,

    /// Permit partial payment.
    #[arg(long, short = 'p')]
    pub partial: bool,

    /// Limit quality.
    #[arg(long)]
    pub limit: bool,
}

impl PaymentArgs {
    pub fn builder(&self) -> PaymentBuilder {
        let mut builder = TransactionBuilder::payment()
            .destination(self.dest.as_str())
            .amount(self.amount.as_str());
        if let Some(tag) = self.tag {
            builder = builder.destination_tag(tag);
        }
        if let Some(invoice) = &self.invoice {
            builder = builder.invoice(invoice);
        }
        if let Some(paths) = &self.paths {
            builder = builder.paths(paths.as_str());
        }
        if let Some(sendmax) = &self.sendmax {
            builder = builder.send_max(sendmax.as_str());
        }
        for (selected, name) in [
            (self.nodirect, "nodirect"),
            (self.partial, "partial"),
            (self.limit, "limit"),
        ] {
            if selected {
                builder = builder.option(name);
            }
        }
        builder
    }
}

/// Arguments for the `trust` subcommand.
#[derive(Args, Debug)]
pub struct TrustArgs {
    /// Trust limit as `value/CUR/issuer`.
    #[arg(long, short = 'a', default_value = "")]
    pub amount: String,

    /// > 1.0 to charge a fee.
    #[arg(long, default_value_t = 1.0)]
    pub quality_out: f64,

    /// < 1.0 to charge a fee.
    #[arg(long, short = 'Q', default_value_t = 1.0)]
    pub quality_in: f64,

    /// SetAuth.
    #[arg(long, short = 'A')]
    pub auth: bool,

    /// No rippling on this trust line.
    #[arg(long, short = 'n')]
    pub noripple: bool,

    /// Re-enable rippling on this trust line.
    #[arg(long, short = 'N')]
    pub clear_noripple: bool,

    /// Freeze this trust line.
    #[arg(long)]
    pub freeze: bool,

    /// Unfreeze this trust line.
    #[arg(long, short = 'F')]
    pub clear_freeze: bool,
}

impl TrustArgs {
    pub fn builder(&self) -> TrustSetBuilder {
        let mut builder = TransactionBuilder::trust_set()
            .limit(self.amount.as_str())
            .quality_in(self.quality_in)
            .quality_out(self.quality_out);
        for (selected, name) in [
            (self.auth, "auth"),
            (self.noripple, "noripple"),
            (self.clear_noripple, "clear-noripple"),
            (self.freeze, "freeze"),
            (self.clear_freeze, "clear-freeze"),
        ] {
            if selected {
                builder = builder.option(name);
            }
        }
        builder
    }
}

/// Arguments for the `keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Generate a fresh random seed instead of reading --seed.
    #[arg(long, short = 'g')]
    pub generate: bool,
}

impl TxCli {
    /// The explicit per-invocation configuration.
    ///
    /// A missing seed is not an error here; stages that need one fail with
    /// `MissingSeed` when they run.
    pub fn signing_config(&self) -> Result<SigningConfig, TxError> {
        let seed = self
            .seed
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(str::parse::<Seed>)
            .transpose()?;
        let algorithm = self
            .algorithm
            .as_deref()
            .map(str::parse::<Algorithm>)
            .transpose()?;
        Ok(SigningConfig {
            seed,
            algorithm,
            account_index: self.index,
            sequence: self.sequence,
            fee: self.fee,
            last_ledger_sequence: Some(self.lastledger),
            source_tag: self.source_tag,
            output: OutputMode::from_switches(self.binary, self.json),
            submit: self.submit,
            endpoint: self.endpoint.clone(),
            submit_timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ripple_tx::transaction::{TransactionKind, TrustSet};

    #[test]
    fn verify_cli_structure() {
        TxCli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = TxCli::try_parse_from([
            "tx", "payment", "-d", "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe", "-a", "1", "-q", "7",
            "-f", "12", "-j", "--partial",
        ])
        .unwrap();
        let config = cli.signing_config().unwrap();
        assert_eq!(config.sequence, 7);
        assert_eq!(config.fee_drops(), 12);
        assert_eq!(config.output, OutputMode::Json);
        assert_eq!(config.expiry(), None);

        let Commands::Payment(args) = &cli.command else {
            panic!("expected payment");
        };
        let tx = args.builder().build().unwrap();
        assert_eq!(tx.base.flags, Some(0x0002_0000));
    }

    #[test]
    fn trust_defaults_quality_to_one() {
        let cli = TxCli::try_parse_from([
            "tx",
            "trust",
            "-a",
            "100/USD/rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "--freeze",
        ])
        .unwrap();
        let Commands::Trust(args) = &cli.command else {
            panic!("expected trust");
        };
        let tx = args.builder().build().unwrap();
        let TransactionKind::TrustSet(TrustSet {
            quality_in,
            quality_out,
            ..
        }) = tx.kind
        else {
            panic!("expected a trust set");
        };
        assert_eq!(quality_in, Some(1_000_000_000));
        assert_eq!(quality_out, Some(1_000_000_000));
        assert_eq!(tx.base.flags, Some(0x0010_0000));
    }

    #[test]
    fn bad_seed_and_algorithm_fail_configuration() {
        let cli = TxCli::try_parse_from(["tx", "-s", "sNotASeed", "submit"]).unwrap();
        assert!(matches!(cli.signing_config(), Err(TxError::InvalidSeed(_))));

        let cli = TxCli::try_parse_from(["tx", "--algorithm", "rsa", "submit"]).unwrap();
        assert!(matches!(
            cli.signing_config(),
            Err(TxError::UnsupportedAlgorithm(_))
        ));
    }
}
