//! # Protocol Constants & Per-Invocation Configuration
//!
//! Every magic number the ledger mandates lives here. These values are fixed
//! by the network: a transaction signed with a different prefix or version
//! byte is not "slightly off", it is silently rejected by validators.
//!
//! The second half of the file holds [`SigningConfig`], the explicit
//! configuration object built once per invocation and handed to the signer
//! and output router by reference.

use std::fmt;
use std::time::Duration;

use crate::crypto::keys::{Algorithm, KeyPair, Seed};
use crate::error::TxError;

// ---------------------------------------------------------------------------
// Hash Prefixes
// ---------------------------------------------------------------------------

/// Prefix of the single-signer signing payload: `"STX\0"`.
pub const HASH_PREFIX_TX_SIGN: [u8; 4] = [0x53, 0x54, 0x58, 0x00];

/// Prefix hashed in front of a signed blob to get its transaction id: `"TXN\0"`.
pub const HASH_PREFIX_TX_ID: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

// ---------------------------------------------------------------------------
// Base58 Version Bytes
// ---------------------------------------------------------------------------

/// Version byte of an account address (`r...`).
pub const ACCOUNT_ID_VERSION: u8 = 0x00;

/// Version byte of an account public key (`a...`).
pub const ACCOUNT_PUBLIC_KEY_VERSION: u8 = 0x23;

/// Version byte of a secp256k1 family seed (`s...`).
pub const FAMILY_SEED_VERSION: u8 = 0x21;

/// Version prefix of an ed25519 seed (`sEd...`).
pub const ED25519_SEED_VERSION: [u8; 3] = [0x01, 0xE1, 0x4B];

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Seed entropy length in bytes.
pub const SEED_LENGTH: usize = 16;

/// Account id length in bytes.
pub const ACCOUNT_ID_LENGTH: usize = 20;

/// Currency code length in bytes.
pub const CURRENCY_LENGTH: usize = 20;

/// Length of a compressed secp256k1 key, and of an `0xED`-prefixed ed25519 key.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Marker byte in front of ed25519 public keys.
pub const ED25519_KEY_PREFIX: u8 = 0xED;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Drops per unit of the native currency.
pub const DROPS_PER_XRP: u64 = 1_000_000;

/// Number of decimal places a native amount may carry.
pub const NATIVE_DECIMALS: usize = 6;

/// Largest native amount the wire format accepts, in drops.
pub const MAX_NATIVE_DROPS: u64 = 100_000_000_000_000_000;

/// Normalized issued-currency mantissas lie in `[MIN_MANTISSA, MAX_MANTISSA]`.
pub const MIN_MANTISSA: u64 = 1_000_000_000_000_000;

/// Upper bound (inclusive) of a normalized issued-currency mantissa.
pub const MAX_MANTISSA: u64 = 9_999_999_999_999_999;

/// Smallest exponent of a normalized issued value.
pub const MIN_EXPONENT: i32 = -96;

/// Largest exponent of a normalized issued value.
pub const MAX_EXPONENT: i32 = 80;

/// Trust line qualities are ratios scaled by this factor on the wire.
pub const QUALITY_SCALE: f64 = 1_000_000_000.0;

// ---------------------------------------------------------------------------
// Fees & Submission
// ---------------------------------------------------------------------------

/// Fee applied when the caller does not supply one, in drops.
pub const DEFAULT_FEE_DROPS: u64 = 10;

/// Public websocket endpoint used for submission unless overridden.
pub const DEFAULT_SUBMIT_ENDPOINT: &str = "wss://s1.ripple.com:443";

/// How long a single submission attempt may take end to end.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Output Mode
// ---------------------------------------------------------------------------

/// Which representations the output router emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// `Hash: ...` / `Raw: ...` summary followed by the JSON document.
    #[default]
    Summary,
    /// Raw canonical bytes only.
    Binary,
    /// JSON document only.
    Json,
}

impl OutputMode {
    /// Resolves the two boolean output switches. JSON wins when both are set.
    pub fn from_switches(binary: bool, json: bool) -> Self {
        match (binary, json) {
            (_, true) => Self::Json,
            (true, false) => Self::Binary,
            (false, false) => Self::Summary,
        }
    }

    /// Whether the hash/hex summary is written.
    pub fn writes_summary(&self) -> bool {
        matches!(self, Self::Summary)
    }

    /// Whether raw bytes are written.
    pub fn writes_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }

    /// Whether the JSON document is written.
    pub fn writes_json(&self) -> bool {
        matches!(self, Self::Summary | Self::Json)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Binary => write!(f, "binary"),
            Self::Json => write!(f, "json"),
        }
    }
}

// ---------------------------------------------------------------------------
// SigningConfig
// ---------------------------------------------------------------------------

/// Everything the signer and router need for one invocation.
///
/// Sequence and fee are always caller-supplied; nothing here is ever
/// looked up from the network.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Secret seed. `None` is only legal for the re-emit entry point.
    pub seed: Option<Seed>,
    /// Explicit algorithm selector. `None` infers it from the seed encoding.
    pub algorithm: Option<Algorithm>,
    /// Account index for index-parameterized derivation.
    pub account_index: u32,
    /// Replay counter of the sending account.
    pub sequence: u32,
    /// Fee in drops. `None` means [`DEFAULT_FEE_DROPS`].
    pub fee: Option<u64>,
    /// Highest ledger the transaction may appear in. Zero means unset.
    pub last_ledger_sequence: Option<u32>,
    /// Optional source tag stamped on the common fields.
    pub source_tag: Option<u32>,
    /// Representations to emit.
    pub output: OutputMode,
    /// Whether to hand the encoded transaction to the submitter.
    pub submit: bool,
    /// Websocket endpoint used when `submit` is set.
    pub endpoint: String,
    /// Time budget of a submission attempt.
    pub submit_timeout: Duration,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            seed: None,
            algorithm: None,
            account_index: 0,
            sequence: 0,
            fee: None,
            last_ledger_sequence: None,
            source_tag: None,
            output: OutputMode::default(),
            submit: false,
            endpoint: DEFAULT_SUBMIT_ENDPOINT.to_string(),
            submit_timeout: SUBMIT_TIMEOUT,
        }
    }
}

impl SigningConfig {
    /// A configuration signing with `seed` at `sequence`, defaults elsewhere.
    pub fn new(seed: Seed, sequence: u32) -> Self {
        Self {
            seed: Some(seed),
            sequence,
            ..Self::default()
        }
    }

    /// The fee to stamp on the transaction, in drops.
    pub fn fee_drops(&self) -> u64 {
        self.fee.unwrap_or(DEFAULT_FEE_DROPS)
    }

    /// The expiry height, with zero treated as "no expiry".
    pub fn expiry(&self) -> Option<u32> {
        self.last_ledger_sequence.filter(|height| *height > 0)
    }

    /// The algorithm in effect: the explicit selector, else the seed's own.
    pub fn effective_algorithm(&self) -> Result<Algorithm, TxError> {
        match (self.algorithm, &self.seed) {
            (Some(algorithm), _) => Ok(algorithm),
            (None, Some(seed)) => Ok(seed.algorithm()),
            (None, None) => Err(TxError::MissingSeed),
        }
    }

    /// Derives the signing key, failing with `MissingSeed` if there is no seed.
    pub fn resolve_keypair(&self) -> Result<KeyPair, TxError> {
        let seed = self.seed.as_ref().ok_or(TxError::MissingSeed)?;
        KeyPair::derive(seed, self.account_index, self.effective_algorithm()?)
    }
}
