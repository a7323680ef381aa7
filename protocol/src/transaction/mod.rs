//! # Transaction Module
//!
//! Construction, signing, encoding and submission of ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — TransactionType, shared base record, Payment / TrustSet bodies
//! flags.rs    — named flag options and their bits
//! builder.rs  — validating builders producing unsigned transactions
//! signing.rs  — Signer: fills common fields, signs the canonical payload
//! output.rs   — Encoder and OutputRouter, plus the re-emit entry point
//! submit.rs   — Submitter trait and the websocket implementation
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] validates input and sets flags.
//! 2. **Sign**: [`sign_transaction`] stamps account, sequence, fee and key,
//!    then signs. The result is an immutable [`SignedTransaction`].
//! 3. **Encode**: [`encode`] yields canonical bytes, id and JSON.
//! 4. **Submit** (optional): [`OutputRouter`] hands the bytes to a
//!    [`Submitter`] and surfaces the network's verdict unchanged.
//!
//! ## Design Decisions
//!
//! - Transaction ids are `SHA512Half(0x54584E00 || canonical bytes)`, the
//!   signature included. Signing covers `0x53545800 || signing fields`.
//! - Amounts never pass through floating point. Only trust-line quality
//!   ratios are given as `f64`, and they are scaled to integers at build time.
//! - Opposing flag pairs may be selected together; the builder logs a
//!   warning and leaves the decision to the ledger.

pub mod builder;
pub mod flags;
pub mod output;
pub mod signing;
pub mod submit;
pub mod types;

pub use builder::{scale_quality, PaymentBuilder, TransactionBuilder, TrustSetBuilder};
pub use output::{
    decode_signed, encode, read_encoded, EncodedTransaction, OutputRouter, RoutedOutput,
    SubmissionStatus,
};
pub use signing::{sign_transaction, sign_with_config, signing_payload, SignedTransaction};
pub use submit::{EngineResult, Submitter, WebSocketSubmitter};
pub use types::{
    Payment, Transaction, TransactionBase, TransactionKind, TransactionType, TrustSet,
};
