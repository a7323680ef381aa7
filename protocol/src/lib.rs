// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ripple-tx — Core Library
//!
//! Builds, signs and encodes transactions for the Ripple payment ledger
//! without a ledger node. Sequence numbers and fees are supplied by the
//! caller; nothing is looked up.
//!
//! The hard part is the bytes. Validators verify signatures over a
//! canonical serialization, so a single misplaced field header produces a
//! transaction that is silently rejected remotely rather than one that fails
//! here. Everything on the wire is pinned by reference vectors in the tests.
//!
//! ## Architecture
//!
//! - **crypto** — seeds, deterministic key derivation, signatures, digests.
//! - **types** — accounts, currencies, amounts and routing paths.
//! - **codec** — the field table, canonical binary codec and JSON rendering.
//! - **transaction** — builders, signer, encoder, output routing, submission.
//! - **config** — protocol constants and the per-invocation configuration.
//! - **error** — the crate-wide error type.
//!
//! ## Example
//!
//! ```
//! use ripple_tx::config::SigningConfig;
//! use ripple_tx::transaction::{encode, sign_with_config, TransactionBuilder};
//!
//! let config = SigningConfig::new("snoPBrXtMeMyMHUVTgbuqAfg1SUTb".parse()?, 1);
//! let tx = TransactionBuilder::payment()
//!     .destination("rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe")
//!     .amount("1")
//!     .build()?;
//! let encoded = encode(&sign_with_config(tx, &config)?)?;
//! assert_eq!(encoded.hash.len(), 32);
//! # Ok::<(), ripple_tx::TxError>(())
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transaction;
pub mod types;

pub use error::{ErrorKind, Result, TxError};
