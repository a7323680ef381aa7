//! Transaction construction via the builder pattern.
//!
//! Builders collect user input as text, then validate all of it in
//! `build()` before any key material is touched. The result is an unsigned
//! [`Transaction`]: flags are set, everything the signer owns (account,
//! sequence, fee, public key) is still empty.

use tracing::debug;

use super::flags::{fold_options, warn_on_opposing, PAYMENT_OPTIONS, TRUST_SET_OPTIONS};
use super::types::{Payment, Transaction, TransactionKind, TrustSet};
use crate::config::QUALITY_SCALE;
use crate::crypto::hash::sha512_half;
use crate::error::TxError;
use crate::types::{AccountId, Amount, PathSet};

/// Entry point for the per-type builders.
///
/// # Usage
///
/// ```
/// use ripple_tx::transaction::TransactionBuilder;
///
/// let tx = TransactionBuilder::payment()
///     .destination("rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe")
///     .amount("1.5")
///     .option("partial")
///     .build()
///     .unwrap();
/// assert_eq!(tx.base.flags, Some(0x0002_0000));
/// ```
pub struct TransactionBuilder;

impl TransactionBuilder {
    pub fn payment() -> PaymentBuilder {
        PaymentBuilder::default()
    }

    pub fn trust_set() -> TrustSetBuilder {
        TrustSetBuilder::default()
    }
}

/// Scales a quality ratio by 1e9 for the wire, rounding to nearest.
///
/// Fails with [`TxError::ValueOutOfRange`] for negative, non-finite or
/// overflowing ratios.
pub fn scale_quality(ratio: f64) -> Result<u32, TxError> {
    if !ratio.is_finite() || ratio < 0.0 {
        return Err(TxError::ValueOutOfRange(format!(
            "quality {} must be a non-negative number",
            ratio
        )));
    }
    let scaled = (ratio * QUALITY_SCALE).round();
    if scaled > f64::from(u32::MAX) {
        return Err(TxError::ValueOutOfRange(format!(
            "quality {} is too large",
            ratio
        )));
    }
    Ok(scaled as u32)
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// PaymentBuilder
// ---------------------------------------------------------------------------

/// Builds a Payment.
#[derive(Debug, Clone, Default)]
pub struct PaymentBuilder {
    destination: Option<String>,
    amount: Option<String>,
    send_max: Option<String>,
    paths: Option<String>,
    destination_tag: Option<u32>,
    invoice_id: Option<[u8; 32]>,
    options: Vec<String>,
}

impl PaymentBuilder {
    /// Destination `r...` address. Required.
    pub fn destination(mut self, address: impl Into<String>) -> Self {
        self.destination = Some(address.into());
        self
    }

    /// Amount text, native or `value/CUR/issuer`. Required.
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Maximum the sender is willing to spend, same text form as `amount`.
    pub fn send_max(mut self, amount: impl Into<String>) -> Self {
        self.send_max = Some(amount.into());
        self
    }

    /// Routing path text (`step=>step,path`).
    pub fn paths(mut self, paths: impl Into<String>) -> Self {
        self.paths = Some(paths.into());
        self
    }

    pub fn destination_tag(mut self, tag: u32) -> Self {
        self.destination_tag = Some(tag);
        self
    }

    /// Invoice reference; the text is hashed into a 256-bit id.
    pub fn invoice(mut self, text: &str) -> Self {
        self.invoice_id = Some(sha512_half(text.as_bytes()));
        self
    }

    /// Invoice id given directly as 32 bytes.
    pub fn invoice_id(mut self, id: [u8; 32]) -> Self {
        self.invoice_id = Some(id);
        self
    }

    /// Selects a named flag option (`nodirect`, `partial`, `limit`).
    pub fn option(mut self, name: impl Into<String>) -> Self {
        self.options.push(name.into());
        self
    }

    /// Validates everything and produces the unsigned transaction.
    pub fn build(self) -> Result<Transaction, TxError> {
        let destination =
            non_empty(&self.destination).ok_or(TxError::MissingRequiredField("Destination"))?;
        let amount = non_empty(&self.amount).ok_or(TxError::MissingRequiredField("Amount"))?;

        let destination = AccountId::from_address(destination)?;
        let amount = Amount::parse(amount)?;
        let send_max = non_empty(&self.send_max).map(Amount::parse).transpose()?;
        let paths = match non_empty(&self.paths) {
            Some(text) => Some(PathSet::parse(text)?).filter(|set| !set.is_empty()),
            None => None,
        };
        let flags = fold_options(
            "Payment",
            PAYMENT_OPTIONS,
            self.options.iter().map(String::as_str),
        )?;

        debug!(
            destination = %destination,
            amount = %amount,
            flags = %format!("{:#010x}", flags),
            paths = paths.as_ref().map_or(0, |set| set.paths().len()),
            "built Payment"
        );

        let mut tx = Transaction::new(TransactionKind::Payment(Payment {
            destination,
            amount,
            send_max,
            paths,
            destination_tag: self.destination_tag,
            invoice_id: self.invoice_id,
        }));
        tx.base.flags = Some(flags);
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// TrustSetBuilder
// ---------------------------------------------------------------------------

/// Builds a TrustSet.
#[derive(Debug, Clone, Default)]
pub struct TrustSetBuilder {
    limit: Option<String>,
    quality_in: Option<f64>,
    quality_out: Option<f64>,
    options: Vec<String>,
}

impl TrustSetBuilder {
    /// Trust limit as `value/CUR/issuer`. Required.
    pub fn limit(mut self, amount: impl Into<String>) -> Self {
        self.limit = Some(amount.into());
        self
    }

    /// Incoming quality ratio; below 1.0 charges a fee.
    pub fn quality_in(mut self, ratio: f64) -> Self {
        self.quality_in = Some(ratio);
        self
    }

    /// Outgoing quality ratio; above 1.0 charges a fee.
    pub fn quality_out(mut self, ratio: f64) -> Self {
        self.quality_out = Some(ratio);
        self
    }

    /// Selects a named flag option (`auth`, `noripple`, `clear-noripple`,
    /// `freeze`, `clear-freeze`).
    pub fn option(mut self, name: impl Into<String>) -> Self {
        self.options.push(name.into());
        self
    }

    pub fn build(self) -> Result<Transaction, TxError> {
        let text = non_empty(&self.limit).ok_or(TxError::MissingRequiredField("LimitAmount"))?;
        let limit_amount = match Amount::parse(text)? {
            Amount::Issued(issued) => issued,
            Amount::Native(_) => {
                return Err(TxError::invalid_amount(
                    text,
                    "a trust limit must be an issued amount",
                ))
            }
        };
        let quality_in = self.quality_in.map(scale_quality).transpose()?;
        let quality_out = self.quality_out.map(scale_quality).transpose()?;
        let flags = fold_options(
            "TrustSet",
            TRUST_SET_OPTIONS,
            self.options.iter().map(String::as_str),
        )?;
        warn_on_opposing("TrustSet", flags);

        debug!(
            limit = %Amount::Issued(limit_amount),
            flags = %format!("{:#010x}", flags),
            ?quality_in,
            ?quality_out,
            "built TrustSet"
        );

        let mut tx = Transaction::new(TransactionKind::TrustSet(TrustSet {
            limit_amount,
            quality_in,
            quality_out,
        }));
        tx.base.flags = Some(flags);
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
