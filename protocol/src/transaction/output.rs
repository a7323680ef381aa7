//! Encoding signed transactions and routing the results.
//!
//! [`encode`] produces the canonical bytes, transaction id and JSON
//! document of a [`SignedTransaction`]. [`OutputRouter`] writes whichever of
//! those the [`OutputMode`] asks for and, when a [`Submitter`] is attached,
//! hands the bytes to the network.
//!
//! The re-emit entry point runs the other way: [`read_encoded`] and
//! [`decode_signed`] turn previously produced output back into a
//! `SignedTransaction` so it can be routed again.

use std::io::{self, Write};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::signing::SignedTransaction;
use super::submit::{EngineResult, Submitter};
use super::types::Transaction;
use crate::codec::{parse_fields, serialize, to_json, Scope};
use crate::config::{OutputMode, SigningConfig, HASH_PREFIX_TX_ID};
use crate::crypto::hash::prefixed_hash;
use crate::error::TxError;

/// Every representation of one signed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTransaction {
    /// Transaction id.
    pub hash: [u8; 32],
    /// Canonical bytes, signature included.
    pub raw: Vec<u8>,
    /// Structured document, `hash` included.
    pub json: Value,
}

impl EncodedTransaction {
    pub fn hash_hex(&self) -> String {
        hex::encode_upper(self.hash)
    }

    pub fn raw_hex(&self) -> String {
        hex::encode_upper(&self.raw)
    }
}

/// Encodes a signed transaction. Cannot fail for a record produced by the
/// signer or by [`decode_signed`].
pub fn encode(signed: &SignedTransaction) -> Result<EncodedTransaction, TxError> {
    let fields = signed.transaction().fields()?;
    let raw = serialize(&fields, Scope::All)?;
    let hash = prefixed_hash(HASH_PREFIX_TX_ID, &raw);
    let json = to_json(&fields, Some(&hash));
    debug!(hash = %hex::encode_upper(hash), bytes = raw.len(), "encoded transaction");
    Ok(EncodedTransaction { hash, raw, json })
}

/// Decodes canonical bytes of a signed transaction.
///
/// Fails with [`TxError::Encoding`] for anything malformed, unsupported or
/// unsigned.
pub fn decode_signed(bytes: &[u8]) -> Result<SignedTransaction, TxError> {
    let fields = parse_fields(bytes)?;
    let tx = Transaction::from_fields(&fields)?;
    SignedTransaction::from_transaction(tx)
}

/// Accepts either raw canonical bytes or the same bytes as hex text.
///
/// Canonical bytes always begin with the `TransactionType` header `0x12`,
/// which is not a hex digit, so the two forms cannot be confused. Hex text
/// may be wrapped across lines; all ASCII whitespace in it is ignored.
pub fn read_encoded(input: &[u8]) -> Result<Vec<u8>, TxError> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(TxError::Encoding("no input".to_string()));
    }
    if compact.iter().all(u8::is_ascii_hexdigit) {
        return hex::decode(compact).map_err(|e| TxError::Encoding(format!("hex input: {}", e)));
    }
    Ok(input.to_vec())
}

// ---------------------------------------------------------------------------
// OutputRouter
// ---------------------------------------------------------------------------

/// What happened on the submission leg.
#[derive(Debug)]
pub enum SubmissionStatus {
    NotRequested,
    /// The network answered; any code, success or not.
    Answered(EngineResult),
    /// No answer could be obtained. The encoding is still valid.
    Failed(TxError),
}

/// The outcome of routing one transaction.
#[derive(Debug)]
pub struct RoutedOutput {
    pub encoded: EncodedTransaction,
    pub submission: SubmissionStatus,
}

impl RoutedOutput {
    /// Turns a failed submission into an error; everything else is success.
    pub fn into_result(self) -> Result<(EncodedTransaction, Option<EngineResult>), TxError> {
        match self.submission {
            SubmissionStatus::NotRequested => Ok((self.encoded, None)),
            SubmissionStatus::Answered(verdict) => Ok((self.encoded, Some(verdict))),
            SubmissionStatus::Failed(e) => Err(e),
        }
    }
}

/// Writes the requested representations and optionally submits.
pub struct OutputRouter<'a> {
    mode: OutputMode,
    submitter: Option<&'a dyn Submitter>,
}

impl<'a> OutputRouter<'a> {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            submitter: None,
        }
    }

    /// Router for `config`, submitting through `submitter` only when the
    /// configuration asks for submission.
    pub fn from_config(config: &SigningConfig, submitter: &'a dyn Submitter) -> Self {
        let router = Self::new(config.output);
        if config.submit {
            router.with_submitter(submitter)
        } else {
            router
        }
    }

    pub fn with_submitter(mut self, submitter: &'a dyn Submitter) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Writes the representations selected by the mode.
    ///
    /// Binary mode writes raw bytes only. Summary mode writes
    /// `Hash: <HEX>` and `Raw: <HEX>` lines, then the JSON document.
    /// JSON mode writes only the document.
    pub fn write_outputs<W: Write>(
        &self,
        encoded: &EncodedTransaction,
        out: &mut W,
    ) -> Result<(), TxError> {
        if self.mode.writes_binary() {
            out.write_all(&encoded.raw)?;
        }
        if self.mode.writes_summary() {
            writeln!(out, "Hash: {}", encoded.hash_hex())?;
            writeln!(out, "Raw: {}", encoded.raw_hex())?;
        }
        if self.mode.writes_json() {
            let document = serde_json::to_string(&encoded.json)
                .map_err(|e| TxError::Encoding(format!("json: {}", e)))?;
            writeln!(out, "{}", document)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Encodes, writes and, if a submitter is attached, submits.
    ///
    /// Nothing is written if encoding fails. A submission failure does not
    /// undo what was written; it is reported in the returned
    /// [`SubmissionStatus`].
    pub async fn route<W: Write>(
        &self,
        signed: &SignedTransaction,
        out: &mut W,
    ) -> Result<RoutedOutput, TxError> {
        let encoded = encode(signed)?;
        self.write_outputs(&encoded, out)?;

        let submission = match self.submitter {
            None => SubmissionStatus::NotRequested,
            Some(submitter) => match submitter.submit(&encoded.raw).await {
                Ok(verdict) => {
                    if let Err(e) = writeln!(out, "{}", verdict).and_then(|()| out.flush()) {
                        warn!(
                            %verdict,
                            error = %e,
                            "submission answered but the verdict could not be written"
                        );
                        return Err(TxError::Output(io::Error::new(
                            e.kind(),
                            format!("{} (submission answered {})", e, verdict),
                        )));
                    }
                    SubmissionStatus::Answered(verdict)
                }
                Err(e) => SubmissionStatus::Failed(e),
            },
        };
        info!(hash = %encoded.hash_hex(), mode = %self.mode, "transaction routed");
        Ok(RoutedOutput {
            encoded,
            submission,
        })
    }
}
