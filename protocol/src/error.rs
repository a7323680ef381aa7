//! Error types for the transaction pipeline.
//!
//! Every stage (derive, build, sign, encode, submit) that can fail returns a
//! [`TxError`]. Each variant belongs to exactly one [`ErrorKind`], which is
//! what callers use to decide how to report the failure.

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = TxError> = std::result::Result<T, E>;

/// Broad classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing seed or required field, or malformed account/amount/path text.
    Configuration,
    /// Precision or range violation, unsupported algorithm.
    Validation,
    /// Key/curve mismatch or a failure while producing the signature.
    Signing,
    /// Malformed pre-signed input on the alternate entry path, or output
    /// that could not be written.
    Encoding,
    /// Unreachable network or failed submission.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "ConfigurationError"),
            Self::Validation => write!(f, "ValidationError"),
            Self::Signing => write!(f, "SigningError"),
            Self::Encoding => write!(f, "EncodingError"),
            Self::Transport => write!(f, "TransportError"),
        }
    }
}

/// Errors that can occur while building, signing, encoding or submitting a
/// transaction. All of them are terminal for the invocation.
#[derive(Debug, Error)]
pub enum TxError {
    /// A signing stage was reached without a seed in the configuration.
    #[error("a seed is required to sign a transaction")]
    MissingSeed,

    /// A field the transaction type cannot do without was empty or absent.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The seed text failed base58, checksum, version or length checks.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// An account address failed base58, checksum, version or length checks.
    #[error("invalid account {address:?}: {reason}")]
    InvalidAccount {
        /// The offending address text.
        address: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Amount text that could not be parsed at all.
    #[error("invalid amount {text:?}: {reason}")]
    InvalidAmount {
        /// The offending amount text.
        text: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A flag option name that the transaction type does not define.
    #[error("unknown {tx_type} option: {option}")]
    UnknownOption {
        /// Transaction type the option was given for.
        tx_type: &'static str,
        /// The offending option name.
        option: String,
    },

    /// A routing path step that could not be parsed.
    #[error("invalid path step {token:?}: {reason}")]
    InvalidPath {
        /// The offending step text.
        token: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A well-formed value outside the representable range or precision.
    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    /// An algorithm selector other than `secp256k1` or `ed25519`.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material rejected by the curve, or signature production failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Pre-encoded transaction bytes could not be decoded.
    #[error("malformed encoded transaction: {0}")]
    Encoding(String),

    /// The submission collaborator could not deliver the transaction.
    #[error("submission failed: {0}")]
    Transport(String),

    /// An output stream rejected the encoded transaction.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl TxError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSeed
            | Self::MissingRequiredField(_)
            | Self::InvalidSeed(_)
            | Self::InvalidAccount { .. }
            | Self::InvalidAmount { .. }
            | Self::UnknownOption { .. }
            | Self::InvalidPath { .. } => ErrorKind::Configuration,
            Self::ValueOutOfRange(_) | Self::UnsupportedAlgorithm(_) => ErrorKind::Validation,
            Self::Signing(_) => ErrorKind::Signing,
            Self::Encoding(_) | Self::Output(_) => ErrorKind::Encoding,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    pub(crate) fn invalid_amount(text: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_path(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_categories() {
        assert_eq!(TxError::MissingSeed.kind(), ErrorKind::Configuration);
        assert_eq!(
            TxError::MissingRequiredField("Destination").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            TxError::ValueOutOfRange("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            TxError::UnsupportedAlgorithm("rsa".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(TxError::Signing("x".into()).kind(), ErrorKind::Signing);
        assert_eq!(TxError::Encoding("x".into()).kind(), ErrorKind::Encoding);
        assert_eq!(TxError::Transport("x".into()).kind(), ErrorKind::Transport);
    }

    #[test]
    fn path_error_names_token() {
        let err = TxError::invalid_path("USD/xyz", "bad issuer");
        assert!(err.to_string().contains("USD/xyz"));
    }
}
