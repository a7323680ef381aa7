//! Payment routing paths.
//!
//! A [`PathSet`] is a list of alternative [`Path`]s; each path is an ordered
//! list of [`PathStep`]s naming an intermediary account, a currency to
//! convert through, an issuer, or a currency/issuer pair.
//!
//! Text form: paths are separated by `,` and steps within a path by `=>`.
//!
//! ```text
//! rAccount=>USD/rIssuer,EUR
//! ```

use std::fmt;

use crate::config::CURRENCY_LENGTH;
use crate::error::TxError;
use crate::types::{AccountId, Currency};

/// Step type bit: an account is present.
pub const STEP_ACCOUNT: u8 = 0x01;
/// Step type bit: a currency is present.
pub const STEP_CURRENCY: u8 = 0x10;
/// Step type bit: an issuer is present.
pub const STEP_ISSUER: u8 = 0x20;
/// Wire marker between two paths.
pub const PATH_SEPARATOR: u8 = 0xFF;
/// Wire marker closing the set.
pub const PATH_SET_END: u8 = 0x00;

/// One hop of a routing path. At least one component is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub account: Option<AccountId>,
    pub currency: Option<Currency>,
    pub issuer: Option<AccountId>,
}

impl PathStep {
    /// Parses a single step: `rAccount`, `CUR`, `CUR/rIssuer` or `/rIssuer`.
    pub fn parse(token: &str) -> Result<Self, TxError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TxError::invalid_path(token, "empty step"));
        }

        if let Some((currency, issuer)) = token.split_once('/') {
            let issuer = AccountId::from_address(issuer)
                .map_err(|_| TxError::invalid_path(token, "issuer is not a valid account"))?;
            let currency = if currency.is_empty() {
                None
            } else {
                Some(
                    Currency::parse(currency)
                        .map_err(|reason| TxError::invalid_path(token, reason))?,
                )
            };
            return Ok(Self {
                account: None,
                currency,
                issuer: Some(issuer),
            });
        }

        if token.len() == 3 || token.len() == 2 * CURRENCY_LENGTH {
            let currency =
                Currency::parse(token).map_err(|reason| TxError::invalid_path(token, reason))?;
            return Ok(Self {
                currency: Some(currency),
                ..Self::default()
            });
        }

        let account = AccountId::from_address(token).map_err(|_| {
            TxError::invalid_path(token, "neither an account nor a currency code")
        })?;
        Ok(Self {
            account: Some(account),
            ..Self::default()
        })
    }

    /// The wire type byte: OR of the component bits that are present.
    pub fn type_byte(&self) -> u8 {
        let mut byte = 0;
        if self.account.is_some() {
            byte |= STEP_ACCOUNT;
        }
        if self.currency.is_some() {
            byte |= STEP_CURRENCY;
        }
        if self.issuer.is_some() {
            byte |= STEP_ISSUER;
        }
        byte
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.account, self.currency, self.issuer) {
            (Some(account), None, None) => write!(f, "{}", account),
            (None, Some(currency), None) => write!(f, "{}", currency),
            (None, currency, Some(issuer)) => match currency {
                Some(currency) => write!(f, "{}/{}", currency, issuer),
                None => write!(f, "/{}", issuer),
            },
            // Combinations with an account and more cannot be written as text.
            (account, currency, issuer) => {
                let parts: Vec<String> = [
                    account.map(|a| a.to_string()),
                    currency.map(|c| c.to_string()),
                    issuer.map(|i| i.to_string()),
                ]
                .into_iter()
                .flatten()
                .collect();
                write!(f, "[{}]", parts.join(" "))
            }
        }
    }
}

/// An ordered list of steps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(pub Vec<PathStep>);

impl Path {
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }
}

/// Alternative routing paths for a cross-currency payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathSet(pub Vec<Path>);

impl PathSet {
    /// Parses path text. Empty or blank text yields an empty set.
    ///
    /// Fails with [`TxError::InvalidPath`] naming the first bad step.
    pub fn parse(text: &str) -> Result<Self, TxError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut paths = Vec::new();
        for path_text in text.split(',') {
            if path_text.trim().is_empty() {
                return Err(TxError::invalid_path(path_text, "empty path"));
            }
            let steps = path_text
                .split("=>")
                .map(PathStep::parse)
                .collect::<Result<Vec<_>, _>>()?;
            paths.push(Path(steps));
        }
        Ok(Self(paths))
    }

    pub fn paths(&self) -> &[Path] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            for (j, step) in path.0.iter().enumerate() {
                if j > 0 {
                    f.write_str("=>")?;
                }
                write!(f, "{}", step)?;
            }
        }
        Ok(())
    }
}
