//! Currency codes.
//!
//! A currency is 20 bytes on the wire. Standard three-character codes sit
//! at bytes 12..15 with everything else zero; anything else is written as
//! 40 hex digits. The all-zero code denotes the native currency and is only
//! meaningful inside routing paths.

use std::fmt;

use crate::config::CURRENCY_LENGTH;

/// Characters permitted in a standard three-character code besides
/// ASCII letters and digits.
const CODE_SYMBOLS: &str = "?!@#$%^&*<>(){}[]|";

/// A 20-byte currency code.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; CURRENCY_LENGTH]);

impl Currency {
    /// The native currency, encoded as all zeros.
    pub const NATIVE: Currency = Currency([0u8; CURRENCY_LENGTH]);

    /// Wraps raw code bytes.
    pub const fn from_bytes(bytes: [u8; CURRENCY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses a three-character code, 40 hex digits, or `XRP`.
    ///
    /// `XRP` in any letter case maps to [`Currency::NATIVE`]; callers that
    /// need an issued currency check [`is_native`](Self::is_native)
    /// themselves.
    pub fn parse(code: &str) -> Result<Self, String> {
        if code.eq_ignore_ascii_case("XRP") {
            return Ok(Self::NATIVE);
        }
        if code.len() == 3 {
            if !code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || CODE_SYMBOLS.contains(c))
            {
                return Err(format!("currency code {:?} has invalid characters", code));
            }
            let mut bytes = [0u8; CURRENCY_LENGTH];
            bytes[12..15].copy_from_slice(code.as_bytes());
            return Ok(Self(bytes));
        }
        if code.len() == 2 * CURRENCY_LENGTH {
            let decoded =
                hex::decode(code).map_err(|_| format!("currency code {:?} is not hex", code))?;
            let mut bytes = [0u8; CURRENCY_LENGTH];
            bytes.copy_from_slice(&decoded);
            return Ok(Self(bytes));
        }
        Err(format!(
            "currency code {:?} must be 3 characters or 40 hex digits",
            code
        ))
    }

    /// `true` for the all-zero native code.
    pub fn is_native(&self) -> bool {
        self.0 == [0u8; CURRENCY_LENGTH]
    }

    /// Raw code bytes.
    pub fn as_bytes(&self) -> &[u8; CURRENCY_LENGTH] {
        &self.0
    }

    /// The three-character form, when the bytes are laid out as one.
    fn standard_code(&self) -> Option<&str> {
        let zero_padded = self.0[..12].iter().chain(&self.0[15..]).all(|b| *b == 0);
        if !zero_padded {
            return None;
        }
        let code = std::str::from_utf8(&self.0[12..15]).ok()?;
        code.chars()
            .all(|c| c.is_ascii_alphanumeric() || CODE_SYMBOLS.contains(c))
            .then_some(code)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            return f.write_str("XRP");
        }
        match self.standard_code() {
            Some(code) => f.write_str(code),
            None => f.write_str(&hex::encode_upper(self.0)),
        }
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self)
    }
}
