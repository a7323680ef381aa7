//! Amounts of the native currency and of issued currencies.
//!
//! Native amounts are integer drops. Issued amounts are decimal floating
//! point with a 16-digit mantissa normalized into
//! `[MIN_MANTISSA, MAX_MANTISSA]` and an exponent in
//! `[MIN_EXPONENT, MAX_EXPONENT]`, which is exactly what the 64-bit wire
//! form can hold. No floating-point arithmetic is involved anywhere.
//!
//! Text forms accepted by [`Amount::parse`]:
//!
//! ```text
//! 1.5             native, 1_500_000 drops
//! 25/XRP          native, 25_000_000 drops
//! 1.5/USD/r...    issued, value/currency/issuer
//! ```

use std::fmt;

use crate::config::{
    DROPS_PER_XRP, MAX_EXPONENT, MAX_MANTISSA, MAX_NATIVE_DROPS, MIN_EXPONENT, MIN_MANTISSA,
    NATIVE_DECIMALS,
};
use crate::error::TxError;
use crate::types::{AccountId, Currency};

/// Bit 63: set for issued amounts, clear for native ones.
const ISSUED_BIT: u64 = 0x8000_0000_0000_0000;
/// Bit 62: set when the amount is positive (or a native zero).
const POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;
/// Low 54 bits carry an issued mantissa.
const MANTISSA_MASK: u64 = (1 << 54) - 1;
/// Exponents are stored biased by this much.
const EXPONENT_BIAS: i64 = 97;

// ---------------------------------------------------------------------------
// IssuedValue
// ---------------------------------------------------------------------------

/// A normalized non-negative issued-currency value: `mantissa * 10^exponent`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IssuedValue {
    mantissa: u64,
    exponent: i32,
}

impl IssuedValue {
    /// Canonical zero.
    pub const ZERO: IssuedValue = IssuedValue {
        mantissa: 0,
        exponent: 0,
    };

    /// Normalizes `mantissa * 10^exponent`.
    ///
    /// Fails if digits would be lost or the exponent leaves the wire range.
    pub fn new(mantissa: u64, exponent: i32) -> Result<Self, TxError> {
        Self::normalize(mantissa, i64::from(exponent))
    }

    fn normalize(mut mantissa: u64, mut exponent: i64) -> Result<Self, TxError> {
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        while mantissa < MIN_MANTISSA {
            mantissa *= 10;
            exponent -= 1;
        }
        while mantissa > MAX_MANTISSA {
            if mantissa % 10 != 0 {
                return Err(TxError::ValueOutOfRange(
                    "issued value has more than 16 significant digits".to_string(),
                ));
            }
            mantissa /= 10;
            exponent += 1;
        }
        if exponent > i64::from(MAX_EXPONENT) {
            return Err(TxError::ValueOutOfRange(
                "issued value is too large".to_string(),
            ));
        }
        if exponent < i64::from(MIN_EXPONENT) {
            return Err(TxError::ValueOutOfRange(
                "issued value is too small".to_string(),
            ));
        }
        Ok(Self {
            mantissa,
            exponent: exponent as i32,
        })
    }

    /// Parses decimal text with an optional exponent (`"1.5"`, `"2e-3"`).
    pub fn parse(text: &str) -> Result<Self, TxError> {
        let body = text.trim();
        let (negative, body) = match body.as_bytes().first() {
            Some(b'-') => (true, &body[1..]),
            Some(b'+') => (false, &body[1..]),
            _ => (false, body),
        };

        let (number, exp) = match body.find(['e', 'E']) {
            Some(at) => {
                let exp = body[at + 1..]
                    .parse::<i64>()
                    .map_err(|_| TxError::invalid_amount(text, "malformed exponent"))?;
                (&body[..at], exp)
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = split_decimal(number)
            .ok_or_else(|| TxError::invalid_amount(text, "not a decimal number"))?;

        if negative {
            return Err(TxError::ValueOutOfRange(format!(
                "amount {:?} is negative",
                text
            )));
        }
        let digits = format!("{}{}", int_part, frac_part);
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self::ZERO);
        }

        let trimmed = significant.trim_end_matches('0');
        let trailing = (significant.len() - trimmed.len()) as i64;
        if trimmed.len() > 16 {
            return Err(TxError::ValueOutOfRange(format!(
                "amount {:?} has more than 16 significant digits",
                text
            )));
        }
        let mantissa = trimmed
            .parse::<u64>()
            .map_err(|_| TxError::invalid_amount(text, "not a decimal number"))?;
        let exponent = exp
            .checked_sub(frac_part.len() as i64)
            .and_then(|e| e.checked_add(trailing))
            .ok_or_else(|| TxError::ValueOutOfRange(format!("amount {:?} exponent", text)))?;
        Self::normalize(mantissa, exponent)
    }

    /// `true` for zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Normalized mantissa (zero for zero).
    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    /// Normalized exponent (zero for zero).
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Packs the value into the 64-bit wire header.
    pub fn to_bits(&self) -> u64 {
        if self.is_zero() {
            return ISSUED_BIT;
        }
        let biased = (i64::from(self.exponent) + EXPONENT_BIAS) as u64;
        ISSUED_BIT | POSITIVE_BIT | (biased << 54) | self.mantissa
    }

    /// Unpacks a 64-bit wire header, rejecting negative or non-canonical forms.
    pub fn from_bits(bits: u64) -> Result<Self, String> {
        if bits & ISSUED_BIT == 0 {
            return Err("native amount where an issued one was expected".to_string());
        }
        if bits == ISSUED_BIT {
            return Ok(Self::ZERO);
        }
        if bits & POSITIVE_BIT == 0 {
            return Err("negative issued amount".to_string());
        }
        let mantissa = bits & MANTISSA_MASK;
        let exponent = ((bits >> 54) & 0xFF) as i64 - EXPONENT_BIAS;
        if !(MIN_MANTISSA..=MAX_MANTISSA).contains(&mantissa)
            || !(i64::from(MIN_EXPONENT)..=i64::from(MAX_EXPONENT)).contains(&exponent)
        {
            return Err("issued amount is not normalized".to_string());
        }
        Ok(Self {
            mantissa,
            exponent: exponent as i32,
        })
    }
}

impl fmt::Display for IssuedValue {
    /// Plain decimal for moderate exponents, `<mantissa>e<exp>` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let (mut mantissa, mut exponent) = (self.mantissa, self.exponent);
        if exponent != 0 && !(-25..=-5).contains(&exponent) {
            while mantissa % 10 == 0 {
                mantissa /= 10;
                exponent += 1;
            }
            return write!(f, "{}e{}", mantissa, exponent);
        }
        let digits = mantissa.to_string();
        if exponent == 0 {
            return f.write_str(&digits);
        }
        let point = digits.len() as i32 + exponent;
        let (int_part, frac_part) = if point > 0 {
            let (int_part, frac_part) = digits.split_at(point as usize);
            (int_part.to_string(), frac_part.to_string())
        } else {
            ("0".to_string(), format!("{}{}", "0".repeat((-point) as usize), digits))
        };
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            f.write_str(&int_part)
        } else {
            write!(f, "{}.{}", int_part, frac_part)
        }
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// An issued-currency amount: value, currency and issuing account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IssuedAmount {
    /// Normalized value.
    pub value: IssuedValue,
    /// Currency code; never the native code.
    pub currency: Currency,
    /// Account that issues the currency.
    pub issuer: AccountId,
}

/// A native or issued amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Amount {
    /// Native currency, in drops.
    Native(u64),
    /// Issued currency.
    Issued(IssuedAmount),
}

impl Amount {
    /// Parses amount text (see the module docs for the accepted forms).
    pub fn parse(text: &str) -> Result<Self, TxError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TxError::invalid_amount(text, "empty amount"));
        }
        let parts: Vec<&str> = trimmed.split('/').collect();
        match parts.as_slice() {
            [value] => parse_native(value, text).map(Amount::Native),
            [value, code] if code.eq_ignore_ascii_case("XRP") => {
                parse_native(value, text).map(Amount::Native)
            }
            [_, _] => Err(TxError::invalid_amount(
                text,
                "issued amounts are written value/currency/issuer",
            )),
            [value, currency, issuer] => {
                let currency =
                    Currency::parse(currency).map_err(|reason| TxError::invalid_amount(text, reason))?;
                if currency.is_native() {
                    return Err(TxError::invalid_amount(
                        text,
                        "the native currency cannot have an issuer",
                    ));
                }
                let issuer = AccountId::from_address(issuer)?;
                let value = IssuedValue::parse(value)?;
                Ok(Amount::Issued(IssuedAmount {
                    value,
                    currency,
                    issuer,
                }))
            }
            _ => Err(TxError::invalid_amount(text, "too many '/' separators")),
        }
    }

    /// Native amount in drops, validated against the wire maximum.
    pub fn native(drops: u64) -> Result<Self, TxError> {
        if drops > MAX_NATIVE_DROPS {
            return Err(TxError::ValueOutOfRange(format!(
                "{} drops exceeds the native maximum",
                drops
            )));
        }
        Ok(Amount::Native(drops))
    }

    /// `true` for native amounts.
    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Native(_))
    }

    /// The 64-bit wire header of a native amount.
    pub fn native_bits(drops: u64) -> u64 {
        POSITIVE_BIT | drops
    }

    /// Decodes a native wire header, rejecting negative or oversized values.
    pub fn native_from_bits(bits: u64) -> Result<u64, String> {
        if bits & ISSUED_BIT != 0 {
            return Err("issued amount where a native one was expected".to_string());
        }
        if bits & POSITIVE_BIT == 0 {
            return Err("negative native amount".to_string());
        }
        let drops = bits & !POSITIVE_BIT;
        if drops > MAX_NATIVE_DROPS {
            return Err("native amount exceeds the maximum".to_string());
        }
        Ok(drops)
    }

    /// `true` when the 64-bit wire header announces an issued amount.
    pub fn bits_are_issued(bits: u64) -> bool {
        bits & ISSUED_BIT != 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Native(drops) => f.write_str(&format_drops(*drops)),
            Amount::Issued(issued) => {
                write!(f, "{}/{}/{}", issued.value, issued.currency, issued.issuer)
            }
        }
    }
}

/// Renders drops as a native-unit decimal (`1500000` → `"1.5"`).
pub fn format_drops(drops: u64) -> String {
    let whole = drops / DROPS_PER_XRP;
    let frac = drops % DROPS_PER_XRP;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = NATIVE_DECIMALS);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Splits `"12.50"` into `("12", "50")`; `None` unless digits-only with at
/// least one digit.
fn split_decimal(number: &str) -> Option<(&str, &str)> {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (number, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    (all_digits(int_part) && all_digits(frac_part)).then_some((int_part, frac_part))
}

fn parse_native(value: &str, text: &str) -> Result<u64, TxError> {
    let value = value.trim();
    let value = match value.as_bytes().first() {
        Some(b'-') => {
            return Err(TxError::ValueOutOfRange(format!(
                "amount {:?} is negative",
                text
            )))
        }
        Some(b'+') => &value[1..],
        _ => value,
    };
    let (int_part, frac_part) = split_decimal(value).ok_or_else(|| {
        TxError::invalid_amount(text, "native amounts are plain decimals")
    })?;

    let frac_significant = frac_part.trim_end_matches('0');
    if frac_significant.len() > NATIVE_DECIMALS {
        return Err(TxError::ValueOutOfRange(format!(
            "amount {:?} has more than {} decimal places",
            text, NATIVE_DECIMALS
        )));
    }

    let int_digits = int_part.trim_start_matches('0');
    // More than 12 integer digits cannot fit under the native maximum.
    if int_digits.len() > 12 {
        return Err(TxError::ValueOutOfRange(format!(
            "amount {:?} exceeds the native maximum",
            text
        )));
    }
    let whole = if int_digits.is_empty() {
        0
    } else {
        int_digits
            .parse::<u64>()
            .map_err(|_| TxError::invalid_amount(text, "not a decimal number"))?
    };
    let frac = if frac_significant.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac_significant, width = NATIVE_DECIMALS)
            .parse::<u64>()
            .map_err(|_| TxError::invalid_amount(text, "not a decimal number"))?
    };

    let drops = whole * DROPS_PER_XRP + frac;
    if drops > MAX_NATIVE_DROPS {
        return Err(TxError::ValueOutOfRange(format!(
            "amount {:?} exceeds the native maximum",
            text
        )));
    }
    Ok(drops)
}
