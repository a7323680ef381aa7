//! Strict decoding of canonical bytes.
//!
//! Anything a validator would reject is rejected here as well: unknown
//! fields, fields out of canonical order, duplicates, truncated values and
//! non-canonical amounts. Every failure is a [`TxError::Encoding`].

use super::{Field, FieldMap, FieldValue, TypeCode};
use crate::config::{ACCOUNT_ID_LENGTH, CURRENCY_LENGTH};
use crate::error::TxError;
use crate::types::path::{
    Path, PathSet, PathStep, PATH_SEPARATOR, PATH_SET_END, STEP_ACCOUNT, STEP_CURRENCY,
    STEP_ISSUER,
};
use crate::types::{AccountId, Amount, Currency, IssuedAmount, IssuedValue};

/// A cursor over canonical bytes.
#[derive(Debug)]
pub struct BinaryParser<'a> {
    data: &'a [u8],
    pos: usize,
}

fn malformed(reason: impl Into<String>) -> TxError {
    TxError::Encoding(reason.into())
}

impl<'a> BinaryParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, TxError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| malformed(format!("unexpected end of input at byte {}", self.pos)))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], TxError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                malformed(format!(
                    "needed {} bytes at byte {}, only {} left",
                    len,
                    self.pos,
                    self.data.len() - self.pos
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TxError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_u64(&mut self) -> Result<u64, TxError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads a field header and resolves it against the definition table.
    pub fn read_field(&mut self) -> Result<Field, TxError> {
        let first = self.read_u8()?;
        let mut type_code = first >> 4;
        let mut nth = first & 0x0F;
        if type_code == 0 {
            type_code = self.read_u8()?;
            if type_code < 16 {
                return Err(malformed("non-canonical field header"));
            }
        }
        if nth == 0 {
            nth = self.read_u8()?;
            if nth < 16 {
                return Err(malformed("non-canonical field header"));
            }
        }
        Field::from_codes(type_code, nth)
            .ok_or_else(|| malformed(format!("unknown field (type {}, code {})", type_code, nth)))
    }

    /// Reads a 1 to 3 byte variable-length prefix.
    pub fn read_vl_length(&mut self) -> Result<usize, TxError> {
        let b1 = self.read_u8()? as usize;
        match b1 {
            0..=192 => Ok(b1),
            193..=240 => {
                let b2 = self.read_u8()? as usize;
                Ok(193 + (b1 - 193) * 256 + b2)
            }
            241..=254 => {
                let b2 = self.read_u8()? as usize;
                let b3 = self.read_u8()? as usize;
                Ok(12_481 + (b1 - 241) * 65_536 + b2 * 256 + b3)
            }
            _ => Err(malformed("invalid variable-length prefix")),
        }
    }

    /// Reads the value of a field whose header was just consumed.
    pub fn read_value(&mut self, field: Field) -> Result<FieldValue, TxError> {
        let value = match field.type_code() {
            TypeCode::UInt16 => FieldValue::UInt16(u16::from_be_bytes(self.read_array()?)),
            TypeCode::UInt32 => FieldValue::UInt32(u32::from_be_bytes(self.read_array()?)),
            TypeCode::Hash256 => FieldValue::Hash256(self.read_array()?),
            TypeCode::Amount => FieldValue::Amount(self.read_amount()?),
            TypeCode::Blob => {
                let len = self.read_vl_length()?;
                FieldValue::Blob(self.read_bytes(len)?.to_vec())
            }
            TypeCode::AccountId => {
                let len = self.read_vl_length()?;
                if len != ACCOUNT_ID_LENGTH {
                    return Err(malformed(format!(
                        "{} is {} bytes, expected {}",
                        field, len, ACCOUNT_ID_LENGTH
                    )));
                }
                FieldValue::AccountId(AccountId::from_bytes(self.read_array()?))
            }
            TypeCode::PathSet => FieldValue::PathSet(self.read_path_set()?),
        };
        Ok(value)
    }

    fn read_amount(&mut self) -> Result<Amount, TxError> {
        let bits = self.read_u64()?;
        if !Amount::bits_are_issued(bits) {
            let drops = Amount::native_from_bits(bits).map_err(malformed)?;
            return Ok(Amount::Native(drops));
        }
        let value = IssuedValue::from_bits(bits).map_err(malformed)?;
        let currency = Currency::from_bytes(self.read_array::<CURRENCY_LENGTH>()?);
        if currency.is_native() {
            return Err(malformed("issued amount in the native currency"));
        }
        let issuer = AccountId::from_bytes(self.read_array()?);
        Ok(Amount::Issued(IssuedAmount {
            value,
            currency,
            issuer,
        }))
    }

    fn read_path_set(&mut self) -> Result<PathSet, TxError> {
        let mut paths = Vec::new();
        let mut steps = Vec::new();
        loop {
            match self.read_u8()? {
                PATH_SET_END => {
                    if steps.is_empty() {
                        if !paths.is_empty() {
                            return Err(malformed("path set ends with a separator"));
                        }
                    } else {
                        paths.push(Path(steps));
                    }
                    return Ok(PathSet(paths));
                }
                PATH_SEPARATOR => {
                    if steps.is_empty() {
                        return Err(malformed("empty path in path set"));
                    }
                    paths.push(Path(std::mem::take(&mut steps)));
                }
                type_byte => steps.push(self.read_path_step(type_byte)?),
            }
        }
    }

    fn read_path_step(&mut self, type_byte: u8) -> Result<PathStep, TxError> {
        if type_byte & !(STEP_ACCOUNT | STEP_CURRENCY | STEP_ISSUER) != 0 {
            return Err(malformed(format!("unknown path step type 0x{:02X}", type_byte)));
        }
        let mut step = PathStep::default();
        if type_byte & STEP_ACCOUNT != 0 {
            step.account = Some(AccountId::from_bytes(self.read_array()?));
        }
        if type_byte & STEP_CURRENCY != 0 {
            step.currency = Some(Currency::from_bytes(self.read_array()?));
        }
        if type_byte & STEP_ISSUER != 0 {
            step.issuer = Some(AccountId::from_bytes(self.read_array()?));
        }
        Ok(step)
    }
}

/// Decodes a complete canonical serialization into its fields.
pub fn parse_fields(bytes: &[u8]) -> Result<FieldMap, TxError> {
    if bytes.is_empty() {
        return Err(malformed("empty input"));
    }
    let mut parser = BinaryParser::new(bytes);
    let mut fields = FieldMap::new();
    let mut previous: Option<Field> = None;

    while !parser.is_empty() {
        let offset = parser.position();
        let field = parser.read_field()?;
        if let Some(previous) = previous {
            if field == previous {
                return Err(malformed(format!("duplicate field {} at byte {}", field, offset)));
            }
            if field < previous {
                return Err(malformed(format!(
                    "field {} at byte {} is out of canonical order",
                    field, offset
                )));
            }
        }
        let value = parser.read_value(field)?;
        fields.insert(field, value)?;
        previous = Some(field);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::serializer::{serialize, Scope};

    #[test]
    fn vl_lengths_decode() {
        for (bytes, expected) in [
            (vec![0u8], 0usize),
            (vec![192], 192),
            (vec![193, 0], 193),
            (vec![240, 255], 12_480),
            (vec![241, 0, 0], 12_481),
            (vec![254, 212, 23], 918_744),
        ] {
            assert_eq!(BinaryParser::new(&bytes).read_vl_length().unwrap(), expected);
        }
        assert!(BinaryParser::new(&[255]).read_vl_length().is_err());
    }

    #[test]
    fn decodes_what_the_serializer_writes() {
        let mut fields = FieldMap::new();
        fields.insert(Field::TransactionType, FieldValue::UInt16(0)).unwrap();
        fields.insert(Field::QualityIn, FieldValue::UInt32(1_000_000_000)).unwrap();
        fields.insert(Field::InvoiceId, FieldValue::Hash256([7u8; 32])).unwrap();
        fields.insert(Field::Fee, FieldValue::Amount(Amount::Native(12))).unwrap();
        fields.insert(Field::SigningPubKey, FieldValue::Blob(vec![2u8; 33])).unwrap();
        fields
            .insert(
                Field::Paths,
                FieldValue::PathSet(PathSet::parse("USD,EUR=>rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap()),
            )
            .unwrap();

        let bytes = serialize(&fields, Scope::All).unwrap();
        assert_eq!(parse_fields(&bytes).unwrap(), fields);
    }

    #[test]
    fn rejects_out_of_order_fields() {
        // Sequence (0x24) before Flags (0x22).
        let bytes = hex::decode("24000000012200000000").unwrap();
        let err = parse_fields(&bytes).unwrap_err();
        assert!(err.to_string().contains("canonical order"));
    }

    #[test]
    fn rejects_duplicates() {
        let bytes = hex::decode("22000000002200000000").unwrap();
        let err = parse_fields(&bytes).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_unknown_fields_and_truncation() {
        // UInt32 field code 9 is not in the table.
        assert!(parse_fields(&hex::decode("2900000000").unwrap()).is_err());
        // Sequence cut short.
        assert!(parse_fields(&hex::decode("240000").unwrap()).is_err());
        assert!(parse_fields(&[]).is_err());
    }

    #[test]
    fn rejects_negative_native_amount() {
        // Fee with the positive bit cleared.
        let bytes = hex::decode("68000000000000000A").unwrap();
        assert!(matches!(parse_fields(&bytes), Err(TxError::Encoding(_))));
    }

    #[test]
    fn path_separators_must_bracket_steps() {
        const USD: &str = "0000000000000000000000005553440000000000";
        let one_path = format!("0112 10{USD} 00").replace(' ', "");
        let paths = parse_fields(&hex::decode(one_path).unwrap()).unwrap();
        assert_eq!(paths.path_set(Field::Paths).unwrap().paths().len(), 1);

        for bad in [
            format!("0112 10{USD} FF 00"),
            format!("0112 10{USD} FF FF 10{USD} 00"),
            "0112 FF 00".to_string(),
        ] {
            let bytes = hex::decode(bad.replace(' ', "")).unwrap();
            assert!(
                matches!(parse_fields(&bytes), Err(TxError::Encoding(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn rejects_bad_account_length() {
        let bytes = hex::decode("8113B5F762798A53D543A014CAF8B297CFF8F2F937").unwrap();
        assert!(parse_fields(&bytes).is_err());
    }
}
