//! Canonical binary serialization.

use super::{Field, FieldMap, FieldValue};
use crate::error::TxError;
use crate::types::path::{PATH_SEPARATOR, PATH_SET_END};
use crate::types::{Amount, PathSet};

/// Largest length a variable-length prefix can express.
pub const MAX_VL_LENGTH: usize = 918_744;

/// Which fields a serialization covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Every field; the form that is hashed into the transaction id.
    All,
    /// Signing fields only; the form covered by the signature.
    SigningOnly,
}

impl Scope {
    fn includes(self, field: Field) -> bool {
        match self {
            Scope::All => true,
            Scope::SigningOnly => field.is_signing(),
        }
    }
}

/// Appends canonical field encodings to a byte buffer.
#[derive(Debug, Default)]
pub struct BinarySerializer {
    buf: Vec<u8>,
}

impl BinarySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the buffer with a 4-byte hash prefix.
    pub fn with_prefix(prefix: [u8; 4]) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&prefix);
        Self { buf }
    }

    /// Writes one field: header then value.
    pub fn write_field(&mut self, field: Field, value: &FieldValue) -> Result<(), TxError> {
        self.buf.extend_from_slice(&field.header());
        self.write_value(value)
    }

    fn write_value(&mut self, value: &FieldValue) -> Result<(), TxError> {
        match value {
            FieldValue::UInt16(v) => self.buf.extend_from_slice(&v.to_be_bytes()),
            FieldValue::UInt32(v) => self.buf.extend_from_slice(&v.to_be_bytes()),
            FieldValue::Hash256(v) => self.buf.extend_from_slice(v),
            FieldValue::Amount(amount) => self.write_amount(amount),
            FieldValue::Blob(bytes) => {
                self.write_vl_length(bytes.len())?;
                self.buf.extend_from_slice(bytes);
            }
            FieldValue::AccountId(account) => {
                self.write_vl_length(account.as_bytes().len())?;
                self.buf.extend_from_slice(account.as_bytes());
            }
            FieldValue::PathSet(paths) => self.write_path_set(paths),
        }
        Ok(())
    }

    fn write_amount(&mut self, amount: &Amount) {
        match amount {
            Amount::Native(drops) => self
                .buf
                .extend_from_slice(&Amount::native_bits(*drops).to_be_bytes()),
            Amount::Issued(issued) => {
                self.buf
                    .extend_from_slice(&issued.value.to_bits().to_be_bytes());
                self.buf.extend_from_slice(issued.currency.as_bytes());
                self.buf.extend_from_slice(issued.issuer.as_bytes());
            }
        }
    }

    fn write_path_set(&mut self, paths: &PathSet) {
        for (i, path) in paths.paths().iter().enumerate() {
            if i > 0 {
                self.buf.push(PATH_SEPARATOR);
            }
            for step in path.steps() {
                self.buf.push(step.type_byte());
                if let Some(account) = &step.account {
                    self.buf.extend_from_slice(account.as_bytes());
                }
                if let Some(currency) = &step.currency {
                    self.buf.extend_from_slice(currency.as_bytes());
                }
                if let Some(issuer) = &step.issuer {
                    self.buf.extend_from_slice(issuer.as_bytes());
                }
            }
        }
        self.buf.push(PATH_SET_END);
    }

    /// Writes a 1 to 3 byte variable-length prefix.
    pub fn write_vl_length(&mut self, len: usize) -> Result<(), TxError> {
        if len <= 192 {
            self.buf.push(len as u8);
        } else if len <= 12_480 {
            let len = len - 193;
            self.buf.push(193 + (len >> 8) as u8);
            self.buf.push((len & 0xFF) as u8);
        } else if len <= MAX_VL_LENGTH {
            let len = len - 12_481;
            self.buf.push(241 + (len >> 16) as u8);
            self.buf.push(((len >> 8) & 0xFF) as u8);
            self.buf.push((len & 0xFF) as u8);
        } else {
            return Err(TxError::Encoding(format!(
                "variable-length value of {} bytes exceeds {}",
                len, MAX_VL_LENGTH
            )));
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Serializes the fields within `scope`, in canonical order.
pub fn serialize(fields: &FieldMap, scope: Scope) -> Result<Vec<u8>, TxError> {
    serialize_into(BinarySerializer::new(), fields, scope)
}

/// Like [`serialize`] but behind a 4-byte hash prefix.
pub fn serialize_prefixed(
    prefix: [u8; 4],
    fields: &FieldMap,
    scope: Scope,
) -> Result<Vec<u8>, TxError> {
    serialize_into(BinarySerializer::with_prefix(prefix), fields, scope)
}

fn serialize_into(
    mut serializer: BinarySerializer,
    fields: &FieldMap,
    scope: Scope,
) -> Result<Vec<u8>, TxError> {
    for (field, value) in fields.iter().filter(|(field, _)| scope.includes(*field)) {
        serializer.write_field(field, value)?;
    }
    Ok(serializer.finish())
}
