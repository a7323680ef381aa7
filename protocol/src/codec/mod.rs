//! # Canonical Encoding
//!
//! The binary form validators hash and verify, and the structured (JSON)
//! form humans read.
//!
//! ```text
//! fields.rs     — field definition table and header layout
//! serializer.rs — FieldMap → canonical bytes
//! parser.rs     — canonical bytes → FieldMap (strict)
//! json.rs       — FieldMap → structured representation
//! ```
//!
//! A transaction is first lowered into a [`FieldMap`]: an ordered map from
//! [`Field`] to [`FieldValue`]. Because `Field` orders by
//! `(type code, nth)`, iterating the map *is* the canonical order.

pub mod fields;
pub mod json;
pub mod parser;
pub mod serializer;

use std::collections::BTreeMap;

pub use fields::{Field, TypeCode};
pub use json::to_json;
pub use parser::{parse_fields, BinaryParser};
pub use serializer::{serialize, BinarySerializer, Scope};

use crate::error::TxError;
use crate::types::{AccountId, Amount, PathSet};

/// A typed field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    UInt16(u16),
    UInt32(u32),
    Hash256([u8; 32]),
    Amount(Amount),
    Blob(Vec<u8>),
    AccountId(AccountId),
    PathSet(PathSet),
}

impl FieldValue {
    pub fn type_code(&self) -> TypeCode {
        match self {
            FieldValue::UInt16(_) => TypeCode::UInt16,
            FieldValue::UInt32(_) => TypeCode::UInt32,
            FieldValue::Hash256(_) => TypeCode::Hash256,
            FieldValue::Amount(_) => TypeCode::Amount,
            FieldValue::Blob(_) => TypeCode::Blob,
            FieldValue::AccountId(_) => TypeCode::AccountId,
            FieldValue::PathSet(_) => TypeCode::PathSet,
        }
    }
}

/// Fields of one transaction, kept in canonical order. Each field appears
/// at most once and always holds a value of its declared type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<Field, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    ///
    /// Fails if the value's type does not match the field's type code.
    pub fn insert(&mut self, field: Field, value: FieldValue) -> Result<(), TxError> {
        if field.type_code() != value.type_code() {
            return Err(TxError::Encoding(format!(
                "field {} holds {:?}, not {:?}",
                field,
                field.type_code(),
                value.type_code()
            )));
        }
        self.0.insert(field, value);
        Ok(())
    }

    /// Sets a field when a value is present.
    pub fn insert_opt(
        &mut self,
        field: Field,
        value: Option<FieldValue>,
    ) -> Result<(), TxError> {
        match value {
            Some(value) => self.insert(field, value),
            None => Ok(()),
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldValue> {
        self.0.remove(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // Typed accessors used when lifting a decoded map back into a transaction.

    pub fn u16(&self, field: Field) -> Option<u16> {
        match self.get(field) {
            Some(FieldValue::UInt16(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn u32(&self, field: Field) -> Option<u32> {
        match self.get(field) {
            Some(FieldValue::UInt32(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn hash256(&self, field: Field) -> Option<[u8; 32]> {
        match self.get(field) {
            Some(FieldValue::Hash256(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn amount(&self, field: Field) -> Option<Amount> {
        match self.get(field) {
            Some(FieldValue::Amount(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn blob(&self, field: Field) -> Option<&[u8]> {
        match self.get(field) {
            Some(FieldValue::Blob(v)) => Some(v),
            _ => None,
        }
    }

    pub fn account(&self, field: Field) -> Option<AccountId> {
        match self.get(field) {
            Some(FieldValue::AccountId(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn path_set(&self, field: Field) -> Option<&PathSet> {
        match self.get(field) {
            Some(FieldValue::PathSet(v)) => Some(v),
            _ => None,
        }
    }
}
