//! Transaction records and their field schemas.
//!
//! A [`Transaction`] is a shared [`TransactionBase`] plus one
//! [`TransactionKind`] variant. Each transaction type lists its fields once,
//! in [`TransactionType::schema`]; lowering to a [`FieldMap`] and lifting
//! back from one both go through that table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{Field, FieldMap, FieldValue};
use crate::error::TxError;
use crate::types::{AccountId, Amount, IssuedAmount, PathSet};

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Supported transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Value transfer, optionally cross-currency.
    Payment,
    /// Create or modify a trust line.
    TrustSet,
}

/// One entry of a type's field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub required: bool,
}

const fn required(field: Field) -> FieldRule {
    FieldRule {
        field,
        required: true,
    }
}

const fn optional(field: Field) -> FieldRule {
    FieldRule {
        field,
        required: false,
    }
}

const PAYMENT_SCHEMA: &[FieldRule] = &[
    required(Field::TransactionType),
    optional(Field::Flags),
    optional(Field::SourceTag),
    required(Field::Sequence),
    optional(Field::DestinationTag),
    optional(Field::LastLedgerSequence),
    optional(Field::InvoiceId),
    required(Field::Amount),
    required(Field::Fee),
    optional(Field::SendMax),
    required(Field::SigningPubKey),
    optional(Field::TxnSignature),
    required(Field::Account),
    required(Field::Destination),
    optional(Field::Paths),
];

const TRUST_SET_SCHEMA: &[FieldRule] = &[
    required(Field::TransactionType),
    optional(Field::Flags),
    optional(Field::SourceTag),
    required(Field::Sequence),
    optional(Field::QualityIn),
    optional(Field::QualityOut),
    optional(Field::LastLedgerSequence),
    required(Field::LimitAmount),
    required(Field::Fee),
    required(Field::SigningPubKey),
    optional(Field::TxnSignature),
    required(Field::Account),
];

impl TransactionType {
    /// Wire code carried in the `TransactionType` field.
    pub fn code(self) -> u16 {
        match self {
            Self::Payment => 0,
            Self::TrustSet => 20,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Payment),
            20 => Some(Self::TrustSet),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Payment => "Payment",
            Self::TrustSet => "TrustSet",
        }
    }

    /// Every field the type may carry, in canonical order.
    pub fn schema(self) -> &'static [FieldRule] {
        match self {
            Self::Payment => PAYMENT_SCHEMA,
            Self::TrustSet => TRUST_SET_SCHEMA,
        }
    }

    /// Checks a field map against the schema: nothing foreign, nothing
    /// required missing.
    pub fn check_fields(self, fields: &FieldMap) -> Result<(), TxError> {
        let schema = self.schema();
        for (field, _) in fields.iter() {
            if !schema.iter().any(|rule| rule.field == field) {
                return Err(TxError::Encoding(format!(
                    "field {} is not allowed in a {}",
                    field,
                    self.name()
                )));
            }
        }
        for rule in schema.iter().filter(|rule| rule.required) {
            if !fields.contains(rule.field) {
                return Err(TxError::Encoding(format!(
                    "{} is missing required field {}",
                    self.name(),
                    rule.field
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Fields every transaction type shares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBase {
    /// Sending account; zero until the signer fills it in.
    pub account: AccountId,
    pub sequence: u32,
    /// Fee in drops.
    pub fee: u64,
    /// Always `Some` on built transactions; decoded ones may omit it.
    pub flags: Option<u32>,
    pub source_tag: Option<u32>,
    pub last_ledger_sequence: Option<u32>,
    pub signing_pub_key: Vec<u8>,
    /// Absent until signed.
    pub txn_signature: Option<Vec<u8>>,
}

/// Payment-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub destination: AccountId,
    pub amount: Amount,
    pub send_max: Option<Amount>,
    pub paths: Option<PathSet>,
    pub destination_tag: Option<u32>,
    pub invoice_id: Option<[u8; 32]>,
}

/// TrustSet-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustSet {
    pub limit_amount: IssuedAmount,
    /// Ratio scaled by 1e9.
    pub quality_in: Option<u32>,
    /// Ratio scaled by 1e9.
    pub quality_out: Option<u32>,
}

/// The closed set of transaction bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Payment(Payment),
    TrustSet(TrustSet),
}

/// A transaction that may or may not be signed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub base: TransactionBase,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(kind: TransactionKind) -> Self {
        Self {
            base: TransactionBase::default(),
            kind,
        }
    }

    pub fn tx_type(&self) -> TransactionType {
        match self.kind {
            TransactionKind::Payment(_) => TransactionType::Payment,
            TransactionKind::TrustSet(_) => TransactionType::TrustSet,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.base
            .txn_signature
            .as_ref()
            .is_some_and(|signature| !signature.is_empty())
    }

    /// Lowers the record into its fields.
    pub fn fields(&self) -> Result<FieldMap, TxError> {
        let base = &self.base;
        let mut fields = FieldMap::new();
        fields.insert(
            Field::TransactionType,
            FieldValue::UInt16(self.tx_type().code()),
        )?;
        fields.insert_opt(Field::Flags, base.flags.map(FieldValue::UInt32))?;
        fields.insert_opt(Field::SourceTag, base.source_tag.map(FieldValue::UInt32))?;
        fields.insert(Field::Sequence, FieldValue::UInt32(base.sequence))?;
        fields.insert_opt(
            Field::LastLedgerSequence,
            base.last_ledger_sequence.map(FieldValue::UInt32),
        )?;
        fields.insert(Field::Fee, FieldValue::Amount(Amount::native(base.fee)?))?;
        fields.insert(
            Field::SigningPubKey,
            FieldValue::Blob(base.signing_pub_key.clone()),
        )?;
        fields.insert_opt(
            Field::TxnSignature,
            base.txn_signature.clone().map(FieldValue::Blob),
        )?;
        fields.insert(Field::Account, FieldValue::AccountId(base.account))?;

        match &self.kind {
            TransactionKind::Payment(payment) => {
                fields.insert(Field::Destination, FieldValue::AccountId(payment.destination))?;
                fields.insert(Field::Amount, FieldValue::Amount(payment.amount))?;
                fields.insert_opt(Field::SendMax, payment.send_max.map(FieldValue::Amount))?;
                fields.insert_opt(Field::Paths, payment.paths.clone().map(FieldValue::PathSet))?;
                fields.insert_opt(
                    Field::DestinationTag,
                    payment.destination_tag.map(FieldValue::UInt32),
                )?;
                fields.insert_opt(Field::InvoiceId, payment.invoice_id.map(FieldValue::Hash256))?;
            }
            TransactionKind::TrustSet(trust) => {
                fields.insert(
                    Field::LimitAmount,
                    FieldValue::Amount(Amount::Issued(trust.limit_amount)),
                )?;
                fields.insert_opt(Field::QualityIn, trust.quality_in.map(FieldValue::UInt32))?;
                fields.insert_opt(Field::QualityOut, trust.quality_out.map(FieldValue::UInt32))?;
            }
        }
        Ok(fields)
    }

    /// Lifts decoded fields back into a record, enforcing the type's schema.
    pub fn from_fields(fields: &FieldMap) -> Result<Self, TxError> {
        let code = fields
            .u16(Field::TransactionType)
            .ok_or_else(|| TxError::Encoding("missing TransactionType".to_string()))?;
        let tx_type = TransactionType::from_code(code)
            .ok_or_else(|| TxError::Encoding(format!("unsupported transaction type {}", code)))?;
        tx_type.check_fields(fields)?;

        // check_fields guarantees the required fields below are present.
        let missing = |field: Field| TxError::Encoding(format!("missing {}", field));
        let fee = match fields.amount(Field::Fee) {
            Some(Amount::Native(drops)) => drops,
            Some(Amount::Issued(_)) => {
                return Err(TxError::Encoding("Fee must be a native amount".to_string()))
            }
            None => return Err(missing(Field::Fee)),
        };
        let base = TransactionBase {
            account: fields
                .account(Field::Account)
                .ok_or_else(|| missing(Field::Account))?,
            sequence: fields
                .u32(Field::Sequence)
                .ok_or_else(|| missing(Field::Sequence))?,
            fee,
            flags: fields.u32(Field::Flags),
            source_tag: fields.u32(Field::SourceTag),
            last_ledger_sequence: fields.u32(Field::LastLedgerSequence),
            signing_pub_key: fields
                .blob(Field::SigningPubKey)
                .ok_or_else(|| missing(Field::SigningPubKey))?
                .to_vec(),
            txn_signature: fields.blob(Field::TxnSignature).map(<[u8]>::to_vec),
        };

        let kind = match tx_type {
            TransactionType::Payment => TransactionKind::Payment(Payment {
                destination: fields
                    .account(Field::Destination)
                    .ok_or_else(|| missing(Field::Destination))?,
                amount: fields
                    .amount(Field::Amount)
                    .ok_or_else(|| missing(Field::Amount))?,
                send_max: fields.amount(Field::SendMax),
                paths: fields.path_set(Field::Paths).cloned(),
                destination_tag: fields.u32(Field::DestinationTag),
                invoice_id: fields.hash256(Field::InvoiceId),
            }),
            TransactionType::TrustSet => {
                let limit_amount = match fields.amount(Field::LimitAmount) {
                    Some(Amount::Issued(issued)) => issued,
                    Some(Amount::Native(_)) => {
                        return Err(TxError::Encoding(
                            "LimitAmount must be an issued amount".to_string(),
                        ))
                    }
                    None => return Err(missing(Field::LimitAmount)),
                };
                TransactionKind::TrustSet(TrustSet {
                    limit_amount,
                    quality_in: fields.u32(Field::QualityIn),
                    quality_out: fields.u32(Field::QualityOut),
                })
            }
        };
        Ok(Self { base, kind })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, IssuedValue};

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn trust_set() -> Transaction {
        Transaction::new(TransactionKind::TrustSet(TrustSet {
            limit_amount: IssuedAmount {
                value: IssuedValue::parse("100").unwrap(),
                currency: Currency::parse("USD").unwrap(),
                issuer: AccountId::from_address(GENESIS).unwrap(),
            },
            quality_in: Some(1_000_000_000),
            quality_out: None,
        }))
    }

    #[test]
    fn schemas_are_in_canonical_order() {
        for tx_type in [TransactionType::Payment, TransactionType::TrustSet] {
            let fields: Vec<Field> = tx_type.schema().iter().map(|rule| rule.field).collect();
            let mut sorted = fields.clone();
            sorted.sort();
            assert_eq!(fields, sorted, "{tx_type}");
        }
    }

    #[test]
    fn type_codes() {
        assert_eq!(TransactionType::Payment.code(), 0);
        assert_eq!(TransactionType::TrustSet.code(), 20);
        assert_eq!(TransactionType::from_code(20), Some(TransactionType::TrustSet));
        assert_eq!(TransactionType::from_code(3), None);
    }

    #[test]
    fn lowering_respects_the_schema() {
        let tx = trust_set();
        let fields = tx.fields().unwrap();
        TransactionType::TrustSet.check_fields(&fields).unwrap();
        assert!(fields.contains(Field::QualityIn));
        assert!(!fields.contains(Field::QualityOut));
        assert!(!fields.contains(Field::TxnSignature));
    }

    #[test]
    fn out_of_range_fee_is_not_lowered() {
        let mut tx = trust_set();
        tx.base.fee = crate::config::MAX_NATIVE_DROPS + 1;
        assert!(matches!(tx.fields(), Err(TxError::ValueOutOfRange(_))));
    }

    #[test]
    fn lift_inverts_lower() {
        let mut tx = trust_set();
        tx.base.flags = Some(0x0002_0000);
        tx.base.txn_signature = Some(vec![1, 2, 3]);
        let lifted = Transaction::from_fields(&tx.fields().unwrap()).unwrap();
        assert_eq!(lifted, tx);
    }

    #[test]
    fn foreign_fields_are_rejected() {
        let mut fields = trust_set().fields().unwrap();
        fields
            .insert(Field::Destination, FieldValue::AccountId(AccountId::default()))
            .unwrap();
        assert!(matches!(
            Transaction::from_fields(&fields),
            Err(TxError::Encoding(_))
        ));
    }

    #[test]
    fn native_trust_limit_is_rejected() {
        let mut fields = trust_set().fields().unwrap();
        fields
            .insert(Field::LimitAmount, FieldValue::Amount(Amount::Native(5)))
            .unwrap();
        assert!(Transaction::from_fields(&fields).is_err());
    }
}
