//! The field definition table.
//!
//! Every field a supported transaction can carry, with its type code, field
//! code ("nth") and whether it is covered by the signature. Fields serialize
//! in ascending `(type code, nth)` order, which is also the [`Ord`] of
//! [`Field`].

use std::cmp::Ordering;
use std::fmt;

/// Wire type of a field's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeCode {
    UInt16 = 1,
    UInt32 = 2,
    Hash256 = 5,
    Amount = 6,
    Blob = 7,
    AccountId = 8,
    PathSet = 18,
}

impl TypeCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A named field from the network-wide definition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    TransactionType,
    Flags,
    SourceTag,
    Sequence,
    DestinationTag,
    QualityIn,
    QualityOut,
    LastLedgerSequence,
    InvoiceId,
    Amount,
    LimitAmount,
    Fee,
    SendMax,
    SigningPubKey,
    TxnSignature,
    Account,
    Destination,
    Paths,
}

impl Field {
    /// All known fields, in canonical order.
    pub const ALL: [Field; 18] = [
        Field::TransactionType,
        Field::Flags,
        Field::SourceTag,
        Field::Sequence,
        Field::DestinationTag,
        Field::QualityIn,
        Field::QualityOut,
        Field::LastLedgerSequence,
        Field::InvoiceId,
        Field::Amount,
        Field::LimitAmount,
        Field::Fee,
        Field::SendMax,
        Field::SigningPubKey,
        Field::TxnSignature,
        Field::Account,
        Field::Destination,
        Field::Paths,
    ];

    pub fn type_code(self) -> TypeCode {
        match self {
            Field::TransactionType => TypeCode::UInt16,
            Field::Flags
            | Field::SourceTag
            | Field::Sequence
            | Field::DestinationTag
            | Field::QualityIn
            | Field::QualityOut
            | Field::LastLedgerSequence => TypeCode::UInt32,
            Field::InvoiceId => TypeCode::Hash256,
            Field::Amount | Field::LimitAmount | Field::Fee | Field::SendMax => TypeCode::Amount,
            Field::SigningPubKey | Field::TxnSignature => TypeCode::Blob,
            Field::Account | Field::Destination => TypeCode::AccountId,
            Field::Paths => TypeCode::PathSet,
        }
    }

    /// Field code within its type.
    pub fn nth(self) -> u8 {
        match self {
            Field::TransactionType => 2,
            Field::Flags => 2,
            Field::SourceTag => 3,
            Field::Sequence => 4,
            Field::DestinationTag => 14,
            Field::QualityIn => 20,
            Field::QualityOut => 21,
            Field::LastLedgerSequence => 27,
            Field::InvoiceId => 17,
            Field::Amount => 1,
            Field::LimitAmount => 3,
            Field::Fee => 8,
            Field::SendMax => 9,
            Field::SigningPubKey => 3,
            Field::TxnSignature => 4,
            Field::Account => 1,
            Field::Destination => 3,
            Field::Paths => 1,
        }
    }

    /// Name used in the structured representation.
    pub fn name(self) -> &'static str {
        match self {
            Field::TransactionType => "TransactionType",
            Field::Flags => "Flags",
            Field::SourceTag => "SourceTag",
            Field::Sequence => "Sequence",
            Field::DestinationTag => "DestinationTag",
            Field::QualityIn => "QualityIn",
            Field::QualityOut => "QualityOut",
            Field::LastLedgerSequence => "LastLedgerSequence",
            Field::InvoiceId => "InvoiceID",
            Field::Amount => "Amount",
            Field::LimitAmount => "LimitAmount",
            Field::Fee => "Fee",
            Field::SendMax => "SendMax",
            Field::SigningPubKey => "SigningPubKey",
            Field::TxnSignature => "TxnSignature",
            Field::Account => "Account",
            Field::Destination => "Destination",
            Field::Paths => "Paths",
        }
    }

    /// Whether the field is part of the signing payload.
    pub fn is_signing(self) -> bool {
        !matches!(self, Field::TxnSignature)
    }

    /// The canonical ordering key.
    pub fn sort_key(self) -> (u8, u8) {
        (self.type_code().code(), self.nth())
    }

    /// Looks a field up by its wire codes.
    pub fn from_codes(type_code: u8, nth: u8) -> Option<Field> {
        Self::ALL
            .into_iter()
            .find(|field| field.sort_key() == (type_code, nth))
    }

    /// The field header: one to three bytes depending on code sizes.
    pub fn header(self) -> Vec<u8> {
        let type_code = self.type_code().code();
        let nth = self.nth();
        match (type_code < 16, nth < 16) {
            (true, true) => vec![(type_code << 4) | nth],
            (false, true) => vec![nth, type_code],
            (true, false) => vec![type_code << 4, nth],
            (false, false) => vec![0, type_code, nth],
        }
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
