//! # Ledger Value Types
//!
//! Accounts, currencies, amounts and routing paths, each with a text form
//! for humans and a fixed layout on the wire.

pub mod account;
pub mod amount;
pub mod currency;
pub mod path;

pub use account::AccountId;
pub use amount::{Amount, IssuedAmount, IssuedValue};
pub use currency::Currency;
pub use path::{Path, PathSet, PathStep};
