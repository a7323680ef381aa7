//! Account identifiers.
//!
//! An [`AccountId`] is the 20-byte RIPEMD160(SHA256(public key)) of the
//! account's master key. Humans see it as a base58check address beginning
//! with `r`.

use std::fmt;
use std::str::FromStr;

use crate::config::{ACCOUNT_ID_LENGTH, ACCOUNT_ID_VERSION};
use crate::crypto::base58;
use crate::crypto::hash::hash160;
use crate::error::TxError;

/// A 20-byte ledger account identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; ACCOUNT_ID_LENGTH]);

impl AccountId {
    /// Wraps raw account id bytes.
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derives the account id owned by a 33-byte public key.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(hash160(public_key))
    }

    /// Parses an `r...` address, validating checksum, version and length.
    pub fn from_address(address: &str) -> Result<Self, TxError> {
        let payload =
            base58::decode_versioned(address, &[ACCOUNT_ID_VERSION], ACCOUNT_ID_LENGTH).map_err(
                |reason| TxError::InvalidAccount {
                    address: address.to_string(),
                    reason,
                },
            )?;
        let mut bytes = [0u8; ACCOUNT_ID_LENGTH];
        bytes.copy_from_slice(&payload);
        Ok(Self(bytes))
    }

    /// Renders the account as an `r...` address.
    pub fn to_address(&self) -> String {
        base58::encode_check(&[ACCOUNT_ID_VERSION], &self.0)
    }

    /// Raw id bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LENGTH] {
        &self.0
    }

    /// `true` for the all-zero id an unsigned transaction starts with.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl FromStr for AccountId {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    #[test]
    fn address_roundtrip() {
        let account = AccountId::from_address(GENESIS).unwrap();
        assert_eq!(account.to_address(), GENESIS);
        assert_eq!(
            hex::encode_upper(account.as_bytes()),
            "B5F762798A53D543A014CAF8B297CFF8F2F937E8"
        );
    }

    #[test]
    fn derived_from_genesis_public_key() {
        let public_key =
            hex::decode("0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020")
                .unwrap();
        assert_eq!(AccountId::from_public_key(&public_key).to_address(), GENESIS);
    }

    #[test]
    fn seed_text_is_not_an_account() {
        let err = AccountId::from_address("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap_err();
        assert!(matches!(err, TxError::InvalidAccount { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!("not-an-address".parse::<AccountId>().is_err());
        assert!("".parse::<AccountId>().is_err());
    }

    #[test]
    fn zero_account_renders() {
        let zero = AccountId::default();
        assert!(zero.is_zero());
        assert_eq!(zero.to_address(), "rrrrrrrrrrrrrrrrrrrrrhoLvTp");
    }
}
