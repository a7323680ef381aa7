//! Flag bits and the named options that select them.
//!
//! Each transaction type has a fixed `{option name → bit}` table; the
//! selected options are folded into one bitmask. Nothing is implied: no
//! selected options means flags are zero.

use tracing::warn;

use crate::error::TxError;

/// Payment: do not use the default path.
pub const TF_NO_DIRECT_RIPPLE: u32 = 0x0001_0000;
/// Payment: deliver less than the full amount if needed.
pub const TF_PARTIAL_PAYMENT: u32 = 0x0002_0000;
/// Payment: only take paths at or above the implied quality.
pub const TF_LIMIT_QUALITY: u32 = 0x0004_0000;

/// TrustSet: authorize the counterparty to hold the issued currency.
pub const TF_SET_AUTH: u32 = 0x0001_0000;
/// TrustSet: block rippling through this trust line.
pub const TF_SET_NO_RIPPLE: u32 = 0x0002_0000;
/// TrustSet: allow rippling through this trust line again.
pub const TF_CLEAR_NO_RIPPLE: u32 = 0x0004_0000;
/// TrustSet: freeze the trust line.
pub const TF_SET_FREEZE: u32 = 0x0010_0000;
/// TrustSet: unfreeze the trust line.
pub const TF_CLEAR_FREEZE: u32 = 0x0020_0000;

/// One named boolean option and the bit it sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagOption {
    pub name: &'static str,
    pub bit: u32,
}

const fn option(name: &'static str, bit: u32) -> FlagOption {
    FlagOption { name, bit }
}

/// Options accepted by a Payment.
pub const PAYMENT_OPTIONS: &[FlagOption] = &[
    option("nodirect", TF_NO_DIRECT_RIPPLE),
    option("partial", TF_PARTIAL_PAYMENT),
    option("limit", TF_LIMIT_QUALITY),
];

/// Options accepted by a TrustSet.
pub const TRUST_SET_OPTIONS: &[FlagOption] = &[
    option("auth", TF_SET_AUTH),
    option("noripple", TF_SET_NO_RIPPLE),
    option("clear-noripple", TF_CLEAR_NO_RIPPLE),
    option("freeze", TF_SET_FREEZE),
    option("clear-freeze", TF_CLEAR_FREEZE),
];

/// Pairs of bits that undo each other.
pub const OPPOSING_BITS: &[(u32, u32)] = &[
    (TF_SET_NO_RIPPLE, TF_CLEAR_NO_RIPPLE),
    (TF_SET_FREEZE, TF_CLEAR_FREEZE),
];

/// Folds the selected option names into a bitmask.
///
/// Fails with [`TxError::UnknownOption`] for a name not in `table`.
pub fn fold_options<'a, I>(
    tx_type: &'static str,
    table: &[FlagOption],
    selected: I,
) -> Result<u32, TxError>
where
    I: IntoIterator<Item = &'a str>,
{
    selected.into_iter().try_fold(0u32, |flags, name| {
        table
            .iter()
            .find(|option| option.name == name)
            .map(|option| flags | option.bit)
            .ok_or_else(|| TxError::UnknownOption {
                tx_type,
                option: name.to_string(),
            })
    })
}

/// Logs a warning for every opposing pair that is fully selected.
///
/// Both bits are kept; the ledger decides what the combination means.
pub fn warn_on_opposing(tx_type: &'static str, flags: u32) {
    for (set, clear) in OPPOSING_BITS {
        if flags & set != 0 && flags & clear != 0 {
            warn!(
                tx_type = tx_type,
                flags = %format!("{:#010x}", flags),
                "opposing flags selected together: {:#x} and {:#x}",
                set,
                clear
            );
        }
    }
}

/// Names of the options in `table` whose bits are set in `flags`.
pub fn option_names(table: &[FlagOption], flags: u32) -> Vec<&'static str> {
    table
        .iter()
        .filter(|option| flags & option.bit != 0)
        .map(|option| option.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodirect_and_partial_compose_exactly() {
        let flags = fold_options("Payment", PAYMENT_OPTIONS, ["nodirect", "partial"]).unwrap();
        assert_eq!(flags, TF_NO_DIRECT_RIPPLE | TF_PARTIAL_PAYMENT);
        assert_eq!(flags, 0x0003_0000);
    }

    #[test]
    fn each_trust_option_sets_only_its_bit() {
        let expected = [
            ("auth", TF_SET_AUTH),
            ("noripple", TF_SET_NO_RIPPLE),
            ("clear-noripple", TF_CLEAR_NO_RIPPLE),
            ("freeze", TF_SET_FREEZE),
            ("clear-freeze", TF_CLEAR_FREEZE),
        ];
        for (name, bit) in expected {
            let flags = fold_options("TrustSet", TRUST_SET_OPTIONS, [name]).unwrap();
            assert_eq!(flags, bit, "{name}");
            assert_eq!(flags.count_ones(), 1);
        }
    }

    #[test]
    fn nothing_selected_is_zero() {
        assert_eq!(fold_options("Payment", PAYMENT_OPTIONS, std::iter::empty()).unwrap(), 0);
    }

    #[test]
    fn options_do_not_cross_types() {
        let err = fold_options("Payment", PAYMENT_OPTIONS, ["freeze"]).unwrap_err();
        assert!(matches!(err, TxError::UnknownOption { option, .. } if option == "freeze"));
    }

    #[test]
    fn opposing_pairs_are_kept() {
        let flags =
            fold_options("TrustSet", TRUST_SET_OPTIONS, ["freeze", "clear-freeze"]).unwrap();
        warn_on_opposing("TrustSet", flags);
        assert_eq!(flags, TF_SET_FREEZE | TF_CLEAR_FREEZE);
    }

    #[test]
    fn names_from_bits() {
        assert_eq!(
            option_names(PAYMENT_OPTIONS, TF_PARTIAL_PAYMENT | TF_LIMIT_QUALITY),
            vec!["partial", "limit"]
        );
    }
}
