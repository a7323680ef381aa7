//! Transaction signing.
//!
//! Signing is separate from building so that construction stays testable
//! without key material. The signer owns the common fields (account,
//! sequence, fee, public key) and is the only place a transaction changes
//! after `build()`.

use tracing::{debug, info};

use super::types::Transaction;
use crate::codec::serializer::serialize_prefixed;
use crate::codec::Scope;
use crate::config::{SigningConfig, HASH_PREFIX_TX_SIGN};
use crate::crypto::keys::KeyPair;
use crate::crypto::signatures::verify;
use crate::error::TxError;
use crate::types::Amount;

/// A transaction carrying a signature. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction(Transaction);

impl SignedTransaction {
    /// Wraps a decoded transaction, which must carry a public key and a
    /// non-empty signature.
    pub fn from_transaction(tx: Transaction) -> Result<Self, TxError> {
        if tx.base.signing_pub_key.is_empty() || !tx.is_signed() {
            return Err(TxError::Encoding(
                "transaction is not signed".to_string(),
            ));
        }
        Ok(Self(tx))
    }

    pub fn transaction(&self) -> &Transaction {
        &self.0
    }

    pub fn signature(&self) -> &[u8] {
        self.0.base.txn_signature.as_deref().unwrap_or_default()
    }

    pub fn into_inner(self) -> Transaction {
        self.0
    }

    /// Checks the embedded signature against the embedded public key.
    pub fn verify_signature(&self) -> bool {
        match signing_payload(&self.0) {
            Ok(payload) => verify(&self.0.base.signing_pub_key, &payload, self.signature()),
            Err(_) => false,
        }
    }
}

/// The bytes a signature covers: the signing prefix followed by every
/// signing field in canonical order.
pub fn signing_payload(tx: &Transaction) -> Result<Vec<u8>, TxError> {
    serialize_prefixed(HASH_PREFIX_TX_SIGN, &tx.fields()?, Scope::SigningOnly)
}

/// Signs a built transaction with an already-derived key.
///
/// In order: account from the key, sequence, fee, optional expiry and
/// source tag from `config`, public key, then the signature over
/// [`signing_payload`].
///
/// Fails with [`TxError::Signing`] if `config` selects an algorithm the key
/// was not derived with, or if the payload cannot be serialized.
///
/// # Example
///
/// ```
/// use ripple_tx::config::SigningConfig;
/// use ripple_tx::crypto::Seed;
/// use ripple_tx::transaction::{sign_transaction, TransactionBuilder};
///
/// let seed: Seed = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb".parse().unwrap();
/// let config = SigningConfig::new(seed, 1);
/// let key = config.resolve_keypair().unwrap();
///
/// let tx = TransactionBuilder::payment()
///     .destination("rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe")
///     .amount("1")
///     .build()
///     .unwrap();
/// let signed = sign_transaction(tx, &key, &config).unwrap();
/// assert!(signed.verify_signature());
/// ```
pub fn sign_transaction(
    mut tx: Transaction,
    keypair: &KeyPair,
    config: &SigningConfig,
) -> Result<SignedTransaction, TxError> {
    if let Some(selected) = config.algorithm {
        if selected != keypair.algorithm() {
            return Err(TxError::Signing(format!(
                "{} was selected but the key is {}",
                selected,
                keypair.algorithm()
            )));
        }
    }

    let fee = config.fee_drops();
    Amount::native(fee)?;

    let base = &mut tx.base;
    base.account = keypair.account_id();
    base.sequence = config.sequence;
    base.fee = fee;
    if let Some(height) = config.expiry() {
        base.last_ledger_sequence = Some(height);
    }
    if let Some(tag) = config.source_tag {
        base.source_tag = Some(tag);
    }
    base.signing_pub_key = keypair.public_key().to_vec();
    base.txn_signature = None;

    let payload = signing_payload(&tx).map_err(|e| match e {
        TxError::Encoding(reason) => TxError::Signing(reason),
        other => other,
    })?;
    debug!(
        account = %tx.base.account,
        payload_len = payload.len(),
        "computed signing payload"
    );

    let signature = keypair.sign(&payload)?;
    tx.base.txn_signature = Some(signature);

    info!(
        tx_type = %tx.tx_type(),
        account = %tx.base.account,
        sequence = tx.base.sequence,
        fee = tx.base.fee,
        algorithm = %keypair.algorithm(),
        "transaction signed"
    );
    Ok(SignedTransaction(tx))
}

/// Derives the key from `config` and signs.
///
/// Fails with [`TxError::MissingSeed`] when the configuration has no seed.
pub fn sign_with_config(
    tx: Transaction,
    config: &SigningConfig,
) -> Result<SignedTransaction, TxError> {
    let keypair = config.resolve_keypair()?;
    sign_transaction(tx, &keypair, config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{Algorithm, Seed};
    use crate::transaction::builder::TransactionBuilder;

    const GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
    const DEST: &str = "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe";

    fn payment() -> Transaction {
        TransactionBuilder::payment()
            .destination(DEST)
            .amount("1")
            .build()
            .unwrap()
    }

    fn config() -> SigningConfig {
        let mut config = SigningConfig::new(Seed::from_base58(GENESIS_SEED).unwrap(), 1);
        config.fee = Some(10);
        config
    }

    #[test]
    fn known_vector_payload_and_signature() {
        let config = config();
        let key = config.resolve_keypair().unwrap();
        let signed = sign_transaction(payment(), &key, &config).unwrap();

        assert_eq!(
            hex::encode_upper(signing_payload(signed.transaction()).unwrap()),
            "53545800120000220000000024000000016140000000000F424068400000000000000A\
             73210330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020\
             8114B5F762798A53D543A014CAF8B297CFF8F2F937E8\
             8314F667B0CA50CC7709A220B0561B85E53A48461FA8"
        );
        assert_eq!(
            hex::encode_upper(signed.signature()),
            "304402204C62FE143AA2D3D4AD7F8435AE3A28704ED53CBFF52AE859C66BEC6166C1A2B4\
             0220246CC0FAE312F8DE11016A0404AFCE55CA65F413621414F41031FAF384E6F551"
        );
        assert!(signed.verify_signature());
    }

    #[test]
    fn signer_fills_common_fields() {
        let mut config = config();
        config.fee = None;
        config.last_ledger_sequence = Some(9_000);
        config.source_tag = Some(7);
        let signed = sign_with_config(payment(), &config).unwrap();
        let base = &signed.transaction().base;
        assert_eq!(base.account.to_address(), "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
        assert_eq!(base.sequence, 1);
        assert_eq!(base.fee, 10);
        assert_eq!(base.last_ledger_sequence, Some(9_000));
        assert_eq!(base.source_tag, Some(7));
        assert_eq!(base.signing_pub_key.len(), 33);
    }

    #[test]
    fn zero_last_ledger_is_omitted() {
        let mut config = config();
        config.last_ledger_sequence = Some(0);
        let signed = sign_with_config(payment(), &config).unwrap();
        assert_eq!(signed.transaction().base.last_ledger_sequence, None);
    }

    #[test]
    fn ed25519_signing_verifies() {
        let seed = Seed::from_base58("sEdTM1uX8pu2do5XvTnutH6HsouMaM2").unwrap();
        let config = SigningConfig::new(seed, 5);
        let signed = sign_with_config(payment(), &config).unwrap();
        assert_eq!(signed.signature().len(), 64);
        assert_eq!(
            signed.transaction().base.account.to_address(),
            "rG31cLyErnqeVj2eomEjBZtq7PYaupGYzL"
        );
        assert!(signed.verify_signature());
    }

    #[test]
    fn algorithm_mismatch_is_a_signing_error() {
        let mut config = config();
        let key = config.resolve_keypair().unwrap();
        config.algorithm = Some(Algorithm::Ed25519);
        let err = sign_transaction(payment(), &key, &config).unwrap_err();
        assert!(matches!(err, TxError::Signing(_)));
    }

    #[test]
    fn no_seed_never_reaches_signing() {
        let err = sign_with_config(payment(), &SigningConfig::default()).unwrap_err();
        assert!(matches!(err, TxError::MissingSeed));
    }

    #[test]
    fn signature_excluded_from_payload() {
        let signed = sign_with_config(payment(), &config()).unwrap();
        let mut unsigned = signed.transaction().clone();
        unsigned.base.txn_signature = None;
        assert_eq!(
            signing_payload(signed.transaction()).unwrap(),
            signing_payload(&unsigned).unwrap()
        );
    }

    #[test]
    fn tampering_breaks_verification() {
        let signed = sign_with_config(payment(), &config()).unwrap();
        let mut tx = signed.into_inner();
        tx.base.sequence = 2;
        let tampered = SignedTransaction::from_transaction(tx).unwrap();
        assert!(!tampered.verify_signature());
    }

    #[test]
    fn fee_above_the_native_maximum_is_rejected() {
        use crate::config::MAX_NATIVE_DROPS;

        for fee in [MAX_NATIVE_DROPS + 1, 1 << 62, u64::MAX] {
            let mut config = config();
            config.fee = Some(fee);
            let err = sign_with_config(payment(), &config).unwrap_err();
            assert!(matches!(err, TxError::ValueOutOfRange(_)), "fee {fee}: {err}");
        }

        let mut config = config();
        config.fee = Some(MAX_NATIVE_DROPS);
        let signed = sign_with_config(payment(), &config).unwrap();
        assert_eq!(signed.transaction().base.fee, MAX_NATIVE_DROPS);
    }

    #[test]
    fn unsigned_input_is_not_a_signed_transaction() {
        assert!(SignedTransaction::from_transaction(payment()).is_err());
    }
}
