//! # Key Derivation
//!
//! Turns a seed, an account index and an algorithm selector into a
//! [`KeyPair`]. Derivation is a pure function of those three inputs: the
//! same triple always yields the same private key, public key and account.
//!
//! ## secp256k1
//!
//! ```text
//! root_priv    = first valid SHA512Half(seed || u32be(i))              i = 0, 1, ...
//! root_pub     = compress(root_priv * G)
//! tweak        = first valid SHA512Half(root_pub || u32be(index) || u32be(j))
//! account_priv = root_priv + tweak  (mod n)
//! ```
//!
//! "Valid" means a non-zero scalar below the group order.
//!
//! ## ed25519
//!
//! The private key is `SHA512Half(seed)` and the account index is ignored.
//! Public keys carry a leading `0xED` byte so they are 33 bytes, like
//! compressed secp256k1 keys.
//!
//! Key bytes are never logged from this module.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey as EcdsaSigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, NonZeroScalar, PublicKey as EcdsaPublicKey};
use rand::rngs::OsRng;
use rand::RngCore;

use super::base58;
use super::hash::{sha512_half, sha512_half_parts};
use crate::config::{
    ACCOUNT_PUBLIC_KEY_VERSION, ED25519_KEY_PREFIX, ED25519_SEED_VERSION, FAMILY_SEED_VERSION,
    SEED_LENGTH,
};
use crate::error::TxError;
use crate::types::AccountId;

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Signature scheme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA over secp256k1 with index-parameterized sub-keys.
    Secp256k1,
    /// Ed25519; the account index plays no part.
    Ed25519,
}

impl Algorithm {
    /// Name accepted by [`FromStr`] and shown in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
        }
    }
}

impl FromStr for Algorithm {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "secp256k1" => Ok(Self::Secp256k1),
            "ed25519" => Ok(Self::Ed25519),
            _ => Err(TxError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Sixteen bytes of secret entropy plus the algorithm its text encoding
/// announced.
///
/// `Debug` never prints the entropy.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    bytes: [u8; SEED_LENGTH],
    algorithm: Algorithm,
}

impl Seed {
    /// Wraps raw entropy. `algorithm` decides how [`to_base58`](Self::to_base58)
    /// encodes it.
    pub fn from_bytes(bytes: [u8; SEED_LENGTH], algorithm: Algorithm) -> Self {
        Self { bytes, algorithm }
    }

    /// Fresh entropy from the OS RNG.
    pub fn generate(algorithm: Algorithm) -> Self {
        let mut bytes = [0u8; SEED_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes, algorithm }
    }

    /// Parses checksum-protected seed text (`s...` or `sEd...`).
    pub fn from_base58(text: &str) -> Result<Self, TxError> {
        let data = base58::decode_check(text.trim()).map_err(TxError::InvalidSeed)?;

        let (algorithm, payload) = if data.len() == ED25519_SEED_VERSION.len() + SEED_LENGTH
            && data.starts_with(&ED25519_SEED_VERSION)
        {
            (Algorithm::Ed25519, &data[ED25519_SEED_VERSION.len()..])
        } else if data.len() == 1 + SEED_LENGTH && data[0] == FAMILY_SEED_VERSION {
            (Algorithm::Secp256k1, &data[1..])
        } else {
            return Err(TxError::InvalidSeed(
                "unrecognized version prefix or length".to_string(),
            ));
        };

        let mut bytes = [0u8; SEED_LENGTH];
        bytes.copy_from_slice(payload);
        Ok(Self { bytes, algorithm })
    }

    /// Encodes the seed in the text form matching its algorithm.
    pub fn to_base58(&self) -> String {
        match self.algorithm {
            Algorithm::Secp256k1 => base58::encode_check(&[FAMILY_SEED_VERSION], &self.bytes),
            Algorithm::Ed25519 => base58::encode_check(&ED25519_SEED_VERSION, &self.bytes),
        }
    }

    /// The algorithm announced by the seed's encoding.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Raw entropy.
    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.bytes
    }
}

impl FromStr for Seed {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, <redacted>)", self.algorithm)
    }
}

// ---------------------------------------------------------------------------
// Root key
// ---------------------------------------------------------------------------

/// The secp256k1 root ("generator") key shared by every account index of a
/// seed.
struct RootKey {
    private: NonZeroScalar,
    public: Vec<u8>,
}

impl RootKey {
    fn from_seed(seed: &Seed) -> Result<Self, TxError> {
        let private = first_valid_scalar(|counter| {
            sha512_half_parts(&[seed.as_bytes(), &counter.to_be_bytes()])
        })?;
        let public = compress(&private);
        Ok(Self { private, public })
    }

    fn account_key(&self, index: u32) -> Result<EcdsaSigningKey, TxError> {
        let tweak = first_valid_scalar(|counter| {
            sha512_half_parts(&[&self.public, &index.to_be_bytes(), &counter.to_be_bytes()])
        })?;
        let sum = *self.private + *tweak;
        EcdsaSigningKey::from_bytes(&sum.to_bytes())
            .map_err(|_| TxError::Signing("derived account scalar is zero".to_string()))
    }
}

/// Tries `candidate(0)`, `candidate(1)`, ... until one is a usable scalar.
fn first_valid_scalar<F>(candidate: F) -> Result<NonZeroScalar, TxError>
where
    F: Fn(u32) -> [u8; 32],
{
    for counter in 0..=u32::MAX {
        let digest = candidate(counter);
        let scalar: Option<NonZeroScalar> =
            NonZeroScalar::from_repr(FieldBytes::from(digest)).into();
        if let Some(scalar) = scalar {
            return Ok(scalar);
        }
    }
    Err(TxError::Signing(
        "no valid secp256k1 scalar in derivation range".to_string(),
    ))
}

fn compress(scalar: &NonZeroScalar) -> Vec<u8> {
    EcdsaPublicKey::from_secret_scalar(scalar)
        .to_encoded_point(true)
        .as_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum PrivateKey {
    Secp256k1(EcdsaSigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// A derived signing key, its 33-byte public key and the account it owns.
///
/// `KeyPair` deliberately has no `Serialize` impl and a redacted `Debug`.
#[derive(Clone)]
pub struct KeyPair {
    private: PrivateKey,
    public: Vec<u8>,
    account_id: AccountId,
}

impl KeyPair {
    /// Derives the key for `(seed, index, algorithm)`.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_tx::crypto::{Algorithm, KeyPair, Seed};
    ///
    /// let seed = Seed::from_base58("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
    /// let key = KeyPair::derive(&seed, 0, Algorithm::Secp256k1).unwrap();
    /// assert_eq!(key.account_id().to_address(), "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
    /// ```
    pub fn derive(seed: &Seed, index: u32, algorithm: Algorithm) -> Result<Self, TxError> {
        let (private, public) = match algorithm {
            Algorithm::Secp256k1 => {
                let signing_key = RootKey::from_seed(seed)?.account_key(index)?;
                let public = signing_key
                    .verifying_key()
                    .to_encoded_point(true)
                    .as_bytes()
                    .to_vec();
                (PrivateKey::Secp256k1(signing_key), public)
            }
            Algorithm::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::from_bytes(&sha512_half(seed.as_bytes()));
                let mut public = Vec::with_capacity(33);
                public.push(ED25519_KEY_PREFIX);
                public.extend_from_slice(signing_key.verifying_key().as_bytes());
                (PrivateKey::Ed25519(signing_key), public)
            }
        };
        let account_id = AccountId::from_public_key(&public);
        tracing::debug!(account = %account_id, %algorithm, index, "derived key");
        Ok(Self {
            private,
            public,
            account_id,
        })
    }

    /// The algorithm this key signs with.
    pub fn algorithm(&self) -> Algorithm {
        match self.private {
            PrivateKey::Secp256k1(_) => Algorithm::Secp256k1,
            PrivateKey::Ed25519(_) => Algorithm::Ed25519,
        }
    }

    /// The 33-byte public key as embedded in `SigningPubKey`.
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Upper-case hex of the public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(&self.public)
    }

    /// The public key in base58 account-public-key form (`a...`).
    pub fn public_key_base58(&self) -> String {
        base58::encode_check(&[ACCOUNT_PUBLIC_KEY_VERSION], &self.public)
    }

    /// The account this key controls.
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Raw private key bytes. Handle with care; nothing here logs them.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        match &self.private {
            PrivateKey::Secp256k1(key) => key.to_bytes().into(),
            PrivateKey::Ed25519(key) => key.to_bytes(),
        }
    }

    /// Signs `message`.
    ///
    /// secp256k1 signs `SHA512Half(message)` with an RFC 6979 nonce and
    /// returns a low-S DER signature. ed25519 signs the message itself and
    /// returns 64 bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, TxError> {
        match &self.private {
            PrivateKey::Secp256k1(key) => {
                let digest = sha512_half(message);
                let signature: EcdsaSignature = key
                    .sign_prehash(&digest)
                    .map_err(|e| TxError::Signing(e.to_string()))?;
                let signature = signature.normalize_s().unwrap_or(signature);
                Ok(signature.to_der().as_bytes().to_vec())
            }
            PrivateKey::Ed25519(key) => Ok(key.sign(message).to_bytes().to_vec()),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyPair({}, pub={}, account={})",
            self.algorithm(),
            self.public_key_hex(),
            self.account_id
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
