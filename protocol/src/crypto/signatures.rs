//! # Digital Signatures
//!
//! Signing and verification for both supported schemes. The scheme is
//! recognized from the public key itself: ed25519 keys carry a leading
//! `0xED` byte, secp256k1 keys are SEC1-compressed points.
//!
//! Verification here is a local sanity check. Validators run their own, and
//! a mismatch between the two shows up as a remote rejection.

use ed25519_dalek::Verifier;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature as EcdsaSignature, VerifyingKey as EcdsaVerifyingKey};

use super::hash::sha512_half;
use super::keys::{Algorithm, KeyPair};
use crate::config::{ED25519_KEY_PREFIX, PUBLIC_KEY_LENGTH};
use crate::error::TxError;

/// Sign a message with a derived key.
///
/// # Example
///
/// ```
/// use ripple_tx::crypto::{sign, verify, Algorithm, KeyPair, Seed};
///
/// let seed = Seed::generate(Algorithm::Secp256k1);
/// let key = KeyPair::derive(&seed, 0, Algorithm::Secp256k1).unwrap();
/// let signature = sign(&key, b"payload").unwrap();
/// assert!(verify(key.public_key(), b"payload", &signature));
/// ```
pub fn sign(keypair: &KeyPair, message: &[u8]) -> Result<Vec<u8>, TxError> {
    keypair.sign(message)
}

/// Which scheme a 33-byte public key belongs to, if any.
pub fn algorithm_of(public_key: &[u8]) -> Option<Algorithm> {
    match public_key {
        [ED25519_KEY_PREFIX, ..] if public_key.len() == PUBLIC_KEY_LENGTH => {
            Some(Algorithm::Ed25519)
        }
        [0x02 | 0x03, ..] if public_key.len() == PUBLIC_KEY_LENGTH => Some(Algorithm::Secp256k1),
        _ => None,
    }
}

/// Verify a signature produced by [`sign`].
///
/// Returns `false` for malformed keys or signatures as well as for genuine
/// mismatches.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    match algorithm_of(public_key) {
        Some(Algorithm::Secp256k1) => verify_secp256k1(public_key, message, signature),
        Some(Algorithm::Ed25519) => verify_ed25519(&public_key[1..], message, signature),
        None => false,
    }
}

fn verify_secp256k1(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = EcdsaVerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = EcdsaSignature::from_der(signature) else {
        return false;
    };
    key.verify_prehash(&sha512_half(message), &signature).is_ok()
}

fn verify_ed25519(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(&bytes) else {
        return false;
    };
    let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}
