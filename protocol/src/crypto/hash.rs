//! # Hashing Utilities
//!
//! The ledger uses three hash constructions, and refuses to need more:
//!
//! - **SHA-512Half** — the first 32 bytes of SHA-512. Key derivation,
//!   signing digests, transaction ids and invoice ids all go through it.
//! - **SHA-256** — only as the inner half of [`hash160`] and inside the
//!   base58 checksum.
//! - **RIPEMD-160(SHA-256(x))** — turns a 33-byte public key into a 20-byte
//!   account id.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use ripple_tx::crypto::sha256;
///
/// let hash = sha256(b"ripple");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First half of SHA-512 over the concatenation of `parts`.
///
/// Taking the parts as a slice avoids building a temporary buffer for the
/// common `prefix || payload` shapes.
pub fn sha512_half_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&digest[..32]);
    output
}

/// First half of SHA-512. This is the ledger's workhorse digest.
///
/// # Example
///
/// ```
/// use ripple_tx::crypto::sha512_half;
///
/// let digest = sha512_half(b"invoice #42");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    sha512_half_parts(&[data])
}

/// SHA-512Half of a 4-byte hash prefix followed by a payload.
///
/// Transaction ids and signing digests are always domain-separated this way.
pub fn prefixed_hash(prefix: [u8; 4], payload: &[u8]) -> [u8; 32] {
    sha512_half_parts(&[&prefix, payload])
}

/// RIPEMD-160 of SHA-256. Produces the 20-byte account id of a public key.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    hasher.finalize().into()
}
