//! # Cryptographic Primitives
//!
//! Everything that touches key material or digests lives here:
//!
//! - **base58** — checksum-protected text for seeds, accounts and keys.
//! - **hash** — SHA-512Half, SHA-256 and RIPEMD-160 compositions.
//! - **keys** — seed parsing and deterministic key derivation.
//! - **signatures** — secp256k1 ECDSA and Ed25519 signing and verification.
//!
//! Nothing here is hand-rolled: curves come from `k256` and
//! `ed25519-dalek`, digests from `sha2` and `ripemd`.

pub mod base58;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{hash160, prefixed_hash, sha256, sha512_half};
pub use keys::{Algorithm, KeyPair, Seed};
pub use signatures::{sign, verify};
