//! Base58Check in the ledger's own alphabet.
//!
//! Seeds, account ids and public keys all travel as text of the form
//! `base58(version || payload || checksum)`, where the checksum is the first
//! four bytes of double SHA-256 over `version || payload`. The alphabet is
//! the ripple one (`rpshnaf39w...`), which is why every account starts with
//! `r` and every family seed with `s`.

use bs58::Alphabet;

/// Encodes `version || payload` with a trailing checksum.
pub fn encode_check(version: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(version.len() + payload.len());
    data.extend_from_slice(version);
    data.extend_from_slice(payload);
    bs58::encode(data)
        .with_alphabet(Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

/// Decodes text and verifies its checksum.
///
/// Returns `version || payload` with the checksum stripped. The caller is
/// responsible for checking the version prefix and payload length, since
/// those differ per kind of value.
pub fn decode_check(text: &str) -> Result<Vec<u8>, String> {
    bs58::decode(text)
        .with_alphabet(Alphabet::RIPPLE)
        .with_check(None)
        .into_vec()
        .map_err(|e| e.to_string())
}

/// Decodes text and splits off an expected version prefix.
///
/// Fails unless the prefix matches exactly and the payload is `len` bytes.
pub fn decode_versioned(text: &str, version: &[u8], len: usize) -> Result<Vec<u8>, String> {
    let data = decode_check(text)?;
    if !data.starts_with(version) {
        return Err("unexpected version prefix".to_string());
    }
    let payload = &data[version.len()..];
    if payload.len() != len {
        return Err(format!(
            "expected {} payload bytes, found {}",
            len,
            payload.len()
        ));
    }
    Ok(payload.to_vec())
}
