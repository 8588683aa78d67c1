use sha2::{Digest, Sha256};

/// SHA-256 of the given bytes as a 64-character lowercase hex string.
///
/// No normalization is applied: inputs differing only in whitespace or
/// case produce different fingerprints.
pub fn fingerprint(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Fingerprint of a listing's text, the raw concatenation of title and address
pub fn content_fingerprint(title: &str, address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(address.as_bytes());
    hex::encode(hasher.finalize())
}
