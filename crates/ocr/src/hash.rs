use sha2::{Digest, Sha256};

/// SHA-256 of an in-memory byte slice.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Content key for an image, used to tie results back to their source bytes.
pub fn content_hash(data: &[u8]) -> String {
    to_hex(&sha256_bytes(data))
}
