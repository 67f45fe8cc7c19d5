use blake3::Hasher;

/// Lower-cases and trims text; the canonical form used for every cache key.
#[inline]
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Hashes already-normalized text into a 32-byte cache key.
#[inline]
pub fn hash_text(normalized: &str) -> [u8; 32] {
    *blake3::hash(normalized.as_bytes()).as_bytes()
}

/// Hashes a `(namespace, value)` pair into 64 bits; the separator keeps
/// `("ab","c")` and `("a","bc")` apart.
///
/// Used for feature hashing and deterministic stub scores, never for cache keys:
/// cache lookups must be exact, so they use the full [`hash_text`] output.
#[inline]
pub fn hash_pair(namespace: &str, value: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(value.as_bytes());

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
