//! Content fingerprinting for exact deduplication.

use blake3::Hasher as Blake3Hasher;

use crate::types::ContentFingerprint;

/// Computes content fingerprints from raw file bytes.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 fingerprint from an in-memory byte buffer.
    ///
    /// Callers hash the same buffer they decode from, so every raw file is
    /// read from disk exactly once.
    pub fn fingerprint(data: &[u8]) -> ContentFingerprint {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        ContentFingerprint::from_bytes(*hasher.finalize().as_bytes())
    }
}
