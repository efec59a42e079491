//! Content hashing used for dedup keys.

use sha2::{Digest, Sha256};

/// Computes a content digest used to detect duplicate payloads.
pub trait Hasher: Send + Sync {
    /// Hashes `bytes` into a 32-byte digest.
    fn hash(&self, bytes: &[u8]) -> [u8; 32];
}

/// The default [`Hasher`], backed by SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, bytes: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.finalize().into()
    }
}
