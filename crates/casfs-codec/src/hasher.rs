use casfs_types::NodeHash;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash computation, so bytes hashed
/// for casfs nodes can never collide with the same bytes hashed elsewhere.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for encoded tree nodes.
    pub const NODE: Self = Self {
        domain: "casfs-node-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> NodeHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        NodeHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &NodeHash) -> bool {
        self.hash(data) == *expected
    }
}
