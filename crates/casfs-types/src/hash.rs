use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Width of a node hash in bytes.
pub const HASH_LEN: usize = 32;

/// Prefix of the user-facing key form of a node hash (`node:<hex>`).
pub const NODE_KEY_PREFIX: &str = "node:";

/// Content-addressed identifier for a stored node.
///
/// A `NodeHash` is the digest of a node's encoded bytes. Identical encodings
/// always produce the same `NodeHash`, so a hash doubles as the node's
/// storage key and as its identity when shared between trees.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHash([u8; HASH_LEN]);

impl NodeHash {
    /// Wrap a pre-computed digest.
    pub const fn from_hash(hash: [u8; HASH_LEN]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != HASH_LEN {
            return Err(TypeError::InvalidLength {
                expected: HASH_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// User-facing key form: `node:<hex>`.
    pub fn to_key(&self) -> String {
        format!("{NODE_KEY_PREFIX}{}", self.to_hex())
    }

    /// Parse a user-facing key. Accepts `node:<hex>` or bare hex.
    pub fn from_key(key: &str) -> Result<Self, TypeError> {
        let hex = key.strip_prefix(NODE_KEY_PREFIX).unwrap_or(key);
        Self::from_hex(hex)
    }
}

impl fmt::Debug for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHash({})", self.short_hex())
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for NodeHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<NodeHash> for [u8; HASH_LEN] {
    fn from(hash: NodeHash) -> Self {
        hash.0
    }
}
