use casfs_types::NodeHash;
use serde::{Deserialize, Serialize};

/// The kind of a stored node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Directory,
    File,
    Successor,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "dir"),
            Self::File => write!(f, "file"),
            Self::Successor => write!(f, "successor"),
        }
    }
}

/// A decoded tree node.
///
/// Nodes are immutable values. Changing a tree means encoding new nodes and
/// storing them under new hashes; existing nodes are never rewritten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
    Successor(SuccessorNode),
}

impl Node {
    /// The kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Directory(_) => NodeKind::Directory,
            Self::File(_) => NodeKind::File,
            Self::Successor(_) => NodeKind::Successor,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Self::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// A single named child of a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub hash: NodeHash,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, hash: NodeHash) -> Self {
        Self {
            name: name.into(),
            hash,
        }
    }
}

/// Directory listing.
///
/// Entries keep insertion order; the order is part of the encoding and
/// therefore of the hash. Name uniqueness is maintained by callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub entries: Vec<DirEntry>,
}

impl DirectoryNode {
    pub fn new(entries: Vec<DirEntry>) -> Self {
        Self { entries }
    }

    /// Create an empty directory.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Directory holding exactly one entry.
    pub fn single(name: impl Into<String>, hash: NodeHash) -> Self {
        Self {
            entries: vec![DirEntry::new(name, hash)],
        }
    }

    /// Look up an entry by name, returning its position too.
    pub fn find(&self, name: &str) -> Option<(usize, &DirEntry)> {
        self.entries.iter().enumerate().find(|(_, e)| e.name == name)
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&DirEntry> {
        self.entries.get(index)
    }

    /// Copy of this directory with `entry` appended.
    pub fn with_entry(&self, name: impl Into<String>, hash: NodeHash) -> Self {
        let mut entries = self.entries.clone();
        entries.push(DirEntry::new(name, hash));
        Self { entries }
    }

    /// Copy of this directory without the entry at `index`.
    ///
    /// An out-of-range index yields an unchanged copy.
    pub fn without_entry(&self, index: usize) -> Self {
        let mut entries = self.entries.clone();
        if index < entries.len() {
            entries.remove(index);
        }
        Self { entries }
    }

    /// Copy of this directory with the hash at `index` replaced.
    ///
    /// An out-of-range index yields an unchanged copy.
    pub fn with_hash_at(&self, index: usize, hash: NodeHash) -> Self {
        let mut entries = self.entries.clone();
        if let Some(entry) = entries.get_mut(index) {
            entry.hash = hash;
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Content of a file node: inline bytes, or successor blocks for files that
/// span more than one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileBody {
    Inline(Vec<u8>),
    Successors(Vec<NodeHash>),
}

/// File node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub content_type: String,
    /// Logical size of the whole file in bytes.
    pub size: u64,
    pub body: FileBody,
}

impl FileNode {
    /// Single-block file.
    pub fn inline(payload: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            size: payload.len() as u64,
            body: FileBody::Inline(payload),
        }
    }

    /// Root of a multi-block file.
    pub fn with_successors(
        successors: Vec<NodeHash>,
        size: u64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            size,
            body: FileBody::Successors(successors),
        }
    }

    /// Returns `true` when the content lives in successor blocks.
    pub fn is_multi_block(&self) -> bool {
        matches!(self.body, FileBody::Successors(_))
    }

    /// Inline payload, for single-block files.
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.body {
            FileBody::Inline(data) => Some(data),
            FileBody::Successors(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Successor
// ---------------------------------------------------------------------------

/// Block of a large file.
///
/// Leaves carry payload; interior blocks carry successors. Reading a block
/// yields its payload followed by the content of its successors, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessorNode {
    pub payload: Vec<u8>,
    pub successors: Vec<NodeHash>,
}

impl SuccessorNode {
    pub fn leaf(payload: Vec<u8>) -> Self {
        Self {
            payload,
            successors: Vec::new(),
        }
    }

    pub fn interior(successors: Vec<NodeHash>) -> Self {
        Self {
            payload: Vec::new(),
            successors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(b: u8) -> NodeHash {
        NodeHash::from_hash([b; 32])
    }

    #[test]
    fn directory_copy_helpers_leave_original_untouched() {
        let dir = DirectoryNode::new(vec![DirEntry::new("a", h(1)), DirEntry::new("b", h(2))]);

        let added = dir.with_entry("c", h(3));
        let removed = dir.without_entry(0);
        let replaced = dir.with_hash_at(1, h(9));

        assert_eq!(dir.len(), 2);
        assert_eq!(added.len(), 3);
        assert_eq!(added.entries[2].name, "c");
        assert_eq!(removed.entries, vec![DirEntry::new("b", h(2))]);
        assert_eq!(replaced.entries[1].hash, h(9));
        assert_eq!(dir.entries[1].hash, h(2));
    }

    #[test]
    fn out_of_range_helpers_are_noops() {
        let dir = DirectoryNode::single("a", h(1));
        assert_eq!(dir.without_entry(5), dir);
        assert_eq!(dir.with_hash_at(5, h(2)), dir);
    }

    #[test]
    fn find_reports_position() {
        let dir = DirectoryNode::new(vec![DirEntry::new("x", h(1)), DirEntry::new("y", h(2))]);
        let (index, entry) = dir.find("y").unwrap();
        assert_eq!(index, 1);
        assert_eq!(entry.hash, h(2));
        assert!(dir.find("z").is_none());
    }

    #[test]
    fn file_shapes() {
        let small = FileNode::inline(b"abc".to_vec(), "text/plain");
        assert_eq!(small.size, 3);
        assert!(!small.is_multi_block());
        assert_eq!(small.payload(), Some(&b"abc"[..]));

        let large = FileNode::with_successors(vec![h(1), h(2)], 10_000, "application/octet-stream");
        assert!(large.is_multi_block());
        assert!(large.payload().is_none());
    }

    #[test]
    fn node_accessors() {
        let node = Node::Directory(DirectoryNode::empty());
        assert_eq!(node.kind(), NodeKind::Directory);
        assert!(node.is_directory());

        let node = Node::Successor(SuccessorNode::leaf(vec![1]));
        assert_eq!(node.kind(), NodeKind::Successor);
        assert!(!node.is_directory());
    }

    #[test]
    fn kind_display() {
        assert_eq!(NodeKind::Directory.to_string(), "dir");
        assert_eq!(NodeKind::File.to_string(), "file");
        assert_eq!(NodeKind::Successor.to_string(), "successor");
    }
}
