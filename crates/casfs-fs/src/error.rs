//! Error types for the filesystem engine.
//!
//! Every failure is an [`FsError`]. Each variant maps to a stable
//! [`ErrorCode`], an HTTP-like status and optional structured details, so
//! layers above the engine can surface errors without matching on variants.

use std::fmt;

use casfs_chunk::ChunkError;
use casfs_codec::CodecError;
use casfs_store::StoreError;
use serde::Serialize;
use serde_json::{json, Value};

use crate::hooks::HookError;

/// Errors from filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // -- not found --------------------------------------------------------
    /// A path component does not exist.
    #[error("path not found: {path:?}")]
    PathNotFound { path: String },

    /// A referenced node is not in the store.
    #[error("node not found: {key}")]
    NodeNotFound { key: String },

    /// The root hash does not name a stored node.
    #[error("root node not found: {key}")]
    InvalidRoot { key: String },

    // -- shape mismatch ---------------------------------------------------
    /// A segment tried to descend into something that is not a directory.
    #[error("not a directory at segment {segment:?} (resolved so far: {resolved:?})")]
    NotADirectory { segment: String, resolved: String },

    /// The operation needs a single-block file here.
    #[error("not a file: {path:?}")]
    NotAFile { path: String },

    /// `mkdir` found a file where the directory should go.
    #[error("a file already exists at {path:?}")]
    ExistsAsFile { path: String },

    // -- bounds -----------------------------------------------------------
    /// An index segment points past the end of a directory.
    #[error("index {index} out of bounds at {path:?} (max valid index: {})", fmt_max(.max))]
    IndexOutOfBounds {
        index: usize,
        max: Option<usize>,
        path: String,
    },

    /// The directory already holds the maximum number of children.
    #[error("directory is full ({max} children)")]
    CollectionFull { max: usize },

    /// A child name is longer than allowed.
    #[error("name is {len} bytes, limit is {max}")]
    NameTooLong { len: usize, max: usize },

    /// Content exceeds a size limit.
    #[error("file of {size} bytes exceeds the {max}-byte limit")]
    FileTooLarge {
        size: u64,
        max: u64,
        /// The large-file API would accept this content.
        large_file_api: bool,
    },

    /// A rewrite carries more operations than allowed.
    #[error("{count} rewrite operations exceed the limit of {max}")]
    TooManyEntries { count: usize, max: usize },

    // -- conflict ---------------------------------------------------------
    /// The destination of a copy or move is occupied.
    #[error("target already exists: {path:?}")]
    TargetExists { path: String },

    /// The destination of a move lies inside the source.
    #[error("cannot move {from:?} into itself ({to:?})")]
    MoveIntoSelf { from: String, to: String },

    #[error("cannot remove the root")]
    CannotRemoveRoot,

    #[error("cannot move the root")]
    CannotMoveRoot,

    // -- authorization ----------------------------------------------------
    /// The link authorizer refused a rewrite link.
    #[error("link to {key} not authorized")]
    LinkNotAuthorized { key: String },

    // -- input ------------------------------------------------------------
    #[error("rewrite has no entries and no deletes")]
    EmptyRewrite,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid cursor: {0:?}")]
    InvalidCursor(String),

    #[error("invalid node key {key:?}: {reason}")]
    InvalidNodeKey { key: String, reason: String },

    // -- internal ---------------------------------------------------------
    #[error("hook failed: {0}")]
    Hook(#[from] HookError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("large file error: {0}")]
    Chunk(ChunkError),
}

fn fmt_max(max: &Option<usize>) -> String {
    match max {
        Some(max) => max.to_string(),
        None => "none, directory is empty".into(),
    }
}

impl From<ChunkError> for FsError {
    fn from(err: ChunkError) -> Self {
        match err {
            ChunkError::Store(e) => Self::Store(e),
            ChunkError::Codec(e) => Self::Codec(e),
            ChunkError::MissingBlock(hash) => Self::NodeNotFound { key: hash.to_key() },
            ChunkError::NotAFile { hash, .. } => Self::NotAFile { path: hash.to_key() },
            other => Self::Chunk(other),
        }
    }
}

/// Stable machine-readable error code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    PathNotFound,
    NodeNotFound,
    InvalidRoot,
    NotADirectory,
    NotAFile,
    ExistsAsFile,
    IndexOutOfBounds,
    CollectionFull,
    NameTooLong,
    FileTooLarge,
    TooManyEntries,
    TargetExists,
    MoveIntoSelf,
    CannotRemoveRoot,
    CannotMoveRoot,
    LinkNotAuthorized,
    EmptyRewrite,
    InvalidPath,
    InvalidCursor,
    InvalidNodeKey,
    HookFailed,
    StorageError,
    CodecError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathNotFound => "PATH_NOT_FOUND",
            Self::NodeNotFound => "NODE_NOT_FOUND",
            Self::InvalidRoot => "INVALID_ROOT",
            Self::NotADirectory => "NOT_A_DIRECTORY",
            Self::NotAFile => "NOT_A_FILE",
            Self::ExistsAsFile => "EXISTS_AS_FILE",
            Self::IndexOutOfBounds => "INDEX_OUT_OF_BOUNDS",
            Self::CollectionFull => "COLLECTION_FULL",
            Self::NameTooLong => "NAME_TOO_LONG",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::TooManyEntries => "TOO_MANY_ENTRIES",
            Self::TargetExists => "TARGET_EXISTS",
            Self::MoveIntoSelf => "MOVE_INTO_SELF",
            Self::CannotRemoveRoot => "CANNOT_REMOVE_ROOT",
            Self::CannotMoveRoot => "CANNOT_MOVE_ROOT",
            Self::LinkNotAuthorized => "LINK_NOT_AUTHORIZED",
            Self::EmptyRewrite => "EMPTY_REWRITE",
            Self::InvalidPath => "INVALID_PATH",
            Self::InvalidCursor => "INVALID_CURSOR",
            Self::InvalidNodeKey => "INVALID_NODE_KEY",
            Self::HookFailed => "HOOK_FAILED",
            Self::StorageError => "STORAGE_ERROR",
            Self::CodecError => "CODEC_ERROR",
        }
    }

    /// HTTP-like status for this code.
    pub fn status(&self) -> u16 {
        match self {
            Self::PathNotFound | Self::NodeNotFound | Self::InvalidRoot => 404,
            Self::ExistsAsFile | Self::TargetExists => 409,
            Self::FileTooLarge => 413,
            Self::LinkNotAuthorized => 403,
            Self::HookFailed | Self::StorageError | Self::CodecError => 500,
            _ => 400,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialisable `{code, status, message, details?}` form of an error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl FsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PathNotFound { .. } => ErrorCode::PathNotFound,
            Self::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            Self::InvalidRoot { .. } => ErrorCode::InvalidRoot,
            Self::NotADirectory { .. } => ErrorCode::NotADirectory,
            Self::NotAFile { .. } => ErrorCode::NotAFile,
            Self::ExistsAsFile { .. } => ErrorCode::ExistsAsFile,
            Self::IndexOutOfBounds { .. } => ErrorCode::IndexOutOfBounds,
            Self::CollectionFull { .. } => ErrorCode::CollectionFull,
            Self::NameTooLong { .. } => ErrorCode::NameTooLong,
            Self::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            Self::TooManyEntries { .. } => ErrorCode::TooManyEntries,
            Self::TargetExists { .. } => ErrorCode::TargetExists,
            Self::MoveIntoSelf { .. } => ErrorCode::MoveIntoSelf,
            Self::CannotRemoveRoot => ErrorCode::CannotRemoveRoot,
            Self::CannotMoveRoot => ErrorCode::CannotMoveRoot,
            Self::LinkNotAuthorized { .. } => ErrorCode::LinkNotAuthorized,
            Self::EmptyRewrite => ErrorCode::EmptyRewrite,
            Self::InvalidPath(_) => ErrorCode::InvalidPath,
            Self::InvalidCursor(_) => ErrorCode::InvalidCursor,
            Self::InvalidNodeKey { .. } => ErrorCode::InvalidNodeKey,
            Self::Hook(_) => ErrorCode::HookFailed,
            Self::Store(_) | Self::Chunk(_) => ErrorCode::StorageError,
            Self::Codec(_) => ErrorCode::CodecError,
        }
    }

    pub fn status(&self) -> u16 {
        self.code().status()
    }

    /// Structured details for variants that carry more than a message.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::PathNotFound { path }
            | Self::NotAFile { path }
            | Self::ExistsAsFile { path }
            | Self::TargetExists { path } => Some(json!({ "path": path })),
            Self::NodeNotFound { key }
            | Self::InvalidRoot { key }
            | Self::LinkNotAuthorized { key } => Some(json!({ "key": key })),
            Self::NotADirectory { segment, resolved } => {
                Some(json!({ "segment": segment, "resolved": resolved }))
            }
            Self::IndexOutOfBounds { index, max, path } => {
                Some(json!({ "index": index, "maxIndex": max, "path": path }))
            }
            Self::CollectionFull { max } => Some(json!({ "max": max })),
            Self::NameTooLong { len, max } => Some(json!({ "length": len, "max": max })),
            Self::FileTooLarge {
                size,
                max,
                large_file_api,
            } => Some(json!({ "size": size, "max": max, "useLargeFileApi": large_file_api })),
            Self::TooManyEntries { count, max } => Some(json!({ "count": count, "max": max })),
            Self::MoveIntoSelf { from, to } => Some(json!({ "from": from, "to": to })),
            _ => None,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            status: self.status(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Returns `true` for errors meaning "nothing is at this path".
    pub fn is_missing_path(&self) -> bool {
        matches!(self, Self::PathNotFound { .. } | Self::IndexOutOfBounds { .. })
    }
}

/// Convenience alias for filesystem results.
pub type FsResult<T> = Result<T, FsError>;
