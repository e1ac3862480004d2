//! Foundation types for casfs.
//!
//! Every other casfs crate depends on `casfs-types`.
//!
//! # Key Types
//!
//! - [`NodeHash`] -- content-addressed identifier of a stored node
//! - [`PathSegment`] -- one step of a path: a child name or a child index
//! - [`parse_path`] / [`format_path`] -- string form of a segment list

pub mod error;
pub mod hash;
pub mod path;

pub use error::TypeError;
pub use hash::{NodeHash, HASH_LEN, NODE_KEY_PREFIX};
pub use path::{format_path, parse_path, PathSegment};
