//! Error type for Content Model invariant violations.

use thiserror::Error;

/// Violation of an internal invariant of the append-only post/file tree.
///
/// These indicate a broken producer/consumer contract, not a user-facing
/// condition; under append-only discipline they are unreachable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A post being exported is missing from the root's title bucket table.
    #[error("post {name:?} is missing from its title bucket")]
    PostNotInBucket {
        /// Original title of the post.
        name: String,
    },

    /// A file handle points at a base-name bucket the post does not hold.
    #[error("file {name:?} has no bucket in this post")]
    FileBucketMissing {
        /// Original name of the file.
        name: String,
    },

    /// A file handle's identity is absent from its base-name bucket.
    #[error("file {name:?} not found in its bucket")]
    FileNotInBucket {
        /// Original name of the file.
        name: String,
    },
}
