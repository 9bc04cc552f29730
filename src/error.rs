use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by [`BTree`](crate::BTree) operations.
///
/// A search miss is not an error; [`BTree::search`](crate::BTree::search) returns `None` instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The requested minimum degree is below 2, or so large that `2t` overflows.
    /// No tree is created.
    #[error("invalid configuration: minimum degree must be in 2..=usize::MAX / 2, got {min_degree}")]
    InvalidConfiguration {
        /// The rejected minimum degree.
        min_degree: usize,
    },
    /// The key passed to [`BTree::remove`](crate::BTree::remove) is not in the tree.
    /// The tree is left untouched.
    #[error("key not found")]
    KeyNotFound,
}
