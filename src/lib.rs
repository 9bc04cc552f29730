//! An in-memory B-tree of configurable minimum degree for Rust.
//!
//! This crate provides [`BTree`], an ordered set of unique keys kept in a classic
//! B-tree: every node other than the root holds between `t - 1` and `2t - 1` keys,
//! internal nodes with `n` keys have `n + 1` children, and all leaves share one depth.
//!
//! - [`insert`](BTree::insert) splits any full node *before* descending into it, so
//!   a single root-to-leaf pass always has room for the new key.
//! - [`remove`](BTree::remove) tops up any thin child *before* descending into it,
//!   by borrowing a key from a sibling or merging with one, and replaces keys in
//!   internal nodes by their predecessor or successor.
//! - [`search`](BTree::search) returns a read-only view of the node holding a key.
//! - [`traverse`](BTree::traverse) yields all keys in ascending order, lazily.
//!
//! # Example
//!
//! ```
//! use degree_btree::{BTree, Error};
//!
//! let mut tree = BTree::new(3)?;
//! for key in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.insert(key);
//! }
//! assert!(tree.traverse().copied().eq([5, 6, 7, 10, 12, 17, 20, 30]));
//!
//! tree.remove(&6)?;
//! assert_eq!(tree.remove(&13), Err(Error::KeyNotFound));
//! tree.remove(&7)?;
//! assert!(tree.traverse().copied().eq([5, 10, 12, 17, 20, 30]));
//!
//! assert!(BTree::<i32>::new(1).is_err());
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes live in one slot vector addressed by compact handles;
//!   slots released by merges are reused by later splits
//! - **Structured diagnostics** - Splits, merges, borrows and root changes are reported
//!   as [`tracing`] events; the crate never prints
//!
//! # Implementation
//!
//! Nodes never point back at their parent. Both mutating operations work strictly
//! top-down along one root-to-leaf path, which is why every rebalancing decision can be
//! made from the parent and the two siblings around the child about to be entered.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod min_degree;
mod raw;

pub mod btree;

pub use btree::{BTree, NodeRef, Traverse};
pub use error::{Error, Result};
pub use min_degree::MinDegree;
