//! Ordered index structure
//!
//! This crate provides [`OrderedTree`], a red-black tree keyed by any totally
//! ordered key. It has no dependency on the codec crates.
//!
//! # Usage Example
//!
//! ```rust
//! use vellum_tree::OrderedTree;
//!
//! let mut tree = OrderedTree::new();
//! tree.insert(5, "five")?;
//! tree.insert(3, "three")?;
//! assert_eq!(tree.min_key()?, &3);
//! assert_eq!(tree.keys(true).copied().collect::<Vec<_>>(), vec![3, 5]);
//! # Ok::<(), vellum_tree::VellumError>(())
//! ```

pub mod error;
pub mod iter;
pub mod tree;

pub use error::{VellumError, VellumResult};
pub use iter::{Elements, Keys, Values};
pub use tree::OrderedTree;
