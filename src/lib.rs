//! A B+ tree multimap with comparator-based range search.
//!
//! This crate provides [`RangeTree`], an ordered index mapping keys with a
//! total order to arbitrary values. Unlike `BTreeMap`, inserting an existing
//! key never overwrites: duplicate keys accumulate as separate entries, with
//! the most recently inserted duplicate ordered first. Queries are expressed
//! as a key plus one of three comparators (`"<="`, `"=="`, `">="`) and return
//! every matching value without a full scan:
//!
//! ```
//! use rangetree::RangeTree;
//!
//! let mut index = RangeTree::new(3).unwrap();
//! for key in [5, 10, 15, 20, 25] {
//!     index.insert(key, key * 100);
//! }
//!
//! assert_eq!(index.range_search(&15, "=="), [&1500]);
//! assert_eq!(index.range_search(&12, ">="), [&1500, &2000, &2500]);
//! assert_eq!(index.range_search(&12, "<="), [&500, &1000]);
//! ```
//!
//! # Implementation
//!
//! The tree is a B+ tree: all values live in leaf nodes, internal nodes hold
//! only routing keys, and the leaves form a doubly linked chain in key order.
//! A range search descends once to a boundary leaf and then walks the chain
//! left and/or right, taking whole leaves wherever sortedness proves them
//! entirely in range. Nodes are stored in an arena and reference each other
//! through niche-optimized handles, so the chain's `prev`/`next` links are
//! plain copyable indices rather than a second ownership path.
//!
//! The branching factor is chosen at construction and must be greater than
//! two; [`RangeTree::new`] reports [`Error::InvalidBranchingFactor`]
//! otherwise. That is the only fallible operation in the crate: insertion is
//! total, and a malformed comparator string yields an empty result rather
//! than an error.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Duplicate keys** - A true multimap; entries are never overwritten
//! - **Comparator queries** - `"<="`, `"=="`, `">="` answered via the leaf chain
//! - **Cache-efficient** - Contiguous node storage in an arena

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

mod comparator;
mod error;
mod raw;

pub mod range_tree;

pub use comparator::Comparator;
pub use error::{Error, Result};
pub use range_tree::RangeTree;
