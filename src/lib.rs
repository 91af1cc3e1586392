//! # permap
//!
//! A persistent hash map built on a hash array mapped trie.
//!
//! ## Overview
//!
//! Every update returns a new map value; prior versions stay valid and
//! share all unaffected structure with their successors. On top of the
//! usual associative operations the map offers:
//!
//! - **Identity-preserving updates**: an [`assoc`](PersistentMap::assoc) or
//!   [`dissoc`](PersistentMap::dissoc) that changes nothing returns the
//!   receiver itself, observable through [`PersistentMap::ptr_eq`]
//! - **Set operations**: [`difference`](PersistentMap::difference),
//!   [`intersection`](PersistentMap::intersection) and
//!   [`equiv`](PersistentMap::equiv) exploit shared structure, so comparing
//!   two versions of the same map costs proportionally to what changed
//! - **Pluggable hashing**: a [`KeyHasher`] capability per map, compared by
//!   identity
//! - **Canonical blanks**: one process-wide empty map per hasher, so
//!   emptying a map always leads back to the same blank value
//! - **Lazy traversal**: a [`Cursor`] that observes one map version forever
//!
//! ## Example
//!
//! ```rust
//! use permap::PersistentMap;
//!
//! let base: PersistentMap<&str, i32> = PersistentMap::blank();
//! let v1 = base.assoc("a", 1).assoc("b", 2);
//! let v2 = v1.assoc("b", 3);
//!
//! assert_eq!(v1.get(&"b"), Some(&2));
//! assert_eq!(v2.get(&"b"), Some(&3));
//!
//! let changed = v1.difference(&v2).unwrap();
//! assert_eq!(changed.count(), 1);
//! assert_eq!(changed.get(&"b"), Some(&2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

mod trie;

pub mod cursor;
pub mod error;
pub mod map;

pub use cursor::{Cursor, Iter};
pub use error::HasherMismatch;
pub use map::{KeyHasher, PersistentMap};
pub use trie::Entry;
