//! Lazy traversal over the entries of a trie.
//!
//! A [`Cursor`] is a position inside a fixed trie version: the root it was
//! created from, the entry it currently points at, and the entry's index
//! within its collision bucket. Advancing re-derives the descent path from
//! the root using the entry's stored key hash, so the cursor carries no
//! parent stack and stays a three-field value that is cheap to clone and
//! hold across other work. The price is O(depth) per step.
//!
//! Because the trie is immutable, a cursor is never invalidated: it keeps
//! its root alive and continues to observe exactly the version it was
//! created from, whatever happens to later map versions.

use std::sync::Arc;

use crate::trie::{BITS_PER_LEVEL, BRANCHING_FACTOR, Entry, Node, array_index, count_entries};

/// A position within one immutable trie version.
///
/// Obtained from [`PersistentMap::seq`](crate::PersistentMap::seq). Entry
/// order is an implementation detail of the hash layout; it is stable for a
/// given trie but carries no meaning.
pub struct Cursor<K, V> {
    root: Arc<Node<K, V>>,
    entry: Arc<Entry<K, V>>,
    entry_index: usize,
}

impl<K, V> Cursor<K, V> {
    /// Returns the entry this cursor points at.
    #[inline]
    pub fn first(&self) -> &Arc<Entry<K, V>> {
        &self.entry
    }

    /// Returns a cursor at the next entry, or `None` past the last one.
    pub fn next(&self) -> Option<Self> {
        next_after(
            &self.root,
            &self.root,
            0,
            self.entry.key_hash(),
            self.entry_index,
        )
    }
}

// A derived Clone would demand K: Clone and V: Clone; every field is an Arc
// or an index.
impl<K, V> Clone for Cursor<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            entry: self.entry.clone(),
            entry_index: self.entry_index,
        }
    }
}

/// Cursor at the first entry of the subtree `node`, inside the trie rooted
/// at `root`.
pub(crate) fn seq<K, V>(root: &Arc<Node<K, V>>, node: &Arc<Node<K, V>>) -> Option<Cursor<K, V>> {
    match node.as_ref() {
        Node::Leaf(entry) => Some(Cursor {
            root: root.clone(),
            entry: entry.clone(),
            entry_index: 0,
        }),
        Node::Collision(collision) => Some(Cursor {
            root: root.clone(),
            entry: collision.children[0].clone(),
            entry_index: 0,
        }),
        Node::Array(array) => array
            .children
            .iter()
            .flatten()
            .find_map(|child| seq(root, child)),
    }
}

/// Walks from `node` toward the entry identified by `key_hash` and
/// `entry_index`, then returns a cursor at the entry after it.
fn next_after<K, V>(
    root: &Arc<Node<K, V>>,
    node: &Arc<Node<K, V>>,
    shift: u32,
    key_hash: u32,
    entry_index: usize,
) -> Option<Cursor<K, V>> {
    match node.as_ref() {
        // The current entry was the whole subtree.
        Node::Leaf(_) => None,
        Node::Collision(collision) => {
            let next_index = entry_index + 1;
            collision.children.get(next_index).map(|entry| Cursor {
                root: root.clone(),
                entry: entry.clone(),
                entry_index: next_index,
            })
        }
        Node::Array(array) => {
            let child_index = array_index(shift, key_hash);
            if let Some(child) = &array.children[child_index] {
                let descended =
                    next_after(root, child, shift + BITS_PER_LEVEL, key_hash, entry_index);
                if descended.is_some() {
                    return descended;
                }
            }
            array.children[child_index + 1..BRANCHING_FACTOR]
                .iter()
                .flatten()
                .find_map(|child| seq(root, child))
        }
    }
}

/// Standard iterator over a trie version, built on [`Cursor`].
///
/// Yields shared [`Entry`] handles rather than borrowed pairs: entries are
/// reference-counted already, and owning them keeps the iterator
/// independent of the map value it came from.
pub struct Iter<K, V> {
    cursor: Option<Cursor<K, V>>,
    remaining: usize,
}

impl<K, V> Iter<K, V> {
    pub(crate) fn new(root: Option<&Arc<Node<K, V>>>) -> Self {
        match root {
            Some(root) => Self {
                cursor: seq(root, root),
                remaining: count_entries(root),
            },
            None => Self {
                cursor: None,
                remaining: 0,
            },
        }
    }
}

impl<K, V> Iterator for Iter<K, V> {
    type Item = Arc<Entry<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;
        let entry = cursor.first().clone();
        self.remaining -= 1;
        self.cursor = cursor.next();
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<K, V> {}

impl<K, V> std::iter::FusedIterator for Iter<K, V> {}

// =============================================================================
// Tests
// =============================================================================
