//! Node model and recursive algorithms of the hash array mapped trie.
//!
//! The trie is built from three node shapes:
//!
//! - [`Entry`]: a single key-value leaf, tagged with the 32-bit key hash
//! - `CollisionNode`: two or more entries whose keys differ but whose
//!   hashes are identical
//! - `ArrayNode`: a 32-way branch, one slot per 5-bit slice of the hash
//!
//! Every algorithm here is a pure function from nodes to nodes. A call
//! either returns the input node unchanged (the same `Arc`, which callers
//! detect with `Arc::ptr_eq`) or a freshly built replacement whose
//! untouched subtrees are shared with the input. That identity contract is
//! load-bearing: `difference`, `intersect` and `equiv` all treat pointer
//! equality as a proof of deep equality, which is what makes comparing two
//! versions of the same map cheap.

use std::sync::Arc;

use smallvec::SmallVec;

// =============================================================================
// Constants
// =============================================================================

/// Branching factor of an `ArrayNode` (2^5 = 32).
pub(crate) const BRANCHING_FACTOR: usize = 32;

/// Bits of the key hash consumed per trie level.
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Bit mask for extracting an index within an `ArrayNode`.
const MASK: u32 = (BRANCHING_FACTOR - 1) as u32;

/// Extracts the child index for a hash at the given level.
///
/// With 32-bit hashes two distinct hashes always diverge at some level with
/// `shift <= 30`, and equal hashes take the collision path before any
/// promotion, so no caller ever shifts by 32 or more. Asserted here instead
/// of relying on wraparound semantics.
#[inline]
pub(crate) fn array_index(shift: u32, key_hash: u32) -> usize {
    debug_assert!(shift <= 30, "hash bits exhausted at shift {shift}");
    ((key_hash >> shift) & MASK) as usize
}

// =============================================================================
// Node shapes
// =============================================================================

/// A single key-value pair together with the hash of its key.
///
/// Entries are immutable and shared by reference: the same `Arc<Entry>` may
/// be reachable from many map versions at once. Two entries are equal iff
/// their keys and values are equal; the cached hash does not participate.
pub struct Entry<K, V> {
    key_hash: u32,
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) const fn new(key_hash: u32, key: K, value: V) -> Self {
        Self {
            key_hash,
            key,
            value,
        }
    }

    /// Returns the hash the key was stored under.
    #[inline]
    pub const fn key_hash(&self) -> u32 {
        self.key_hash
    }

    /// Returns a reference to the key.
    #[inline]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns a reference to the value.
    #[inline]
    pub const fn value(&self) -> &V {
        &self.value
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K: Eq, V: Eq> Eq for Entry<K, V> {}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Entry<K, V> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "<{:?} {:?}>", self.key, self.value)
    }
}

/// Entries of a collision node, inline up to the common two-entry case.
pub(crate) type EntryList<K, V> = SmallVec<[Arc<Entry<K, V>>; 2]>;

/// Bucket for entries whose keys differ but whose hashes collide.
///
/// Invariant: `children.len() >= 2`. A collision node that would shrink to
/// one entry collapses to a bare [`Entry`] instead.
pub(crate) struct CollisionNode<K, V> {
    pub(crate) key_hash: u32,
    pub(crate) children: EntryList<K, V>,
}

/// 32-way branch node.
///
/// Invariants: `children_count` is the number of occupied slots and lies in
/// `[1, 32]` (a zero-child array node collapses to the empty tree instead);
/// `entry_count` equals the sum of the entry counts of all children and is
/// maintained incrementally, never recomputed by traversal.
pub(crate) struct ArrayNode<K, V> {
    pub(crate) children: [Option<Arc<Node<K, V>>>; BRANCHING_FACTOR],
    pub(crate) children_count: usize,
    pub(crate) entry_count: usize,
}

/// The three node shapes, matched exhaustively by every algorithm below.
pub(crate) enum Node<K, V> {
    Leaf(Arc<Entry<K, V>>),
    Collision(CollisionNode<K, V>),
    Array(ArrayNode<K, V>),
}

/// Empty child table for a fresh `ArrayNode`.
fn no_children<K, V>() -> [Option<Arc<Node<K, V>>>; BRANCHING_FACTOR] {
    [const { None }; BRANCHING_FACTOR]
}

/// Returns the single hash of a leaf or collision node.
///
/// Array nodes span many hashes; asking for theirs is a defect in the
/// caller, not a recoverable condition.
fn key_hash_of<K, V>(node: &Node<K, V>) -> u32 {
    match node {
        Node::Leaf(entry) => entry.key_hash,
        Node::Collision(collision) => collision.key_hash,
        Node::Array(_) => unreachable!("array nodes do not have a single key hash"),
    }
}

/// Promotes a leaf or collision node into a one-child `ArrayNode` at the
/// slot its hash selects at `shift`.
fn make_array_node<K, V>(node: &Arc<Node<K, V>>, shift: u32) -> Arc<Node<K, V>> {
    debug_assert!(shift < 32, "promotion past the hash width");
    let mut children = no_children();
    let index = array_index(shift, key_hash_of(node));
    let entry_count = count_entries(node);
    children[index] = Some(node.clone());
    Arc::new(Node::Array(ArrayNode {
        children,
        children_count: 1,
        entry_count,
    }))
}

/// Number of entries in the subtree, O(1) for every shape.
pub(crate) fn count_entries<K, V>(node: &Node<K, V>) -> usize {
    match node {
        Node::Leaf(_) => 1,
        Node::Collision(collision) => collision.children.len(),
        Node::Array(array) => array.entry_count,
    }
}

// =============================================================================
// assoc
// =============================================================================

/// Inserts or replaces `entry` in the subtree.
///
/// Returns the input node itself (same `Arc`) when the entry is already
/// present with an equal value.
pub(crate) fn assoc<K: Eq, V: PartialEq>(
    node: &Arc<Node<K, V>>,
    shift: u32,
    entry: &Arc<Entry<K, V>>,
) -> Arc<Node<K, V>> {
    match node.as_ref() {
        Node::Array(array) => assoc_array(node, array, shift, entry),
        Node::Leaf(existing) => assoc_leaf(node, existing, shift, entry),
        Node::Collision(collision) => assoc_collision(node, collision, shift, entry),
    }
}

fn assoc_array<K: Eq, V: PartialEq>(
    node: &Arc<Node<K, V>>,
    array: &ArrayNode<K, V>,
    shift: u32,
    entry: &Arc<Entry<K, V>>,
) -> Arc<Node<K, V>> {
    let child_index = array_index(shift, entry.key_hash);
    match &array.children[child_index] {
        None => {
            let mut children = array.children.clone();
            children[child_index] = Some(Arc::new(Node::Leaf(entry.clone())));
            Arc::new(Node::Array(ArrayNode {
                children,
                children_count: array.children_count + 1,
                entry_count: array.entry_count + 1,
            }))
        }
        Some(child) => {
            let new_child = assoc(child, shift + BITS_PER_LEVEL, entry);
            if Arc::ptr_eq(child, &new_child) {
                node.clone()
            } else {
                let entry_count =
                    array.entry_count - count_entries(child) + count_entries(&new_child);
                let mut children = array.children.clone();
                children[child_index] = Some(new_child);
                Arc::new(Node::Array(ArrayNode {
                    children,
                    children_count: array.children_count,
                    entry_count,
                }))
            }
        }
    }
}

fn assoc_leaf<K: Eq, V: PartialEq>(
    node: &Arc<Node<K, V>>,
    existing: &Arc<Entry<K, V>>,
    shift: u32,
    entry: &Arc<Entry<K, V>>,
) -> Arc<Node<K, V>> {
    if existing.key == entry.key {
        if existing.value == entry.value {
            node.clone()
        } else {
            Arc::new(Node::Leaf(entry.clone()))
        }
    } else if existing.key_hash == entry.key_hash {
        let mut children = EntryList::new();
        children.push(existing.clone());
        children.push(entry.clone());
        Arc::new(Node::Collision(CollisionNode {
            key_hash: existing.key_hash,
            children,
        }))
    } else {
        assoc(&make_array_node(node, shift), shift, entry)
    }
}

fn assoc_collision<K: Eq, V: PartialEq>(
    node: &Arc<Node<K, V>>,
    collision: &CollisionNode<K, V>,
    shift: u32,
    entry: &Arc<Entry<K, V>>,
) -> Arc<Node<K, V>> {
    if collision.key_hash != entry.key_hash {
        return assoc(&make_array_node(node, shift), shift, entry);
    }
    let position = collision
        .children
        .iter()
        .position(|child| child.key == entry.key);
    match position {
        Some(index) => {
            if collision.children[index].value == entry.value {
                node.clone()
            } else {
                let mut children = collision.children.clone();
                children[index] = entry.clone();
                Arc::new(Node::Collision(CollisionNode {
                    key_hash: collision.key_hash,
                    children,
                }))
            }
        }
        None => {
            let mut children = collision.children.clone();
            children.push(entry.clone());
            Arc::new(Node::Collision(CollisionNode {
                key_hash: collision.key_hash,
                children,
            }))
        }
    }
}

// =============================================================================
// get
// =============================================================================

/// Finds the entry stored under `key`, or `None`. Absence is a normal
/// result, never an error.
pub(crate) fn get_entry<'a, K: Eq, V>(
    node: &'a Node<K, V>,
    shift: u32,
    key_hash: u32,
    key: &K,
) -> Option<&'a Arc<Entry<K, V>>> {
    match node {
        Node::Array(array) => {
            let child = array.children[array_index(shift, key_hash)].as_ref()?;
            get_entry(child, shift + BITS_PER_LEVEL, key_hash, key)
        }
        Node::Leaf(entry) => {
            if entry.key_hash == key_hash && entry.key == *key {
                Some(entry)
            } else {
                None
            }
        }
        Node::Collision(collision) => {
            if collision.key_hash == key_hash {
                collision.children.iter().find(|entry| entry.key == *key)
            } else {
                None
            }
        }
    }
}

// =============================================================================
// dissoc
// =============================================================================

/// Removes `key` from the subtree.
///
/// Returns `None` when the subtree becomes empty, the input node itself
/// (same `Arc`) when the key was absent, and a rebuilt node otherwise.
pub(crate) fn dissoc<K: Eq, V>(
    node: &Arc<Node<K, V>>,
    shift: u32,
    key_hash: u32,
    key: &K,
) -> Option<Arc<Node<K, V>>> {
    match node.as_ref() {
        Node::Array(array) => dissoc_array(node, array, shift, key_hash, key),
        Node::Leaf(entry) => {
            if entry.key == *key {
                None
            } else {
                Some(node.clone())
            }
        }
        Node::Collision(collision) => dissoc_collision(node, collision, key_hash, key),
    }
}

fn dissoc_array<K: Eq, V>(
    node: &Arc<Node<K, V>>,
    array: &ArrayNode<K, V>,
    shift: u32,
    key_hash: u32,
    key: &K,
) -> Option<Arc<Node<K, V>>> {
    let child_index = array_index(shift, key_hash);
    let Some(child) = &array.children[child_index] else {
        return Some(node.clone());
    };
    match dissoc(child, shift + BITS_PER_LEVEL, key_hash, key) {
        Some(new_child) if Arc::ptr_eq(child, &new_child) => Some(node.clone()),
        Some(new_child) => {
            let mut children = array.children.clone();
            children[child_index] = Some(new_child);
            Some(Arc::new(Node::Array(ArrayNode {
                children,
                children_count: array.children_count,
                entry_count: array.entry_count - 1,
            })))
        }
        None => {
            if array.children_count > 1 {
                let mut children = array.children.clone();
                children[child_index] = None;
                Some(Arc::new(Node::Array(ArrayNode {
                    children,
                    children_count: array.children_count - 1,
                    entry_count: array.entry_count - 1,
                })))
            } else {
                None
            }
        }
    }
}

fn dissoc_collision<K: Eq, V>(
    node: &Arc<Node<K, V>>,
    collision: &CollisionNode<K, V>,
    key_hash: u32,
    key: &K,
) -> Option<Arc<Node<K, V>>> {
    if collision.key_hash != key_hash {
        return Some(node.clone());
    }
    let Some(index) = collision
        .children
        .iter()
        .position(|entry| entry.key == *key)
    else {
        return Some(node.clone());
    };
    if collision.children.len() > 2 {
        let mut children = collision.children.clone();
        children.remove(index);
        Some(Arc::new(Node::Collision(CollisionNode {
            key_hash: collision.key_hash,
            children,
        })))
    } else {
        // Never leave a one-entry collision node behind.
        let survivor = collision.children[1 - index].clone();
        Some(Arc::new(Node::Leaf(survivor)))
    }
}

// =============================================================================
// difference
// =============================================================================

/// Entries of `left` that are absent from `right` or present with a
/// different value.
///
/// Identity fast paths: `left` and `right` being the same `Arc` proves the
/// difference empty without traversal, and a slot-by-slot recursion that
/// changes nothing returns `left` itself without allocating.
pub(crate) fn difference<K: Eq, V: PartialEq>(
    shift: u32,
    left: Option<&Arc<Node<K, V>>>,
    right: Option<&Arc<Node<K, V>>>,
) -> Option<Arc<Node<K, V>>> {
    let (Some(left), Some(right)) = (left, right) else {
        return left.cloned();
    };
    if Arc::ptr_eq(left, right) {
        return None;
    }
    match (left.as_ref(), right.as_ref()) {
        (Node::Array(left_array), Node::Array(right_array)) => {
            difference_arrays(shift, left, left_array, right_array)
        }
        (Node::Array(_) | Node::Collision(_), Node::Leaf(right_entry)) => {
            difference_with_entry(shift, left, right_entry)
        }
        (Node::Array(_), Node::Collision(right_collision)) => {
            let mut result = Some(left.clone());
            for right_entry in &right_collision.children {
                let Some(current) = result.clone() else { break };
                let matched = get_entry(&current, shift, right_entry.key_hash, &right_entry.key)
                    .is_some_and(|left_entry| entries_match(left_entry, right_entry));
                if matched {
                    result = dissoc(&current, shift, right_entry.key_hash, &right_entry.key);
                }
            }
            result
        }
        (Node::Leaf(left_entry), _) => {
            match get_entry(right, shift, left_entry.key_hash, &left_entry.key) {
                Some(right_entry) if entries_match(left_entry, right_entry) => None,
                _ => Some(left.clone()),
            }
        }
        (Node::Collision(left_collision), Node::Array(_) | Node::Collision(_)) => {
            let survivors: EntryList<K, V> = left_collision
                .children
                .iter()
                .filter(|left_entry| {
                    !get_entry(right, shift, left_entry.key_hash, &left_entry.key)
                        .is_some_and(|right_entry| entries_match(left_entry, right_entry))
                })
                .cloned()
                .collect();
            collapse_collision(left, left_collision, survivors)
        }
    }
}

fn difference_arrays<K: Eq, V: PartialEq>(
    shift: u32,
    left: &Arc<Node<K, V>>,
    left_array: &ArrayNode<K, V>,
    right_array: &ArrayNode<K, V>,
) -> Option<Arc<Node<K, V>>> {
    let mut children = no_children();
    let mut children_count = 0;
    let mut entry_count = 0;
    let mut return_left = true;
    for index in 0..BRANCHING_FACTOR {
        let child = difference(
            shift + BITS_PER_LEVEL,
            left_array.children[index].as_ref(),
            right_array.children[index].as_ref(),
        );
        if !same_slot(child.as_ref(), left_array.children[index].as_ref()) {
            return_left = false;
        }
        if let Some(child) = &child {
            children_count += 1;
            entry_count += count_entries(child);
        }
        children[index] = child;
    }
    if children_count == 0 {
        None
    } else if return_left {
        Some(left.clone())
    } else {
        Some(Arc::new(Node::Array(ArrayNode {
            children,
            children_count,
            entry_count,
        })))
    }
}

/// Removes the right entry from `left` when present with an equal value.
fn difference_with_entry<K: Eq, V: PartialEq>(
    shift: u32,
    left: &Arc<Node<K, V>>,
    right_entry: &Arc<Entry<K, V>>,
) -> Option<Arc<Node<K, V>>> {
    match get_entry(left, shift, right_entry.key_hash, &right_entry.key) {
        Some(left_entry) if entries_match(left_entry, right_entry) => {
            dissoc(left, shift, right_entry.key_hash, &right_entry.key)
        }
        _ => Some(left.clone()),
    }
}

/// Same entry object, or equal values. Pointer identity is the cheap proof
/// of value equality for entries shared between both sides.
fn entries_match<K, V: PartialEq>(left: &Arc<Entry<K, V>>, right: &Arc<Entry<K, V>>) -> bool {
    Arc::ptr_eq(left, right) || left.value == right.value
}

/// Both slots empty, or the same child node.
fn same_slot<K, V>(result: Option<&Arc<Node<K, V>>>, original: Option<&Arc<Node<K, V>>>) -> bool {
    match (result, original) {
        (None, None) => true,
        (Some(result), Some(original)) => Arc::ptr_eq(result, original),
        _ => false,
    }
}

/// Rebuilds a collision node from its surviving entries: empty, a bare
/// entry, the untouched original, or a fresh collision node.
fn collapse_collision<K, V>(
    original: &Arc<Node<K, V>>,
    original_collision: &CollisionNode<K, V>,
    survivors: EntryList<K, V>,
) -> Option<Arc<Node<K, V>>> {
    match survivors.len() {
        0 => None,
        1 => Some(Arc::new(Node::Leaf(survivors[0].clone()))),
        count if count == original_collision.children.len() => Some(original.clone()),
        _ => Some(Arc::new(Node::Collision(CollisionNode {
            key_hash: original_collision.key_hash,
            children: survivors,
        }))),
    }
}

// =============================================================================
// intersect
// =============================================================================

/// Entries present on both sides with equal values.
///
/// Structurally symmetric to [`difference`] with keep and discard swapped,
/// and with the same identity-preserving fast paths: the untouched left (or
/// right) node is returned as-is whenever the surviving set equals that
/// side.
pub(crate) fn intersect<K: Eq, V: PartialEq>(
    shift: u32,
    left: Option<&Arc<Node<K, V>>>,
    right: Option<&Arc<Node<K, V>>>,
) -> Option<Arc<Node<K, V>>> {
    let (Some(left), Some(right)) = (left, right) else {
        return None;
    };
    if Arc::ptr_eq(left, right) {
        return Some(left.clone());
    }
    match (left.as_ref(), right.as_ref()) {
        (Node::Array(left_array), Node::Array(right_array)) => {
            intersect_arrays(shift, left, left_array, right, right_array)
        }
        (Node::Leaf(left_entry), _) => {
            match get_entry(right, shift, left_entry.key_hash, &left_entry.key) {
                Some(right_entry) if entries_match(left_entry, right_entry) => Some(left.clone()),
                _ => None,
            }
        }
        (_, Node::Leaf(right_entry)) => {
            match get_entry(left, shift, right_entry.key_hash, &right_entry.key) {
                Some(left_entry) if entries_match(left_entry, right_entry) => Some(right.clone()),
                _ => None,
            }
        }
        (Node::Collision(left_collision), Node::Array(_)) => {
            let survivors = surviving_entries(shift, &left_collision.children, right);
            collapse_collision(left, left_collision, survivors)
        }
        (Node::Collision(left_collision), Node::Collision(right_collision)) => {
            if left_collision.key_hash != right_collision.key_hash {
                return None;
            }
            let survivors = surviving_entries(shift, &left_collision.children, right);
            if survivors.len() == left_collision.children.len() {
                Some(left.clone())
            } else if survivors.len() == right_collision.children.len() {
                // Every right entry matched; the right node already is the
                // intersection.
                Some(right.clone())
            } else {
                collapse_collision(left, left_collision, survivors)
            }
        }
        (Node::Array(_), Node::Collision(right_collision)) => {
            let survivors = surviving_entries(shift, &right_collision.children, left);
            match survivors.len() {
                0 => None,
                count if count == right_collision.children.len() => Some(right.clone()),
                1 => Some(Arc::new(Node::Leaf(survivors[0].clone()))),
                _ => Some(Arc::new(Node::Collision(CollisionNode {
                    key_hash: right_collision.key_hash,
                    children: survivors,
                }))),
            }
        }
    }
}

/// Entries of `candidates` that the `other` side holds with an equal value.
/// The surviving `Arc`s come from the side being filtered, so identity
/// checks against that side stay meaningful.
fn surviving_entries<K: Eq, V: PartialEq>(
    shift: u32,
    candidates: &EntryList<K, V>,
    other: &Arc<Node<K, V>>,
) -> EntryList<K, V> {
    candidates
        .iter()
        .filter(|candidate| {
            get_entry(other, shift, candidate.key_hash, &candidate.key)
                .is_some_and(|found| entries_match(candidate, found))
        })
        .cloned()
        .collect()
}

fn intersect_arrays<K: Eq, V: PartialEq>(
    shift: u32,
    left: &Arc<Node<K, V>>,
    left_array: &ArrayNode<K, V>,
    right: &Arc<Node<K, V>>,
    right_array: &ArrayNode<K, V>,
) -> Option<Arc<Node<K, V>>> {
    let mut children = no_children();
    let mut children_count = 0;
    let mut entry_count = 0;
    let mut return_left = true;
    let mut return_right = true;
    for index in 0..BRANCHING_FACTOR {
        let child = intersect(
            shift + BITS_PER_LEVEL,
            left_array.children[index].as_ref(),
            right_array.children[index].as_ref(),
        );
        if !same_slot(child.as_ref(), left_array.children[index].as_ref()) {
            return_left = false;
        }
        if !same_slot(child.as_ref(), right_array.children[index].as_ref()) {
            return_right = false;
        }
        if let Some(child) = &child {
            children_count += 1;
            entry_count += count_entries(child);
        }
        children[index] = child;
    }
    if children_count == 0 {
        return None;
    }
    if return_left {
        return Some(left.clone());
    }
    if return_right {
        return Some(right.clone());
    }
    if children_count == 1 {
        // A lone leaf or collision child needs no branch above it. A lone
        // array child stays wrapped: its entries may still diverge below.
        let sole = children
            .iter_mut()
            .find_map(Option::take)
            .unwrap_or_else(|| unreachable!("children_count is 1"));
        if !matches!(sole.as_ref(), Node::Array(_)) {
            return Some(sole);
        }
        let mut children = no_children();
        let idx = array_index(shift, hash_of_sole(&sole));
        children[idx] = Some(sole);
        return Some(Arc::new(Node::Array(ArrayNode {
            children,
            children_count: 1,
            entry_count,
        })));
    }
    Some(Arc::new(Node::Array(ArrayNode {
        children,
        children_count,
        entry_count,
    })))
}

/// Hash of any entry inside the node, used to re-slot a lone array child.
fn hash_of_sole<K, V>(node: &Arc<Node<K, V>>) -> u32 {
    match node.as_ref() {
        Node::Leaf(entry) => entry.key_hash,
        Node::Collision(collision) => collision.key_hash,
        Node::Array(array) => array
            .children
            .iter()
            .flatten()
            .next()
            .map_or(0, hash_of_sole),
    }
}

// =============================================================================
// equiv
// =============================================================================

/// Deep structural equality, independent of physical node shape.
///
/// Pointer-identical subtrees short-circuit to `true`; differing cached
/// entry counts short-circuit to `false`; everything else is compared by
/// looking each left-side entry up on the right.
pub(crate) fn equiv<K: Eq, V: PartialEq>(
    shift: u32,
    left: Option<&Arc<Node<K, V>>>,
    right: Option<&Arc<Node<K, V>>>,
) -> bool {
    let (left, right) = match (left, right) {
        (None, None) => return true,
        (Some(left), Some(right)) => (left, right),
        _ => return false,
    };
    if Arc::ptr_eq(left, right) {
        return true;
    }
    if count_entries(left) != count_entries(right) {
        return false;
    }
    match (left.as_ref(), right.as_ref()) {
        (Node::Array(left_array), Node::Array(right_array)) => {
            (0..BRANCHING_FACTOR).all(|index| {
                equiv(
                    shift + BITS_PER_LEVEL,
                    left_array.children[index].as_ref(),
                    right_array.children[index].as_ref(),
                )
            })
        }
        (Node::Array(_), Node::Leaf(_) | Node::Collision(_)) => equiv(shift, Some(right), Some(left)),
        (Node::Leaf(left_entry), Node::Leaf(right_entry)) => {
            left_entry.key == right_entry.key && left_entry.value == right_entry.value
        }
        (Node::Leaf(left_entry), _) => {
            get_entry(right, shift, left_entry.key_hash, &left_entry.key)
                .is_some_and(|right_entry| entries_match(left_entry, right_entry))
        }
        (Node::Collision(left_collision), Node::Array(_) | Node::Collision(_)) => left_collision
            .children
            .iter()
            .all(|left_entry| {
                get_entry(right, shift, left_entry.key_hash, &left_entry.key)
                    .is_some_and(|right_entry| entries_match(left_entry, right_entry))
            }),
        // Entry counts already differ for these pairings.
        (Node::Collision(_), Node::Leaf(_)) => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
