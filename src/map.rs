//! The persistent map facade, its key-hasher capability, and the canonical
//! blank-map registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::cursor::{Cursor, Iter, seq};
use crate::error::HasherMismatch;
use crate::trie::{Entry, Node, assoc, count_entries, difference, dissoc, equiv, get_entry,
    intersect};

// =============================================================================
// KeyHasher
// =============================================================================

/// Hashes a key with the standard library hasher, folded to 32 bits.
fn standard_hash<K: Hash>(key: &K) -> u32 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let wide = hasher.finish();
    ((wide >> 32) ^ wide) as u32
}

enum HasherRepr<K> {
    /// The per-type standard hasher. Every standard handle for a given key
    /// type is the same capability.
    Standard(fn(&K) -> u32),
    /// A caller-supplied hash function, identified by its allocation.
    Custom(Arc<dyn Fn(&K) -> u32 + Send + Sync>),
}

/// The hashing capability a map was built with.
///
/// Hashers are compared by identity, never by behavior: all
/// [`standard`](KeyHasher::standard) handles for one key type are the same
/// capability, and a [`custom`](KeyHasher::custom) handle is only ever equal
/// to clones of itself. Maps built with different capabilities refuse to
/// combine in [`difference`](crate::PersistentMap::difference) and
/// [`intersection`](crate::PersistentMap::intersection).
///
/// The function must be consistent with key equality: `a == b` implies
/// `hash(a) == hash(b)`. A hasher that violates this causes silent lookup
/// misses, not errors.
pub struct KeyHasher<K> {
    repr: HasherRepr<K>,
}

impl<K> KeyHasher<K> {
    /// The standard hasher for `K`.
    pub fn standard() -> Self
    where
        K: Hash,
    {
        Self {
            repr: HasherRepr::Standard(standard_hash::<K>),
        }
    }

    /// A custom hashing capability.
    ///
    /// Cloning the returned handle preserves its identity; calling `custom`
    /// again with the same closure creates a distinct capability.
    pub fn custom(hash: impl Fn(&K) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            repr: HasherRepr::Custom(Arc::new(hash)),
        }
    }

    /// Hashes a key under this capability.
    pub fn hash_key(&self, key: &K) -> u32 {
        match &self.repr {
            HasherRepr::Standard(hash) => hash(key),
            HasherRepr::Custom(hash) => hash(key),
        }
    }

    /// Whether `self` and `other` are the same capability.
    pub fn same_identity(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (HasherRepr::Standard(_), HasherRepr::Standard(_)) => true,
            (HasherRepr::Custom(left), HasherRepr::Custom(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Identity token used to key the blank-map registry. Zero for the
    /// standard hasher; a custom hasher's allocation address otherwise,
    /// which stays valid as long as any clone of the handle lives.
    fn identity_token(&self) -> usize {
        match &self.repr {
            HasherRepr::Standard(_) => 0,
            HasherRepr::Custom(hash) => Arc::as_ptr(hash) as *const () as usize,
        }
    }
}

// A derived Clone would demand K: Clone.
impl<K> Clone for KeyHasher<K> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            HasherRepr::Standard(hash) => HasherRepr::Standard(*hash),
            HasherRepr::Custom(hash) => HasherRepr::Custom(hash.clone()),
        };
        Self { repr }
    }
}

impl<K> std::fmt::Debug for KeyHasher<K> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.repr {
            HasherRepr::Standard(_) => formatter.write_str("KeyHasher::Standard"),
            HasherRepr::Custom(_) => formatter.write_str("KeyHasher::Custom"),
        }
    }
}

// =============================================================================
// Blank-map registry
// =============================================================================

/// One canonical blank map per (map type, hasher identity) pair, for the
/// life of the process. The stored map owns its hasher handle, so a custom
/// hasher's address cannot be recycled while its entry is alive.
static BLANK_MAPS: LazyLock<Mutex<HashMap<(TypeId, usize), Box<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

// =============================================================================
// PersistentMap
// =============================================================================

struct MapInner<K, V> {
    root: Option<Arc<Node<K, V>>>,
    hasher: KeyHasher<K>,
}

/// A persistent hash map.
///
/// Every update returns a new map value and leaves the receiver untouched;
/// the two versions share all unaffected structure. Updates that would
/// change nothing return the receiver itself, observable through
/// [`ptr_eq`](PersistentMap::ptr_eq), which makes "did anything change"
/// checks free.
///
/// `Clone` is a reference-count bump, never a copy of the entries.
///
/// # Examples
///
/// ```
/// use permap::PersistentMap;
///
/// let empty: PersistentMap<&str, i32> = PersistentMap::blank();
/// let one = empty.assoc("answer", 42);
/// let two = one.assoc("other", 7);
///
/// assert_eq!(empty.count(), 0);
/// assert_eq!(one.get(&"answer"), Some(&42));
/// assert_eq!(one.get(&"other"), None);
/// assert_eq!(two.count(), 2);
/// ```
pub struct PersistentMap<K, V> {
    inner: Arc<MapInner<K, V>>,
}

impl<K, V> PersistentMap<K, V> {
    fn from_parts(root: Option<Arc<Node<K, V>>>, hasher: KeyHasher<K>) -> Self {
        Self {
            inner: Arc::new(MapInner { root, hasher }),
        }
    }

    /// Number of entries, O(1).
    pub fn count(&self) -> usize {
        self.inner.root.as_ref().map_or(0, |root| count_entries(root))
    }

    /// Number of entries; alias of [`count`](PersistentMap::count).
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.root.is_none()
    }

    /// Whether `self` and `other` are the same map value, not merely equal
    /// ones. This is the observation side of the no-op contracts: an
    /// [`assoc`](PersistentMap::assoc) or [`dissoc`](PersistentMap::dissoc)
    /// that changes nothing returns a map `ptr_eq` to its receiver.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The hashing capability this map was built with.
    pub fn hasher(&self) -> &KeyHasher<K> {
        &self.inner.hasher
    }

    /// Cursor at the first entry, or `None` for an empty map.
    ///
    /// The cursor observes this map version forever; later versions do not
    /// disturb it. Entry order is unspecified but stable for a given map.
    pub fn seq(&self) -> Option<Cursor<K, V>> {
        self.inner.root.as_ref().and_then(|root| seq(root, root))
    }

    /// Iterator over all entries, in the same order as
    /// [`seq`](PersistentMap::seq).
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(self.inner.root.as_ref())
    }
}

impl<K: Eq, V> PersistentMap<K, V> {
    /// The entry stored under `key`, with its cached hash.
    pub fn entry_at(&self, key: &K) -> Option<&Arc<Entry<K, V>>> {
        let root = self.inner.root.as_ref()?;
        get_entry(root, 0, self.inner.hasher.hash_key(key), key)
    }

    /// The value stored under `key`. Absence is a normal result.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entry_at(key).map(|entry| entry.value())
    }

    /// The value stored under `key`, or `not_found` when absent.
    pub fn get_or<'a>(&'a self, key: &K, not_found: &'a V) -> &'a V {
        self.get(key).unwrap_or(not_found)
    }

    /// Whether an entry is stored under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entry_at(key).is_some()
    }
}

impl<K: Eq, V: PartialEq> PersistentMap<K, V> {
    /// Returns a map with `key` bound to `value`.
    ///
    /// When `key` is already bound to an equal value, the receiver itself
    /// is returned and no structure is rebuilt.
    ///
    /// ```
    /// use permap::PersistentMap;
    ///
    /// let map = PersistentMap::blank().assoc(1, "one");
    /// assert!(map.assoc(1, "one").ptr_eq(&map));
    /// assert_eq!(map.assoc(1, "uno").get(&1), Some(&"uno"));
    /// ```
    pub fn assoc(&self, key: K, value: V) -> Self {
        let key_hash = self.inner.hasher.hash_key(&key);
        let entry = Arc::new(Entry::new(key_hash, key, value));
        match &self.inner.root {
            None => Self::from_parts(
                Some(Arc::new(Node::Leaf(entry))),
                self.inner.hasher.clone(),
            ),
            Some(root) => {
                let new_root = assoc(root, 0, &entry);
                if Arc::ptr_eq(root, &new_root) {
                    self.clone()
                } else {
                    Self::from_parts(Some(new_root), self.inner.hasher.clone())
                }
            }
        }
    }

    /// Deep structural equality, independent of how either map was built.
    ///
    /// Pointer-identical shared subtrees are never descended into, so
    /// comparing two versions of the same map costs proportionally to what
    /// changed between them.
    pub fn equiv(&self, other: &Self) -> bool {
        equiv(0, self.inner.root.as_ref(), other.inner.root.as_ref())
    }
}

impl<K, V> PersistentMap<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// The canonical empty map for the given hashing capability.
    ///
    /// Memoized per capability for the life of the process: repeated calls
    /// with the same capability return `ptr_eq` maps, and emptying any map
    /// built from it leads back to the same blank.
    pub fn blank_with_hasher(hasher: KeyHasher<K>) -> Self {
        let registry_key = (TypeId::of::<Self>(), hasher.identity_token());
        let mut registry = BLANK_MAPS.lock();
        let blank = registry
            .entry(registry_key)
            .or_insert_with(|| Box::new(Self::from_parts(None, hasher)));
        blank
            .downcast_ref::<Self>()
            .map_or_else(|| unreachable!("registry entry holds its own map type"), Clone::clone)
    }

    /// Returns a map without `key`.
    ///
    /// Removing an absent key returns the receiver itself; removing the
    /// last entry returns the canonical blank map for this map's hasher.
    pub fn dissoc(&self, key: &K) -> Self
    where
        K: Eq,
    {
        let Some(root) = &self.inner.root else {
            return self.clone();
        };
        match dissoc(root, 0, self.inner.hasher.hash_key(key), key) {
            None => Self::blank_with_hasher(self.inner.hasher.clone()),
            Some(new_root) if Arc::ptr_eq(root, &new_root) => self.clone(),
            Some(new_root) => Self::from_parts(Some(new_root), self.inner.hasher.clone()),
        }
    }

    /// Entries of `self` that are absent from `other` or bound to a
    /// different value there.
    ///
    /// Fails fast when the maps were built with different hasher
    /// capabilities. An empty result is the canonical blank; an untouched
    /// `self` comes back `ptr_eq` to the receiver.
    ///
    /// ```
    /// use permap::PersistentMap;
    ///
    /// let base = PersistentMap::blank().assoc(1, "a").assoc(2, "b");
    /// let edited = base.assoc(2, "c");
    /// let changed = base.difference(&edited).unwrap();
    /// assert_eq!(changed.count(), 1);
    /// assert_eq!(changed.get(&2), Some(&"b"));
    /// ```
    pub fn difference(&self, other: &Self) -> Result<Self, HasherMismatch>
    where
        K: Eq,
        V: PartialEq,
    {
        if !self.inner.hasher.same_identity(&other.inner.hasher) {
            return Err(HasherMismatch);
        }
        let result = difference(0, self.inner.root.as_ref(), other.inner.root.as_ref());
        Ok(self.wrap_set_result(result, other))
    }

    /// Entries bound to equal values in both `self` and `other`.
    ///
    /// Fails fast when the maps were built with different hasher
    /// capabilities. An empty result is the canonical blank; when one side
    /// survives whole, that map comes back `ptr_eq` to it.
    pub fn intersection(&self, other: &Self) -> Result<Self, HasherMismatch>
    where
        K: Eq,
        V: PartialEq,
    {
        if !self.inner.hasher.same_identity(&other.inner.hasher) {
            return Err(HasherMismatch);
        }
        let result = intersect(0, self.inner.root.as_ref(), other.inner.root.as_ref());
        Ok(self.wrap_set_result(result, other))
    }

    /// Rewraps a set-operation root, preserving map identity when the root
    /// survived unchanged from either side.
    fn wrap_set_result(&self, result: Option<Arc<Node<K, V>>>, other: &Self) -> Self {
        match result {
            None => Self::blank_with_hasher(self.inner.hasher.clone()),
            Some(root) => {
                if self
                    .inner
                    .root
                    .as_ref()
                    .is_some_and(|own| Arc::ptr_eq(own, &root))
                {
                    self.clone()
                } else if other
                    .inner
                    .root
                    .as_ref()
                    .is_some_and(|theirs| Arc::ptr_eq(theirs, &root))
                {
                    other.clone()
                } else {
                    Self::from_parts(Some(root), self.inner.hasher.clone())
                }
            }
        }
    }
}

impl<K, V> PersistentMap<K, V>
where
    K: Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// The canonical empty map under the standard hasher for `K`.
    ///
    /// All calls return the same map value:
    ///
    /// ```
    /// use permap::PersistentMap;
    ///
    /// let first: PersistentMap<i64, i64> = PersistentMap::blank();
    /// let second: PersistentMap<i64, i64> = PersistentMap::blank();
    /// assert!(first.ptr_eq(&second));
    /// ```
    pub fn blank() -> Self {
        Self::blank_with_hasher(KeyHasher::standard())
    }
}

// =============================================================================
// Trait implementations
// =============================================================================

// A derived Clone would demand K: Clone and V: Clone.
impl<K, V> Clone for PersistentMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Default for PersistentMap<K, V>
where
    K: Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::blank()
    }
}

impl<K, V> FromIterator<(K, V)> for PersistentMap<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: PartialEq + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterable: I) -> Self {
        iterable
            .into_iter()
            .fold(Self::blank(), |map, (key, value)| map.assoc(key, value))
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentMap<K, V> {
    type Item = Arc<Entry<K, V>>;
    type IntoIter = Iter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Eq, V: PartialEq> PartialEq for PersistentMap<K, V> {
    /// Content equality. Maps built under different hasher capabilities are
    /// still comparable; each left entry is then looked up under the right
    /// map's own hasher.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.count() != other.count() {
            return false;
        }
        if self.inner.hasher.same_identity(&other.inner.hasher) {
            return self.equiv(other);
        }
        self.iter()
            .all(|entry| other.get(entry.key()) == Some(entry.value()))
    }
}

impl<K: Eq, V: Eq> Eq for PersistentMap<K, V> {}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for PersistentMap<K, V> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<Arc<Entry<K, V>>> = self.iter().collect();
        formatter
            .debug_map()
            .entries(entries.iter().map(|entry| (entry.key(), entry.value())))
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn map_of(pairs: &[(i32, i32)]) -> PersistentMap<i32, i32> {
        pairs.iter().copied().collect()
    }

    // -- blank registry --

    #[rstest]
    fn blank_is_canonical_per_type() {
        let first: PersistentMap<i32, i32> = PersistentMap::blank();
        let second: PersistentMap<i32, i32> = PersistentMap::blank();
        assert!(first.ptr_eq(&second));
        assert!(first.is_empty());
    }

    #[rstest]
    fn blank_with_same_custom_hasher_is_canonical() {
        let hasher = KeyHasher::custom(|key: &i32| *key as u32);
        let first: PersistentMap<i32, i32> = PersistentMap::blank_with_hasher(hasher.clone());
        let second: PersistentMap<i32, i32> = PersistentMap::blank_with_hasher(hasher);
        assert!(first.ptr_eq(&second));
    }

    #[rstest]
    fn blanks_with_distinct_custom_hashers_are_distinct() {
        let first: PersistentMap<i32, i32> =
            PersistentMap::blank_with_hasher(KeyHasher::custom(|key: &i32| *key as u32));
        let second: PersistentMap<i32, i32> =
            PersistentMap::blank_with_hasher(KeyHasher::custom(|key: &i32| *key as u32));
        assert!(!first.ptr_eq(&second));
    }

    #[rstest]
    fn custom_and_standard_blanks_are_distinct() {
        let standard: PersistentMap<i32, i32> = PersistentMap::blank();
        let custom: PersistentMap<i32, i32> =
            PersistentMap::blank_with_hasher(KeyHasher::custom(|key: &i32| *key as u32));
        assert!(!standard.ptr_eq(&custom));
    }

    // -- assoc / get --

    #[rstest]
    fn assoc_and_get_round_trip() {
        let map = PersistentMap::blank().assoc(1, 10).assoc(2, 20);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.get(&2), Some(&20));
        assert_eq!(map.get(&3), None);
        assert_eq!(map.count(), 2);
    }

    #[rstest]
    fn assoc_leaves_prior_version_untouched() {
        let before = PersistentMap::blank().assoc(1, 10);
        let after = before.assoc(1, 11).assoc(2, 20);
        assert_eq!(before.get(&1), Some(&10));
        assert_eq!(before.count(), 1);
        assert_eq!(after.get(&1), Some(&11));
        assert_eq!(after.count(), 2);
    }

    #[rstest]
    fn assoc_of_present_binding_returns_the_same_map() {
        let map = PersistentMap::blank().assoc(1, 10);
        assert!(map.assoc(1, 10).ptr_eq(&map));
        assert!(!map.assoc(1, 11).ptr_eq(&map));
    }

    #[rstest]
    fn get_or_falls_back_when_absent() {
        let map = PersistentMap::blank().assoc(1, 10);
        assert_eq!(map.get_or(&1, &0), &10);
        assert_eq!(map.get_or(&9, &0), &0);
    }

    #[rstest]
    fn entry_at_exposes_the_stored_hash() {
        let map = PersistentMap::blank_with_hasher(KeyHasher::custom(|_: &i32| 7)).assoc(1, 10);
        let entry = map.entry_at(&1).expect("present");
        assert_eq!(entry.key_hash(), 7);
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    // -- dissoc --

    #[rstest]
    fn dissoc_removes_only_the_given_key() {
        let map = map_of(&[(1, 10), (2, 20), (3, 30)]);
        let smaller = map.dissoc(&2);
        assert_eq!(smaller.count(), 2);
        assert_eq!(smaller.get(&2), None);
        assert_eq!(smaller.get(&1), Some(&10));
        assert_eq!(map.get(&2), Some(&20));
    }

    #[rstest]
    fn dissoc_of_absent_key_returns_the_same_map() {
        let map = map_of(&[(1, 10)]);
        assert!(map.dissoc(&9).ptr_eq(&map));
    }

    #[rstest]
    fn dissoc_of_last_entry_returns_the_canonical_blank() {
        let map = PersistentMap::blank().assoc(1, 10);
        let emptied = map.dissoc(&1);
        assert!(emptied.ptr_eq(&PersistentMap::blank()));
    }

    #[rstest]
    fn dissoc_to_empty_preserves_a_custom_hasher_identity() {
        let hasher = KeyHasher::custom(|key: &i32| *key as u32);
        let blank: PersistentMap<i32, i32> = PersistentMap::blank_with_hasher(hasher.clone());
        let emptied = blank.assoc(1, 10).dissoc(&1);
        assert!(emptied.ptr_eq(&PersistentMap::blank_with_hasher(hasher)));
        assert!(!emptied.ptr_eq(&PersistentMap::blank()));
    }

    #[rstest]
    fn dissoc_on_blank_returns_it_unchanged() {
        let blank: PersistentMap<i32, i32> = PersistentMap::blank();
        assert!(blank.dissoc(&1).ptr_eq(&blank));
    }

    // -- collisions end to end --

    #[rstest]
    fn colliding_keys_coexist_and_separate() {
        let map = PersistentMap::blank_with_hasher(KeyHasher::custom(|_: &i32| 1))
            .assoc(1, 10)
            .assoc(2, 20)
            .assoc(3, 30);
        assert_eq!(map.count(), 3);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.get(&2), Some(&20));
        assert_eq!(map.get(&3), Some(&30));
        let smaller = map.dissoc(&2);
        assert_eq!(smaller.count(), 2);
        assert_eq!(smaller.get(&2), None);
        assert_eq!(smaller.get(&3), Some(&30));
    }

    // -- difference --

    #[rstest]
    fn difference_of_map_with_itself_is_the_blank() {
        let map = map_of(&[(1, 10), (2, 20)]);
        let result = map.difference(&map).expect("same hasher");
        assert!(result.ptr_eq(&PersistentMap::blank()));
    }

    #[rstest]
    fn difference_keeps_changed_and_removed_bindings() {
        let base = map_of(&[(1, 10), (2, 20), (3, 30)]);
        let other = base.dissoc(&1).assoc(2, 21);
        let result = base.difference(&other).expect("same hasher");
        assert_eq!(result.count(), 2);
        assert_eq!(result.get(&1), Some(&10));
        assert_eq!(result.get(&2), Some(&20));
        assert_eq!(result.get(&3), None);
    }

    #[rstest]
    fn difference_with_disjoint_map_returns_self() {
        let left = map_of(&[(1, 10), (2, 20)]);
        let right = map_of(&[(3, 30)]);
        let result = left.difference(&right).expect("same hasher");
        assert!(result.ptr_eq(&left));
    }

    #[rstest]
    fn difference_rejects_distinct_hashers() {
        let left: PersistentMap<i32, i32> = PersistentMap::blank();
        let right =
            PersistentMap::blank_with_hasher(KeyHasher::custom(|key: &i32| *key as u32));
        assert_eq!(left.difference(&right), Err(HasherMismatch));
    }

    // -- intersection --

    #[rstest]
    fn intersection_of_map_with_itself_is_itself() {
        let map = map_of(&[(1, 10), (2, 20)]);
        let result = map.intersection(&map).expect("same hasher");
        assert!(result.ptr_eq(&map));
    }

    #[rstest]
    fn intersection_keeps_bindings_equal_on_both_sides() {
        let left = map_of(&[(1, 10), (2, 20), (3, 30)]);
        let right = map_of(&[(2, 20), (3, 31), (4, 40)]);
        let result = left.intersection(&right).expect("same hasher");
        assert_eq!(result.count(), 1);
        assert_eq!(result.get(&2), Some(&20));
    }

    #[rstest]
    fn intersection_with_subset_returns_the_subset_map() {
        let small = map_of(&[(1, 10), (2, 20)]);
        let big = small.assoc(3, 30);
        let result = big.intersection(&small).expect("same hasher");
        assert!(result.ptr_eq(&small));
    }

    #[rstest]
    fn intersection_of_disjoint_maps_is_the_blank() {
        let left = map_of(&[(1, 10)]);
        let right = map_of(&[(2, 20)]);
        let result = left.intersection(&right).expect("same hasher");
        assert!(result.ptr_eq(&PersistentMap::blank()));
    }

    #[rstest]
    fn intersection_rejects_distinct_hashers() {
        let left: PersistentMap<i32, i32> = PersistentMap::blank();
        let right =
            PersistentMap::blank_with_hasher(KeyHasher::custom(|key: &i32| *key as u32));
        assert_eq!(left.intersection(&right), Err(HasherMismatch));
    }

    // -- equiv / PartialEq --

    #[rstest]
    fn equiv_ignores_build_order() {
        let left = map_of(&[(1, 10), (2, 20), (3, 30)]);
        let right = map_of(&[(3, 30), (1, 10), (2, 20)]);
        assert!(left.equiv(&right));
        assert!(!left.equiv(&right.assoc(3, 31)));
        assert_eq!(left, right);
    }

    #[rstest]
    fn eq_spans_hasher_capabilities() {
        let standard = map_of(&[(1, 10), (2, 20)]);
        let custom = PersistentMap::blank_with_hasher(KeyHasher::custom(|key: &i32| *key as u32))
            .assoc(1, 10)
            .assoc(2, 20);
        assert_eq!(standard, custom);
        assert_ne!(standard, custom.assoc(2, 21));
    }

    // -- hasher capability --

    #[rstest]
    fn standard_hasher_handles_share_identity() {
        let first: KeyHasher<i32> = KeyHasher::standard();
        let second: KeyHasher<i32> = KeyHasher::standard();
        assert!(first.same_identity(&second));
    }

    #[rstest]
    fn custom_hasher_identity_follows_the_handle() {
        let original = KeyHasher::custom(|key: &i32| *key as u32);
        let cloned = original.clone();
        let rebuilt = KeyHasher::custom(|key: &i32| *key as u32);
        assert!(original.same_identity(&cloned));
        assert!(!original.same_identity(&rebuilt));
        assert!(!original.same_identity(&KeyHasher::standard()));
    }

    #[rstest]
    fn equal_keys_hash_equal_under_the_standard_hasher() {
        let hasher: KeyHasher<String> = KeyHasher::standard();
        assert_eq!(
            hasher.hash_key(&"abc".to_string()),
            hasher.hash_key(&"abc".to_string())
        );
    }

    // -- iteration and conversions --

    #[rstest]
    fn iter_yields_every_binding_once() {
        let map = map_of(&[(1, 10), (2, 20), (3, 30)]);
        let mut pairs: Vec<(i32, i32)> = map
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(1, 10), (2, 20), (3, 30)]);
        assert_eq!(map.iter().len(), 3);
    }

    #[rstest]
    fn seq_on_blank_is_none() {
        let blank: PersistentMap<i32, i32> = PersistentMap::blank();
        assert!(blank.seq().is_none());
    }

    #[rstest]
    fn from_iterator_keeps_the_last_binding_per_key() {
        let map: PersistentMap<i32, i32> = vec![(1, 10), (2, 20), (1, 11)].into_iter().collect();
        assert_eq!(map.count(), 2);
        assert_eq!(map.get(&1), Some(&11));
    }

    #[rstest]
    fn into_iterator_on_a_reference_matches_iter() {
        let map = map_of(&[(1, 10), (2, 20)]);
        let mut keys: Vec<i32> = (&map).into_iter().map(|entry| *entry.key()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2]);
    }

    #[rstest]
    fn debug_formats_as_a_map() {
        let map = PersistentMap::blank().assoc(1, 10);
        assert_eq!(format!("{map:?}"), "{1: 10}");
    }

    #[rstest]
    fn default_is_the_canonical_blank() {
        let map: PersistentMap<i32, i32> = PersistentMap::default();
        assert!(map.ptr_eq(&PersistentMap::blank()));
    }
}
