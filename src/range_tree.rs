//! The public range-query tree and its iterators.

use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::comparator::Comparator;
use crate::error::{Error, Result};
use crate::raw::{Handle, Node, RawRangeTree};

/// A B+ tree multimap answering range and equality queries without a full
/// scan.
///
/// `RangeTree` indexes values by keys with a [total order]. Duplicate keys
/// are allowed: inserting an existing key adds another entry rather than
/// overwriting, and among equal keys the most recently inserted entry is
/// ordered first. Queries pair a key with one of three comparator strings,
/// `"<="`, `"=="`, or `">="`, and return every value whose key satisfies the
/// relation.
///
/// All values live in leaf nodes linked into a chain in key order, so a query
/// descends the tree once to a boundary leaf and then walks the chain,
/// taking whole leaves wherever sortedness proves them entirely in range.
///
/// The branching factor — the maximum number of children per routing node —
/// is fixed at construction and must be greater than two. It bounds every
/// node to `order - 1` keys; a node pushed past that bound is split and its
/// median key promoted, which is how the tree stays balanced.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the tree. The behavior resulting from such a logic
/// error is not specified, but will not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rangetree::RangeTree;
///
/// let mut calories = RangeTree::new(3)?;
///
/// // Index some foods by calorie count; duplicates are fine.
/// calories.insert(95, "apple");
/// calories.insert(105, "banana");
/// calories.insert(95, "orange");
/// calories.insert(231, "bagel");
///
/// // All foods with at most 100 calories, in ascending calorie order.
/// assert_eq!(calories.range_search(&100, "<="), [&"orange", &"apple"]);
///
/// // Exactly 95 calories: the most recent insertion comes first.
/// assert_eq!(calories.range_search(&95, "=="), [&"orange", &"apple"]);
///
/// // An unrecognized comparator is an empty result, not an error.
/// assert!(calories.range_search(&95, "!=").is_empty());
/// # Ok::<(), rangetree::Error>(())
/// ```
///
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct RangeTree<K, V> {
    raw: RawRangeTree<K, V>,
}

impl<K, V> RangeTree<K, V> {
    /// Creates an empty tree with the given branching factor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBranchingFactor`] if `order` is two or less;
    /// a narrower node cannot be split into two non-empty halves around a
    /// promoted key.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangetree::{Error, RangeTree};
    ///
    /// let tree: RangeTree<i64, &str> = RangeTree::new(3)?;
    /// assert_eq!(tree.order(), 3);
    ///
    /// let failed = RangeTree::<i64, &str>::new(2);
    /// assert_eq!(failed.err(), Some(Error::InvalidBranchingFactor(2)));
    /// # Ok::<(), rangetree::Error>(())
    /// ```
    pub const fn new(order: usize) -> Result<Self> {
        if order <= 2 {
            return Err(Error::InvalidBranchingFactor(order));
        }
        Ok(Self { raw: RawRangeTree::new(order) })
    }

    /// Returns the branching factor the tree was constructed with.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.raw.order()
    }

    /// Returns the number of entries in the tree.
    ///
    /// Every insertion adds an entry, duplicates included, so this equals
    /// the number of `insert` calls made.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangetree::RangeTree;
    ///
    /// let mut tree = RangeTree::new(3)?;
    /// tree.insert(1, "a");
    /// tree.insert(1, "b");
    /// assert_eq!(tree.len(), 2);
    /// # Ok::<(), rangetree::Error>(())
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns an iterator over the entries in ascending key order, with the
    /// most recently inserted entry first among equal keys.
    ///
    /// Iteration walks the leaf chain directly, taking amortized constant
    /// time per entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangetree::RangeTree;
    ///
    /// let mut tree = RangeTree::new(3)?;
    /// tree.insert(2, "two");
    /// tree.insert(1, "one");
    /// tree.insert(3, "three");
    ///
    /// let keys: Vec<i32> = tree.iter().map(|(&k, _)| k).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// # Ok::<(), rangetree::Error>(())
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            leaf: self.raw.first_leaf(),
            index: 0,
            remaining: self.raw.len(),
        }
    }
}

impl<K: Ord + Clone, V> RangeTree<K, V> {
    /// Inserts a key-value entry into the tree.
    ///
    /// Duplicate keys produce multiple stored entries, never an overwrite;
    /// the insertion is total and cannot fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangetree::RangeTree;
    ///
    /// let mut tree = RangeTree::new(5)?;
    /// tree.insert(10, "first");
    /// tree.insert(10, "second");
    /// assert_eq!(tree.range_search(&10, "=="), [&"second", &"first"]);
    /// # Ok::<(), rangetree::Error>(())
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        self.raw.insert(key, value);
    }

    /// Returns every value whose key satisfies `key` under `comparator`,
    /// in ascending key order.
    ///
    /// `comparator` must be one of `"<="`, `"=="`, or `">="`. Any other
    /// string — like a query against an empty tree — yields an empty vector
    /// rather than an error, so callers cannot distinguish "no matches" from
    /// "bad query"; validate up front with [`Comparator::parse`] when that
    /// distinction matters.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangetree::RangeTree;
    ///
    /// let mut tree = RangeTree::new(3)?;
    /// for key in [5, 10, 15, 20, 25] {
    ///     tree.insert(key, key);
    /// }
    ///
    /// assert_eq!(tree.range_search(&12, ">="), [&15, &20, &25]);
    /// assert_eq!(tree.range_search(&12, "<="), [&5, &10]);
    /// assert!(tree.range_search(&12, "==").is_empty());
    /// # Ok::<(), rangetree::Error>(())
    /// ```
    #[must_use]
    pub fn range_search(&self, key: &K, comparator: &str) -> Vec<&V> {
        match Comparator::parse(comparator) {
            Some(comparator) => self.raw.range_search(key, comparator),
            None => Vec::new(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RangeTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the tree breadth-first, one line per level, each node's key list
/// bracketed. An inspection aid, not a stable format.
impl<K: fmt::Debug, V> fmt::Debug for RangeTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.raw.root() else {
            return f.write_str("{}");
        };

        let mut level: Vec<Handle> = Vec::new();
        level.push(root);
        let mut first = true;
        while !level.is_empty() {
            if !first {
                f.write_str("\n")?;
            }
            first = false;

            let mut next_level: Vec<Handle> = Vec::new();
            f.write_str("{")?;
            for (position, &handle) in level.iter().enumerate() {
                if position > 0 {
                    f.write_str(", ")?;
                }
                let node = self.raw.node(handle);
                write!(f, "{:?}", node.keys())?;
                if let Node::Internal(internal) = node {
                    next_level.extend_from_slice(internal.children());
                }
            }
            f.write_str("}")?;
            level = next_level;
        }
        Ok(())
    }
}

/// An iterator over the entries of a [`RangeTree`].
///
/// This `struct` is created by the [`iter`] method on [`RangeTree`]. See its
/// documentation for more.
///
/// [`iter`]: RangeTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawRangeTree<K, V>,
    leaf: Option<Handle>,
    index: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.leaf {
            let leaf = self.raw.leaf(handle);
            if self.index < leaf.key_count() {
                let key = &leaf.keys()[self.index];
                let value = self.raw.value(leaf.value(self.index));
                self.index += 1;
                self.remaining -= 1;
                return Some((key, value));
            }
            self.leaf = leaf.next();
            self.index = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}
