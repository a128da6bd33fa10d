use smallvec::SmallVec;

use crate::comparator::Comparator;

use super::handle::Handle;

/// Inline capacity for per-node storage. The branching factor is chosen at
/// runtime, so nodes configured wider than this spill to the heap.
pub(crate) const INLINE_KEYS: usize = 8;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_KEYS + 1]>;
pub(crate) type Values = SmallVec<[Handle; INLINE_KEYS]>;

/// A tree node: either an internal routing node or a terminal leaf.
#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

/// B+Tree: internal nodes hold routing keys and child handles only.
///
/// Routing invariant: `keys[i]` separates `children[i]` and `children[i + 1]`;
/// every key in `children[i]`'s subtree is `<= keys[i]`, and every key in
/// `children[i + 1]`'s subtree is `>= keys[i]`.
pub(crate) struct InternalNode<K> {
    keys: Keys<K>,
    children: Children,
}

/// B+Tree: leaf nodes hold parallel keys and value handles, plus the
/// non-owning `prev`/`next` links forming the leaf chain in key order.
pub(crate) struct LeafNode<K> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Keys<K>,
    values: Values,
}

impl<K> Node<K> {
    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    /// Returns this node's keys.
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => internal.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates the single-key parent produced by a split.
    pub(crate) fn from_split(separator: K, left: Handle, right: Handle) -> Self {
        let mut keys = Keys::new();
        keys.push(separator);
        let mut children = Children::new();
        children.push(left);
        children.push(right);
        Self { keys, children }
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns all keys.
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the child handle at the given index.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    /// Returns all children.
    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Returns the index of the child to descend into for the given key:
    /// the count of routing keys strictly less than it.
    ///
    /// The scan is a full linear count rather than a binary search or an
    /// early-exit walk; equal routing keys are not counted, so descent always
    /// lands left of every separator equal to the key. Together with the
    /// matching rule in [`LeafNode::insert`] this puts a new duplicate ahead
    /// of every existing equal entry.
    #[inline]
    pub(crate) fn route(&self, key: &K) -> usize
    where
        K: Ord,
    {
        self.keys.iter().filter(|k| *k < key).count()
    }

    /// Splices a finished split into this node in place of the child at
    /// `child_index` that overflowed: the promoted key lands at that index in
    /// the key list and the two fresh halves replace the obsolete child.
    pub(crate) fn splice(&mut self, child_index: usize, separator: K, left: Handle, right: Handle) {
        self.keys.insert(child_index, separator);
        self.children[child_index] = left;
        self.children.insert(child_index + 1, right);
    }

    /// Splits this node, consuming it. Returns the promoted median key and
    /// the two fresh halves; the median is kept by neither half.
    ///
    /// Children are divided by count: `len / 2` to the left half and the
    /// remainder to the right, so an odd child count gives the right half
    /// one extra child.
    pub(crate) fn split(self) -> (K, Self, Self) {
        let Self { mut keys, mut children } = self;

        let median = keys.len() / 2;
        let right_keys: Keys<K> = keys.drain(median + 1..).collect();
        let separator = keys.pop().unwrap();

        let child_mid = children.len() / 2;
        let right_children: Children = children.drain(child_mid..).collect();

        (
            separator,
            Self { keys, children },
            Self { keys: right_keys, children: right_children },
        )
    }
}

impl<K> LeafNode<K> {
    /// Creates a leaf holding a single entry.
    pub(crate) fn singleton(key: K, value: Handle) -> Self {
        let mut keys = Keys::new();
        keys.push(key);
        let mut values = Values::new();
        values.push(value);
        Self {
            prev: None,
            next: None,
            keys,
            values,
        }
    }

    /// Returns the number of keys in this leaf.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns all keys.
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the value handle at the given index.
    #[inline]
    pub(crate) fn value(&self, index: usize) -> Handle {
        self.values[index]
    }

    /// Returns all value handles.
    pub(crate) fn values(&self) -> &[Handle] {
        &self.values
    }

    /// Returns the previous leaf in the chain.
    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    /// Sets the previous leaf in the chain.
    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    /// Returns the next leaf in the chain.
    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    /// Sets the next leaf in the chain.
    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    // Reachable leaves always hold at least one key; an empty leaf exists
    // only before the tree links it in.

    /// Returns the smallest key in this leaf.
    #[inline]
    pub(crate) fn first_key(&self) -> &K {
        &self.keys[0]
    }

    /// Returns the largest key in this leaf.
    #[inline]
    pub(crate) fn last_key(&self) -> &K {
        &self.keys[self.keys.len() - 1]
    }

    /// Inserts an entry at the count of keys strictly less than it.
    ///
    /// Equal keys are not counted, so the new entry lands immediately before
    /// the first existing equal key: among duplicates, the most recently
    /// inserted entry is leftmost. The scan is a full linear count; that rule
    /// is what fixes where ties land.
    pub(crate) fn insert(&mut self, key: K, value: Handle)
    where
        K: Ord,
    {
        let index = self.keys.iter().filter(|k| **k < key).count();
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Splits this leaf, consuming it. Returns the promoted key and the two
    /// fresh halves.
    ///
    /// Unlike the internal split, the median entry is kept: it stays the last
    /// entry of the left half, and the promoted key is a clone of it. The
    /// left half inherits the old `prev` link and the right half the old
    /// `next` link; the links between and around the halves are the tree's
    /// responsibility, since they need the halves' handles.
    pub(crate) fn split(self) -> (K, Self, Self)
    where
        K: Clone,
    {
        let Self { prev, next, mut keys, mut values } = self;

        let median = keys.len() / 2;
        let right_keys: Keys<K> = keys.drain(median + 1..).collect();
        let right_values: Values = values.drain(median + 1..).collect();
        let separator = keys[median].clone();

        (
            separator,
            Self { prev, next: None, keys, values },
            Self { prev: None, next, keys: right_keys, values: right_values },
        )
    }

    /// Returns the value handles in this leaf matching `key` under
    /// `comparator`, in key order.
    ///
    /// This is a pure per-leaf filter; chain walking is the tree's job. Each
    /// comparator scans from the end of the leaf where matches must be
    /// contiguous and stops at the first key that can no longer match:
    /// `"=="` and `"<="` from the low end, `">="` from the high end.
    pub(crate) fn matches(&self, key: &K, comparator: Comparator) -> Values
    where
        K: Ord,
    {
        let mut matched = Values::new();
        match comparator {
            Comparator::Equal => {
                for (k, &v) in self.keys.iter().zip(&self.values) {
                    if k == key {
                        matched.push(v);
                    } else if k > key {
                        break;
                    }
                }
            }
            Comparator::LessOrEqual => {
                for (k, &v) in self.keys.iter().zip(&self.values) {
                    if k <= key {
                        matched.push(v);
                    } else {
                        break;
                    }
                }
            }
            Comparator::GreaterOrEqual => {
                for index in (0..self.keys.len()).rev() {
                    if self.keys[index] >= *key {
                        matched.push(self.values[index]);
                    } else {
                        break;
                    }
                }
                matched.reverse();
            }
        }
        matched
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn handle(index: usize) -> Handle {
        Handle::from_index(index)
    }

    fn leaf_with(keys: &[i64]) -> LeafNode<i64> {
        let mut iter = keys.iter().enumerate();
        let (_, &first) = iter.next().expect("test leaf needs at least one key");
        let mut leaf = LeafNode::singleton(first, handle(0));
        for (value, &key) in iter {
            leaf.insert(key, handle(value));
        }
        leaf
    }

    #[test]
    fn leaf_insert_places_duplicates_leftmost() {
        let mut leaf = LeafNode::singleton(10i64, handle(0));
        leaf.insert(5, handle(1));
        leaf.insert(10, handle(2));
        leaf.insert(10, handle(3));
        leaf.insert(15, handle(4));

        assert_eq!(leaf.keys(), &[5, 10, 10, 10, 15]);
        // Most recent duplicate first among the equal keys.
        assert_eq!(leaf.values(), &[handle(1), handle(3), handle(2), handle(0), handle(4)]);
    }

    #[test]
    fn leaf_split_keeps_median_in_left_half() {
        let leaf = leaf_with(&[5, 10, 15, 20, 25]);
        let (separator, left, right) = leaf.split();

        assert_eq!(separator, 15);
        assert_eq!(left.keys(), &[5, 10, 15]);
        assert_eq!(right.keys(), &[20, 25]);
    }

    #[test]
    fn leaf_split_preserves_duplicate_order() {
        let mut leaf = LeafNode::singleton(10i64, handle(0));
        leaf.insert(10, handle(1));
        leaf.insert(10, handle(2));
        leaf.insert(10, handle(3));

        let (separator, left, right) = leaf.split();
        assert_eq!(separator, 10);
        // Slicing must not disturb the reverse-insertion order of equals.
        assert_eq!(left.values(), &[handle(3), handle(2), handle(1)]);
        assert_eq!(right.values(), &[handle(0)]);
    }

    #[test]
    fn leaf_split_carries_outer_links() {
        let mut leaf = leaf_with(&[1, 2, 3]);
        leaf.set_prev(Some(handle(7)));
        leaf.set_next(Some(handle(8)));

        let (_, left, right) = leaf.split();
        assert_eq!(left.prev(), Some(handle(7)));
        assert_eq!(left.next(), None);
        assert_eq!(right.prev(), None);
        assert_eq!(right.next(), Some(handle(8)));
    }

    #[test]
    fn internal_split_promotes_median_to_neither_half() {
        let mut node = InternalNode::from_split(10i64, handle(0), handle(1));
        node.splice(1, 20, handle(2), handle(3));
        node.splice(2, 30, handle(4), handle(5));
        assert_eq!(node.keys(), &[10, 20, 30]);
        assert_eq!(node.children().len(), 4);

        let (separator, left, right) = node.split();
        assert_eq!(separator, 20);
        assert_eq!(left.keys(), &[10]);
        assert_eq!(right.keys(), &[30]);
        assert_eq!(left.children().len(), 2);
        assert_eq!(right.children().len(), 2);
    }

    #[test]
    fn internal_split_gives_right_half_the_extra_child() {
        let mut node = InternalNode::from_split(10i64, handle(0), handle(1));
        node.splice(1, 20, handle(2), handle(3));
        node.splice(2, 30, handle(4), handle(5));
        node.splice(3, 40, handle(6), handle(7));
        assert_eq!(node.keys(), &[10, 20, 30, 40]);
        assert_eq!(node.children().len(), 5);

        let (separator, left, right) = node.split();
        assert_eq!(separator, 30);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!(right.keys(), &[40]);
        // Odd child count: the right half receives the extra child.
        assert_eq!(left.children().len(), 2);
        assert_eq!(right.children().len(), 3);
    }

    #[test]
    fn route_counts_strictly_less_keys() {
        let mut node = InternalNode::from_split(10i64, handle(0), handle(1));
        node.splice(1, 20, handle(2), handle(3));

        assert_eq!(node.route(&5), 0);
        // Equal separators are not counted; descent goes left of them.
        assert_eq!(node.route(&10), 0);
        assert_eq!(node.route(&15), 1);
        assert_eq!(node.route(&20), 1);
        assert_eq!(node.route(&25), 2);
    }

    #[test]
    fn matches_filters_per_comparator() {
        let leaf = leaf_with(&[5, 10, 10, 20]);

        let equal = leaf.matches(&10, Comparator::Equal);
        assert_eq!(equal.len(), 2);

        let below = leaf.matches(&10, Comparator::LessOrEqual);
        assert_eq!(below.len(), 3);

        let above = leaf.matches(&10, Comparator::GreaterOrEqual);
        assert_eq!(above.len(), 3);

        assert!(leaf.matches(&4, Comparator::LessOrEqual).is_empty());
        assert!(leaf.matches(&21, Comparator::GreaterOrEqual).is_empty());
        assert!(leaf.matches(&7, Comparator::Equal).is_empty());
    }

    #[test]
    fn matches_preserves_key_order() {
        let leaf = leaf_with(&[5, 10, 15, 20]);
        // Values parallel the keys, so handles come back in ascending key
        // order despite the high-end scan.
        let above = leaf.matches(&10, Comparator::GreaterOrEqual);
        assert_eq!(&above[..], &[handle(1), handle(2), handle(3)]);
    }
}
