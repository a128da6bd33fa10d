use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::comparator::Comparator;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node};

/// The core B+Tree implementation backing `RangeTree`.
pub(crate) struct RawRangeTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values (separate from nodes for cache efficiency).
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Branching factor: the maximum number of children per internal node.
    /// A node holding more than `order - 1` keys is in overflow.
    order: usize,
    /// Total number of key-value pairs in the tree.
    len: usize,
    /// Handle to the first (leftmost) leaf, the head of the leaf chain.
    first_leaf: Option<Handle>,
    /// Handle to the last (rightmost) leaf, the tail of the leaf chain.
    last_leaf: Option<Handle>,
}

/// Path element for tracking traversal during insertion.
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Type alias for a path through the tree (stack of path elements).
type Path = SmallVec<[PathElement; 16]>;

impl<K, V> RawRangeTree<K, V> {
    /// Creates a new, empty tree. The order must already be validated.
    pub(crate) const fn new(order: usize) -> Self {
        debug_assert!(order > 2);
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            order,
            len: 0,
            first_leaf: None,
            last_leaf: None,
        }
    }

    /// Returns the branching factor.
    pub(crate) const fn order(&self) -> usize {
        self.order
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns the handle of the root node, if the tree is non-empty.
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns the head of the leaf chain, if the tree is non-empty.
    pub(crate) fn first_leaf(&self) -> Option<Handle> {
        self.first_leaf
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Returns a reference to a leaf node by handle.
    pub(crate) fn leaf(&self, handle: Handle) -> &LeafNode<K> {
        self.nodes.get(handle).as_leaf()
    }

    /// Returns a reference to a value by handle.
    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(handle)
    }

    const fn max_keys(&self) -> usize {
        self.order - 1
    }
}

impl<K: Ord + Clone, V> RawRangeTree<K, V> {
    /// Descends from the root to the leaf that would hold `key`, recording
    /// every internal node visited and the child index taken.
    ///
    /// The caller must ensure the tree is non-empty. This single computation
    /// underlies both insertion placement and range-search boundary location.
    fn descend_to_leaf(&self, key: &K) -> (Handle, Path) {
        let mut path = Path::new();
        let mut current = self.root.unwrap();

        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => {
                    let child_index = internal.route(key);
                    path.push(PathElement { node: current, child_index });
                    current = internal.child(child_index);
                }
                Node::Leaf(_) => return (current, path),
            }
        }
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// Duplicate keys are allowed and accumulate as separate entries; nothing
    /// is ever overwritten.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let value_handle = self.values.alloc(value);

        // First insertion: the new leaf is the whole tree.
        if self.root.is_none() {
            let leaf = self.nodes.alloc(Node::Leaf(LeafNode::singleton(key, value_handle)));
            self.root = Some(leaf);
            self.first_leaf = Some(leaf);
            self.last_leaf = Some(leaf);
            self.len = 1;
            return;
        }

        let (leaf_handle, mut path) = self.descend_to_leaf(&key);
        self.nodes.get_mut(leaf_handle).as_leaf_mut().insert(key, value_handle);
        self.len += 1;

        // Bottom-up fix-up along the recorded path. Each split is spliced
        // into its parent before the walk continues upward, so a single pass
        // restores every node; only the splice target can overflow next.
        let mut current = leaf_handle;
        while self.nodes.get(current).key_count() > self.max_keys() {
            let (separator, left, right) = self.split(current);
            match path.pop() {
                Some(parent) => {
                    self.nodes
                        .get_mut(parent.node)
                        .as_internal_mut()
                        .splice(parent.child_index, separator, left, right);
                    current = parent.node;
                }
                None => {
                    // The split consumed the old root; the promoted key forms
                    // the new one. It holds a single key and cannot overflow,
                    // so this is the only way the tree grows in height.
                    let root = InternalNode::from_split(separator, left, right);
                    self.root = Some(self.nodes.alloc(Node::Internal(root)));
                    break;
                }
            }
        }
    }

    /// Splits the overflowed node at `handle` into two fresh halves,
    /// releasing the old node's slot. Returns the promoted key and the
    /// handles of the halves.
    ///
    /// For a leaf, the chain is repaired here as part of the split: the two
    /// halves take the old leaf's place between its former neighbors, and the
    /// head/tail trackers follow.
    fn split(&mut self, handle: Handle) -> (K, Handle, Handle) {
        match self.nodes.take(handle) {
            Node::Internal(internal) => {
                let (separator, left, right) = internal.split();
                let left = self.nodes.alloc(Node::Internal(left));
                let right = self.nodes.alloc(Node::Internal(right));
                (separator, left, right)
            }
            Node::Leaf(leaf) => {
                let outer_prev = leaf.prev();
                let outer_next = leaf.next();
                let (separator, left, right) = leaf.split();
                let left = self.nodes.alloc(Node::Leaf(left));
                let right = self.nodes.alloc(Node::Leaf(right));

                self.nodes.get_mut(left).as_leaf_mut().set_next(Some(right));
                self.nodes.get_mut(right).as_leaf_mut().set_prev(Some(left));
                match outer_prev {
                    Some(prev) => self.nodes.get_mut(prev).as_leaf_mut().set_next(Some(left)),
                    None => self.first_leaf = Some(left),
                }
                match outer_next {
                    Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(right)),
                    None => self.last_leaf = Some(right),
                }

                (separator, left, right)
            }
        }
    }

    /// Returns every value whose key satisfies `key` under `comparator`, in
    /// ascending key order (most recent duplicate first among equal keys).
    ///
    /// Locates one boundary leaf by descent, then walks the leaf chain
    /// instead of re-descending.
    pub(crate) fn range_search(&self, key: &K, comparator: Comparator) -> Vec<&V> {
        if self.root.is_none() {
            return Vec::new();
        }

        let (leaf_handle, _) = self.descend_to_leaf(key);
        let matched = match comparator {
            Comparator::Equal => self.collect_equal(leaf_handle, key),
            Comparator::LessOrEqual => self.collect_below(leaf_handle, key),
            Comparator::GreaterOrEqual => self.collect_above(leaf_handle, key),
        };
        matched.into_iter().map(|handle| self.values.get(handle)).collect()
    }

    /// Chain walk for `"=="`: back up to the leftmost leaf that can hold the
    /// key, then collect local matches forward while each leaf still opens
    /// with it.
    fn collect_equal(&self, descended: Handle, key: &K) -> Vec<Handle> {
        // A leaf whose first key equals the target may be preceded by more
        // matches. An absent predecessor ends the walk: the smallest key in
        // the whole tree can equal the target.
        let mut start = descended;
        while self.leaf(start).first_key() == key {
            match self.leaf(start).prev() {
                Some(prev) => start = prev,
                None => break,
            }
        }

        let mut matched: Vec<Handle> = self.leaf(start).matches(key, Comparator::Equal).into_vec();
        let mut cursor = self.leaf(start).next();
        while let Some(handle) = cursor {
            let leaf = self.leaf(handle);
            if leaf.first_key() != key {
                break;
            }
            matched.extend_from_slice(&leaf.matches(key, Comparator::Equal));
            cursor = leaf.next();
        }
        matched
    }

    /// Chain walk for `"<="`: advance to the boundary leaf (the first whose
    /// last key exceeds the target, or the chain tail), then take every leaf
    /// before it whole plus the boundary's local matches.
    fn collect_below(&self, descended: Handle, key: &K) -> Vec<Handle> {
        let mut boundary = descended;
        while *self.leaf(boundary).last_key() <= *key {
            match self.leaf(boundary).next() {
                Some(next) => boundary = next,
                None => break,
            }
        }

        // Sortedness proves every leaf before the boundary fully satisfying.
        let mut before: Vec<Handle> = Vec::new();
        let mut cursor = self.leaf(boundary).prev();
        while let Some(handle) = cursor {
            before.push(handle);
            cursor = self.leaf(handle).prev();
        }

        let mut matched: Vec<Handle> = Vec::new();
        for &handle in before.iter().rev() {
            matched.extend_from_slice(self.leaf(handle).values());
        }
        matched.extend_from_slice(&self.leaf(boundary).matches(key, Comparator::LessOrEqual));
        matched
    }

    /// Chain walk for `">="`: the mirror of `collect_below`, backing up to
    /// the boundary leaf and then taking every later leaf whole.
    fn collect_above(&self, descended: Handle, key: &K) -> Vec<Handle> {
        let mut boundary = descended;
        while *self.leaf(boundary).first_key() >= *key {
            match self.leaf(boundary).prev() {
                Some(prev) => boundary = prev,
                None => break,
            }
        }

        let mut matched: Vec<Handle> = self.leaf(boundary).matches(key, Comparator::GreaterOrEqual).into_vec();
        let mut cursor = self.leaf(boundary).next();
        while let Some(handle) = cursor {
            matched.extend_from_slice(self.leaf(handle).values());
            cursor = self.leaf(handle).next();
        }
        matched
    }
}
