use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::MinDegree;

// Nodes of trees with `t <= 4` never spill to the heap.
const INLINE_KEYS: usize = 7;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
type Children = SmallVec<[Handle; INLINE_CHILDREN]>;

#[derive(Clone)]
pub(crate) enum Node<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

// Invariant: `children.len() == keys.len() + 1`, except transiently inside a
// rebalancing step.
#[derive(Clone)]
pub(crate) struct InternalNode<K> {
    keys: Keys<K>,
    children: Children,
}

#[derive(Clone)]
pub(crate) struct LeafNode<K> {
    keys: Keys<K>,
}

/// Result of searching for a key in a single node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key is stored at the given index of this node.
    Found(usize),
    /// Key is not in this node; the index is the child whose range contains it
    /// (or the insertion point in a leaf).
    NotFound(usize),
}

/// A key lent across a sibling boundary, along with the child that travels with
/// it when the nodes are internal.
pub(crate) type Lent<K> = (K, Option<Handle>);

impl<K> Node<K> {
    /// Creates an empty leaf. Storage grows with the keys, so large degrees cost
    /// nothing up front.
    pub(crate) fn new_leaf() -> Self {
        Node::Leaf(LeafNode { keys: Keys::new() })
    }

    /// Creates an internal node with no keys and a single child. Used when a full
    /// root is pushed down one level.
    pub(crate) fn new_internal(first_child: Handle) -> Self {
        let mut children = Children::new();
        children.push(first_child);
        Node::Internal(InternalNode { keys: Keys::new(), children })
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the keys stored in this node.
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => &internal.keys,
            Node::Leaf(leaf) => &leaf.keys,
        }
    }

    fn keys_mut(&mut self) -> &mut Keys<K> {
        match self {
            Node::Internal(internal) => &mut internal.keys,
            Node::Leaf(leaf) => &mut leaf.keys,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    /// Child handles; empty for a leaf.
    pub(crate) fn children(&self) -> &[Handle] {
        match self {
            Node::Internal(internal) => &internal.children,
            Node::Leaf(_) => &[],
        }
    }

    /// Binary search for the first key `>= key`.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys().binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Replaces the key at `index`, returning the old one.
    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        mem::replace(&mut self.keys_mut()[index], key)
    }

    /// Splits a full node around its median (index `t-1`).
    ///
    /// Returns the median and the new right sibling holding the upper `t-1` keys
    /// (and upper `t` children); `self` keeps the lower `t-1` keys.
    pub(crate) fn split(&mut self, degree: MinDegree) -> (K, Node<K>) {
        let t = degree.get();
        assert_eq!(self.key_count(), degree.max_keys(), "`Node::split()` - node is not full!");

        let right = match self {
            Node::Leaf(leaf) => Node::Leaf(LeafNode {
                keys: leaf.keys.drain(t..).collect(),
            }),
            Node::Internal(internal) => Node::Internal(InternalNode {
                keys: internal.keys.drain(t..).collect(),
                children: internal.children.drain(t..).collect(),
            }),
        };

        let median = self.keys_mut().pop().expect("`Node::split()` - missing median!");
        (median, right)
    }

    /// Folds `separator` and the right sibling into `self`.
    pub(crate) fn merge_with_right(&mut self, separator: K, right: Node<K>, degree: MinDegree) {
        assert!(
            self.key_count() + 1 + right.key_count() <= degree.max_keys(),
            "`Node::merge_with_right()` - merged node would exceed {} keys!",
            degree.max_keys()
        );

        match (self, right) {
            (Node::Leaf(left), Node::Leaf(right)) => {
                left.keys.push(separator);
                left.keys.extend(right.keys);
            }
            (Node::Internal(left), Node::Internal(right)) => {
                left.keys.push(separator);
                left.keys.extend(right.keys);
                left.children.extend(right.children);
            }
            _ => panic!("`Node::merge_with_right()` - siblings at different depths!"),
        }
    }

    /// Removes the last key (and last child, if internal).
    pub(crate) fn pop_last(&mut self) -> Lent<K> {
        match self {
            Node::Leaf(leaf) => (leaf.keys.pop().expect("`Node::pop_last()` - empty node!"), None),
            Node::Internal(internal) => {
                let key = internal.keys.pop().expect("`Node::pop_last()` - empty node!");
                (key, internal.children.pop())
            }
        }
    }

    /// Removes the first key (and first child, if internal).
    pub(crate) fn pop_first(&mut self) -> Lent<K> {
        assert!(self.key_count() > 0, "`Node::pop_first()` - empty node!");
        match self {
            Node::Leaf(leaf) => (leaf.keys.remove(0), None),
            Node::Internal(internal) => {
                let key = internal.keys.remove(0);
                (key, Some(internal.children.remove(0)))
            }
        }
    }

    /// Prepends a key (and child, if internal).
    pub(crate) fn push_first(&mut self, (key, child): Lent<K>) {
        match (self, child) {
            (Node::Leaf(leaf), None) => leaf.keys.insert(0, key),
            (Node::Internal(internal), Some(child)) => {
                internal.keys.insert(0, key);
                internal.children.insert(0, child);
            }
            _ => panic!("`Node::push_first()` - child does not match node kind!"),
        }
    }

    /// Appends a key (and child, if internal).
    pub(crate) fn push_last(&mut self, (key, child): Lent<K>) {
        match (self, child) {
            (Node::Leaf(leaf), None) => leaf.keys.push(key),
            (Node::Internal(internal), Some(child)) => {
                internal.keys.push(key);
                internal.children.push(child);
            }
            _ => panic!("`Node::push_last()` - child does not match node kind!"),
        }
    }
}

impl<K> InternalNode<K> {
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn first_child(&self) -> Handle {
        self.children[0]
    }

    pub(crate) fn last_child(&self) -> Handle {
        self.children[self.children.len() - 1]
    }

    /// Inserts a separator at `index` with `right` as the child after it.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, right: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, right);
    }

    /// Removes the separator at `index` and the child after it.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }
}

impl<K> LeafNode<K> {
    pub(crate) fn insert(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    pub(crate) fn remove(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn degree(t: usize) -> MinDegree {
        MinDegree::new(t).unwrap()
    }

    fn leaf(keys: &[i32]) -> Node<i32> {
        let mut node = Node::new_leaf();
        for (i, &k) in keys.iter().enumerate() {
            node.as_leaf_mut().insert(i, k);
        }
        node
    }

    fn internal(keys: &[i32], first: usize) -> Node<i32> {
        let mut node = Node::new_internal(Handle::from_index(first));
        for (i, &k) in keys.iter().enumerate() {
            node.as_internal_mut().insert_child(i, k, Handle::from_index(first + i + 1));
        }
        node
    }

    fn child_indices(node: &Node<i32>) -> Vec<usize> {
        node.children().iter().map(|h| h.to_index()).collect()
    }

    #[test]
    fn search_reports_position() {
        let node = leaf(&[10, 20, 30]);
        assert_eq!(node.search(&5), SearchResult::NotFound(0));
        assert_eq!(node.search(&20), SearchResult::Found(1));
        assert_eq!(node.search(&25), SearchResult::NotFound(2));
        assert_eq!(node.search(&31), SearchResult::NotFound(3));
    }

    #[test]
    fn split_full_leaf_moves_median_up() {
        let mut left = leaf(&[1, 2, 3, 4, 5]);
        let (median, right) = left.split(degree(3));
        assert_eq!(median, 3);
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[4, 5]);
        assert!(right.is_leaf());
    }

    #[test]
    fn split_full_internal_divides_children() {
        let mut left = internal(&[10, 20, 30, 40, 50], 0);
        let (median, right) = left.split(degree(3));
        assert_eq!(median, 30);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!(child_indices(&left), [0, 1, 2]);
        assert_eq!(right.keys(), &[40, 50]);
        assert_eq!(child_indices(&right), [3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "`Node::split()` - node is not full!")]
    fn split_requires_full_node() {
        let mut node = leaf(&[1, 2]);
        let _ = node.split(degree(3));
    }

    #[test]
    fn merge_internal_joins_around_separator() {
        let mut left = internal(&[10, 20], 0);
        let right = internal(&[40, 50], 3);
        left.merge_with_right(30, right, degree(3));
        assert_eq!(left.keys(), &[10, 20, 30, 40, 50]);
        assert_eq!(child_indices(&left), [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "merged node would exceed 5 keys")]
    fn merge_rejects_overflow() {
        let mut left = leaf(&[1, 2, 3]);
        left.merge_with_right(4, leaf(&[5, 6]), degree(3));
    }

    #[test]
    #[should_panic(expected = "siblings at different depths")]
    fn merge_rejects_mixed_kinds() {
        let mut left = leaf(&[1]);
        left.merge_with_right(4, internal(&[5], 0), degree(3));
    }

    #[test]
    fn lending_moves_key_and_child_together() {
        let mut left = internal(&[10, 20], 0);
        let mut right = internal(&[40], 7);

        let lent = left.pop_last();
        assert_eq!(lent, (20, Some(Handle::from_index(2))));
        right.push_first(lent);
        assert_eq!(right.keys(), &[20, 40]);
        assert_eq!(child_indices(&right), [2, 7, 8]);

        let lent = right.pop_first();
        assert_eq!(lent, (20, Some(Handle::from_index(2))));
        left.push_last(lent);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!(child_indices(&left), [0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "child does not match node kind")]
    fn leaf_rejects_lent_child() {
        let mut node = leaf(&[1]);
        node.push_last((2, Some(Handle::from_index(0))));
    }

    #[test]
    fn replace_key_returns_old_separator() {
        let mut node = internal(&[10, 20], 0);
        assert_eq!(node.replace_key(1, 25), 20);
        assert_eq!(node.keys(), &[10, 25]);
    }
}
