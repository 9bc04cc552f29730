use core::borrow::Borrow;
use core::cmp::Ordering;

use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use crate::MinDegree;

/// The core B-tree backing `BTree`.
///
/// Insertion splits full nodes on the way down and deletion fills thin nodes on
/// the way down, so neither ever has to walk back up. Nodes carry no parent
/// links; the only edges are parent-to-child handles.
#[derive(Clone)]
pub(crate) struct RawBTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of keys in the tree.
    len: usize,
    degree: MinDegree,
}

impl<K> RawBTree<K> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(degree: MinDegree) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            degree,
        }
    }

    /// Creates an empty tree with node slots for at least `capacity` keys.
    pub(crate) fn with_capacity(degree: MinDegree, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity.div_ceil(degree.min_keys())),
            root: None,
            len: 0,
            degree,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn degree(&self) -> MinDegree {
        self.degree
    }

    /// Number of keys the allocated node slots can hold when every node is at minimum fill.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity().saturating_mul(self.degree.min_keys())
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.reset();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Number of levels; 0 for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            current = self.nodes.get(handle).children().first().copied();
        }
        height
    }

    /// Leftmost key of the subtree rooted at `handle`.
    fn first_key_under(&self, mut handle: Handle) -> &K {
        loop {
            match self.nodes.get(handle) {
                Node::Internal(internal) => handle = internal.first_child(),
                Node::Leaf(_) => break,
            }
        }
        self.nodes.get(handle).keys().first().expect("`RawBTree::first_key_under()` - empty leaf!")
    }

    /// Rightmost key of the subtree rooted at `handle`.
    fn last_key_under(&self, mut handle: Handle) -> &K {
        loop {
            match self.nodes.get(handle) {
                Node::Internal(internal) => handle = internal.last_child(),
                Node::Leaf(_) => break,
            }
        }
        self.nodes.get(handle).keys().last().expect("`RawBTree::last_key_under()` - empty leaf!")
    }

    pub(crate) fn first(&self) -> Option<&K> {
        self.root.map(|root| self.first_key_under(root))
    }

    pub(crate) fn last(&self) -> Option<&K> {
        self.root.map(|root| self.last_key_under(root))
    }
}

impl<K: Clone + Ord> RawBTree<K> {
    /// Searches for a key and returns the node holding it and its index there.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            match (node.search(key), node) {
                (SearchResult::Found(idx), _) => return Some((current, idx)),
                (SearchResult::NotFound(_), Node::Leaf(_)) => return None,
                (SearchResult::NotFound(idx), Node::Internal(internal)) => current = internal.child(idx),
            }
        }
    }

    /// Inserts a key. Returns false without touching the structure if it is already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let Some(root) = self.root else {
            let mut leaf = Node::new_leaf();
            leaf.as_leaf_mut().insert(0, key);
            self.root = Some(self.nodes.alloc(leaf));
            self.len = 1;
            return true;
        };
        if self.search(&key).is_some() {
            return false;
        }

        let root = if self.nodes.get(root).key_count() == self.degree.max_keys() {
            self.grow_root(root)
        } else {
            root
        };

        self.insert_non_full(root, key);
        self.len += 1;
        true
    }

    /// Pushes a full root down under a new root and splits it. This is the only
    /// place the tree gains height.
    fn grow_root(&mut self, old_root: Handle) -> Handle {
        let new_root = self.nodes.alloc(Node::new_internal(old_root));
        self.split_child(new_root, 0);
        self.root = Some(new_root);
        debug!(old_root = %old_root, new_root = %new_root, height = self.height(), "btree.insert.root_split");
        new_root
    }

    /// Splits the full child at `index` of `parent`; the median lands at `parent.keys[index]`.
    fn split_child(&mut self, parent: Handle, index: usize) {
        let child = self.nodes.get(parent).as_internal().child(index);
        let (median, right) = self.nodes.get_mut(child).split(self.degree);
        let right = self.nodes.alloc(right);

        let parent_node = self.nodes.get_mut(parent).as_internal_mut();
        parent_node.insert_child(index, median, right);
        assert!(
            parent_node.key_count() <= self.degree.max_keys(),
            "`RawBTree::split_child()` - parent {parent} overflowed!"
        );
        trace!(parent = %parent, left = %child, right = %right, "btree.insert.split_child");
    }

    /// Descends from a non-full node, splitting any full child before entering it.
    /// The key must not be in the tree yet.
    fn insert_non_full(&mut self, mut current: Handle, key: K) {
        loop {
            let node = self.nodes.get(current);
            let idx = match node.search(&key) {
                SearchResult::Found(_) => unreachable!("`RawBTree::insert_non_full()` - key already present!"),
                SearchResult::NotFound(idx) => idx,
            };

            if node.is_leaf() {
                self.nodes.get_mut(current).as_leaf_mut().insert(idx, key);
                return;
            }

            let child = node.as_internal().child(idx);
            if self.nodes.get(child).key_count() < self.degree.max_keys() {
                current = child;
                continue;
            }

            self.split_child(current, idx);
            let parent = self.nodes.get(current);
            current = match key.cmp(&parent.keys()[idx]) {
                Ordering::Equal => unreachable!("`RawBTree::insert_non_full()` - key already present!"),
                Ordering::Less => child,
                Ordering::Greater => parent.as_internal().child(idx + 1),
            };
        }
    }

    /// Removes a key. Returns false without touching the structure if it is absent.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(root) = self.root else {
            return false;
        };
        if self.search(key).is_none() {
            return false;
        }

        let removed = self.remove_from(root, key);
        assert!(removed, "`RawBTree::remove()` - key vanished during descent!");
        self.len -= 1;
        self.collapse_root();
        true
    }

    /// Deletes `key` from the subtree rooted at `current`, which holds at least
    /// `t` keys unless it is the root.
    fn remove_from<Q>(&mut self, current: Handle, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(current);
        match node.search(key) {
            SearchResult::Found(idx) if node.is_leaf() => {
                self.nodes.get_mut(current).as_leaf_mut().remove(idx);
                true
            }
            SearchResult::Found(idx) => {
                self.remove_from_internal(current, idx, key);
                true
            }
            SearchResult::NotFound(_) if node.is_leaf() => false,
            SearchResult::NotFound(idx) => {
                let child = self.fill(current, idx);
                self.remove_from(child, key)
            }
        }
    }

    /// Deletes `keys[idx]` of the internal node `current`.
    fn remove_from_internal<Q>(&mut self, current: Handle, idx: usize, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let t = self.degree.get();
        let (left, right) = {
            let internal = self.nodes.get(current).as_internal();
            (internal.child(idx), internal.child(idx + 1))
        };

        if self.nodes.get(left).key_count() >= t {
            let predecessor = self.last_key_under(left).clone();
            trace!(node = %current, idx, "btree.remove.replace_with_predecessor");
            self.nodes.get_mut(current).replace_key(idx, predecessor.clone());
            self.remove_from::<K>(left, &predecessor);
        } else if self.nodes.get(right).key_count() >= t {
            let successor = self.first_key_under(right).clone();
            trace!(node = %current, idx, "btree.remove.replace_with_successor");
            self.nodes.get_mut(current).replace_key(idx, successor.clone());
            self.remove_from::<K>(right, &successor);
        } else {
            // The key becomes the median of the merged node.
            self.merge_children(current, idx);
            self.remove_from(left, key);
        }
    }

    /// Makes sure the child at `idx` of `parent` has at least `t` keys, borrowing
    /// from a sibling or merging with one. Returns the handle of the node that now
    /// covers the child's key range.
    fn fill(&mut self, parent: Handle, idx: usize) -> Handle {
        let t = self.degree.get();
        let (child, prev, next) = {
            let internal = self.nodes.get(parent).as_internal();
            let prev = idx.checked_sub(1).map(|i| internal.child(i));
            let next = (idx < internal.key_count()).then(|| internal.child(idx + 1));
            (internal.child(idx), prev, next)
        };

        if self.nodes.get(child).key_count() >= t {
            return child;
        }

        if let Some(prev) = prev
            && self.nodes.get(prev).key_count() >= t
        {
            self.borrow_from_prev(parent, idx, prev, child);
            child
        } else if let Some(next) = next
            && self.nodes.get(next).key_count() >= t
        {
            self.borrow_from_next(parent, idx, next, child);
            child
        } else if next.is_some() {
            self.merge_children(parent, idx);
            child
        } else {
            let prev = prev.expect("`RawBTree::fill()` - internal node with a single child!");
            self.merge_children(parent, idx - 1);
            prev
        }
    }

    /// Rotates the left sibling's last key up into the parent and the parent's
    /// separator down to the front of `child`.
    fn borrow_from_prev(&mut self, parent: Handle, idx: usize, prev: Handle, child: Handle) {
        let (key, moved_child) = self.nodes.get_mut(prev).pop_last();
        let separator = self.nodes.get_mut(parent).replace_key(idx - 1, key);
        self.nodes.get_mut(child).push_first((separator, moved_child));
        trace!(parent = %parent, idx, "btree.remove.borrow_from_prev");
    }

    /// Rotates the right sibling's first key up into the parent and the parent's
    /// separator down to the back of `child`.
    fn borrow_from_next(&mut self, parent: Handle, idx: usize, next: Handle, child: Handle) {
        let (key, moved_child) = self.nodes.get_mut(next).pop_first();
        let separator = self.nodes.get_mut(parent).replace_key(idx, key);
        self.nodes.get_mut(child).push_last((separator, moved_child));
        trace!(parent = %parent, idx, "btree.remove.borrow_from_next");
    }

    /// Folds `children[idx + 1]` and `keys[idx]` of `parent` into `children[idx]`
    /// and releases the right node's slot.
    fn merge_children(&mut self, parent: Handle, idx: usize) {
        let (separator, right) = self.nodes.get_mut(parent).as_internal_mut().remove_child(idx);
        let left = self.nodes.get(parent).as_internal().child(idx);
        let right_node = self.nodes.release(right);
        self.nodes.get_mut(left).merge_with_right(separator, right_node, self.degree);
        trace!(parent = %parent, idx, left = %left, released = %right, "btree.remove.merge");
    }

    /// Replaces a keyless root by its only child, or empties the tree if the root
    /// was a leaf. This is the only place the tree loses height.
    fn collapse_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let replacement = match self.nodes.get(root) {
            node if node.key_count() > 0 => return,
            Node::Internal(internal) => Some(internal.first_child()),
            Node::Leaf(_) => None,
        };

        self.nodes.release(root);
        self.root = replacement;
        if replacement.is_none() {
            debug_assert!(self.nodes.is_empty(), "`RawBTree::collapse_root()` - leaked nodes!");
            self.nodes.reset();
        }
        debug!(old_root = %root, height = self.height(), "btree.remove.root_collapse");
    }
}
