use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::raw::{Handle, Node, RawBTree};

/// A lazy iterator over the keys of a [`BTree`](crate::BTree) in ascending order.
///
/// This `struct` is created by the [`traverse`] method on [`BTree`](crate::BTree).
/// Calling [`traverse`] again starts a fresh walk from the root.
///
/// # Examples
///
/// ```
/// use degree_btree::BTree;
///
/// let mut tree: BTree<i32> = BTree::new(2)?;
/// tree.extend([3, 1, 2]);
///
/// let mut keys = tree.traverse();
/// assert_eq!(keys.len(), 3);
/// assert_eq!(keys.next(), Some(&1));
/// assert_eq!(keys.next(), Some(&2));
/// assert_eq!(keys.next(), Some(&3));
/// assert_eq!(keys.next(), None);
/// # Ok::<(), degree_btree::Error>(())
/// ```
///
/// [`traverse`]: crate::BTree::traverse
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Traverse<'a, K> {
    tree: &'a RawBTree<K>,
    // One frame per level of the current root-to-node path. For an internal node
    // the index is the child being visited, and the key emitted once it is done.
    stack: SmallVec<[(Handle, usize); 16]>,
    remaining: usize,
}

impl<'a, K> Traverse<'a, K> {
    pub(crate) fn new(tree: &'a RawBTree<K>) -> Self {
        let mut traverse = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        if let Some(root) = tree.root() {
            traverse.descend_leftmost(root);
        }
        traverse
    }

    fn descend_leftmost(&mut self, mut handle: Handle) {
        loop {
            self.stack.push((handle, 0));
            match self.tree.node(handle) {
                Node::Internal(internal) => handle = internal.first_child(),
                Node::Leaf(_) => return,
            }
        }
    }
}

impl<'a, K> Iterator for Traverse<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        loop {
            let (handle, index) = self.stack.last_mut()?;
            let node = tree.node(*handle);
            let Some(key) = node.keys().get(*index) else {
                self.stack.pop();
                continue;
            };

            *index += 1;
            if let Node::Internal(internal) = node {
                let next_child = internal.child(*index);
                self.descend_leftmost(next_child);
            }
            self.remaining -= 1;
            return Some(key);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Traverse<'_, K> {}

impl<K> FusedIterator for Traverse<'_, K> {}

impl<K> Clone for Traverse<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Traverse<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
