use core::borrow::Borrow;
use core::fmt;

use tracing::debug;

use crate::raw::{Node, RawBTree};
use crate::{Error, MinDegree, Result};

mod traverse;

pub use traverse::Traverse;

/// An ordered set of keys stored in an in-memory B-tree of minimum degree `t`.
///
/// Every node other than the root holds between `t - 1` and `2t - 1` keys and all
/// leaves sit at the same depth, so search, insertion and removal touch
/// O(log<sub>t</sub> n) nodes. Insertion splits full nodes on the way down and
/// removal borrows from or merges with siblings on the way down; neither walks
/// back up the tree.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the [`Ord`] trait, changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use degree_btree::{BTree, Error};
///
/// let mut tree = BTree::new(3)?;
/// for key in [10, 20, 5, 6, 12, 30, 7, 17] {
///     tree.insert(key);
/// }
/// assert!(tree.traverse().copied().eq([5, 6, 7, 10, 12, 17, 20, 30]));
///
/// tree.remove(&6)?;
/// assert_eq!(tree.remove(&13), Err(Error::KeyNotFound));
/// assert!(tree.search(&6).is_none());
/// assert!(tree.search(&7).is_some());
/// # Ok::<(), Error>(())
/// ```
pub struct BTree<K> {
    raw: RawBTree<K>,
}

/// A read-only view of the node holding a key, returned by [`BTree::search`].
///
/// The view borrows the tree, so it cannot be held across an insertion or removal
/// that might split, merge or replace the node.
pub struct NodeRef<'a, K> {
    node: &'a Node<K>,
    index: usize,
}

impl<K> BTree<K> {
    /// Creates an empty tree with minimum degree `t`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `t` is outside `MinDegree::MIN..=MinDegree::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use degree_btree::{BTree, Error};
    ///
    /// let tree: BTree<i32> = BTree::new(2)?;
    /// assert!(tree.is_empty());
    ///
    /// assert!(matches!(BTree::<i32>::new(1), Err(Error::InvalidConfiguration { min_degree: 1 })));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn new(t: usize) -> Result<Self> {
        Ok(Self::with_min_degree(MinDegree::new(t)?))
    }

    /// Creates an empty tree with an already validated minimum degree.
    #[must_use]
    pub const fn with_min_degree(degree: MinDegree) -> Self {
        BTree {
            raw: RawBTree::new(degree),
        }
    }

    /// Creates an empty tree with node storage for at least `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `t` is outside `MinDegree::MIN..=MinDegree::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use degree_btree::BTree;
    ///
    /// let tree: BTree<u64> = BTree::with_capacity(4, 1_000)?;
    /// assert!(tree.capacity() >= 1_000);
    /// # Ok::<(), degree_btree::Error>(())
    /// ```
    pub fn with_capacity(t: usize, capacity: usize) -> Result<Self> {
        Ok(BTree {
            raw: RawBTree::with_capacity(MinDegree::new(t)?, capacity),
        })
    }

    /// Returns how many keys fit in the allocated node storage before it has to grow,
    /// assuming every node is at its minimum fill.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the minimum degree the tree was built with.
    #[must_use]
    pub const fn min_degree(&self) -> MinDegree {
        self.raw.degree()
    }

    /// Returns the number of keys in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of levels in the tree; 0 when empty, 1 for a lone root leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use degree_btree::BTree;
    ///
    /// let mut tree: BTree<i32> = BTree::new(2)?;
    /// assert_eq!(tree.height(), 0);
    /// tree.extend([1, 2, 3]);
    /// assert_eq!(tree.height(), 1);
    /// tree.insert(4);
    /// assert_eq!(tree.height(), 2);
    /// # Ok::<(), degree_btree::Error>(())
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the smallest key, if any.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the largest key, if any.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Removes every key, keeping the minimum degree.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a lazy iterator over all keys in ascending order.
    ///
    /// Each call walks afresh from the root.
    pub fn traverse(&self) -> Traverse<'_, K> {
        Traverse::new(&self.raw)
    }
}

impl<K: Clone + Ord> BTree<K> {
    /// Looks up `key` and returns a view of the node that holds it.
    ///
    /// A miss is a normal outcome and yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use degree_btree::BTree;
    ///
    /// let mut tree: BTree<i32> = BTree::new(2)?;
    /// tree.extend(1..=7);
    ///
    /// let found = tree.search(&4).unwrap();
    /// assert_eq!(found.key(), &4);
    /// assert_eq!(found.keys(), &[2, 4]);
    /// assert!(!found.is_leaf());
    ///
    /// assert!(tree.search(&8).is_none());
    /// # Ok::<(), degree_btree::Error>(())
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<'_, K>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|(handle, index)| NodeRef {
            node: self.raw.node(handle),
            index,
        })
    }

    /// Returns `true` if the tree holds `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts `key`, splitting full nodes on the way down.
    ///
    /// Returns whether the key was newly inserted. Keys are unique; inserting one
    /// that is already present leaves the key set unchanged and returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use degree_btree::BTree;
    ///
    /// let mut tree = BTree::new(2)?;
    /// assert!(tree.insert(37));
    /// assert!(!tree.insert(37));
    /// assert_eq!(tree.len(), 1);
    /// # Ok::<(), degree_btree::Error>(())
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.raw.insert(key)
    }

    /// Removes `key`, rebalancing on the way down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent; the tree is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use degree_btree::{BTree, Error};
    ///
    /// let mut tree: BTree<i32> = BTree::new(2)?;
    /// tree.extend([1, 2, 3]);
    ///
    /// assert_eq!(tree.remove(&2), Ok(()));
    /// assert_eq!(tree.remove(&2), Err(Error::KeyNotFound));
    /// assert!(tree.traverse().copied().eq([1, 3]));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.raw.remove(key) {
            Ok(())
        } else {
            debug!(len = self.raw.len(), "btree.remove.key_not_found");
            Err(Error::KeyNotFound)
        }
    }
}

impl<'a, K> NodeRef<'a, K> {
    /// The key that was searched for, as stored in the tree.
    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.node.keys()[self.index]
    }

    /// Position of the key within its node.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// All keys of the node, in ascending order.
    #[must_use]
    pub fn keys(&self) -> &'a [K] {
        self.node.keys()
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("keys", &self.keys())
            .field("index", &self.index)
            .field("is_leaf", &self.is_leaf())
            .finish()
    }
}

impl<K: Clone> Clone for BTree<K> {
    fn clone(&self) -> Self {
        BTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.traverse()).finish()
    }
}

/// Two trees are equal when they hold the same keys, whatever their degree or shape.
impl<K: PartialEq> PartialEq for BTree<K> {
    fn eq(&self, other: &BTree<K>) -> bool {
        self.len() == other.len() && self.traverse().eq(other.traverse())
    }
}

impl<K: Eq> Eq for BTree<K> {}

impl<K: Clone + Ord> Extend<K> for BTree<K> {
    #[inline]
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Clone + Ord + Copy + 'a> Extend<&'a K> for BTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Traverse<'a, K>;

    fn into_iter(self) -> Traverse<'a, K> {
        self.traverse()
    }
}
