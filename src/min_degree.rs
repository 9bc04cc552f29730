use core::fmt;

use tracing::debug;

use crate::{Error, Result};

/// The minimum degree `t` of a [`BTree`](crate::BTree).
///
/// Every node other than the root holds between `t - 1` and `2t - 1` keys, and an
/// internal node with `n` keys has `n + 1` children. `t` must lie in
/// `MinDegree::MIN..=MinDegree::MAX`, so that `2t` fits in a `usize`.
///
/// # Examples
///
/// ```
/// use degree_btree::{Error, MinDegree};
///
/// let t = MinDegree::new(3)?;
/// assert_eq!(t.max_keys(), 5);
/// assert_eq!(t.min_keys(), 2);
/// assert_eq!(t.max_children(), 6);
///
/// assert_eq!(MinDegree::new(1), Err(Error::InvalidConfiguration { min_degree: 1 }));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MinDegree(usize);

impl MinDegree {
    /// The smallest valid minimum degree (a 2-3-4 tree).
    pub const MIN: Self = Self(2);

    /// The largest minimum degree whose child count `2t` is representable.
    pub const MAX: Self = Self(usize::MAX / 2);

    /// Validates `t` as a minimum degree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `t < 2` or `t > MinDegree::MAX`.
    pub fn new(t: usize) -> Result<Self> {
        if t < Self::MIN.0 || t.checked_mul(2).is_none() {
            debug!(min_degree = t, "btree.config.invalid_min_degree");
            return Err(Error::InvalidConfiguration { min_degree: t });
        }
        Ok(Self(t))
    }

    /// Returns `t`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Maximum number of keys in any node, `2t - 1`.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        2 * self.0 - 1
    }

    /// Minimum number of keys in a non-root node, `t - 1`.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.0 - 1
    }

    /// Maximum number of children of an internal node, `2t`.
    #[must_use]
    pub const fn max_children(self) -> usize {
        2 * self.0
    }
}

impl TryFrom<usize> for MinDegree {
    type Error = Error;

    fn try_from(t: usize) -> Result<Self> {
        Self::new(t)
    }
}

impl From<MinDegree> for usize {
    fn from(degree: MinDegree) -> Self {
        degree.0
    }
}

impl fmt::Display for MinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
