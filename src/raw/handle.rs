use core::fmt;
use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Slot index of a node in the arena, stored plus one so that a missing child
/// (`Option<Handle>`) needs no extra tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Largest slot index a handle can address.
    pub(crate) const MAX: usize = RawHandle::MAX as usize - 1;

    pub(crate) fn from_index(index: usize) -> Self {
        index
            .checked_add(1)
            .and_then(|raw| RawHandle::try_from(raw).ok())
            .and_then(NonZero::new)
            .map(Self)
            .unwrap_or_else(|| panic!("`Handle::from_index()` - slot {index} is past the arena limit of {} nodes!", Self::MAX + 1))
    }

    #[inline]
    pub(crate) fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_index())
    }
}
