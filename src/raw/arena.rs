use alloc::vec::Vec;
use core::mem;

use super::handle::Handle;

#[derive(Clone)]
enum Slot<T> {
    Live(T),
    /// Next link of the vacant chain.
    Vacant(Option<Handle>),
}

/// Node storage addressed by [`Handle`].
///
/// Slots released by a merge or a root collapse are threaded into a chain
/// through the slots themselves; the next split takes the most recently
/// released slot before the slot vector grows.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    vacant: Option<Handle>,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: None,
            live: 0,
        }
    }

    pub(crate) fn with_capacity(slots: usize) -> Self {
        Self {
            slots: Vec::with_capacity(slots),
            vacant: None,
            live: 0,
        }
    }

    /// Number of slots available before the slot vector reallocates.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live nodes.
    pub(crate) const fn len(&self) -> usize {
        self.live
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub(crate) fn alloc(&mut self, node: T) -> Handle {
        let handle = match self.vacant {
            Some(handle) => {
                let slot = mem::replace(&mut self.slots[handle.to_index()], Slot::Live(node));
                self.vacant = match slot {
                    Slot::Vacant(next) => next,
                    Slot::Live(_) => panic!("`Arena::alloc()` - vacant chain reached live slot {handle}!"),
                };
                handle
            }
            None => {
                let handle = Handle::from_index(self.slots.len());
                self.slots.push(Slot::Live(node));
                handle
            }
        };
        self.live += 1;
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.to_index()] {
            Slot::Live(node) => node,
            Slot::Vacant(_) => panic!("`Arena::get()` - slot {handle} is vacant!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.to_index()] {
            Slot::Live(node) => node,
            Slot::Vacant(_) => panic!("`Arena::get_mut()` - slot {handle} is vacant!"),
        }
    }

    /// Moves the node out and pushes its slot onto the vacant chain.
    pub(crate) fn release(&mut self, handle: Handle) -> T {
        let slot = mem::replace(&mut self.slots[handle.to_index()], Slot::Vacant(self.vacant));
        let Slot::Live(node) = slot else {
            panic!("`Arena::release()` - slot {handle} released twice!");
        };
        self.vacant = Some(handle);
        self.live -= 1;
        node
    }

    /// Drops every node and forgets the vacant chain, keeping the allocation.
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.vacant = None;
        self.live = 0;
    }
}
