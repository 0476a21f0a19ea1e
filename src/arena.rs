use slab::Slab;

use crate::order::Order;

/// A stable reference to an order record in the [`Arena`].
///
/// Handles stay valid until their slot is freed, so the identity index and
/// the side-book FIFOs can both refer to the same record without aliasing
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

/// A fixed-capacity pool owning the storage of every live order.
///
/// The backing slab keeps its own free list, so allocation and
/// deallocation are O(1); the arena's only job on top of it is to refuse
/// growth past the capacity fixed at construction, which bounds worst-case
/// allocation latency. Dropping the arena drops every live record with it.
#[derive(Debug)]
pub struct Arena {
    slots: Slab<Order>,
    capacity: usize,
}

impl Arena {
    /// Creates an arena with room for `capacity` order records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            capacity,
        }
    }

    /// Moves `order` into a free slot and returns its handle.
    ///
    /// Returns `None` when the pool is full.
    pub fn allocate(&mut self, order: Order) -> Option<Handle> {
        if self.slots.len() == self.capacity {
            return None;
        }
        Some(Handle(self.slots.insert(order)))
    }

    /// Returns the slot behind `handle` to the free set and hands back the
    /// record it held.
    ///
    /// Panics if the handle is not currently allocated. The book never
    /// frees a handle twice: a handle leaves the side books and the
    /// identity index in the same operation that frees it.
    pub fn deallocate(&mut self, handle: Handle) -> Order {
        self.slots.remove(handle.0)
    }

    pub fn get(&self, handle: Handle) -> &Order {
        &self.slots[handle.0]
    }

    pub fn get_mut(&mut self, handle: Handle) -> &mut Order {
        &mut self.slots[handle.0]
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Number of handles in the free set.
    pub fn free_slots(&self) -> usize {
        self.capacity - self.slots.len()
    }
}
