use std::collections::VecDeque;

use crate::arena::Handle;
use crate::order::Price;

/// A price-level in one side of the orderbook.
///
/// The level queues arena handles in arrival order: new orders are appended
/// at the tail and matching always consumes the head, so time priority
/// within the level falls out of the queue itself. Cancellation removes
/// from the middle by a linear walk, which is acceptable because levels are
/// shallow in practice.
///
/// A level never outlives its last order: the side book drops it the
/// moment its queue empties.
#[derive(Debug)]
pub(crate) struct Level {
    /// The price which this level applies to.
    price: Price,
    /// Handles of the resting orders, oldest at the front.
    fifo: VecDeque<Handle>,
}

impl Level {
    pub(crate) fn new(price: Price) -> Self {
        Self {
            price,
            fifo: VecDeque::new(),
        }
    }

    pub(crate) fn price(&self) -> Price {
        self.price
    }

    /// Appends a newly admitted order to the back of the queue.
    pub(crate) fn push_back(&mut self, handle: Handle) {
        self.fifo.push_back(handle);
    }

    /// The handle with time priority at this level.
    pub(crate) fn front(&self) -> Option<Handle> {
        self.fifo.front().copied()
    }

    pub(crate) fn pop_front(&mut self) -> Option<Handle> {
        self.fifo.pop_front()
    }

    /// Removes `handle` from the queue, preserving the order of the rest.
    ///
    /// Returns the removed handle, or `None` if it was not queued here.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<Handle> {
        let index = self.fifo.iter().position(|&queued| queued == handle)?;
        self.fifo.remove(index)
    }

    /// Iterates the queued handles from oldest to newest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.fifo.iter().copied()
    }

    /// Number of orders queued at this level.
    pub(crate) fn len(&self) -> usize {
        self.fifo.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Level;
    use crate::arena::Arena;
    use crate::order::{Id, Order, Price, Quantity, Side};

    fn arena_with_orders(count: u64) -> (Arena, Vec<crate::arena::Handle>) {
        let mut arena = Arena::with_capacity(16);
        let handles = (0..count)
            .map(|id| {
                crate::assert_some!(arena.allocate(Order::new(
                    Id::new(id),
                    Side::Ask,
                    Price::new(5.0),
                    Quantity::new(10),
                )))
            })
            .collect();
        (arena, handles)
    }

    #[test]
    fn orders_come_out_in_arrival_order() {
        let (_arena, handles) = arena_with_orders(3);
        let mut level = Level::new(Price::new(5.0));
        for &handle in &handles {
            level.push_back(handle);
        }

        assert_eq!(level.pop_front(), Some(handles[0]));
        assert_eq!(level.pop_front(), Some(handles[1]));
        assert_eq!(level.pop_front(), Some(handles[2]));
        assert!(level.is_empty());
    }

    #[test]
    fn removing_from_the_middle_preserves_order() {
        let (_arena, handles) = arena_with_orders(3);
        let mut level = Level::new(Price::new(5.0));
        for &handle in &handles {
            level.push_back(handle);
        }

        assert_eq!(level.remove(handles[1]), Some(handles[1]));
        assert_eq!(level.len(), 2);
        assert_eq!(level.pop_front(), Some(handles[0]));
        assert_eq!(level.pop_front(), Some(handles[2]));
    }

    #[test]
    fn removing_an_absent_handle_is_a_no_op() {
        let (_arena, handles) = arena_with_orders(2);
        let mut level = Level::new(Price::new(5.0));
        level.push_back(handles[0]);

        crate::assert_none!(level.remove(handles[1]));
        assert_eq!(level.len(), 1);
        assert_eq!(level.front(), Some(handles[0]));
    }
}
