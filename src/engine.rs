use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;

use crate::arena::{Arena, Handle};
use crate::book::{AskPrice, BidPrice, Half};
use crate::level::Level;
use crate::order::{self, Order, Price, Quantity, Side, Timestamp};
use crate::transaction::{self, Event, Trade};

/// Number of order slots a book reserves when none is specified.
pub const DEFAULT_POOL_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddOrderError {
    /// The order pool is full. Nothing was committed; the book is exactly
    /// as it was before the call.
    #[error("order pool capacity exhausted")]
    CapacityExhausted,
    /// An order with this id is already live.
    #[error("an order with id {0} is already in the book")]
    DuplicateId(order::Id),
    /// Orders must carry a strictly positive quantity.
    #[error("order quantity must be strictly positive")]
    ZeroQuantity,
}

/// One aggregated row of a depth snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLevel {
    pub price: Price,
    pub total_quantity: Quantity,
}

/// Aggregated top-of-book view. Both sides are listed best level first and
/// may be shorter than the requested depth if the book is thin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// A price-time limit order book for a single instrument, with continuous
/// matching.
///
/// Order records live in a fixed-capacity arena; the identity index and
/// the per-level FIFOs refer to them through handles. Every public call
/// runs to completion and leaves the three structures consistent: each
/// live order is indexed under its id, queued at exactly one price level
/// on its side, and holds a positive remaining quantity, and the best bid
/// stays strictly below the best ask.
#[derive(Debug)]
pub struct Book {
    /// Storage owning every live order record.
    arena: Arena,
    /// Bid levels, most aggressive (highest) price first.
    bids: Half<BidPrice>,
    /// Ask levels, most aggressive (lowest) price first.
    asks: Half<AskPrice>,
    /// O(1) resolution of order id to arena handle for cancel and amend.
    ids: HashMap<order::Id, Handle>,
    /// Anchor of the monotonic nanosecond clock.
    epoch: Instant,
}

impl Book {
    /// Creates a book with the default pool capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Creates a book whose pool holds at most `pool_capacity` live orders.
    pub fn with_capacity(pool_capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(pool_capacity),
            bids: Half::new(),
            asks: Half::new(),
            ids: HashMap::new(),
            epoch: Instant::now(),
        }
    }

    /// Reads the book's monotonic clock.
    ///
    /// Zero is reserved as the unset-timestamp sentinel, so a reading
    /// taken in the first nanosecond of the book's life is bumped to one.
    fn timestamp_now(&self) -> Timestamp {
        Timestamp::new((self.epoch.elapsed().as_nanos() as u64).max(1))
    }

    /// Admits `order` to the book and resolves any cross it creates.
    ///
    /// An unset (zero) timestamp is replaced with the current clock
    /// reading; any other timestamp is preserved. Trades caused by the
    /// admission are pushed to `log` in matching order.
    ///
    /// On error nothing is committed.
    pub fn add_order(
        &mut self,
        order: Order,
        log: &mut transaction::Log,
    ) -> Result<(), AddOrderError> {
        if order.quantity().is_zero() {
            return Err(AddOrderError::ZeroQuantity);
        }
        if self.ids.contains_key(order.id()) {
            return Err(AddOrderError::DuplicateId(*order.id()));
        }

        let mut order = order;
        if order.timestamp().is_unset() {
            order.timestamp = self.timestamp_now();
        }

        let handle = self
            .arena
            .allocate(order)
            .ok_or(AddOrderError::CapacityExhausted)?;
        self.ids.insert(*order.id(), handle);
        match order.side() {
            Side::Ask => self.asks.push(*order.price(), handle),
            Side::Bid => self.bids.push(*order.price(), handle),
        }
        log.push(Event::Added(order));

        self.try_match(log);

        Ok(())
    }

    /// Cancels the order identified by `id`.
    ///
    /// Returns whether an order with that id was live. On `false` the book
    /// is untouched and nothing is logged.
    pub fn cancel_order(&mut self, id: &order::Id, log: &mut transaction::Log) -> bool {
        let Some(handle) = self.ids.remove(id) else {
            return false;
        };
        let order = self.arena.deallocate(handle);
        match order.side() {
            Side::Ask => self.asks.erase(*order.price(), handle),
            Side::Bid => self.bids.erase(*order.price(), handle),
        }
        log.push(Event::Canceled { id: *id });
        true
    }

    /// Amends the order identified by `id`.
    ///
    /// A quantity-only amend (the new price compares bitwise-equal to the
    /// resting price) rewrites the quantity in place, keeping the order's
    /// queue position and timestamp; no matching is attempted, even for a
    /// size increase. A price change forfeits priority entirely: the order
    /// is cancelled and re-admitted under the same id with a fresh
    /// timestamp, matching like any new arrival.
    ///
    /// Returns whether an order with that id was live. An amend to zero
    /// quantity is refused (`false`, no mutation); removal is what
    /// [`Book::cancel_order`] is for.
    pub fn amend_order(
        &mut self,
        id: &order::Id,
        new_price: Price,
        new_quantity: Quantity,
        log: &mut transaction::Log,
    ) -> bool {
        if new_quantity.is_zero() {
            return false;
        }
        let Some(&handle) = self.ids.get(id) else {
            return false;
        };

        let resting = self.arena.get(handle);
        let side = *resting.side();
        if *resting.price() == new_price {
            self.arena.get_mut(handle).quantity = new_quantity;
            return true;
        }

        let cancelled = self.cancel_order(id, log);
        debug_assert!(cancelled, "an indexed order must be cancellable");
        let reinserted = Order::new(*id, side, new_price, new_quantity);
        self.add_order(reinserted, log).expect(
            "reinserting an amended order cannot fail: its slot was just freed and its id just retired",
        );
        true
    }

    /// Aggregates the top `depth` levels per side, best first.
    ///
    /// Read-only; a thin book yields fewer than `depth` rows.
    pub fn get_snapshot(&self, depth: usize) -> Snapshot {
        Snapshot {
            bids: aggregate_levels(&self.arena, self.bids.levels(), depth),
            asks: aggregate_levels(&self.arena, self.asks.levels(), depth),
        }
    }

    /// Returns the best price of the [`side`] of the orderbook.
    ///
    /// That is either the lowest ask price or the highest bid price.
    pub fn best_price(&self, side: &Side) -> Option<Price> {
        match side {
            Side::Ask => self.asks.best().map(|(price, _)| price),
            Side::Bid => self.bids.best().map(|(price, _)| price),
        }
    }

    /// Returns if the order [`id`] is live in the book.
    pub fn contains(&self, id: &order::Id) -> bool {
        self.ids.contains_key(id)
    }

    /// Returns the resting order identified by `id`, if it is live.
    pub fn order(&self, id: &order::Id) -> Option<&Order> {
        self.ids.get(id).map(|&handle| self.arena.get(handle))
    }

    /// Number of live orders across both sides.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolves the cross left by an admission.
    ///
    /// While the best bid price is at or above the best ask price, the
    /// FIFO heads of the two best levels trade at the price of whichever
    /// arrived first (a timestamp tie resolves to the bid's price), for
    /// the smaller of the two remaining quantities. Fully filled heads are
    /// popped, unindexed, and freed, and a level is dropped the moment it
    /// empties.
    ///
    /// Each iteration fully consumes at least one order, so the loop is
    /// bounded by the number of live orders.
    fn try_match(&mut self, log: &mut transaction::Log) {
        while !self.bids.is_empty() && !self.asks.is_empty() {
            let (bid_price, bid_level) = self
                .bids
                .best()
                .expect("invariant violated: a non-empty half has a best level");
            let (ask_price, ask_level) = self
                .asks
                .best()
                .expect("invariant violated: a non-empty half has a best level");
            if bid_price < ask_price {
                break;
            }

            let bid_handle = bid_level
                .front()
                .expect("invariant violated: levels in the book are never empty");
            let ask_handle = ask_level
                .front()
                .expect("invariant violated: levels in the book are never empty");
            let bid = *self.arena.get(bid_handle);
            let ask = *self.arena.get(ask_handle);

            let trade_price = if bid.timestamp() <= ask.timestamp() {
                *bid.price()
            } else {
                *ask.price()
            };
            let trade_quantity = std::cmp::min(*bid.quantity(), *ask.quantity());

            log.push(Event::Trade(Trade {
                quantity: trade_quantity,
                price: trade_price,
                buy_order_id: *bid.id(),
                sell_order_id: *ask.id(),
            }));

            self.arena.get_mut(bid_handle).quantity =
                bid.quantity().saturating_sub(&trade_quantity);
            self.arena.get_mut(ask_handle).quantity =
                ask.quantity().saturating_sub(&trade_quantity);

            if self.arena.get(bid_handle).is_filled() {
                let popped = self.bids.pop_head(bid_price);
                debug_assert_eq!(popped, bid_handle);
                self.ids.remove(bid.id());
                self.arena.deallocate(bid_handle);
            }
            if self.arena.get(ask_handle).is_filled() {
                let popped = self.asks.pop_head(ask_price);
                debug_assert_eq!(popped, ask_handle);
                self.ids.remove(ask.id());
                self.arena.deallocate(ask_handle);
            }
        }
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

fn aggregate_levels<'book>(
    arena: &Arena,
    levels: impl Iterator<Item = &'book Level>,
    depth: usize,
) -> Vec<PriceLevel> {
    levels
        .take(depth)
        .map(|level| PriceLevel {
            price: level.price(),
            total_quantity: level.iter().fold(Quantity::zero(), |total, handle| {
                total.saturating_add(arena.get(handle).quantity())
            }),
        })
        .collect()
}

#[cfg(test)]
impl Book {
    /// Asserts the cross-structure invariants that must hold after every
    /// public operation.
    pub(crate) fn assert_invariants(&self) {
        let bid_handles = self.bids.levels().flat_map(|level| level.iter());
        let ask_handles = self.asks.levels().flat_map(|level| level.iter());
        let mut queued = 0;
        for handle in bid_handles.chain(ask_handles) {
            queued += 1;
            let order = self.arena.get(handle);
            assert!(
                !order.quantity().is_zero(),
                "live orders must have positive quantity"
            );
            assert_eq!(
                self.ids.get(order.id()),
                Some(&handle),
                "queued orders must be indexed under their own id"
            );
        }
        assert_eq!(
            queued,
            self.ids.len(),
            "identity index and side books must track the same orders"
        );

        for level in self.bids.levels().chain(self.asks.levels()) {
            assert!(!level.is_empty(), "empty levels must be dropped");
        }

        if let (Some(best_bid), Some(best_ask)) = (
            self.best_price(&Side::Bid),
            self.best_price(&Side::Ask),
        ) {
            assert!(best_bid < best_ask, "the book must be uncrossed at rest");
        }

        assert_eq!(
            self.arena.free_slots() + self.ids.len(),
            self.arena.capacity(),
            "every pool slot is either free or holds exactly one queued order"
        );
    }
}
