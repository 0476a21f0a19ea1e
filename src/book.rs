use std::collections::BTreeMap;

use crate::arena::Handle;
use crate::level::Level;
use crate::order::{Price, Side};

/// Ask prices. Used for ordering price levels in ascending order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AskPrice(Price);

impl Ord for AskPrice {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // same ordering as the underlying price
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for AskPrice {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Bid prices. Used for ordering price levels in descending order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BidPrice(Price);

impl Ord for BidPrice {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // inverse ordering compared to the underlying price
        other.0.cmp(&self.0)
    }
}

impl PartialOrd for BidPrice {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Price> for AskPrice {
    fn from(value: Price) -> Self {
        Self(value)
    }
}

impl From<Price> for BidPrice {
    fn from(value: Price) -> Self {
        Self(value)
    }
}

impl From<AskPrice> for Price {
    fn from(value: AskPrice) -> Self {
        value.0
    }
}

impl From<BidPrice> for Price {
    fn from(value: BidPrice) -> Self {
        value.0
    }
}

/// A price wrapper whose `Ord` puts the most aggressive price of its side
/// first: ascending for asks, descending for bids.
pub(crate) trait SidePrice: Copy + Ord + From<Price> + Into<Price> {
    /// The side whose levels this wrapper sorts for.
    fn side() -> Side;
}

impl SidePrice for AskPrice {
    fn side() -> Side {
        Side::Ask
    }
}

impl SidePrice for BidPrice {
    fn side() -> Side {
        Side::Bid
    }
}

/// One half of an orderbook.
///
/// This type is parameterized by the price wrapper (ask vs bid price)
/// because it decides the order of the levels: iterating from the first
/// key always yields the most aggressive level, whichever side this is.
///
/// Levels hold arena handles, never order records; the book resolves them
/// through its arena. No level in the map is ever empty.
#[derive(Debug)]
pub(crate) struct Half<TPrice> {
    levels: BTreeMap<TPrice, Level>,
}

impl<TPrice> Half<TPrice>
where
    TPrice: SidePrice,
{
    pub(crate) fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Returns the most aggressive level: highest price for bids, lowest
    /// for asks.
    pub(crate) fn best(&self) -> Option<(Price, &Level)> {
        self.levels
            .first_key_value()
            .map(|(price, level)| ((*price).into(), level))
    }

    /// Appends `handle` to the tail of the FIFO at `price`, creating the
    /// level if absent.
    pub(crate) fn push(&mut self, price: Price, handle: Handle) {
        self.levels
            .entry(TPrice::from(price))
            .or_insert_with(|| Level::new(price))
            .push_back(handle);
    }

    /// Removes and returns the head of the FIFO at `price`, dropping the
    /// level if it empties.
    ///
    /// Panics if there is no level at `price`; callers pass a price they
    /// just observed through [`Half::best`].
    pub(crate) fn pop_head(&mut self, price: Price) -> Handle {
        let key = TPrice::from(price);
        let level = self
            .levels
            .get_mut(&key)
            .expect("invariant violated: a popped price must map to a level");
        let handle = level
            .pop_front()
            .expect("invariant violated: levels in the book are never empty");
        if level.is_empty() {
            self.levels.remove(&key);
        }
        handle
    }

    /// Removes `handle` from the FIFO at `price`, dropping the level if it
    /// empties.
    ///
    /// Panics if there is no level at `price`; the identity index only
    /// hands out prices of orders that are queued on this side.
    pub(crate) fn erase(&mut self, price: Price, handle: Handle) {
        let key = TPrice::from(price);
        let level = self
            .levels
            .get_mut(&key)
            .expect("invariant violated: an indexed order's price must map to a level");
        let removed = level.remove(handle);
        crate::debug_assert_some!(
            removed,
            "an indexed {:?} order must be queued at its price level",
            TPrice::side(),
        );
        if level.is_empty() {
            self.levels.remove(&key);
        }
    }

    /// Creates an iterator over the levels, from best to worst.
    pub(crate) fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    /// Number of active price levels.
    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{AskPrice, BidPrice, Half};
    use crate::arena::{Arena, Handle};
    use crate::order::{Id, Order, Price, Quantity, Side};

    fn handle(arena: &mut Arena, id: u64, side: Side, price: f64) -> Handle {
        crate::assert_some!(arena.allocate(Order::new(
            Id::new(id),
            side,
            Price::new(price),
            Quantity::new(10),
        )))
    }

    #[test]
    fn ask_prices_order_ascending() {
        assert!(AskPrice::from(Price::new(5.0)) < AskPrice::from(Price::new(10.0)));
        assert!(AskPrice::from(Price::new(10.0)) > AskPrice::from(Price::new(5.0)));
    }

    #[test]
    fn bid_prices_order_descending() {
        assert!(BidPrice::from(Price::new(10.0)) < BidPrice::from(Price::new(5.0)));
        assert!(BidPrice::from(Price::new(5.0)) > BidPrice::from(Price::new(10.0)));
    }

    #[test]
    fn best_ask_is_the_lowest_price() {
        let mut arena = Arena::with_capacity(8);
        let mut asks = Half::<AskPrice>::new();
        asks.push(Price::new(101.0), handle(&mut arena, 1, Side::Ask, 101.0));
        asks.push(Price::new(100.0), handle(&mut arena, 2, Side::Ask, 100.0));
        asks.push(Price::new(102.0), handle(&mut arena, 3, Side::Ask, 102.0));

        let (price, _level) = crate::assert_some!(asks.best());
        assert_eq!(price, Price::new(100.0));
    }

    #[test]
    fn best_bid_is_the_highest_price() {
        let mut arena = Arena::with_capacity(8);
        let mut bids = Half::<BidPrice>::new();
        bids.push(Price::new(99.0), handle(&mut arena, 1, Side::Bid, 99.0));
        bids.push(Price::new(100.0), handle(&mut arena, 2, Side::Bid, 100.0));
        bids.push(Price::new(98.0), handle(&mut arena, 3, Side::Bid, 98.0));

        let (price, _level) = crate::assert_some!(bids.best());
        assert_eq!(price, Price::new(100.0));
    }

    #[test]
    fn pop_head_drains_a_level_then_drops_it() {
        let mut arena = Arena::with_capacity(8);
        let mut asks = Half::<AskPrice>::new();
        let price = Price::new(100.0);
        let first = handle(&mut arena, 1, Side::Ask, 100.0);
        let second = handle(&mut arena, 2, Side::Ask, 100.0);
        asks.push(price, first);
        asks.push(price, second);

        assert_eq!(asks.pop_head(price), first);
        assert_eq!(asks.len(), 1);
        let (_, level) = crate::assert_some!(asks.best());
        assert_eq!(level.front(), Some(second));
        assert_eq!(asks.pop_head(price), second);
        assert!(asks.is_empty());
    }

    #[test]
    fn erase_removes_mid_queue_and_drops_empty_levels() {
        let mut arena = Arena::with_capacity(8);
        let mut bids = Half::<BidPrice>::new();
        let price = Price::new(100.0);
        let first = handle(&mut arena, 1, Side::Bid, 100.0);
        let second = handle(&mut arena, 2, Side::Bid, 100.0);
        bids.push(price, first);
        bids.push(price, second);

        bids.erase(price, second);
        let (_, level) = crate::assert_some!(bids.best());
        assert_eq!(level.front(), Some(first));

        bids.erase(price, first);
        assert!(bids.is_empty());
    }
}
