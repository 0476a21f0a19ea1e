use serde::Serialize;

use crate::order;

/// The sequence of events produced while processing a client operation.
///
/// Trade events are pushed synchronously, in the order the matching loop
/// produces them, within the call that caused them.
#[derive(Debug, Default, Serialize)]
pub struct Log {
    events: Vec<Event>,
}

impl Log {
    pub fn new() -> Self {
        Self { events: vec![] }
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates only the trade events, in emission order.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.events.iter().filter_map(Event::as_trade)
    }
}

/// A single fill produced by the cross-resolution loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trade {
    /// The quantity that was exchanged.
    pub quantity: order::Quantity,
    /// The price at which the exchange occurred: the limit price of
    /// whichever of the two orders arrived first.
    pub price: order::Price,
    /// The id of the buy-side order.
    pub buy_order_id: order::Id,
    /// The id of the sell-side order.
    pub sell_order_id: order::Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    /// An order was admitted to the book.
    Added(order::Order),
    /// A resting order and an incoming order traded.
    Trade(Trade),
    /// An order was removed from the book by cancellation.
    Canceled { id: order::Id },
}

impl Event {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    pub fn as_added(&self) -> Option<&order::Order> {
        match self {
            Self::Added(order) => Some(order),
            _ => None,
        }
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, Self::Trade(_))
    }

    pub fn as_trade(&self) -> Option<&Trade> {
        match self {
            Self::Trade(trade) => Some(trade),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }

    pub fn as_canceled(&self) -> Option<&order::Id> {
        match self {
            Self::Canceled { id } => Some(id),
            _ => None,
        }
    }
}
