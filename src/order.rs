use serde::{Deserialize, Serialize};

/// The client-assigned identifier of an order.
///
/// Ids are chosen by the caller and must be unique among live orders; the
/// book rejects an add whose id is already resting.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Id(u64);

impl Id {
    /// Constructs a new id.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative limit price of an asset.
///
/// Prices are IEEE-754 doubles copied verbatim from input, never the result
/// of arithmetic, so comparing them directly is sound. The total order is
/// [`f64::total_cmp`]; equality under it is bitwise, which is exactly the
/// comparison the in-place amend path relies on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Price(f64);

impl Price {
    /// Constructs a new price.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == std::cmp::Ordering::Equal
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// An amount of units to buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(&self, other: &Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: &Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

/// Nanoseconds on the book's monotonic clock.
///
/// A zero timestamp on an inbound order is the sentinel "fill in for me":
/// the book replaces it with the current clock reading on admission. Any
/// other value is preserved as-is, without validation against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(nanos: u64) -> Self {
        Self(nanos)
    }

    /// The sentinel timestamp requesting a clock reading on admission.
    pub fn unset() -> Self {
        Self(0)
    }

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    pub fn nanos(self) -> u64 {
        self.0
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ask = 0,
    Bid = 1,
}

impl Side {
    pub fn is_ask(&self) -> bool {
        self == &Self::Ask
    }

    pub fn is_bid(&self) -> bool {
        self == &Self::Bid
    }

    /// Returns the opposite of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use matchbook::order::Side;
    /// assert_eq!(Side::Ask.opposite(), Side::Bid);
    /// assert_eq!(Side::Bid.opposite(), Side::Ask);
    /// ```
    pub fn opposite(&self) -> Side {
        match self {
            Side::Ask => Side::Bid,
            Side::Bid => Side::Ask,
        }
    }
}

/// A good-till-cancelled limit order.
///
/// The only field that changes while the order rests is `quantity`, which
/// decreases on partial fills and can be replaced by an in-place amend. A
/// price-changing amend retires the record and admits a new one under the
/// same id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// The client-chosen id, unique among live orders.
    pub(crate) id: Id,
    // side - buy (bid) or sell (ask)
    pub(crate) side: Side,
    // the limit price
    pub(crate) price: Price,
    // the units remaining to buy or sell; strictly positive while resting
    pub(crate) quantity: Quantity,
    // when the order entered the book, on the book's monotonic clock
    pub(crate) timestamp: Timestamp,
}

impl Order {
    /// Constructs an order with an unset timestamp; the book stamps it on
    /// admission.
    pub fn new(id: Id, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            id,
            side,
            price,
            quantity,
            timestamp: Timestamp::unset(),
        }
    }

    /// Constructs an order carrying an explicit entry timestamp.
    pub fn with_timestamp(
        id: Id,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            side,
            price,
            quantity,
            timestamp,
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn side(&self) -> &Side {
        &self.side
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Returns if the order is on the ask-side.
    pub fn is_ask(&self) -> bool {
        self.side.is_ask()
    }

    /// Returns if the order is on the bid-side.
    pub fn is_bid(&self) -> bool {
        self.side.is_bid()
    }

    /// Returns if the order is filled, i.e. if its quantity is zero.
    pub fn is_filled(&self) -> bool {
        self.quantity.is_zero()
    }
}
