//! Order (bid/ask) model
//!
//! A standing offer to trade at a stated price and quantity, valid for the
//! round it was placed in only. Agents resubmit every round; no order book
//! carries over.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// Which side of the market an order sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order
    Bid,
    /// Sell order
    Ask,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// A bid or ask submitted for a single round
///
/// Immutable once created, except for the quantity decrement applied by the
/// matching engine during partial fills within one clearing pass.
///
/// # Example
/// ```
/// use market_simulator_core_rs::{Order, Side};
///
/// let order = Order::new("buyer_1".to_string(), Side::Bid, 10_500, 2, 1);
/// assert_eq!(order.price(), 10_500); // $105.00 in cents
/// assert_eq!(order.quantity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Submitting agent
    agent_id: String,

    /// Bid or ask
    side: Side,

    /// Limit price (cents, > 0)
    price: i64,

    /// Remaining quantity (units, > 0 at submission)
    quantity: u32,

    /// Round the order was placed in
    round: usize,
}

impl Order {
    /// Create a new order
    ///
    /// # Panics
    /// Panics if price <= 0 or quantity == 0
    pub fn new(agent_id: String, side: Side, price: i64, quantity: u32, round: usize) -> Self {
        assert!(price > 0, "price must be positive");
        assert!(quantity > 0, "quantity must be positive");
        Self {
            agent_id,
            side,
            price,
            quantity,
            round,
        }
    }

    /// Get the submitting agent's ID
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        self.side
    }

    /// Get the limit price (cents)
    pub fn price(&self) -> i64 {
        self.price
    }

    /// Get the remaining quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Get the round the order was placed in
    pub fn round(&self) -> usize {
        self.round
    }

    /// Total cost to honor the order at its limit price (cents)
    pub fn notional(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }

    /// Check whether the order has been fully consumed by fills
    pub fn is_filled(&self) -> bool {
        self.quantity == 0
    }

    /// Consume part of the order's quantity during matching
    ///
    /// # Panics
    /// Panics if `quantity` exceeds the remaining quantity
    pub fn fill(&mut self, quantity: u32) {
        assert!(
            quantity <= self.quantity,
            "fill quantity {} exceeds remaining {}",
            quantity,
            self.quantity
        );
        self.quantity -= quantity;
    }
}
