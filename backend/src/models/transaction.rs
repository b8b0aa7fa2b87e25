//! Transaction model
//!
//! A completed trade between one buyer and one seller, produced only by the
//! matching engine and appended to the market's transaction log. Immutable.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// A completed trade
///
/// # Example
/// ```
/// use market_simulator_core_rs::Transaction;
///
/// let tx = Transaction::new(
///     "buyer_1".to_string(),
///     "seller_1".to_string(),
///     9_750, // $97.50 in cents
///     2,
///     1,
/// );
/// assert_eq!(tx.notional(), 19_500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (UUID)
    id: String,

    /// Buying agent
    buyer_id: String,

    /// Selling agent
    seller_id: String,

    /// Trade price (cents)
    price: i64,

    /// Traded quantity (units, > 0)
    quantity: u32,

    /// Round in which the trade cleared
    round: usize,
}

impl Transaction {
    /// Create a new transaction
    ///
    /// # Panics
    /// Panics if price <= 0 or quantity == 0
    pub fn new(buyer_id: String, seller_id: String, price: i64, quantity: u32, round: usize) -> Self {
        assert!(price > 0, "price must be positive");
        assert!(quantity > 0, "quantity must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            buyer_id,
            seller_id,
            price,
            quantity,
            round,
        }
    }

    /// Get the transaction ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the buyer's agent ID
    pub fn buyer_id(&self) -> &str {
        &self.buyer_id
    }

    /// Get the seller's agent ID
    pub fn seller_id(&self) -> &str {
        &self.seller_id
    }

    /// Get the trade price (cents)
    pub fn price(&self) -> i64 {
        self.price
    }

    /// Get the traded quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Get the round the trade cleared in
    pub fn round(&self) -> usize {
        self.round
    }

    /// Total value exchanged: price x quantity (cents)
    pub fn notional(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}
