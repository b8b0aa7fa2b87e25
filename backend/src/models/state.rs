//! Market state
//!
//! The per-round ledger of the marketplace: round counter, this round's
//! order books, price history, and the append-only transaction log.
//!
//! Owned exclusively by the simulation engine. Agents never see this struct
//! directly; they receive cloned snapshots during the decision phase, so no
//! agent can observe or influence another within the same round.
//!
//! # Critical Invariants
//!
//! 1. `current_round` is monotonic and only advanced by the engine
//! 2. `transaction_log` is append-only and ordered by round
//! 3. `bids`/`asks` hold the current round's accepted orders only

use crate::models::order::Order;
use crate::models::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Per-round price aggregate
///
/// Recorded only for rounds in which at least one trade cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Round the aggregate describes
    pub round: usize,

    /// Volume-weighted average trade price (cents)
    pub average_price: i64,

    /// Total units traded
    pub volume: u32,

    /// Number of transactions
    pub num_transactions: usize,
}

/// Complete market state
///
/// # Example
/// ```
/// use market_simulator_core_rs::MarketState;
///
/// let state = MarketState::new();
/// assert_eq!(state.current_round(), 0);
/// assert!(state.bids().is_empty());
/// assert!(state.transaction_log().is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketState {
    /// Current simulation round (0 before the first round runs)
    current_round: usize,

    /// Active bids for the current round
    bids: Vec<Order>,

    /// Active asks for the current round
    asks: Vec<Order>,

    /// Per-round price aggregates, in round order
    price_history: Vec<PricePoint>,

    /// All transactions across all rounds, in clearing order
    transaction_log: Vec<Transaction>,
}

impl MarketState {
    /// Create a fresh market state at round 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current round number
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Advance to the next round
    pub fn advance_round(&mut self) {
        self.current_round += 1;
    }

    /// Get the current round's bids
    pub fn bids(&self) -> &[Order] {
        &self.bids
    }

    /// Get the current round's asks
    pub fn asks(&self) -> &[Order] {
        &self.asks
    }

    /// Replace the order books with this round's accepted orders
    pub fn set_books(&mut self, bids: Vec<Order>, asks: Vec<Order>) {
        self.bids = bids;
        self.asks = asks;
    }

    /// Append cleared transactions to the log
    pub fn record_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transaction_log.extend(transactions);
    }

    /// Append a per-round price aggregate
    pub fn push_price_point(&mut self, point: PricePoint) {
        self.price_history.push(point);
    }

    /// Get the full price history
    pub fn price_history(&self) -> &[PricePoint] {
        &self.price_history
    }

    /// Get the price aggregate for a specific round, if any trades cleared
    pub fn price_point_for_round(&self, round: usize) -> Option<&PricePoint> {
        self.price_history.iter().rev().find(|p| p.round == round)
    }

    /// Last known average price across all rounds so far (cents)
    pub fn last_average_price(&self) -> Option<i64> {
        self.price_history.last().map(|p| p.average_price)
    }

    /// Get the full transaction log
    pub fn transaction_log(&self) -> &[Transaction] {
        &self.transaction_log
    }

    /// Iterate the transactions cleared in a specific round
    pub fn transactions_in_round(&self, round: usize) -> impl Iterator<Item = &Transaction> {
        self.transaction_log.iter().filter(move |tx| tx.round() == round)
    }
}
