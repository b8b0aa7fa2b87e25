//! Periodic double-auction matching
//!
//! Clears one round's batch of bids and asks into transactions. This is not
//! continuous matching: the engine collects every agent's order first, then
//! runs a single clearing pass.
//!
//! # Algorithm
//!
//! Bids are sorted by price descending, asks ascending (both stable, so
//! submission order breaks price ties). Two cursors walk the sorted books:
//! while the best remaining bid price >= the best remaining ask price, a
//! trade clears for min(remaining quantities) at the integer midpoint of the
//! two limit prices. Exhausted orders advance their cursor. The pass stops at
//! the first bid < ask; the sorted structure guarantees no match exists
//! beyond that point.
//!
//! The caller owns the order vectors for the duration of the call; remaining
//! quantities are decremented in place, so partially filled orders come back
//! with their unfilled remainder.

use crate::models::order::Order;
use crate::models::transaction::Transaction;

/// Midpoint of two cent prices; an odd cent sum truncates the half-cent
fn midpoint(bid_price: i64, ask_price: i64) -> i64 {
    (bid_price + ask_price) / 2
}

/// Clear one round's bids and asks into transactions
///
/// # Example
/// ```
/// use market_simulator_core_rs::{matching, Order, Side};
///
/// let mut bids = vec![Order::new("b1".to_string(), Side::Bid, 10_000, 1, 1)];
/// let mut asks = vec![Order::new("s1".to_string(), Side::Ask, 9_000, 1, 1)];
///
/// let transactions = matching::clear(&mut bids, &mut asks, 1);
/// assert_eq!(transactions.len(), 1);
/// assert_eq!(transactions[0].price(), 9_500); // midpoint of 100.00 and 90.00
/// ```
pub fn clear(bids: &mut [Order], asks: &mut [Order], round: usize) -> Vec<Transaction> {
    // Stable sorts: ties keep submission order
    bids.sort_by(|a, b| b.price().cmp(&a.price()));
    asks.sort_by(|a, b| a.price().cmp(&b.price()));

    let mut transactions = Vec::new();
    let mut bid_idx = 0;
    let mut ask_idx = 0;

    while bid_idx < bids.len() && ask_idx < asks.len() {
        let bid_price = bids[bid_idx].price();
        let ask_price = asks[ask_idx].price();

        if bid_price < ask_price {
            // Best bid below best ask: no further matches possible
            break;
        }

        let quantity = bids[bid_idx].quantity().min(asks[ask_idx].quantity());
        transactions.push(Transaction::new(
            bids[bid_idx].agent_id().to_string(),
            asks[ask_idx].agent_id().to_string(),
            midpoint(bid_price, ask_price),
            quantity,
            round,
        ));

        bids[bid_idx].fill(quantity);
        asks[ask_idx].fill(quantity);

        if bids[bid_idx].is_filled() {
            bid_idx += 1;
        }
        if asks[ask_idx].is_filled() {
            ask_idx += 1;
        }
    }

    transactions
}
