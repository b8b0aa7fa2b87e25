//! Per-round display aggregation
//!
//! Turns the run history into aligned per-round series for reporting and
//! charting outside the core. Pure functions over snapshots: re-running the
//! aggregation over an unchanged history yields identical output.

use crate::models::state::MarketState;
use crate::models::transaction::Transaction;
use serde::Serialize;

/// Aligned per-round series extracted from a run's history
///
/// One entry per round in every vector. Rounds without trades carry the
/// last known average price forward (`None` until the first trade) and
/// report zero volume and zero transactions.
///
/// # Example
/// ```
/// use market_simulator_core_rs::{MarketSeries, MarketState, PricePoint};
///
/// let mut first = MarketState::new();
/// first.advance_round();
/// first.push_price_point(PricePoint {
///     round: 1,
///     average_price: 9_500,
///     volume: 2,
///     num_transactions: 1,
/// });
///
/// let mut second = first.clone();
/// second.advance_round(); // round 2: no trades
///
/// let series = MarketSeries::from_history(&[first, second]);
/// assert_eq!(series.rounds, vec![1, 2]);
/// assert_eq!(series.average_prices, vec![Some(9_500), Some(9_500)]);
/// assert_eq!(series.volumes, vec![2, 0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketSeries {
    /// Round numbers, in order
    pub rounds: Vec<usize>,

    /// Volume-weighted average price per round (cents), carried forward
    /// through empty rounds; `None` before the first trade
    pub average_prices: Vec<Option<i64>>,

    /// Units traded per round
    pub volumes: Vec<u32>,

    /// Transactions cleared per round
    pub transaction_counts: Vec<usize>,
}

impl MarketSeries {
    /// Build the series from per-round history snapshots
    pub fn from_history(history: &[MarketState]) -> Self {
        let mut series = Self::default();
        let mut last_average = None;

        for state in history {
            let round = state.current_round();
            series.rounds.push(round);

            match state.price_point_for_round(round) {
                Some(point) => {
                    last_average = Some(point.average_price);
                    series.average_prices.push(Some(point.average_price));
                    series.volumes.push(point.volume);
                    series.transaction_counts.push(point.num_transactions);
                }
                None => {
                    series.average_prices.push(last_average);
                    series.volumes.push(0);
                    series.transaction_counts.push(0);
                }
            }
        }

        series
    }

    /// Number of rounds covered
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Check whether the series covers any rounds
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Flatten the history into every transaction, in clearing order
///
/// Each round's snapshot repeats the full log, so only the final snapshot's
/// entries are taken.
pub fn all_transactions(history: &[MarketState]) -> Vec<Transaction> {
    history
        .last()
        .map(|state| state.transaction_log().to_vec())
        .unwrap_or_default()
}
