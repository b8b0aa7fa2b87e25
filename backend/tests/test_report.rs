//! Display aggregation tests
//!
//! The per-round series must stay aligned across rounds with and without
//! trades, carry the last average price through quiet rounds, and be
//! idempotent over an unchanged history.

use market_simulator_core_rs::{
    report, AgentConfig, DecisionMode, GenerateError, MarketSeries, PromptTemplate, Simulation,
    SimulationConfig, StaticTemplateProvider, TextGenerator,
};
use std::cell::Cell;
use std::sync::Arc;

/// Crosses the spread only on the first round, passes afterwards
struct FirstRoundTrader {
    turns: Cell<u32>,
}

impl TextGenerator for FirstRoundTrader {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let turn = self.turns.get();
        self.turns.set(turn + 1);
        // Two agents per round: trade on the first two turns only
        if turn >= 2 {
            return Ok("PASS".to_string());
        }
        if prompt.contains("[buyer]") {
            Ok(r#"{"action": "bid", "price": 100.00, "quantity": 1}"#.to_string())
        } else {
            Ok(r#"{"action": "ask", "price": 90.00, "quantity": 1}"#.to_string())
        }
    }
}

fn trading_then_quiet_history(num_rounds: usize) -> Vec<market_simulator_core_rs::MarketState> {
    let templates = StaticTemplateProvider::new()
        .with(
            "buyer_default",
            PromptTemplate::new("Decide.").with_persona("[buyer]"),
        )
        .with(
            "seller_default",
            PromptTemplate::new("Decide.").with_persona("[seller]"),
        );

    let mut buyer = AgentConfig::buyer("b1", 100_000, 0);
    buyer.valuation_or_cost = None;
    buyer.decision_policy_key = Some("buyer_default".to_string());
    let mut seller = AgentConfig::seller("s1", 10, 0);
    seller.valuation_or_cost = None;
    seller.decision_policy_key = Some("seller_default".to_string());

    let config = SimulationConfig {
        agent_configs: vec![buyer, seller],
        num_rounds,
        decision_mode: DecisionMode::PolicyDriven,
        rng_seed: 11,
    };
    let mut simulation = Simulation::with_providers(
        config,
        Arc::new(templates),
        Arc::new(FirstRoundTrader { turns: Cell::new(0) }),
    )
    .unwrap();

    simulation.run().unwrap().history
}

#[test]
fn test_series_alignment() {
    let history = trading_then_quiet_history(4);
    let series = MarketSeries::from_history(&history);

    assert_eq!(series.len(), 4);
    assert_eq!(series.rounds, vec![1, 2, 3, 4]);
    assert_eq!(series.volumes.len(), 4);
    assert_eq!(series.average_prices.len(), 4);
    assert_eq!(series.transaction_counts.len(), 4);
}

#[test]
fn test_quiet_rounds_carry_last_average_forward() {
    let history = trading_then_quiet_history(4);
    let series = MarketSeries::from_history(&history);

    // Round 1 trades at the 95.00 midpoint, rounds 2-4 are quiet
    assert_eq!(
        series.average_prices,
        vec![Some(9_500), Some(9_500), Some(9_500), Some(9_500)]
    );
    assert_eq!(series.volumes, vec![1, 0, 0, 0]);
    assert_eq!(series.transaction_counts, vec![1, 0, 0, 0]);
}

#[test]
fn test_aggregation_idempotent_over_unchanged_history() {
    let history = trading_then_quiet_history(3);

    let first = MarketSeries::from_history(&history);
    let second = MarketSeries::from_history(&history);
    assert_eq!(first, second);

    let flat_a = report::all_transactions(&history);
    let flat_b = report::all_transactions(&history);
    assert_eq!(flat_a, flat_b);
}

#[test]
fn test_flat_transaction_list_spans_the_run() {
    let history = trading_then_quiet_history(4);
    let transactions = report::all_transactions(&history);

    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].round(), 1);
    assert_eq!(transactions[0].price(), 9_500);
}
