//! Rule-based decision policy
//!
//! The baseline heuristic: price around the agent's reservation price,
//! always for a single unit.
//!
//! # Behavior
//!
//! - Buyers bid a uniform draw from [80%, 95%] of their valuation, rounded
//!   to the nearest cent; no bid if funds are exhausted or below the drawn
//!   price.
//! - Sellers ask a uniform draw from [105%, 120%] of their cost; no ask
//!   without inventory.

use super::{DecisionError, DecisionPolicy};
use crate::models::agent::Agent;
use crate::models::config::AgentType;
use crate::models::order::{Order, Side};
use crate::models::state::MarketState;
use crate::rng::RngManager;

/// Heuristic policy priced off a reservation price
///
/// # Example
/// ```
/// use market_simulator_core_rs::decision::{DecisionPolicy, RuleBasedPolicy};
/// use market_simulator_core_rs::{Agent, AgentConfig, MarketState, RngManager};
///
/// let mut policy = RuleBasedPolicy::new(10_000); // $100.00 valuation
/// let agent = Agent::from_config(&AgentConfig::buyer("b1", 100_000, 10_000));
/// let mut rng = RngManager::new(42);
///
/// let order = policy.decide(&agent, &MarketState::new(), &mut rng).unwrap();
/// let order = order.expect("well-funded buyer always bids");
/// assert!(order.price() >= 8_000 && order.price() <= 9_500);
/// assert_eq!(order.quantity(), 1);
/// ```
pub struct RuleBasedPolicy {
    /// Reservation price (cents): valuation for buyers, cost for sellers
    valuation_or_cost: i64,
}

impl RuleBasedPolicy {
    /// Create a new rule-based policy
    ///
    /// # Panics
    /// Panics if valuation_or_cost <= 0
    pub fn new(valuation_or_cost: i64) -> Self {
        assert!(valuation_or_cost > 0, "valuation_or_cost must be positive");
        Self { valuation_or_cost }
    }
}

impl DecisionPolicy for RuleBasedPolicy {
    fn decide(
        &mut self,
        agent: &Agent,
        snapshot: &MarketState,
        rng: &mut RngManager,
    ) -> Result<Option<Order>, DecisionError> {
        let round = snapshot.current_round();
        let order = match agent.agent_type() {
            AgentType::Buyer => {
                if agent.funds() <= 0 {
                    return Ok(None);
                }
                let price =
                    (rng.uniform(0.80, 0.95) * self.valuation_or_cost as f64).round() as i64;
                if price <= 0 || !agent.can_afford(price) {
                    return Ok(None);
                }
                Order::new(agent.agent_id().to_string(), Side::Bid, price, 1, round)
            }
            AgentType::Seller => {
                if agent.inventory() == 0 {
                    return Ok(None);
                }
                let price =
                    (rng.uniform(1.05, 1.20) * self.valuation_or_cost as f64).round() as i64;
                Order::new(agent.agent_id().to_string(), Side::Ask, price, 1, round)
            }
        };
        Ok(Some(order))
    }
}
