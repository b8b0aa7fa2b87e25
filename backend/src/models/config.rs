//! Agent and simulation configuration types
//!
//! Configuration is validated once, at simulation construction. An invalid
//! `AgentConfig` never produces a runtime agent.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// Market role of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// Holds funds, submits bids, accumulates inventory
    Buyer,
    /// Holds inventory, submits asks, accumulates funds
    Seller,
}

/// How agents in a simulation reach their decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Deterministic heuristic around each agent's reservation price
    RuleBased,
    /// Delegate to an external text-generation provider, parse the reply
    PolicyDriven,
}

/// Per-agent configuration
///
/// Field requirements depend on role and decision mode:
/// - buyers require `initial_funds`, sellers require `initial_inventory`
/// - rule-based agents require a positive `valuation_or_cost`
/// - policy-driven agents require a `decision_policy_key`
///
/// Validation happens in [`crate::orchestrator::Simulation`] construction.
///
/// # Example
/// ```
/// use market_simulator_core_rs::{AgentConfig, AgentType};
///
/// let config = AgentConfig {
///     agent_id: "buyer_1".to_string(),
///     agent_type: AgentType::Buyer,
///     initial_funds: Some(100_000), // $1,000.00 in cents
///     initial_inventory: None,
///     valuation_or_cost: Some(11_000),
///     decision_policy_key: None,
/// };
/// assert_eq!(config.agent_id, "buyer_1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique agent identifier (e.g., "buyer_1")
    pub agent_id: String,

    /// Market role
    pub agent_type: AgentType,

    /// Opening funds for buyers (cents, >= 0)
    #[serde(default)]
    pub initial_funds: Option<i64>,

    /// Opening inventory for sellers (units, >= 0)
    #[serde(default)]
    pub initial_inventory: Option<u32>,

    /// Reservation price (cents): the most a buyer will pay / least a
    /// seller will accept
    #[serde(default)]
    pub valuation_or_cost: Option<i64>,

    /// Key identifying the persona/instruction template for policy-driven
    /// agents
    #[serde(default)]
    pub decision_policy_key: Option<String>,
}

impl AgentConfig {
    /// Shorthand for a rule-based buyer config
    pub fn buyer(agent_id: impl Into<String>, initial_funds: i64, valuation: i64) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_type: AgentType::Buyer,
            initial_funds: Some(initial_funds),
            initial_inventory: None,
            valuation_or_cost: Some(valuation),
            decision_policy_key: None,
        }
    }

    /// Shorthand for a rule-based seller config
    pub fn seller(agent_id: impl Into<String>, initial_inventory: u32, cost: i64) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_type: AgentType::Seller,
            initial_funds: None,
            initial_inventory: Some(initial_inventory),
            valuation_or_cost: Some(cost),
            decision_policy_key: None,
        }
    }
}
