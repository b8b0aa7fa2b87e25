//! Simulation engine
//!
//! Main round loop integrating all components:
//! - Decision gathering (agents act against a frozen snapshot)
//! - Order validation (role and resource checks, defense in depth)
//! - Batch clearing (periodic double auction)
//! - Settlement (funds/inventory updates on both counterparties)
//! - History and event recording
//!
//! # Round lifecycle
//!
//! ```text
//! For each round r:
//! 1. Advance the round counter
//! 2. Gather actions from agents in a shuffled order, each against a
//!    cloned snapshot of the pre-round market state
//! 3. Install accepted orders as this round's books
//! 4. Clear the batch into transactions
//! 5. Append transactions to the log
//! 6. Record a price point if anything traded
//! 7. Apply each transaction to both counterparties
//! 8. Snapshot the market state into history
//! ```
//!
//! The engine runs exactly `num_rounds` rounds; re-invoking a completed
//! simulation is a no-op. A policy-driven agent's failed turn never stops
//! the run: the action is dropped, the failure is logged, and the first
//! failure message becomes the run's operational error.
//!
//! # Determinism
//!
//! All randomness (agent shuffle, rule-based price draws) comes from one
//! seeded xorshift64* generator. Same seed + same config = identical run.
//!
//! # Example
//!
//! ```rust
//! use market_simulator_core_rs::{AgentConfig, DecisionMode, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     agent_configs: vec![
//!         AgentConfig::buyer("buyer_1", 100_000, 11_000),
//!         AgentConfig::seller("seller_1", 10, 9_000),
//!     ],
//!     num_rounds: 5,
//!     decision_mode: DecisionMode::RuleBased,
//!     rng_seed: 12345,
//! };
//!
//! let mut simulation = Simulation::new(config).unwrap();
//! let outcome = simulation.run().unwrap();
//! assert_eq!(outcome.history.len(), 5);
//! ```

use crate::decision::providers::{TemplateProvider, TextGenerator};
use crate::decision::{DecisionPolicy, LlmPolicy, RuleBasedPolicy};
use crate::matching;
use crate::models::agent::{Agent, AgentError};
use crate::models::config::{AgentConfig, AgentType, DecisionMode};
use crate::models::event::{EventLog, RejectReason, RoundEvent};
use crate::models::order::{Order, Side};
use crate::models::state::{MarketState, PricePoint};
use crate::rng::RngManager;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Configuration for each participating agent
    pub agent_configs: Vec<AgentConfig>,

    /// Number of rounds to simulate
    pub num_rounds: usize,

    /// How agents reach their decisions
    pub decision_mode: DecisionMode,

    /// RNG seed for deterministic simulation
    pub rng_seed: u64,
}

/// Configuration validation errors
///
/// All of these are fatal: they surface at construction, before any round
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("must have at least one agent")]
    NoAgents,

    #[error("num_rounds must be > 0")]
    ZeroRounds,

    #[error("duplicate agent ID: {0}")]
    DuplicateAgentId(String),

    #[error("buyer '{0}' requires initial_funds")]
    MissingFunds(String),

    #[error("seller '{0}' requires initial_inventory")]
    MissingInventory(String),

    #[error("negative initial_funds for agent '{0}'")]
    NegativeFunds(String),

    #[error("rule-based agent '{0}' requires a positive valuation_or_cost")]
    MissingValuation(String),

    #[error("policy-driven agent '{0}' requires a decision_policy_key")]
    MissingPolicyKey(String),

    #[error("policy-driven mode requires template and generation providers")]
    ProvidersRequired,
}

/// Simulation runtime errors
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A cleared transaction referenced an agent the engine does not know.
    /// Unreachable when orders come through the validation pass.
    #[error("transaction references unknown agent '{0}'")]
    UnknownAgent(String),

    /// Settlement would have driven a balance negative. Unreachable given
    /// validated orders; treated as a defect, not a user error.
    #[error("settlement invariant violated for agent '{agent_id}': {source}")]
    Settlement {
        agent_id: String,
        source: AgentError,
    },
}

/// Result of a single round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    /// Round number
    pub round: usize,

    /// Orders accepted into the books this round
    pub num_orders: usize,

    /// Transactions cleared this round
    pub num_transactions: usize,

    /// Units traded this round
    pub volume: u32,
}

/// What a completed run hands back to the caller
///
/// The caller always receives the full round history; individual dropped
/// decisions are not itemized here (they live in the event log). At most one
/// operational-error message is surfaced, first-failure-wins.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Market state snapshot after each round, in round order
    pub history: Vec<MarketState>,

    /// First policy failure of the run, if any
    pub operational_error: Option<String>,
}

// ============================================================================
// Simulation
// ============================================================================

/// Main engine owning all simulation state
///
/// Owns the market state, the agents, their decision policies, and the RNG.
/// Nothing outside the engine mutates any of them; agents only ever see
/// cloned snapshots.
pub struct Simulation {
    /// Runtime agents, indexed by ID
    agents: HashMap<String, Agent>,

    /// Agent IDs in configuration order (shuffled copy each round)
    agent_order: Vec<String>,

    /// Per-agent decision policies
    policies: HashMap<String, Box<dyn DecisionPolicy>>,

    /// The market ledger
    state: MarketState,

    /// Deterministic RNG
    rng: RngManager,

    /// Total rounds to run
    num_rounds: usize,

    /// Market state snapshot after each completed round
    history: Vec<MarketState>,

    /// Audit trail of per-agent outcomes
    event_log: EventLog,

    /// First policy failure of the run (first-error-wins)
    operational_error: Option<String>,
}

impl Simulation {
    /// Create a rule-based simulation from configuration
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration is invalid, or
    /// [`ConfigError::ProvidersRequired`] for policy-driven mode - use
    /// [`Simulation::with_providers`] for that.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        if config.decision_mode == DecisionMode::PolicyDriven {
            return Err(ConfigError::ProvidersRequired);
        }
        Self::build(config, None)
    }

    /// Create a policy-driven simulation with injected collaborators
    ///
    /// The template provider and text generator are shared by every
    /// policy-driven agent in the run.
    pub fn with_providers(
        config: SimulationConfig,
        templates: Arc<dyn TemplateProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, ConfigError> {
        Self::build(config, Some((templates, generator)))
    }

    fn build(
        config: SimulationConfig,
        providers: Option<(Arc<dyn TemplateProvider>, Arc<dyn TextGenerator>)>,
    ) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;

        let mut agents = HashMap::new();
        let mut agent_order = Vec::with_capacity(config.agent_configs.len());
        let mut policies: HashMap<String, Box<dyn DecisionPolicy>> = HashMap::new();

        for agent_config in &config.agent_configs {
            let policy: Box<dyn DecisionPolicy> = match config.decision_mode {
                DecisionMode::RuleBased => {
                    let valuation = agent_config
                        .valuation_or_cost
                        .ok_or_else(|| ConfigError::MissingValuation(agent_config.agent_id.clone()))?;
                    Box::new(RuleBasedPolicy::new(valuation))
                }
                DecisionMode::PolicyDriven => {
                    let (templates, generator) =
                        providers.as_ref().ok_or(ConfigError::ProvidersRequired)?;
                    let key = agent_config
                        .decision_policy_key
                        .clone()
                        .ok_or_else(|| ConfigError::MissingPolicyKey(agent_config.agent_id.clone()))?;
                    Box::new(LlmPolicy::new(
                        key,
                        agent_config.valuation_or_cost,
                        Arc::clone(templates),
                        Arc::clone(generator),
                    ))
                }
            };

            agents.insert(
                agent_config.agent_id.clone(),
                Agent::from_config(agent_config),
            );
            agent_order.push(agent_config.agent_id.clone());
            policies.insert(agent_config.agent_id.clone(), policy);
        }

        Ok(Self {
            agents,
            agent_order,
            policies,
            state: MarketState::new(),
            rng: RngManager::new(config.rng_seed),
            num_rounds: config.num_rounds,
            history: Vec::with_capacity(config.num_rounds),
            event_log: EventLog::new(),
            operational_error: None,
        })
    }

    /// Validate configuration
    fn validate_config(config: &SimulationConfig) -> Result<(), ConfigError> {
        if config.agent_configs.is_empty() {
            return Err(ConfigError::NoAgents);
        }
        if config.num_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }

        let mut ids = HashSet::new();
        for agent_config in &config.agent_configs {
            if !ids.insert(&agent_config.agent_id) {
                return Err(ConfigError::DuplicateAgentId(agent_config.agent_id.clone()));
            }

            match agent_config.agent_type {
                AgentType::Buyer => match agent_config.initial_funds {
                    None => return Err(ConfigError::MissingFunds(agent_config.agent_id.clone())),
                    Some(funds) if funds < 0 => {
                        return Err(ConfigError::NegativeFunds(agent_config.agent_id.clone()))
                    }
                    Some(_) => {}
                },
                AgentType::Seller => {
                    if agent_config.initial_inventory.is_none() {
                        return Err(ConfigError::MissingInventory(agent_config.agent_id.clone()));
                    }
                }
            }

            match config.decision_mode {
                DecisionMode::RuleBased => match agent_config.valuation_or_cost {
                    Some(v) if v > 0 => {}
                    _ => return Err(ConfigError::MissingValuation(agent_config.agent_id.clone())),
                },
                DecisionMode::PolicyDriven => {
                    if agent_config.decision_policy_key.is_none() {
                        return Err(ConfigError::MissingPolicyKey(agent_config.agent_id.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the current round number
    pub fn current_round(&self) -> usize {
        self.state.current_round()
    }

    /// Check whether all rounds have run
    pub fn is_complete(&self) -> bool {
        self.state.current_round() >= self.num_rounds
    }

    /// Get reference to the live market state
    pub fn state(&self) -> &MarketState {
        &self.state
    }

    /// Get per-round market state snapshots so far
    pub fn history(&self) -> &[MarketState] {
        &self.history
    }

    /// Get the event log
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// First policy failure of the run, if any
    pub fn operational_error(&self) -> Option<&str> {
        self.operational_error.as_deref()
    }

    /// Get an agent by ID
    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    /// Iterate all agents in configuration order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agent_order.iter().filter_map(|id| self.agents.get(id))
    }

    // ========================================================================
    // Round Loop
    // ========================================================================

    /// Run all remaining rounds
    ///
    /// Idempotent: calling `run` on a completed simulation re-returns the
    /// existing history without executing anything.
    pub fn run(&mut self) -> Result<RunOutcome, SimulationError> {
        while !self.is_complete() {
            self.run_round()?;
        }
        Ok(RunOutcome {
            history: self.history.clone(),
            operational_error: self.operational_error.clone(),
        })
    }

    /// Execute one simulation round
    ///
    /// Returns `Ok(None)` if the simulation has already completed all its
    /// rounds.
    pub fn run_round(&mut self) -> Result<Option<RoundResult>, SimulationError> {
        if self.is_complete() {
            return Ok(None);
        }

        self.state.advance_round();
        let round = self.state.current_round();

        // STEP 1: DECISIONS
        // Every agent acts against the same frozen snapshot, in an order
        // shuffled fresh each round to avoid systematic first-mover bias.
        let snapshot = self.state.clone();
        let mut turn_order = self.agent_order.clone();
        self.rng.shuffle(&mut turn_order);

        let mut bids = Vec::new();
        let mut asks = Vec::new();
        let mut num_orders = 0;

        for agent_id in &turn_order {
            let agent = self
                .agents
                .get(agent_id)
                .ok_or_else(|| SimulationError::UnknownAgent(agent_id.clone()))?;
            let policy = self
                .policies
                .get_mut(agent_id)
                .ok_or_else(|| SimulationError::UnknownAgent(agent_id.clone()))?;

            match policy.decide(agent, &snapshot, &mut self.rng) {
                Err(err) => {
                    warn!("agent {} decision failed in round {}: {}", agent_id, round, err);
                    self.event_log.log(RoundEvent::DecisionFailure {
                        round,
                        agent_id: agent_id.clone(),
                        message: err.to_string(),
                    });
                    if self.operational_error.is_none() {
                        self.operational_error = Some(format!(
                            "agent '{}' failed to decide in round {}: {}",
                            agent_id, round, err
                        ));
                    }
                }
                Ok(None) => {}
                Ok(Some(order)) => match Self::validate_order(agent, &order) {
                    Err(reason) => {
                        warn!(
                            "discarding order from agent {} in round {}: {}",
                            agent_id, round, reason
                        );
                        self.event_log.log(RoundEvent::OrderRejected {
                            round,
                            agent_id: agent_id.clone(),
                            reason,
                        });
                    }
                    Ok(()) => {
                        self.event_log.log(RoundEvent::OrderAccepted {
                            round,
                            agent_id: agent_id.clone(),
                            side: order.side(),
                            price: order.price(),
                            quantity: order.quantity(),
                        });
                        num_orders += 1;
                        match order.side() {
                            Side::Bid => bids.push(order),
                            Side::Ask => asks.push(order),
                        }
                    }
                },
            }
        }

        // STEP 2: CLEARING
        let transactions = matching::clear(&mut bids, &mut asks, round);
        self.state.set_books(bids, asks);

        // STEP 3: RECORDING
        let num_transactions = transactions.len();
        let volume: u32 = transactions.iter().map(|tx| tx.quantity()).sum();
        if num_transactions > 0 {
            let notional: i64 = transactions.iter().map(|tx| tx.notional()).sum();
            let average_price = (notional as f64 / f64::from(volume)).round() as i64;
            self.state.push_price_point(PricePoint {
                round,
                average_price,
                volume,
                num_transactions,
            });
        }

        // STEP 4: SETTLEMENT
        for tx in &transactions {
            self.event_log.log(RoundEvent::Trade {
                round,
                buyer_id: tx.buyer_id().to_string(),
                seller_id: tx.seller_id().to_string(),
                price: tx.price(),
                quantity: tx.quantity(),
            });

            let buyer = self
                .agents
                .get_mut(tx.buyer_id())
                .ok_or_else(|| SimulationError::UnknownAgent(tx.buyer_id().to_string()))?;
            buyer
                .apply_purchase(tx.price(), tx.quantity())
                .map_err(|source| SimulationError::Settlement {
                    agent_id: tx.buyer_id().to_string(),
                    source,
                })?;

            let seller = self
                .agents
                .get_mut(tx.seller_id())
                .ok_or_else(|| SimulationError::UnknownAgent(tx.seller_id().to_string()))?;
            seller
                .apply_sale(tx.price(), tx.quantity())
                .map_err(|source| SimulationError::Settlement {
                    agent_id: tx.seller_id().to_string(),
                    source,
                })?;
        }
        self.state.record_transactions(transactions);

        // STEP 5: HISTORY
        self.history.push(self.state.clone());
        debug!(
            "round {} complete: {} orders, {} transactions, volume {}",
            round, num_orders, num_transactions, volume
        );

        Ok(Some(RoundResult {
            round,
            num_orders,
            num_transactions,
            volume,
        }))
    }

    /// Role and resource check for a proposed order (defense in depth - the
    /// policies already check, but an order an agent cannot honor must never
    /// reach the books)
    fn validate_order(agent: &Agent, order: &Order) -> Result<(), RejectReason> {
        match (order.side(), agent.agent_type()) {
            (Side::Bid, AgentType::Buyer) => {
                if agent.can_afford(order.notional()) {
                    Ok(())
                } else {
                    Err(RejectReason::InsufficientFunds)
                }
            }
            (Side::Ask, AgentType::Seller) => {
                if agent.can_supply(order.quantity()) {
                    Ok(())
                } else {
                    Err(RejectReason::InsufficientInventory)
                }
            }
            _ => Err(RejectReason::SideMismatch),
        }
    }
}
