//! Agent decision policies
//!
//! Every agent decides through the same seam: given a read-only market
//! snapshot, produce at most one order consistent with the agent's role and
//! resources, or pass. Two policies implement it:
//!
//! - [`RuleBasedPolicy`]: a deterministic heuristic around the agent's
//!   reservation price
//! - [`LlmPolicy`]: delegates to an injected text-generation provider and
//!   parses its reply into a validated order
//!
//! A policy failure ([`DecisionError`]) is local to one agent's turn. The
//! engine drops the action, records the failure in the event log, and keeps
//! the first failure message as the run's operational error.

use crate::models::agent::Agent;
use crate::models::order::{Order, Side};
use crate::models::state::MarketState;
use crate::rng::RngManager;
use thiserror::Error;

pub mod llm;
pub mod providers;
pub mod rule_based;

pub use llm::LlmPolicy;
pub use rule_based::RuleBasedPolicy;

/// Errors a decision policy can produce
///
/// None of these are fatal to the simulation: each one costs the failing
/// agent its action for the round, nothing more.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("no prompt template found for key '{0}'")]
    TemplateNotFound(String),

    #[error("prompt template has unresolved placeholder '{0}'")]
    MissingContext(String),

    #[error("text generation failed: {0}")]
    Generation(#[from] providers::GenerateError),

    #[error("could not parse policy response: {0}")]
    MalformedResponse(String),

    #[error("agent '{agent_id}' cannot place a {side}")]
    WrongSide { agent_id: String, side: Side },
}

/// The decision seam shared by all agent variants
///
/// Policies receive the deciding agent's current balances and a cloned
/// market snapshot; they never see live simulation state. All randomness
/// must come from the supplied RNG so runs stay reproducible.
pub trait DecisionPolicy {
    /// Produce exactly one order for the current round, or none (pass)
    fn decide(
        &mut self,
        agent: &Agent,
        snapshot: &MarketState,
        rng: &mut RngManager,
    ) -> Result<Option<Order>, DecisionError>;
}
