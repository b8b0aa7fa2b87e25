//! Market Simulator Core - Rust Engine
//!
//! Round-based double-auction marketplace simulator with deterministic execution.
//!
//! # Architecture
//!
//! - **models**: Domain types (AgentConfig, Order, Transaction, MarketState, Agent)
//! - **decision**: Agent decision policies (rule-based and LLM-delegated)
//! - **matching**: Periodic double-auction clearing
//! - **orchestrator**: Round loop and settlement
//! - **report**: Per-round display aggregation
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Agent funds and inventory never go negative

// Module declarations
pub mod decision;
pub mod matching;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod rng;

// Re-exports for convenience
pub use decision::{
    providers::{GenerateError, PromptTemplate, StaticTemplateProvider, TemplateProvider, TextGenerator},
    DecisionError, DecisionPolicy,
};
pub use models::{
    agent::{Agent, AgentError},
    config::{AgentConfig, AgentType, DecisionMode},
    event::{EventLog, RejectReason, RoundEvent},
    order::{Order, Side},
    state::{MarketState, PricePoint},
    transaction::Transaction,
};
pub use orchestrator::{
    ConfigError, RoundResult, RunOutcome, Simulation, SimulationConfig, SimulationError,
};
pub use report::MarketSeries;
pub use rng::RngManager;
