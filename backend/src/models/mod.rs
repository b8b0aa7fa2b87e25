//! Domain models for the market simulator

pub mod agent;
pub mod config;
pub mod event;
pub mod order;
pub mod state;
pub mod transaction;

// Re-exports
pub use agent::{Agent, AgentError};
pub use config::{AgentConfig, AgentType, DecisionMode};
pub use event::{EventLog, RejectReason, RoundEvent};
pub use order::{Order, Side};
pub use state::{MarketState, PricePoint};
pub use transaction::Transaction;
