//! Orchestrator - the round loop
//!
//! Drives the simulation through its rounds: gather decisions, clear the
//! batch, settle, record history.
//!
//! See `engine.rs` for full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{
    ConfigError, RoundResult, RunOutcome, Simulation, SimulationConfig, SimulationError,
};
