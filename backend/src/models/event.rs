//! Event logging for simulation auditing.
//!
//! The round loop records every significant per-agent outcome here: orders
//! accepted into the books, orders discarded by validation, policy decision
//! failures, and cleared trades. The caller-facing run outcome stays
//! summary-level (at most one operational-error message); this log is the
//! in-memory audit trail behind it.

use crate::models::order::Side;

/// Why the engine discarded an agent's order before matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A buyer submitted an ask, or a seller a bid
    SideMismatch,
    /// Bid cost exceeds the buyer's current funds
    InsufficientFunds,
    /// Ask quantity exceeds the seller's current inventory
    InsufficientInventory,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::SideMismatch => write!(f, "order side does not match agent role"),
            RejectReason::InsufficientFunds => write!(f, "insufficient funds"),
            RejectReason::InsufficientInventory => write!(f, "insufficient inventory"),
        }
    }
}

/// Simulation event capturing one per-round outcome.
///
/// All events carry the round they occurred in; within a round they are
/// logged in occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    /// An agent's order passed validation and entered the books
    OrderAccepted {
        round: usize,
        agent_id: String,
        side: Side,
        price: i64,
        quantity: u32,
    },

    /// An agent's order was discarded by the engine's validation pass
    OrderRejected {
        round: usize,
        agent_id: String,
        reason: RejectReason,
    },

    /// A decision policy failed to produce an action
    DecisionFailure {
        round: usize,
        agent_id: String,
        message: String,
    },

    /// A trade cleared between two agents
    Trade {
        round: usize,
        buyer_id: String,
        seller_id: String,
        price: i64,
        quantity: u32,
    },
}

impl RoundEvent {
    /// Get the round this event occurred in
    pub fn round(&self) -> usize {
        match self {
            RoundEvent::OrderAccepted { round, .. } => *round,
            RoundEvent::OrderRejected { round, .. } => *round,
            RoundEvent::DecisionFailure { round, .. } => *round,
            RoundEvent::Trade { round, .. } => *round,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            RoundEvent::OrderAccepted { .. } => "OrderAccepted",
            RoundEvent::OrderRejected { .. } => "OrderRejected",
            RoundEvent::DecisionFailure { .. } => "DecisionFailure",
            RoundEvent::Trade { .. } => "Trade",
        }
    }

    /// Get the primary agent this event relates to
    ///
    /// For trades this is the buyer; the seller is reachable through the
    /// event payload.
    pub fn agent_id(&self) -> &str {
        match self {
            RoundEvent::OrderAccepted { agent_id, .. } => agent_id,
            RoundEvent::OrderRejected { agent_id, .. } => agent_id,
            RoundEvent::DecisionFailure { agent_id, .. } => agent_id,
            RoundEvent::Trade { buyer_id, .. } => buyer_id,
        }
    }
}

/// Append-only event log with simple query helpers.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RoundEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    /// Get events for a specific round
    pub fn events_in_round(&self, round: usize) -> Vec<&RoundEvent> {
        self.events.iter().filter(|e| e.round() == round).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&RoundEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events whose primary agent matches
    pub fn events_for_agent(&self, agent_id: &str) -> Vec<&RoundEvent> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == agent_id)
            .collect()
    }
}
