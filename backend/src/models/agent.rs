//! Agent model
//!
//! A market participant holding funds and inventory. Buyers open with their
//! configured funds and zero inventory; sellers open with zero funds and
//! their configured inventory. State changes only through the checked
//! settlement operations, which refuse to drive either balance negative.
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::config::{AgentConfig, AgentType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during agent settlement operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("insufficient inventory: required {required}, available {available}")]
    InsufficientInventory { required: u32, available: u32 },
}

/// A buyer or seller participating in the simulation
///
/// Created once at simulation setup from an [`AgentConfig`], mutated only by
/// the engine's settlement step, never destroyed mid-run.
///
/// # Example
/// ```
/// use market_simulator_core_rs::{Agent, AgentConfig};
///
/// let agent = Agent::from_config(&AgentConfig::buyer("b1", 100_000, 11_000));
/// assert_eq!(agent.funds(), 100_000); // $1,000.00 in cents
/// assert_eq!(agent.inventory(), 0);   // buyers start empty-handed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier
    agent_id: String,

    /// Market role
    agent_type: AgentType,

    /// Current funds (cents, never negative)
    funds: i64,

    /// Current inventory (units)
    inventory: u32,
}

impl Agent {
    /// Create a new agent with explicit opening balances
    ///
    /// # Panics
    /// Panics if funds < 0
    pub fn new(agent_id: String, agent_type: AgentType, funds: i64, inventory: u32) -> Self {
        assert!(funds >= 0, "funds must be non-negative");
        Self {
            agent_id,
            agent_type,
            funds,
            inventory,
        }
    }

    /// Create a runtime agent from a validated configuration
    ///
    /// Buyers open with (configured funds, 0 inventory); sellers with
    /// (0 funds, configured inventory).
    pub fn from_config(config: &AgentConfig) -> Self {
        match config.agent_type {
            AgentType::Buyer => Self::new(
                config.agent_id.clone(),
                AgentType::Buyer,
                config.initial_funds.unwrap_or(0),
                0,
            ),
            AgentType::Seller => Self::new(
                config.agent_id.clone(),
                AgentType::Seller,
                0,
                config.initial_inventory.unwrap_or(0),
            ),
        }
    }

    /// Get the agent ID
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Get the market role
    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    /// Get current funds (cents)
    pub fn funds(&self) -> i64 {
        self.funds
    }

    /// Get current inventory (units)
    pub fn inventory(&self) -> u32 {
        self.inventory
    }

    /// Check whether the agent can cover a cost out of current funds
    pub fn can_afford(&self, cost: i64) -> bool {
        cost <= self.funds
    }

    /// Check whether the agent can deliver a quantity out of current inventory
    pub fn can_supply(&self, quantity: u32) -> bool {
        quantity <= self.inventory
    }

    /// Settle the buying side of a trade: funds decrease by price x quantity,
    /// inventory increases by quantity
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::{Agent, AgentConfig};
    ///
    /// let mut buyer = Agent::from_config(&AgentConfig::buyer("b1", 100_000, 11_000));
    /// buyer.apply_purchase(9_500, 2).unwrap();
    /// assert_eq!(buyer.funds(), 81_000);
    /// assert_eq!(buyer.inventory(), 2);
    /// ```
    pub fn apply_purchase(&mut self, price: i64, quantity: u32) -> Result<(), AgentError> {
        let cost = price * i64::from(quantity);
        if cost > self.funds {
            return Err(AgentError::InsufficientFunds {
                required: cost,
                available: self.funds,
            });
        }
        self.funds -= cost;
        self.inventory += quantity;
        Ok(())
    }

    /// Settle the selling side of a trade: inventory decreases by quantity,
    /// funds increase by price x quantity
    pub fn apply_sale(&mut self, price: i64, quantity: u32) -> Result<(), AgentError> {
        if quantity > self.inventory {
            return Err(AgentError::InsufficientInventory {
                required: quantity,
                available: self.inventory,
            });
        }
        self.inventory -= quantity;
        self.funds += price * i64::from(quantity);
        Ok(())
    }
}
