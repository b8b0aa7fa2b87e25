//! Collaborator contracts for policy-driven agents
//!
//! The core never talks to a language-model API or reads template files
//! directly. It consumes two injected interfaces:
//!
//! - [`TemplateProvider`]: persona/instruction templates keyed by the agent
//!   config's `decision_policy_key`
//! - [`TextGenerator`]: synchronous text generation with a single failure
//!   outcome (retries, if any, are the provider's concern)
//!
//! Any storage format for templates and any wire protocol for generation
//! belong to the implementations, outside this crate's scope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A persona/instruction template for a policy-driven agent
///
/// `instructions` carries named `{placeholder}` slots matching the decision
/// context keys (current_round, agent_funds, agent_inventory, valuation,
/// cost, market_bids_summary, market_asks_summary,
/// recent_transactions_summary). `persona` and `output_notes` are prepended
/// and appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Role-setting preamble
    #[serde(default)]
    pub persona: Option<String>,

    /// Templated instruction body
    pub instructions: String,

    /// Expected-output reminder appended after the instructions
    #[serde(default)]
    pub output_notes: Option<String>,
}

impl PromptTemplate {
    /// Create a template with instructions only
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            persona: None,
            instructions: instructions.into(),
            output_notes: None,
        }
    }

    /// Set the persona preamble
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Set the output-format reminder
    pub fn with_output_notes(mut self, notes: impl Into<String>) -> Self {
        self.output_notes = Some(notes.into());
        self
    }
}

/// Source of decision-policy templates
pub trait TemplateProvider {
    /// Look up a template by key; `None` means not found
    fn get_template(&self, key: &str) -> Option<PromptTemplate>;
}

/// Errors from the text-generation provider
///
/// All variants collapse to "no response" from the core's perspective; the
/// message is surfaced once per run as the operational error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("authorization failed: {0}")]
    Unauthorized(String),

    #[error("response blocked or empty: {0}")]
    Blocked(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// External text-generation service
pub trait TextGenerator {
    /// Generate a completion for the rendered prompt
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// In-memory template provider
///
/// Used by tests and embedded defaults; production callers may implement
/// [`TemplateProvider`] over whatever storage they like.
///
/// # Example
/// ```
/// use market_simulator_core_rs::{PromptTemplate, StaticTemplateProvider, TemplateProvider};
///
/// let provider = StaticTemplateProvider::new()
///     .with("buyer_default", PromptTemplate::new("Round {current_round}: decide."));
///
/// assert!(provider.get_template("buyer_default").is_some());
/// assert!(provider.get_template("missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateProvider {
    templates: HashMap<String, PromptTemplate>,
}

impl StaticTemplateProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a key (builder style)
    pub fn with(mut self, key: impl Into<String>, template: PromptTemplate) -> Self {
        self.templates.insert(key.into(), template);
        self
    }

    /// Register a template under a key
    pub fn insert(&mut self, key: impl Into<String>, template: PromptTemplate) {
        self.templates.insert(key.into(), template);
    }
}

impl TemplateProvider for StaticTemplateProvider {
    fn get_template(&self, key: &str) -> Option<PromptTemplate> {
        self.templates.get(key).cloned()
    }
}
