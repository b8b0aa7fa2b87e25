//! Policy-driven decision pipeline tests
//!
//! Exercises the full contract: template lookup, prompt rendering against
//! the market snapshot, provider failures, reply parsing, and role/resource
//! validation.

use market_simulator_core_rs::decision::{DecisionError, DecisionPolicy, LlmPolicy};
use market_simulator_core_rs::{
    Agent, AgentConfig, GenerateError, MarketState, Order, PromptTemplate, RngManager, Side,
    StaticTemplateProvider, TemplateProvider, TextGenerator, Transaction,
};
use std::cell::RefCell;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

/// Returns a fixed reply and records the prompt it was asked
struct CapturingGenerator {
    reply: String,
    last_prompt: RefCell<Option<String>>,
}

impl CapturingGenerator {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            last_prompt: RefCell::new(None),
        }
    }

    fn prompt(&self) -> String {
        self.last_prompt.borrow().clone().unwrap_or_default()
    }
}

impl TextGenerator for CapturingGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        *self.last_prompt.borrow_mut() = Some(prompt.to_string());
        Ok(self.reply.clone())
    }
}

struct FailingGenerator(GenerateError);

impl TextGenerator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(self.0.clone())
    }
}

fn buyer_agent(funds: i64) -> Agent {
    Agent::from_config(&AgentConfig::buyer("b1", funds, 0))
}

fn seller_agent(inventory: u32) -> Agent {
    Agent::from_config(&AgentConfig::seller("s1", inventory, 0))
}

fn templates_with(key: &str, template: PromptTemplate) -> Arc<dyn TemplateProvider> {
    Arc::new(StaticTemplateProvider::new().with(key, template))
}

fn policy(
    key: &str,
    valuation: Option<i64>,
    templates: Arc<dyn TemplateProvider>,
    generator: Arc<dyn TextGenerator>,
) -> LlmPolicy {
    LlmPolicy::new(key.to_string(), valuation, templates, generator)
}

// ============================================================================
// Template and Rendering
// ============================================================================

#[test]
fn test_missing_template_fails_the_turn() {
    let generator = Arc::new(CapturingGenerator::new("PASS"));
    let mut policy = policy(
        "unknown_key",
        None,
        Arc::new(StaticTemplateProvider::new()),
        generator,
    );

    let err = policy
        .decide(&buyer_agent(10_000), &MarketState::new(), &mut RngManager::new(1))
        .unwrap_err();
    assert!(matches!(err, DecisionError::TemplateNotFound(key) if key == "unknown_key"));
}

#[test]
fn test_unknown_placeholder_fails_the_turn() {
    let templates = templates_with("k", PromptTemplate::new("Today is {weekday}."));
    let generator = Arc::new(CapturingGenerator::new("PASS"));
    let mut policy = policy("k", None, templates, generator);

    let err = policy
        .decide(&buyer_agent(10_000), &MarketState::new(), &mut RngManager::new(1))
        .unwrap_err();
    assert!(matches!(err, DecisionError::MissingContext(name) if name == "weekday"));
}

#[test]
fn test_prompt_carries_market_context() {
    let templates = templates_with(
        "k",
        PromptTemplate::new(
            "Round {current_round}. Funds {agent_funds}. Valuation {valuation}. \
             Bids:\n{market_bids_summary}\nAsks:\n{market_asks_summary}\n\
             Recent:\n{recent_transactions_summary}",
        )
        .with_persona("You are a careful buyer.")
        .with_output_notes("Reply as JSON."),
    );
    let generator = Arc::new(CapturingGenerator::new("PASS"));
    let gen_dyn: Arc<dyn TextGenerator> = generator.clone();
    let mut policy = policy("k", Some(12_000), Arc::clone(&templates), gen_dyn);

    let mut state = MarketState::new();
    state.advance_round();
    state.set_books(
        vec![
            Order::new("other_buyer".to_string(), Side::Bid, 9_000, 1, 1),
            Order::new("keen_buyer".to_string(), Side::Bid, 10_000, 2, 1),
        ],
        vec![Order::new("a_seller".to_string(), Side::Ask, 11_000, 1, 1)],
    );
    state.record_transactions(vec![Transaction::new(
        "x".to_string(),
        "y".to_string(),
        9_800,
        3,
        1,
    )]);

    let decision = policy
        .decide(&buyer_agent(95_000), &state, &mut RngManager::new(1))
        .unwrap();
    assert!(decision.is_none()); // PASS

    let prompt = generator.prompt();
    assert!(prompt.starts_with("You are a careful buyer."));
    assert!(prompt.ends_with("Reply as JSON."));
    assert!(prompt.contains("Round 1."));
    assert!(prompt.contains("Funds 950.00."));
    assert!(prompt.contains("Valuation 120.00."));
    // Bids summarized best-first
    assert!(prompt.contains("Price: 100.00, Qty: 2\n  - Price: 90.00, Qty: 1"));
    assert!(prompt.contains("Price: 110.00, Qty: 1"));
    assert!(prompt.contains("Price: 98.00, Qty: 3, Round: 1"));
}

#[test]
fn test_seller_context_labels_cost() {
    let templates = templates_with("k", PromptTemplate::new("Cost {cost}, valuation {valuation}."));
    let generator = Arc::new(CapturingGenerator::new("PASS"));
    let gen_dyn: Arc<dyn TextGenerator> = generator.clone();
    let mut policy = policy("k", Some(8_500), Arc::clone(&templates), gen_dyn);

    policy
        .decide(&seller_agent(3), &MarketState::new(), &mut RngManager::new(1))
        .unwrap();
    let prompt = generator.prompt();
    assert!(prompt.contains("Cost 85.00"));
    assert!(prompt.contains("valuation N/A"));
}

// ============================================================================
// Provider Failures
// ============================================================================

#[test]
fn test_generation_failure_propagates_as_decision_error() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(FailingGenerator(GenerateError::Unauthorized(
        "bad api key".to_string(),
    )));
    let mut policy = policy("k", None, templates, generator);

    let err = policy
        .decide(&buyer_agent(10_000), &MarketState::new(), &mut RngManager::new(1))
        .unwrap_err();
    assert!(matches!(err, DecisionError::Generation(_)));
    assert!(err.to_string().contains("bad api key"));
}

// ============================================================================
// Reply Validation
// ============================================================================

#[test]
fn test_valid_bid_becomes_an_order() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(CapturingGenerator::new(
        r#"{"action": "bid", "price": 101.25, "quantity": 2}"#,
    ));
    let mut policy = policy("k", None, templates, generator);

    let mut state = MarketState::new();
    state.advance_round();

    let order = policy
        .decide(&buyer_agent(100_000), &state, &mut RngManager::new(1))
        .unwrap()
        .expect("affordable bid accepted");
    assert_eq!(order.side(), Side::Bid);
    assert_eq!(order.price(), 10_125);
    assert_eq!(order.quantity(), 2);
    assert_eq!(order.round(), 1);
    assert_eq!(order.agent_id(), "b1");
}

#[test]
fn test_ask_from_buyer_is_rejected() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(CapturingGenerator::new(
        r#"{"action": "ask", "price": 95.00, "quantity": 1}"#,
    ));
    let mut policy = policy("k", None, templates, generator);

    let err = policy
        .decide(&buyer_agent(100_000), &MarketState::new(), &mut RngManager::new(1))
        .unwrap_err();
    assert!(matches!(
        err,
        DecisionError::WrongSide { ref agent_id, side: Side::Ask } if agent_id == "b1"
    ));
}

#[test]
fn test_unaffordable_bid_degrades_to_pass() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(CapturingGenerator::new(
        r#"{"action": "bid", "price": 500.00, "quantity": 3}"#,
    ));
    let mut policy = policy("k", None, templates, generator);

    let decision = policy
        .decide(&buyer_agent(1_000), &MarketState::new(), &mut RngManager::new(1))
        .unwrap();
    assert!(decision.is_none());
}

#[test]
fn test_oversized_ask_degrades_to_pass() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(CapturingGenerator::new("ASK: 95.00 QUANTITY: 10"));
    let mut policy = policy("k", None, templates, generator);

    let decision = policy
        .decide(&seller_agent(2), &MarketState::new(), &mut RngManager::new(1))
        .unwrap();
    assert!(decision.is_none());
}

#[test]
fn test_line_format_ask_accepted() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(CapturingGenerator::new("ASK: 95.50\nQUANTITY: 2"));
    let mut policy = policy("k", None, templates, generator);

    let order = policy
        .decide(&seller_agent(5), &MarketState::new(), &mut RngManager::new(1))
        .unwrap()
        .unwrap();
    assert_eq!(order.side(), Side::Ask);
    assert_eq!(order.price(), 9_550);
    assert_eq!(order.quantity(), 2);
}

#[test]
fn test_malformed_reply_is_an_error_not_a_panic() {
    let templates = templates_with("k", PromptTemplate::new("Decide."));
    let generator = Arc::new(CapturingGenerator::new("maybe tomorrow"));
    let mut policy = policy("k", None, templates, generator);

    let err = policy
        .decide(&buyer_agent(10_000), &MarketState::new(), &mut RngManager::new(1))
        .unwrap_err();
    assert!(matches!(err, DecisionError::MalformedResponse(_)));
}
