//! LLM-delegated decision policy
//!
//! Pipeline per turn: fetch the persona template, render it against the
//! agent's view of the market, send the prompt to the generation provider,
//! parse the reply into an action, and validate it against the agent's role
//! and resources.
//!
//! Replies are accepted in two shapes:
//!
//! - a JSON object: `{"action": "bid", "price": 102.50, "quantity": 1}`
//!   (optionally inside a fenced code block, numbers-as-strings tolerated)
//! - the plain-line format: `BID: 102.50 QUANTITY: 1`, `ASK: …`, or `PASS`
//!
//! Field rules: `action` is case-insensitive bid/ask/pass; price must be a
//! positive amount; quantity a positive integer. A bid from a seller or an
//! ask from a buyer is rejected. A valid-looking order the agent cannot
//! afford or supply degrades to a pass rather than an error.

use super::providers::{TemplateProvider, TextGenerator};
use super::{DecisionError, DecisionPolicy};
use crate::models::agent::Agent;
use crate::models::config::AgentType;
use crate::models::order::{Order, Side};
use crate::models::state::MarketState;
use crate::models::transaction::Transaction;
use crate::rng::RngManager;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// How many book levels / recent trades the prompt summarizes
const SUMMARY_TOP_N: usize = 3;

/// Parsed policy reply, before role/resource validation
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParsedAction {
    Pass,
    Place { side: Side, price: i64, quantity: u32 },
}

/// Decision policy that delegates to an external text-generation provider
pub struct LlmPolicy {
    /// Template key from the agent's configuration
    policy_key: String,

    /// Reservation price for the prompt context, if configured (cents)
    valuation_or_cost: Option<i64>,

    templates: Arc<dyn TemplateProvider>,
    generator: Arc<dyn TextGenerator>,
}

impl LlmPolicy {
    /// Create a new policy bound to the injected collaborators
    pub fn new(
        policy_key: String,
        valuation_or_cost: Option<i64>,
        templates: Arc<dyn TemplateProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            policy_key,
            valuation_or_cost,
            templates,
            generator,
        }
    }

    /// Build the placeholder context for one decision
    fn build_context(&self, agent: &Agent, snapshot: &MarketState) -> HashMap<&'static str, String> {
        let reservation = self.valuation_or_cost.map(format_cents);
        let (valuation, cost) = match agent.agent_type() {
            AgentType::Buyer => (reservation.unwrap_or_else(|| "N/A".to_string()), "N/A".to_string()),
            AgentType::Seller => ("N/A".to_string(), reservation.unwrap_or_else(|| "N/A".to_string())),
        };

        let mut context = HashMap::new();
        context.insert("current_round", snapshot.current_round().to_string());
        context.insert("agent_funds", format_cents(agent.funds()));
        context.insert("agent_inventory", agent.inventory().to_string());
        context.insert("valuation", valuation);
        context.insert("cost", cost);
        context.insert(
            "market_bids_summary",
            summarize_orders(snapshot.bids(), true, SUMMARY_TOP_N),
        );
        context.insert(
            "market_asks_summary",
            summarize_orders(snapshot.asks(), false, SUMMARY_TOP_N),
        );
        context.insert(
            "recent_transactions_summary",
            summarize_transactions(snapshot.transaction_log(), SUMMARY_TOP_N),
        );
        context
    }
}

impl DecisionPolicy for LlmPolicy {
    fn decide(
        &mut self,
        agent: &Agent,
        snapshot: &MarketState,
        _rng: &mut RngManager,
    ) -> Result<Option<Order>, DecisionError> {
        let template = self
            .templates
            .get_template(&self.policy_key)
            .ok_or_else(|| DecisionError::TemplateNotFound(self.policy_key.clone()))?;

        let context = self.build_context(agent, snapshot);
        let rendered = render(&template.instructions, &context)?;

        let mut prompt = String::new();
        if let Some(persona) = &template.persona {
            prompt.push_str(persona);
            prompt.push_str("\n\n");
        }
        prompt.push_str(&rendered);
        if let Some(notes) = &template.output_notes {
            prompt.push_str("\n\n");
            prompt.push_str(notes);
        }

        let reply = self.generator.generate(&prompt)?;
        debug!(
            "agent {} round {} reply: {}",
            agent.agent_id(),
            snapshot.current_round(),
            reply.trim()
        );

        match parse_response(&reply)? {
            ParsedAction::Pass => Ok(None),
            ParsedAction::Place { side, price, quantity } => {
                match (side, agent.agent_type()) {
                    (Side::Bid, AgentType::Buyer) => {
                        if agent.can_afford(price * i64::from(quantity)) {
                            Ok(Some(Order::new(
                                agent.agent_id().to_string(),
                                Side::Bid,
                                price,
                                quantity,
                                snapshot.current_round(),
                            )))
                        } else {
                            Ok(None)
                        }
                    }
                    (Side::Ask, AgentType::Seller) => {
                        if agent.can_supply(quantity) {
                            Ok(Some(Order::new(
                                agent.agent_id().to_string(),
                                Side::Ask,
                                price,
                                quantity,
                                snapshot.current_round(),
                            )))
                        } else {
                            Ok(None)
                        }
                    }
                    _ => Err(DecisionError::WrongSide {
                        agent_id: agent.agent_id().to_string(),
                        side,
                    }),
                }
            }
        }
    }
}

/// Format cents as a 2-decimal amount string
fn format_cents(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

/// Render an instruction template, substituting `{placeholder}` slots
///
/// Unknown or unterminated placeholders fail the render; the agent passes
/// for the round instead of sending a half-formed prompt.
fn render(template: &str, context: &HashMap<&'static str, String>) -> Result<String, DecisionError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| DecisionError::MissingContext(after.trim().to_string()))?;
        let name = &after[..end];
        match context.get(name) {
            Some(value) => out.push_str(value),
            None => return Err(DecisionError::MissingContext(name.to_string())),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Summarize one side of the book for the prompt: top levels by price
fn summarize_orders(orders: &[Order], descending: bool, top_n: usize) -> String {
    if orders.is_empty() {
        return "None".to_string();
    }
    let mut sorted: Vec<&Order> = orders.iter().collect();
    if descending {
        sorted.sort_by(|a, b| b.price().cmp(&a.price()));
    } else {
        sorted.sort_by(|a, b| a.price().cmp(&b.price()));
    }
    sorted
        .iter()
        .take(top_n)
        .map(|o| format!("  - Price: {}, Qty: {}", format_cents(o.price()), o.quantity()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarize the most recent trades for the prompt
fn summarize_transactions(log: &[Transaction], top_n: usize) -> String {
    if log.is_empty() {
        return "None".to_string();
    }
    log[log.len().saturating_sub(top_n)..]
        .iter()
        .map(|tx| {
            format!(
                "  - Price: {}, Qty: {}, Round: {}",
                format_cents(tx.price()),
                tx.quantity(),
                tx.round()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip a Markdown code fence, if the reply is wrapped in one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence's info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a policy reply into an action
fn parse_response(text: &str) -> Result<ParsedAction, DecisionError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(DecisionError::MalformedResponse("empty response".to_string()));
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return parse_json_action(&value);
    }
    if let Some(action) = parse_line_action(body) {
        return Ok(action);
    }
    Err(DecisionError::MalformedResponse(format!(
        "unrecognized response: '{}'",
        body.trim()
    )))
}

fn parse_json_action(value: &Value) -> Result<ParsedAction, DecisionError> {
    let object = value
        .as_object()
        .ok_or_else(|| DecisionError::MalformedResponse("response is not a JSON object".to_string()))?;

    let action = object
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| DecisionError::MalformedResponse("missing 'action' field".to_string()))?;

    let side = match action.to_ascii_lowercase().as_str() {
        "pass" => return Ok(ParsedAction::Pass),
        "bid" => Side::Bid,
        "ask" => Side::Ask,
        other => {
            return Err(DecisionError::MalformedResponse(format!(
                "unknown action '{}'",
                other
            )))
        }
    };

    let price = json_price(object.get("price")).ok_or_else(|| {
        DecisionError::MalformedResponse("'price' is not a positive amount".to_string())
    })?;
    let quantity = json_quantity(object.get("quantity")).ok_or_else(|| {
        DecisionError::MalformedResponse("'quantity' is not a positive integer".to_string())
    })?;

    Ok(ParsedAction::Place { side, price, quantity })
}

/// Extract a positive price in cents from a JSON number or numeric string
fn json_price(value: Option<&Value>) -> Option<i64> {
    let amount = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    to_cents(amount)
}

/// Extract a positive integer quantity from a JSON number or numeric string
fn json_quantity(value: Option<&Value>) -> Option<u32> {
    let quantity = match value? {
        Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.trim().parse::<u32>().ok()?,
        _ => return None,
    };
    (quantity > 0).then_some(quantity)
}

/// Convert a decimal amount to positive cents
fn to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let cents = (amount * 100.0).round() as i64;
    (cents > 0).then_some(cents)
}

/// Fallback parser for the plain-line reply format
fn parse_line_action(body: &str) -> Option<ParsedAction> {
    let mut side = None;
    let mut price = None;
    let mut quantity = None;

    for line in body.lines() {
        let lower = line.to_ascii_lowercase();
        let trimmed = lower.trim();
        if trimmed == "pass" || (trimmed.starts_with("action") && trimmed.ends_with("pass")) {
            return Some(ParsedAction::Pass);
        }
        if price.is_none() {
            if let Some(p) = number_after(&lower, "bid:") {
                price = to_cents(p);
                side = Some(Side::Bid);
            } else if let Some(p) = number_after(&lower, "ask:") {
                price = to_cents(p);
                side = Some(Side::Ask);
            }
        }
        if quantity.is_none() {
            if let Some(q) = number_after(&lower, "quantity:") {
                if q > 0.0 && q.fract() == 0.0 {
                    quantity = u32::try_from(q as i64).ok();
                }
            }
        }
    }

    match (side, price, quantity) {
        (Some(side), Some(price), Some(quantity)) if quantity > 0 => {
            Some(ParsedAction::Place { side, price, quantity })
        }
        _ => None,
    }
}

/// First number following a `key:` marker on a lowercased line
fn number_after(line: &str, key: &str) -> Option<f64> {
    let idx = line.find(key)?;
    line[idx + key.len()..]
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .parse::<f64>()
        .ok()
}
