//! Market simulator CLI
//!
//! Runs a rule-based marketplace scenario and prints per-round summaries,
//! the aggregate price/volume series, and final agent balances.
//!
//! Agents are either generated from the population flags (valuations and
//! costs drawn uniformly from the given ranges, deterministically from the
//! seed) or loaded from a JSON scenario file.

use clap::Parser;
use log::info;
use market_simulator_core_rs::{
    report, AgentConfig, DecisionMode, MarketSeries, RngManager, Simulation, SimulationConfig,
};
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

/// Round-based double-auction market simulator
#[derive(Parser, Debug)]
#[command(name = "market-sim")]
#[command(about = "Run a rule-based marketplace simulation")]
#[command(version)]
struct Args {
    /// Number of buyer agents
    #[arg(long, default_value_t = 5)]
    buyers: usize,

    /// Number of seller agents
    #[arg(long, default_value_t = 5)]
    sellers: usize,

    /// Number of rounds to simulate
    #[arg(long, default_value_t = 20)]
    rounds: usize,

    /// RNG seed (same seed + same flags = same run)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Opening funds per buyer (e.g. 1000.00)
    #[arg(long, default_value_t = 1000.0)]
    funds: f64,

    /// Opening inventory per seller (units)
    #[arg(long, default_value_t = 50)]
    inventory: u32,

    /// Lower bound of buyer valuations
    #[arg(long, default_value_t = 100.0)]
    valuation_min: f64,

    /// Upper bound of buyer valuations
    #[arg(long, default_value_t = 150.0)]
    valuation_max: f64,

    /// Lower bound of seller costs
    #[arg(long, default_value_t = 80.0)]
    cost_min: f64,

    /// Upper bound of seller costs
    #[arg(long, default_value_t = 120.0)]
    cost_max: f64,

    /// JSON scenario file overriding the generated population
    #[arg(long)]
    scenario: Option<PathBuf>,
}

/// On-disk scenario: explicit agent configs plus an optional round count
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    agents: Vec<AgentConfig>,
    #[serde(default)]
    num_rounds: Option<usize>,
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn format_cents(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

/// Generate a buyer/seller population from the CLI flags
fn generate_agents(args: &Args) -> Vec<AgentConfig> {
    // Valuation draws get their own generator so the engine's seed usage
    // stays independent of population size
    let mut rng = RngManager::new(args.seed.wrapping_add(1));
    let mut draw = |min: f64, max: f64| {
        if min < max {
            rng.uniform(min, max)
        } else {
            min
        }
    };
    let mut agents = Vec::with_capacity(args.buyers + args.sellers);

    for i in 0..args.buyers {
        let valuation = to_cents(draw(args.valuation_min, args.valuation_max));
        agents.push(AgentConfig::buyer(
            format!("buyer_{}", i + 1),
            to_cents(args.funds),
            valuation,
        ));
    }
    for i in 0..args.sellers {
        let cost = to_cents(draw(args.cost_min, args.cost_max));
        agents.push(AgentConfig::seller(
            format!("seller_{}", i + 1),
            args.inventory,
            cost,
        ));
    }
    agents
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let (agent_configs, num_rounds) = match &args.scenario {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let scenario: ScenarioFile = serde_json::from_str(&raw)?;
            let rounds = scenario.num_rounds.unwrap_or(args.rounds);
            (scenario.agents, rounds)
        }
        None => (generate_agents(&args), args.rounds),
    };

    info!(
        "starting simulation: {} agents, {} rounds, seed {}",
        agent_configs.len(),
        num_rounds,
        args.seed
    );

    let config = SimulationConfig {
        agent_configs,
        num_rounds,
        decision_mode: DecisionMode::RuleBased,
        rng_seed: args.seed,
    };
    let mut simulation = Simulation::new(config)?;
    let outcome = simulation.run()?;

    for state in &outcome.history {
        let round = state.current_round();
        println!("--- Round {} ---", round);
        let trades: Vec<_> = state.transactions_in_round(round).collect();
        if trades.is_empty() {
            println!("  no transactions");
        } else {
            for tx in &trades {
                println!(
                    "  {} buys from {} - Qty: {}, Price: {}",
                    tx.buyer_id(),
                    tx.seller_id(),
                    tx.quantity(),
                    format_cents(tx.price())
                );
            }
            if let Some(point) = state.price_point_for_round(round) {
                println!(
                    "  avg price {}, volume {}",
                    format_cents(point.average_price),
                    point.volume
                );
            }
        }
    }

    let series = MarketSeries::from_history(&outcome.history);
    println!("\n--- Series ---");
    for i in 0..series.len() {
        println!(
            "round {:>3}: avg {:>8}  volume {:>4}  trades {:>3}",
            series.rounds[i],
            series.average_prices[i]
                .map(format_cents)
                .unwrap_or_else(|| "-".to_string()),
            series.volumes[i],
            series.transaction_counts[i]
        );
    }
    println!(
        "total transactions: {}",
        report::all_transactions(&outcome.history).len()
    );

    println!("\n--- Final Agent States ---");
    for agent in simulation.agents() {
        println!(
            "  {:<12} funds {:>10}  inventory {:>4}",
            agent.agent_id(),
            format_cents(agent.funds()),
            agent.inventory()
        );
    }

    if let Some(message) = simulation.operational_error() {
        eprintln!("\noperational error: {}", message);
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
