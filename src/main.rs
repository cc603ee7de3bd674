//! expense-settlement CLI
//!
//! Split expenses and simplify debts from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Split a total under a policy
//! expense-settlement split --input dinner.json
//!
//! # Simplify a set of debts, output as JSON
//! expense-settlement simplify --input debts.json --format json
//!
//! # Generate a random debt network for testing
//! expense-settlement generate --participants 10 --debts 30
//! ```

use expense_settlement::config::EngineLimits;
use expense_settlement::core::debt::{DebtEdge, DebtSet};
use expense_settlement::core::user::UserId;
use expense_settlement::graph::debt_graph::DebtGraph;
use expense_settlement::optimization::netting::DebtNettingOptimizer;
use expense_settlement::settlement::engine::preview_split;
use expense_settlement::settlement::guard::SettlementGuard;
use expense_settlement::simulation::debt_network::{generate_debt_network, NetworkConfig};
use expense_settlement::split::policy::SplitPolicy;
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"expense-settlement: shared-expense splitting and debt simplification

USAGE:
    expense-settlement <COMMAND> [OPTIONS]

COMMANDS:
    split       Divide a total among participants under a split policy
    simplify    Reduce a set of debts to fewer direct transfers
    generate    Generate a random debt network (for testing)
    help        Show this message

OPTIONS (split):
    --input <FILE>      Path to JSON split request
    --format <FORMAT>   Output format: text (default) or json
    --limits <FILE>     JSON file overriding engine limits

OPTIONS (simplify):
    --input <FILE>      Path to JSON debts file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --participants <N>  Number of participants (default: 10)
    --debts <N>         Number of debts (default: 30)
    --seed <N>          Seed for a reproducible network
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    expense-settlement split --input dinner.json
    expense-settlement simplify --input debts.json --format json
    expense-settlement generate --participants 20 --debts 60 --output debts.json"#
    );
}

/// JSON schema for a split request.
#[derive(serde::Deserialize)]
struct SplitRequest {
    total: Decimal,
    policy: SplitPolicy,
}

/// JSON schema for input debts.
#[derive(serde::Deserialize, serde::Serialize)]
struct DebtInput {
    from: String,
    to: String,
    amount: String,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct DebtsFile {
    debts: Vec<DebtInput>,
}

/// JSON output schema for simplified debts.
#[derive(serde::Serialize)]
struct SimplifyOutput {
    debts_in: usize,
    transfers_out: usize,
    gross_total: String,
    net_total: String,
    savings_percent: f64,
    valid: bool,
    transfers: Vec<DebtInput>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("Error reading file '{}': {}", path, e)))
}

fn load_limits(path: &str) -> EngineLimits {
    EngineLimits::from_json_str(&read_file(path))
        .unwrap_or_else(|e| fail(format!("Error parsing limits '{}': {}", path, e)))
}

fn load_debts(path: &str) -> DebtSet {
    let file: DebtsFile = serde_json::from_str(&read_file(path)).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "debts": [
    {{ "from": "alice", "to": "bob", "amount": "25.00" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut set = DebtSet::new();
    for debt in file.debts {
        let amount: Decimal = debt
            .amount
            .parse()
            .unwrap_or_else(|e| fail(format!("Invalid amount '{}': {}", debt.amount, e)));
        let edge = DebtEdge::try_new(UserId::new(&debt.from), UserId::new(&debt.to), amount)
            .unwrap_or_else(|e| fail(format!("Invalid debt: {}", e)));
        set.add(edge);
    }
    set
}

/// Options shared by commands that read an input file.
struct InputOptions {
    input: String,
    format: String,
    limits: Option<String>,
}

fn parse_input_options(args: &[String], allow_limits: bool) -> InputOptions {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut limits = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--format" => {
                i += 1;
                format = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail("--format requires 'text' or 'json'"));
            }
            "--limits" if allow_limits => {
                i += 1;
                limits = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--limits requires a file path")),
                );
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    InputOptions {
        input: input_path.unwrap_or_else(|| fail("Error: --input <FILE> is required")),
        format,
        limits,
    }
}

fn cmd_split(args: &[String]) {
    let options = parse_input_options(args, true);
    let limits = options.limits.as_deref().map(load_limits).unwrap_or_default();
    let request: SplitRequest = serde_json::from_str(&read_file(&options.input))
        .unwrap_or_else(|e| fail(format!("Error parsing JSON: {}", e)));

    let guard = SettlementGuard::new(limits);
    let result = preview_split(&guard, request.total, &request.policy)
        .unwrap_or_else(|e| fail(format!("Split rejected: {}", e)));

    if options.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        println!("=== {} Split ===", request.policy.split_type());
        println!("Total:          {}", result.total_amount);
        for p in &result.participants {
            println!("  {:<16} {:>12} ({}%)", p.user_id.to_string(), p.amount, p.percentage);
        }
        println!("Allocated:      {}", result.allocated_total());
    }
}

fn cmd_simplify(args: &[String]) {
    let options = parse_input_options(args, false);
    let set = load_debts(&options.input);
    let graph = DebtGraph::from_debts(&set);
    let plan = DebtNettingOptimizer::optimize_components(&graph);

    if options.format == "json" {
        let output = SimplifyOutput {
            debts_in: plan.raw_count(),
            transfers_out: plan.transfer_count(),
            gross_total: plan.gross_total().to_string(),
            net_total: plan.net_total().to_string(),
            savings_percent: plan.savings_ratio() * 100.0,
            valid: plan.is_valid(),
            transfers: plan
                .transfers()
                .iter()
                .map(|t| DebtInput {
                    from: t.from.to_string(),
                    to: t.to.to_string(),
                    amount: t.amount.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}", plan);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = NetworkConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                config.participant_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--participants requires a number"));
            }
            "--debts" => {
                i += 1;
                config.debt_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--debts requires a number"));
            }
            "--seed" => {
                i += 1;
                config.seed = Some(
                    args.get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| fail("--seed requires a number")),
                );
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let set = generate_debt_network(&config);
    let output = DebtsFile {
        debts: set
            .edges()
            .iter()
            .map(|edge| DebtInput {
                from: edge.from().to_string(),
                to: edge.to().to_string(),
                amount: edge.amount().to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("Error writing to '{}': {}", path, e)));
        eprintln!(
            "Generated {} debts across {} participants → {}",
            set.len(),
            config.participant_count,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "split" => cmd_split(rest),
        "simplify" => cmd_simplify(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
