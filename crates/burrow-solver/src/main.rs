//! CLI entry point for the burrow solver.
//!
//! Usage:
//!   burrow-solver solve <burrow.txt> [options]
//!   burrow-solver solve --stdin [options]
//!   burrow-solver both <burrow.txt> [options]
//!
//! Options:
//!   --unfold                 Insert the two extra compartment rows first (solve only)
//!   --policy <policy>        min-cost (default) or first-seen
//!   --max-expansions <n>     Stop after n expansions
//!   --timeout <seconds>      Stop after this many seconds
//!   --show-path              Include the winning moves in the report
//!   -v, -vv                  Log progress to stderr

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use burrow_solver::{
    solve_board, Board, Layout, Move, SearchConfig, SearchStats, SolveError, Termination,
    VisitPolicy, UNFOLD_ROWS,
};

#[derive(Parser)]
#[command(name = "burrow-solver")]
#[command(about = "Minimum-cost solver for the burrow room-packing puzzle")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one burrow
    Solve {
        #[command(flatten)]
        input: InputArgs,

        /// Insert the extra compartment rows before solving
        #[arg(long)]
        unfold: bool,

        #[command(flatten)]
        search: SearchArgs,
    },
    /// Solve the burrow as given and its unfolded variant
    Both {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to the burrow layout (use --stdin to read from stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Read the layout from stdin instead of a file
    #[arg(long)]
    stdin: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// How revisited layouts are handled
    #[arg(long, value_enum, default_value_t = PolicyArg::MinCost)]
    policy: PolicyArg,

    /// Stop after this many expansions
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Maximum search time in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Include the winning moves in the report
    #[arg(long)]
    show_path: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    MinCost,
    FirstSeen,
}

impl From<PolicyArg> for VisitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::MinCost => VisitPolicy::MinCost,
            PolicyArg::FirstSeen => VisitPolicy::FirstSeen,
        }
    }
}

/// Output format for one solved (or unsolved) burrow
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    unfolded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    termination: Option<Termination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SearchStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<Move>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (input, search, variants) = match cli.command {
        Commands::Solve {
            input,
            unfold,
            search,
        } => (input, search, vec![unfold]),
        Commands::Both { input, search } => (input, search, vec![false, true]),
    };

    let text = match read_input(&input) {
        Ok(text) => text,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::from(2);
        }
    };

    let layout = match Layout::parse(&text) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error parsing burrow layout: {e}");
            return ExitCode::from(2);
        }
    };

    // Build search config
    let config = SearchConfig {
        policy: search.policy.into(),
        max_expansions: search.max_expansions,
        timeout: search.timeout.map(Duration::from_secs),
    };

    let mut outputs = Vec::with_capacity(variants.len());
    for unfold in variants {
        match run(&layout, unfold, &config, search.show_path) {
            Ok(output) => outputs.push(output),
            Err(e) => {
                eprintln!("Error parsing burrow layout: {e}");
                return ExitCode::from(2);
            }
        }
    }

    let all_solved = outputs.iter().all(|o| o.solved);
    let rendered = if outputs.len() == 1 {
        serde_json::to_string_pretty(&outputs[0])
    } else {
        serde_json::to_string_pretty(&outputs)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error writing report: {e}");
            return ExitCode::FAILURE;
        }
    }

    if all_solved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &InputArgs) -> Result<String, String> {
    if input.stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("failed to read from stdin: {e}"))?;
        Ok(buffer)
    } else if let Some(path) = &input.file {
        fs::read_to_string(path).map_err(|e| format!("failed to read file {path:?}: {e}"))
    } else {
        Err("must provide either a file path or --stdin".to_string())
    }
}

/// Solve one variant. Only layout errors are returned as `Err`; search
/// outcomes are folded into the report.
fn run(
    layout: &Layout,
    unfold: bool,
    config: &SearchConfig,
    show_path: bool,
) -> Result<SolveOutput, SolveError> {
    let board = if unfold {
        Board::from_layout(&layout.clone().unfolded(&UNFOLD_ROWS)?)?
    } else {
        Board::from_layout(layout)?
    };

    let output = match solve_board(board, config) {
        Ok(solution) => SolveOutput {
            solved: true,
            unfolded: unfold,
            cost: Some(solution.cost),
            reason: None,
            termination: Some(Termination::Exhausted),
            stats: Some(solution.stats),
            moves: show_path.then_some(solution.moves),
        },
        Err(e @ SolveError::MalformedLayout(_)) => return Err(e),
        Err(e) => {
            let termination = match &e {
                SolveError::BudgetExhausted { termination, .. } => *termination,
                _ => Termination::Exhausted,
            };
            SolveOutput {
                solved: false,
                unfolded: unfold,
                cost: None,
                reason: Some(e.to_string()),
                termination: Some(termination),
                stats: None,
                moves: None,
            }
        }
    };
    Ok(output)
}
