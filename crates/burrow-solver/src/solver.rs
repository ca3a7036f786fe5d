//! Depth-first best-cost search over burrow configurations.
//!
//! The frontier is a plain stack. A configuration is discarded when it
//! already costs more than the best sorted configuration found, or when its
//! layout was reached before at no greater cost. The search ends when the
//! stack is empty, or earlier when a configured budget runs out.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, LayoutKey};
use crate::error::SolveError;
use crate::state::{Configuration, Move};

/// How the visited map treats a layout that was reached before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitPolicy {
    /// Keep the cheapest cost seen per layout and expand again whenever a
    /// cheaper path arrives. Always finds the minimum.
    #[default]
    MinCost,
    /// Never expand a layout twice. Explores fewer configurations but,
    /// under depth-first order, can miss the minimum.
    FirstSeen,
}

/// Configuration for the search
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub policy: VisitPolicy,
    /// Stop after this many configurations have been expanded
    pub max_expansions: Option<usize>,
    /// Stop once this much time has passed
    pub timeout: Option<Duration>,
}

/// Why the search loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The frontier emptied; the best cost, if any, is the minimum
    Exhausted,
    ExpansionCap,
    Timeout,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exhausted => write!(f, "exhausted"),
            Termination::ExpansionCap => write!(f, "expansion cap"),
            Termination::Timeout => write!(f, "timeout"),
        }
    }
}

/// Counters collected while searching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Configurations that passed both pruning checks
    pub expansions: usize,
    pub pruned_by_bound: usize,
    pub pruned_by_visited: usize,
    /// Sorted configurations reached, improving or not
    pub goals_reached: usize,
    pub peak_frontier: usize,
    pub distinct_layouts: usize,
    pub time_elapsed_ms: u64,
}

/// Result of the search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Cheapest sorted configuration found
    pub best: Option<Configuration>,
    pub termination: Termination,
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn best_cost(&self) -> Option<u64> {
        self.best.as_ref().map(Configuration::cost)
    }

    /// Turn the raw result into a proven minimum, or say why there is none.
    pub fn into_solution(self) -> Result<Solution, SolveError> {
        let expansions = self.stats.expansions;
        match (self.termination, self.best) {
            (Termination::Exhausted, Some(best)) => Ok(Solution {
                cost: best.cost(),
                moves: best.into_history(),
                stats: self.stats,
            }),
            (Termination::Exhausted, None) => Err(SolveError::Unsolvable { expansions }),
            (termination, best) => Err(SolveError::BudgetExhausted {
                termination,
                best_so_far: best.as_ref().map(Configuration::cost),
                expansions,
            }),
        }
    }
}

/// A proven minimum-cost sorting of the burrow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub cost: u64,
    pub moves: Vec<Move>,
    pub stats: SearchStats,
}

/// Record a visit to `key` at `cost`. Returns whether the configuration
/// should be expanded.
fn record_visit(
    visited: &mut HashMap<LayoutKey, u64>,
    key: LayoutKey,
    cost: u64,
    policy: VisitPolicy,
) -> bool {
    match visited.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(cost);
            true
        }
        Entry::Occupied(mut slot) => match policy {
            VisitPolicy::MinCost if cost < *slot.get() => {
                slot.insert(cost);
                true
            }
            VisitPolicy::MinCost | VisitPolicy::FirstSeen => false,
        },
    }
}

/// Run the search from `root`.
#[instrument(skip_all, fields(policy = ?config.policy))]
pub fn search(root: Configuration, config: &SearchConfig) -> SearchResult {
    let start_time = Instant::now();
    let deadline = config.timeout.map(|t| start_time + t);
    info!(
        tokens = root.board().tokens().len(),
        depth = root.board().depth(),
        "starting search"
    );

    let mut stats = SearchStats::default();
    let mut visited: HashMap<LayoutKey, u64> = HashMap::new();
    let mut best: Option<Configuration> = None;
    let mut termination = Termination::Exhausted;

    let mut stack = vec![root];
    while let Some(state) = stack.pop() {
        if deadline.is_some_and(|d| Instant::now() > d) {
            termination = Termination::Timeout;
            break;
        }
        if config
            .max_expansions
            .is_some_and(|limit| stats.expansions >= limit)
        {
            termination = Termination::ExpansionCap;
            break;
        }

        let bound = best.as_ref().map(Configuration::cost);
        if bound.is_some_and(|b| state.cost() > b) {
            stats.pruned_by_bound += 1;
            continue;
        }

        if !record_visit(&mut visited, state.canonical_key(), state.cost(), config.policy) {
            stats.pruned_by_visited += 1;
            continue;
        }
        stats.expansions += 1;

        if state.is_goal() {
            stats.goals_reached += 1;
            if bound.map_or(true, |b| state.cost() < b) {
                debug!(
                    cost = state.cost(),
                    moves = state.history().len(),
                    expansions = stats.expansions,
                    "improved best"
                );
                best = Some(state);
            }
            continue;
        }

        stack.extend(state.successors());
        stats.peak_frontier = stats.peak_frontier.max(stack.len());
    }

    stats.distinct_layouts = visited.len();
    stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;

    let best_cost = best.as_ref().map(Configuration::cost);
    if termination == Termination::Exhausted {
        info!(?best_cost, expansions = stats.expansions, "search finished");
    } else {
        warn!(
            %termination,
            ?best_cost,
            expansions = stats.expansions,
            "search stopped before exhausting the frontier"
        );
    }

    SearchResult {
        best,
        termination,
        stats,
    }
}

/// Minimum cost to sort the burrow described by `layout`.
pub fn solve(layout: &str) -> Result<u64, SolveError> {
    solve_with(layout, &SearchConfig::default()).map(|s| s.cost)
}

/// Parse `layout` and search it under `config`.
pub fn solve_with(layout: &str, config: &SearchConfig) -> Result<Solution, SolveError> {
    let board = Board::parse(layout)?;
    solve_board(board, config)
}

pub fn solve_board(board: Board, config: &SearchConfig) -> Result<Solution, SolveError> {
    search(Configuration::root(board), config).into_solution()
}
