//! Minimum-cost solver for the burrow room-packing puzzle.
//!
//! Tokens of four classes start scattered across fixed-depth compartments
//! joined by a hallway. Each must end up in its home compartment, and every
//! cell travelled costs 1, 10, 100 or 1000 depending on the class. The
//! solver runs a depth-first search with best-cost pruning and a visited
//! map keyed on the board layout.
//!
//! ```no_run
//! let cost = burrow_solver::solve(
//!     "#############\n#...........#\n###B#C#B#D###\n  #A#D#C#A#\n  #########",
//! )
//! .unwrap();
//! println!("{cost}");
//! ```

pub mod board;
pub mod error;
pub mod layout;
pub mod solver;
pub mod state;
pub mod token;

// Re-export main types
pub use board::{Board, Cell, Compartment, LayoutKey, TokenId};
pub use error::{LayoutError, SolveError};
pub use layout::{Layout, UNFOLD_ROWS};
pub use solver::{
    search, solve, solve_board, solve_with, SearchConfig, SearchResult, SearchStats, Solution,
    Termination, VisitPolicy,
};
pub use state::{Configuration, Move};
pub use token::{Destinations, Position, Token, TokenClass};
