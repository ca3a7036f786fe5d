//! Typed errors for layout parsing and solving.
//!
//! Layout problems are fatal and reported before any search starts.
//! An exhausted search without a goal is a normal outcome and is reported
//! as [`SolveError::Unsolvable`]. Internal invariant violations (a computed
//! position outside the grid, a move onto an occupied cell) are bugs and
//! panic instead of appearing here.

use std::fmt;

use crate::solver::Termination;

/// The input text does not describe a valid burrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No rows at all.
    Empty,
    /// A row whose length differs from the first row.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character that is neither `.`, `#`, a space, nor a class letter.
    UnrecognizedChar { ch: char, row: usize, column: usize },
    /// The hallway row must be fully open.
    WallInHallway { column: usize },
    /// An open cell below the hallway outside of any compartment column.
    StrayCell { row: usize, column: usize },
    /// A compartment column interrupted by a wall.
    BrokenCompartment { column: usize, row: usize },
    /// Only a hallway, nothing to sort into.
    NoCompartments,
    /// More compartments than token classes.
    TooManyCompartments { found: usize },
    /// A token whose class has no compartment.
    UnhomedClass { class: char },
    /// An unfold row that does not name one class per compartment.
    UnfoldPattern { pattern: String, compartments: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LayoutError::*;
        match self {
            Empty => write!(f, "layout has no rows"),
            RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} cells, expected {expected}"
            ),
            UnrecognizedChar { ch, row, column } => {
                write!(f, "unrecognized character {ch:?} at row {row}, column {column}")
            }
            WallInHallway { column } => write!(f, "wall in hallway at column {column}"),
            StrayCell { row, column } => write!(
                f,
                "open cell at row {row}, column {column} is not part of a compartment"
            ),
            BrokenCompartment { column, row } => {
                write!(f, "compartment in column {column} is walled off at row {row}")
            }
            NoCompartments => write!(f, "layout has no compartments"),
            TooManyCompartments { found } => {
                write!(f, "layout has {found} compartments, at most 4 are supported")
            }
            UnhomedClass { class } => write!(f, "no compartment for class {class}"),
            UnfoldPattern {
                pattern,
                compartments,
            } => write!(
                f,
                "unfold row {pattern:?} must name {compartments} classes"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Why [`crate::solve`] could not produce a minimum cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    MalformedLayout(LayoutError),
    /// The search explored every reachable layout without sorting the tokens.
    Unsolvable { expansions: usize },
    /// A budget stopped the search before it could prove a minimum.
    BudgetExhausted {
        termination: Termination,
        best_so_far: Option<u64>,
        expansions: usize,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::MalformedLayout(e) => write!(f, "malformed layout: {e}"),
            SolveError::Unsolvable { expansions } => {
                write!(f, "unsolvable after {expansions} expansions")
            }
            SolveError::BudgetExhausted {
                termination,
                best_so_far,
                expansions,
            } => {
                write!(f, "search stopped ({termination}) after {expansions} expansions")?;
                if let Some(cost) = best_so_far {
                    write!(f, ", best so far {cost}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::MalformedLayout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for SolveError {
    fn from(e: LayoutError) -> Self {
        SolveError::MalformedLayout(e)
    }
}
