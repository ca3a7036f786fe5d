//! Search configurations: a board snapshot plus the cost of reaching it.

use std::fmt;

use serde::Serialize;

use crate::board::{Board, LayoutKey};
use crate::token::{Position, TokenClass};

/// One token movement and what it cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub class: TokenClass,
    pub from: Position,
    pub to: Position,
    pub cost: u64,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {} ({})", self.class, self.from, self.to, self.cost)
    }
}

/// A node of the search graph. Each configuration owns its board, so
/// children never alias their parent.
#[derive(Debug, Clone)]
pub struct Configuration {
    board: Board,
    cost: u64,
    history: Vec<Move>,
}

impl Configuration {
    pub fn root(board: Board) -> Self {
        Self {
            board,
            cost: 0,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Total cost of every move since the root
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Moves from the root to this configuration, in order
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Move> {
        self.history
    }

    /// One child per movable token and legal destination.
    pub fn successors(&self) -> Vec<Configuration> {
        let mut next = Vec::new();
        for (id, destinations) in self.board.movable_tokens() {
            let token = self.board.token(id);
            for destination in destinations {
                let step = Move {
                    class: token.class,
                    from: token.position,
                    to: destination,
                    cost: token.move_cost(destination),
                };
                let mut child = self.clone();
                child.board.apply_move(id, destination);
                child.cost += step.cost;
                child.history.push(step);
                next.push(child);
            }
        }
        next
    }

    pub fn is_goal(&self) -> bool {
        self.board.is_solved()
    }

    /// Layout-only key; cost and history are not part of it.
    pub fn canonical_key(&self) -> LayoutKey {
        self.board.canonical_key()
    }
}
