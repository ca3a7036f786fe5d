//! Token classes, grid positions, and the per-token movement rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::Board;

/// Cells a token may move to in one step. A hallway has at most a handful
/// of stopping cells, so this rarely spills to the heap.
pub type Destinations = SmallVec<[Position; 8]>;

/// Token class. Each class has one home compartment and a fixed cost per
/// cell travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenClass {
    A,
    B,
    C,
    D,
}

impl TokenClass {
    pub const ALL: [TokenClass; 4] = [TokenClass::A, TokenClass::B, TokenClass::C, TokenClass::D];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(TokenClass::A),
            'B' => Some(TokenClass::B),
            'C' => Some(TokenClass::C),
            'D' => Some(TokenClass::D),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            TokenClass::A => 'A',
            TokenClass::B => 'B',
            TokenClass::C => 'C',
            TokenClass::D => 'D',
        }
    }

    /// Index of the class, which is also the index of its home compartment
    pub fn index(self) -> usize {
        self as usize
    }

    /// Cost of moving one cell
    pub fn multiplier(self) -> u64 {
        match self {
            TokenClass::A => 1,
            TokenClass::B => 10,
            TokenClass::C => 100,
            TokenClass::D => 1000,
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Cell coordinates. `y == 0` is the hallway, compartment rows count down
/// from the compartment mouth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn is_hallway(self) -> bool {
        self.y == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A movable unit on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub position: Position,
    /// Set once the token can never move again in this lineage
    pub settled: bool,
}

impl Token {
    pub fn new(class: TokenClass, position: Position) -> Self {
        Self {
            class,
            position,
            settled: false,
        }
    }

    /// True when the token sits in its home compartment and every cell
    /// beneath it holds the same class.
    pub fn is_anchored(&self, board: &Board) -> bool {
        if self.position.is_hallway() {
            return false;
        }
        match board.compartment_for(self.class) {
            Some(home) if home.column == self.position.x => {}
            _ => return false,
        }
        (self.position.y + 1..board.height())
            .all(|y| board.class_at(Position::new(self.position.x, y)) == Some(self.class))
    }

    /// Every cell this token may legally move to from the current board.
    ///
    /// A token in a compartment may step out to any hallway cell it can
    /// reach without passing another token, except the entries above
    /// compartments. Leftward cells come first, nearest first, then
    /// rightward cells. A token in the hallway may only go home, to the
    /// deepest open cell, and only once the compartment holds nothing but
    /// its own class.
    pub fn legal_destinations(&self, board: &Board) -> Destinations {
        if self.settled || self.is_anchored(board) {
            return Destinations::new();
        }
        if self.position.is_hallway() {
            self.home_stop(board)
        } else {
            self.hallway_stops(board)
        }
    }

    fn hallway_stops(&self, board: &Board) -> Destinations {
        let Position { x, y } = self.position;
        let mut stops = Destinations::new();

        // Column above, including the entry, must be clear
        if (0..y).any(|row| !board.is_empty(Position::new(x, row))) {
            return stops;
        }

        for hx in (0..x).rev() {
            let cell = Position::new(hx, 0);
            if !board.is_empty(cell) {
                break;
            }
            if !board.is_entry(hx) {
                stops.push(cell);
            }
        }
        for hx in x + 1..board.width() {
            let cell = Position::new(hx, 0);
            if !board.is_empty(cell) {
                break;
            }
            if !board.is_entry(hx) {
                stops.push(cell);
            }
        }

        stops
    }

    fn home_stop(&self, board: &Board) -> Destinations {
        let mut stops = Destinations::new();
        let Some(home) = board.compartment_for(self.class) else {
            return stops;
        };
        if !board.compartment_available(self.class) {
            return stops;
        }

        let x = self.position.x;
        let path_clear = if home.column > x {
            (x + 1..=home.column).all(|hx| board.is_empty(Position::new(hx, 0)))
        } else {
            (home.column..x).all(|hx| board.is_empty(Position::new(hx, 0)))
        };
        if !path_clear {
            return stops;
        }

        let deepest = (1..board.height())
            .take_while(|&y| board.is_empty(Position::new(home.column, y)))
            .last();
        if let Some(y) = deepest {
            stops.push(Position::new(home.column, y));
        }
        stops
    }

    /// Cost of moving to `destination`: climb to the hallway, travel along
    /// it, then descend, times the class multiplier.
    pub fn move_cost(&self, destination: Position) -> u64 {
        let Position { x, y } = self.position;
        let steps = x.abs_diff(destination.x) + y + destination.y;
        steps as u64 * self.class.multiplier()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.class, self.position)?;
        if self.settled {
            write!(f, " (settled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        Board::parse(text).unwrap()
    }

    fn token_at(board: &Board, x: usize, y: usize) -> &Token {
        board
            .tokens()
            .iter()
            .find(|t| t.position == Position::new(x, y))
            .unwrap()
    }

    #[test]
    fn test_multipliers_strictly_increase() {
        let costs: Vec<u64> = TokenClass::ALL.iter().map(|c| c.multiplier()).collect();
        assert_eq!(costs, vec![1, 10, 100, 1000]);
    }

    #[test]
    fn test_class_letters() {
        for class in TokenClass::ALL {
            assert_eq!(TokenClass::from_char(class.to_char()), Some(class));
        }
        assert_eq!(TokenClass::from_char('a'), None);
        assert_eq!(TokenClass::from_char('.'), None);
    }

    #[test]
    fn test_anchored_token_is_settled_on_first_query() {
        let b = board("...........\n##A#D#C#D##\n##A#B#C#D##");
        let bottom_a = token_at(&b, 2, 2);
        assert!(bottom_a.settled);
        assert!(bottom_a.legal_destinations(&b).is_empty());

        let top_a = token_at(&b, 2, 1);
        assert!(top_a.settled);
        assert!(top_a.legal_destinations(&b).is_empty());
    }

    #[test]
    fn test_home_token_above_foreign_token_must_leave() {
        let b = board("...........\n##A#B#C#D##\n##B#A#C#D##");
        let top_a = token_at(&b, 2, 1);
        assert!(!top_a.settled);
        assert!(!top_a.legal_destinations(&b).is_empty());
    }

    #[test]
    fn test_exit_reaches_every_open_hallway_stop() {
        let b = board("...........\n##B#A#C#D##\n##A#B#C#D##");
        let top_b = token_at(&b, 2, 1);
        let stops: Vec<usize> = top_b.legal_destinations(&b).iter().map(|p| p.x).collect();
        // Entries at 2, 4, 6, 8 are skipped
        assert_eq!(stops, vec![1, 0, 3, 5, 7, 9, 10]);
    }

    #[test]
    fn test_exit_blocked_by_token_above() {
        let b = board("...........\n##B#A#A#D##\n##C#B#C#D##");
        let bottom_c = token_at(&b, 2, 2);
        assert!(!bottom_c.settled);
        assert!(bottom_c.legal_destinations(&b).is_empty());
    }

    #[test]
    fn test_exit_stops_at_hallway_token() {
        let b = board("...D.......\n##B#A#C#.##\n##A#B#C#D##");
        let top_b = token_at(&b, 2, 1);
        let stops: Vec<usize> = top_b.legal_destinations(&b).iter().map(|p| p.x).collect();
        assert_eq!(stops, vec![1, 0]);
    }

    #[test]
    fn test_hallway_token_goes_to_deepest_open_cell() {
        let b = board("A..........\n##.#B#C#D##\n##.#B#C#D##");
        let a = token_at(&b, 0, 0);
        assert_eq!(
            a.legal_destinations(&b).as_slice(),
            &[Position::new(2, 2)]
        );
    }

    #[test]
    fn test_hallway_token_waits_for_foreign_tokens_to_leave() {
        let b = board("A..........\n##.#A#C#D##\n##B#B#C#D##");
        let a = token_at(&b, 0, 0);
        assert!(!b.compartment_available(TokenClass::A));
        assert!(a.legal_destinations(&b).is_empty());
    }

    #[test]
    fn test_hallway_token_blocked_on_the_way_home() {
        let b = board("...B.A.....\n##.#.#C#D##\n##A#B#C#D##");
        let a = token_at(&b, 5, 0);
        assert!(a.legal_destinations(&b).is_empty());
        let hallway_b = token_at(&b, 3, 0);
        assert_eq!(
            hallway_b.legal_destinations(&b).as_slice(),
            &[Position::new(4, 1)]
        );
    }

    #[test]
    fn test_move_cost_climbs_travels_and_descends() {
        let b = board("...........\n##B#A#C#D##\n##A#B#C#D##");
        let top_b = token_at(&b, 2, 1);
        // up 1, left 2
        assert_eq!(top_b.move_cost(Position::new(0, 0)), 30);

        let d = Token::new(TokenClass::D, Position::new(3, 0));
        // right 5, down 2
        assert_eq!(d.move_cost(Position::new(8, 2)), 7000);
    }
}
