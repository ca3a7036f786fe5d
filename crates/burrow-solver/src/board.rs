//! The burrow grid: hallway, compartments, and the tokens occupying them.
//!
//! Geometry (size, walls, compartment columns) is fixed at construction.
//! Only cell occupancy changes, and only through [`Board::apply_move`].

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::LayoutError;
use crate::layout::{Layout, EMPTY, WALL};
use crate::token::{Destinations, Position, Token, TokenClass};

/// Index of a token in [`Board::tokens`]. Stable across clones.
pub type TokenId = usize;

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Empty,
    Occupied(TokenId),
}

/// A compartment column and the class that calls it home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compartment {
    pub column: usize,
    pub class: TokenClass,
}

/// Layout-only serialization of a board, used to detect repeated layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutKey(String);

impl LayoutKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major
    cells: Vec<Cell>,
    tokens: Vec<Token>,
    /// Ordered by column; compartment `i` is home to class `i`
    compartments: SmallVec<[Compartment; 4]>,
}

impl Board {
    /// Parse a layout in either of the forms accepted by [`Layout::parse`].
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        Self::from_layout(&Layout::parse(text)?)
    }

    pub fn from_layout(layout: &Layout) -> Result<Self, LayoutError> {
        let rows = layout.rows();
        let width = layout.width();
        let height = layout.height();

        if let Some(column) = rows[0].iter().position(|&c| c == WALL) {
            return Err(LayoutError::WallInHallway { column });
        }

        let columns: Vec<usize> = match rows.get(1) {
            Some(row) => row
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c != WALL)
                .map(|(x, _)| x)
                .collect(),
            None => Vec::new(),
        };
        if columns.is_empty() {
            return Err(LayoutError::NoCompartments);
        }
        if columns.len() > TokenClass::ALL.len() {
            return Err(LayoutError::TooManyCompartments {
                found: columns.len(),
            });
        }

        for (y, row) in rows.iter().enumerate().skip(2) {
            for (x, &c) in row.iter().enumerate() {
                match (c != WALL, columns.contains(&x)) {
                    (true, false) => return Err(LayoutError::StrayCell { row: y, column: x }),
                    (false, true) => {
                        return Err(LayoutError::BrokenCompartment { column: x, row: y })
                    }
                    _ => {}
                }
            }
        }

        let compartments: SmallVec<[Compartment; 4]> = columns
            .iter()
            .zip(TokenClass::ALL)
            .map(|(&column, class)| Compartment { column, class })
            .collect();

        let mut cells = Vec::with_capacity(width * height);
        let mut tokens = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let cell = match c {
                    WALL => Cell::Wall,
                    EMPTY => Cell::Empty,
                    ch => {
                        let class = TokenClass::from_char(ch).ok_or(
                            LayoutError::UnrecognizedChar {
                                ch,
                                row: y,
                                column: x,
                            },
                        )?;
                        if class.index() >= compartments.len() {
                            return Err(LayoutError::UnhomedClass { class: ch });
                        }
                        tokens.push(Token::new(class, Position::new(x, y)));
                        Cell::Occupied(tokens.len() - 1)
                    }
                };
                cells.push(cell);
            }
        }

        let mut board = Self {
            width,
            height,
            cells,
            tokens,
            compartments,
        };
        board.settle_anchored();
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in each compartment
    pub fn depth(&self) -> usize {
        self.height - 1
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id]
    }

    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    pub fn compartment_for(&self, class: TokenClass) -> Option<&Compartment> {
        self.compartments.get(class.index())
    }

    /// Whether hallway column `x` sits directly above a compartment
    pub fn is_entry(&self, x: usize) -> bool {
        self.compartments.iter().any(|c| c.column == x)
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            pos.x < self.width && pos.y < self.height,
            "cell {pos} outside {}x{} board",
            self.width,
            self.height
        );
        pos.y * self.width + pos.x
    }

    /// Panics when `pos` is outside the grid.
    pub fn cell_at(&self, pos: Position) -> Cell {
        self.cells[self.index(pos)]
    }

    /// Panics when `pos` is outside the grid or a wall; callers only ask
    /// about cells derived from the burrow geometry.
    pub fn is_empty(&self, pos: Position) -> bool {
        match self.cell_at(pos) {
            Cell::Empty => true,
            Cell::Occupied(_) => false,
            Cell::Wall => panic!("queried wall cell {pos}"),
        }
    }

    pub fn class_at(&self, pos: Position) -> Option<TokenClass> {
        match self.cell_at(pos) {
            Cell::Occupied(id) => Some(self.tokens[id].class),
            _ => None,
        }
    }

    /// True iff the home compartment of `class` holds only empty cells and
    /// tokens of exactly that class.
    pub fn compartment_available(&self, class: TokenClass) -> bool {
        let Some(home) = self.compartment_for(class) else {
            return false;
        };
        (1..self.height).all(|y| match self.cell_at(Position::new(home.column, y)) {
            Cell::Empty => true,
            Cell::Occupied(id) => self.tokens[id].class == class,
            Cell::Wall => false,
        })
    }

    /// Tokens with at least one legal destination, in token order.
    pub fn movable_tokens(&self) -> Vec<(TokenId, Destinations)> {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(id, token)| {
                let destinations = token.legal_destinations(self);
                (!destinations.is_empty()).then_some((id, destinations))
            })
            .collect()
    }

    /// Relocate a token and re-evaluate whether it is settled.
    ///
    /// Panics when the destination is not an empty cell.
    pub fn apply_move(&mut self, id: TokenId, destination: Position) {
        let to = self.index(destination);
        assert_eq!(
            self.cells[to],
            Cell::Empty,
            "token {id} moved onto non-empty cell {destination}"
        );
        let from = self.index(self.tokens[id].position);

        self.cells[from] = Cell::Empty;
        self.cells[to] = Cell::Occupied(id);
        self.tokens[id].position = destination;
        if self.tokens[id].is_anchored(self) {
            self.tokens[id].settled = true;
        }
    }

    /// Every token has settled.
    pub fn is_solved(&self) -> bool {
        self.tokens.iter().all(|t| t.settled)
    }

    pub fn canonical_key(&self) -> LayoutKey {
        let mut key = String::with_capacity(self.cells.len());
        for &cell in &self.cells {
            key.push(self.symbol(cell));
        }
        LayoutKey(key)
    }

    fn symbol(&self, cell: Cell) -> char {
        match cell {
            Cell::Wall => WALL,
            Cell::Empty => EMPTY,
            Cell::Occupied(id) => self.tokens[id].class.to_char(),
        }
    }

    fn settle_anchored(&mut self) {
        for id in 0..self.tokens.len() {
            if !self.tokens[id].settled && self.tokens[id].is_anchored(self) {
                self.tokens[id].settled = true;
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            if i > 0 && i % self.width == 0 {
                writeln!(f)?;
            }
            write!(f, "{}", self.symbol(cell))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "...........\n##B#C#B#D##\n##A#D#C#A##";

    #[test]
    fn test_parse_geometry() {
        let board = Board::parse(SMALL).unwrap();
        assert_eq!(board.width(), 11);
        assert_eq!(board.depth(), 2);
        assert_eq!(board.tokens().len(), 8);
        let columns: Vec<usize> = board.compartments().iter().map(|c| c.column).collect();
        assert_eq!(columns, vec![2, 4, 6, 8]);
        assert_eq!(
            board.compartment_for(TokenClass::C).map(|c| c.column),
            Some(6)
        );
        assert!(board.is_entry(4));
        assert!(!board.is_entry(5));
        assert_eq!(board.to_string(), SMALL);
    }

    #[test]
    fn test_cells_are_tagged() {
        let board = Board::parse(SMALL).unwrap();
        assert_eq!(board.cell_at(Position::new(0, 1)), Cell::Wall);
        assert_eq!(board.cell_at(Position::new(0, 0)), Cell::Empty);
        assert!(matches!(board.cell_at(Position::new(2, 1)), Cell::Occupied(_)));
        assert_eq!(board.class_at(Position::new(2, 1)), Some(TokenClass::B));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_access_panics() {
        let board = Board::parse(SMALL).unwrap();
        board.cell_at(Position::new(11, 0));
    }

    #[test]
    #[should_panic(expected = "wall")]
    fn test_emptiness_of_wall_panics() {
        let board = Board::parse(SMALL).unwrap();
        board.is_empty(Position::new(3, 1));
    }

    #[test]
    fn test_initially_anchored_tokens_are_settled() {
        let board = Board::parse(SMALL).unwrap();
        let settled: Vec<Position> = board
            .tokens()
            .iter()
            .filter(|t| t.settled)
            .map(|t| t.position)
            .collect();
        // Bottom A in column 2 and bottom C in column 6
        assert_eq!(settled, vec![Position::new(2, 2), Position::new(6, 2)]);
    }

    #[test]
    fn test_compartment_availability() {
        let board = Board::parse("...........\n##.#B#C#D##\n##A#A#C#D##").unwrap();
        assert!(board.compartment_available(TokenClass::A));
        assert!(!board.compartment_available(TokenClass::B));
        assert!(board.compartment_available(TokenClass::C));
    }

    #[test]
    fn test_movable_tokens_only_lists_tokens_with_moves() {
        let board = Board::parse(SMALL).unwrap();
        let movable: Vec<Position> = board
            .movable_tokens()
            .iter()
            .map(|(id, _)| board.token(*id).position)
            .collect();
        // Only the top row can leave
        assert_eq!(
            movable,
            vec![
                Position::new(2, 1),
                Position::new(4, 1),
                Position::new(6, 1),
                Position::new(8, 1)
            ]
        );
    }

    #[test]
    fn test_apply_move_relocates_and_settles() {
        let mut board = Board::parse("A..........\n##.#B#C#D##\n##A#B#C#D##").unwrap();
        let id = 0;
        assert!(!board.token(id).settled);

        board.apply_move(id, Position::new(2, 1));
        assert_eq!(board.cell_at(Position::new(0, 0)), Cell::Empty);
        assert_eq!(board.cell_at(Position::new(2, 1)), Cell::Occupied(id));
        assert_eq!(board.token(id).position, Position::new(2, 1));
        assert!(board.token(id).settled);
        assert!(board.is_solved());
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn test_apply_move_onto_token_panics() {
        let mut board = Board::parse(SMALL).unwrap();
        board.apply_move(0, Position::new(4, 1));
    }

    #[test]
    fn test_clone_is_independent() {
        let board = Board::parse(SMALL).unwrap();
        let mut copy = board.clone();
        copy.apply_move(0, Position::new(0, 0));
        assert_eq!(board.token(0).position, Position::new(2, 1));
        assert_eq!(board.class_at(Position::new(0, 0)), None);
        assert_ne!(board.canonical_key(), copy.canonical_key());
    }

    #[test]
    fn test_canonical_key_is_row_major_symbols() {
        let board = Board::parse("...\n#A#").unwrap();
        assert_eq!(board.canonical_key().as_str(), "...#A#");
    }

    #[test]
    fn test_geometry_errors() {
        assert_eq!(
            Board::parse("..#..\n#A#B#").unwrap_err(),
            LayoutError::WallInHallway { column: 2 }
        );
        assert_eq!(
            Board::parse(".....").unwrap_err(),
            LayoutError::NoCompartments
        );
        assert_eq!(
            Board::parse(".........\n#A#B#C#D.").unwrap_err(),
            LayoutError::TooManyCompartments { found: 5 }
        );
        assert_eq!(
            Board::parse(".....\n#A#B#\n#A..#").unwrap_err(),
            LayoutError::StrayCell { row: 2, column: 2 }
        );
        assert_eq!(
            Board::parse(".....\n#A#B#\n#A###").unwrap_err(),
            LayoutError::BrokenCompartment { column: 3, row: 2 }
        );
        assert_eq!(
            Board::parse(".....\n#A#C#").unwrap_err(),
            LayoutError::UnhomedClass { class: 'C' }
        );
    }
}
