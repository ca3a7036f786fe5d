//! Textual burrow layouts.
//!
//! Two input forms are accepted:
//!
//! * the interior form: equal-length rows, the first row being the hallway;
//! * the bordered diagram the puzzle is published in, whose outer wall ring
//!   is stripped and whose short rows are padded with walls:
//!
//! ```text
//! #############
//! #...........#
//! ###B#C#B#D###
//!   #A#D#C#A#
//!   #########
//! ```
//!
//! Spaces count as walls in both forms. After normalization every cell is
//! one of [`WALL`], [`EMPTY`] or a class letter.

use std::fmt;

use crate::error::LayoutError;
use crate::token::TokenClass;

pub const WALL: char = '#';
pub const EMPTY: char = '.';

/// Rows inserted below the first compartment row to build the four-deep
/// variant of the puzzle.
pub const UNFOLD_ROWS: [&str; 2] = ["DCBA", "DBAC"];

/// A rectangular grid of normalized cell symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    rows: Vec<Vec<char>>,
}

impl Layout {
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let start = lines
            .iter()
            .position(|l| !l.trim().is_empty())
            .ok_or(LayoutError::Empty)?;
        let end = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .unwrap_or(start);
        let lines = &lines[start..=end];

        let raw = if is_border(lines[0]) {
            strip_border(lines)?
        } else {
            lines.iter().map(|l| l.chars().collect()).collect()
        };

        let mut rows = Vec::with_capacity(raw.len());
        for (y, line) in raw.into_iter().enumerate() {
            let row = line
                .into_iter()
                .enumerate()
                .map(|(x, ch)| normalize(ch, y, x))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let width = rows[0].len();
        if width == 0 {
            return Err(LayoutError::Empty);
        }
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LayoutError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Insert one compartment row per pattern directly below the first
    /// compartment row. Each pattern names one class per compartment,
    /// left to right.
    pub fn unfold(&mut self, patterns: &[&str]) -> Result<(), LayoutError> {
        let template = self.rows.get(1).ok_or(LayoutError::NoCompartments)?;
        let columns: Vec<usize> = template
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != WALL)
            .map(|(x, _)| x)
            .collect();

        let mut inserted = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let classes: Vec<char> = pattern.chars().collect();
            if classes.len() != columns.len()
                || classes.iter().any(|&c| TokenClass::from_char(c).is_none())
            {
                return Err(LayoutError::UnfoldPattern {
                    pattern: pattern.to_string(),
                    compartments: columns.len(),
                });
            }
            let mut row = vec![WALL; template.len()];
            for (&x, &c) in columns.iter().zip(&classes) {
                row[x] = c;
            }
            inserted.push(row);
        }

        self.rows.splice(2..2, inserted);
        Ok(())
    }

    /// Consuming form of [`Layout::unfold`].
    pub fn unfolded(mut self, patterns: &[&str]) -> Result<Self, LayoutError> {
        self.unfold(patterns)?;
        Ok(self)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows.iter().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for &c in row {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

fn is_border(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == WALL)
}

fn is_wall_symbol(c: char) -> bool {
    c == WALL || c == ' '
}

fn normalize(ch: char, row: usize, column: usize) -> Result<char, LayoutError> {
    match ch {
        c if is_wall_symbol(c) => Ok(WALL),
        EMPTY => Ok(EMPTY),
        c if TokenClass::from_char(c).is_some() => Ok(c),
        ch => Err(LayoutError::UnrecognizedChar { ch, row, column }),
    }
}

/// Drop the wall ring around a bordered diagram.
fn strip_border(lines: &[&str]) -> Result<Vec<Vec<char>>, LayoutError> {
    let width = lines[0].chars().count();
    let mut body = &lines[1..];
    if body.last().is_some_and(|l| is_border(l)) {
        body = &body[..body.len() - 1];
    }
    if width < 3 || body.is_empty() {
        return Err(LayoutError::Empty);
    }

    body.iter()
        .enumerate()
        .map(|(y, line)| {
            let mut cells: Vec<char> = line.chars().collect();
            if cells.len() > width {
                return Err(LayoutError::RaggedRow {
                    row: y,
                    expected: width,
                    found: cells.len(),
                });
            }
            cells.resize(width, ' ');
            for column in [0, width - 1] {
                if !is_wall_symbol(cells[column]) {
                    return Err(LayoutError::StrayCell { row: y, column });
                }
            }
            Ok(cells[1..width - 1].to_vec())
        })
        .collect()
}
