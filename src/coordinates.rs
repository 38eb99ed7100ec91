use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::board::BOARD_SIZE;
use crate::protocol::ProtocolError;

const FIRST_COLUMN: char = 'A';

/// A (row, column) pair on the board.
///
/// Indices are signed so that capture geometry can project past the edge;
/// use [`crate::Board::are_valid`] before looking such a position up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    row: i32,
    column: i32,
}

/// Displacement between two coordinates, in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    pub rows: i32,
    pub columns: i32,
}

impl Vector {
    pub const fn new(rows: i32, columns: i32) -> Self {
        Vector { rows, columns }
    }

    /// Unit step pointing the same way (each component clamped to -1, 0 or 1).
    pub fn signum(self) -> Self {
        Vector::new(self.rows.signum(), self.columns.signum())
    }
}

impl Coordinates {
    pub const fn new(row: i32, column: i32) -> Self {
        Coordinates { row, column }
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn column(&self) -> i32 {
        self.column
    }

    /// Column letter, `A` for column 0.
    pub fn column_label(&self) -> char {
        u8::try_from(self.column)
            .ok()
            .filter(|&c| (c as usize) < BOARD_SIZE)
            .map(|c| (FIRST_COLUMN as u8 + c) as char)
            .unwrap_or('?')
    }

    /// Row number, `1` for row 0.
    pub fn row_label(&self) -> String {
        (self.row + 1).to_string()
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.column_label(), self.row_label())
    }

    /// Parse a label such as `d6` or `K11` into coordinates.
    pub fn parse_label(label: &str) -> Result<Self, ProtocolError> {
        let label = label.trim();
        let mut chars = label.chars();
        let letter = match chars.next() {
            None => return Err(ProtocolError::EmptyLabel),
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            Some(_) => return Err(ProtocolError::MissingColumn(label.to_string())),
        };

        let column = letter as i32 - FIRST_COLUMN as i32;
        if column >= BOARD_SIZE as i32 {
            return Err(ProtocolError::InvalidColumn(letter));
        }

        let digits = chars.as_str();
        if digits.is_empty() {
            return Err(ProtocolError::MissingRow(label.to_string()));
        }
        if digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProtocolError::InvalidRow(digits.to_string()));
        }

        let row: i32 = digits
            .parse()
            .map_err(|_| ProtocolError::InvalidRow(digits.to_string()))?;
        if !(1..=BOARD_SIZE as i32).contains(&row) {
            return Err(ProtocolError::InvalidRow(digits.to_string()));
        }

        Ok(Coordinates::new(row - 1, column))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_label(), self.row + 1)
    }
}

impl FromStr for Coordinates {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coordinates::parse_label(s)
    }
}

impl Sub for Coordinates {
    type Output = Vector;

    fn sub(self, rhs: Coordinates) -> Vector {
        Vector::new(self.row - rhs.row, self.column - rhs.column)
    }
}

impl Add<Vector> for Coordinates {
    type Output = Coordinates;

    fn add(self, rhs: Vector) -> Coordinates {
        Coordinates::new(self.row + rhs.rows, self.column + rhs.columns)
    }
}
