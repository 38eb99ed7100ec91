use std::fmt;

use crate::coordinates::{Coordinates, Vector};
use crate::pawn::{Pawn, PawnId, PawnKind, Side};

/// Board size constants
pub const BOARD_SIZE: usize = 11;
pub const MIDDLE_INDEX: usize = (BOARD_SIZE - 1) / 2;

/// Manhattan distance from the center below which a field is a defender spawn.
const SPAWN_RANGE: i32 = 3;

/// Orthogonal directions: right, left, down, up.
const DIRECTIONS: [Vector; 4] = [
    Vector::new(0, 1),
    Vector::new(0, -1),
    Vector::new(1, 0),
    Vector::new(-1, 0),
];

/// One cell of the board. Its classification never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    coordinates: Coordinates,
    is_corner: bool,
    is_center: bool,
    is_defender_spawn: bool,
    is_attacker_spawn: bool,
    occupant: Option<PawnId>,
}

impl Field {
    fn new(row: usize, column: usize) -> Self {
        let edge = BOARD_SIZE - 1;
        let middle = MIDDLE_INDEX as i32;
        let (r, c) = (row as i32, column as i32);
        let col_from_center = (middle - c).abs();
        let row_from_center = (middle - r).abs();

        Field {
            coordinates: Coordinates::new(r, c),
            is_corner: row % edge == 0 && column % edge == 0,
            is_center: row == MIDDLE_INDEX && column == MIDDLE_INDEX,
            is_defender_spawn: col_from_center + row_from_center < SPAWN_RANGE,
            is_attacker_spawn: (col_from_center % middle == 0 && row_from_center < SPAWN_RANGE)
                || (col_from_center % middle == middle - 1 && r == middle)
                || (row_from_center % middle == 0 && col_from_center < SPAWN_RANGE)
                || (row_from_center % middle == middle - 1 && c == middle),
            occupant: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn is_corner(&self) -> bool {
        self.is_corner
    }

    /// The throne.
    pub fn is_center(&self) -> bool {
        self.is_center
    }

    pub fn is_defender_spawn(&self) -> bool {
        self.is_defender_spawn
    }

    pub fn is_attacker_spawn(&self) -> bool {
        self.is_attacker_spawn
    }

    /// Only the king may stop on (or pass through) these fields.
    pub fn is_king_only(&self) -> bool {
        self.is_corner || self.is_center
    }

    pub fn occupant(&self) -> Option<PawnId> {
        self.occupant
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// The 11x11 grid of fields plus the table of every pawn placed on it.
///
/// Fields refer to pawns by [`PawnId`] and pawns refer back to fields by
/// [`Coordinates`]; `move_pawn` and `remove_pawn` are the only places that
/// touch either side of that link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    fields: [[Field; BOARD_SIZE]; BOARD_SIZE],
    pawns: Vec<Pawn>,
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Board {
            fields: std::array::from_fn(|row| std::array::from_fn(|column| Field::new(row, column))),
            pawns: Vec::new(),
        }
    }

    /// Clear the board and place the opening position.
    pub fn reset(&mut self) {
        self.pawns.clear();

        for row in 0..BOARD_SIZE {
            for column in 0..BOARD_SIZE {
                let field = &mut self.fields[row][column];
                field.occupant = None;

                let kind = if field.is_center {
                    Some(PawnKind::King)
                } else if field.is_defender_spawn {
                    Some(PawnKind::Defender)
                } else if field.is_attacker_spawn {
                    Some(PawnKind::Attacker)
                } else {
                    None
                };

                if let Some(kind) = kind {
                    let id = PawnId(self.pawns.len());
                    self.pawns.push(Pawn::new(id, kind, field.coordinates));
                    field.occupant = Some(id);
                }
            }
        }
    }

    /// A fresh board holding new pawns of the same kinds on the same fields.
    /// Captured pawns are not carried over and ids are reassigned.
    pub(crate) fn snapshot(&self) -> Board {
        let mut board = Board::new();
        for pawn in self.all_pawns() {
            if let Some(at) = pawn.field() {
                board.place(pawn.kind(), at);
            }
        }
        board
    }

    /// Put a new pawn on an empty field. Setup only.
    pub(crate) fn place(&mut self, kind: PawnKind, at: Coordinates) -> PawnId {
        let id = PawnId(self.pawns.len());
        self.pawns.push(Pawn::new(id, kind, at));
        if let Some(field) = self.field_mut(at) {
            field.occupant = Some(id);
        }
        debug_assert!(self.is_consistent());
        id
    }

    pub fn are_valid(coordinates: Coordinates) -> bool {
        let range = 0..BOARD_SIZE as i32;
        range.contains(&coordinates.row()) && range.contains(&coordinates.column())
    }

    pub fn field(&self, coordinates: Coordinates) -> Option<&Field> {
        Self::are_valid(coordinates)
            .then(|| &self.fields[coordinates.row() as usize][coordinates.column() as usize])
    }

    fn field_mut(&mut self, coordinates: Coordinates) -> Option<&mut Field> {
        if Self::are_valid(coordinates) {
            Some(&mut self.fields[coordinates.row() as usize][coordinates.column() as usize])
        } else {
            None
        }
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.get(id.0)
    }

    pub fn pawn_at(&self, coordinates: Coordinates) -> Option<&Pawn> {
        self.field(coordinates)?
            .occupant()
            .and_then(|id| self.pawn(id))
    }

    /// All fields, row by row.
    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter().flatten()
    }

    /// Every pawn ever placed on this board, captured ones included.
    pub fn pawn_records(&self) -> &[Pawn] {
        &self.pawns
    }

    /// Pawns still on the board, row by row.
    pub fn all_pawns(&self) -> impl Iterator<Item = &Pawn> + '_ {
        self.fields()
            .filter_map(|field| field.occupant())
            .filter_map(|id| self.pawn(id))
    }

    /// Pawns of `side` still on the board, optionally only those able to move.
    pub fn pawns(&self, side: Side, movable_only: bool) -> impl Iterator<Item = &Pawn> + '_ {
        self.all_pawns()
            .filter(move |pawn| pawn.side() == side && (!movable_only || self.can_move(pawn)))
    }

    pub fn can_move(&self, pawn: &Pawn) -> bool {
        let Some(at) = pawn.field() else {
            return false;
        };
        self.adjacent_fields(at)
            .any(|field| field.is_empty() && (pawn.is_king() || !field.is_king_only()))
    }

    pub fn adjacent_fields(&self, coordinates: Coordinates) -> impl Iterator<Item = &Field> + '_ {
        DIRECTIONS
            .into_iter()
            .filter_map(move |direction| self.field(coordinates + direction))
    }

    /// Every field the pawn can slide to: straight lines until a pawn, the
    /// edge, or (for non-king pawns) the throne or a corner.
    pub fn available_destinations(&self, pawn: &Pawn) -> Vec<Coordinates> {
        let Some(from) = pawn.field() else {
            return Vec::new();
        };

        let mut destinations = Vec::new();
        for &direction in &DIRECTIONS {
            let mut next = from + direction;
            while let Some(field) = self.field(next) {
                if !field.is_empty() || (!pawn.is_king() && field.is_king_only()) {
                    break;
                }
                destinations.push(next);
                next = next + direction;
            }
        }

        destinations
    }

    /// Swap the occupancy of the pawn's field and `to`. Callers validate first.
    pub(crate) fn move_pawn(&mut self, pawn: PawnId, to: Coordinates) {
        let Some(from) = self.pawn(pawn).and_then(Pawn::field) else {
            return;
        };

        let leaving = self.field(from).and_then(Field::occupant);
        let arriving = self.field(to).and_then(Field::occupant);
        if let Some(field) = self.field_mut(from) {
            field.occupant = arriving;
        }
        if let Some(field) = self.field_mut(to) {
            field.occupant = leaving;
        }
        self.pawns[pawn.0].set_field(Some(to));

        debug_assert!(self.is_consistent());
    }

    /// Take a pawn off the board.
    pub(crate) fn remove_pawn(&mut self, pawn: PawnId) {
        let Some(at) = self.pawn(pawn).and_then(Pawn::field) else {
            return;
        };

        self.pawns[pawn.0].set_field(None);
        if let Some(field) = self.field_mut(at) {
            field.occupant = None;
        }

        debug_assert!(self.is_consistent());
    }

    /// Whether every field/pawn link points back at its partner.
    pub fn is_consistent(&self) -> bool {
        let fields_agree = self.fields().all(|field| match field.occupant() {
            Some(id) => self
                .pawn(id)
                .is_some_and(|pawn| pawn.field() == Some(field.coordinates())),
            None => true,
        });

        let pawns_agree = self.pawns.iter().all(|pawn| match pawn.field() {
            Some(at) => self
                .field(at)
                .is_some_and(|field| field.occupant() == Some(pawn.id())),
            None => true,
        });

        fields_agree && pawns_agree
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// ASCII rendering, row 11 at the top.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for column in 0..BOARD_SIZE {
            write!(f, " {} ", Coordinates::new(0, column as i32).column_label())?;
        }
        writeln!(f)?;

        for row in (0..BOARD_SIZE).rev() {
            write!(f, "{:2} ", row + 1)?;
            for field in &self.fields[row] {
                let c = match self.pawn_at(field.coordinates()) {
                    Some(pawn) => pawn.kind().symbol(),
                    None if field.is_corner() => 'X',
                    None if field.is_center() => 'T',
                    None => '.',
                };
                write!(f, " {} ", c)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
