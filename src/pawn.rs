use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coordinates::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attackers,
    Defenders,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Attackers => Side::Defenders,
            Side::Defenders => Side::Attackers,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attackers => write!(f, "Attackers"),
            Side::Defenders => write!(f, "Defenders"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PawnKind {
    King,
    Attacker,
    Defender,
}

impl PawnKind {
    pub fn side(&self) -> Side {
        match self {
            PawnKind::Attacker => Side::Attackers,
            PawnKind::Defender | PawnKind::King => Side::Defenders,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            PawnKind::King => 'K',
            PawnKind::Attacker => 'A',
            PawnKind::Defender => 'D',
        }
    }
}

/// Index of a pawn in its board's pawn table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PawnId(pub(crate) usize);

impl PawnId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A unit placed on the board. `field` is `None` once the pawn is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pawn {
    id: PawnId,
    kind: PawnKind,
    field: Option<Coordinates>,
}

impl Pawn {
    pub(crate) fn new(id: PawnId, kind: PawnKind, field: Coordinates) -> Self {
        Pawn {
            id,
            kind,
            field: Some(field),
        }
    }

    pub fn id(&self) -> PawnId {
        self.id
    }

    pub fn kind(&self) -> PawnKind {
        self.kind
    }

    pub fn side(&self) -> Side {
        self.kind.side()
    }

    pub fn field(&self) -> Option<Coordinates> {
        self.field
    }

    pub fn is_king(&self) -> bool {
        self.kind == PawnKind::King
    }

    pub fn is_captured(&self) -> bool {
        self.field.is_none()
    }

    pub(crate) fn set_field(&mut self, field: Option<Coordinates>) {
        self.field = field;
    }
}
