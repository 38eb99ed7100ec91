use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use tracing::{debug, info, warn};

use crate::board::{Board, Field};
use crate::coordinates::Coordinates;
use crate::pawn::{Pawn, PawnId, PawnKind, Side};
use crate::protocol::Move;

/// Bit flags describing what a move did.
///
/// Every flag includes the bits of the flags it implies, so a king capture
/// also reads as a defender capture, an opponent capture and a plain move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MoveResult(u8);

impl MoveResult {
    pub const NONE: MoveResult = MoveResult(0);
    pub const PAWN_MOVED: MoveResult = MoveResult(1);
    pub const OPPONENT_PAWN_CAPTURED: MoveResult = MoveResult(2 | Self::PAWN_MOVED.0);
    pub const DEFENDER_PAWN_CAPTURED: MoveResult = MoveResult(4 | Self::OPPONENT_PAWN_CAPTURED.0);
    pub const ATTACKER_PAWN_CAPTURED: MoveResult = MoveResult(8 | Self::OPPONENT_PAWN_CAPTURED.0);
    pub const ALL_ATTACKERS_CAPTURED: MoveResult =
        MoveResult(16 | Self::ATTACKER_PAWN_CAPTURED.0);
    pub const KING_CAPTURED: MoveResult = MoveResult(32 | Self::DEFENDER_PAWN_CAPTURED.0);
    pub const KING_ESCAPED: MoveResult = MoveResult(64 | Self::PAWN_MOVED.0);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: MoveResult) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The reason this move ended the game, if it did.
    pub fn game_over_reason(self) -> Option<GameOverReason> {
        if self.contains(Self::KING_CAPTURED) {
            Some(GameOverReason::KingCaptured)
        } else if self.contains(Self::KING_ESCAPED) {
            Some(GameOverReason::KingEscaped)
        } else if self.contains(Self::ALL_ATTACKERS_CAPTURED) {
            Some(GameOverReason::AllAttackersCaptured)
        } else {
            None
        }
    }
}

impl BitOr for MoveResult {
    type Output = MoveResult;

    fn bitor(self, rhs: MoveResult) -> MoveResult {
        MoveResult(self.0 | rhs.0)
    }
}

impl BitOrAssign for MoveResult {
    fn bitor_assign(&mut self, rhs: MoveResult) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    KingCaptured,
    KingEscaped,
    AllAttackersCaptured,
}

impl GameOverReason {
    pub fn winner(&self) -> Side {
        match self {
            GameOverReason::KingCaptured => Side::Attackers,
            GameOverReason::KingEscaped | GameOverReason::AllAttackersCaptured => Side::Defenders,
        }
    }
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::KingCaptured => write!(f, "King captured"),
            GameOverReason::KingEscaped => write!(f, "King escaped"),
            GameOverReason::AllAttackersCaptured => write!(f, "All attackers captured"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub reason: GameOverReason,
    pub winner: Side,
}

/// Verdict of a legality check. Checks run in declaration order and the
/// first failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveValidation {
    GameAlreadyOver,
    NoPawnOnField,
    NonCurrentPlayerPawn,
    OutOfBounds,
    PawnAlreadyOnField,
    PawnCannotMove,
    NotInLine,
    PathBlocked,
    RestrictedField,
    Success,
}

impl MoveValidation {
    pub fn is_success(&self) -> bool {
        *self == MoveValidation::Success
    }
}

impl fmt::Display for MoveValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MoveValidation::GameAlreadyOver => "Game already over",
            MoveValidation::NoPawnOnField => "No pawn on the source field",
            MoveValidation::NonCurrentPlayerPawn => "Pawn does not belong to the side to move",
            MoveValidation::OutOfBounds => "Destination is off the board",
            MoveValidation::PawnAlreadyOnField => "Pawn is already on that field",
            MoveValidation::PawnCannotMove => "Pawn has no free neighbouring field",
            MoveValidation::NotInLine => "Destination is not on the same row or column",
            MoveValidation::PathBlocked => "Path is blocked",
            MoveValidation::RestrictedField => "Only the king may enter the throne or a corner",
            MoveValidation::Success => "Success",
        };
        f.write_str(text)
    }
}

/// Something a move produced that a transport or UI may want to relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    InvalidMove {
        pawn: Option<PawnId>,
        field: Coordinates,
        reason: MoveValidation,
    },
    PawnCaptured {
        captured: PawnId,
        kind: PawnKind,
        at: Coordinates,
        capturing: PawnId,
        assisting: Vec<Coordinates>,
    },
    GameOver(GameOver),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub result: MoveResult,
    pub validation: MoveValidation,
    pub events: Vec<GameEvent>,
}

impl MoveOutcome {
    fn rejected(pawn: Option<PawnId>, field: Coordinates, reason: MoveValidation) -> Self {
        MoveOutcome {
            result: MoveResult::NONE,
            validation: reason,
            events: vec![GameEvent::InvalidMove {
                pawn,
                field,
                reason,
            }],
        }
    }

    pub fn is_success(&self) -> bool {
        self.validation.is_success()
    }

    /// Number of pawns this move took off the board.
    pub fn captured(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, GameEvent::PawnCaptured { .. }))
            .count()
    }

    pub fn game_over(&self) -> Option<GameOver> {
        self.events.iter().find_map(|event| match event {
            GameEvent::GameOver(over) => Some(*over),
            _ => None,
        })
    }
}

/// A capture found while the board is only borrowed, applied afterwards.
struct Capture {
    victim: Pawn,
    at: Coordinates,
    assisting: Vec<Coordinates>,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_side: Side,
    moves: Vec<Move>,
    game_over: Option<GameOver>,
}

impl Game {
    /// Create a new game in the opening position, attackers to move.
    pub fn new() -> Self {
        let mut game = Game {
            board: Board::new(),
            current_side: Side::Attackers,
            moves: Vec::new(),
            game_over: None,
        };
        game.restart();
        game
    }

    pub fn restart(&mut self) {
        self.board.reset();
        self.current_side = Side::Attackers;
        self.moves.clear();
        self.game_over = None;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_side(&self) -> Side {
        self.current_side
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over(&self) -> Option<GameOver> {
        self.game_over
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Replays the recorded moves on a fresh game, yielding the board after
    /// each one.
    pub fn history(&self) -> impl Iterator<Item = Board> + '_ {
        let mut replay = Game::new();
        self.moves.iter().map(move |mv| {
            replay.apply(mv);
            replay.board.clone()
        })
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.board.pawn(id)
    }

    /// Every pawn of this game, captured ones included.
    pub fn pawns(&self) -> impl Iterator<Item = &Pawn> + '_ {
        self.board.pawn_records().iter()
    }

    pub fn attacker_pawns(&self) -> impl Iterator<Item = &Pawn> + '_ {
        self.pawns().filter(|pawn| pawn.kind() == PawnKind::Attacker)
    }

    pub fn defender_pawns(&self) -> impl Iterator<Item = &Pawn> + '_ {
        self.pawns().filter(|pawn| pawn.kind() == PawnKind::Defender)
    }

    pub fn king(&self) -> Option<&Pawn> {
        self.pawns().find(|pawn| pawn.is_king())
    }

    pub fn current_side_movable_pawns(&self) -> impl Iterator<Item = &Pawn> + '_ {
        self.board.pawns(self.current_side, true)
    }

    pub fn can_make_move(&self, pawn: PawnId, to: Coordinates) -> MoveValidation {
        match self.validate(pawn, to) {
            Ok(_) => MoveValidation::Success,
            Err(reason) => reason,
        }
    }

    pub fn can_make_move_at(&self, from: Coordinates, to: Coordinates) -> MoveValidation {
        match self.pawn_id_at(from) {
            Ok(id) => self.can_make_move(id, to),
            Err(reason) => reason,
        }
    }

    /// Validate and play a move. A rejected move leaves the game untouched.
    pub fn make_move(&mut self, pawn: PawnId, to: Coordinates) -> MoveOutcome {
        let (mover, from) = match self.validate(pawn, to) {
            Ok(checked) => checked,
            Err(reason) => {
                warn!(pawn = pawn.index(), to = %to, %reason, "Rejected move");
                return MoveOutcome::rejected(Some(pawn), to, reason);
            }
        };

        self.moves.push(Move::new(from, to));
        self.board.move_pawn(pawn, to);
        debug!(side = %self.current_side, from = %from, to = %to, "Moved pawn");

        let mut result = MoveResult::PAWN_MOVED;
        let mut events = Vec::new();

        if mover.is_king() && self.board.field(to).is_some_and(Field::is_corner) {
            result |= MoveResult::KING_ESCAPED;
        }

        for capture in self.find_captures(mover.side(), to) {
            self.board.remove_pawn(capture.victim.id());
            result |= match capture.victim.kind() {
                PawnKind::King => MoveResult::KING_CAPTURED,
                PawnKind::Defender => MoveResult::DEFENDER_PAWN_CAPTURED,
                PawnKind::Attacker => MoveResult::ATTACKER_PAWN_CAPTURED,
            };
            debug!(kind = ?capture.victim.kind(), at = %capture.at, "Captured pawn");
            events.push(GameEvent::PawnCaptured {
                captured: capture.victim.id(),
                kind: capture.victim.kind(),
                at: capture.at,
                capturing: pawn,
                assisting: capture.assisting,
            });
        }

        if self.board.pawns(Side::Attackers, false).next().is_none() {
            result |= MoveResult::ALL_ATTACKERS_CAPTURED;
        }

        match result.game_over_reason() {
            Some(reason) => {
                let over = GameOver {
                    reason,
                    winner: reason.winner(),
                };
                info!(%reason, winner = %over.winner, moves = self.moves.len(), "Game over");
                self.game_over = Some(over);
                events.push(GameEvent::GameOver(over));
            }
            None => self.current_side = self.current_side.opponent(),
        }

        MoveOutcome {
            result,
            validation: MoveValidation::Success,
            events,
        }
    }

    /// Coordinate form of [`Game::make_move`].
    pub fn make_move_at(&mut self, from: Coordinates, to: Coordinates) -> MoveOutcome {
        match self.pawn_id_at(from) {
            Ok(id) => self.make_move(id, to),
            Err(reason) => {
                warn!(from = %from, to = %to, %reason, "Rejected move");
                MoveOutcome::rejected(None, to, reason)
            }
        }
    }

    pub fn apply(&mut self, mv: &Move) -> MoveOutcome {
        self.make_move_at(mv.from, mv.to)
    }

    /// An independent copy of the position for look-ahead: same pawns on the
    /// same fields and the same side to move, no history.
    pub fn clone_for_simulation(&self) -> Game {
        Game {
            board: self.board.snapshot(),
            current_side: self.current_side,
            moves: Vec::new(),
            game_over: None,
        }
    }

    fn pawn_id_at(&self, from: Coordinates) -> Result<PawnId, MoveValidation> {
        if self.is_game_over() {
            return Err(MoveValidation::GameAlreadyOver);
        }
        self.board
            .pawn_at(from)
            .map(Pawn::id)
            .ok_or(MoveValidation::NoPawnOnField)
    }

    fn validate(&self, pawn: PawnId, to: Coordinates) -> Result<(Pawn, Coordinates), MoveValidation> {
        if self.is_game_over() {
            return Err(MoveValidation::GameAlreadyOver);
        }

        let pawn = self
            .board
            .pawn(pawn)
            .filter(|pawn| pawn.side() == self.current_side)
            .copied()
            .ok_or(MoveValidation::NonCurrentPlayerPawn)?;
        let from = pawn.field().ok_or(MoveValidation::NonCurrentPlayerPawn)?;

        if !Board::are_valid(to) {
            return Err(MoveValidation::OutOfBounds);
        }
        if to == from {
            return Err(MoveValidation::PawnAlreadyOnField);
        }
        if !self.board.can_move(&pawn) {
            return Err(MoveValidation::PawnCannotMove);
        }

        let offset = to - from;
        if offset.rows != 0 && offset.columns != 0 {
            return Err(MoveValidation::NotInLine);
        }

        let step = offset.signum();
        let path: Vec<&Field> =
            std::iter::successors(Some(from + step), |&c| (c != to).then(|| c + step))
                .filter_map(|c| self.board.field(c))
                .collect();

        if path.iter().any(|field| !field.is_empty()) {
            return Err(MoveValidation::PathBlocked);
        }
        if !pawn.is_king() && path.iter().any(|field| field.is_king_only()) {
            return Err(MoveValidation::RestrictedField);
        }

        Ok((pawn, from))
    }

    /// Evaluate every opposing neighbour of `at` in parallel. Nothing is
    /// removed here; one evaluation never depends on another's victim.
    fn find_captures(&self, side: Side, at: Coordinates) -> Vec<Capture> {
        let targets: Vec<Pawn> = self
            .board
            .adjacent_fields(at)
            .filter_map(|field| field.occupant())
            .filter_map(|id| self.board.pawn(id))
            .filter(|pawn| pawn.side() != side)
            .copied()
            .collect();

        targets
            .into_par_iter()
            .filter_map(|victim| {
                if victim.is_king() {
                    self.king_capture(victim)
                } else {
                    self.custodian_capture(side, at, victim)
                }
            })
            .collect()
    }

    /// The king falls when all four neighbours are attackers or the throne.
    fn king_capture(&self, king: Pawn) -> Option<Capture> {
        let at = king.field()?;
        let assisting: Vec<Coordinates> = self
            .board
            .adjacent_fields(at)
            .filter(|field| {
                field.is_center()
                    || self
                        .board
                        .pawn_at(field.coordinates())
                        .is_some_and(|pawn| pawn.kind() == PawnKind::Attacker)
            })
            .map(Field::coordinates)
            .collect();

        (assisting.len() == 4).then_some(Capture {
            victim: king,
            at,
            assisting,
        })
    }

    /// Sandwich rule: the field beyond the victim, seen from the mover, must
    /// hold a friendly pawn or be a corner.
    fn custodian_capture(&self, side: Side, mover: Coordinates, victim: Pawn) -> Option<Capture> {
        let at = victim.field()?;
        let beyond = at + (at - mover);
        let field = self.board.field(beyond)?;

        let hostile = field.is_corner()
            || self
                .board
                .pawn_at(beyond)
                .is_some_and(|pawn| pawn.side() == side);

        hostile.then(|| Capture {
            victim,
            at,
            assisting: vec![beyond],
        })
    }
}

#[cfg(test)]
impl Game {
    /// A game on a hand-built board.
    pub(crate) fn from_board(board: Board, side: Side) -> Self {
        Game {
            board,
            current_side: side,
            moves: Vec::new(),
            game_over: None,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(label: &str) -> Coordinates {
        label.parse().unwrap()
    }

    fn play(game: &mut Game, from: &str, to: &str) -> MoveOutcome {
        game.make_move_at(at(from), at(to))
    }

    #[test]
    fn test_game_starts_with_attackers_turn() {
        let game = Game::new();
        assert_eq!(game.current_side(), Side::Attackers);
        assert!(!game.is_game_over());
        assert!(game.moves().is_empty());
        assert_eq!(game.attacker_pawns().count(), 24);
        assert_eq!(game.defender_pawns().count(), 12);
        assert!(game.king().is_some());
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = Game::new();

        let outcome = play(&mut game, "a4", "c4");
        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert_eq!(game.current_side(), Side::Defenders);

        let outcome = play(&mut game, "d6", "d2");
        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert_eq!(game.current_side(), Side::Attackers);
        assert_eq!(game.moves().len(), 2);
        assert_eq!(game.moves()[0], Move::new(at("a4"), at("c4")));
    }

    #[test]
    fn test_regular_piece_capture_by_sandwich() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        let victim = board.place(PawnKind::Defender, at("d3"));
        board.place(PawnKind::Attacker, at("c3"));
        let mover = board.place(PawnKind::Attacker, at("e1"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "e1", "e3");

        assert_eq!(outcome.result, MoveResult::DEFENDER_PAWN_CAPTURED);
        assert_eq!(outcome.captured(), 1);
        assert!(game.board().pawn_at(at("d3")).is_none());
        assert!(game.pawn(victim).unwrap().is_captured());
        assert_eq!(
            outcome.events,
            vec![GameEvent::PawnCaptured {
                captured: victim,
                kind: PawnKind::Defender,
                at: at("d3"),
                capturing: mover,
                assisting: vec![at("c3")],
            }]
        );
        assert_eq!(game.current_side(), Side::Defenders);
    }

    #[test]
    fn test_corner_is_hostile_to_defenders() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Defender, at("b1"));
        board.place(PawnKind::Attacker, at("c5"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "c5", "c1");

        assert_eq!(outcome.result, MoveResult::DEFENDER_PAWN_CAPTURED);
        assert!(game.board().pawn_at(at("b1")).is_none());
    }

    #[test]
    fn test_corner_is_hostile_to_attackers() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Attacker, at("a2"));
        board.place(PawnKind::Attacker, at("h9"));
        board.place(PawnKind::Defender, at("a4"));
        let mut game = Game::from_board(board, Side::Defenders);

        let outcome = play(&mut game, "a4", "a3");

        assert_eq!(outcome.result, MoveResult::ATTACKER_PAWN_CAPTURED);
        assert!(!game.is_game_over());
        assert_eq!(game.current_side(), Side::Attackers);
    }

    #[test]
    fn test_no_capture_without_sandwich() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Defender, at("d3"));
        board.place(PawnKind::Attacker, at("e1"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "e1", "e3");

        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert!(outcome.events.is_empty());
        assert!(game.board().pawn_at(at("d3")).is_some());
    }

    #[test]
    fn test_no_capture_against_board_edge() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Defender, at("a3"));
        board.place(PawnKind::Attacker, at("b5"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "b5", "b3");

        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert!(game.board().pawn_at(at("a3")).is_some());
    }

    #[test]
    fn test_throne_is_not_hostile_to_regular_pawns() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("a11"));
        board.place(PawnKind::Defender, at("f5"));
        board.place(PawnKind::Attacker, at("f1"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "f1", "f4");

        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert!(game.board().pawn_at(at("f5")).is_some());
    }

    #[test]
    fn test_attackers_cannot_capture_each_other() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Attacker, at("c3"));
        board.place(PawnKind::Attacker, at("e3"));
        board.place(PawnKind::Attacker, at("d1"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "d1", "d3");

        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert_eq!(game.board().pawns(Side::Attackers, false).count(), 3);
    }

    #[test]
    fn test_multiple_captures_in_one_move() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Defender, at("d4"));
        board.place(PawnKind::Defender, at("d2"));
        board.place(PawnKind::Attacker, at("d5"));
        board.place(PawnKind::Attacker, at("d1"));
        board.place(PawnKind::Attacker, at("a3"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "a3", "d3");

        assert_eq!(outcome.result, MoveResult::DEFENDER_PAWN_CAPTURED);
        assert_eq!(outcome.captured(), 2);
        assert!(game.board().pawn_at(at("d4")).is_none());
        assert!(game.board().pawn_at(at("d2")).is_none());
        assert!(game.board().is_consistent());
    }

    #[test]
    fn test_king_capture_requires_four_sides() {
        let mut board = Board::new();
        let king = board.place(PawnKind::King, at("c8"));
        board.place(PawnKind::Attacker, at("c9"));
        board.place(PawnKind::Attacker, at("c7"));
        board.place(PawnKind::Attacker, at("b8"));
        board.place(PawnKind::Attacker, at("h8"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "h8", "d8");

        assert_eq!(outcome.result, MoveResult::KING_CAPTURED);
        assert!(game.pawn(king).unwrap().is_captured());
        assert!(game.board().pawn_at(at("c8")).is_none());
        assert_eq!(
            outcome.game_over(),
            Some(GameOver {
                reason: GameOverReason::KingCaptured,
                winner: Side::Attackers,
            })
        );
        assert_eq!(game.current_side(), Side::Attackers);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_king_not_captured_by_sandwich() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("c8"));
        board.place(PawnKind::Attacker, at("b8"));
        board.place(PawnKind::Attacker, at("h8"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "h8", "d8");

        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert!(!game.is_game_over());
    }

    #[test]
    fn test_throne_counts_against_the_king() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f7"));
        board.place(PawnKind::Attacker, at("e7"));
        board.place(PawnKind::Attacker, at("g7"));
        board.place(PawnKind::Attacker, at("k8"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "k8", "f8");

        assert_eq!(outcome.result, MoveResult::KING_CAPTURED);
        match &outcome.events[0] {
            GameEvent::PawnCaptured { assisting, .. } => {
                assert_eq!(assisting.len(), 4);
                assert!(assisting.contains(&at("f6")));
            }
            other => panic!("Expected a capture, got {:?}", other),
        }
    }

    #[test]
    fn test_king_on_edge_cannot_be_captured() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("a5"));
        board.place(PawnKind::Attacker, at("a6"));
        board.place(PawnKind::Attacker, at("a4"));
        board.place(PawnKind::Attacker, at("e5"));
        let mut game = Game::from_board(board, Side::Attackers);

        let outcome = play(&mut game, "e5", "b5");

        assert_eq!(outcome.result, MoveResult::PAWN_MOVED);
        assert!(!game.is_game_over());
    }

    #[test]
    fn test_king_wins_by_reaching_corner() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("k3"));
        board.place(PawnKind::Attacker, at("c3"));
        let mut game = Game::from_board(board, Side::Defenders);

        let outcome = play(&mut game, "k3", "k1");

        assert_eq!(outcome.result, MoveResult::KING_ESCAPED);
        assert_eq!(
            game.game_over(),
            Some(GameOver {
                reason: GameOverReason::KingEscaped,
                winner: Side::Defenders,
            })
        );
        assert_eq!(game.current_side(), Side::Defenders);
    }

    #[test]
    fn test_escape_with_capture_still_ends_game() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("a4"));
        board.place(PawnKind::Attacker, at("b1"));
        board.place(PawnKind::Defender, at("c1"));
        board.place(PawnKind::Attacker, at("h9"));
        let mut game = Game::from_board(board, Side::Defenders);

        let outcome = play(&mut game, "a4", "a1");

        assert!(outcome.result.contains(MoveResult::KING_ESCAPED));
        assert!(outcome.result.contains(MoveResult::ATTACKER_PAWN_CAPTURED));
        assert_eq!(game.game_over().map(|over| over.reason), Some(GameOverReason::KingEscaped));
    }

    #[test]
    fn test_capturing_last_attacker_wins() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        board.place(PawnKind::Attacker, at("d3"));
        board.place(PawnKind::Defender, at("c3"));
        board.place(PawnKind::Defender, at("e1"));
        let mut game = Game::from_board(board, Side::Defenders);

        let outcome = play(&mut game, "e1", "e3");

        assert_eq!(outcome.result, MoveResult::ALL_ATTACKERS_CAPTURED);
        assert_eq!(
            outcome.game_over(),
            Some(GameOver {
                reason: GameOverReason::AllAttackersCaptured,
                winner: Side::Defenders,
            })
        );
    }

    #[test]
    fn test_cannot_move_after_game_over() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("k3"));
        board.place(PawnKind::Attacker, at("c3"));
        let mut game = Game::from_board(board, Side::Defenders);
        play(&mut game, "k3", "k1");

        assert_eq!(
            game.can_make_move_at(at("c3"), at("c5")),
            MoveValidation::GameAlreadyOver
        );
        let outcome = play(&mut game, "c3", "c5");
        assert_eq!(outcome.result, MoveResult::NONE);
        assert_eq!(outcome.validation, MoveValidation::GameAlreadyOver);
    }

    #[test]
    fn test_validation_edge_cases() {
        let game = Game::new();

        assert_eq!(
            game.can_make_move_at(at("b2"), at("b3")),
            MoveValidation::NoPawnOnField
        );
        assert_eq!(
            game.can_make_move_at(at("d6"), at("d2")),
            MoveValidation::NonCurrentPlayerPawn
        );

        let id = game.board().pawn_at(at("a4")).unwrap().id();
        assert_eq!(
            game.can_make_move(id, Coordinates::new(3, -1)),
            MoveValidation::OutOfBounds
        );
        assert_eq!(game.can_make_move(id, at("c4")), MoveValidation::Success);
    }

    #[test]
    fn test_regular_pawn_cannot_cross_throne() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("a11"));
        let attacker = board.place(PawnKind::Attacker, at("f3"));
        let game = Game::from_board(board, Side::Attackers);

        assert_eq!(game.can_make_move(attacker, at("f9")), MoveValidation::RestrictedField);
        assert_eq!(game.can_make_move(attacker, at("f6")), MoveValidation::RestrictedField);
        assert_eq!(game.can_make_move(attacker, at("f5")), MoveValidation::Success);
        assert!(game
            .board()
            .available_destinations(game.pawn(attacker).unwrap())
            .iter()
            .all(|&c| game.can_make_move(attacker, c).is_success()));
    }

    #[test]
    fn test_captured_pawn_cannot_move() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("f6"));
        let victim = board.place(PawnKind::Defender, at("d3"));
        board.place(PawnKind::Attacker, at("c3"));
        board.place(PawnKind::Attacker, at("e1"));
        board.place(PawnKind::Attacker, at("j9"));
        let mut game = Game::from_board(board, Side::Attackers);
        play(&mut game, "e1", "e3");

        assert_eq!(
            game.can_make_move(victim, at("d5")),
            MoveValidation::NonCurrentPlayerPawn
        );
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let mut game = Game::new();
        let before = game.board().clone();
        let pawn = game.board().pawn_at(at("a4")).unwrap().id();

        let outcome = game.make_move(pawn, at("b3"));

        assert_eq!(outcome.validation, MoveValidation::NotInLine);
        assert_eq!(outcome.result, MoveResult::NONE);
        assert_eq!(
            outcome.events,
            vec![GameEvent::InvalidMove {
                pawn: Some(pawn),
                field: at("b3"),
                reason: MoveValidation::NotInLine,
            }]
        );
        assert_eq!(game.board(), &before);
        assert_eq!(game.current_side(), Side::Attackers);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn test_clone_for_simulation_is_independent() {
        let mut game = Game::new();
        play(&mut game, "a4", "c4");

        let mut clone = game.clone_for_simulation();
        assert_eq!(clone.current_side(), Side::Defenders);
        assert!(clone.moves().is_empty());
        assert_eq!(clone.board().all_pawns().count(), 37);

        play(&mut clone, "d6", "d2");

        assert!(game.board().pawn_at(at("d6")).is_some());
        assert!(game.board().pawn_at(at("d2")).is_none());
        assert_eq!(game.current_side(), Side::Defenders);
    }

    #[test]
    fn test_history_replays_every_board() {
        let mut game = Game::new();
        play(&mut game, "a4", "c4");
        play(&mut game, "d6", "d2");
        play(&mut game, "b6", "b11");

        let boards: Vec<Board> = game.history().collect();

        assert_eq!(boards.len(), 3);
        assert!(boards[0].pawn_at(at("c4")).is_some());
        assert!(boards[0].pawn_at(at("d6")).is_some());
        assert!(boards[1].pawn_at(at("d6")).is_none());
        assert_eq!(&boards[2], game.board());
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut board = Board::new();
        board.place(PawnKind::King, at("k3"));
        board.place(PawnKind::Attacker, at("c3"));
        let mut game = Game::from_board(board, Side::Defenders);
        play(&mut game, "k3", "k1");

        game.restart();

        assert!(!game.is_game_over());
        assert!(game.moves().is_empty());
        assert_eq!(game.current_side(), Side::Attackers);
        assert_eq!(game.board().all_pawns().count(), 37);
    }

    #[test]
    fn test_move_result_flags() {
        assert!(MoveResult::KING_CAPTURED.contains(MoveResult::DEFENDER_PAWN_CAPTURED));
        assert!(MoveResult::KING_CAPTURED.contains(MoveResult::OPPONENT_PAWN_CAPTURED));
        assert!(MoveResult::ALL_ATTACKERS_CAPTURED.contains(MoveResult::ATTACKER_PAWN_CAPTURED));
        assert!(!MoveResult::KING_ESCAPED.contains(MoveResult::OPPONENT_PAWN_CAPTURED));
        assert_eq!(MoveResult::KING_ESCAPED.bits(), 65);
        assert_eq!(MoveResult::KING_CAPTURED.bits(), 39);
        assert_eq!(MoveResult::ALL_ATTACKERS_CAPTURED.bits(), 27);
        assert_eq!(MoveResult::PAWN_MOVED.game_over_reason(), None);
        assert_eq!(
            (MoveResult::KING_ESCAPED | MoveResult::ALL_ATTACKERS_CAPTURED).game_over_reason(),
            Some(GameOverReason::KingEscaped)
        );
        assert!(MoveResult::NONE.is_none());
    }
}
