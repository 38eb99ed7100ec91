use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::coordinates::Coordinates;
use crate::game::{Game, MoveOutcome};
use crate::pawn::{PawnId, Side};
use crate::protocol::Move;

/// Score of a move that ends the game; outranks anything else.
const WINNING_SCORE: i64 = 1_000_000;
const CAPTURE_SCORE: i64 = 200;
const MOVE_SCORE: i64 = 1;
const MOBILITY_WEIGHT: i64 = 5;
/// Heuristic scores are scaled by this and jittered within it.
const JITTER_RANGE: i64 = 10;

/// Search strength. The look-ahead depth is one less than the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiLevel {
    Easy = 1,
    #[default]
    Medium = 2,
    Hard = 3,
}

impl AiLevel {
    pub fn depth(&self) -> u32 {
        *self as u32 - 1
    }
}

/// Heuristic opponent searching a few plies ahead on throwaway copies of
/// the game.
#[derive(Debug, Clone)]
pub struct AiPlayer {
    name: String,
    side: Side,
    level: AiLevel,
    rng: StdRng,
}

impl AiPlayer {
    pub fn new(name: impl Into<String>, side: Side, level: AiLevel) -> Self {
        Self::with_rng(name, side, level, StdRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`AiPlayer::new`] with reproducible tie-breaking.
    pub fn with_seed(name: impl Into<String>, side: Side, level: AiLevel, seed: u64) -> Self {
        Self::with_rng(name, side, level, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: impl Into<String>, side: Side, level: AiLevel, rng: StdRng) -> Self {
        AiPlayer {
            name: name.into(),
            side,
            level,
            rng,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn level(&self) -> AiLevel {
        self.level
    }

    pub(crate) fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    /// The pawn to move and its destination, or `None` when no pawn of the
    /// AI's side can move.
    ///
    /// # Panics
    ///
    /// If the game is over or it is not the AI's turn.
    pub fn get_move(&mut self, game: &Game) -> Option<(PawnId, Coordinates)> {
        let mv = self.best_move(game)?;
        let pawn = game.board().pawn_at(mv.from)?;
        Some((pawn.id(), mv.to))
    }

    /// Coordinate form of [`AiPlayer::get_move`], ready for the wire.
    #[instrument(skip(self, game), fields(ai = %self.name, side = %self.side, level = ?self.level))]
    pub fn best_move(&mut self, game: &Game) -> Option<Move> {
        if game.is_game_over() {
            panic!("Cannot make move: game is over.");
        }
        if game.current_side() != self.side {
            panic!("Cannot make move: not AI's turn.");
        }

        let best = self.find_best_move(game, self.side, self.level.depth());
        match &best {
            Some((mv, score)) => debug!(%mv, score, "Chose move"),
            None => debug!("No movable pawn"),
        }
        best.map(|(mv, _)| mv)
    }

    fn find_best_move(&mut self, game: &Game, side: Side, depth: u32) -> Option<(Move, i64)> {
        let board = game.board();
        let candidates: Vec<Move> = board
            .pawns(side, true)
            .filter_map(|pawn| Some((pawn.field()?, board.available_destinations(pawn))))
            .flat_map(|(from, destinations)| {
                destinations.into_iter().map(move |to| Move::new(from, to))
            })
            .collect();

        let mut best: Option<(Move, i64)> = None;
        for mv in candidates {
            let mut simulation = game.clone_for_simulation();
            let outcome = simulation.apply(&mv);

            let mut score = score_move(&outcome, &simulation, side) * JITTER_RANGE
                + self.rng.random_range(0..JITTER_RANGE);

            if depth > 0 && !simulation.is_game_over() {
                let replier = side.opponent();
                let reply = self
                    .find_best_move(&simulation, replier, depth - 1)
                    .map_or(0, |(_, score)| score);
                if replier == self.side {
                    score += reply;
                } else {
                    score -= reply;
                }
            }

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        best
    }
}

/// Heuristic value of a played move for the side that made it.
pub fn score_move(outcome: &MoveOutcome, game: &Game, side: Side) -> i64 {
    if outcome.result.game_over_reason().is_some() {
        return WINNING_SCORE;
    }

    let own_mobility = game.board().pawns(side, true).count() as i64;
    let opponent_mobility = game.board().pawns(side.opponent(), true).count() as i64;

    CAPTURE_SCORE * outcome.captured() as i64
        + MOVE_SCORE
        + MOBILITY_WEIGHT * (own_mobility - opponent_mobility)
}
