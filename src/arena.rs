use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bot::Bot;
use crate::game::{Game, MoveValidation};
use crate::pawn::Side;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Plies played before the match is called off.
    pub max_moves: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig { max_moves: 200 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    AttackersWin { winner_name: String, moves: usize },
    DefendersWin { winner_name: String, moves: usize },
    /// The side to move had nothing to play.
    Stalemate { moves: usize },
    MoveLimit { moves: usize },
    IllegalMove {
        violator: String,
        winner: String,
        reason: MoveValidation,
    },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::AttackersWin { winner_name, .. } => Some(winner_name),
            MatchResult::DefendersWin { winner_name, .. } => Some(winner_name),
            MatchResult::IllegalMove { winner, .. } => Some(winner),
            MatchResult::Stalemate { .. } | MatchResult::MoveLimit { .. } => None,
        }
    }
}

/// Two bots playing one game on a local board.
pub struct Match {
    config: MatchConfig,
    game: Game,
    attacker_bot: Box<dyn Bot>,
    defender_bot: Box<dyn Bot>,
}

impl Match {
    pub fn new(attacker_bot: Box<dyn Bot>, defender_bot: Box<dyn Bot>, config: MatchConfig) -> Self {
        Match {
            config,
            game: Game::new(),
            attacker_bot,
            defender_bot,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn play(&mut self) -> MatchResult {
        self.attacker_bot.game_start(Side::Attackers);
        self.defender_bot.game_start(Side::Defenders);
        info!(
            attackers = self.attacker_bot.name(),
            defenders = self.defender_bot.name(),
            max_moves = self.config.max_moves,
            "Match starting"
        );

        let result = self.run();

        self.attacker_bot.game_end();
        self.defender_bot.game_end();
        info!(?result, "Match finished");
        result
    }

    fn run(&mut self) -> MatchResult {
        while !self.game.is_game_over() {
            let moves = self.game.moves().len();
            if moves >= self.config.max_moves {
                return MatchResult::MoveLimit { moves };
            }
            if let Some(result) = self.play_turn(self.game.current_side()) {
                return result;
            }
        }

        let moves = self.game.moves().len();
        match self.game.game_over().map(|over| over.winner) {
            Some(Side::Attackers) => MatchResult::AttackersWin {
                winner_name: self.attacker_bot.name().to_string(),
                moves,
            },
            Some(Side::Defenders) => MatchResult::DefendersWin {
                winner_name: self.defender_bot.name().to_string(),
                moves,
            },
            None => MatchResult::Stalemate { moves },
        }
    }

    fn play_turn(&mut self, side: Side) -> Option<MatchResult> {
        let (bot, opponent) = match side {
            Side::Attackers => (&mut self.attacker_bot, &mut self.defender_bot),
            Side::Defenders => (&mut self.defender_bot, &mut self.attacker_bot),
        };

        let Some(mv) = bot.get_move(&self.game) else {
            debug!(bot = bot.name(), "Returned no move");
            return Some(MatchResult::Stalemate {
                moves: self.game.moves().len(),
            });
        };

        let outcome = self.game.apply(&mv);
        if !outcome.is_success() {
            warn!(bot = bot.name(), %mv, reason = %outcome.validation, "Illegal move");
            return Some(MatchResult::IllegalMove {
                violator: bot.name().to_string(),
                winner: opponent.name().to_string(),
                reason: outcome.validation,
            });
        }

        debug!(
            ply = self.game.moves().len(),
            bot = bot.name(),
            %mv,
            captured = outcome.captured(),
            "Played move"
        );

        bot.notify_move(&mv);
        opponent.notify_move(&mv);
        None
    }
}
