use crate::ai::AiPlayer;
use crate::game::Game;
use crate::pawn::Side;
use crate::protocol::Move;

/// Trait that all players driven by a [`crate::Match`] implement
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Get the next move for the current game, `None` if there is none
    fn get_move(&mut self, game: &Game) -> Option<Move>;

    /// Notified when the game starts
    fn game_start(&mut self, _side: Side) {}

    /// Notified when a move is made (by either side)
    fn notify_move(&mut self, _mv: &Move) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

impl Bot for AiPlayer {
    fn name(&self) -> &str {
        AiPlayer::name(self)
    }

    fn get_move(&mut self, game: &Game) -> Option<Move> {
        self.best_move(game)
    }

    fn game_start(&mut self, side: Side) {
        self.set_side(side);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiLevel;

    #[test]
    fn test_game_start_assigns_side() {
        let mut ai = AiPlayer::with_seed("ai", Side::Defenders, AiLevel::Easy, 2);
        let game = Game::new();

        ai.game_start(Side::Attackers);
        let mv = Bot::get_move(&mut ai, &game).unwrap();

        assert!(game.can_make_move_at(mv.from, mv.to).is_success());
        assert_eq!(Bot::name(&ai), "ai");
    }
}
