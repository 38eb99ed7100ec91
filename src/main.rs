use hnefatafl_engine::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    println!("Hnefatafl Engine - AI vs AI");
    println!("===========================\n");

    let attackers = config.attacker_ai.build("Attacker AI", Side::Attackers);
    let defenders = config.defender_ai.build("Defender AI", Side::Defenders);

    let mut arena = Match::new(Box::new(attackers), Box::new(defenders), config.match_config);
    let result = arena.play();

    println!("{}", arena.game().board());
    println!("Moves: {}", arena.game().moves().iter().map(Move::to_string).collect::<Vec<_>>().join(" "));
    println!("\n===========================");
    println!("Match Result:");
    match result {
        MatchResult::AttackersWin { winner_name, moves } => {
            println!("  {} wins as Attackers in {} moves!", winner_name, moves);
        }
        MatchResult::DefendersWin { winner_name, moves } => {
            println!("  {} wins as Defenders in {} moves!", winner_name, moves);
        }
        MatchResult::Stalemate { moves } => {
            println!("  Stalemate after {} moves", moves);
        }
        MatchResult::MoveLimit { moves } => {
            println!("  Move limit reached after {} moves", moves);
        }
        MatchResult::IllegalMove {
            violator,
            winner,
            reason,
        } => {
            println!("  {} wins by illegal move (opponent: {}, {})", winner, violator, reason);
        }
    }
    if let Some(over) = arena.game().game_over() {
        println!("  Reason: {}", over.reason);
    }
    println!("===========================");
}
