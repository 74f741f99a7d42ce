//! Headless Battle Runner
//!
//! Plays a seeded demo battle between two small armies and prints the
//! outcome as JSON or text. `--games N` plays N consecutive seeds in parallel.

use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use warband::battle::{Objective, Prayer, Spell, Stats, StrikeOrder, TerrainKind, TerrainPiece, Unit, Weapon};
use warband::command::Command;
use warband::core::config::GameConfig;
use warband::core::error::Result;
use warband::core::types::{PlayerId, Position, UnitId};
use warband::game::{Game, GameSnapshot};
use warband::player::{PassivePlayer, ScriptedPlayer};

/// Headless Battle Runner - seeded demo battles
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Play seeded demo battles and print the outcome")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of battle rounds
    #[arg(long)]
    rounds: Option<u32>,

    /// Game configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of games to play, one per consecutive seed
    #[arg(long, default_value_t = 1)]
    games: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include the full battle log and final snapshot
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct BattleSummary {
    seed: u64,
    outcome: String,
    winner: Option<String>,
    rounds: u32,
    victory_points: Vec<(String, u32)>,
    dice_rolled: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<GameSnapshot>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warband=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.battle_rounds = rounds;
    }

    let summaries = (0..args.games.max(1))
        .into_par_iter()
        .map(|i| play(seed.wrapping_add(i), &config, args.verbose))
        .collect::<Result<Vec<_>>>()?;

    match args.format.as_str() {
        "text" => {
            for summary in &summaries {
                print_text(summary);
            }
        }
        format => {
            if format != "json" {
                eprintln!("Unknown format '{}', defaulting to json", format);
            }
            let json = if summaries.len() == 1 {
                serde_json::to_string_pretty(&summaries[0])
            } else {
                serde_json::to_string_pretty(&summaries)
            };
            match json {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Failed to serialize results: {e}"),
            }
        }
    }
    Ok(())
}

/// Build and play one demo battle
fn play(seed: u64, config: &GameConfig, verbose: bool) -> Result<BattleSummary> {
    let mut game = Game::new(config.clone(), seed)?;
    let red = game.add_player("Red", Box::new(ScriptedPlayer::new("Red", red_orders())));
    let blue = game.add_player("Blue", Box::new(ScriptedPlayer::new("Blue", blue_orders())));
    deploy(&mut game, red, blue);

    let outcome = game.run()?;
    let summary = BattleSummary {
        seed,
        outcome: outcome.to_string(),
        winner: outcome.winner().and_then(|p| game.player(p)).map(|p| p.name.clone()),
        rounds: game.round(),
        victory_points: game
            .players()
            .iter()
            .map(|p| (p.name.clone(), p.victory_points))
            .collect(),
        dice_rolled: game.dice_rolled(),
        log: verbose.then(|| game.log().entries().to_vec()),
        snapshot: verbose.then(|| game.snapshot()),
    };
    Ok(summary)
}

/// Two small armies facing each other across a central objective
///
/// Unit ids follow deployment order: Red 1-3, Blue 4-6.
fn deploy(game: &mut Game, red: PlayerId, blue: PlayerId) {
    game.add_terrain(TerrainPiece::new("Old Wood", TerrainKind::Forest, Position::new(30.0, 10.0), 3.0));
    game.add_terrain(TerrainPiece::new("Low Wall", TerrainKind::Obstacle, Position::new(30.0, 30.0), 2.0));
    game.add_objective(Objective::new("Crossroads", Position::new(30.0, 22.0)));

    game.add_unit(
        Unit::new(UnitId(0), red, "Battlemage", Stats::new(6.0, 5, 2, 5), 1, Position::new(18.0, 22.0))
            .with_weapon(Weapon::melee("Staff", 2, 4, 4, 0, 1))
            .with_spells(1, vec![Spell::arcane_bolt(), Spell::mystic_shield()]),
    );
    game.add_unit(
        Unit::new(UnitId(0), red, "Longbowmen", Stats::new(5.0, 5, 1, 1), 10, Position::new(16.0, 14.0))
            .with_weapon(Weapon::longbow())
            .with_weapon(Weapon::melee("Knife", 5, 4, 5, 0, 1)),
    );
    game.add_unit(
        Unit::new(UnitId(0), red, "Sword Brothers", Stats::new(5.0, 4, 1, 1), 10, Position::new(27.0, 22.0))
            .with_weapon(Weapon::melee("Sword", 20, 3, 4, 0, 1)),
    );

    game.add_unit(
        Unit::new(UnitId(0), blue, "Marauders", Stats::new(6.0, 5, 1, 1), 10, Position::new(32.0, 22.0))
            .with_weapon(Weapon::melee("Axe", 20, 4, 3, 1, 1)),
    );
    game.add_unit(
        Unit::new(UnitId(0), blue, "Ogre Brutes", Stats::new(6.0, 4, 1, 4), 3, Position::new(40.0, 24.0))
            .with_weapon(Weapon::melee("Club", 9, 4, 3, 1, 2))
            .with_strike_order(StrikeOrder::StrikeLast),
    );
    game.add_unit(
        Unit::new(UnitId(0), blue, "War Shrine", Stats::new(5.0, 4, 2, 6), 1, Position::new(42.0, 18.0))
            .with_ward(5)
            .with_prayers(1, vec![Prayer::smite(), Prayer::heal()]),
    );
}

fn red_orders() -> Vec<Command> {
    vec![
        Command::Cast { unit: UnitId(1), spell: "Arcane Bolt".to_string(), target: UnitId(4) },
        Command::Shoot { unit: UnitId(2), target: UnitId(4) },
        Command::AllOutAttack { unit: UnitId(3) },
    ]
}

fn blue_orders() -> Vec<Command> {
    vec![
        Command::Chant { unit: UnitId(6), prayer: "Heal".to_string(), target: UnitId(4) },
        Command::Move { unit: UnitId(5), destination: Position::new(36.0, 24.0) },
        Command::Charge { unit: UnitId(5), target: UnitId(3) },
    ]
}

fn print_text(summary: &BattleSummary) {
    println!("Battle Result (seed {})", summary.seed);
    println!("=============");
    println!("Outcome: {}", summary.outcome);
    if let Some(winner) = &summary.winner {
        println!("Winner: {winner}");
    }
    println!("Rounds played: {}", summary.rounds);
    for (name, points) in &summary.victory_points {
        println!("  {name}: {points} VP");
    }
    println!("Dice rolled: {}", summary.dice_rolled);
    if let Some(log) = &summary.log {
        println!();
        for line in log {
            println!("{line}");
        }
    }
    println!();
}
