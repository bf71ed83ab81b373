use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use potion_dispenser::core::{GameConfig, GameResult, GameRng, PlayerId};
use potion_dispenser::game::{run_match, Actor, GreedyActor, RandomActor};
use potion_dispenser::recipes::RecipeCatalog;

/// Simulate a two-player match between scripted actors.
#[derive(Parser)]
#[command(name = "simulate", about = "Run a headless potion dispenser match")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "potions.toml")]
    config: PathBuf,

    /// Override the match seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns
    #[arg(long)]
    max_turns: Option<u32>,

    /// Seat a greedy actor in the second seat instead of a random one
    #[arg(long)]
    greedy: bool,

    /// Player names
    #[arg(long, num_args = 2, default_values = ["Ada", "Grace"])]
    names: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = GameConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(max_turns) = cli.max_turns {
        config.max_turns = Some(max_turns);
    }
    config.validate().context("invalid configuration")?;

    let catalog = RecipeCatalog::for_config(&config).context("building recipe catalog")?;

    let rng = GameRng::new(config.seed);
    let second: Box<dyn Actor> = if cli.greedy {
        Box::new(GreedyActor::new(&cli.names[1], config.cascade, rng.for_context("actor-2")))
    } else {
        Box::new(RandomActor::new(&cli.names[1], rng.for_context("actor-2")))
    };
    let actors: [Box<dyn Actor>; 2] = [
        Box::new(RandomActor::new(&cli.names[0], rng.for_context("actor-1"))),
        second,
    ];

    let report = run_match(&config, catalog, actors).context("match aborted")?;

    for notice in &report.notices {
        println!("{notice}");
    }
    println!();

    for player in PlayerId::all() {
        let state = report.table.player(player);
        let brewed: Vec<&str> = state
            .completed()
            .iter()
            .map(|tile| tile.recipe.name.as_str())
            .collect();
        println!(
            "{:<8} {:>3} points  brewed [{}]  skipped {}",
            state.name(),
            state.score(),
            brewed.join(", "),
            report.skipped[player]
        );
    }

    match report.result {
        GameResult::Winner(winner) => {
            println!("Winner: {}", report.table.player(winner).name());
        }
        GameResult::Draw => println!("Draw"),
    }

    Ok(())
}
