use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use connect_four_ai::ai::{NTupleNetwork, TdlAgent};
use connect_four_ai::config::AppConfig;
use connect_four_ai::training::Trainer;

/// Train a Connect Four n-tuple agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a Connect Four TD-learning agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training games
    #[arg(long)]
    games: Option<u64>,

    /// Continue from the weights and training state in the configured paths
    #[arg(long)]
    resume: bool,

    /// Load the saved weights, run one evaluation block, and exit
    #[arg(long)]
    eval_only: bool,

    /// Seed exploration and the random evaluation opponent
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(games) = cli.games {
        app_config.training.num_games = games;
    }
    if let Some(seed) = cli.seed {
        app_config.tdl.seed = Some(seed);
        app_config.training.seed = Some(seed);
    }
    app_config.validate().context("invalid configuration")?;

    let board = app_config
        .board
        .build()
        .context("building board from configuration")?;
    let network = NTupleNetwork::standard(board.rows(), board.cols());
    info!(
        "{}x{} connect-{} board, {} tuples ({} weights)",
        board.rows(),
        board.cols(),
        board.connect(),
        network.num_tuples(),
        network.weights().len()
    );

    let mut agent = TdlAgent::new(app_config.tdl.clone(), network);
    let trainer = Trainer::new(app_config.training.clone(), app_config.search.clone(), board);

    if cli.eval_only {
        agent
            .load_weights(&app_config.training.weights_path)
            .with_context(|| {
                format!(
                    "loading weights from {}",
                    app_config.training.weights_path.display()
                )
            })?;
        let summary = trainer.evaluate(&mut agent);
        println!(
            "{} games: {} won, {} drawn, {} lost, score {:.3}",
            summary.games(),
            summary.wins,
            summary.draws,
            summary.losses,
            summary.score()
        );
        return Ok(());
    }

    if cli.resume {
        trainer
            .resume(&mut agent)
            .context("resuming from saved weights and training state")?;
    }

    let metrics = trainer.train(&mut agent).context("training failed")?;
    println!(
        "Training complete. {} games this run, {} in total.",
        metrics.total_episodes(),
        agent.games_played()
    );
    Ok(())
}
