mod autoplay;
mod config;
mod presenter;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use common::config::Validate;
use common::games::SessionRng;
use common::games::match3::{BoardController, ChannelEventSink, load_game, save_game};
use common::logger::{self, LogLevel};
use common::log;

use crate::config::{RunnerConfig, get_config_manager};

#[derive(Parser)]
#[command(name = "dragon_gems_runner")]
struct Args {
    /// Config file; defaults to the one next to the executable.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    moves: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// Resume from this save file before playing.
    #[arg(long)]
    load: Option<String>,

    /// Write the final state here.
    #[arg(long)]
    save: Option<String>,

    #[arg(long)]
    use_log_prefix: bool,

    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut RunnerConfig) {
        if let Some(moves) = self.moves {
            config.moves = moves;
        }
        if let Some(seed) = self.seed {
            config.game.seed = Some(seed);
        }
        if let Some(step_delay_ms) = self.step_delay_ms {
            config.step_delay_ms = step_delay_ms;
        }
        if let Some(save) = &self.save {
            config.save_path = Some(save.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Runner".to_string())
    } else {
        None
    };
    let min_level = if args.verbose { LogLevel::Debug } else { LogLevel::Info };
    logger::init_logger(prefix, min_level);

    let mut config = get_config_manager(args.config.as_deref()).get_config()?;
    args.apply(&mut config);
    config.validate()?;

    let rng = match config.game.seed {
        Some(seed) => SessionRng::new(seed),
        None => SessionRng::from_random(),
    };
    let seed = rng.seed();

    let (sink, receiver) = ChannelEventSink::channel();
    let printer = tokio::spawn(presenter::print_events(
        receiver,
        Duration::from_millis(config.step_delay_ms),
    ));

    let mut controller = BoardController::new(&config.game, rng, sink);
    if let Some(path) = &args.load {
        let state = load_game(Path::new(path))?;
        controller.restore(&state)?;
        log!("Resumed from {}", path);
    }

    log!(
        "Playing {} moves as {} (seed {})",
        config.moves,
        controller.profile().name,
        seed
    );
    print!("{}", presenter::render_board(controller.board()));

    let summary = autoplay::play(&mut controller, config.moves);
    let state = controller.save_state();
    let final_board = presenter::render_board(controller.board());
    drop(controller);
    printer.await?;

    print!("{}", final_board);
    log!(
        "Played {} moves: score {}, longest cascade {}, {} steal(s) taking {} gem(s), {} reshuffle(s)",
        summary.moves_played,
        summary.score,
        summary.longest_cascade,
        summary.steals,
        summary.gems_stolen,
        summary.reshuffles
    );
    if !summary.milestones.is_empty() {
        log!("Streak milestones reached: {:?}", summary.milestones);
    }
    if summary.stuck {
        log!("Stopped early: no valid move left");
    }

    if let Some(path) = &config.save_path {
        save_game(Path::new(path), &state)?;
        log!("Saved game to {}", path);
    }

    Ok(())
}
