#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Forest Protector experience.

mod session;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use forest_protector_core::{Difficulty, GameConfig};
use forest_protector_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene};
use forest_protector_rendering_macroquad::MacroquadBackend;
use forest_protector_world::query;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Simulation step used when running without a window.
const HEADLESS_STEP: Duration = Duration::from_nanos(16_666_667);

#[derive(Parser, Debug)]
#[command(name = "forest-protector")]
#[command(about = "Defend the forest by building towers along the enemy path")]
struct Args {
    /// TOML file overriding the default game configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Starting difficulty, by level (1-5) or name (easy, normal, hard, expert, insane)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Seed for path generation, spawn timing and accuracy rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Synchronise frames with the display refresh rate
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,

    /// Draw primitive shapes instead of loading sprite images
    #[arg(long)]
    no_sprites: bool,

    /// Directory holding `<name>.png` sprite images
    #[arg(long, value_name = "DIR", default_value = "assets")]
    asset_dir: PathBuf,

    /// Run without a window for the given number of simulated seconds
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f64>,

    /// Log filter, e.g. `debug` or `forest_protector_world=trace`; overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    if let Ok(level) = value.parse::<u8>() {
        return Difficulty::new(level)
            .ok_or_else(|| format!("difficulty level must be between 1 and 5, got {level}"));
    }
    (1..=5)
        .filter_map(Difficulty::new)
        .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown difficulty `{value}`"))
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let filter = match log_level {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn resolve_config(args: &Args) -> Result<GameConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid game configuration")?;
    Ok(config)
}

fn run_headless(config: GameConfig, seconds: f64) -> Result<()> {
    let duration = Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("invalid headless duration {seconds}"))?;
    let mut session = Session::new(config);
    let idle = FrameInput::default();
    let mut simulated = Duration::ZERO;

    while simulated < duration && !query::game_state(session.world()).is_terminal() {
        session.advance(HEADLESS_STEP, &idle);
        simulated += HEADLESS_STEP;
    }

    let world = session.world();
    let summary = session.summary();
    tracing::info!(
        simulated_secs = simulated.as_secs_f64(),
        state = ?query::game_state(world),
        score = query::score(world),
        wave = query::wave(world),
        lives = query::lives(world),
        killed = summary.enemies_killed,
        escaped = summary.enemies_escaped,
        "headless run complete"
    );
    Ok(())
}

fn run_window(config: GameConfig, args: &Args) -> Result<()> {
    let scene = Scene::new(config.field).context("failed to describe the playing field")?;
    let mut session = Session::new(config);
    let presentation = Presentation::new(
        "Forest Protector",
        Color::from_rgb_u8(0, 100, 0),
        scene,
    );

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_sprite_loading(!args.no_sprites)
        .with_asset_dir(args.asset_dir.clone())
        .run(presentation, move |dt, input, scene| {
            session.advance(dt, &input);
            session.populate_scene(scene);
            true
        })
}

/// Entry point for the Forest Protector command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let config = resolve_config(&args)?;
    println!("{}", forest_protector_core::WELCOME_BANNER);
    tracing::info!(
        difficulty = config.difficulty.name(),
        seed = config.seed,
        final_wave = config.final_wave,
        "starting session"
    );

    match args.headless {
        Some(seconds) => run_headless(config, seconds),
        None => run_window(config, &args),
    }
}
