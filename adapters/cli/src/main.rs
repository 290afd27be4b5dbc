#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless host that drives the Poke RPG engine with a synthetic clock.

mod config;

use std::{cell::RefCell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use poke_rpg_core::WorldGenerationConfig;
use poke_rpg_engine::{EngineConfig, EngineLoop};
use poke_rpg_system_encounter::{EnemySelector, EntropySelector, SeededSelector};
use poke_rpg_system_seed::{create_seed_string, seed_to_u32};
use poke_rpg_world::query;
use tracing_subscriber::EnvFilter;

/// Runs the exploration and combat loop without a user interface.
#[derive(Parser, Debug)]
#[command(name = "poke-rpg")]
#[command(about = "Explore a generated hex world and fight through its encounters")]
struct Args {
    /// World seed; overrides the seed of an imported preset
    #[arg(long, conflicts_with = "fresh_seed")]
    seed: Option<String>,

    /// Generate a fresh random seed
    #[arg(long)]
    fresh_seed: bool,

    /// TOML file with runner and combat tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON reference data replacing the embedded biome table and registry
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON generation preset to load
    #[arg(long)]
    import_preset: Option<PathBuf>,

    /// Write the resolved generation preset to this JSON file
    #[arg(long)]
    export_preset: Option<PathBuf>,

    /// Number of host frames to simulate
    #[arg(long, default_value_t = 6000)]
    frames: u32,

    /// Synthetic time between frames, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Pick enemies from OS entropy instead of the world seed
    #[arg(long)]
    random_enemies: bool,

    /// Enable debug diagnostics
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Default)]
struct Tally {
    victories: u32,
    defeats: u32,
    hexes_cleared: u32,
    last_tps: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let engine_config = match &args.config {
        Some(path) => config::load_engine_config(path)
            .with_context(|| format!("failed to load tuning from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let data = config::load_reference_data(args.data.as_deref())
        .context("failed to load reference data")?;

    let mut generation = match &args.import_preset {
        Some(path) => config::import_preset(path).context("failed to import preset")?,
        None => WorldGenerationConfig::default(),
    };
    if let Some(seed) = &args.seed {
        generation.seed = seed.clone();
    } else if args.fresh_seed {
        generation.seed = create_seed_string();
    }
    if let Some(path) = &args.export_preset {
        config::export_preset(&generation, path).context("failed to export preset")?;
        tracing::info!(path = %path.display(), "preset exported");
    }

    let selector: Box<dyn EnemySelector> = if args.random_enemies {
        Box::new(EntropySelector)
    } else {
        Box::new(SeededSelector::new(u64::from(seed_to_u32(&generation.seed))))
    };

    let mut engine = EngineLoop::generate(engine_config, &generation, data, selector);
    let tally = attach_tally(&mut engine);

    let frame = Duration::from_millis(args.frame_ms);
    let mut clock = Duration::ZERO;
    engine.start();
    // The first frame only anchors the runner's clock.
    for _ in 0..args.frames {
        engine.on_frame(clock);
        if !autopilot(&mut engine) {
            tracing::info!("every hex explored");
            break;
        }
        clock += frame;
    }
    engine.stop();

    print_summary(&engine, &generation.seed, &tally.borrow());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn attach_tally(engine: &mut EngineLoop) -> Rc<RefCell<Tally>> {
    let tally = Rc::new(RefCell::new(Tally::default()));

    let log_tally = Rc::clone(&tally);
    let _ = engine.subscribe_log(move |line| {
        tracing::debug!(target: "poke_rpg::log", "{line}");
        let mut tally = log_tally.borrow_mut();
        if line.ends_with("end winner=player") {
            tally.victories += 1;
        } else if line.ends_with("end winner=enemy") {
            tally.defeats += 1;
        } else if line.starts_with("Hex cleared") {
            tally.hexes_cleared += 1;
        }
    });

    let tps_tally = Rc::clone(&tally);
    let _ = engine.subscribe_throughput(move |tps| {
        tracing::debug!(tps, "throughput sample");
        tps_tally.borrow_mut().last_tps = *tps;
    });

    tally
}

/// Advances the scripted player; returns `false` once nothing is left to explore.
fn autopilot(engine: &mut EngineLoop) -> bool {
    if let Some(snapshot) = engine.encounter_snapshot() {
        if snapshot.ended {
            let _ = engine.close_encounter();
        } else if !snapshot.running {
            let _ = engine.start_combat();
        }
        return true;
    }

    let Some(hex) = query::next_unexplored(engine.world()).cloned() else {
        return false;
    };
    if engine.on_hex_clicked(&hex) {
        let _ = engine.start_combat();
    }
    true
}

fn print_summary(engine: &EngineLoop, seed: &str, tally: &Tally) {
    let (explored, cleared) = query::progress(engine.world());
    let stats = engine.runner_stats();
    println!("seed: {seed}");
    println!(
        "tiles: {} explored: {explored} cleared: {cleared}",
        engine.world().len()
    );
    println!(
        "fights: won {} lost {} hexes cleared {}",
        tally.victories, tally.defeats, tally.hexes_cleared
    );
    println!(
        "ticks: {} simulated: {:.2}s tps: {:.1}",
        stats.total_ticks,
        stats.simulated_time.as_secs_f64(),
        tally.last_tps
    );
}
