//! Parkour - Headless Runner
//!
//! Runs the endless parkour simulation without a renderer, driven by the
//! autopilot, and prints a summary of the run.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use parkour_game::{Autopilot, GameEvent, Simulation, SimulationConfig};

/// Endless first-person parkour, simulated headless
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,

    /// World seed (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }

    let mut sim = Simulation::new(config).context("invalid configuration")?;

    let counts = Rc::new(RefCell::new(Vec::<(&'static str, u32)>::new()));
    let sink = Rc::clone(&counts);
    sim.subscribe(move |event: &GameEvent| {
        match event {
            GameEvent::Death { position } => log::info!("death at {position}"),
            GameEvent::Respawn { position } => log::info!("respawn at {position}"),
            _ => log::trace!("{}", event.name()),
        }

        let mut counts = sink.borrow_mut();
        match counts.iter_mut().find(|(name, _)| *name == event.name()) {
            Some((_, count)) => *count += 1,
            None => counts.push((event.name(), 1)),
        }
    });

    let pilot = Autopilot::default();
    for _ in 0..args.ticks {
        let input = pilot.steer(&sim);
        sim.tick(&input, args.dt);
    }

    let stats = sim.stats();
    println!("ticks:            {}", stats.ticks);
    println!("time:             {:.1}s", stats.time);
    println!("distance:         {:.1}", stats.distance);
    println!("best distance:    {:.1}", stats.best_distance);
    println!("jumps:            {}", stats.jumps);
    println!("deaths:           {}", stats.deaths);
    println!("checkpoints:      {}", stats.checkpoints);
    println!("chunks generated: {}", stats.chunks_generated);
    println!("chunks disposed:  {}", stats.chunks_disposed);
    println!("live chunks:      {}", sim.chunks().chunk_count());
    println!("position:         {}", sim.body().position);

    println!("events:");
    for (name, count) in counts.borrow().iter() {
        println!("  {name:<16} {count}");
    }

    Ok(())
}
