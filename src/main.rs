use anyhow::{Context, Result};
use clap::Parser;

use intersection_sim::simulation::{ControllerConfig, SimWorld, WorldConfig};

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Headless simulation of a signalized four-way intersection")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "1000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f32,

    /// Seed for reproducible vehicle spawning
    #[arg(long)]
    seed: Option<u64>,

    /// Vehicle green duration in seconds
    #[arg(long, default_value = "30")]
    green: f32,

    /// Vehicle yellow duration in seconds
    #[arg(long, default_value = "5")]
    yellow: f32,

    /// All-red clearance duration in seconds
    #[arg(long, default_value = "2")]
    all_red: f32,

    /// Mean seconds between vehicle spawns on each lane
    #[arg(long, default_value = "6")]
    spawn_interval: f32,

    /// Print a summary every this many simulated seconds (0 disables)
    #[arg(long, default_value = "10")]
    report_every: f32,

    /// Pause between summaries so the run can be followed live
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    let config = WorldConfig {
        controller: ControllerConfig {
            vehicle_green_duration: cli.green,
            vehicle_yellow_duration: cli.yellow,
            all_red_duration: cli.all_red,
        },
        spawn_interval: cli.spawn_interval,
        ..WorldConfig::default()
    };

    let mut world = match cli.seed {
        Some(seed) => SimWorld::with_seed(config, seed),
        None => SimWorld::new(config),
    }
    .context("Failed to set up the intersection")?;

    println!("Running intersection simulation in headless mode...");
    println!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);
    println!();

    // Calculate how many ticks cover one report interval
    let ticks_per_report = if cli.report_every > 0.0 && cli.delta > 0.0 {
        ((cli.report_every / cli.delta).ceil() as u32).max(1)
    } else {
        u32::MAX
    };

    let mut tick = 0;
    while tick < cli.ticks {
        let ticks_to_run = ticks_per_report.min(cli.ticks - tick);

        for _ in 0..ticks_to_run {
            tick += 1;
            world
                .tick(cli.delta)
                .with_context(|| format!("Simulation failed at tick {tick}"))?;
        }

        if tick < cli.ticks {
            println!("--- After tick {} ({:.1}s simulated time) ---", tick, world.time);
            world.print_summary();
            println!();

            if cli.realtime {
                std::thread::sleep(std::time::Duration::from_millis(500));
            }
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    world.log_report();

    Ok(())
}
