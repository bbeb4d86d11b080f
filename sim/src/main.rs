//! Headless runner: load a scene, tick one controller through it, print where it ended up.

mod observer;
mod runner;
mod scene;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

use crate::scene::Scene;

#[derive(Parser)]
#[command(name = "sim")]
#[command(about = "Run a kinematic character controller against a TOML scene", long_about = None)]
struct Cli {
    /// Path to the scene file
    scene: PathBuf,
    /// Number of fixed steps to run
    #[arg(short, long, default_value_t = 300)]
    ticks: u32,
    /// Fixed step length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// List the parameter presets usable in `preset` actions and exit
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.list_presets {
        for name in runner::preset_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let scene = Scene::from_file(&cli.scene)?;
    let summary = runner::run(&scene, cli.ticks, cli.dt)?;

    let state = &summary.state;
    println!(
        "position  {:.3} {:.3} {:.3}",
        summary.position.x, summary.position.y, summary.position.z
    );
    println!(
        "velocity  {:.3} {:.3} {:.3}",
        summary.velocity.x, summary.velocity.y, summary.velocity.z
    );
    println!(
        "grounded {}  sliding {}  falling {}  flying {}  on slope {}",
        state.is_grounded, state.is_sliding, state.is_falling, state.is_flying, state.is_on_slope
    );
    println!(
        "jumps {}  enters {}  stays {}  exits {}  ray hits {}",
        summary.jumps, summary.enters, summary.stays, summary.exits, summary.ray_hits
    );
    Ok(())
}
