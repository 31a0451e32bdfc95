pub mod algorithm;
pub mod capture;
pub mod commands;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod tracking;

use std::path::PathBuf;

use clap::Parser;

pub use error::{GazeError, Result};

/// Replays a recorded landmark trace and reports where the gaze ended up.
#[derive(Debug, Parser)]
#[command(name = "gazefocus", version)]
pub struct Cli {
    /// Path to a trace.json recorded by a capture session.
    pub trace: PathBuf,
    /// Replay pace in frames per second; omit to replay unpaced.
    pub fps: Option<u32>,
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = commands::settings::load_settings()?;
    let trace = commands::trace::load_trace(&cli.trace)?;
    let frames = trace.frames.len();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(GazeError::Runtime)?;
    let report = runtime.block_on(commands::trace::replay_trace(trace, &settings, cli.fps));

    match report.final_position {
        Some((x, y)) => println!("final gaze: ({x:.1}, {y:.1})"),
        None => println!("final gaze: none"),
    }
    println!("detected frames: {}/{frames}", report.detected_frames);
    Ok(())
}
