use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use away_core::host::Viewport;

#[derive(Parser, Debug)]
#[command(
    about = "Replays scripted host signals against the away controller",
    version
)]
pub struct Args {
    /// Path to the scenario JSON to replay
    #[arg(long)]
    pub scenario: PathBuf,

    /// Path to write the session event log as JSON
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Path to write the recorded host call log as JSON
    #[arg(long)]
    pub host_log_json: Option<PathBuf>,

    /// Path to write the per-frame animation variable snapshots as JSON
    #[arg(long)]
    pub pose_log_json: Option<PathBuf>,

    /// Simulated viewport dimensions as WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080")]
    pub viewport: String,

    /// Frames the away outro plays before the graph reports completion
    #[arg(long, default_value_t = 3)]
    pub outro_frames: u32,

    /// Image shown on the away overlays
    #[arg(long, default_value = "assets/away-overlay.png")]
    pub overlay_image: String,

    /// Print each scenario step as it is replayed
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn viewport(&self) -> Result<Viewport> {
        parse_viewport(&self.viewport)
    }
}

pub fn parse_viewport(raw: &str) -> Result<Viewport> {
    let Some((width, height)) = raw.split_once('x') else {
        bail!("viewport must be WIDTHxHEIGHT (got {raw})");
    };
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("viewport width is not a number (got {raw})"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("viewport height is not a number (got {raw})"))?;
    if width == 0 || height == 0 {
        bail!("viewport dimensions must be non-zero (got {raw})");
    }
    Ok(Viewport { width, height })
}
