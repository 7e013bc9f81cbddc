use std::fs;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod hosts;
mod scenario;

use away_core::runtime::AwayRuntime;
use cli::Args;
use hosts::SimulatedHost;
use scenario::Scenario;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();

    let viewport = args.viewport()?;
    let scenario = Scenario::load(&args.scenario)?;

    let host = SimulatedHost::new(viewport, args.outro_frames);
    let mut runtime = AwayRuntime::new(host.bindings(), &args.overlay_image);

    let frames = scenario::run(&scenario, &host, &mut runtime, args.verbose);

    println!(
        "Replayed {} steps over {} frames; final mode {:?}",
        scenario.steps().len(),
        frames,
        runtime.mode()
    );

    if let Some(path) = args.event_log_json.as_ref() {
        let json = serde_json::to_string_pretty(runtime.session().events())
            .context("serializing session event log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing session event log to {}", path.display()))?;
        println!("Saved session event log to {}", path.display());
    }

    if let Some(path) = args.host_log_json.as_ref() {
        let json = serde_json::to_string_pretty(&host.events())
            .context("serializing host call log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing host call log to {}", path.display()))?;
        println!("Saved host call log to {}", path.display());
    }

    if let Some(path) = args.pose_log_json.as_ref() {
        let json = serde_json::to_string_pretty(&host.pose_frames())
            .context("serializing pose frame log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing pose frame log to {}", path.display()))?;
        println!("Saved pose frame log to {}", path.display());
    }

    Ok(())
}
