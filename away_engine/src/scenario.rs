//! Scripted sequences of host signals.
//!
//! A scenario file is a JSON array of steps; the runner applies them in
//! order against a live controller and the simulated host. `frames` is the
//! only step that advances time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use away_core::input::{KeyInput, StandardInput};
use away_core::runtime::AwayRuntime;

use crate::hosts::SimulatedHost;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case", deny_unknown_fields)]
pub enum ScenarioStep {
    /// Run `count` frames: one controller tick plus one animation-graph
    /// evaluation each.
    Frames { count: u32 },
    KeyPress {
        text: String,
        #[serde(default)]
        is_auto_repeat: bool,
    },
    MousePress,
    ControllerPress { input: StandardInput },
    SetHmdActive { active: bool },
    SetMouseCaptured { captured: bool },
    SetMuted { muted: bool },
    Teardown,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("reading scenario {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing scenario {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("scenario {} contains no steps", path.display())]
    Empty { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Scenario {
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let steps: Vec<ScenarioStep> =
            serde_json::from_str(&raw).map_err(|source| ScenarioError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if steps.is_empty() {
            return Err(ScenarioError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Scenario { steps })
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }
}

/// Replay every step. Returns the number of frames that ran.
pub fn run(
    scenario: &Scenario,
    host: &SimulatedHost,
    runtime: &mut AwayRuntime,
    verbose: bool,
) -> u32 {
    for (index, step) in scenario.steps().iter().enumerate() {
        if verbose {
            eprintln!("[away_engine] step {index}: {step:?}");
        }
        match step {
            ScenarioStep::Frames { count } => {
                for _ in 0..*count {
                    runtime.frame_tick();
                    host.advance_frame();
                }
            }
            ScenarioStep::KeyPress {
                text,
                is_auto_repeat,
            } => {
                let event = KeyInput {
                    text: text.clone(),
                    is_auto_repeat: *is_auto_repeat,
                };
                runtime.key_pressed(&event);
            }
            ScenarioStep::MousePress => runtime.mouse_pressed(),
            ScenarioStep::ControllerPress { input } => runtime.controller_pressed(*input),
            ScenarioStep::SetHmdActive { active } => host.set_hmd_active(*active),
            ScenarioStep::SetMouseCaptured { captured } => host.set_mouse_captured(*captured),
            ScenarioStep::SetMuted { muted } => host.set_muted(*muted),
            ScenarioStep::Teardown => runtime.teardown(),
        }
    }
    host.frame()
}
