//! Scripted stand-in for the host runtime.
//!
//! One `SimulatedHost` implements every capability trait the controller
//! needs, records each call as a typed log entry, and models just enough of
//! the animation graph to exercise the exit choreography: registered pose
//! providers are polled once per frame with the current graph variables,
//! their output is applied back, and removing the away pose starts a
//! fixed-length outro after which the graph raises `awayOutroOnDone` for one
//! frame (trigger semantics: consumed after a single evaluation).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use away_core::host::{
    AnimationHost, AudioHost, AvatarHost, HeadsetHost, HostBindings, InputHost, OverlayHost,
    OverlayId, OverlayKind, OverlayPatch, OverlaySpec, ReticleHost, StateHandlerId, Vec2, Vec3,
    Viewport,
};
use away_core::pose::{AnimValue, AnimVars, PoseProvider, VAR_AWAY_OUTRO_DONE, VAR_IS_AWAY};

/// One recorded call into the host, tagged with the frame it landed on.
#[derive(Debug, Clone, Serialize)]
pub struct HostLogEntry {
    pub frame: u32,
    #[serde(flatten)]
    pub call: HostCall,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    ToggleMute { muted: bool },
    SetMeshVisible { visible: bool },
    AddStateHandler {
        handler: StateHandlerId,
        watched: Vec<String>,
    },
    RemoveStateHandler { handler: StateHandlerId },
    AddOverlay {
        overlay: OverlayId,
        kind: OverlayKind,
    },
    EditOverlay {
        overlay: OverlayId,
        patch: OverlayPatch,
    },
    SetAllowMouseCapture { allow: bool },
    SetReticleVisible { visible: bool },
    SetReticlePosition { position: Vec2 },
    EnableMapping { name: String },
    DisableMapping { name: String },
}

/// Snapshot of the graph variables after one evaluated frame.
#[derive(Debug, Clone, Serialize)]
pub struct PoseFrame {
    pub frame: u32,
    pub vars: AnimVars,
}

struct HandlerEntry {
    provider: Rc<dyn PoseProvider>,
    watched: Vec<String>,
}

struct GraphState {
    vars: AnimVars,
    outro_frames: u32,
    outro_remaining: Option<u32>,
    outro_trigger_armed: bool,
    last_is_away: bool,
}

struct HostState {
    frame: u32,
    muted: bool,
    hmd_active: bool,
    mouse_captured: bool,
    allow_mouse_capture: bool,
    reticle_visible: bool,
    mesh_visible: bool,
    viewport: Viewport,
    next_handler: u32,
    next_overlay: u32,
    handlers: BTreeMap<StateHandlerId, HandlerEntry>,
    overlays: BTreeMap<OverlayId, OverlaySpec>,
    graph: GraphState,
    events: Vec<HostLogEntry>,
    pose_frames: Vec<PoseFrame>,
}

#[derive(Clone)]
pub struct SimulatedHost {
    state: Rc<RefCell<HostState>>,
}

impl SimulatedHost {
    pub fn new(viewport: Viewport, outro_frames: u32) -> Self {
        SimulatedHost {
            state: Rc::new(RefCell::new(HostState {
                frame: 0,
                muted: false,
                hmd_active: false,
                mouse_captured: false,
                allow_mouse_capture: true,
                reticle_visible: true,
                mesh_visible: true,
                viewport,
                next_handler: 0,
                next_overlay: 0,
                handlers: BTreeMap::new(),
                overlays: BTreeMap::new(),
                graph: GraphState {
                    vars: AnimVars::new(),
                    outro_frames,
                    outro_remaining: None,
                    outro_trigger_armed: false,
                    last_is_away: false,
                },
                events: Vec::new(),
                pose_frames: Vec::new(),
            })),
        }
    }

    pub fn bindings(&self) -> HostBindings {
        HostBindings {
            audio: Rc::new(self.clone()),
            avatar: Rc::new(self.clone()),
            animation: Rc::new(self.clone()),
            overlays: Rc::new(self.clone()),
            headset: Rc::new(self.clone()),
            reticle: Rc::new(self.clone()),
            input: Rc::new(self.clone()),
        }
    }

    pub fn set_hmd_active(&self, active: bool) {
        self.state.borrow_mut().hmd_active = active;
    }

    pub fn set_mouse_captured(&self, captured: bool) {
        self.state.borrow_mut().mouse_captured = captured;
    }

    pub fn set_muted(&self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    pub fn frame(&self) -> u32 {
        self.state.borrow().frame
    }

    pub fn handler_count(&self) -> usize {
        self.state.borrow().handlers.len()
    }

    pub fn overlay_count(&self) -> usize {
        self.state.borrow().overlays.len()
    }

    pub fn is_mesh_visible(&self) -> bool {
        self.state.borrow().mesh_visible
    }

    pub fn mouse_capture_allowed(&self) -> bool {
        self.state.borrow().allow_mouse_capture
    }

    pub fn is_reticle_visible(&self) -> bool {
        self.state.borrow().reticle_visible
    }

    pub fn events(&self) -> Vec<HostLogEntry> {
        self.state.borrow().events.clone()
    }

    pub fn pose_frames(&self) -> Vec<PoseFrame> {
        self.state.borrow().pose_frames.clone()
    }

    /// Evaluate one animation-graph frame: poll every registered provider
    /// with the variables it watches, apply the outputs, then run the outro
    /// countdown and trigger bookkeeping.
    pub fn advance_frame(&self) {
        let handlers: Vec<(StateHandlerId, Rc<dyn PoseProvider>, Vec<String>)> = {
            let state = self.state.borrow();
            state
                .handlers
                .iter()
                .map(|(id, entry)| (*id, entry.provider.clone(), entry.watched.clone()))
                .collect()
        };

        let mut outputs: Vec<AnimVars> = Vec::with_capacity(handlers.len());
        for (_, provider, watched) in &handlers {
            let feedback: AnimVars = {
                let state = self.state.borrow();
                watched
                    .iter()
                    .filter_map(|name| {
                        state
                            .graph
                            .vars
                            .get(name)
                            .map(|value| (name.clone(), *value))
                    })
                    .collect()
            };
            outputs.push(provider.sample(&feedback));
        }

        let mut state = self.state.borrow_mut();
        state.frame += 1;

        let mut applied_is_away = None;
        for output in outputs {
            if let Some(value) = output.get(VAR_IS_AWAY) {
                applied_is_away = Some(value.is_truthy());
            }
            state.graph.vars.extend(output);
        }

        // The outro-done trigger is one-shot: visible to exactly one
        // evaluation, then cleared.
        if state.graph.outro_trigger_armed {
            state.graph.vars.remove(VAR_AWAY_OUTRO_DONE);
            state.graph.outro_trigger_armed = false;
        }

        if let Some(is_away) = applied_is_away {
            if state.graph.last_is_away && !is_away && state.graph.outro_remaining.is_none() {
                state.graph.outro_remaining = Some(state.graph.outro_frames);
            }
            state.graph.last_is_away = is_away;
        }

        if let Some(remaining) = state.graph.outro_remaining {
            if remaining == 0 {
                state
                    .graph
                    .vars
                    .insert(VAR_AWAY_OUTRO_DONE.to_string(), AnimValue::Bool(true));
                state.graph.outro_trigger_armed = true;
                state.graph.outro_remaining = None;
            } else {
                state.graph.outro_remaining = Some(remaining - 1);
            }
        }

        let snapshot = PoseFrame {
            frame: state.frame,
            vars: state.graph.vars.clone(),
        };
        state.pose_frames.push(snapshot);
    }

    fn record(&self, call: HostCall) {
        let mut state = self.state.borrow_mut();
        let frame = state.frame;
        state.events.push(HostLogEntry { frame, call });
    }
}

impl AudioHost for SimulatedHost {
    fn is_muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn toggle_mute(&self) {
        let muted = {
            let mut state = self.state.borrow_mut();
            state.muted = !state.muted;
            state.muted
        };
        self.record(HostCall::ToggleMute { muted });
    }
}

impl AvatarHost for SimulatedHost {
    fn set_mesh_visible(&self, visible: bool) {
        self.state.borrow_mut().mesh_visible = visible;
        self.record(HostCall::SetMeshVisible { visible });
    }
}

impl AnimationHost for SimulatedHost {
    fn add_state_handler(
        &self,
        provider: Rc<dyn PoseProvider>,
        watched: &[&str],
    ) -> StateHandlerId {
        let watched: Vec<String> = watched.iter().map(|name| name.to_string()).collect();
        let handler = {
            let mut state = self.state.borrow_mut();
            state.next_handler += 1;
            let handler = StateHandlerId(state.next_handler);
            state.handlers.insert(
                handler,
                HandlerEntry {
                    provider,
                    watched: watched.clone(),
                },
            );
            handler
        };
        self.record(HostCall::AddStateHandler { handler, watched });
        handler
    }

    fn remove_state_handler(&self, handler: StateHandlerId) {
        self.state.borrow_mut().handlers.remove(&handler);
        self.record(HostCall::RemoveStateHandler { handler });
    }
}

impl OverlayHost for SimulatedHost {
    fn add_overlay(&self, spec: OverlaySpec) -> OverlayId {
        let (overlay, kind) = {
            let mut state = self.state.borrow_mut();
            state.next_overlay += 1;
            let overlay = OverlayId(state.next_overlay);
            let kind = spec.kind;
            state.overlays.insert(overlay, spec);
            (overlay, kind)
        };
        self.record(HostCall::AddOverlay { overlay, kind });
        overlay
    }

    fn edit_overlay(&self, overlay: OverlayId, patch: OverlayPatch) {
        self.record(HostCall::EditOverlay { overlay, patch });
    }
}

impl HeadsetHost for SimulatedHost {
    fn active(&self) -> bool {
        self.state.borrow().hmd_active
    }

    fn hud_look_at_3d(&self) -> Vec3 {
        Vec3 {
            x: 0.0,
            y: 0.5,
            z: -1.0,
        }
    }

    fn hud_look_at_2d(&self) -> Vec2 {
        let viewport = self.state.borrow().viewport;
        Vec2 {
            x: viewport.width as f32 / 2.0,
            y: viewport.height as f32 / 2.0,
        }
    }
}

impl ReticleHost for SimulatedHost {
    fn mouse_captured(&self) -> bool {
        self.state.borrow().mouse_captured
    }

    fn set_allow_mouse_capture(&self, allow: bool) {
        self.state.borrow_mut().allow_mouse_capture = allow;
        self.record(HostCall::SetAllowMouseCapture { allow });
    }

    fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().reticle_visible = visible;
        self.record(HostCall::SetReticleVisible { visible });
    }

    fn set_position(&self, position: Vec2) {
        self.record(HostCall::SetReticlePosition { position });
    }
}

impl InputHost for SimulatedHost {
    fn viewport_dimensions(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn enable_mapping(&self, name: &str) {
        self.record(HostCall::EnableMapping {
            name: name.to_string(),
        });
    }

    fn disable_mapping(&self, name: &str) {
        self.record(HostCall::DisableMapping {
            name: name.to_string(),
        });
    }
}
