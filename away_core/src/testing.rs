//! In-crate recording host used by the unit tests. The richer scripted host
//! lives in the harness crate; this one only records calls and lets tests
//! flip the polled flags.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::host::{
    AnimationHost, AudioHost, AvatarHost, HeadsetHost, HostBindings, InputHost, OverlayHost,
    OverlayId, OverlayKind, OverlayPatch, OverlaySpec, ReticleHost, StateHandlerId, Vec2, Vec3,
    Viewport,
};
use crate::pose::{AnimVars, PoseProvider};

struct HandlerEntry {
    provider: Rc<dyn PoseProvider>,
    #[allow(dead_code)]
    watched: Vec<String>,
}

struct RecordingState {
    muted: bool,
    hmd_active: bool,
    mouse_captured: bool,
    viewport: Viewport,
    calls: Vec<String>,
    next_handler: u32,
    next_overlay: u32,
    handlers: BTreeMap<StateHandlerId, HandlerEntry>,
}

#[derive(Clone)]
pub(crate) struct RecordingHost {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingHost {
    pub(crate) fn new() -> Self {
        RecordingHost {
            state: Rc::new(RefCell::new(RecordingState {
                muted: false,
                hmd_active: false,
                mouse_captured: false,
                viewport: Viewport {
                    width: 1920,
                    height: 1080,
                },
                calls: Vec::new(),
                next_handler: 0,
                next_overlay: 0,
                handlers: BTreeMap::new(),
            })),
        }
    }

    pub(crate) fn bindings(&self) -> HostBindings {
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

    pub(crate) fn set_muted(&self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    pub(crate) fn set_hmd_active(&self, active: bool) {
        self.state.borrow_mut().hmd_active = active;
    }

    pub(crate) fn set_mouse_captured(&self, captured: bool) {
        self.state.borrow_mut().mouse_captured = captured;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub(crate) fn has_call(&self, prefix: &str) -> bool {
        self.state
            .borrow()
            .calls
            .iter()
            .any(|call| call.starts_with(prefix))
    }

    pub(crate) fn count_calls(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.state.borrow().handlers.len()
    }

    /// Poll every registered provider with `feedback`, the way the graph
    /// would, and return what each reported.
    pub(crate) fn evaluate(&self, feedback: &AnimVars) -> Vec<AnimVars> {
        let providers: Vec<Rc<dyn PoseProvider>> = self
            .state
            .borrow()
            .handlers
            .values()
            .map(|entry| entry.provider.clone())
            .collect();
        providers
            .iter()
            .map(|provider| provider.sample(feedback))
            .collect()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.borrow_mut().calls.push(call.into());
    }
}

impl AudioHost for RecordingHost {
    fn is_muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn toggle_mute(&self) {
        let mut state = self.state.borrow_mut();
        state.muted = !state.muted;
        state.calls.push("audio.toggle_mute".to_string());
    }
}

impl AvatarHost for RecordingHost {
    fn set_mesh_visible(&self, visible: bool) {
        self.record(format!("avatar.set_mesh_visible {visible}"));
    }
}

impl AnimationHost for RecordingHost {
    fn add_state_handler(
        &self,
        provider: Rc<dyn PoseProvider>,
        watched: &[&str],
    ) -> StateHandlerId {
        let mut state = self.state.borrow_mut();
        state.next_handler += 1;
        let id = StateHandlerId(state.next_handler);
        state.handlers.insert(
            id,
            HandlerEntry {
                provider,
                watched: watched.iter().map(|name| name.to_string()).collect(),
            },
        );
        state
            .calls
            .push(format!("animation.add_state_handler {}", id.0));
        id
    }

    fn remove_state_handler(&self, handler: StateHandlerId) {
        let mut state = self.state.borrow_mut();
        state.handlers.remove(&handler);
        state
            .calls
            .push(format!("animation.remove_state_handler {}", handler.0));
    }
}

impl OverlayHost for RecordingHost {
    fn add_overlay(&self, spec: OverlaySpec) -> OverlayId {
        let mut state = self.state.borrow_mut();
        state.next_overlay += 1;
        let id = OverlayId(state.next_overlay);
        let kind = match spec.kind {
            OverlayKind::Screen => "screen",
            OverlayKind::Hud => "hud",
        };
        state.calls.push(format!("overlay.add {} {kind}", id.0));
        id
    }

    fn edit_overlay(&self, overlay: OverlayId, patch: OverlayPatch) {
        let mut state = self.state.borrow_mut();
        let mut call = format!("overlay.edit {}", overlay.0);
        if let Some(visible) = patch.visible {
            call.push_str(&format!(" visible={visible}"));
        }
        if patch.position.is_some() {
            call.push_str(" position");
        }
        if patch.bounds.is_some() {
            call.push_str(" bounds");
        }
        state.calls.push(call);
    }
}

impl HeadsetHost for RecordingHost {
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
        Vec2 { x: 960.0, y: 540.0 }
    }
}

impl ReticleHost for RecordingHost {
    fn mouse_captured(&self) -> bool {
        self.state.borrow().mouse_captured
    }

    fn set_allow_mouse_capture(&self, allow: bool) {
        self.record(format!("reticle.set_allow_mouse_capture {allow}"));
    }

    fn set_visible(&self, visible: bool) {
        self.record(format!("reticle.set_visible {visible}"));
    }

    fn set_position(&self, position: Vec2) {
        self.record(format!("reticle.set_position {},{}", position.x, position.y));
    }
}

impl InputHost for RecordingHost {
    fn viewport_dimensions(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn enable_mapping(&self, name: &str) {
        self.record(format!("input.enable_mapping {name}"));
    }

    fn disable_mapping(&self, name: &str) {
        self.record(format!("input.disable_mapping {name}"));
    }
}
