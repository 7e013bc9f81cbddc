//! Capability traits standing in for the host runtime.
//!
//! The controller never talks to real audio devices, animation graphs, or
//! overlay compositors; it holds one object-safe trait per collaborator and
//! the embedding client supplies the implementations. Everything runs on the
//! host's main simulation thread, so the traits take `&self` and rely on
//! interior mutability.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::pose::PoseProvider;

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Screen dimensions reported by the host, in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Opaque handle for a registered animation state handler.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StateHandlerId(pub u32);

/// Opaque handle for an overlay owned by the host compositor.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OverlayId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

pub const WHITE: Color = Color {
    red: 255,
    green: 255,
    blue: 255,
};

/// Whether an overlay lives in flat screen space or is anchored to the HUD
/// in front of the headset view direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Screen,
    Hud,
}

/// Full property set handed to the compositor when an overlay is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub kind: OverlayKind,
    pub image: String,
    pub color: Color,
    pub alpha: f32,
    pub scale: f32,
    pub facing_avatar: bool,
    pub draw_in_front: bool,
}

/// Screen-space rectangle for a 2D overlay, in pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Partial property update; `None` fields are left untouched by the host.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<OverlayBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
}

/// Audio device mute control. The device only exposes a toggle, not a
/// set-to-value call, so callers must read the flag before flipping it.
pub trait AudioHost {
    fn is_muted(&self) -> bool;
    fn toggle_mute(&self);
}

/// Self-view visibility of the avatar mesh. Does not change how other
/// participants see the avatar.
pub trait AvatarHost {
    fn set_mesh_visible(&self, visible: bool);
}

/// Animation-graph handler registry. The graph polls each registered
/// provider at least once per evaluated frame, feeding back the current
/// values of the variables named at registration, and applies the returned
/// mapping. Registrations must not be changed from inside a provider's own
/// invocation.
pub trait AnimationHost {
    fn add_state_handler(
        &self,
        provider: Rc<dyn PoseProvider>,
        watched: &[&str],
    ) -> StateHandlerId;
    fn remove_state_handler(&self, handler: StateHandlerId);
}

/// Overlay compositor: create-once, then edit with partial patches.
pub trait OverlayHost {
    fn add_overlay(&self, spec: OverlaySpec) -> OverlayId;
    fn edit_overlay(&self, overlay: OverlayId, patch: OverlayPatch);
}

/// Head-mounted display presence and HUD look-at queries.
pub trait HeadsetHost {
    fn active(&self) -> bool;
    fn hud_look_at_3d(&self) -> Vec3;
    fn hud_look_at_2d(&self) -> Vec2;
}

/// Pointer/reticle state.
pub trait ReticleHost {
    fn mouse_captured(&self) -> bool;
    fn set_allow_mouse_capture(&self, allow: bool);
    fn set_visible(&self, visible: bool);
    fn set_position(&self, position: Vec2);
}

/// Input-system queries plus enable/disable of a named binding table.
pub trait InputHost {
    fn viewport_dimensions(&self) -> Viewport;
    fn enable_mapping(&self, name: &str);
    fn disable_mapping(&self, name: &str);
}

/// The full host surface the controller needs, bundled so it can be passed
/// around as one value and cheaply cloned (all members are `Rc`).
#[derive(Clone)]
pub struct HostBindings {
    pub audio: Rc<dyn AudioHost>,
    pub avatar: Rc<dyn AvatarHost>,
    pub animation: Rc<dyn AnimationHost>,
    pub overlays: Rc<dyn OverlayHost>,
    pub headset: Rc<dyn HeadsetHost>,
    pub reticle: Rc<dyn ReticleHost>,
    pub input: Rc<dyn InputHost>,
}
