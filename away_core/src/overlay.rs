//! The away overlays and their placement.
//!
//! Two overlays are created hidden at startup: a flat screen-space image for
//! desktop mode and a HUD-anchored 3D image for headset mode. Showing picks
//! whichever matches the current display; the screen variant is refitted to
//! the viewport on every show so resizes between absences are picked up.

use std::rc::Rc;

use crate::host::{
    Color, HeadsetHost, InputHost, OverlayBounds, OverlayHost, OverlayId, OverlayKind,
    OverlayPatch, OverlaySpec, Viewport, WHITE,
};

/// Native size of the overlay artwork, in pixels.
pub const OVERLAY_NATIVE_WIDTH: f32 = 1920.0;
pub const OVERLAY_NATIVE_HEIGHT: f32 = 1080.0;

const OVERLAY_RATIO: f32 = OVERLAY_NATIVE_WIDTH / OVERLAY_NATIVE_HEIGHT;
const HUD_OVERLAY_SCALE: f32 = 2.0;
const OVERLAY_COLOR: Color = WHITE;
const OVERLAY_ALPHA: f32 = 1.0;

/// Fit the native image into `viewport`, preserving its aspect ratio and
/// centering along the constrained axis.
pub fn fit_to_viewport(viewport: Viewport) -> OverlayBounds {
    let screen_width = viewport.width as f32;
    let screen_height = viewport.height as f32;
    let screen_ratio = screen_width / screen_height;

    if screen_ratio < OVERLAY_RATIO {
        let width = screen_width;
        let height = screen_width / OVERLAY_RATIO;
        OverlayBounds {
            x: 0.0,
            y: (screen_height - height) / 2.0,
            width,
            height,
        }
    } else {
        let height = screen_height;
        let width = screen_height * OVERLAY_RATIO;
        OverlayBounds {
            x: (screen_width - width) / 2.0,
            y: 0.0,
            width,
            height,
        }
    }
}

fn screen_spec(image: &str) -> OverlaySpec {
    OverlaySpec {
        kind: OverlayKind::Screen,
        image: image.to_string(),
        color: OVERLAY_COLOR,
        alpha: OVERLAY_ALPHA,
        scale: 1.0,
        facing_avatar: false,
        draw_in_front: false,
    }
}

fn hud_spec(image: &str) -> OverlaySpec {
    OverlaySpec {
        kind: OverlayKind::Hud,
        image: image.to_string(),
        color: OVERLAY_COLOR,
        alpha: OVERLAY_ALPHA,
        scale: HUD_OVERLAY_SCALE,
        facing_avatar: true,
        draw_in_front: true,
    }
}

/// Owns the two overlay registrations and the show/hide/track choreography.
pub struct OverlayController {
    screen: OverlayId,
    hud: OverlayId,
    overlays: Rc<dyn OverlayHost>,
    headset: Rc<dyn HeadsetHost>,
    input: Rc<dyn InputHost>,
}

impl OverlayController {
    /// Create both overlays and leave them hidden.
    pub fn new(
        overlays: Rc<dyn OverlayHost>,
        headset: Rc<dyn HeadsetHost>,
        input: Rc<dyn InputHost>,
        image: &str,
    ) -> Self {
        let screen = overlays.add_overlay(screen_spec(image));
        let hud = overlays.add_overlay(hud_spec(image));
        let controller = OverlayController {
            screen,
            hud,
            overlays,
            headset,
            input,
        };
        controller.hide();
        controller
    }

    pub fn show(&self) {
        if self.headset.active() {
            self.overlays.edit_overlay(
                self.hud,
                OverlayPatch {
                    visible: Some(true),
                    position: Some(self.headset.hud_look_at_3d()),
                    ..OverlayPatch::default()
                },
            );
        } else {
            let bounds = fit_to_viewport(self.input.viewport_dimensions());
            self.overlays.edit_overlay(
                self.screen,
                OverlayPatch {
                    visible: Some(true),
                    bounds: Some(bounds),
                    ..OverlayPatch::default()
                },
            );
        }
    }

    pub fn hide(&self) {
        self.overlays.edit_overlay(
            self.screen,
            OverlayPatch {
                visible: Some(false),
                ..OverlayPatch::default()
            },
        );
        self.overlays.edit_overlay(
            self.hud,
            OverlayPatch {
                visible: Some(false),
                ..OverlayPatch::default()
            },
        );
    }

    /// Keep the HUD overlay in front of wherever the user is looking.
    /// Purely cosmetic; callers gate this on being away in headset mode.
    pub fn track_hud(&self) {
        self.overlays.edit_overlay(
            self.hud,
            OverlayPatch {
                position: Some(self.headset.hud_look_at_3d()),
                ..OverlayPatch::default()
            },
        );
    }
}
