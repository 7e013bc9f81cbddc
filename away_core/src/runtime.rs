//! Composition root wiring host events into the session.
//!
//! The host calls one method per signal source: `frame_tick` once per
//! rendered frame, the input methods as events arrive, and `teardown` once
//! at unload. Everything runs on the host's main thread.

use crate::host::HostBindings;
use crate::input::{InputMapping, KeyInput, MappedAction, StandardInput, ESCAPE_KEY};
use crate::overlay::OverlayController;
use crate::session::{ActiveReason, AwayMode, AwayReason, AwaySession};
use crate::watcher::{PresenceEdge, PresenceWatcher};

pub struct AwayRuntime {
    session: AwaySession,
    watcher: PresenceWatcher,
    mapping: InputMapping,
    hosts: HostBindings,
    torn_down: bool,
}

impl AwayRuntime {
    /// Create the overlays (hidden), register the hand-controller bindings,
    /// and start in the active state.
    pub fn new(hosts: HostBindings, overlay_image: &str) -> Self {
        let overlay = OverlayController::new(
            hosts.overlays.clone(),
            hosts.headset.clone(),
            hosts.input.clone(),
            overlay_image,
        );
        let session = AwaySession::new(hosts.clone(), overlay);

        let mut mapping = InputMapping::away_defaults();
        mapping.set_enabled(true);
        hosts.input.enable_mapping(mapping.name());

        AwayRuntime {
            session,
            watcher: PresenceWatcher::new(),
            mapping,
            hosts,
            torn_down: false,
        }
    }

    pub fn session(&self) -> &AwaySession {
        &self.session
    }

    pub fn mode(&self) -> AwayMode {
        self.session.mode()
    }

    pub fn is_away(&self) -> bool {
        self.session.is_away()
    }

    /// Once per rendered frame: cosmetic HUD tracking, edge detection over
    /// the polled presence flags, then any deferred handler removals.
    pub fn frame_tick(&mut self) {
        if self.torn_down {
            return;
        }
        self.session.track_overlay();

        let hmd_active = self.hosts.headset.active();
        let mouse_captured = self.hosts.reticle.mouse_captured();
        for edge in self.watcher.observe(hmd_active, mouse_captured) {
            match edge {
                PresenceEdge::HeadsetDonned => {
                    self.session.enter_away(AwayReason::HeadsetDonned)
                }
                PresenceEdge::CaptureLost => self.session.enter_away(AwayReason::CaptureLost),
            }
        }

        self.session.drain_deferred();
    }

    /// Keyboard handler: autorepeat never transitions; Escape enters away
    /// from the active state; while away, any key wakes the session up.
    pub fn key_pressed(&mut self, event: &KeyInput) {
        if self.torn_down || event.is_auto_repeat {
            return;
        }
        if !self.session.is_away() {
            if event.text == ESCAPE_KEY {
                self.session.enter_away(AwayReason::EscapeKey);
            }
        } else {
            self.session.exit_away(ActiveReason::KeyPress);
        }
    }

    pub fn mouse_pressed(&mut self) {
        if self.torn_down {
            return;
        }
        self.session.exit_away(ActiveReason::MousePress);
    }

    /// A bound hardware input fired. The binding table decides whether it
    /// maps to anything; peeked entries observe the press without consuming
    /// it, so this never interferes with other mappings.
    pub fn controller_pressed(&mut self, source: StandardInput) {
        if self.torn_down {
            return;
        }
        match self.mapping.action_for(source) {
            Some(MappedAction::GoActive) => {
                self.session.exit_away(ActiveReason::ControllerButton)
            }
            None => {}
        }
    }

    /// Script unload: force the session back to active, release every held
    /// animation registration, and retire the binding table. Further events
    /// are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.session.exit_away(ActiveReason::Teardown);
        self.session.release_handlers();
        self.mapping.set_enabled(false);
        self.hosts.input.disable_mapping(self.mapping.name());
    }
}
