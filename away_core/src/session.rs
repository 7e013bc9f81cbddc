//! The away/active state machine and its side effects.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use crate::host::{HostBindings, StateHandlerId};
use crate::overlay::OverlayController;
use crate::pose::{ActiveTransitionPose, AwayPose, ACTIVE_TRANSITION_WATCHED};
use crate::scheduler::{DeferredAction, DeferredQueue};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AwayMode {
    Active,
    Away,
}

/// What pushed the session into the away state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AwayReason {
    EscapeKey,
    HeadsetDonned,
    CaptureLost,
}

impl AwayReason {
    fn label(&self) -> &'static str {
        match self {
            AwayReason::EscapeKey => "escape_key",
            AwayReason::HeadsetDonned => "hmd_donned",
            AwayReason::CaptureLost => "capture_lost",
        }
    }
}

/// What pulled the session back to active.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActiveReason {
    KeyPress,
    MousePress,
    ControllerButton,
    Teardown,
}

impl ActiveReason {
    fn label(&self) -> &'static str {
        match self {
            ActiveReason::KeyPress => "key_press",
            ActiveReason::MousePress => "mouse_press",
            ActiveReason::ControllerButton => "controller_button",
            ActiveReason::Teardown => "teardown",
        }
    }
}

/// One user's away session: the mode flag, the mute bookkeeping, and the
/// animation handler registrations currently held on the host.
///
/// Transitions are idempotent: entering away while away and leaving while
/// active are complete no-ops, so callers wire events without guarding.
pub struct AwaySession {
    mode: AwayMode,
    was_muted: bool,
    away_handler: Option<StateHandlerId>,
    active_handler: Option<StateHandlerId>,
    unwinding: Rc<Cell<bool>>,
    deferrals: Rc<RefCell<DeferredQueue>>,
    hosts: HostBindings,
    overlay: OverlayController,
    events: Vec<String>,
}

impl AwaySession {
    pub fn new(hosts: HostBindings, overlay: OverlayController) -> Self {
        AwaySession {
            mode: AwayMode::Active,
            was_muted: false,
            away_handler: None,
            active_handler: None,
            unwinding: Rc::new(Cell::new(false)),
            deferrals: Rc::new(RefCell::new(DeferredQueue::new())),
            hosts,
            overlay,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> AwayMode {
        self.mode
    }

    pub fn is_away(&self) -> bool {
        self.mode == AwayMode::Away
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn deferred_history(&self) -> Vec<DeferredAction> {
        self.deferrals.borrow().history().to_vec()
    }

    fn log_event(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    /// Apply every enter-away side effect. Audio lands first so the mute is
    /// in place before the pose and overlay pop.
    pub fn enter_away(&mut self, reason: AwayReason) {
        if self.mode == AwayMode::Away {
            return;
        }
        self.mode = AwayMode::Away;
        log::debug!("going away ({})", reason.label());
        self.log_event(format!("away.enter {}", reason.label()));

        self.was_muted = self.hosts.audio.is_muted();
        if !self.was_muted {
            self.hosts.audio.toggle_mute();
        }
        self.hosts.avatar.set_mesh_visible(false);
        self.start_away_pose();
        self.overlay.show();

        self.hosts.reticle.set_allow_mouse_capture(false);
        if self.hosts.headset.active() {
            self.hosts.reticle.set_visible(false);
        }
    }

    /// Apply every exit-away side effect. Mute is restored to the pre-away
    /// state, and only if the session did not already start muted.
    pub fn exit_away(&mut self, reason: ActiveReason) {
        if self.mode == AwayMode::Active {
            return;
        }
        self.mode = AwayMode::Active;
        log::debug!("going active ({})", reason.label());
        self.log_event(format!("away.exit {}", reason.label()));

        if !self.was_muted {
            self.hosts.audio.toggle_mute();
        }
        self.hosts.avatar.set_mesh_visible(true);
        self.stop_away_pose();
        self.overlay.hide();

        self.hosts.reticle.set_allow_mouse_capture(true);
        self.hosts.reticle.set_visible(true);
        if self.hosts.headset.active() {
            self.hosts
                .reticle
                .set_position(self.hosts.headset.hud_look_at_2d());
        }
    }

    /// Cosmetic per-frame update: while away in headset mode, keep the HUD
    /// overlay in front of the view direction.
    pub fn track_overlay(&self) {
        if self.mode == AwayMode::Away && self.hosts.headset.active() {
            self.overlay.track_hud();
        }
    }

    /// Perform any handler removals queued by the transitional pose. Called
    /// once per frame tick, outside all handler invocations.
    pub fn drain_deferred(&mut self) {
        loop {
            let action = self.deferrals.borrow_mut().next();
            match action {
                Some(DeferredAction::RemoveStateHandler { handler }) => {
                    self.hosts.animation.remove_state_handler(handler);
                    if self.active_handler == Some(handler) {
                        self.active_handler = None;
                    }
                }
                None => break,
            }
        }
    }

    /// Drop whatever registrations are still held, synchronously. Only legal
    /// outside handler invocations; used at teardown where no further ticks
    /// will run the deferred queue.
    pub fn release_handlers(&mut self) {
        self.drain_deferred();
        if let Some(handler) = self.active_handler.take() {
            self.hosts.animation.remove_state_handler(handler);
        }
        if let Some(handler) = self.away_handler.take() {
            self.hosts.animation.remove_state_handler(handler);
        }
        self.unwinding.set(false);
    }

    fn start_away_pose(&mut self) {
        if self.unwinding.get() {
            // A previous exit is still riding out its outro. Drop its
            // transitional handler now, before registering the away pose;
            // this runs from event context, never inside a handler.
            self.unwinding.set(false);
            if let Some(handler) = self.active_handler.take() {
                self.hosts.animation.remove_state_handler(handler);
            }
        }
        let handler = self
            .hosts
            .animation
            .add_state_handler(Rc::new(AwayPose), &[]);
        self.away_handler = Some(handler);
    }

    fn stop_away_pose(&mut self) {
        if let Some(handler) = self.away_handler.take() {
            self.hosts.animation.remove_state_handler(handler);
        }
        if self.unwinding.get() {
            log::warn!("unexpected double stop of the away pose");
            self.log_event("away.double_stop");
            return;
        }
        self.unwinding.set(true);

        let pose = Rc::new(ActiveTransitionPose::new(
            self.unwinding.clone(),
            self.deferrals.clone(),
        ));
        let handler = self
            .hosts
            .animation
            .add_state_handler(pose.clone(), ACTIVE_TRANSITION_WATCHED);
        pose.bind(handler);
        self.active_handler = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveReason, AwayMode, AwayReason, AwaySession};
    use crate::host::AudioHost;
    use crate::overlay::OverlayController;
    use crate::testing::RecordingHost;

    fn session_with_host() -> (AwaySession, RecordingHost) {
        let host = RecordingHost::new();
        let hosts = host.bindings();
        let overlay = OverlayController::new(
            hosts.overlays.clone(),
            hosts.headset.clone(),
            hosts.input.clone(),
            "assets/away-overlay.png",
        );
        host.clear_calls();
        (AwaySession::new(hosts, overlay), host)
    }

    #[test]
    fn enter_away_is_idempotent() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        let calls_after_first = host.calls().len();
        let events_after_first = session.events().len();

        session.enter_away(AwayReason::HeadsetDonned);
        assert_eq!(host.calls().len(), calls_after_first, "no repeated effects");
        assert_eq!(session.events().len(), events_after_first);
    }

    #[test]
    fn exit_away_while_active_is_a_no_op() {
        let (mut session, host) = session_with_host();
        session.exit_away(ActiveReason::MousePress);
        assert!(host.calls().is_empty());
        assert!(session.events().is_empty());
        assert_eq!(session.mode(), AwayMode::Active);
    }

    #[test]
    fn mute_restored_only_when_entered_unmuted() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        assert!(host.is_muted(), "entering away mutes an unmuted session");
        session.exit_away(ActiveReason::KeyPress);
        assert!(!host.is_muted(), "mute restored on exit");
        assert_eq!(host.count_calls("audio.toggle_mute"), 2);
    }

    #[test]
    fn mute_untouched_when_already_muted_at_entry() {
        let (mut session, host) = session_with_host();
        host.set_muted(true);
        session.enter_away(AwayReason::EscapeKey);
        session.exit_away(ActiveReason::KeyPress);
        assert!(host.is_muted(), "mute stays on throughout");
        assert_eq!(host.count_calls("audio.toggle_mute"), 0);
    }

    #[test]
    fn enter_away_hides_mesh_and_disallows_capture() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::HeadsetDonned);
        assert!(host.has_call("avatar.set_mesh_visible false"));
        assert!(host.has_call("reticle.set_allow_mouse_capture false"));
        assert_eq!(host.handler_count(), 1, "away pose registered");
    }

    #[test]
    fn reticle_hidden_only_in_headset_mode() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        assert!(!host.has_call("reticle.set_visible false"));

        let (mut session, host) = session_with_host();
        host.set_hmd_active(true);
        session.enter_away(AwayReason::HeadsetDonned);
        assert!(host.has_call("reticle.set_visible false"));
    }

    #[test]
    fn exit_in_headset_mode_recenters_the_reticle() {
        let (mut session, host) = session_with_host();
        host.set_hmd_active(true);
        session.enter_away(AwayReason::HeadsetDonned);
        session.exit_away(ActiveReason::ControllerButton);
        assert!(host.has_call("reticle.set_visible true"));
        assert!(host.has_call("reticle.set_position"));
    }

    #[test]
    fn exit_swaps_away_pose_for_transitional_pose() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        session.exit_away(ActiveReason::MousePress);
        // Away handler removed, transitional handler registered in its place.
        assert_eq!(host.handler_count(), 1);
        assert_eq!(host.count_calls("animation.remove_state_handler"), 1);
        assert_eq!(host.count_calls("animation.add_state_handler"), 2);
    }

    #[test]
    fn double_stop_logs_one_warning_event_and_nothing_else() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        session.exit_away(ActiveReason::KeyPress);
        let handlers_before = host.handler_count();

        // The unwind is still in flight; a second stop must be rejected.
        session.stop_away_pose();
        assert_eq!(host.handler_count(), handlers_before);
        assert_eq!(
            session
                .events()
                .iter()
                .filter(|event| event.as_str() == "away.double_stop")
                .count(),
            1
        );
    }

    #[test]
    fn reentering_away_mid_unwind_drops_the_stale_transition() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        session.exit_away(ActiveReason::KeyPress);
        session.enter_away(AwayReason::EscapeKey);
        // Stale transitional handler removed synchronously, away pose back.
        assert_eq!(host.handler_count(), 1);
        session.exit_away(ActiveReason::KeyPress);
        assert!(
            !session
                .events()
                .iter()
                .any(|event| event.as_str() == "away.double_stop"),
            "cleared guard means no double-stop on the second exit"
        );
    }

    #[test]
    fn release_handlers_leaves_nothing_registered() {
        let (mut session, host) = session_with_host();
        session.enter_away(AwayReason::EscapeKey);
        session.exit_away(ActiveReason::Teardown);
        session.release_handlers();
        assert_eq!(host.handler_count(), 0);
    }
}
