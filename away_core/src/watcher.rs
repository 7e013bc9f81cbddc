use serde::Serialize;

/// A transition the controller reacts to, derived from polled host flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceEdge {
    /// Headset presence went false -> true.
    HeadsetDonned,
    /// Pointer capture went true -> false: the user likely tabbed away from
    /// the application while still wearing the headset.
    CaptureLost,
}

/// Edge detector over the polled headset-presence and pointer-capture flags.
///
/// Both previous-value fields start `false`, so a client that launches with
/// the headset already on produces a donned edge on the first observation.
#[derive(Debug, Default, Clone)]
pub struct PresenceWatcher {
    was_hmd_active: bool,
    was_mouse_captured: bool,
}

impl PresenceWatcher {
    pub fn new() -> Self {
        PresenceWatcher::default()
    }

    /// Compare the current flags against the last observation. Steady values
    /// never produce edges; only the two actionable transitions are reported.
    pub fn observe(&mut self, hmd_active: bool, mouse_captured: bool) -> Vec<PresenceEdge> {
        let mut edges = Vec::new();

        if hmd_active != self.was_hmd_active {
            self.was_hmd_active = hmd_active;
            if hmd_active {
                edges.push(PresenceEdge::HeadsetDonned);
            }
        }

        if mouse_captured != self.was_mouse_captured {
            self.was_mouse_captured = mouse_captured;
            if !mouse_captured {
                edges.push(PresenceEdge::CaptureLost);
            }
        }

        edges
    }
}
