//! Away-state controller for a virtual-world avatar.
//!
//! Detects when the user is away (headset donned, pointer capture lost, or
//! an explicit Escape press) and toggles the presentation side effects:
//! audio mute, self-mesh hiding, a frozen away pose, a full-screen or
//! HUD-anchored overlay, and pointer capture release. The hard work lives
//! in the embedding client; this crate holds the state machine and talks to
//! the client through the capability traits in [`host`].

pub mod host;
pub mod input;
pub mod overlay;
pub mod pose;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use host::HostBindings;
pub use input::{InputMapping, KeyInput, StandardInput, AWAY_MAPPING_NAME, ESCAPE_KEY};
pub use runtime::AwayRuntime;
pub use session::{ActiveReason, AwayMode, AwayReason, AwaySession};
