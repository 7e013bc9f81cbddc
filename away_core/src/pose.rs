//! Pose providers queried by the animation graph.
//!
//! The graph has no play/stop API for the away pose; instead it evaluates a
//! state that is switched on and off through the animation variables a
//! registered handler reports. Two providers exist: a constant away pose and
//! a transitional active pose that rides out the graph's away-outro before
//! unhooking itself.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::host::StateHandlerId;
use crate::scheduler::{DeferredAction, DeferredQueue};

pub const VAR_IS_AWAY: &str = "isAway";
pub const VAR_IS_NOT_AWAY: &str = "isNotAway";
pub const VAR_IS_NOT_MOVING: &str = "isNotMoving";
pub const VAR_IK_OVERLAY_ALPHA: &str = "ikOverlayAlpha";
pub const VAR_AWAY_OUTRO_DONE: &str = "awayOutroOnDone";

/// Variables the transitional pose needs fed back from the graph.
pub const ACTIVE_TRANSITION_WATCHED: &[&str] = &[VAR_IK_OVERLAY_ALPHA, VAR_AWAY_OUTRO_DONE];

/// Value of a single animation variable.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    Bool(bool),
    Number(f32),
}

impl AnimValue {
    /// Truthiness the way the graph evaluates state variables: `false` and
    /// `0.0` are off, everything else is on.
    pub fn is_truthy(&self) -> bool {
        match self {
            AnimValue::Bool(value) => *value,
            AnimValue::Number(value) => *value != 0.0,
        }
    }
}

/// Mapping of animation variable name to value, as returned by a provider.
pub type AnimVars = BTreeMap<String, AnimValue>;

fn truthy(vars: &AnimVars, name: &str) -> bool {
    vars.get(name).is_some_and(AnimValue::is_truthy)
}

/// A callback the animation graph queries each evaluation to obtain current
/// values for named animation variables. `watched` carries the current graph
/// values of the variables named at registration.
pub trait PoseProvider {
    fn sample(&self, watched: &AnimVars) -> AnimVars;
}

/// Constant pose reported while away: the away state on, IK head tracking
/// off so the frozen pose is not dragged toward the headset.
pub struct AwayPose;

impl PoseProvider for AwayPose {
    fn sample(&self, _watched: &AnimVars) -> AnimVars {
        let mut vars = AnimVars::new();
        vars.insert(VAR_IS_AWAY.to_string(), AnimValue::Bool(true));
        vars.insert(VAR_IS_NOT_AWAY.to_string(), AnimValue::Bool(false));
        vars.insert(VAR_IS_NOT_MOVING.to_string(), AnimValue::Bool(false));
        vars.insert(VAR_IK_OVERLAY_ALPHA.to_string(), AnimValue::Number(0.0));
        vars
    }
}

/// Transitional pose registered when leaving the away state.
///
/// IK overlay alpha cannot snap back the moment the away pose stops: an away
/// animation that kneels has to stand back up first, and the head must not
/// track the headset while it does. The graph raises `awayOutroOnDone` when
/// the outro finishes; only then does this provider report alpha 1. Once the
/// graph reflects the active alpha back, the provider queues its own removal
/// on the deferred queue, because registrations may not change during a
/// provider's own invocation.
pub struct ActiveTransitionPose {
    outro_done: Cell<bool>,
    removal_scheduled: Cell<bool>,
    unwinding: Rc<Cell<bool>>,
    deferrals: Rc<RefCell<DeferredQueue>>,
    handler: Cell<Option<StateHandlerId>>,
}

impl ActiveTransitionPose {
    pub fn new(unwinding: Rc<Cell<bool>>, deferrals: Rc<RefCell<DeferredQueue>>) -> Self {
        ActiveTransitionPose {
            outro_done: Cell::new(false),
            removal_scheduled: Cell::new(false),
            unwinding,
            deferrals,
            handler: Cell::new(None),
        }
    }

    /// Record the registration handle so the provider can name itself in the
    /// removal it schedules. Must be called right after registration.
    pub fn bind(&self, handler: StateHandlerId) {
        self.handler.set(Some(handler));
    }
}

impl PoseProvider for ActiveTransitionPose {
    fn sample(&self, watched: &AnimVars) -> AnimVars {
        if truthy(watched, VAR_AWAY_OUTRO_DONE) {
            self.outro_done.set(true);
            self.unwinding.set(false);
        } else if truthy(watched, VAR_IK_OVERLAY_ALPHA) {
            // The graph reflects the active alpha back once it has applied
            // it, so this provider has nothing left to do. Removal happens
            // on the next tick, never from inside this call.
            if let Some(handler) = self.handler.get() {
                if !self.removal_scheduled.replace(true) {
                    self.deferrals
                        .borrow_mut()
                        .push(DeferredAction::RemoveStateHandler { handler });
                }
            }
        }

        let alpha = if self.outro_done.get() { 1.0 } else { 0.0 };
        let mut vars = AnimVars::new();
        vars.insert(VAR_IS_AWAY.to_string(), AnimValue::Bool(false));
        vars.insert(VAR_IS_NOT_AWAY.to_string(), AnimValue::Bool(true));
        vars.insert(VAR_IK_OVERLAY_ALPHA.to_string(), AnimValue::Number(alpha));
        vars
    }
}
