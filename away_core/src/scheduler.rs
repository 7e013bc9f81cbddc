use std::collections::VecDeque;

use serde::Serialize;

use crate::host::StateHandlerId;

/// A registration change that may not run where it was decided.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeferredAction {
    RemoveStateHandler { handler: StateHandlerId },
}

/// Holds registration changes until the next frame tick.
///
/// The animation graph forbids mutating the handler set from inside a
/// handler's own invocation, so a provider that wants to unhook itself queues
/// the removal here and the controller drains the queue once per tick. There
/// is no cancellation; a queued action always eventually runs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DeferredQueue {
    pending: VecDeque<DeferredAction>,
    history: Vec<DeferredAction>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        DeferredQueue::default()
    }

    pub fn push(&mut self, action: DeferredAction) {
        self.pending.push_back(action);
    }

    pub fn next(&mut self) -> Option<DeferredAction> {
        let action = self.pending.pop_front()?;
        self.history.push(action);
        Some(action)
    }

    pub fn peek(&self) -> Option<&DeferredAction> {
        self.pending.front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn history(&self) -> &[DeferredAction] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::{DeferredAction, DeferredQueue};
    use crate::host::StateHandlerId;

    fn removal(id: u32) -> DeferredAction {
        DeferredAction::RemoveStateHandler {
            handler: StateHandlerId(id),
        }
    }

    #[test]
    fn queue_preserves_order_and_history() {
        let mut queue = DeferredQueue::new();
        queue.push(removal(1));
        queue.push(removal(2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some(&removal(1)));

        let mut drained = Vec::new();
        while let Some(action) = queue.next() {
            drained.push(action);
        }

        assert!(queue.is_empty());
        assert_eq!(drained, vec![removal(1), removal(2)]);
        assert_eq!(queue.history(), &[removal(1), removal(2)]);
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let mut queue = DeferredQueue::new();
        assert!(queue.next().is_none());
        assert!(queue.history().is_empty());
    }
}
