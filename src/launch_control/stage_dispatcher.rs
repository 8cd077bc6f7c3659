use super::CountdownTick;
use crate::config::StageIndex;
use crate::event;
use crate::host::Vessel;
use std::sync::Arc;

/// What happens at one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    Idle,
    Activate(u32),
}

impl From<StageIndex> for StageAction {
    fn from(index: StageIndex) -> Self {
        u32::try_from(index).map_or(StageAction::Idle, StageAction::Activate)
    }
}

/// Maps countdown ticks to stage activations of the launching vessel.
///
/// The sequence is read in countdown order: its first entry belongs to the start
/// tick, the last one to tick 0.
pub struct StageDispatcher {
    actions: Vec<StageAction>,
    /// Tick of the first entry.
    start: CountdownTick,
    vessel: Arc<dyn Vessel>,
}

impl StageDispatcher {
    pub fn new(sequence: &[StageIndex], start: CountdownTick, vessel: Arc<dyn Vessel>) -> Self {
        let actions = sequence.iter().copied().map(StageAction::from).collect();
        Self { actions, start, vessel }
    }

    pub fn actions(&self) -> &[StageAction] { &self.actions }

    /// Fires the action stored for `tick`. Ticks past the end of a short sequence do nothing.
    pub fn dispatch(&self, tick: CountdownTick) {
        let step = self.start.checked_sub(tick).and_then(|k| usize::try_from(k).ok());
        let Some(action) = step.and_then(|k| self.actions.get(k)) else {
            return;
        };
        if let StageAction::Activate(stage) = *action {
            event!("T-{tick}: activating stage {stage}");
            self.vessel.activate_stage(stage);
        }
    }
}
