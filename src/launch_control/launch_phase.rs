use crate::host::Situation;
use std::collections::HashMap;
use std::sync::LazyLock;
use strum_macros::Display;

/// States of the launch state machine.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LaunchPhase {
    /// Waiting for a launch to be started.
    Init,
    /// Countdown running.
    Launch,
    /// The vessel left the ground.
    Launched,
    /// The vessel reached a stable post-launch situation.
    Finished,
}

/// Named events consumed by the state machine.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LaunchEvent {
    Start,
    Init,
    Launched,
    Finish,
}

/// Every allowed `(from, event) -> to` transition. Anything absent is refused.
pub static TRANSITION_LOOKUP: LazyLock<HashMap<(LaunchPhase, LaunchEvent), LaunchPhase>> =
    LazyLock::new(|| {
        let mut lookup = HashMap::new();
        let transitions = vec![
            (LaunchPhase::Init, LaunchEvent::Start, LaunchPhase::Launch),
            // abort
            (LaunchPhase::Launch, LaunchEvent::Init, LaunchPhase::Init),
            (LaunchPhase::Launch, LaunchEvent::Launched, LaunchPhase::Launched),
            (LaunchPhase::Launch, LaunchEvent::Finish, LaunchPhase::Finished),
            (LaunchPhase::Launched, LaunchEvent::Finish, LaunchPhase::Finished),
            // reset
            (LaunchPhase::Launched, LaunchEvent::Init, LaunchPhase::Init),
            (LaunchPhase::Finished, LaunchEvent::Init, LaunchPhase::Init),
        ];

        for (from, event, to) in transitions {
            lookup.insert((from, event), to);
        }
        lookup
    });

impl LaunchPhase {
    /// The phase `event` leads to from `self`, if that transition exists.
    pub fn next(self, event: LaunchEvent) -> Option<LaunchPhase> {
        TRANSITION_LOOKUP.get(&(self, event)).copied()
    }

    /// Whether situation change notifications are subscribed while in this phase.
    pub fn watches_situation(self) -> bool {
        matches!(self, LaunchPhase::Launch | LaunchPhase::Launched)
    }
}

impl LaunchEvent {
    /// The event a vessel reaching `situation` raises. Steady states raise none.
    pub fn from_situation(situation: Situation) -> Option<LaunchEvent> {
        match situation {
            Situation::Flying => Some(LaunchEvent::Launched),
            Situation::Landed | Situation::Prelaunch => None,
            Situation::Splashed
            | Situation::SubOrbital
            | Situation::Orbiting
            | Situation::Escaping
            | Situation::Docked => Some(LaunchEvent::Finish),
        }
    }
}
