use super::{LaunchCommand, LaunchEvent, LaunchPhase};
use crate::config::VehicleId;
use strum_macros::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[strum(to_string = "no stage sequence configured for vessel {vessel}")]
    MissingSequence { vessel: VehicleId },
    /// The host delivered a situation code outside the known set.
    #[strum(to_string = "unhandled vessel situation code {code}")]
    UnhandledSituation { code: u32 },
    #[strum(to_string = "no transition from {from} on {event}")]
    InvalidTransition { from: LaunchPhase, event: LaunchEvent },
    #[strum(to_string = "{command} refused while in {phase}")]
    Refused { command: LaunchCommand, phase: LaunchPhase },
}

impl LaunchError {
    /// Fatal errors indicate a host mismatch and stop the sequencer.
    pub fn is_fatal(&self) -> bool { matches!(self, LaunchError::UnhandledSituation { .. }) }
}

impl std::error::Error for LaunchError {}
