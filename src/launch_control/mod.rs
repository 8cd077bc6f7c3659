//! The countdown and launch state machine: the phase table, the 1 Hz countdown with its
//! stage dispatch and throttle override, and the abort protocol.

mod abort;
mod countdown;
mod countdown_clips;
mod error;
mod launch_context;
mod launch_phase;
mod launch_scope;
mod sequencer;
mod signal;
mod stage_dispatcher;
mod throttle_override;


pub use countdown::{Countdown, CountdownHandle, CountdownTick, TICK_UNSET};
pub use countdown_clips::CountdownClips;
pub use error::LaunchError;
pub use launch_context::LaunchContext;
pub use launch_phase::{LaunchEvent, LaunchPhase};
pub use sequencer::LaunchSequencer;
pub use signal::{CountdownExit, LaunchCommand};
pub use stage_dispatcher::{StageAction, StageDispatcher};
pub use throttle_override::ThrottleOverride;
