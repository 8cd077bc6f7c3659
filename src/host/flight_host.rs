use super::SituationChange;
use crate::config::VehicleId;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::Display;
use tokio::sync::broadcast;

/// A playable clip from the host's audio database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Database path, e.g. `NASA_Countdown/Sounds/Apollo/Timer/10`.
    name: String,
    /// Playback length.
    length: Duration,
}

impl AudioClip {
    pub fn new(name: impl Into<String>, length: Duration) -> Self {
        Self { name: name.into(), length }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn length(&self) -> Duration { self.length }
}

/// Audio source attached to the vessel's game object.
pub trait AudioOutput: Send + Sync {
    fn play_one_shot(&self, clip: &AudioClip);
}

/// The part of the per-frame control state the countdown writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightCtrlState {
    pub main_throttle: f32,
}

/// Per-frame input mutation callback of the flight control pipeline.
pub type FlyByWire = Arc<dyn Fn(&mut FlightCtrlState) + Send + Sync>;

/// Registration handle of a [`FlyByWire`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlyByWireId(pub u64);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionGroup {
    Stage,
    Gear,
    Light,
    Rcs,
    Sas,
    Brakes,
    Abort,
}

/// The active vessel as seen by the countdown.
pub trait Vessel: Send + Sync {
    fn id(&self) -> VehicleId;
    fn activate_stage(&self, stage: u32);
    /// Fires `group` on all parts of the vessel.
    fn fire_action_group(&self, group: ActionGroup);
    fn add_fly_by_wire(&self, callback: FlyByWire) -> FlyByWireId;
    fn remove_fly_by_wire(&self, id: FlyByWireId);
}

/// Everything the countdown needs from the game outside of the vessel itself.
pub trait FlightHost: Send + Sync {
    fn active_vessel(&self) -> Arc<dyn Vessel>;
    /// Attaches a new audio source to the active vessel.
    fn attach_audio(&self, pan_level: f32, volume: f32) -> Arc<dyn AudioOutput>;
    /// All database clips whose name contains `needle`.
    fn find_clips(&self, needle: &str) -> Vec<AudioClip>;
    /// Global voice volume setting.
    fn voice_volume(&self) -> f32;
    /// Drops time acceleration back to real time.
    fn stop_time_warp(&self);
    /// Subscribes to situation changes. Dropping the receiver unsubscribes.
    fn subscribe_situation(&self) -> broadcast::Receiver<SituationChange>;
}
