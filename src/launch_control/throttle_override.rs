use super::CountdownTick;
use crate::host::{FlightCtrlState, FlyByWire, FlyByWireId, Vessel};
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the main throttle during the final countdown ticks.
///
/// The callback stays registered with the vessel for as long as this value lives.
pub struct ThrottleOverride {
    vessel: Arc<dyn Vessel>,
    id: FlyByWireId,
}

impl ThrottleOverride {
    pub const IGNITION_THROTTLE: f32 = 0.01;
    pub const LIFTOFF_THROTTLE: f32 = 1.0;

    /// Throttle command for the current tick: ignition for 7 down to 1, full at 0, idle otherwise.
    pub fn throttle_for(tick: CountdownTick) -> f32 {
        match tick {
            1..=7 => Self::IGNITION_THROTTLE,
            0 => Self::LIFTOFF_THROTTLE,
            _ => 0.0,
        }
    }

    /// Registers the per-frame callback reading the latest published tick.
    pub fn engage(vessel: Arc<dyn Vessel>, ticks: watch::Receiver<CountdownTick>) -> Self {
        let callback: FlyByWire = Arc::new(move |state: &mut FlightCtrlState| {
            state.main_throttle = Self::throttle_for(*ticks.borrow());
        });
        let id = vessel.add_fly_by_wire(callback);
        Self { vessel, id }
    }
}

impl Drop for ThrottleOverride {
    fn drop(&mut self) { self.vessel.remove_fly_by_wire(self.id); }
}
