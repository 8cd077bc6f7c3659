//! Interfaces to the game host the countdown runs inside, and a simulated host
//! implementing them for the demo binary and the tests.

mod flight_host;
pub mod sim;
mod situation;

pub use flight_host::{
    ActionGroup, AudioClip, AudioOutput, FlightCtrlState, FlightHost, FlyByWire, FlyByWireId,
    Vessel,
};
pub use situation::{Situation, SituationChange};
