use crate::config::VehicleId;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumIter};

/// The host's coarse flight phase classification, carried as its bit code.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u32)]
pub enum Situation {
    #[strum(to_string = "LANDED")]
    Landed = 1,
    #[strum(to_string = "SPLASHED")]
    Splashed = 2,
    #[strum(to_string = "PRELAUNCH")]
    Prelaunch = 4,
    #[strum(to_string = "FLYING")]
    Flying = 8,
    #[strum(to_string = "SUB_ORBITAL")]
    SubOrbital = 16,
    #[strum(to_string = "ORBITING")]
    Orbiting = 32,
    #[strum(to_string = "ESCAPING")]
    Escaping = 64,
    #[strum(to_string = "DOCKED")]
    Docked = 128,
}

/// A situation change notification as delivered by the host, codes still raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SituationChange {
    /// The vessel whose situation changed.
    pub vessel: VehicleId,
    pub from: u32,
    pub to: u32,
}

impl SituationChange {
    pub fn new(vessel: VehicleId, from: Situation, to: Situation) -> Self {
        Self { vessel, from: from.into(), to: to.into() }
    }
}
