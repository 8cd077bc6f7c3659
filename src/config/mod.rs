//! Persistent configuration of the countdown: sound and control flags, the window
//! position and the per-vessel stage sequences, stored as a configuration node document.

mod config_info;
mod config_node;
mod config_property;
mod error;
mod node_store;
mod vehicle_id;
mod window_rect;

#[cfg(test)]
mod tests;

pub use config_info::{ConfigInfo, ConfigValues, StageIndex};
pub use config_node::ConfigNode;
pub use config_property::ConfigProperty;
pub use error::{ConfigLoadError, ConfigSaveError};
pub use node_store::{FileNodeStore, NodeStore};
pub use vehicle_id::VehicleId;
pub use window_rect::WindowRect;
