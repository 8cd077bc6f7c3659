use crate::config::ConfigInfo;
use crate::host::FlightHost;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared collaborators of the launch sequencer.
pub struct LaunchContext {
    host: Arc<dyn FlightHost>,
    config: Arc<RwLock<ConfigInfo>>,
}

impl LaunchContext {
    pub fn new(host: Arc<dyn FlightHost>, config: Arc<RwLock<ConfigInfo>>) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &Arc<dyn FlightHost> { &self.host }
    pub fn config(&self) -> &Arc<RwLock<ConfigInfo>> { &self.config }
}
