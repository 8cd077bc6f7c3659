use super::{CountdownClips, ThrottleOverride};
use crate::host::{AudioOutput, Vessel};
use std::sync::Arc;

/// Resources held while in the `Launch` phase, released together when it is left.
pub(super) struct LaunchScope {
    pub(super) vessel: Arc<dyn Vessel>,
    pub(super) audio: Arc<dyn AudioOutput>,
    pub(super) clips: Arc<CountdownClips>,
    /// Present only with engine control enabled; dropping it unregisters the callback.
    pub(super) throttle: Option<ThrottleOverride>,
}
