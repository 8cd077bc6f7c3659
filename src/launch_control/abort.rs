use super::launch_scope::LaunchScope;
use crate::host::{ActionGroup, FlightHost};
use crate::{info, warn};

impl LaunchScope {
    /// The abort cue: freezes time warp, plays the `Aborted` clip and waits for its full
    /// length, then fires the vessel's abort action group if `abort_executed` is set.
    ///
    /// The countdown must already be stopped when this runs.
    pub(super) async fn run_abort(&self, host: &dyn FlightHost, abort_executed: bool) {
        warn!("Launch aborted");
        host.stop_time_warp();
        if let Some(clip) = self.clips.aborted_clip() {
            self.audio.play_one_shot(clip);
            tokio::time::sleep(clip.length()).await;
        }
        if abort_executed {
            info!("Firing abort action group");
            self.vessel.fire_action_group(ActionGroup::Abort);
        }
    }
}
