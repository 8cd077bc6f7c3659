use super::{CountdownClips, CountdownExit, StageDispatcher};
use crate::host::AudioOutput;
use crate::{event, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// One discrete countdown step.
pub type CountdownTick = i32;

/// Published before the first tick and between launches.
pub const TICK_UNSET: CountdownTick = -1;

/// The 1 Hz countdown: announces each tick, plays its clip and fires its stage action.
pub struct Countdown {
    start: CountdownTick,
    clips: Arc<CountdownClips>,
    audio: Arc<dyn AudioOutput>,
    dispatcher: StageDispatcher,
    ticks: Arc<watch::Sender<CountdownTick>>,
}

impl Countdown {
    const TICK_DT: Duration = Duration::from_secs(1);

    pub fn new(
        start: CountdownTick,
        clips: Arc<CountdownClips>,
        audio: Arc<dyn AudioOutput>,
        dispatcher: StageDispatcher,
        ticks: Arc<watch::Sender<CountdownTick>>,
    ) -> Self {
        Self { start, clips, audio, dispatcher, ticks }
    }

    /// Runs ticks `start..=0`, waiting one second after each.
    ///
    /// `cancel` is checked at every suspension point; once it fires no further
    /// clip or stage action is triggered.
    pub async fn run(self, cancel: CancellationToken) -> CountdownExit {
        info!("Countdown started at T-{}", self.start);
        for tick in (0..=self.start).rev() {
            if cancel.is_cancelled() {
                return CountdownExit::Cancelled;
            }
            self.ticks.send_replace(tick);
            event!("T-{tick}");
            if let Some(clip) = self.clips.timer_clip(tick) {
                self.audio.play_one_shot(clip);
            }
            self.dispatcher.dispatch(tick);
            tokio::select! {
                () = cancel.cancelled() => return CountdownExit::Cancelled,
                () = tokio::time::sleep(Self::TICK_DT) => {}
            }
        }
        info!("Countdown complete");
        CountdownExit::Liftoff
    }

    /// Spawns the countdown as a task that is cancelled when the handle is dropped.
    pub fn spawn(self) -> CountdownHandle {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let join = tokio::spawn(async move { self.run(task_cancel).await });
        CountdownHandle { join, guard: cancel.drop_guard() }
    }
}

/// Owns a running countdown task.
pub struct CountdownHandle {
    join: JoinHandle<CountdownExit>,
    guard: DropGuard,
}

impl CountdownHandle {
    pub fn is_finished(&self) -> bool { self.join.is_finished() }

    /// Cancels the countdown and waits until the task has fully stopped.
    pub async fn stop(self) -> CountdownExit {
        let Self { join, guard } = self;
        guard.disarm().cancel();
        match join.await {
            Ok(exit) => exit,
            Err(e) => {
                warn!("Countdown task ended abnormally: {e}");
                CountdownExit::Cancelled
            }
        }
    }
}
