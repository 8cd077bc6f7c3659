use super::{
    Countdown, CountdownClips, CountdownHandle, CountdownTick, LaunchCommand, LaunchContext,
    LaunchError, LaunchEvent, LaunchPhase, StageDispatcher, TICK_UNSET, ThrottleOverride,
    launch_scope::LaunchScope,
};
use crate::config::VehicleId;
use crate::host::{Situation, SituationChange};
use crate::{error, event, info, warn};
use futures::future::OptionFuture;
use std::sync::Arc;
use tokio::sync::{broadcast, broadcast::error::RecvError, mpsc, watch};

/// Pan level of the countdown voice, fully 2D.
const VOICE_PAN_LEVEL: f32 = 0.0;

enum SequencerInput {
    Command(Option<LaunchCommand>),
    Situation(Result<SituationChange, RecvError>),
}

/// The launch state machine.
///
/// Owns the current [`LaunchPhase`] and everything the phases acquire: the launch
/// scope, the situation subscription and the running countdown. Each phase releases
/// what it acquired when it is left, on every path including abort.
pub struct LaunchSequencer {
    context: Arc<LaunchContext>,
    phase: LaunchPhase,
    phase_tx: watch::Sender<LaunchPhase>,
    /// Latest countdown tick, read by the throttle override.
    ticks: Arc<watch::Sender<CountdownTick>>,
    /// Vessel of the current or last launch.
    vessel_id: Option<VehicleId>,
    scope: Option<LaunchScope>,
    situations: Option<broadcast::Receiver<SituationChange>>,
    /// Outlives the `Launch` phase; only abort or a reset stops it early.
    countdown: Option<CountdownHandle>,
}

impl LaunchSequencer {
    pub fn new(context: Arc<LaunchContext>) -> Self {
        let (phase_tx, _) = watch::channel(LaunchPhase::Init);
        let (ticks, _) = watch::channel(TICK_UNSET);
        Self {
            context,
            phase: LaunchPhase::Init,
            phase_tx,
            ticks: Arc::new(ticks),
            vessel_id: None,
            scope: None,
            situations: None,
            countdown: None,
        }
    }

    pub fn phase(&self) -> LaunchPhase { self.phase }
    pub fn current_tick(&self) -> CountdownTick { *self.ticks.borrow() }
    pub fn subscribe_phase(&self) -> watch::Receiver<LaunchPhase> { self.phase_tx.subscribe() }
    pub fn subscribe_ticks(&self) -> watch::Receiver<CountdownTick> { self.ticks.subscribe() }
    pub fn is_counting_down(&self) -> bool {
        self.countdown.as_ref().is_some_and(|c| !c.is_finished())
    }

    /// Starts a launch of the host's active vessel.
    ///
    /// # Errors
    /// - [`LaunchError::InvalidTransition`] when not in `Init`.
    /// - [`LaunchError::MissingSequence`] when the vessel has no stage sequence; the
    ///   machine stays in `Init` and nothing is acquired.
    pub async fn launch(&mut self) -> Result<(), LaunchError> {
        self.transition(LaunchEvent::Start).await
    }

    /// Interrupts the countdown and returns to `Init` after the abort cue.
    ///
    /// The running countdown is cancelled and awaited before the abort sequence
    /// begins, so no stage fires after this is called.
    pub async fn abort(&mut self) -> Result<(), LaunchError> {
        if self.phase != LaunchPhase::Launch {
            return Err(LaunchError::Refused { command: LaunchCommand::Abort, phase: self.phase });
        }
        let tick = self.current_tick();
        if let Some(countdown) = self.countdown.take() {
            countdown.stop().await;
        }
        info!("Abort requested at T-{tick}");
        let abort_executed = self.context.config().read().await.abort_executed();
        if let Some(scope) = &self.scope {
            scope.run_abort(self.context.host().as_ref(), abort_executed).await;
        }
        self.transition(LaunchEvent::Init).await
    }

    /// Returns a finished or launched sequence to `Init` for the next launch.
    pub async fn reset(&mut self) -> Result<(), LaunchError> {
        if !matches!(self.phase, LaunchPhase::Launched | LaunchPhase::Finished) {
            return Err(LaunchError::Refused { command: LaunchCommand::Reset, phase: self.phase });
        }
        self.transition(LaunchEvent::Init).await
    }

    /// Reacts to a host situation notification.
    ///
    /// # Errors
    /// [`LaunchError::UnhandledSituation`] for a code outside the known set.
    pub async fn on_situation_change(&mut self, change: SituationChange) -> Result<(), LaunchError> {
        let to = Situation::try_from(change.to)
            .map_err(|e| LaunchError::UnhandledSituation { code: e.number })?;
        if !self.phase.watches_situation() || self.vessel_id != Some(change.vessel) {
            return Ok(());
        }
        event!("Vessel situation changed to {to}");
        match (self.phase, LaunchEvent::from_situation(to)) {
            (_, None) | (LaunchPhase::Launched, Some(LaunchEvent::Launched)) => Ok(()),
            (_, Some(event)) => self.transition(event).await,
        }
    }

    /// Processes commands and situation notifications until the command channel
    /// closes or a fatal error occurs. Non-fatal command errors are logged.
    pub async fn run(mut self, mut commands: mpsc::Receiver<LaunchCommand>) -> Result<(), LaunchError> {
        loop {
            let input = {
                let situation: OptionFuture<_> =
                    self.situations.as_mut().map(|rx| rx.recv()).into();
                tokio::select! {
                    cmd = commands.recv() => SequencerInput::Command(cmd),
                    Some(change) = situation => SequencerInput::Situation(change),
                }
            };
            let res = match input {
                SequencerInput::Command(None) => break,
                SequencerInput::Command(Some(cmd)) => match cmd {
                    LaunchCommand::Launch => self.launch().await,
                    LaunchCommand::Abort => self.abort().await,
                    LaunchCommand::Reset => self.reset().await,
                },
                SequencerInput::Situation(Ok(change)) => self.on_situation_change(change).await,
                SequencerInput::Situation(Err(RecvError::Lagged(n))) => {
                    warn!("Missed {n} situation notifications");
                    Ok(())
                }
                SequencerInput::Situation(Err(RecvError::Closed)) => {
                    warn!("Situation feed closed");
                    self.situations = None;
                    Ok(())
                }
            };
            match res {
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => error!("{e}"),
                Ok(()) => (),
            }
        }
        info!("Launch sequencer stopped in {}", self.phase);
        Ok(())
    }

    async fn transition(&mut self, event: LaunchEvent) -> Result<(), LaunchError> {
        let from = self.phase;
        let to = from.next(event).ok_or(LaunchError::InvalidTransition { from, event })?;
        self.on_leave(from, to);
        self.on_enter(to).await?;
        self.phase = to;
        self.phase_tx.send_replace(to);
        info!("Launch phase {from} -> {to} on {event}");
        Ok(())
    }

    /// The situation receiver is carried from `Launch` into `Launched` so notifications
    /// already queued on it are still handled.
    fn on_leave(&mut self, from: LaunchPhase, to: LaunchPhase) {
        if from == LaunchPhase::Launch {
            self.scope = None;
        }
        if !to.watches_situation() {
            self.situations = None;
        }
    }

    /// `Launch` is only entered from `Init`, which holds nothing, so a failed
    /// entry leaves the machine unchanged.
    async fn on_enter(&mut self, to: LaunchPhase) -> Result<(), LaunchError> {
        match to {
            LaunchPhase::Init => {
                if let Some(countdown) = self.countdown.take() {
                    countdown.stop().await;
                }
                self.ticks.send_replace(TICK_UNSET);
            }
            LaunchPhase::Launch => self.enter_launch().await?,
            LaunchPhase::Launched => {
                if self.situations.is_none() {
                    self.situations = Some(self.context.host().subscribe_situation());
                }
            }
            LaunchPhase::Finished => {}
        }
        Ok(())
    }

    async fn enter_launch(&mut self) -> Result<(), LaunchError> {
        let host = Arc::clone(self.context.host());
        let vessel = host.active_vessel();
        let vessel_id = vessel.id();
        let (engine_control, sound_enabled, sound_set, sequence) = {
            let config = self.context.config().read().await;
            let Some(sequence) = config.sequence(vessel_id) else {
                return Err(LaunchError::MissingSequence { vessel: vessel_id });
            };
            (
                config.engine_control(),
                config.sound_enabled(),
                config.sound_set().to_string(),
                sequence.to_vec(),
            )
        };

        let audio = host.attach_audio(VOICE_PAN_LEVEL, host.voice_volume());
        self.ticks.send_replace(TICK_UNSET);
        let throttle = engine_control
            .then(|| ThrottleOverride::engage(Arc::clone(&vessel), self.ticks.subscribe()));
        let clips = Arc::new(if sound_enabled {
            CountdownClips::load(host.as_ref(), &sound_set)
        } else {
            CountdownClips::default()
        });
        self.situations = Some(host.subscribe_situation());
        let start = clips.countdown_start();
        let dispatcher = StageDispatcher::new(&sequence, start, Arc::clone(&vessel));
        let countdown = Countdown::new(
            start,
            Arc::clone(&clips),
            Arc::clone(&audio),
            dispatcher,
            Arc::clone(&self.ticks),
        );
        self.countdown = Some(countdown.spawn());
        self.scope = Some(LaunchScope { vessel, audio, clips, throttle });
        self.vessel_id = Some(vessel_id);
        Ok(())
    }
}
