#![allow(dead_code)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod host;
mod launch_control;
mod logger;

use crate::config::{ConfigInfo, FileNodeStore, StageIndex, VehicleId};
use crate::host::{FlightHost, Situation, sim::SimHost};
use crate::launch_control::{
    CountdownTick, LaunchCommand, LaunchContext, LaunchPhase, LaunchSequencer, TICK_UNSET,
};
use itertools::Itertools;
use std::{env, sync::Arc, time::Duration};
use tokio::sync::{RwLock, mpsc, watch};

const DEMO_VESSEL: VehicleId = VehicleId::from_u128(0x5eed_0c1a_7e00_4000_8000_0000_0000_0001);
const DEMO_SOUND_SET: &str = "Apollo";
const DEMO_CLIP_COUNT: u32 = 11;
/// Read from T-10: ignition at T-6, clamps released at T-0.
const DEMO_SEQUENCE: [StageIndex; 11] = [-1, -1, -1, -1, 2, -1, -1, -1, -1, -1, 1];
const ABORT_CLIP_LEN: Duration = Duration::from_secs(3);
const FRAME_DT: Duration = Duration::from_millis(100);
const COAST_DT: Duration = Duration::from_secs(2);

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let store = FileNodeStore::beside_executable()
        .unwrap_or_else(|e| fatal!("Config directory unavailable: {e}"));
    info!("Using config file {}", store.path().display());
    let config = init_config(ConfigInfo::open(Box::new(store)));
    let abort_at: Option<CountdownTick> =
        env::var("LCD_ABORT_AT").ok().and_then(|v| v.parse().ok()).map(|t: CountdownTick| t.max(0));

    let clips = SimHost::sound_set_clips(config.sound_set(), DEMO_CLIP_COUNT, ABORT_CLIP_LEN);
    let host = Arc::new(SimHost::new(DEMO_VESSEL, clips));
    let context = LaunchContext::new(
        Arc::clone(&host) as Arc<dyn FlightHost>,
        Arc::new(RwLock::new(config)),
    );
    let sequencer = LaunchSequencer::new(Arc::new(context));
    let mut phase = sequencer.subscribe_phase();
    let mut ticks = sequencer.subscribe_ticks();
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let runner = tokio::spawn(sequencer.run(cmd_rx));
    let frames = tokio::spawn(run_frames(Arc::clone(&host)));

    if fly(&host, &cmd_tx, &mut phase, &mut ticks, abort_at).await.is_none() {
        warn!("Sequencer went away during the demo flight");
    }
    drop(cmd_tx);
    frames.abort();
    match runner.await {
        Ok(Ok(())) => info!("Stages fired: [{}]", host.stages_activated().iter().join(", ")),
        Ok(Err(e)) => fatal!("{e}"),
        Err(e) => fatal!("Sequencer task failed: {e}"),
    }
}

/// Registers the demo vessel's sequence and a sound set when the stored config has none.
fn init_config(mut config: ConfigInfo) -> ConfigInfo {
    if config.sound_set().is_empty() {
        if let Err(e) = config.set_sound_set(DEMO_SOUND_SET) {
            warn!("{e}");
        }
    }
    if config.sequence(DEMO_VESSEL).is_none() {
        info!("Registering demo sequence for vessel {DEMO_VESSEL}");
        if let Err(e) = config.set_sequence(DEMO_VESSEL, DEMO_SEQUENCE.to_vec()) {
            warn!("{e}");
        }
    }
    config
}

/// Drives the simulated vessel from the pad into orbit, or into an abort at `abort_at`.
/// Returns `None` when a channel to the sequencer closed early.
async fn fly(
    host: &SimHost,
    commands: &mpsc::Sender<LaunchCommand>,
    phase: &mut watch::Receiver<LaunchPhase>,
    ticks: &mut watch::Receiver<CountdownTick>,
    abort_at: Option<CountdownTick>,
) -> Option<()> {
    commands.send(LaunchCommand::Launch).await.ok()?;
    phase.wait_for(|p| *p == LaunchPhase::Launch).await.ok()?;

    if let Some(abort_tick) = abort_at {
        ticks.wait_for(|t| *t != TICK_UNSET && *t <= abort_tick).await.ok()?;
        commands.send(LaunchCommand::Abort).await.ok()?;
        phase.wait_for(|p| *p == LaunchPhase::Init).await.ok()?;
        return Some(());
    }

    ticks.wait_for(|t| *t == 0).await.ok()?;
    host.emit_situation(Situation::Prelaunch, Situation::Flying);
    phase.wait_for(|p| *p == LaunchPhase::Launched).await.ok()?;
    tokio::time::sleep(COAST_DT).await;
    host.emit_situation(Situation::Flying, Situation::Orbiting);
    phase.wait_for(|p| *p == LaunchPhase::Finished).await.ok()?;
    Some(())
}

async fn run_frames(host: Arc<SimHost>) {
    let mut last: Option<f32> = None;
    loop {
        let throttle = host.run_frame().main_throttle;
        if last.is_none_or(|l| (l - throttle).abs() > f32::EPSILON) {
            event!("Main throttle at {throttle:.2}");
            last = Some(throttle);
        }
        tokio::time::sleep(FRAME_DT).await;
    }
}
