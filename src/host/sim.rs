use super::{
    ActionGroup, AudioClip, AudioOutput, FlightCtrlState, FlightHost, FlyByWire, FlyByWireId,
    Situation, SituationChange, Vessel,
};
use crate::config::VehicleId;
use crate::event;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// One observable side effect of the simulated host.
#[derive(Debug, Clone, PartialEq)]
pub enum SimRecord {
    StageActivated(u32),
    ActionGroupFired(ActionGroup),
    ClipPlayed(String),
    TimeWarpStopped,
    AudioAttached { pan_level: f32, volume: f32 },
    FlyByWireAdded(FlyByWireId),
    FlyByWireRemoved(FlyByWireId),
}

#[derive(Default)]
struct Journal {
    records: Mutex<Vec<(Instant, SimRecord)>>,
}

impl Journal {
    fn push(&self, record: SimRecord) {
        event!("sim: {record:?}");
        lock(&self.records).push((Instant::now(), record));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A vessel that records stage activations and action groups and keeps
/// its fly-by-wire callbacks for [`SimHost::run_frame`].
pub struct SimVessel {
    id: VehicleId,
    journal: Arc<Journal>,
    fly_by_wire: Mutex<Vec<(FlyByWireId, FlyByWire)>>,
    next_fbw_id: Mutex<u64>,
}

impl Vessel for SimVessel {
    fn id(&self) -> VehicleId { self.id }

    fn activate_stage(&self, stage: u32) { self.journal.push(SimRecord::StageActivated(stage)); }

    fn fire_action_group(&self, group: ActionGroup) {
        self.journal.push(SimRecord::ActionGroupFired(group));
    }

    fn add_fly_by_wire(&self, callback: FlyByWire) -> FlyByWireId {
        let id = {
            let mut next = lock(&self.next_fbw_id);
            *next += 1;
            FlyByWireId(*next)
        };
        lock(&self.fly_by_wire).push((id, callback));
        self.journal.push(SimRecord::FlyByWireAdded(id));
        id
    }

    fn remove_fly_by_wire(&self, id: FlyByWireId) {
        lock(&self.fly_by_wire).retain(|(fbw_id, _)| *fbw_id != id);
        self.journal.push(SimRecord::FlyByWireRemoved(id));
    }
}

struct SimAudio {
    journal: Arc<Journal>,
}

impl AudioOutput for SimAudio {
    fn play_one_shot(&self, clip: &AudioClip) {
        self.journal.push(SimRecord::ClipPlayed(clip.name().to_string()));
    }
}

/// A scripted stand-in for the game: one vessel, a fixed clip database and
/// a manually driven situation feed.
pub struct SimHost {
    vessel: Arc<SimVessel>,
    clips: Vec<AudioClip>,
    voice_volume: f32,
    situations: broadcast::Sender<SituationChange>,
    journal: Arc<Journal>,
}

impl SimHost {
    const SITUATION_CHANNEL_CAPACITY: usize = 16;

    pub fn new(vessel_id: VehicleId, clips: Vec<AudioClip>) -> Self {
        let journal = Arc::new(Journal::default());
        let vessel = Arc::new(SimVessel {
            id: vessel_id,
            journal: Arc::clone(&journal),
            fly_by_wire: Mutex::new(Vec::new()),
            next_fbw_id: Mutex::new(0),
        });
        Self {
            vessel,
            clips,
            voice_volume: 0.8,
            situations: broadcast::Sender::new(Self::SITUATION_CHANNEL_CAPACITY),
            journal,
        }
    }

    /// Builds `count` timer clips `<prefix>/Timer/<n>` plus an `Aborted` event clip.
    pub fn sound_set_clips(sound_set: &str, count: u32, abort_len: Duration) -> Vec<AudioClip> {
        let base = format!("NASA_Countdown/Sounds/{sound_set}");
        let mut clips: Vec<AudioClip> = (0..count)
            .map(|n| AudioClip::new(format!("{base}/Timer/{n}"), Duration::from_millis(800)))
            .collect();
        clips.push(AudioClip::new(format!("{base}/Events/Aborted"), abort_len));
        clips
    }

    pub fn vessel_id(&self) -> VehicleId { self.vessel.id }

    /// Runs one simulation frame of the input pipeline through all registered callbacks.
    pub fn run_frame(&self) -> FlightCtrlState {
        let callbacks: Vec<FlyByWire> =
            lock(&self.vessel.fly_by_wire).iter().map(|(_, cb)| Arc::clone(cb)).collect();
        let mut state = FlightCtrlState::default();
        for cb in callbacks {
            cb(&mut state);
        }
        state
    }

    pub fn fly_by_wire_count(&self) -> usize { lock(&self.vessel.fly_by_wire).len() }

    pub fn situation_subscribers(&self) -> usize { self.situations.receiver_count() }

    /// Publishes a situation change of the simulated vessel.
    pub fn emit_situation(&self, from: Situation, to: Situation) {
        self.emit_raw(SituationChange::new(self.vessel.id, from, to));
    }

    /// Publishes an arbitrary notification, including codes the host does not define.
    pub fn emit_raw(&self, change: SituationChange) {
        // nobody listening outside the launch phases
        let _ = self.situations.send(change);
    }

    pub fn records(&self) -> Vec<SimRecord> {
        lock(&self.journal.records).iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn timed_records(&self) -> Vec<(Instant, SimRecord)> { lock(&self.journal.records).clone() }

    pub fn stages_activated(&self) -> Vec<u32> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SimRecord::StageActivated(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    pub fn clips_played(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SimRecord::ClipPlayed(name) => Some(name),
                _ => None,
            })
            .collect()
    }
}

impl FlightHost for SimHost {
    fn active_vessel(&self) -> Arc<dyn Vessel> { Arc::clone(&self.vessel) as Arc<dyn Vessel> }

    fn attach_audio(&self, pan_level: f32, volume: f32) -> Arc<dyn AudioOutput> {
        self.journal.push(SimRecord::AudioAttached { pan_level, volume });
        Arc::new(SimAudio { journal: Arc::clone(&self.journal) })
    }

    fn find_clips(&self, needle: &str) -> Vec<AudioClip> {
        self.clips.iter().filter(|c| c.name().contains(needle)).cloned().collect()
    }

    fn voice_volume(&self) -> f32 { self.voice_volume }

    fn stop_time_warp(&self) { self.journal.push(SimRecord::TimeWarpStopped); }

    fn subscribe_situation(&self) -> broadcast::Receiver<SituationChange> {
        self.situations.subscribe()
    }
}
