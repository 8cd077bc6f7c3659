use super::CountdownTick;
use crate::host::{AudioClip, FlightHost};

/// The voice clips of one sound set, split into tick-numbered timer clips and named event clips.
#[derive(Debug, Clone, Default)]
pub struct CountdownClips {
    timer: Vec<AudioClip>,
    events: Vec<AudioClip>,
}

impl CountdownClips {
    const CLIP_PREFIX: &'static str = "NASA_Countdown";
    const TIMER_DIR: &'static str = "/Timer";
    const EVENTS_DIR: &'static str = "/Events";
    const ABORTED_CLIP: &'static str = "Aborted";
    /// Start tick when no timer clips are available.
    pub const FALLBACK_START: CountdownTick = 15;

    /// Collects the clips of `sound_set` from the host's audio database.
    /// An empty sound set name loads nothing.
    pub fn load(host: &dyn FlightHost, sound_set: &str) -> Self {
        if sound_set.is_empty() {
            return Self::default();
        }
        let clips: Vec<AudioClip> = host
            .find_clips(sound_set)
            .into_iter()
            .filter(|c| c.name().starts_with(Self::CLIP_PREFIX))
            .collect();
        let (timer, rest): (Vec<_>, Vec<_>) =
            clips.into_iter().partition(|c| c.name().contains(Self::TIMER_DIR));
        let events = rest.into_iter().filter(|c| c.name().contains(Self::EVENTS_DIR)).collect();
        Self { timer, events }
    }

    pub fn timer(&self) -> &[AudioClip] { &self.timer }
    pub fn events(&self) -> &[AudioClip] { &self.events }

    /// One less than the number of timer clips, or [`Self::FALLBACK_START`] without any.
    pub fn countdown_start(&self) -> CountdownTick {
        if self.timer.is_empty() {
            Self::FALLBACK_START
        } else {
            CountdownTick::try_from(self.timer.len() - 1).unwrap_or(CountdownTick::MAX)
        }
    }

    /// The timer clip whose name ends with `/<tick>`.
    pub fn timer_clip(&self, tick: CountdownTick) -> Option<&AudioClip> {
        let suffix = format!("/{tick}");
        self.timer.iter().find(|c| c.name().ends_with(&suffix))
    }

    pub fn event_clip(&self, name: &str) -> Option<&AudioClip> {
        self.events.iter().find(|c| c.name().ends_with(name))
    }

    pub fn aborted_clip(&self) -> Option<&AudioClip> { self.event_clip(Self::ABORTED_CLIP) }
}
