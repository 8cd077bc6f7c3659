use super::{
    ConfigLoadError, ConfigNode, ConfigProperty, ConfigSaveError, NodeStore, VehicleId, WindowRect,
};
use crate::{error, log, logger};
use itertools::Itertools;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// Per-tick stage trigger. Non-negative values fire that vehicle stage, negative values do nothing.
pub type StageIndex = i32;

/// The persisted value set of the configuration, without any store or observers attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValues {
    is_debug: bool,
    sound_enabled: bool,
    sound_set: String,
    engine_control: bool,
    abort_executed: bool,
    scale: f32,
    window_position: WindowRect,
    sequences: BTreeMap<VehicleId, Vec<StageIndex>>,
}

impl Default for ConfigValues {
    fn default() -> Self {
        Self {
            is_debug: false,
            sound_enabled: false,
            sound_set: String::new(),
            engine_control: false,
            abort_executed: false,
            scale: 1.0,
            window_position: WindowRect::FALLBACK,
            sequences: BTreeMap::new(),
        }
    }
}

impl ConfigValues {
    const KEY_DEBUG: &'static str = "isDebug";
    const KEY_SOUND_ENABLED: &'static str = "soundEnabled";
    const KEY_SOUND_SET: &'static str = "soundSet";
    const KEY_ENGINE_CONTROL: &'static str = "engineControl";
    const KEY_ABORT: &'static str = "abort";
    const KEY_SCALE: &'static str = "scale";
    const KEY_POSITION: &'static str = "position";
    const NODE_SEQUENCE: &'static str = "sequence";
    const KEY_SEQUENCE_ID: &'static str = "id";
    const KEY_SEQUENCE_STAGES: &'static str = "stages";

    /// Builds a value set from a parsed document. Absent keys keep their defaults,
    /// the first unparsable value fails the whole conversion.
    pub fn from_node(node: &ConfigNode) -> Result<Self, ConfigLoadError> {
        let mut values = Self::default();
        if let Some(v) = node.value(Self::KEY_DEBUG) {
            values.is_debug = parse_bool(Self::KEY_DEBUG, v)?;
        }
        if let Some(v) = node.value(Self::KEY_SOUND_ENABLED) {
            values.sound_enabled = parse_bool(Self::KEY_SOUND_ENABLED, v)?;
        }
        if let Some(v) = node.value(Self::KEY_ENGINE_CONTROL) {
            values.engine_control = parse_bool(Self::KEY_ENGINE_CONTROL, v)?;
        }
        if let Some(v) = node.value(Self::KEY_ABORT) {
            values.abort_executed = parse_bool(Self::KEY_ABORT, v)?;
        }
        if let Some(v) = node.value(Self::KEY_SCALE) {
            let scale = v.trim().parse::<f32>().map_err(|_| ConfigLoadError::InvalidValue {
                key: Self::KEY_SCALE,
                value: v.to_string(),
            })?;
            values.scale = round_scale(scale);
        }
        if let Some(v) = node.value(Self::KEY_SOUND_SET) {
            values.sound_set = v.to_string();
        }
        if let Some(v) = node.value(Self::KEY_POSITION) {
            values.window_position = WindowRect::parse(v)?;
        }
        for seq in node.nodes(Self::NODE_SEQUENCE) {
            let raw_id = seq.value(Self::KEY_SEQUENCE_ID).unwrap_or_default();
            let id = raw_id.parse::<VehicleId>().map_err(|_| ConfigLoadError::InvalidValue {
                key: Self::KEY_SEQUENCE_ID,
                value: raw_id.to_string(),
            })?;
            let Some(raw_stages) = seq.value(Self::KEY_SEQUENCE_STAGES) else {
                return Err(ConfigLoadError::InvalidValue {
                    key: Self::KEY_SEQUENCE_STAGES,
                    value: String::new(),
                });
            };
            values.sequences.insert(id, parse_stages(raw_stages)?);
        }
        Ok(values)
    }

    /// Serializes the full value set, sequences with their stages comma-joined.
    pub fn to_node(&self) -> ConfigNode {
        let mut node = ConfigNode::new();
        node.add_value(Self::KEY_DEBUG, format_bool(self.is_debug));
        node.add_value(Self::KEY_SOUND_ENABLED, format_bool(self.sound_enabled));
        node.add_value(Self::KEY_SOUND_SET, &self.sound_set);
        node.add_value(Self::KEY_POSITION, self.window_position);
        node.add_value(Self::KEY_ENGINE_CONTROL, format_bool(self.engine_control));
        node.add_value(Self::KEY_ABORT, format_bool(self.abort_executed));
        node.add_value(Self::KEY_SCALE, self.scale);
        for (id, stages) in &self.sequences {
            let seq_node = node.add_node(Self::NODE_SEQUENCE);
            seq_node.add_value(Self::KEY_SEQUENCE_ID, id);
            seq_node.add_value(Self::KEY_SEQUENCE_STAGES, stages.iter().join(","));
        }
        node
    }
}

fn format_bool(value: bool) -> &'static str { if value { "True" } else { "False" } }

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigLoadError> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigLoadError::InvalidValue { key, value: value.to_string() }),
    }
}

fn parse_stages(value: &str) -> Result<Vec<StageIndex>, ConfigLoadError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|s| {
            s.trim().parse::<StageIndex>().map_err(|_| ConfigLoadError::InvalidValue {
                key: ConfigValues::KEY_SEQUENCE_STAGES,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Rounds to one decimal place, ties to even.
#[allow(clippy::cast_possible_truncation)]
fn round_scale(value: f32) -> f32 { ((f64::from(value) * 10.0).round_ties_even() / 10.0) as f32 }

/// The launch countdown configuration.
///
/// Every setter is a no-op when the new value equals the current one. Otherwise it
/// stores the value, persists the whole document and only then announces the changed
/// [`ConfigProperty`] to all subscribers.
pub struct ConfigInfo {
    /// Current field values.
    values: ConfigValues,
    /// Backend the document is read from and written to.
    store: Box<dyn NodeStore>,
    /// Whether the last load succeeded.
    is_loaded: bool,
    /// Change notifications for observers such as the window.
    changes: broadcast::Sender<ConfigProperty>,
}

impl ConfigInfo {
    const CHANGE_CHANNEL_CAPACITY: usize = 32;

    /// Creates the configuration and loads it from `store`.
    ///
    /// A failed load is logged and leaves the defaults in place, see [`ConfigInfo::load`].
    pub fn open(store: Box<dyn NodeStore>) -> Self {
        let mut info = Self {
            values: ConfigValues::default(),
            store,
            is_loaded: false,
            changes: broadcast::Sender::new(Self::CHANGE_CHANNEL_CAPACITY),
        };
        info.load().ok();
        info
    }

    /// Replaces all values with the stored document.
    ///
    /// # Errors
    /// Any read or parse failure. All values revert to their defaults and
    /// [`ConfigInfo::is_loaded`] turns false.
    pub fn load(&mut self) -> Result<(), ConfigLoadError> {
        match self.store.load().and_then(|node| ConfigValues::from_node(&node)) {
            Ok(values) => {
                self.values = values;
                self.is_loaded = true;
                logger::set_debug_events(self.values.is_debug);
                log!("Window position is {}", self.values.window_position);
                Ok(())
            }
            Err(e) => {
                error!("Cannot load config: {e}");
                self.values = ConfigValues::default();
                self.is_loaded = false;
                logger::set_debug_events(false);
                Err(e)
            }
        }
    }

    /// Overwrites the stored document with the current values.
    pub fn save(&self) -> Result<(), ConfigSaveError> {
        self.store.save(&self.values.to_node())?;
        Ok(())
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigProperty> { self.changes.subscribe() }

    pub fn is_loaded(&self) -> bool { self.is_loaded }
    pub fn values(&self) -> &ConfigValues { &self.values }
    pub fn is_debug(&self) -> bool { self.values.is_debug }
    pub fn sound_enabled(&self) -> bool { self.values.sound_enabled }
    pub fn sound_set(&self) -> &str { &self.values.sound_set }
    pub fn engine_control(&self) -> bool { self.values.engine_control }
    pub fn abort_executed(&self) -> bool { self.values.abort_executed }
    pub fn scale(&self) -> f32 { self.values.scale }
    pub fn window_position(&self) -> WindowRect { self.values.window_position }
    pub fn sequences(&self) -> &BTreeMap<VehicleId, Vec<StageIndex>> { &self.values.sequences }
    pub fn sequence(&self, id: VehicleId) -> Option<&[StageIndex]> {
        self.values.sequences.get(&id).map(Vec::as_slice)
    }

    pub fn set_debug(&mut self, value: bool) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::IsDebug, |v| replace(&mut v.is_debug, value))?;
        logger::set_debug_events(self.values.is_debug);
        Ok(())
    }

    pub fn set_sound_enabled(&mut self, value: bool) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::IsSoundEnabled, |v| replace(&mut v.sound_enabled, value))
    }

    /// # Errors
    /// [`ConfigSaveError::Unrepresentable`] for names the document cannot hold verbatim:
    /// surrounding whitespace, line breaks, braces or `//`.
    pub fn set_sound_set(&mut self, value: &str) -> Result<(), ConfigSaveError> {
        let representable = value.trim() == value
            && !value.contains("//")
            && !value.contains(['\n', '\r', '{', '}']);
        if !representable {
            return Err(ConfigSaveError::Unrepresentable {
                key: ConfigValues::KEY_SOUND_SET,
                value: value.to_string(),
            });
        }
        self.update(ConfigProperty::SoundSet, |v| {
            let changed = v.sound_set != value;
            if changed {
                v.sound_set = value.to_string();
            }
            changed
        })
    }

    pub fn set_engine_control(&mut self, value: bool) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::EngineControl, |v| replace(&mut v.engine_control, value))
    }

    pub fn set_abort_executed(&mut self, value: bool) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::AbortExecuted, |v| replace(&mut v.abort_executed, value))
    }

    /// Stores `value` rounded to one decimal place.
    pub fn set_scale(&mut self, value: f32) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::Scale, |v| replace(&mut v.scale, round_scale(value)))
    }

    pub fn set_window_position(&mut self, value: WindowRect) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::WindowPosition, |v| replace(&mut v.window_position, value))
    }

    /// Assigns the stage sequence of one vessel, replacing any previous one.
    pub fn set_sequence(
        &mut self,
        id: VehicleId,
        stages: Vec<StageIndex>,
    ) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::Sequences, |v| {
            let changed = v.sequences.get(&id) != Some(&stages);
            if changed {
                v.sequences.insert(id, stages);
            }
            changed
        })
    }

    pub fn remove_sequence(&mut self, id: VehicleId) -> Result<(), ConfigSaveError> {
        self.update(ConfigProperty::Sequences, |v| v.sequences.remove(&id).is_some())
    }

    /// Applies `change` to a copy of the values. If it reports a change, the copy is
    /// persisted and only then replaces the current values and gets announced.
    /// A failed write leaves the current values untouched.
    fn update(
        &mut self,
        property: ConfigProperty,
        change: impl FnOnce(&mut ConfigValues) -> bool,
    ) -> Result<(), ConfigSaveError> {
        let mut next = self.values.clone();
        if !change(&mut next) {
            return Ok(());
        }
        self.store.save(&next.to_node())?;
        self.values = next;
        // no subscribers is fine
        let _ = self.changes.send(property);
        Ok(())
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
