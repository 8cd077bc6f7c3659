use super::{
    ConfigInfo, ConfigLoadError, ConfigNode, ConfigProperty, ConfigSaveError, ConfigValues,
    FileNodeStore, NodeStore, VehicleId, WindowRect,
};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::TryRecvError;

const VESSEL: VehicleId = VehicleId::from_u128(0x6f96_19ff_8b86_d011_b42d_00c0_4fc9_64ff);

/// In-memory document store counting its writes.
#[derive(Clone, Default)]
struct MemoryNodeStore {
    text: Arc<Mutex<Option<String>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryNodeStore {
    fn with_text(text: &str) -> Self {
        let store = Self::default();
        *store.text.lock().unwrap() = Some(text.to_string());
        store
    }
    fn saves(&self) -> usize { *self.saves.lock().unwrap() }
    fn text(&self) -> Option<String> { self.text.lock().unwrap().clone() }
}

impl NodeStore for MemoryNodeStore {
    fn load(&self) -> Result<ConfigNode, ConfigLoadError> {
        match self.text.lock().unwrap().as_deref() {
            Some(text) => ConfigNode::parse(text),
            None => Err(ConfigLoadError::Missing { path: "memory".to_string() }),
        }
    }

    fn save(&self, node: &ConfigNode) -> std::io::Result<()> {
        *self.text.lock().unwrap() = Some(node.to_string());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

fn open(store: &MemoryNodeStore) -> ConfigInfo { ConfigInfo::open(Box::new(store.clone())) }

/// Accepts writes only while `writable` is set.
#[derive(Clone, Default)]
struct FlakyNodeStore {
    inner: MemoryNodeStore,
    writable: Arc<Mutex<bool>>,
}

impl NodeStore for FlakyNodeStore {
    fn load(&self) -> Result<ConfigNode, ConfigLoadError> { self.inner.load() }

    fn save(&self, node: &ConfigNode) -> std::io::Result<()> {
        if !*self.writable.lock().unwrap() {
            return Err(std::io::Error::other("disk full"));
        }
        self.inner.save(node)
    }
}

#[test]
fn test_missing_document_keeps_defaults() {
    let store = MemoryNodeStore::default();
    let info = open(&store);
    assert!(!info.is_loaded());
    assert_eq!(info.values(), &ConfigValues::default());
    assert_eq!(info.window_position(), WindowRect::new(0.0, 0.0, 459.0, 120.0));
    assert!((info.scale() - 1.0).abs() < f32::EPSILON);
    assert_eq!(store.saves(), 0);
}

#[test]
fn test_load_reads_every_key() {
    let store = MemoryNodeStore::with_text(
        "isDebug = True\n\
         soundEnabled = true\n\
         soundSet = Apollo\n\
         position = 10,20,300,140\n\
         engineControl = False\n\
         abort = True\n\
         scale = 1.5\n\
         sequence\n\
         {\n\
         \tid = 6f9619ff-8b86-d011-b42d-00c04fc964ff\n\
         \tstages = -1,2,-1,0\n\
         }\n",
    );
    let info = open(&store);
    assert!(info.is_loaded());
    assert!(info.is_debug());
    assert!(info.sound_enabled());
    assert_eq!(info.sound_set(), "Apollo");
    assert!(!info.engine_control());
    assert!(info.abort_executed());
    assert!((info.scale() - 1.5).abs() < f32::EPSILON);
    assert_eq!(info.window_position(), WindowRect::new(10.0, 20.0, 300.0, 140.0));
    assert_eq!(info.sequence(VESSEL), Some(&[-1, 2, -1, 0][..]));
    assert_eq!(store.saves(), 0);
}

#[test]
fn test_partial_document_leaves_missing_keys_at_default() {
    let store = MemoryNodeStore::with_text("soundEnabled = True\n");
    let info = open(&store);
    assert!(info.is_loaded());
    assert!(info.sound_enabled());
    assert_eq!(info.sound_set(), "");
    assert!(info.sequences().is_empty());
}

#[test]
fn test_parse_failure_reverts_whole_load() {
    let store = MemoryNodeStore::with_text(
        "soundEnabled = True\nsoundSet = Apollo\nscale = big\n",
    );
    let mut info = open(&store);
    assert!(!info.is_loaded());
    assert!(!info.sound_enabled());
    assert_eq!(info.sound_set(), "");

    let err = info.load().unwrap_err();
    assert!(matches!(err, ConfigLoadError::InvalidValue { key: "scale", .. }));
}

#[test]
fn test_bad_vehicle_id_fails_load() {
    let store = MemoryNodeStore::with_text("sequence\n{\n\tid = not-a-guid\n\tstages = 1\n}\n");
    let info = open(&store);
    assert!(!info.is_loaded());
    assert!(info.sequences().is_empty());
}

#[test]
fn test_malformed_position_falls_back() {
    assert_eq!(WindowRect::parse("1,2").unwrap(), WindowRect::FALLBACK);
    assert_eq!(WindowRect::parse("").unwrap(), WindowRect::new(0.0, 0.0, 459.0, 120.0));
    assert_eq!(WindowRect::parse("1,2,3,4").unwrap(), WindowRect::new(1.0, 2.0, 3.0, 4.0));
    assert!(WindowRect::parse("1,2,x,4").is_err());

    let info = open(&MemoryNodeStore::with_text("position = 1,2\n"));
    assert!(info.is_loaded());
    assert_eq!(info.window_position(), WindowRect::FALLBACK);
}

#[test]
fn test_setters_on_equal_values_are_silent() {
    let store = MemoryNodeStore::default();
    let mut info = open(&store);
    let mut rx = info.subscribe();

    info.set_debug(false).unwrap();
    info.set_sound_enabled(false).unwrap();
    info.set_sound_set("").unwrap();
    info.set_engine_control(false).unwrap();
    info.set_abort_executed(false).unwrap();
    info.set_scale(1.0).unwrap();
    info.set_scale(1.04).unwrap();
    info.set_window_position(WindowRect::FALLBACK).unwrap();
    info.remove_sequence(VESSEL).unwrap();

    assert_eq!(store.saves(), 0);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn test_setters_persist_then_notify() {
    let store = MemoryNodeStore::default();
    let mut info = open(&store);
    let mut rx = info.subscribe();

    info.set_sound_enabled(true).unwrap();
    assert_eq!(store.saves(), 1);
    assert!(store.text().unwrap().contains("soundEnabled = True"));
    assert_eq!(rx.try_recv(), Ok(ConfigProperty::IsSoundEnabled));

    info.set_sequence(VESSEL, vec![3, -1]).unwrap();
    info.set_sequence(VESSEL, vec![3, -1]).unwrap();
    assert_eq!(store.saves(), 2);
    assert_eq!(rx.try_recv(), Ok(ConfigProperty::Sequences));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    info.set_engine_control(true).unwrap();
    info.set_abort_executed(true).unwrap();
    info.set_sound_set("Saturn").unwrap();
    assert_eq!(rx.try_recv(), Ok(ConfigProperty::EngineControl));
    assert_eq!(rx.try_recv(), Ok(ConfigProperty::AbortExecuted));
    assert_eq!(rx.try_recv(), Ok(ConfigProperty::SoundSet));
    assert_eq!(store.saves(), 5);
}

#[test]
fn test_failed_save_keeps_previous_value() {
    let store = FlakyNodeStore::default();
    let mut info = ConfigInfo::open(Box::new(store.clone()));
    let mut rx = info.subscribe();

    let err = info.set_engine_control(true).unwrap_err();
    assert!(matches!(err, ConfigSaveError::Io { .. }));
    assert!(!info.engine_control());
    info.set_sequence(VESSEL, vec![1]).unwrap_err();
    assert_eq!(info.sequence(VESSEL), None);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    *store.writable.lock().unwrap() = true;
    info.set_engine_control(true).unwrap();
    assert!(info.engine_control());
    assert_eq!(store.inner.saves(), 1);
    assert!(store.inner.text().unwrap().contains("engineControl = True"));
    assert_eq!(rx.try_recv(), Ok(ConfigProperty::EngineControl));
}

#[test]
fn test_sound_set_must_survive_the_document() {
    let store = MemoryNodeStore::default();
    let mut info = open(&store);
    for bad in [" Apollo", "Apollo ", "Apollo//11", "Apo{llo", "Apollo\n11"] {
        let err = info.set_sound_set(bad).unwrap_err();
        assert!(matches!(err, ConfigSaveError::Unrepresentable { key: "soundSet", .. }));
    }
    assert_eq!(info.sound_set(), "");
    assert_eq!(store.saves(), 0);

    info.set_sound_set("Apollo 11/Saturn").unwrap();
    assert_eq!(open(&store).sound_set(), "Apollo 11/Saturn");
}

#[test]
fn test_scale_is_rounded_to_one_decimal() {
    let store = MemoryNodeStore::default();
    let mut info = open(&store);
    info.set_scale(1.26).unwrap();
    assert!((info.scale() - 1.3).abs() < 1e-6);
    info.set_scale(1.34).unwrap();
    assert_eq!(store.saves(), 1);
}

#[test]
fn test_save_load_round_trip() {
    let store = MemoryNodeStore::default();
    let other = VehicleId::from_u128(42);
    {
        let mut info = open(&store);
        info.set_debug(true).unwrap();
        info.set_sound_enabled(true).unwrap();
        info.set_sound_set("Apollo 11").unwrap();
        info.set_engine_control(true).unwrap();
        info.set_abort_executed(true).unwrap();
        info.set_scale(0.8).unwrap();
        info.set_window_position(WindowRect::new(12.5, 40.0, 459.0, 130.0)).unwrap();
        info.set_sequence(VESSEL, vec![-1, 2, -1, 0]).unwrap();
        info.set_sequence(other, Vec::new()).unwrap();
        info.set_debug(false).unwrap();
    }
    let reloaded = open(&store);
    assert!(reloaded.is_loaded());
    assert!(!reloaded.is_debug());
    assert!(reloaded.sound_enabled());
    assert_eq!(reloaded.sound_set(), "Apollo 11");
    assert!(reloaded.engine_control());
    assert!(reloaded.abort_executed());
    assert!((reloaded.scale() - 0.8).abs() < 1e-6);
    assert_eq!(reloaded.window_position(), WindowRect::new(12.5, 40.0, 459.0, 130.0));
    assert_eq!(reloaded.sequence(VESSEL), Some(&[-1, 2, -1, 0][..]));
    assert_eq!(reloaded.sequence(other), Some(&[][..]));
}

#[test]
fn test_config_node_text_format() {
    let text = "// launch config\n\
                soundSet = Apollo\n\
                sequence {\n\
                \tid = 00000000-0000-0000-0000-00000000002a\n\
                \tstages =\n\
                }\n";
    let node = ConfigNode::parse(text).unwrap();
    assert_eq!(node.value("soundSet"), Some("Apollo"));
    let seq = node.nodes("sequence").next().unwrap();
    assert_eq!(seq.value("stages"), Some(""));

    let written = node.to_string();
    assert_eq!(
        written,
        "soundSet = Apollo\nsequence\n{\n\tid = 00000000-0000-0000-0000-00000000002a\n\tstages = \n}\n"
    );
    assert_eq!(ConfigNode::parse(&written).unwrap(), node);
}

#[test]
fn test_config_node_rejects_unbalanced_braces() {
    assert!(matches!(
        ConfigNode::parse("a = 1\n}\n"),
        Err(ConfigLoadError::Malformed { line: 2, .. })
    ));
    assert!(matches!(
        ConfigNode::parse("sequence\n{\nid = 1\n"),
        Err(ConfigLoadError::Malformed { .. })
    ));
    assert!(matches!(
        ConfigNode::parse("sequence\nid = 1\n"),
        Err(ConfigLoadError::Malformed { line: 1, .. })
    ));
}

#[test]
fn test_vehicle_id_text_forms() {
    let id: VehicleId = "6F9619FF-8B86-D011-B42D-00C04FC964FF".parse().unwrap();
    assert_eq!(id, VESSEL);
    assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    assert_eq!("{6f9619ff-8b86-d011-b42d-00c04fc964ff}".parse::<VehicleId>().unwrap(), VESSEL);
    assert_eq!("6f9619ff8b86d011b42d00c04fc964ff".parse::<VehicleId>().unwrap(), VESSEL);
    assert!("6f9619ff-8b86-d011-b42d".parse::<VehicleId>().is_err());
    assert!("6f9619ff-8b86-d011-b42d-00c04fc964fg".parse::<VehicleId>().is_err());
}

#[test]
fn test_file_store_creates_directory() {
    let dir = std::env::temp_dir()
        .join(format!("lcd-config-test-{}", std::process::id()))
        .join("config");
    let store = FileNodeStore::in_dir(&dir).unwrap();
    assert!(dir.is_dir());
    assert!(matches!(store.load(), Err(ConfigLoadError::Missing { .. })));

    let mut info = ConfigInfo::open(Box::new(FileNodeStore::in_dir(&dir).unwrap()));
    info.set_sound_set("Gemini").unwrap();
    let reloaded = ConfigInfo::open(Box::new(store));
    assert_eq!(reloaded.sound_set(), "Gemini");
    std::fs::remove_dir_all(dir.parent().unwrap()).ok();
}
