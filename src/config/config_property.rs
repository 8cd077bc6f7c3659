use strum_macros::Display;

/// Names the configuration property a change notification is about.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigProperty {
    IsDebug,
    IsSoundEnabled,
    SoundSet,
    EngineControl,
    AbortExecuted,
    Scale,
    WindowPosition,
    Sequences,
}
