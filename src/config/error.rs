use strum_macros::Display;

/// Failure while reading the configuration document.
///
/// Any variant aborts the whole load: the configuration reverts to its defaults
/// and reports itself as not loaded.
#[derive(Debug, Display)]
pub enum ConfigLoadError {
    #[strum(to_string = "config document {path} does not exist")]
    Missing { path: String },
    #[strum(to_string = "cannot read config document: {reason}")]
    Io { reason: std::io::Error },
    #[strum(to_string = "malformed config document at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[strum(to_string = "invalid value '{value}' for key {key}")]
    InvalidValue { key: &'static str, value: String },
}

impl std::error::Error for ConfigLoadError {}

/// Failure of a property change. The in-memory values are left as they were.
#[derive(Debug, Display)]
pub enum ConfigSaveError {
    #[strum(to_string = "cannot write config document: {reason}")]
    Io { reason: std::io::Error },
    #[strum(to_string = "value '{value}' for key {key} cannot be stored")]
    Unrepresentable { key: &'static str, value: String },
}

impl std::error::Error for ConfigSaveError {}

impl From<std::io::Error> for ConfigSaveError {
    fn from(reason: std::io::Error) -> Self { Self::Io { reason } }
}
