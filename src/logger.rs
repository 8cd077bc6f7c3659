use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the configuration whenever its `isDebug` flag changes.
static DEBUG_EVENTS: AtomicBool = AtomicBool::new(false);

/// Env var forcing `event!` output regardless of the configuration.
const EVENTS_ENV_VAR: &str = "LOG_COUNTDOWN_EVENTS";

pub fn set_debug_events(enabled: bool) { DEBUG_EVENTS.store(enabled, Ordering::Relaxed); }

pub fn debug_events_enabled() -> bool {
    DEBUG_EVENTS.load(Ordering::Relaxed) || std::env::var_os(EVENTS_ENV_VAR).is_some()
}

/// Formats one coloured, millisecond-stamped log line; `$emit` is `println` or `panic`.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($emit:ident, $colour:literal, $tag:literal, $($arg:tt)*) => {
        $emit!(
            concat!("\x1b[", $colour, "m[", $tag, "][{}]\x1b[0m {}"),
            chrono::Utc::now().format("%H:%M:%S%.3f"),
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::__log_line!(println, "32", "INFO ", $($arg)*) };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => { $crate::__log_line!(println, "33", "LOG  ", $($arg)*) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__log_line!(println, "35", "WARN ", $($arg)*) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::__log_line!(println, "31", "ERROR", $($arg)*) };
}

/// Logs and panics.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => { $crate::__log_line!(panic, "1;31", "FATAL", $($arg)*) };
}

/// Per-tick and per-notification tracing, silent unless debug events are enabled.
#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if $crate::logger::debug_events_enabled() {
            $crate::__log_line!(println, "36", "EVENT", $($arg)*)
        }
    };
}
