use strum_macros::Display;

/// User commands accepted by the sequencer loop.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum LaunchCommand {
    Launch,
    Abort,
    Reset,
}

/// How a countdown sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownExit {
    /// Ran down to zero.
    Liftoff,
    /// Stopped early by an abort or a reset.
    Cancelled,
}
