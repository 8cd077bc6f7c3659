use super::ConfigLoadError;
use std::fmt::{Display, Formatter};

/// Screen rectangle of the countdown window, persisted as `x,y,w,h`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowRect {
    fn default() -> Self { Self::FALLBACK }
}

impl WindowRect {
    /// Used whenever a stored position carries fewer than four fields.
    pub const FALLBACK: WindowRect = WindowRect::new(0.0, 0.0, 459.0, 120.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Parses the stored `x,y,w,h` form.
    ///
    /// A value with fewer than four comma separated fields degrades to
    /// [`WindowRect::FALLBACK`]. A field that is present but not a number is an error.
    pub fn parse(data: &str) -> Result<Self, ConfigLoadError> {
        let items: Vec<&str> = data.split(',').map(str::trim).collect();
        if items.len() < 4 {
            return Ok(Self::FALLBACK);
        }
        let field = |i: usize| {
            items[i].parse::<f32>().map_err(|_| ConfigLoadError::InvalidValue {
                key: "position",
                value: data.to_string(),
            })
        };
        Ok(Self::new(field(0)?, field(1)?, field(2)?, field(3)?))
    }
}

impl Display for WindowRect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}
