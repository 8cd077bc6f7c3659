use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A 128-bit globally unique vessel identifier, the key of the stored stage sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(u128);

/// Returned when a string is not a valid hyphenated or plain 32-digit identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleIdParseError(pub String);

impl Display for VehicleIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a valid vehicle identifier", self.0)
    }
}

impl std::error::Error for VehicleIdParseError {}

impl VehicleId {
    /// Group lengths of the hyphenated text form.
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    pub const fn from_u128(raw: u128) -> Self { Self(raw) }
    pub fn as_u128(&self) -> u128 { self.0 }
}

impl FromStr for VehicleId {
    type Err = VehicleIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);
        let hex: String = if inner.contains('-') {
            let groups: Vec<&str> = inner.split('-').collect();
            let well_formed = groups.len() == Self::GROUPS.len()
                && groups.iter().zip(Self::GROUPS).all(|(g, len)| g.len() == len);
            if !well_formed {
                return Err(VehicleIdParseError(s.to_string()));
            }
            groups.concat()
        } else {
            inner.to_string()
        };
        if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VehicleIdParseError(s.to_string()));
        }
        u128::from_str_radix(&hex, 16).map(Self).map_err(|_| VehicleIdParseError(s.to_string()))
    }
}

impl Display for VehicleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hex = format!("{:032x}", self.0);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}
