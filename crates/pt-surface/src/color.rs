//! Accent colour used as the trusted surface's toolbar hint.

use core::fmt;
use core::str::FromStr;
use pt_core::HostError;
use thiserror::Error;

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0xFF00_0000),
    ("darkgray", 0xFF44_4444),
    ("darkgrey", 0xFF44_4444),
    ("gray", 0xFF88_8888),
    ("grey", 0xFF88_8888),
    ("lightgray", 0xFFCC_CCCC),
    ("lightgrey", 0xFFCC_CCCC),
    ("white", 0xFFFF_FFFF),
    ("red", 0xFFFF_0000),
    ("green", 0xFF00_FF00),
    ("blue", 0xFF00_00FF),
    ("yellow", 0xFFFF_FF00),
    ("cyan", 0xFF00_FFFF),
    ("magenta", 0xFFFF_00FF),
    ("aqua", 0xFF00_FFFF),
    ("fuchsia", 0xFFFF_00FF),
    ("lime", 0xFF00_FF00),
    ("maroon", 0xFF80_0000),
    ("navy", 0xFF00_0080),
    ("olive", 0xFF80_8000),
    ("purple", 0xFF80_0080),
    ("silver", 0xFFC0_C0C0),
    ("teal", 0xFF00_8080),
];

/// Opaque or translucent colour stored as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccentColor(u32);

impl AccentColor {
    pub const fn from_argb(argb: u32) -> Self {
        Self(argb)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color `{0}`")]
pub struct ColorParseError(pub String);

impl From<ColorParseError> for HostError {
    fn from(error: ColorParseError) -> Self {
        HostError::new("surface.invalid_color", error.to_string())
    }
}

impl FromStr for AccentColor {
    type Err = ColorParseError;

    /// Accepts `#RRGGBB`, `#AARRGGBB` or a platform colour name.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let invalid = || ColorParseError(input.to_owned());

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return match hex.len() {
                6 => Ok(Self(0xFF00_0000 | value)),
                8 => Ok(Self(value)),
                _ => Err(invalid()),
            };
        }

        let lowered = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, argb)| Self(*argb))
            .ok_or_else(invalid)
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 0xFF {
            write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
        } else {
            write!(f, "#{:08X}", self.0)
        }
    }
}
