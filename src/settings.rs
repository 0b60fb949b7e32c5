//! Effect settings — the bass and spatial mode selections.
//!
//! Serialization uses the original UI wire strings (`"8d"`,
//! `"earthquake"`, ...) so the browser layer can pass its radio-button
//! values through unchanged. Settings are plain `Copy` values; the
//! render pipeline takes them by value, so an in-flight render never
//! sees later UI changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bass boost intensity (low-shelf gain preset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BassMode {
    #[default]
    Off,
    Low,
    Medium,
    High,
    Extra,
    Earthquake,
}

/// Rotating-pan "dimension" preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialMode {
    #[default]
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "8d")]
    EightD,
    #[serde(rename = "16d")]
    SixteenD,
    #[serde(rename = "32d")]
    ThirtyTwoD,
    #[serde(rename = "48d")]
    FortyEightD,
}

/// Snapshot of both effect selections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSettings {
    pub bass: BassMode,
    pub spatial: SpatialMode,
}

impl BassMode {
    /// The UI wire string for this mode.
    pub fn wire_name(self) -> &'static str {
        match self {
            BassMode::Off => "off",
            BassMode::Low => "low",
            BassMode::Medium => "medium",
            BassMode::High => "high",
            BassMode::Extra => "extra",
            BassMode::Earthquake => "earthquake",
        }
    }
}

impl SpatialMode {
    /// The UI wire string for this mode.
    pub fn wire_name(self) -> &'static str {
        match self {
            SpatialMode::Off => "off",
            SpatialMode::EightD => "8d",
            SpatialMode::SixteenD => "16d",
            SpatialMode::ThirtyTwoD => "32d",
            SpatialMode::FortyEightD => "48d",
        }
    }
}

/// A mode string that matches none of the known wire names.
#[derive(Debug)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown effect mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for BassMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(BassMode::Off),
            "low" => Ok(BassMode::Low),
            "medium" => Ok(BassMode::Medium),
            "high" => Ok(BassMode::High),
            "extra" => Ok(BassMode::Extra),
            "earthquake" => Ok(BassMode::Earthquake),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl FromStr for SpatialMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(SpatialMode::Off),
            "8d" => Ok(SpatialMode::EightD),
            "16d" => Ok(SpatialMode::SixteenD),
            "32d" => Ok(SpatialMode::ThirtyTwoD),
            "48d" => Ok(SpatialMode::FortyEightD),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}
