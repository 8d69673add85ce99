/// Sprite playback settings for atlases consumed as animation frame strips.

use crate::geom::Vec2f;
use std::fmt;
use std::str::FromStr;

/// What happens after the last frame plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowAction {
    Hold,
    #[default]
    Loop,
}

impl FromStr for OverflowAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hold" => Ok(Self::Hold),
            "loop" => Ok(Self::Loop),
            _ => Err(format!("invalid overflow action: {s} (Hold|Loop)")),
        }
    }
}

impl fmt::Display for OverflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hold => write!(f, "Hold"),
            Self::Loop => write!(f, "Loop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDescriptor {
    /// Playback speed in frames per second.
    pub rate: f32,
    pub overflow: OverflowAction,
    /// Additional offset applied to the sprite.
    pub origin: Vec2f,
}

impl Default for SpriteDescriptor {
    fn default() -> Self {
        Self {
            rate: 10.0,
            overflow: OverflowAction::Loop,
            origin: Vec2f::ZERO,
        }
    }
}
