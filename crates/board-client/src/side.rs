//! Which side, if any, the server-side engine plays.

use std::fmt;
use std::str::FromStr;

use chess_core::Color;
use serde::{Deserialize, Serialize};

/// On the wire the engine side is `"white"`, `"black"` or `null`. Anything
/// else the server sends (including `"none"`) reads as [`AiSide::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum AiSide {
    #[default]
    None,
    White,
    Black,
}

impl AiSide {
    pub fn color(self) -> Option<Color> {
        match self {
            AiSide::None => None,
            AiSide::White => Some(Color::White),
            AiSide::Black => Some(Color::Black),
        }
    }

    /// Whether the engine plays `color`.
    pub fn controls(self, color: Color) -> bool {
        match (self, color) {
            (AiSide::White, Color::White) | (AiSide::Black, Color::Black) => true,
            (AiSide::White, Color::Black) | (AiSide::Black, Color::White) => false,
            (AiSide::None, _) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AiSide::None => "none",
            AiSide::White => "white",
            AiSide::Black => "black",
        }
    }
}

impl From<Option<String>> for AiSide {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("white") => AiSide::White,
            Some("black") => AiSide::Black,
            _ => AiSide::None,
        }
    }
}

impl From<AiSide> for Option<String> {
    fn from(side: AiSide) -> Self {
        match side {
            AiSide::None => None,
            AiSide::White | AiSide::Black => Some(side.as_str().to_string()),
        }
    }
}

impl fmt::Display for AiSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(AiSide::None),
            "white" | "w" => Ok(AiSide::White),
            "black" | "b" => Ok(AiSide::Black),
            other => Err(format!("unknown side '{other}' (expected none, white or black)")),
        }
    }
}
