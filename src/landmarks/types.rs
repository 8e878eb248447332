//! Landmark, hand and frame types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of landmarks in one tracked hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Wrist landmark index
pub const WRIST: usize = 0;

/// Index fingertip landmark index
pub const INDEX_FINGER_TIP: usize = 8;

/// One 3D point of a tracked hand.
///
/// `x`/`y` are normalized image coordinates (0.0 to 1.0). `z` is relative
/// depth and may be absent for some detector outputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Landmark without depth
    pub fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    /// Depth with the detector's "absent means zero" convention
    pub fn depth(&self) -> f32 {
        self.z.unwrap_or(0.0)
    }
}

/// Left/right label attached to a detected hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl FromStr for Handedness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Left" | "left" => Ok(Handedness::Left),
            "Right" | "right" => Ok(Handedness::Right),
            other => Err(format!("unknown handedness: {}", other)),
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete gesture category reported by the recognizer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureCategory {
    None,
    ClosedFist,
    OpenPalm,
    PointingUp,
    ThumbDown,
    ThumbUp,
    Victory,
    ILoveYou,
    /// A category name this build does not know about
    Unknown(String),
}

impl GestureCategory {
    /// Parse a recognizer category name. Never fails: unrecognized names
    /// are kept as [`GestureCategory::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "" | "None" => GestureCategory::None,
            "Closed_Fist" => GestureCategory::ClosedFist,
            "Open_Palm" => GestureCategory::OpenPalm,
            "Pointing_Up" => GestureCategory::PointingUp,
            "Thumb_Down" => GestureCategory::ThumbDown,
            "Thumb_Up" => GestureCategory::ThumbUp,
            "Victory" => GestureCategory::Victory,
            "ILoveYou" => GestureCategory::ILoveYou,
            other => GestureCategory::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GestureCategory::None => "None",
            GestureCategory::ClosedFist => "Closed_Fist",
            GestureCategory::OpenPalm => "Open_Palm",
            GestureCategory::PointingUp => "Pointing_Up",
            GestureCategory::ThumbDown => "Thumb_Down",
            GestureCategory::ThumbUp => "Thumb_Up",
            GestureCategory::Victory => "Victory",
            GestureCategory::ILoveYou => "ILoveYou",
            GestureCategory::Unknown(name) => name,
        }
    }
}

impl fmt::Display for GestureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected hand: 21 landmarks plus its labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
    pub gesture_category: GestureCategory,
    pub handedness: Handedness,
}

impl Hand {
    pub fn new(
        landmarks: Vec<Landmark>,
        gesture_category: GestureCategory,
        handedness: Handedness,
    ) -> Self {
        Self {
            landmarks,
            gesture_category,
            handedness,
        }
    }

    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

/// All hands detected in one video frame, in detection order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub hands: Vec<Hand>,
}

impl DetectionFrame {
    pub fn new(hands: Vec<Hand>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// First hand in detection order
    pub fn primary(&self) -> Option<&Hand> {
        self.hands.first()
    }
}
