//! Gesture symbols and the event record passed between the two loops.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A classified gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gesture {
    Left,
    Right,
    Up,
    Down,
    PinchIn,
    PinchOut,
    None,
}

/// Which way a gesture moves the zoom stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl Gesture {
    /// Symbol used on the wire and in logs.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gesture::Left => "left",
            Gesture::Right => "right",
            Gesture::Up => "up",
            Gesture::Down => "down",
            Gesture::PinchIn => "pinch-in",
            Gesture::PinchOut => "pinch-out",
            Gesture::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Gesture::None)
    }

    /// Zoom semantics of the gesture.
    ///
    /// Vertical swipes act as pinches: up spreads (zoom in), down closes
    /// (zoom out). Horizontal swipes carry no zoom meaning.
    pub fn zoom_direction(&self) -> Option<ZoomDirection> {
        match self {
            Gesture::Up | Gesture::PinchOut => Some(ZoomDirection::In),
            Gesture::Down | Gesture::PinchIn => Some(ZoomDirection::Out),
            Gesture::Left | Gesture::Right | Gesture::None => None,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unknown gesture symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture symbol: {0:?}")]
pub struct UnknownGesture(pub String);

impl FromStr for Gesture {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Gesture::Left),
            "right" => Ok(Gesture::Right),
            "up" => Ok(Gesture::Up),
            "down" => Ok(Gesture::Down),
            "pinch-in" => Ok(Gesture::PinchIn),
            "pinch-out" => Ok(Gesture::PinchOut),
            "none" => Ok(Gesture::None),
            other => Err(UnknownGesture(other.to_string())),
        }
    }
}

/// One published gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    /// Sort key: nanoseconds since the Unix epoch, unique per emitter
    pub timestamp: u64,
    pub gesture: Gesture,
    pub zoom_factor: f64,
}

impl GestureEvent {
    pub fn new(timestamp: u64, gesture: Gesture, zoom_factor: f64) -> Self {
        Self {
            timestamp,
            gesture,
            zoom_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_parse_back() {
        for gesture in [
            Gesture::Left,
            Gesture::Right,
            Gesture::Up,
            Gesture::Down,
            Gesture::PinchIn,
            Gesture::PinchOut,
            Gesture::None,
        ] {
            assert_eq!(gesture.symbol().parse::<Gesture>(), Ok(gesture));
        }
        assert!("sideways".parse::<Gesture>().is_err());
    }

    #[test]
    fn test_zoom_direction() {
        assert_eq!(Gesture::Up.zoom_direction(), Some(ZoomDirection::In));
        assert_eq!(Gesture::PinchIn.zoom_direction(), Some(ZoomDirection::Out));
        assert_eq!(Gesture::Right.zoom_direction(), None);
        assert_eq!(Gesture::None.zoom_direction(), None);
    }

    #[test]
    fn test_serde_uses_symbols() {
        let json = serde_json::to_string(&Gesture::PinchOut).unwrap();
        assert_eq!(json, "\"pinch-out\"");
    }
}
