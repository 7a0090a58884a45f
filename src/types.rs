//! Core data types shared across the app
//!
//! Geometry, node tiers, the color palette and the flash message type
//! used by the map engine and the UI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// A temporary UI message shown to the user (e.g. success/error notifications)
#[derive(Clone)]
pub struct FlashMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

impl FlashMessage {
    pub fn new(text: String, is_error: bool) -> Self {
        Self {
            text,
            is_error,
            created: Instant::now(),
        }
    }

    pub fn is_expired(&self, seconds: u64) -> bool {
        self.created.elapsed().as_secs() >= seconds
    }
}

/// Opaque stable node identifier, assigned once per node and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in canvas coordinate space (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The document's fixed drawing space, captured from the viewport at creation.
/// All node positions and clamp rules are expressed in these units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub const MIN_WIDTH: f64 = 480.0;
    pub const MIN_HEIGHT: f64 = 320.0;

    /// Builds a canvas, flooring tiny viewports so layout radii stay usable
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(Self::MIN_WIDTH),
            height: height.max(Self::MIN_HEIGHT),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Footprint category of a node: the root box is larger than every other node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Root,
    Concept,
}

impl Tier {
    /// Box size in canvas units (width, height)
    pub fn footprint(&self) -> (f64, f64) {
        match self {
            Tier::Root => (192.0, 80.0),
            Tier::Concept => (144.0, 64.0),
        }
    }

    /// Edge anchor offset from the node's top-left corner (the box center)
    pub fn anchor(&self) -> (f64, f64) {
        let (w, h) = self.footprint();
        (w / 2.0, h / 2.0)
    }
}

/// Categorical styling hint for a node. Not semantically load-bearing:
/// it only picks the fill color for the TUI and the PNG export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Pink,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
    Red,
    Cyan,
    Indigo,
    Lime,
    Rose,
    Emerald,
    Gray,
}

impl ColorTag {
    /// Round-robin cycle for main concepts and expansion children.
    /// Gray is reserved for generated sub-concepts and stays out of the cycle.
    pub const PALETTE: [ColorTag; 12] = [
        ColorTag::Pink,
        ColorTag::Green,
        ColorTag::Blue,
        ColorTag::Yellow,
        ColorTag::Purple,
        ColorTag::Orange,
        ColorTag::Red,
        ColorTag::Cyan,
        ColorTag::Indigo,
        ColorTag::Lime,
        ColorTag::Rose,
        ColorTag::Emerald,
    ];

    pub fn hex(&self) -> &'static str {
        match self {
            ColorTag::Pink => "#ec4899",
            ColorTag::Green => "#4ade80",
            ColorTag::Blue => "#3b82f6",
            ColorTag::Yellow => "#facc15",
            ColorTag::Purple => "#c084fc",
            ColorTag::Orange => "#fb923c",
            ColorTag::Red => "#f87171",
            ColorTag::Cyan => "#22d3ee",
            ColorTag::Indigo => "#818cf8",
            ColorTag::Lime => "#a3e635",
            ColorTag::Rose => "#fb7185",
            ColorTag::Emerald => "#34d399",
            ColorTag::Gray => "#d1d5db",
        }
    }

    /// Pale fills need dark label ink to stay readable
    pub fn dark_label(&self) -> bool {
        matches!(
            self,
            ColorTag::Yellow | ColorTag::Lime | ColorTag::Green | ColorTag::Gray
        )
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.hex().as_bytes();
        let byte = |i: usize| {
            let hi = (hex[i] as char).to_digit(16).unwrap_or(0) as u8;
            let lo = (hex[i + 1] as char).to_digit(16).unwrap_or(0) as u8;
            hi * 16 + lo
        };
        (byte(1), byte(3), byte(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_excludes_gray() {
        assert_eq!(ColorTag::PALETTE.len(), 12);
        assert!(!ColorTag::PALETTE.contains(&ColorTag::Gray));
        assert_eq!(ColorTag::PALETTE[0], ColorTag::Pink);
    }

    #[test]
    fn test_color_rgb_matches_hex() {
        assert_eq!(ColorTag::Pink.rgb(), (0xec, 0x48, 0x99));
        assert_eq!(ColorTag::Gray.rgb(), (0xd1, 0xd5, 0xdb));
    }

    #[test]
    fn test_tier_anchor_is_box_center() {
        let (w, h) = Tier::Root.footprint();
        assert_eq!(Tier::Root.anchor(), (w / 2.0, h / 2.0));
        assert_eq!(Tier::Concept.anchor(), (72.0, 32.0));
        assert_eq!(Tier::Root.anchor(), (96.0, 40.0));
    }

    #[test]
    fn test_canvas_floors_tiny_viewports() {
        let c = Canvas::new(100.0, 50.0);
        assert_eq!(c.width, Canvas::MIN_WIDTH);
        assert_eq!(c.height, Canvas::MIN_HEIGHT);
        let big = Canvas::new(1920.0, 1080.0);
        assert_eq!(big.width, 1920.0);
        assert_eq!(big.center(), Point::new(960.0, 540.0));
    }

    #[test]
    fn test_flash_message_expiry() {
        let msg = FlashMessage::new("saved".into(), false);
        assert!(!msg.is_expired(3));
        assert_eq!(msg.text, "saved");
        assert!(!msg.is_error);
    }
}
