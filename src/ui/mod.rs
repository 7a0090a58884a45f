//! User Interface layer for mindscape
//!
//! Contains all UI-related code:
//! - Theme definitions and colors
//! - Reusable widgets
//! - Main render function (map canvas, sidebar, status line)

pub mod render;
pub mod theme;
pub mod widgets;

pub use render::render;
pub use theme::Theme;
