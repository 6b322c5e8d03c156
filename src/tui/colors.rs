//! Colour constants for the terminal user interface.

use ratatui::style::Color;

/// High-priority rows.
pub const URGENT_RED: Color = Color::Rgb(200, 40, 40);
/// Completed rows.
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 110);
/// Calendar day carrying tasks.
pub const BUSY_GOLD: Color = Color::Rgb(255, 215, 0);
/// Today's cell in the calendar grid.
pub const TODAY_GREEN: Color = Color::Rgb(0, 130, 60);
