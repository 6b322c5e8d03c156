//! Enumerations and field types for tasks and projects.
//!
//! All symbolic keys stored on records (priority, project icon, accent
//! colour) are closed enums: an unknown key read from an old store file
//! deserialises to a documented default instead of being guessed at.

use clap::ValueEnum;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Task priority. Defaults to `Medium` when unspecified.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Display label for tables and the UI.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Sort rank: high first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Symbolic project icon, resolved to a fixed glyph.
///
/// Unknown keys in stored data map to `Folder`, which therefore sits
/// last (serde requires the catch-all variant in final position).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectIcon {
    Home,
    Briefcase,
    Heart,
    Star,
    Book,
    Cart,
    Plane,
    #[default]
    #[serde(other)]
    Folder,
}

impl ProjectIcon {
    /// The single renderable glyph for this icon key.
    pub fn glyph(self) -> &'static str {
        match self {
            ProjectIcon::Folder => "▣",
            ProjectIcon::Home => "⌂",
            ProjectIcon::Briefcase => "▤",
            ProjectIcon::Heart => "♥",
            ProjectIcon::Star => "★",
            ProjectIcon::Book => "▥",
            ProjectIcon::Cart => "▦",
            ProjectIcon::Plane => "✈",
        }
    }
}

/// Project accent colour. Unknown keys map to `Blue`, kept last as the
/// serde catch-all.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AccentColor {
    Green,
    Red,
    Yellow,
    Purple,
    Cyan,
    Magenta,
    Gray,
    #[default]
    #[serde(other)]
    Blue,
}

impl AccentColor {
    /// Terminal colour used when rendering this accent.
    pub fn color(self) -> Color {
        match self {
            AccentColor::Blue => Color::Blue,
            AccentColor::Green => Color::Green,
            AccentColor::Red => Color::Red,
            AccentColor::Yellow => Color::Yellow,
            AccentColor::Purple => Color::Rgb(128, 0, 160),
            AccentColor::Cyan => Color::Cyan,
            AccentColor::Magenta => Color::Magenta,
            AccentColor::Gray => Color::Gray,
        }
    }
}

/// Sort keys for task listings.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Due,
    Priority,
    Id,
}

/// Due-date buckets for list filtering.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DueFilter {
    Today,
    Upcoming,
    Overdue,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_icon_key_falls_back_to_folder() {
        let icon: ProjectIcon = serde_json::from_str("\"rocket-ship\"").unwrap();
        assert_eq!(icon, ProjectIcon::Folder);
        // Known keys, including the fallback's own name, still parse.
        let known: ProjectIcon = serde_json::from_str("\"heart\"").unwrap();
        assert_eq!(known, ProjectIcon::Heart);
        let folder: ProjectIcon = serde_json::from_str("\"folder\"").unwrap();
        assert_eq!(folder, ProjectIcon::Folder);
    }

    #[test]
    fn unknown_colour_key_falls_back_to_blue() {
        let c: AccentColor = serde_json::from_str("\"chartreuse\"").unwrap();
        assert_eq!(c, AccentColor::Blue);
        let green: AccentColor = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(green, AccentColor::Green);
    }

    #[test]
    fn fallback_defaults_serialise_under_their_own_names() {
        assert_eq!(serde_json::to_string(&ProjectIcon::default()).unwrap(), "\"folder\"");
        assert_eq!(serde_json::to_string(&AccentColor::default()).unwrap(), "\"blue\"");
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
