//! Project records.
//!
//! A project is a named grouping that tasks may optionally belong to. Task
//! counts are never stored on the record; they are recomputed from the live
//! task collection by the derivation layer so they can never drift.

use serde::{Deserialize, Serialize};

use crate::fields::{AccentColor, ProjectIcon};

/// A named, coloured and iconified grouping of tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: AccentColor,
    #[serde(default)]
    pub icon: ProjectIcon,
}

/// Partial update for a project. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub color: Option<AccentColor>,
    pub icon: Option<ProjectIcon>,
}
