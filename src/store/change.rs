use std::fmt;

use crate::models::{FeatureKey, Period};

use super::Template;

/// Direction of a move command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// What a store command did.
///
/// Front ends re-render after each command and show the `Display` text as
/// the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    QuarterAdded(Period),
    QuarterRemoved(Period),
    Cleared,
    FeatureAdded { key: FeatureKey, title: String },
    FeatureUpdated { key: FeatureKey, title: String },
    FeatureDeleted { title: String },
    FeatureToggled { key: FeatureKey, title: String, completed: bool },
    /// Swapped with a neighbour inside the same quarter.
    FeatureMoved { key: FeatureKey, title: String, direction: Direction },
    /// Spliced into an adjacent quarter.
    FeatureMigrated { key: FeatureKey, title: String, to: Period },
    TemplateLoaded(Template),
    /// The command was a no-op (empty list, boundary move).
    Unchanged,
}

impl Change {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuarterAdded(period) => write!(f, "Added {}", period),
            Self::QuarterRemoved(period) => write!(f, "Removed {}", period),
            Self::Cleared => write!(f, "Cleared all quarters"),
            Self::FeatureAdded { title, .. } => write!(f, "Added feature: {}", title),
            Self::FeatureUpdated { title, .. } => write!(f, "Updated feature: {}", title),
            Self::FeatureDeleted { title } => write!(f, "Deleted feature: {}", title),
            Self::FeatureToggled {
                title, completed, ..
            } => {
                let state = if *completed { "complete" } else { "incomplete" };
                write!(f, "Marked '{}' {}", title, state)
            }
            Self::FeatureMoved {
                title, direction, ..
            } => write!(f, "Moved '{}' {}", title, direction.as_str()),
            Self::FeatureMigrated { title, to, .. } => write!(f, "Moved '{}' to {}", title, to),
            Self::TemplateLoaded(template) => write!(f, "Loaded {} template", template.as_str()),
            Self::Unchanged => write!(f, "No changes"),
        }
    }
}
