use std::fmt;

use super::{Color, ModelError};

/// Runtime handle of a feature inside a [`crate::store::Roadmap`].
///
/// Keys are assigned when a feature enters the store and are never reused,
/// so they stay valid across moves between quarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureKey(pub(crate) u64);

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A roadmap work item.
///
/// `id` is the persisted identifier. It is unique among the features the
/// store creates, but files edited by hand may repeat ids, so the store
/// addresses features by [`FeatureKey`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub key: FeatureKey,
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub color: Color,
}

/// Editor input for creating or updating a feature.
///
/// Title and description are trimmed. A draft whose title is empty after
/// trimming is rejected by [`FeatureDraft::validate`], which every store
/// command calls before touching any data.
#[derive(Debug, Clone, Default)]
pub struct FeatureDraft {
    pub title: String,
    pub description: String,
    /// `None` keeps the current color on edit and uses the default on create.
    pub color: Option<String>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub title: String,
    pub description: String,
    pub color: Option<Color>,
}

impl FeatureDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color: None,
        }
    }

    /// Draft for editing `current`: fields left as `None` keep their current
    /// value. A missing color stays `None` so the store keeps the old one.
    pub fn editing(
        current: &Feature,
        title: Option<String>,
        description: Option<String>,
        color: Option<String>,
    ) -> Self {
        Self {
            title: title.unwrap_or_else(|| current.title.clone()),
            description: description.unwrap_or_else(|| current.description.clone()),
            color,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn validate(&self) -> Result<ValidDraft, ModelError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ModelError::EmptyTitle);
        }
        let color = self
            .color
            .as_deref()
            .map(|c| Color::parse(c.trim()))
            .transpose()?;
        Ok(ValidDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            color,
        })
    }
}
