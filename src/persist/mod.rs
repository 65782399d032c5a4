//! JSON document format.
//!
//! ```json
//! {
//!   "quarters": [
//!     {
//!       "year": 2025,
//!       "quarter": 1,
//!       "features": [
//!         {
//!           "id": "feature_0",
//!           "title": "Backend Setup",
//!           "description": "Implementation of Backend Setup",
//!           "completed": false,
//!           "color": "#2196F3"
//!         }
//!       ]
//!     }
//!   ],
//!   "next_id": 1,
//!   "created": "2025-01-06T09:30:00.000000+01:00",
//!   "version": "2.0"
//! }
//! ```
//!
//! `created` and `version` are written on every save and ignored on load.
//! `next_id` records the id counter so an id freed by a deletion is not
//! handed out again after a reload. It is optional; without it the counter
//! resumes after the highest `feature_<n>` id in the file.
//! Loading builds a complete new [`Roadmap`] and only returns it once every
//! record has validated, so a bad file never leaves a half-filled roadmap.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::*;
use crate::store::Roadmap;

/// Value written to the `version` field.
pub const FORMAT_VERSION: &str = "2.0";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Malformed roadmap document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Quarter {quarter}: {source}")]
    InvalidQuarter { quarter: usize, source: ModelError },

    #[error("Quarter {quarter}, feature {feature}: {source}")]
    InvalidFeature {
        quarter: usize,
        feature: usize,
        source: ModelError,
    },
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Top-level persisted object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapDocument {
    #[serde(default)]
    pub quarters: Vec<QuarterRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
    #[serde(default, skip_deserializing)]
    pub created: Option<DateTime<Local>>,
    #[serde(default, skip_deserializing)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterRecord {
    pub year: i64,
    pub quarter: i64,
    #[serde(default)]
    pub features: Vec<FeatureRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl RoadmapDocument {
    /// Snapshot a roadmap, stamping the current time and format version.
    pub fn from_roadmap(roadmap: &Roadmap) -> Self {
        let quarters = roadmap
            .quarters()
            .iter()
            .map(|quarter| QuarterRecord {
                year: i64::from(quarter.year()),
                quarter: i64::from(quarter.quarter()),
                features: quarter
                    .features
                    .iter()
                    .map(|feature| FeatureRecord {
                        id: feature.id.clone(),
                        title: feature.title.clone(),
                        description: feature.description.clone(),
                        completed: feature.completed,
                        color: feature.color.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            quarters,
            next_id: Some(roadmap.next_serial()),
            created: Some(Local::now()),
            version: Some(FORMAT_VERSION.to_string()),
        }
    }

    /// Validate every record into a fresh roadmap.
    pub fn into_roadmap(self) -> Result<Roadmap> {
        let mut roadmap = Roadmap::new();

        for (qi, record) in self.quarters.into_iter().enumerate() {
            let period = Period::new(record.year, record.quarter)
                .map_err(|source| PersistError::InvalidQuarter { quarter: qi, source })?;
            let index = roadmap.push_quarter(period);

            for (fi, feature) in record.features.into_iter().enumerate() {
                let invalid = |source| PersistError::InvalidFeature {
                    quarter: qi,
                    feature: fi,
                    source,
                };
                if feature.title.trim().is_empty() {
                    return Err(invalid(ModelError::EmptyTitle));
                }
                let color = Color::parse(&feature.color).map_err(invalid)?;

                roadmap.adopt_feature(
                    index,
                    Feature {
                        key: FeatureKey(0),
                        id: feature.id,
                        title: feature.title,
                        description: feature.description,
                        completed: feature.completed,
                        color,
                    },
                );
            }
        }
        if let Some(next_id) = self.next_id {
            roadmap.reserve_serial(next_id);
        }

        Ok(roadmap)
    }
}

/// Pretty-printed JSON with two-space indentation.
pub fn to_json(roadmap: &Roadmap) -> Result<String> {
    Ok(serde_json::to_string_pretty(&RoadmapDocument::from_roadmap(
        roadmap,
    ))?)
}

pub fn from_json(content: &str) -> Result<Roadmap> {
    let document: RoadmapDocument = serde_json::from_str(content)?;
    document.into_roadmap()
}

pub fn load(path: &Path) -> Result<Roadmap> {
    let content = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let roadmap = from_json(&content)?;
    tracing::debug!(
        "Loaded {} quarters, {} features from {}",
        roadmap.quarters().len(),
        roadmap.feature_count(),
        path.display()
    );
    Ok(roadmap)
}

pub fn save(roadmap: &Roadmap, path: &Path) -> Result<()> {
    let content = to_json(roadmap)?;
    let write_err = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)?;

    tracing::debug!("Saved roadmap to {}", path.display());
    Ok(())
}
