//! Domain models for roadmaps.
//!
//! # Core Concepts
//!
//! - [`Quarter`]: a three-month period identified by a [`Period`] (year and
//!   quarter number 1-4), holding an ordered list of features.
//! - [`Feature`]: a titled, described, colorable, completable work item. A
//!   feature belongs to exactly one quarter at a time.
//! - [`FeatureKey`]: the runtime handle of a feature inside a store. Keys are
//!   handed out in increasing order and never reused; they are not persisted.
//! - [`FeatureDraft`]: unvalidated editor input. Drafts are the only way new
//!   titles, descriptions and colors enter the store.

mod color;
mod feature;
mod quarter;

pub use color::*;
pub use feature::*;
pub use quarter::*;

use thiserror::Error;

/// Validation failures for model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Feature title must not be empty")]
    EmptyTitle,

    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("Quarter number {0} is out of range (expected 1-4)")]
    InvalidQuarter(i64),

    #[error("Year {0} is out of range (expected {min}-{max})", min = MIN_YEAR, max = MAX_YEAR)]
    InvalidYear(i64),

    #[error("Feature reference must not be empty")]
    EmptyReference,

    #[error("Invalid quarter '{0}': expected Q<n>-<year>")]
    InvalidPeriod(String),
}
