//! The roadmap store.
//!
//! [`Roadmap`] exclusively owns every quarter and, through them, every
//! feature. All editing goes through its commands; each command validates
//! its input before mutating anything and returns a [`Change`] describing
//! the outcome. Commands that cannot apply (removing from an empty list,
//! moving past the first or last quarter) return [`Change::Unchanged`].

mod change;
mod templates;

pub use change::*;
pub use templates::*;

use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;

use crate::models::*;

/// Quarters laid out by [`Roadmap::starting_at`].
pub const INITIAL_QUARTERS: usize = 4;

/// Store command failures. Nothing is mutated when a command returns one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Quarter not found: {0}")]
    QuarterNotFound(String),

    #[error("Feature id '{0}' is used by {1} features; address it as Q<n>-<year>:<slot>")]
    AmbiguousId(String, usize),

    #[error("Unknown template '{0}' (expected web, mobile or api)")]
    UnknownTemplate(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// How a command names a quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterRef {
    /// First quarter in the list with this period.
    Period(Period),
    /// 1-based position in the list.
    Position(usize),
}

impl FromStr for QuarterRef {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().parse::<usize>() {
            Ok(position) => Ok(Self::Position(position)),
            Err(_) => s.parse().map(Self::Period),
        }
    }
}

/// How a command names a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureRef {
    /// The persisted feature id.
    Id(String),
    /// 1-based slot inside a quarter, written `Q2-2025:1`.
    Slot { quarter: Period, slot: usize },
}

impl FromStr for FeatureRef {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((quarter, slot)) = s.rsplit_once(':') {
            if let (Ok(quarter), Ok(slot)) = (quarter.parse::<Period>(), slot.parse::<usize>()) {
                return Ok(Self::Slot { quarter, slot });
            }
        }
        if s.is_empty() {
            return Err(ModelError::EmptyReference);
        }
        Ok(Self::Id(s.to_string()))
    }
}

/// An ordered list of quarters with their features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roadmap {
    quarters: Vec<Quarter>,
    next_key: u64,
    next_serial: u64,
}

fn current_year() -> i32 {
    Local::now().year()
}

impl Roadmap {
    /// An empty roadmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// The quarter containing `date` followed by the next three.
    pub fn starting_at(date: NaiveDate) -> Result<Self> {
        let mut roadmap = Self::new();
        let mut period = Period::containing(date)?;
        for i in 0..INITIAL_QUARTERS {
            if i > 0 {
                period = period.next()?;
            }
            roadmap.push_quarter(period);
        }
        Ok(roadmap)
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.quarters.iter().map(|q| q.features.len()).sum()
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.quarters.iter().flat_map(|q| q.features.iter())
    }

    pub fn feature(&self, key: FeatureKey) -> Option<&Feature> {
        self.features().find(|f| f.key == key)
    }

    /// `(quarter index, slot)` of a feature.
    pub fn position(&self, key: FeatureKey) -> Option<(usize, usize)> {
        self.quarters.iter().enumerate().find_map(|(qi, quarter)| {
            quarter
                .features
                .iter()
                .position(|f| f.key == key)
                .map(|slot| (qi, slot))
        })
    }

    /// Index of the quarter a reference names.
    pub fn quarter_index(&self, quarter: QuarterRef) -> Result<usize> {
        match quarter {
            QuarterRef::Position(position) if (1..=self.quarters.len()).contains(&position) => {
                Ok(position - 1)
            }
            QuarterRef::Position(position) => {
                Err(StoreError::QuarterNotFound(format!("position {}", position)))
            }
            QuarterRef::Period(period) => self
                .quarters
                .iter()
                .position(|q| q.period == period)
                .ok_or_else(|| StoreError::QuarterNotFound(period.name())),
        }
    }

    /// Key of the only feature carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Result<FeatureKey> {
        let matches: Vec<FeatureKey> = self
            .features()
            .filter(|f| f.id == id)
            .map(|f| f.key)
            .collect();
        match matches.as_slice() {
            [key] => Ok(*key),
            [] => Err(StoreError::FeatureNotFound(id.to_string())),
            _ => Err(StoreError::AmbiguousId(id.to_string(), matches.len())),
        }
    }

    pub fn resolve(&self, feature: &FeatureRef) -> Result<FeatureKey> {
        match feature {
            FeatureRef::Id(id) => self.find_by_id(id),
            FeatureRef::Slot { quarter, slot } => {
                let qi = self.quarter_index(QuarterRef::Period(*quarter))?;
                slot.checked_sub(1)
                    .and_then(|i| self.quarters[qi].features.get(i))
                    .map(|f| f.key)
                    .ok_or_else(|| StoreError::FeatureNotFound(format!("{}:{}", quarter, slot)))
            }
        }
    }

    fn locate(&self, key: FeatureKey) -> Result<(usize, usize)> {
        self.position(key)
            .ok_or_else(|| StoreError::FeatureNotFound(key.to_string()))
    }

    // ============================================================
    // Quarter commands
    // ============================================================

    /// Append the successor of the last quarter, or Q1 of the current year
    /// when the roadmap is empty.
    pub fn add_quarter(&mut self) -> Result<Change> {
        self.add_quarter_or_start(current_year())
    }

    /// Like [`Roadmap::add_quarter`] with an explicit year for the empty case.
    pub fn add_quarter_or_start(&mut self, start_year: i32) -> Result<Change> {
        let period = match self.quarters.last() {
            Some(last) => last.period.next()?,
            None => Period::new(i64::from(start_year), 1)?,
        };
        self.push_quarter(period);
        tracing::info!("Added quarter {}", period);
        Ok(Change::QuarterAdded(period))
    }

    /// Remove the last quarter together with its features.
    pub fn remove_quarter(&mut self) -> Change {
        match self.quarters.pop() {
            Some(quarter) => {
                tracing::info!(
                    "Removed quarter {} ({} features)",
                    quarter.period,
                    quarter.features.len()
                );
                Change::QuarterRemoved(quarter.period)
            }
            None => Change::Unchanged,
        }
    }

    /// Remove every quarter and feature.
    pub fn clear(&mut self) -> Change {
        self.quarters.clear();
        tracing::info!("Cleared roadmap");
        Change::Cleared
    }

    // ============================================================
    // Feature commands
    // ============================================================

    pub fn add_feature(&mut self, quarter: usize, draft: &FeatureDraft) -> Result<Change> {
        let valid = draft.validate()?;
        if quarter >= self.quarters.len() {
            return Err(StoreError::QuarterNotFound(format!("index {}", quarter)));
        }

        let id = self.next_feature_id();
        let key = self.allocate_key();
        let feature = Feature {
            key,
            id,
            title: valid.title,
            description: valid.description,
            completed: false,
            color: valid.color.unwrap_or_default(),
        };
        tracing::info!(
            "Added feature '{}' ({}) to {}",
            feature.title,
            feature.id,
            self.quarters[quarter].period
        );

        let title = feature.title.clone();
        self.quarters[quarter].features.push(feature);
        Ok(Change::FeatureAdded { key, title })
    }

    /// Replace title, description and (when given) color. Position, id and
    /// completion are kept.
    pub fn edit_feature(&mut self, key: FeatureKey, draft: &FeatureDraft) -> Result<Change> {
        let valid = draft.validate()?;
        let (qi, slot) = self.locate(key)?;
        let feature = &mut self.quarters[qi].features[slot];

        feature.title = valid.title;
        feature.description = valid.description;
        if let Some(color) = valid.color {
            feature.color = color;
        }
        tracing::debug!("Updated feature {} ({})", feature.id, key);

        Ok(Change::FeatureUpdated {
            key,
            title: feature.title.clone(),
        })
    }

    pub fn delete_feature(&mut self, key: FeatureKey) -> Result<Change> {
        let (qi, slot) = self.locate(key)?;
        let feature = self.quarters[qi].features.remove(slot);
        tracing::info!(
            "Deleted feature '{}' from {}",
            feature.title,
            self.quarters[qi].period
        );
        Ok(Change::FeatureDeleted {
            title: feature.title,
        })
    }

    pub fn toggle_completed(&mut self, key: FeatureKey) -> Result<Change> {
        let (qi, slot) = self.locate(key)?;
        let feature = &mut self.quarters[qi].features[slot];
        feature.completed = !feature.completed;
        Ok(Change::FeatureToggled {
            key,
            title: feature.title.clone(),
            completed: feature.completed,
        })
    }

    /// Swap with the previous feature, or move the first feature to the end
    /// of the previous quarter.
    pub fn move_feature_up(&mut self, key: FeatureKey) -> Result<Change> {
        let (qi, slot) = self.locate(key)?;

        if slot > 0 {
            let features = &mut self.quarters[qi].features;
            features.swap(slot, slot - 1);
            return Ok(Change::FeatureMoved {
                key,
                title: features[slot - 1].title.clone(),
                direction: Direction::Up,
            });
        }
        if qi == 0 {
            return Ok(Change::Unchanged);
        }

        let feature = self.quarters[qi].features.remove(slot);
        let target = &mut self.quarters[qi - 1];
        tracing::info!("Moved '{}' to {}", feature.title, target.period);
        let change = Change::FeatureMigrated {
            key,
            title: feature.title.clone(),
            to: target.period,
        };
        target.features.push(feature);
        Ok(change)
    }

    /// Swap with the next feature, or move the last feature to the start of
    /// the next quarter.
    pub fn move_feature_down(&mut self, key: FeatureKey) -> Result<Change> {
        let (qi, slot) = self.locate(key)?;

        if slot + 1 < self.quarters[qi].features.len() {
            let features = &mut self.quarters[qi].features;
            features.swap(slot, slot + 1);
            return Ok(Change::FeatureMoved {
                key,
                title: features[slot + 1].title.clone(),
                direction: Direction::Down,
            });
        }
        if qi + 1 >= self.quarters.len() {
            return Ok(Change::Unchanged);
        }

        let feature = self.quarters[qi].features.remove(slot);
        let target = &mut self.quarters[qi + 1];
        tracing::info!("Moved '{}' to {}", feature.title, target.period);
        let change = Change::FeatureMigrated {
            key,
            title: feature.title.clone(),
            to: target.period,
        };
        target.features.insert(0, feature);
        Ok(change)
    }

    pub fn move_feature(&mut self, key: FeatureKey, direction: Direction) -> Result<Change> {
        match direction {
            Direction::Up => self.move_feature_up(key),
            Direction::Down => self.move_feature_down(key),
        }
    }

    // ============================================================
    // Templates
    // ============================================================

    /// Replace the roadmap with a template starting at Q1 of the current year.
    pub fn load_template(&mut self, template: Template) -> Result<Change> {
        self.load_template_in_year(template, current_year())
    }

    pub fn load_template_in_year(&mut self, template: Template, year: i32) -> Result<Change> {
        // Build the periods first so a bad year leaves the roadmap untouched.
        let mut periods = Vec::with_capacity(template.quarter_count());
        let mut period = Period::new(i64::from(year), 1)?;
        for i in 0..template.quarter_count() {
            if i > 0 {
                period = period.next()?;
            }
            periods.push(period);
        }

        let palette = PALETTE
            .iter()
            .map(|c| Color::parse(c))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.quarters.clear();
        let chunks = template.titles().chunks(FEATURES_PER_QUARTER);
        for (i, (period, titles)) in periods.into_iter().zip(chunks).enumerate() {
            let qi = self.push_quarter(period);
            let color = &palette[i % palette.len()];
            for (j, title) in titles.iter().enumerate() {
                let key = self.allocate_key();
                self.quarters[qi].features.push(Feature {
                    key,
                    id: format!("feature_{}_{}_{}", template.as_str(), i, j),
                    title: title.to_string(),
                    description: format!("Implementation of {}", title),
                    completed: false,
                    color: color.clone(),
                });
            }
        }

        tracing::info!(
            "Loaded {} template: {} quarters, {} features",
            template,
            self.quarters.len(),
            self.feature_count()
        );
        Ok(Change::TemplateLoaded(template))
    }

    // ============================================================
    // Construction helpers
    // ============================================================

    pub(crate) fn push_quarter(&mut self, period: Period) -> usize {
        self.quarters.push(Quarter::new(period));
        self.quarters.len() - 1
    }

    /// Append an already validated feature to a quarter, giving it a fresh
    /// key. Generated-style ids (`feature_<n>`) advance the id counter so new
    /// features never collide with them.
    pub(crate) fn adopt_feature(&mut self, quarter: usize, mut feature: Feature) -> FeatureKey {
        if let Some(serial) = parse_serial(&feature.id) {
            self.next_serial = self.next_serial.max(serial.saturating_add(1));
        }
        feature.key = self.allocate_key();
        let key = feature.key;
        self.quarters[quarter].features.push(feature);
        key
    }

    /// Serial the next generated `feature_<n>` id will start from.
    pub(crate) fn next_serial(&self) -> u64 {
        self.next_serial
    }

    /// Raise the id counter to at least `serial`. Never lowers it.
    pub(crate) fn reserve_serial(&mut self, serial: u64) {
        self.next_serial = self.next_serial.max(serial);
    }

    fn allocate_key(&mut self) -> FeatureKey {
        let key = FeatureKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn next_feature_id(&mut self) -> String {
        loop {
            let id = format!("feature_{}", self.next_serial);
            self.next_serial += 1;
            if !self.features().any(|f| f.id == id) {
                return id;
            }
        }
    }
}

fn parse_serial(id: &str) -> Option<u64> {
    id.strip_prefix("feature_")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serial() {
        assert_eq!(parse_serial("feature_12"), Some(12));
        assert_eq!(parse_serial("feature_web_0_1"), None);
        assert_eq!(parse_serial("custom"), None);
    }

    #[test]
    fn test_quarter_ref_parse() {
        assert_eq!("2".parse::<QuarterRef>().unwrap(), QuarterRef::Position(2));
        assert_eq!(
            "Q3-2025".parse::<QuarterRef>().unwrap(),
            QuarterRef::Period(Period::new(2025, 3).unwrap())
        );
    }

    #[test]
    fn test_feature_ref_parse() {
        assert_eq!(
            "Q1-2026:2".parse::<FeatureRef>().unwrap(),
            FeatureRef::Slot {
                quarter: Period::new(2026, 1).unwrap(),
                slot: 2
            }
        );
        assert_eq!(
            "feature_3".parse::<FeatureRef>().unwrap(),
            FeatureRef::Id("feature_3".to_string())
        );
        assert_eq!(
            "ns:item".parse::<FeatureRef>().unwrap(),
            FeatureRef::Id("ns:item".to_string())
        );
    }

    #[test]
    fn test_adopted_ids_advance_counter() {
        let mut roadmap = Roadmap::new();
        let qi = roadmap.push_quarter(Period::new(2025, 1).unwrap());
        roadmap.adopt_feature(
            qi,
            Feature {
                key: FeatureKey(0),
                id: "feature_7".to_string(),
                title: "Loaded".to_string(),
                description: String::new(),
                completed: false,
                color: Color::default(),
            },
        );

        roadmap
            .add_feature(qi, &FeatureDraft::new("Fresh", ""))
            .unwrap();
        assert_eq!(roadmap.quarters()[0].features[1].id, "feature_8");
    }

    #[test]
    fn test_reserve_serial_only_raises() {
        let mut roadmap = Roadmap::new();
        roadmap.reserve_serial(5);
        roadmap.reserve_serial(2);
        assert_eq!(roadmap.next_serial(), 5);

        let qi = roadmap.push_quarter(Period::new(2025, 1).unwrap());
        roadmap
            .add_feature(qi, &FeatureDraft::new("Fresh", ""))
            .unwrap();
        assert_eq!(roadmap.quarters()[0].features[0].id, "feature_5");
        assert_eq!(roadmap.next_serial(), 6);
    }
}
