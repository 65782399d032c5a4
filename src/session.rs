//! The roadmap being edited plus the file it belongs to.
//!
//! Mirrors a File menu: New, Open, Save and Save As. Open replaces the
//! roadmap only after the whole file has loaded, so a failed open leaves the
//! session exactly as it was.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::persist::{self, PersistError};
use crate::store::{Roadmap, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No file selected; use Save As")]
    NoCurrentFile,

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Default)]
pub struct Session {
    roadmap: Roadmap,
    current_file: Option<PathBuf>,
}

impl Session {
    /// A fresh session laid out from today's quarter.
    pub fn new() -> Result<Self> {
        Self::new_at(Local::now().date_naive())
    }

    pub fn new_at(today: NaiveDate) -> Result<Self> {
        Ok(Self {
            roadmap: Roadmap::starting_at(today)?,
            current_file: None,
        })
    }

    /// A session around an existing roadmap with no file yet.
    pub fn with_roadmap(roadmap: Roadmap) -> Self {
        Self {
            roadmap,
            current_file: None,
        }
    }

    /// Load a file into a new session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut session = Self::default();
        session.reopen(path)?;
        Ok(session)
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn roadmap_mut(&mut self) -> &mut Roadmap {
        &mut self.roadmap
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// File > New: start over from today's quarter and forget the file.
    pub fn reset(&mut self, today: NaiveDate) -> Result<()> {
        self.roadmap = Roadmap::starting_at(today)?;
        self.current_file = None;
        tracing::info!("New roadmap created");
        Ok(())
    }

    /// File > Open. On failure the current roadmap and file are kept.
    pub fn reopen(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let roadmap = persist::load(path)?;
        self.roadmap = roadmap;
        self.current_file = Some(path.to_path_buf());
        tracing::info!("Opened {}", path.display());
        Ok(())
    }

    /// File > Save: write to the current file.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self
            .current_file
            .clone()
            .ok_or(SessionError::NoCurrentFile)?;
        persist::save(&self.roadmap, &path)?;
        Ok(path)
    }

    /// File > Save As: write to `path` and make it the current file.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref().to_path_buf();
        persist::save(&self.roadmap, &path)?;
        self.current_file = Some(path.clone());
        tracing::info!("Saved {}", path.display());
        Ok(path)
    }
}
