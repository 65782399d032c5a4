//! Quarterly roadmap builder.
//!
//! A roadmap is an ordered list of [`models::Quarter`]s, each holding an
//! ordered list of [`models::Feature`]s. The [`store::Roadmap`] owns the data
//! and exposes every editing command; [`persist`] reads and writes the JSON
//! document format; [`session`] tracks the file a roadmap was opened from;
//! [`render`] draws the board as text.

pub mod config;
pub mod models;
pub mod persist;
pub mod render;
pub mod session;
pub mod store;
