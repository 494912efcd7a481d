//! # Juris Common Library
//!
//! Shared code for the Juris study services including:
//! - Phase structure building, review scopes and progression evaluation
//! - Windowing of evaluated phases (journeys, scroll windows, modules)
//! - Progress attempt arithmetic and the lives/XP economy
//! - SQLite persistence (schema, corpus read model, progress store)
//! - Configuration loading
//! - Advisory TTL caches

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod phases;
pub mod progress;
pub mod time;

pub use error::{Error, Result};
