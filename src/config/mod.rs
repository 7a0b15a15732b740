//! Configuration module for Tally
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution for the data slots
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::TallyPaths;
pub use settings::Settings;
