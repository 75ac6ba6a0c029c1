//! Settings store for the FastWQ word-query flashcard add-on
//!
//! Construct one [`SettingsStore`] at start-up and hand it to whatever needs
//! configuration. It reads `~/_fastwqcfg.json` (migrating from the legacy
//! `~/.fastwqcfg.json` on first run), exposes typed accessors with defaults,
//! and runs the `config.update` hook after every save.

pub mod config;
pub mod constants;
pub mod hooks;

pub use config::{ConfigError, ConfigPaths, Document, FixedProfile, ProfileSource, Settings, SettingsStore};
pub use hooks::Hooks;
