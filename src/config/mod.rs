//! Configuration management for FastWQ
//!
//! - **store**: SettingsStore, the JSON file plus its in-memory document
//! - **settings**: typed, validated view with defaults
//! - **paths**: current and legacy file locations
//! - **profile**: active profile lookup for per-profile keys

mod error;
pub mod paths;
pub mod profile;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use error::ConfigError;
pub use paths::ConfigPaths;
pub use profile::{FixedProfile, ProfileSource};
pub use settings::{FieldMap, Settings};
pub use store::{Document, SettingsStore};
