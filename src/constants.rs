//! Application-wide constants
//!
//! File names, config keys and default values in one place so the store,
//! the typed record and the CLI agree on them.

/// Config file location
pub mod config {
    /// Base file name, prefixed differently for current and legacy locations
    pub const FILENAME: &str = "fastwqcfg.json";

    /// Prefix of the current-format file (`_fastwqcfg.json`)
    pub const CURRENT_PREFIX: &str = "_";

    /// Prefix of the legacy dotfile (`.fastwqcfg.json`), read-only fallback
    pub const LEGACY_PREFIX: &str = ".";

    /// Environment variable overriding the home directory
    pub const HOME_ENV: &str = "FASTWQ_HOME";

    /// Version stamped into every saved document
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Indentation used when writing the document
    pub const INDENT: &[u8] = b"    ";
}

/// Recognized document keys
pub mod keys {
    pub const VERSION: &str = "version";
    pub const LAST_MODEL: &str = "last_model";

    /// Suffix of the per-profile last-model key (`<profile>_last`)
    pub const LAST_SUFFIX: &str = "_last";

    pub const DIRS: &str = "dirs";
    pub const DICTS: &str = "dicts";
    pub const USE_FILENAME: &str = "use_filename";
    pub const EXPORT_MEDIA: &str = "export_media";
    pub const FORCE_UPDATE: &str = "force_update";
    pub const IGNORE_MDX_WORDCASE: &str = "ignore_mdx_wordcase";
    pub const THREAD_NUMBER: &str = "thread_number";
    pub const LAST_FOLDER: &str = "last_folder";
    pub const IGNORE_ACCENTS: &str = "ignore_accents";
    pub const CLOZE_STR: &str = "cloze_str";
    pub const SOUND_STR: &str = "sound_str";
}

/// Fallback values for absent keys
pub mod defaults {
    pub const USE_FILENAME: bool = true;
    pub const THREAD_NUMBER: u32 = 16;

    /// Cloze template, must contain exactly one [`CLOZE_PLACEHOLDER`]
    pub const CLOZE_STR: &str = "{{c1::%s}}";
    pub const CLOZE_PLACEHOLDER: &str = "%s";

    /// Sound template, must contain exactly one [`SOUND_PLACEHOLDER`]
    pub const SOUND_STR: &str = "[sound:{0}]";
    pub const SOUND_PLACEHOLDER: &str = "{0}";

    /// Profile name used by the CLI when none is given
    pub const PROFILE: &str = "User 1";
}

/// Hook names run by the store
pub mod hooks {
    /// Run after every successful save
    pub const CONFIG_UPDATE: &str = "config.update";
}
