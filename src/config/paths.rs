//! Location of the settings file
//!
//! Two candidates live side by side in the home directory: the current
//! `_fastwqcfg.json` and the legacy `.fastwqcfg.json` dotfile.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::constants::config::{CURRENT_PREFIX, FILENAME, HOME_ENV, LEGACY_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub home: PathBuf,
    /// Current-format file, the only one ever written
    pub current: PathBuf,
    /// Legacy dotfile, read when `current` does not exist yet
    pub legacy: PathBuf,
}

impl ConfigPaths {
    /// Resolve paths under `$FASTWQ_HOME`, falling back to the user's home
    pub fn detect() -> Result<Self, ConfigError> {
        if let Ok(home) = std::env::var(HOME_ENV)
            && !home.is_empty()
        {
            return Ok(Self::in_dir(home));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::in_dir(home))
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let home = dir.into();
        let current = home.join(format!("{CURRENT_PREFIX}{FILENAME}"));
        let legacy = home.join(format!("{LEGACY_PREFIX}{FILENAME}"));
        Self { home, current, legacy }
    }

    /// File to read from: current if present, else legacy if present
    pub fn existing(&self) -> Option<&Path> {
        if self.current.exists() {
            Some(&self.current)
        } else if self.legacy.exists() {
            Some(&self.legacy)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct EnvVarGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn new(key: &str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            unsafe { std::env::set_var(key, value) };
            EnvVarGuard { key: key.to_owned(), original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(val) => unsafe { std::env::set_var(&self.key, val) },
                None => unsafe { std::env::remove_var(&self.key) },
            }
        }
    }

    #[test]
    fn test_in_dir_file_names() {
        let paths = ConfigPaths::in_dir("/home/alice");
        assert_eq!(paths.current, PathBuf::from("/home/alice/_fastwqcfg.json"));
        assert_eq!(paths.legacy, PathBuf::from("/home/alice/.fastwqcfg.json"));
    }

    #[test]
    fn test_home_env_override() {
        let tmp = tempdir().unwrap();
        let _env = EnvVarGuard::new(HOME_ENV, tmp.path().to_str().unwrap());

        let paths = ConfigPaths::detect().unwrap();
        assert_eq!(paths.home, tmp.path());
        assert_eq!(paths.current, tmp.path().join("_fastwqcfg.json"));
    }

    #[test]
    fn test_existing_prefers_current() {
        let tmp = tempdir().unwrap();
        let paths = ConfigPaths::in_dir(tmp.path());
        assert_eq!(paths.existing(), None);

        std::fs::write(&paths.legacy, "{}").unwrap();
        assert_eq!(paths.existing(), Some(paths.legacy.as_path()));

        std::fs::write(&paths.current, "{}").unwrap();
        assert_eq!(paths.existing(), Some(paths.current.as_path()));
    }
}
