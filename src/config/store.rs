//! Settings store backed by `_fastwqcfg.json`
//!
//! Holds the raw document in memory next to its validated [`Settings`] view.
//! The document is read once, from the current file or else the legacy
//! dotfile, and the current file is created right away if it was missing
//! (unless reading failed, in which case nothing is written).
//! Every update rewrites the whole document and then runs the
//! `config.update` hook.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::profile::last_model_key;
use crate::config::{ConfigError, ConfigPaths, FieldMap, ProfileSource, Settings};
use crate::constants::config::{INDENT, VERSION};
use crate::constants::hooks::CONFIG_UPDATE;
use crate::constants::keys;
use crate::hooks::Hooks;

pub type Document = Map<String, Value>;

#[derive(Debug)]
pub struct SettingsStore<P: ProfileSource> {
    paths: ConfigPaths,
    profile: P,
    document: Document,
    /// Set by the first successful load, later loads are no-ops
    loaded: bool,
    settings: Settings,
    hooks: Hooks,
}

impl<P: ProfileSource> SettingsStore<P> {
    /// Open the store under the user's home directory (or `$FASTWQ_HOME`)
    pub fn open(profile: P) -> Result<Self, ConfigError> {
        let paths = ConfigPaths::detect()?;
        Self::with_paths(paths, profile)
    }

    /// Open the store under an explicit directory
    pub fn open_in(dir: impl AsRef<Path>, profile: P) -> Result<Self, ConfigError> {
        Self::with_paths(ConfigPaths::in_dir(dir.as_ref()), profile)
    }

    pub fn with_paths(paths: ConfigPaths, profile: P) -> Result<Self, ConfigError> {
        info!(home = %paths.home.display(), "User home dir");
        info!(path = %paths.current.display(), "Config path");
        info!(path = %paths.legacy.display(), "Config path (legacy)");

        let mut store = Self {
            paths,
            profile,
            document: Document::new(),
            loaded: false,
            settings: Settings::default(),
            hooks: Hooks::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Read the document from disk unless it is already in memory.
    ///
    /// Read failures fall back to an empty document and skip creating the
    /// current file, so the next start reads the original again. Malformed
    /// JSON and ill-typed values propagate, as does a failure to write the
    /// current file when it has to be created.
    pub fn load(&mut self) -> Result<&Document, ConfigError> {
        if self.loaded {
            return Ok(&self.document);
        }

        let document = match self.paths.existing() {
            Some(path) => match read_document(path) {
                Ok(document) => document,
                Err(ConfigError::Io { path, source }) => {
                    warn!(path = %path.display(), error = %source, "Can not read config file, starting from defaults");
                    self.document = Document::new();
                    self.settings = Settings::default();
                    self.loaded = true;
                    return Ok(&self.document);
                }
                Err(e) => return Err(e),
            },
            None => {
                debug!("No config file found, starting from defaults");
                Document::new()
            }
        };

        self.settings = Settings::from_document(&document)?;
        self.document = document;
        self.loaded = true;

        if !self.paths.current.exists() {
            info!(path = %self.paths.current.display(), "Writing current config file");
            let snapshot = self.document.clone();
            self.update(snapshot)?;
        }

        debug!(document = ?self.document, "Config file was read");
        Ok(&self.document)
    }

    /// Merge `data` into the document and persist it.
    ///
    /// `version` and the active profile's last-model key are injected first;
    /// the latter takes `data["last_model"]` when present, else the stored
    /// value. The merged document must validate, otherwise nothing changes.
    pub fn update(&mut self, mut data: Document) -> Result<(), ConfigError> {
        data.insert(keys::VERSION.to_string(), Value::from(VERSION));
        let last_model = data
            .get(keys::LAST_MODEL)
            .cloned()
            .unwrap_or_else(|| Value::from(self.last_model_id()));
        data.insert(self.last_key(), last_model);

        let mut merged = self.document.clone();
        merged.extend(data);
        let settings = Settings::from_document(&merged)?;

        debug!(path = %self.paths.current.display(), "Update file");
        debug!(document = ?merged, "Update data");
        write_document(&self.paths.current, &merged)?;

        self.document = merged;
        self.settings = settings;
        self.hooks.run(CONFIG_UPDATE);
        Ok(())
    }

    /// Set a single key and persist
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), ConfigError> {
        let mut data = Document::new();
        data.insert(key.into(), value.into());
        self.update(data)
    }

    /// Register a listener for successful saves
    pub fn on_update<F>(&mut self, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.hooks.add(CONFIG_UPDATE, callback);
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn profile_name(&self) -> String {
        self.profile.profile_name()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Raw document, including keys this crate does not interpret
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn last_key(&self) -> String {
        last_model_key(&self.profile.profile_name())
    }

    pub fn fields_for_model(&self, model_id: i64) -> &[FieldMap] {
        self.settings.fields_for_model(model_id)
    }

    /// Last card model used by the active profile
    pub fn last_model_id(&self) -> i64 {
        self.settings.last_model_id(&self.profile.profile_name())
    }

    pub fn version(&self) -> Option<&str> {
        self.settings.version.as_deref()
    }

    pub fn dirs(&self) -> &[String] {
        &self.settings.dirs
    }

    pub fn dicts(&self) -> &Map<String, Value> {
        &self.settings.dicts
    }

    pub fn use_filename(&self) -> bool {
        self.settings.use_filename
    }

    pub fn export_media(&self) -> bool {
        self.settings.export_media
    }

    pub fn force_update(&self) -> bool {
        self.settings.force_update
    }

    pub fn ignore_mdx_wordcase(&self) -> bool {
        self.settings.ignore_mdx_wordcase
    }

    /// Query thread number
    pub fn thread_number(&self) -> u32 {
        self.settings.thread_number
    }

    pub fn last_folder(&self) -> &str {
        &self.settings.last_folder
    }

    pub fn ignore_accents(&self) -> bool {
        self.settings.ignore_accents
    }

    pub fn cloze_str(&self) -> &str {
        self.settings.cloze_str()
    }

    pub fn sound_str(&self) -> &str {
        self.settings.sound_str()
    }
}

fn read_document(path: &Path) -> Result<Document, ConfigError> {
    debug!(path = %path.display(), "Reading file");
    let bytes = fs::read(path).map_err(|e| ConfigError::io(path, e))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(document) => Ok(document),
        _ => Err(ConfigError::NotAnObject { path: path.to_path_buf() }),
    }
}

/// Sorted keys (the map is ordered), four-space indent, literal UTF-8
fn encode_document(document: &Document) -> Result<Vec<u8>, ConfigError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer).map_err(ConfigError::Encode)?;
    Ok(buf)
}

fn write_document(path: &Path, document: &Document) -> Result<(), ConfigError> {
    let contents = encode_document(document)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }
    atomic_write(path, &contents).map_err(|e| ConfigError::io(path, e))
}

/// Write through a sibling temp file so readers never see a half-written file
fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let result = write_and_rename(&tmp_path, path, contents);
    if result.is_err() {
        // Nothing to clean up when the temp file was never created
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_rename(tmp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    {
        let mut tmp_file = fs::File::create(tmp_path)?;
        tmp_file.write_all(contents)?;
        tmp_file.sync_all()?;
    }
    fs::rename(tmp_path, path)
}
