//! Typed view over the settings document
//!
//! The on-disk document is a loose JSON object. [`Settings`] is built from it
//! in one validating pass so ill-typed values are reported when the file is
//! loaded (or an update is attempted), not when some accessor happens to read
//! them later. Absent keys take their documented default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::constants::defaults;
use crate::constants::keys::{self, LAST_SUFFIX};

/// Dictionary source → note field mapping record, opaque to this crate
pub type FieldMap = Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Version that last wrote the file, if any
    pub version: Option<String>,
    /// Extra dictionary directories to scan
    pub dirs: Vec<String>,
    /// Configured dictionary definitions, keyed by dictionary name
    pub dicts: Map<String, Value>,
    /// Use the media file name as the query word
    pub use_filename: bool,
    pub export_media: bool,
    /// Overwrite fields that already have content
    pub force_update: bool,
    pub ignore_mdx_wordcase: bool,
    /// Worker threads for batch queries
    pub thread_number: u32,
    /// Last folder opened in a file dialog
    pub last_folder: String,
    /// Strip accents from the query field before looking it up
    pub ignore_accents: bool,
    cloze_str: String,
    sound_str: String,
    /// Profile name → last card model id
    last_models: BTreeMap<String, i64>,
    /// Stringified model id → ordered field maps
    field_maps: BTreeMap<String, Vec<FieldMap>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: None,
            dirs: Vec::new(),
            dicts: Map::new(),
            use_filename: defaults::USE_FILENAME,
            export_media: false,
            force_update: false,
            ignore_mdx_wordcase: false,
            thread_number: defaults::THREAD_NUMBER,
            last_folder: String::new(),
            ignore_accents: false,
            cloze_str: defaults::CLOZE_STR.to_string(),
            sound_str: defaults::SOUND_STR.to_string(),
            last_models: BTreeMap::new(),
            field_maps: BTreeMap::new(),
        }
    }
}

/// Deserialize `key` from the document, or fall back to `default` when absent
fn field<T, F>(doc: &Map<String, Value>, key: &str, default: F) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match doc.get(key) {
        None => Ok(default()),
        Some(value) => <T as serde::Deserialize>::deserialize(value).map_err(|source| ConfigError::Invalid {
            key: key.to_string(),
            source,
        }),
    }
}

/// Model ids are written as plain (possibly negative) decimal integers
fn is_model_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A template is usable when it contains the placeholder exactly once
fn template_or_default(template: String, placeholder: &str, default: &str, key: &str) -> String {
    if template.matches(placeholder).count() == 1 {
        template
    } else {
        warn!(key = key, template = %template, placeholder = placeholder, "Template must contain the placeholder exactly once, using default");
        default.to_string()
    }
}

impl Settings {
    /// Validate a raw document into typed settings
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, ConfigError> {
        // Older releases did not always write the version as a string
        let version = doc.get(keys::VERSION).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        let cloze_str = field(doc, keys::CLOZE_STR, || defaults::CLOZE_STR.to_string())?;
        let sound_str = field(doc, keys::SOUND_STR, || defaults::SOUND_STR.to_string())?;

        let mut last_models = BTreeMap::new();
        let mut field_maps = BTreeMap::new();
        for (key, value) in doc {
            if is_model_key(key) {
                let maps: Vec<FieldMap> = field(doc, key, Vec::new)?;
                field_maps.insert(key.clone(), maps);
            } else if let Some(profile) = key.strip_suffix(LAST_SUFFIX) {
                // Other profiles' keys may hold anything an older release wrote
                match value.as_i64() {
                    Some(id) => {
                        last_models.insert(profile.to_string(), id);
                    }
                    None => warn!(key = %key, value = %value, "Ignoring non-integer last model id"),
                }
            }
        }

        let settings = Self {
            version,
            dirs: field(doc, keys::DIRS, Vec::new)?,
            dicts: field(doc, keys::DICTS, Map::new)?,
            use_filename: field(doc, keys::USE_FILENAME, || defaults::USE_FILENAME)?,
            export_media: field(doc, keys::EXPORT_MEDIA, || false)?,
            force_update: field(doc, keys::FORCE_UPDATE, || false)?,
            ignore_mdx_wordcase: field(doc, keys::IGNORE_MDX_WORDCASE, || false)?,
            thread_number: field(doc, keys::THREAD_NUMBER, || defaults::THREAD_NUMBER)?,
            last_folder: field(doc, keys::LAST_FOLDER, String::new)?,
            ignore_accents: field(doc, keys::IGNORE_ACCENTS, || false)?,
            cloze_str: template_or_default(cloze_str, defaults::CLOZE_PLACEHOLDER, defaults::CLOZE_STR, keys::CLOZE_STR),
            sound_str: template_or_default(sound_str, defaults::SOUND_PLACEHOLDER, defaults::SOUND_STR, keys::SOUND_STR),
            last_models,
            field_maps,
        };
        debug!(models = settings.field_maps.len(), profiles = settings.last_models.len(), "Validated settings document");
        Ok(settings)
    }

    /// Field maps configured for a card model (empty when none)
    pub fn fields_for_model(&self, model_id: i64) -> &[FieldMap] {
        self.field_maps
            .get(&model_id.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Last card model used by `profile`, 0 if never recorded
    pub fn last_model_id(&self, profile: &str) -> i64 {
        self.last_models.get(profile).copied().unwrap_or(0)
    }

    /// Cloze formatter, e.g. `{{c1::%s}}`
    pub fn cloze_str(&self) -> &str {
        &self.cloze_str
    }

    /// Sound formatter
    // Wrapping it sizes the play button:
    // <span style="width:24px;height:24px;">[sound:{0}]</span>
    pub fn sound_str(&self) -> &str {
        &self.sound_str
    }

    /// Wrap `text` in the cloze template
    pub fn format_cloze(&self, text: &str) -> String {
        self.cloze_str.replacen(defaults::CLOZE_PLACEHOLDER, text, 1)
    }

    /// Wrap a media file name in the sound template
    pub fn format_sound(&self, file_name: &str) -> String {
        self.sound_str.replacen(defaults::SOUND_PLACEHOLDER, file_name, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_defaults_on_empty_document() {
        let settings = Settings::from_document(&Map::new()).unwrap();

        assert_eq!(settings.version, None);
        assert!(settings.dirs.is_empty());
        assert!(settings.dicts.is_empty());
        assert!(settings.use_filename);
        assert!(!settings.export_media);
        assert!(!settings.force_update);
        assert!(!settings.ignore_mdx_wordcase);
        assert_eq!(settings.thread_number, 16);
        assert_eq!(settings.last_folder, "");
        assert!(!settings.ignore_accents);
        assert_eq!(settings.cloze_str(), "{{c1::%s}}");
        assert_eq!(settings.sound_str(), "[sound:{0}]");
        assert_eq!(settings.last_model_id("User 1"), 0);
        assert!(settings.fields_for_model(1342697561419).is_empty());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_dirs_and_thread_number() {
        let settings = Settings::from_document(&doc(json!({
            "dirs": ["/a", "/b"],
            "thread_number": 4
        })))
        .unwrap();

        assert_eq!(settings.dirs, vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(settings.thread_number, 4);
        assert!(settings.use_filename);
    }

    #[test]
    fn test_cloze_without_placeholder_resets() {
        let settings = Settings::from_document(&doc(json!({ "cloze_str": "{{c1::}}" }))).unwrap();
        assert_eq!(settings.cloze_str(), "{{c1::%s}}");

        let settings = Settings::from_document(&doc(json!({ "cloze_str": "%s and %s" }))).unwrap();
        assert_eq!(settings.cloze_str(), "{{c1::%s}}");
    }

    #[test]
    fn test_sound_without_placeholder_resets() {
        let settings = Settings::from_document(&doc(json!({ "sound_str": "[sound:]" }))).unwrap();
        assert_eq!(settings.sound_str(), "[sound:{0}]");
    }

    #[test]
    fn test_custom_templates_kept() {
        let settings = Settings::from_document(&doc(json!({
            "cloze_str": "{{c2::%s}}",
            "sound_str": "<span style=\"width:24px;height:24px;\">[sound:{0}]</span>"
        })))
        .unwrap();

        assert_eq!(settings.format_cloze("word"), "{{c2::word}}");
        assert_eq!(
            settings.format_sound("a.mp3"),
            "<span style=\"width:24px;height:24px;\">[sound:a.mp3]</span>"
        );
    }

    #[test]
    fn test_model_and_profile_keys() {
        let settings = Settings::from_document(&doc(json!({
            "1342697561419": [{ "dict": "Youdao", "field": "Front" }, { "dict": "", "field": "Back" }],
            "User 1_last": 1342697561419i64,
            "Work_last": 7
        })))
        .unwrap();

        let maps = settings.fields_for_model(1342697561419);
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0]["dict"], "Youdao");
        assert_eq!(settings.last_model_id("User 1"), 1342697561419);
        assert_eq!(settings.last_model_id("Work"), 7);
        assert_eq!(settings.last_model_id("Guest"), 0);
    }

    #[test]
    fn test_non_integer_last_model_ignored() {
        let settings = Settings::from_document(&doc(json!({
            "Guest_last": null,
            "Work_last": "1342697561419",
            "User 1_last": 7
        })))
        .unwrap();

        assert_eq!(settings.last_model_id("Guest"), 0);
        assert_eq!(settings.last_model_id("Work"), 0);
        assert_eq!(settings.last_model_id("User 1"), 7);
    }

    #[test]
    fn test_last_folder_is_not_a_profile_key() {
        let settings = Settings::from_document(&doc(json!({ "last_folder": "/tmp/mdx" }))).unwrap();
        assert_eq!(settings.last_folder, "/tmp/mdx");
        assert_eq!(settings.last_model_id("last_folder"), 0);
    }

    #[test]
    fn test_ill_typed_value_rejected() {
        let err = Settings::from_document(&doc(json!({ "thread_number": "many" }))).unwrap_err();
        match err {
            ConfigError::Invalid { key, .. } => assert_eq!(key, "thread_number"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Settings::from_document(&doc(json!({ "42": { "not": "a list" } }))).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "42"));
    }

    #[test]
    fn test_numeric_version_accepted() {
        let settings = Settings::from_document(&doc(json!({ "version": 2 }))).unwrap();
        assert_eq!(settings.version.as_deref(), Some("2"));
    }

    #[test]
    fn test_is_model_key() {
        assert!(is_model_key("1342697561419"));
        assert!(is_model_key("-5"));
        assert!(!is_model_key("-"));
        assert!(!is_model_key(""));
        assert!(!is_model_key("+5"));
        assert!(!is_model_key("dirs"));
    }
}
