use std::{
    collections::HashMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

use crate::core::BridgeError;

const APP_NAME: &str = "ankibridge";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// AnkiConnect endpoint.
    pub endpoint: String,
    /// Deck used when neither the entry nor the document names one.
    pub default_deck: Option<String>,
    /// Note type used when neither the entry nor the document names one.
    pub default_model: Option<String>,
    /// Passed through to the store's duplicate detection on create.
    pub allow_duplicate: bool,
    /// Tags applied to every synced note on top of local and inherited ones.
    pub global_tags: Vec<String>,
    /// Note type -> ordered field schema. Extraction fails for entries whose
    /// resolved note type is not listed here.
    pub models: HashMap<String, Vec<String>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8765".to_string(),
            default_deck: Some("Default".to_string()),
            default_model: Some("Basic".to_string()),
            allow_duplicate: false,
            global_tags: Vec::new(),
            models: HashMap::from([(
                "Basic".to_string(),
                vec!["Front".to_string(), "Back".to_string()],
            )]),
        }
    }
}

impl SyncConfig {
    pub fn load() -> Self {
        match Self::load_from(&config_file_path()) {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, BridgeError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self) -> Result<(), BridgeError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), BridgeError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Config saved to: {}", path.display());
        Ok(())
    }
}

fn config_file_path() -> PathBuf {
    get_app_data_dir().join(CONFIG_FILE)
}

fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_basic_setup() {
        let config = SyncConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8765");
        assert_eq!(config.models["Basic"], vec!["Front", "Back"]);
        assert!(!config.allow_duplicate);
    }

    #[test]
    fn round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = SyncConfig::default();
        config.default_deck = Some("Languages::French".to_string());
        config.global_tags = vec!["fr".to_string()];
        config.save_to(&path).unwrap();

        let loaded = SyncConfig::load_from(&path).unwrap();
        assert_eq!(loaded.default_deck.as_deref(), Some("Languages::French"));
        assert_eq!(loaded.global_tags, vec!["fr"]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SyncConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded.endpoint, SyncConfig::default().endpoint);
    }

    #[test]
    fn unknown_and_missing_fields_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "endpoint": "http://localhost:9999", "future_knob": 1 }"#).unwrap();

        let loaded = SyncConfig::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint, "http://localhost:9999");
        assert_eq!(loaded.default_model.as_deref(), Some("Basic"));
    }
}
