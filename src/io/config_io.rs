use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::io::vault::VaultError;
use crate::model::SettingsSource;

/// Contents of `.scribe/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultConfig {
    /// Autocomplete settings, keyed by their kebab-case names
    #[serde(default)]
    pub completion: toml::Table,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiConfig {
    /// Hex color overrides (`highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl SettingsSource for VaultConfig {
    fn setting(&self, key: &str) -> Option<String> {
        match self.completion.get(key)? {
            toml::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Read the vault config. A missing file yields the defaults.
pub fn read_config(scribe_dir: &Path) -> Result<VaultConfig, VaultError> {
    let config_path = scribe_dir.join("config.toml");
    if !config_path.exists() {
        return Ok(VaultConfig::default());
    }
    let config_text = fs::read_to_string(&config_path).map_err(|e| VaultError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&config_text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompletionConfig, WeekStart};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert!(config.completion.is_empty());
        assert!(config.ui.colors.is_empty());
    }

    #[test]
    fn test_read_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[completion]
date-trigger = "//"
date-format = "%d.%m.%Y"
auto-pair-brackets = false
first-day-of-week = "monday"

[ui.colors]
highlight = "#00FF00"
"##,
        )
        .unwrap();

        let vault_config = read_config(tmp.path()).unwrap();
        assert_eq!(vault_config.setting("auto-pair-brackets").as_deref(), Some("false"));
        assert_eq!(vault_config.setting("time-trigger"), None);
        assert_eq!(vault_config.ui.colors["highlight"], "#00FF00");

        let (config, errors) = CompletionConfig::from_settings(&vault_config);
        assert!(errors.is_empty());
        assert_eq!(config.date_trigger, "//");
        assert_eq!(config.date_format, "%d.%m.%Y");
        assert!(!config.auto_pair_brackets);
        assert_eq!(config.first_day_of_week, WeekStart::Monday);
    }

    #[test]
    fn test_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[completion\n").unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(VaultError::ConfigParseError(_))
        ));
    }
}
