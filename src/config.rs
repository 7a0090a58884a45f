//! Configuration management for mindscape
//!
//! One global config: theme and the Gemini API settings.
//!
//! Config file location: ~/.config/mindscape/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Fresh config files ship with this stand-in so users see exactly
/// where the key goes. It never counts as a configured key.
const PLACEHOLDER_KEY: &str = "YOUR_API_KEY_HERE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeName,

    // Gemini settings
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    #[serde(default = "default_api_key")]
    pub ai_api_key: String,
}

fn default_ai_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key() -> String {
    PLACEHOLDER_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::Gruvbox,
            ai_model: default_ai_model(),
            ai_api_key: default_api_key(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("mindscape");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        // Restrict config file permissions (contains the API key)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Check if the Gemini key is actually set
    pub fn ai_available(&self) -> bool {
        !self.ai_api_key.is_empty() && self.ai_api_key != PLACEHOLDER_KEY
    }
}

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Gruvbox,
    Nord,
    Dracula,
    Paper,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Gruvbox => "Gruvbox",
            ThemeName::Nord => "Nord",
            ThemeName::Dracula => "Dracula",
            ThemeName::Paper => "Paper",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Gruvbox => ThemeName::Nord,
            ThemeName::Nord => ThemeName::Dracula,
            ThemeName::Dracula => ThemeName::Paper,
            ThemeName::Paper => ThemeName::Gruvbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemeName::Gruvbox);
        assert_eq!(config.ai_model, "gemini-1.5-flash");
        assert_eq!(config.ai_api_key, PLACEHOLDER_KEY);
    }

    #[test]
    fn test_placeholder_key_is_not_available() {
        let mut config = Config::default();
        assert!(!config.ai_available());
        config.ai_api_key = String::new();
        assert!(!config.ai_available());
        config.ai_api_key = "AIzaSyExample".to_string();
        assert!(config.ai_available());
    }

    #[test]
    fn test_theme_cycle() {
        let theme = ThemeName::Gruvbox;
        assert_eq!(theme.next(), ThemeName::Nord);
        // Full cycle should return to start
        let mut t = ThemeName::Gruvbox;
        for _ in 0..4 {
            t = t.next();
        }
        assert_eq!(t, ThemeName::Gruvbox);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let mut config = Config::default();
        config.theme = ThemeName::Dracula;
        config.ai_api_key = "secret".to_string();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.theme, ThemeName::Dracula);
        assert_eq!(back.ai_api_key, "secret");
        assert_eq!(back.ai_model, "gemini-1.5-flash");
    }
}
