use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::speech::{
    CommandSpeechInput, CommandSpeechOutput, SpeechInput, SpeechOutput, Unavailable, PREFERRED_VOICE,
};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";
pub const DEFAULT_TTS_COMMAND: &str = "espeak-ng";
pub const RELAY_URL_ENV: &str = "ASKAI_RELAY_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub relay_url: Option<String>,
    pub speech_enabled: Option<bool>,
    pub tts_command: Option<String>,
    pub preferred_voice: Option<String>,
    pub stt_command: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            relay_url: Some(DEFAULT_RELAY_URL.to_string()),
            speech_enabled: Some(true),
            tts_command: Some(DEFAULT_TTS_COMMAND.to_string()),
            preferred_voice: None,
            stt_command: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_speech_enabled(enabled: bool) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.speech_enabled = Some(enabled);
        config.save()
    }

    /// Relay address: environment first, then config, then the local default
    pub fn relay_url(&self) -> String {
        std::env::var(RELAY_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.relay_url.clone())
            .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string())
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech_enabled.unwrap_or(true)
    }

    pub fn preferred_voice(&self) -> &str {
        self.preferred_voice.as_deref().unwrap_or(PREFERRED_VOICE)
    }

    pub fn speech_output(&self) -> Arc<dyn SpeechOutput> {
        match self.tts_command.as_deref().map(str::trim) {
            Some("") => Arc::new(Unavailable),
            Some(program) => Arc::new(CommandSpeechOutput::new(program)),
            None => Arc::new(CommandSpeechOutput::new(DEFAULT_TTS_COMMAND)),
        }
    }

    pub fn speech_input(&self) -> Arc<dyn SpeechInput> {
        match self.stt_command.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => Arc::new(CommandSpeechInput::new(command)),
            _ => Arc::new(Unavailable),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("askai").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert!(config.speech_enabled());
        assert_eq!(config.preferred_voice(), "Google");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            relay_url: Some("http://relay.test".to_string()),
            speech_enabled: Some(false),
            tts_command: Some(String::new()),
            preferred_voice: Some("Lekha".to_string()),
            stt_command: Some("whisper-listen --lang {lang}".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.speech_enabled());
        assert!(loaded.speech_input().is_available());
    }

    #[test]
    fn partial_file_leaves_other_fields_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "speech_enabled": false }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.relay_url, None);
        assert!(!config.speech_enabled());
        assert!(!config.speech_input().is_available());
    }
}
