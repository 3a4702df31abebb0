use config::{Config, File};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::sync::RwLock;

use crate::backends::{edge, gtts};
use crate::transform;

#[derive(Debug, Deserialize)]
pub struct Settings {
    // Edge backend
    pub edge_voice: String,
    pub edge_audio_format: String,
    pub edge_timeout_secs: u64,
    // gTTS backend
    pub gtts_lang: String,
    pub gtts_endpoint: String,
    pub gtts_chunk_chars: usize,
    // Post-processing tools
    pub ffmpeg_binary: String,
    pub ffprobe_binary: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            edge_voice: edge::DEFAULT_VOICE.to_string(),
            edge_audio_format: edge::AUDIO_FORMAT.to_string(),
            edge_timeout_secs: edge::DEFAULT_TIMEOUT_SECS,
            gtts_lang: gtts::DEFAULT_LANG.to_string(),
            gtts_endpoint: gtts::DEFAULT_ENDPOINT.to_string(),
            gtts_chunk_chars: gtts::DEFAULT_CHUNK_CHARS,
            ffmpeg_binary: transform::DEFAULT_FFMPEG.to_string(),
            ffprobe_binary: transform::DEFAULT_FFPROBE.to_string(),
        }
    }
}

lazy_static! {
    pub static ref SETTINGS: RwLock<Settings> = RwLock::new(Settings::new().unwrap_or_else(|e| {
        eprintln!("Failed to load settings ({}), using defaults", e);
        Settings::default()
    }));
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = Config::builder()
            // Connect to defaults
            .set_default("edge_voice", edge::DEFAULT_VOICE)?
            .set_default("edge_audio_format", edge::AUDIO_FORMAT)?
            .set_default("edge_timeout_secs", edge::DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("gtts_lang", gtts::DEFAULT_LANG)?
            .set_default("gtts_endpoint", gtts::DEFAULT_ENDPOINT)?
            .set_default("gtts_chunk_chars", gtts::DEFAULT_CHUNK_CHARS as i64)?
            .set_default("ffmpeg_binary", transform::DEFAULT_FFMPEG)?
            .set_default("ffprobe_binary", transform::DEFAULT_FFPROBE)?
            // Merge with local config file (if exists)
            .add_source(File::with_name("TtsConvert").required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.config/tts-convert/TtsConvert",
                    std::env::var("HOME").unwrap_or_default()
                ))
                .required(false),
            )
            // Merge with environment variables (e.g. TTS_EDGE_VOICE)
            .add_source(config::Environment::with_prefix("TTS"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.edge_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "edge_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.gtts_chunk_chars == 0 {
            return Err(config::ConfigError::Message(
                "gtts_chunk_chars must be greater than 0".to_string(),
            ));
        }
        if self.gtts_endpoint.is_empty() {
            return Err(config::ConfigError::Message(
                "gtts_endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let settings = Settings::new().expect("Failed to load settings");
        assert!(settings.edge_timeout_secs > 0);
        assert!(settings.gtts_chunk_chars > 0);
    }

    #[test]
    fn defaults_match_backend_constants() {
        let settings = Settings::default();
        assert_eq!(settings.edge_voice, edge::DEFAULT_VOICE);
        assert_eq!(settings.gtts_lang, gtts::DEFAULT_LANG);
        assert_eq!(settings.ffmpeg_binary, "ffmpeg");
    }
}
