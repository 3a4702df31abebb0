use std::time::Duration;

use msedge_tts::tts::client::connect;
use msedge_tts::tts::SpeechConfig;

use super::{SpeechBackend, Voice};
use crate::config_loader::SETTINGS;
use crate::convert::BackendProfile;
use crate::error::ConvertError;
use crate::rate::Rate;

pub const DEFAULT_VOICE: &str = "vi-VN-HoaiMyNeural";
pub const AUDIO_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const MAX_TEXT_CHARS: usize = 15_000;

/// Microsoft Edge "Read aloud" neural voices. Free, high quality, and the
/// engine honors the speaking rate natively.
pub struct EdgeBackend {
    audio_format: String,
}

impl EdgeBackend {
    pub fn new() -> Self {
        let audio_format = SETTINGS
            .read()
            .map(|s| s.edge_audio_format.clone())
            .unwrap_or_else(|_| AUDIO_FORMAT.to_string());
        Self { audio_format }
    }
}

impl Default for EdgeBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversion limits for this engine: 15000 chars, 60s deadline, and a
/// zero-length output file counts as a failure.
pub fn profile() -> BackendProfile {
    let timeout_secs = SETTINGS
        .read()
        .map(|s| s.edge_timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    BackendProfile {
        max_text_chars: MAX_TEXT_CHARS,
        reject_empty_output: true,
        synthesis_timeout: Some(Duration::from_secs(timeout_secs)),
    }
}

impl SpeechBackend for EdgeBackend {
    fn id(&self) -> &'static str {
        "edge-tts"
    }

    fn supports_native_rate(&self) -> bool {
        true
    }

    fn synthesize(&self, text: &str, voice: &str, rate: Rate) -> Result<Vec<u8>, ConvertError> {
        let config = SpeechConfig {
            voice_name: voice.to_string(),
            audio_format: self.audio_format.clone(),
            pitch: 0,
            rate: rate.percent(),
            volume: 0,
        };

        let mut client =
            connect().map_err(|e| ConvertError::Construction(e.to_string()))?;

        let audio = client
            .synthesize(text, &config)
            .map_err(|e| ConvertError::Synthesis(e.to_string()))?;

        Ok(audio.audio_bytes)
    }

    fn list_voices(&self) -> Vec<Voice> {
        let table: &[(&str, &str, &str)] = &[
            ("vi-VN-HoaiMyNeural", "Hoài My (Female)", "vi-VN"),
            ("vi-VN-NamMinhNeural", "Nam Minh (Male)", "vi-VN"),
            ("en-US-JennyNeural", "Jenny (Female - US)", "en-US"),
            ("en-US-GuyNeural", "Guy (Male - US)", "en-US"),
            ("en-GB-SoniaNeural", "Sonia (Female - UK)", "en-GB"),
            ("en-GB-RyanNeural", "Ryan (Male - UK)", "en-GB"),
            ("ja-JP-NanamiNeural", "Nanami (Female - Japan)", "ja-JP"),
            ("ja-JP-KeitaNeural", "Keita (Male - Japan)", "ja-JP"),
            ("ko-KR-SunHiNeural", "Sun-Hi (Female - Korea)", "ko-KR"),
            ("ko-KR-InJoonNeural", "InJoon (Male - Korea)", "ko-KR"),
            ("zh-CN-XiaoxiaoNeural", "Xiaoxiao (Female - China)", "zh-CN"),
            ("zh-CN-YunxiNeural", "Yunxi (Male - China)", "zh-CN"),
        ];

        table
            .iter()
            .map(|(id, name, language)| Voice {
                id: id.to_string(),
                name: name.to_string(),
                language: language.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_enforces_deadline_and_empty_check() {
        let profile = profile();
        assert_eq!(profile.max_text_chars, 15_000);
        assert!(profile.reject_empty_output);
        assert!(profile.synthesis_timeout.is_some());
    }

    #[test]
    fn catalog_contains_the_default_voice() {
        let backend = EdgeBackend::new();
        let voices = backend.list_voices();
        assert_eq!(voices.len(), 12);
        assert!(voices.iter().any(|v| v.id == DEFAULT_VOICE));
    }

    #[test]
    fn voice_selector_is_passed_through() {
        let backend = EdgeBackend::new();
        assert_eq!(backend.canonical_voice("en-US-GuyNeural"), "en-US-GuyNeural");
    }
}
