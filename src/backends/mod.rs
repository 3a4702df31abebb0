pub mod edge;
pub mod gtts;

use crate::error::ConvertError;
use crate::rate::Rate;

/// Represents a text-to-speech voice
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Trait that all speech synthesis backends must implement.
/// A backend is a black box that turns (text, voice, rate) into MP3 bytes;
/// everything around the call (validation, timeout, artifact handling) lives
/// in the conversion pipeline.
pub trait SpeechBackend: Send + Sync {
    /// Returns the unique engine identifier (e.g. "edge-tts")
    fn id(&self) -> &'static str;

    /// True when the engine applies the rate itself during synthesis.
    /// Backends without native rate control get the post-processing
    /// speed transform instead.
    fn supports_native_rate(&self) -> bool;

    /// Map the requested voice/language selector to the value the engine
    /// actually receives. The default keeps it as-is.
    fn canonical_voice(&self, requested: &str) -> String {
        requested.to_string()
    }

    /// Perform exactly one synthesis call and return the MP3 bytes
    fn synthesize(&self, text: &str, voice: &str, rate: Rate) -> Result<Vec<u8>, ConvertError>;

    /// Returns the fixed list of supported voices
    fn list_voices(&self) -> Vec<Voice>;
}
