use std::path::Path;

use serde::Serialize;

use crate::error::ConvertError;
use crate::rate::Rate;

/// The one JSON object each invocation writes to stdout. Absent fields are
/// skipped so the two engines keep their historical shapes: the Edge result
/// carries `voice` + `rate`, the gTTS result carries `lang`, and failures
/// carry only `success` + `error`.
#[derive(Debug, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            file_path: None,
            file_size: None,
            voice: None,
            lang: None,
            rate: None,
            engine: None,
            error: Some(message.into()),
        }
    }

    pub fn success_with_voice(
        path: &Path,
        file_size: u64,
        voice: String,
        rate: Rate,
        engine: &str,
    ) -> Self {
        Self {
            success: true,
            file_path: Some(path.display().to_string()),
            file_size: Some(file_size),
            voice: Some(voice),
            lang: None,
            rate: Some(rate.to_string()),
            engine: Some(engine.to_string()),
            error: None,
        }
    }

    pub fn success_with_lang(path: &Path, file_size: u64, lang: String, engine: &str) -> Self {
        Self {
            success: true,
            file_path: Some(path.display().to_string()),
            file_size: Some(file_size),
            voice: None,
            lang: Some(lang),
            rate: None,
            engine: Some(engine.to_string()),
            error: None,
        }
    }

    /// Write the result to stdout as a single JSON line. Serialization of
    /// this struct cannot normally fail; if it somehow does, a minimal
    /// hand-built failure object goes out instead so stdout never carries
    /// partial JSON.
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                println!("{{\"success\":false,\"error\":\"internal serialization failure\"}}");
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// Post-hoc check that the conversion actually produced an artifact.
/// The zero-length check is engine-dependent.
pub fn verify_artifact(path: &Path, reject_empty: bool) -> Result<u64, ConvertError> {
    let metadata = std::fs::metadata(path).map_err(|_| ConvertError::MissingArtifact)?;
    let size = metadata.len();
    if reject_empty && size == 0 {
        return Err(ConvertError::EmptyArtifact);
    }
    Ok(size)
}
