use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::backends::SpeechBackend;
use crate::error::ConvertError;
use crate::rate::Rate;
use crate::report::{verify_artifact, ConversionResult};
use crate::transform;

/// One conversion attempt: the resolved text plus where and how to speak it.
pub struct ConversionRequest {
    pub text: String,
    pub output_path: PathBuf,
    pub voice: String,
    pub speed: f64,
}

/// Per-engine limits and quirks. The two engines genuinely differ here
/// (deadline on one, zero-length check on one); the flags keep that
/// asymmetry explicit instead of unifying it.
#[derive(Debug, Clone, Copy)]
pub struct BackendProfile {
    pub max_text_chars: usize,
    pub reject_empty_output: bool,
    pub synthesis_timeout: Option<Duration>,
}

/// Temporary artifact used on the post-processing path. Derived only from
/// the output path, so concurrent conversions targeting the same output
/// collide here; known limitation.
pub fn temp_artifact_path(output: &Path) -> PathBuf {
    PathBuf::from(format!("{}.temp.mp3", output.display()))
}

/// Run one conversion end to end and fold any failure into the result
/// object. This is the only entry point the binaries use; nothing below it
/// panics or leaks an error past the JSON contract.
pub async fn run_conversion(
    backend: Arc<dyn SpeechBackend>,
    profile: BackendProfile,
    request: ConversionRequest,
) -> ConversionResult {
    match convert(backend, profile, request).await {
        Ok(result) => result,
        Err(e) => ConversionResult::failure(e.to_string()),
    }
}

async fn convert(
    backend: Arc<dyn SpeechBackend>,
    profile: BackendProfile,
    request: ConversionRequest,
) -> Result<ConversionResult, ConvertError> {
    if request.text.trim().is_empty() {
        return Err(ConvertError::EmptyText);
    }
    if request.text.chars().count() > profile.max_text_chars {
        return Err(ConvertError::TextTooLong {
            limit: profile.max_text_chars,
        });
    }

    if let Some(parent) = request.output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConvertError::OutputDir(e.to_string()))?;
        }
    }

    let rate = Rate::from_speed(request.speed);
    let voice = backend.canonical_voice(&request.voice);

    let audio = synthesize_once(
        backend.clone(),
        profile,
        request.text.clone(),
        voice.clone(),
        rate,
    )
    .await?;

    if backend.supports_native_rate() || request.speed == 1.0 {
        std::fs::write(&request.output_path, &audio)
            .map_err(|e| ConvertError::SaveAudio(e.to_string()))?;
    } else {
        let temp = temp_artifact_path(&request.output_path);
        std::fs::write(&temp, &audio).map_err(|e| ConvertError::SaveAudio(e.to_string()))?;
        let adjusted = transform::change_speed(&temp, &request.output_path, request.speed);
        let _ = std::fs::remove_file(&temp);
        adjusted?;
    }

    let file_size = verify_artifact(&request.output_path, profile.reject_empty_output)?;

    Ok(if backend.supports_native_rate() {
        ConversionResult::success_with_voice(
            &request.output_path,
            file_size,
            voice,
            rate,
            backend.id(),
        )
    } else {
        ConversionResult::success_with_lang(&request.output_path, file_size, voice, backend.id())
    })
}

/// Exactly one backend call, on a blocking task, bounded by the profile's
/// deadline when it has one. No retry on timeout; the attempt is abandoned.
async fn synthesize_once(
    backend: Arc<dyn SpeechBackend>,
    profile: BackendProfile,
    text: String,
    voice: String,
    rate: Rate,
) -> Result<Vec<u8>, ConvertError> {
    let task = tokio::task::spawn_blocking(move || backend.synthesize(&text, &voice, rate));

    let joined = match profile.synthesis_timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ConvertError::Timeout(limit))?,
        None => task.await,
    };

    joined.map_err(|e| ConvertError::Synthesis(e.to_string()))?
}
