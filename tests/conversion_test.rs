use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use tts_convert::backends::{SpeechBackend, Voice};
use tts_convert::convert::{run_conversion, BackendProfile, ConversionRequest};
use tts_convert::error::ConvertError;
use tts_convert::rate::Rate;

mockall::mock! {
    pub Backend {}
    impl SpeechBackend for Backend {
        fn id(&self) -> &'static str;
        fn supports_native_rate(&self) -> bool;
        fn canonical_voice(&self, requested: &str) -> String;
        fn synthesize(&self, text: &str, voice: &str, rate: Rate) -> Result<Vec<u8>, ConvertError>;
        fn list_voices(&self) -> Vec<Voice>;
    }
}

fn native_profile() -> BackendProfile {
    BackendProfile {
        max_text_chars: 15_000,
        reject_empty_output: true,
        synthesis_timeout: Some(Duration::from_secs(60)),
    }
}

fn post_processing_profile() -> BackendProfile {
    BackendProfile {
        max_text_chars: 10_000,
        reject_empty_output: false,
        synthesis_timeout: None,
    }
}

fn request(text: &str, output: std::path::PathBuf, voice: &str, speed: f64) -> ConversionRequest {
    ConversionRequest {
        text: text.to_string(),
        output_path: output,
        voice: voice.to_string(),
        speed,
    }
}

#[tokio::test]
async fn conversion_writes_artifact_and_reports_voice_shape() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp3");

    let mut mock = MockBackend::new();
    mock.expect_supports_native_rate().returning(|| true);
    mock.expect_canonical_voice()
        .returning(|requested| requested.to_string());
    mock.expect_synthesize()
        .withf(|text, voice, rate| {
            text == "Hello world" && voice == "en-US-JennyNeural" && rate.percent() == 25
        })
        .returning(|_, _, _| Ok(b"fake mp3 payload".to_vec()));
    mock.expect_id().returning(|| "edge-tts");

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        native_profile(),
        request("Hello world", output.clone(), "en-US-JennyNeural", 1.25),
    )
    .await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.file_size, Some(16));
    assert_eq!(result.voice.as_deref(), Some("en-US-JennyNeural"));
    assert_eq!(result.rate.as_deref(), Some("+25%"));
    assert_eq!(result.engine.as_deref(), Some("edge-tts"));
    assert_eq!(std::fs::read(&output).unwrap(), b"fake mp3 payload");
}

#[tokio::test]
async fn empty_text_is_rejected_before_synthesis() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp3");

    let mut mock = MockBackend::new();
    mock.expect_synthesize().times(0);

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        native_profile(),
        request("   \n\t", output.clone(), "vi-VN-HoaiMyNeural", 1.0),
    )
    .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Text is empty"));
    assert!(!output.exists(), "no artifact may be created on validation failure");
}

#[tokio::test]
async fn oversized_text_is_rejected_without_artifact() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp3");

    let mut mock = MockBackend::new();
    mock.expect_synthesize().times(0);

    let profile = BackendProfile {
        max_text_chars: 10,
        ..native_profile()
    };

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        profile,
        request("elevenchars", output.clone(), "vi", 1.0),
    )
    .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Text too long (max 10 chars)"));
    assert!(!output.exists());
}

#[tokio::test]
async fn synthesis_deadline_is_enforced() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp3");

    let mut mock = MockBackend::new();
    mock.expect_canonical_voice()
        .returning(|requested| requested.to_string());
    mock.expect_synthesize().returning(|_, _, _| {
        std::thread::sleep(Duration::from_millis(300));
        Ok(vec![0u8; 8])
    });

    let profile = BackendProfile {
        synthesis_timeout: Some(Duration::from_millis(50)),
        ..native_profile()
    };

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(backend, profile, request("hi", output.clone(), "vi", 1.0)).await;

    assert!(!result.success);
    assert!(
        result.error.as_deref().unwrap().starts_with("Conversion timeout"),
        "unexpected error: {:?}",
        result.error
    );
    assert!(!output.exists());
}

#[tokio::test]
async fn backend_error_becomes_a_failure_result() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.mp3");

    let mut mock = MockBackend::new();
    mock.expect_canonical_voice()
        .returning(|requested| requested.to_string());
    mock.expect_synthesize()
        .returning(|_, _, _| Err(ConvertError::Synthesis("connection reset".to_string())));

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        native_profile(),
        request("hi", output.clone(), "vi", 1.0),
    )
    .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Synthesis failed: connection reset")
    );
}

#[tokio::test]
async fn empty_output_fails_only_on_profiles_that_reject_it() {
    let dir = tempdir().unwrap();

    // Engine profile with the zero-length check
    let output = dir.path().join("strict.mp3");
    let mut strict = MockBackend::new();
    strict.expect_supports_native_rate().returning(|| true);
    strict
        .expect_canonical_voice()
        .returning(|requested| requested.to_string());
    strict.expect_synthesize().returning(|_, _, _| Ok(Vec::new()));

    let backend: Arc<dyn SpeechBackend> = Arc::new(strict);
    let result = run_conversion(
        backend,
        native_profile(),
        request("hi", output.clone(), "vi", 1.0),
    )
    .await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Output file is empty"));

    // Engine profile without it: size 0 is still a success
    let output = dir.path().join("lenient.mp3");
    let mut lenient = MockBackend::new();
    lenient.expect_supports_native_rate().returning(|| false);
    lenient.expect_canonical_voice().returning(|_| "vi".to_string());
    lenient.expect_synthesize().returning(|_, _, _| Ok(Vec::new()));
    lenient.expect_id().returning(|| "gtts");

    let backend: Arc<dyn SpeechBackend> = Arc::new(lenient);
    let result = run_conversion(
        backend,
        post_processing_profile(),
        request("hi", output.clone(), "anything", 1.0),
    )
    .await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.file_size, Some(0));
    assert_eq!(result.lang.as_deref(), Some("vi"));
    assert!(result.voice.is_none());
    assert!(result.rate.is_none());
}

#[tokio::test]
async fn normal_speed_skips_post_processing() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("direct.mp3");

    let mut mock = MockBackend::new();
    mock.expect_supports_native_rate().returning(|| false);
    mock.expect_canonical_voice().returning(|_| "en".to_string());
    mock.expect_synthesize()
        .returning(|_, _, _| Ok(b"gtts audio".to_vec()));
    mock.expect_id().returning(|| "gtts");

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        post_processing_profile(),
        request("hello", output.clone(), "en", 1.0),
    )
    .await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(std::fs::read(&output).unwrap(), b"gtts audio");
    // The direct path never materializes the temporary artifact.
    assert!(!tts_convert::convert::temp_artifact_path(&output).exists());
}

#[tokio::test]
async fn capped_rate_is_reported_for_extreme_speeds() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("fast.mp3");

    let mut mock = MockBackend::new();
    mock.expect_supports_native_rate().returning(|| true);
    mock.expect_canonical_voice()
        .returning(|requested| requested.to_string());
    mock.expect_synthesize()
        .withf(|_, _, rate| rate.percent() == 100)
        .returning(|_, _, _| Ok(vec![1u8; 4]));
    mock.expect_id().returning(|| "edge-tts");

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        native_profile(),
        request("hi", output, "vi", 3.0),
    )
    .await;

    assert!(result.success);
    assert_eq!(result.rate.as_deref(), Some("+100%"));
}

#[tokio::test]
async fn concurrent_conversions_do_not_interfere() {
    let dir = tempdir().unwrap();
    let first_path = dir.path().join("first.mp3");
    let second_path = dir.path().join("second.mp3");

    fn backend_returning(payload: &'static [u8]) -> Arc<dyn SpeechBackend> {
        let mut mock = MockBackend::new();
        mock.expect_supports_native_rate().returning(|| true);
        mock.expect_canonical_voice()
            .returning(|requested| requested.to_string());
        mock.expect_synthesize()
            .returning(move |_, _, _| Ok(payload.to_vec()));
        mock.expect_id().returning(|| "edge-tts");
        Arc::new(mock)
    }

    let first = run_conversion(
        backend_returning(b"first payload"),
        native_profile(),
        request("one", first_path.clone(), "vi", 1.0),
    );
    let second = run_conversion(
        backend_returning(b"second payload bytes"),
        native_profile(),
        request("two", second_path.clone(), "vi", 1.0),
    );

    let (first, second) = tokio::join!(first, second);

    assert!(first.success && second.success);
    assert_eq!(std::fs::read(&first_path).unwrap(), b"first payload");
    assert_eq!(std::fs::read(&second_path).unwrap(), b"second payload bytes");
}

#[tokio::test]
async fn output_parent_directories_are_created() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("nested").join("deeper").join("out.mp3");

    let mut mock = MockBackend::new();
    mock.expect_supports_native_rate().returning(|| true);
    mock.expect_canonical_voice()
        .returning(|requested| requested.to_string());
    mock.expect_synthesize().returning(|_, _, _| Ok(vec![7u8; 3]));
    mock.expect_id().returning(|| "edge-tts");

    let backend: Arc<dyn SpeechBackend> = Arc::new(mock);
    let result = run_conversion(
        backend,
        native_profile(),
        request("hi", output.clone(), "vi", 1.0),
    )
    .await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert!(output.exists());
}
