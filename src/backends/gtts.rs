use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use super::{SpeechBackend, Voice};
use crate::config_loader::SETTINGS;
use crate::convert::BackendProfile;
use crate::error::ConvertError;
use crate::rate::Rate;

pub const DEFAULT_LANG: &str = "vi";
pub const DEFAULT_ENDPOINT: &str =
    "https://translate.google.com/_/TranslateWebserverUi/data/batchexecute";
pub const DEFAULT_CHUNK_CHARS: usize = 100;
pub const MAX_TEXT_CHARS: usize = 10_000;

const RPC_ID: &str = "jQ1olc";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Language selectors the translate endpoint is known to handle well here.
// Anything else silently falls back to the default.
const SUPPORTED_LANGS: &[(&str, &str)] = &[
    ("vi", "vi"),
    ("en", "en"),
    ("ja", "ja"),
    ("ko", "ko"),
    ("zh", "zh-CN"),
    ("zh-CN", "zh-CN"),
    ("fr", "fr"),
    ("de", "de"),
    ("es", "es"),
];

/// Google Translate text-to-speech. Free, but the service accepts at most
/// ~100 characters per request and has no rate parameter, so long texts are
/// chunked and speed changes happen in post-processing.
pub struct GttsBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
    chunk_chars: usize,
}

impl GttsBackend {
    pub fn new() -> Result<Self, ConvertError> {
        let (endpoint, chunk_chars) = SETTINGS
            .read()
            .map(|s| (s.gtts_endpoint.clone(), s.gtts_chunk_chars))
            .unwrap_or_else(|_| (DEFAULT_ENDPOINT.to_string(), DEFAULT_CHUNK_CHARS));

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConvertError::Construction(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            chunk_chars,
        })
    }

    fn fetch_chunk(&self, chunk: &str, lang: &str) -> Result<Vec<u8>, ConvertError> {
        // The batchexecute envelope: one RPC call, parameters double-encoded
        // as a JSON string.
        let params = serde_json::json!([chunk, lang, Value::Null, "null"]).to_string();
        let freq = serde_json::json!([[[RPC_ID, params, Value::Null, "generic"]]]).to_string();

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("f.req", freq.as_str())])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ConvertError::Synthesis(e.to_string()))?;

        let body = response
            .text()
            .map_err(|e| ConvertError::Synthesis(e.to_string()))?;

        extract_audio(&body)
    }
}

/// Pull the base64 MP3 segment out of a batchexecute response body.
///
/// The body is a stream of length-prefixed lines; the one we want is a JSON
/// frame whose payload field is itself a JSON-encoded `["<base64>"]` string.
fn extract_audio(body: &str) -> Result<Vec<u8>, ConvertError> {
    for line in body.lines() {
        if !line.contains(RPC_ID) {
            continue;
        }
        let frame: Value = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(_) => continue,
        };
        let Some(payload) = frame
            .get(0)
            .and_then(|f| f.get(2))
            .and_then(|p| p.as_str())
        else {
            continue;
        };
        let inner: Value = serde_json::from_str(payload)
            .map_err(|e| ConvertError::Synthesis(format!("malformed audio payload: {}", e)))?;
        let Some(encoded) = inner.get(0).and_then(|a| a.as_str()) else {
            continue;
        };
        return BASE64
            .decode(encoded)
            .map_err(|e| ConvertError::Synthesis(format!("undecodable audio payload: {}", e)));
    }
    Err(ConvertError::Synthesis(
        "no audio segment in service response".to_string(),
    ))
}

/// Split text into request-sized chunks on whitespace boundaries, counting
/// characters rather than bytes. Tokens longer than `max_chars` are
/// hard-split.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut piece = String::new();
            let mut piece_len = 0usize;
            for ch in word.chars() {
                piece.push(ch);
                piece_len += 1;
                if piece_len == max_chars {
                    chunks.push(std::mem::take(&mut piece));
                    piece_len = 0;
                }
            }
            if !piece.is_empty() {
                current_len = piece_len;
                current = piece;
            }
            continue;
        }

        let sep = usize::from(!current.is_empty());
        if current_len + sep + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Conversion limits for this engine: 10000 chars, no synthesis deadline,
/// and no zero-length check on the output file.
pub fn profile() -> BackendProfile {
    BackendProfile {
        max_text_chars: MAX_TEXT_CHARS,
        reject_empty_output: false,
        synthesis_timeout: None,
    }
}

impl SpeechBackend for GttsBackend {
    fn id(&self) -> &'static str {
        "gtts"
    }

    fn supports_native_rate(&self) -> bool {
        false
    }

    fn canonical_voice(&self, requested: &str) -> String {
        SUPPORTED_LANGS
            .iter()
            .find(|(alias, _)| *alias == requested)
            .map(|(_, code)| code.to_string())
            .unwrap_or_else(|| DEFAULT_LANG.to_string())
    }

    fn synthesize(&self, text: &str, lang: &str, _rate: Rate) -> Result<Vec<u8>, ConvertError> {
        let mut audio = Vec::new();
        for chunk in chunk_text(text, self.chunk_chars) {
            audio.extend(self.fetch_chunk(&chunk, lang)?);
        }
        if audio.is_empty() {
            return Err(ConvertError::Synthesis(
                "service returned no audio".to_string(),
            ));
        }
        Ok(audio)
    }

    fn list_voices(&self) -> Vec<Voice> {
        let table: &[(&str, &str)] = &[
            ("vi", "Vietnamese"),
            ("en", "English"),
            ("ja", "Japanese"),
            ("ko", "Korean"),
            ("zh-CN", "Chinese (Mandarin)"),
            ("fr", "French"),
            ("de", "German"),
            ("es", "Spanish"),
        ];

        table
            .iter()
            .map(|(code, name)| Voice {
                id: code.to_string(),
                name: name.to_string(),
                language: code.to_string(),
            })
            .collect()
    }
}
