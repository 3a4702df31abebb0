//! gtts-convert - text to MP3 through the Google Translate speech service.
//!
//! The engine has no native rate control, so non-1.0 speeds are applied by
//! re-encoding the synthesized audio through ffmpeg. Emits exactly one JSON
//! result object on stdout; exit code 0 iff the conversion succeeded.

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use tts_convert::backends::gtts::{self, GttsBackend};
use tts_convert::backends::SpeechBackend;
use tts_convert::config_loader::SETTINGS;
use tts_convert::convert::{run_conversion, ConversionRequest};
use tts_convert::input;
use tts_convert::rate;
use tts_convert::report::ConversionResult;
use tts_convert::transform;

const USAGE: &str = "Usage: gtts-convert [--base64] 'text' 'output.mp3' [lang] [speed]";

/// Convert text to speech (MP3) using Google Translate TTS
#[derive(Parser)]
#[command(name = "gtts-convert")]
#[command(version)]
#[command(about = "Convert text to speech (MP3) using Google Translate TTS", long_about = None)]
struct Cli {
    /// Treat TEXT as base64-encoded UTF-8
    #[arg(long)]
    base64: bool,

    /// Print the language catalog as JSON and exit
    #[arg(long)]
    list_voices: bool,

    /// Text to convert, or @path to read it from a file
    #[arg(required_unless_present = "list_voices")]
    text: Option<String>,

    /// Output MP3 file path
    #[arg(required_unless_present = "list_voices")]
    output: Option<PathBuf>,

    /// Language code (vi, en, ja, ko, zh-CN, fr, de, es)
    lang: Option<String>,

    /// Speed multiplier (0.5 = slow, 1.0 = normal, 1.5 = fast)
    speed: Option<String>,
}

fn fail(message: impl Into<String>) -> ! {
    let result = ConversionResult::failure(message);
    result.emit();
    exit(1);
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion => {
            e.exit()
        }
        Err(_) => fail(USAGE),
    };

    // The transcoder is a hard requirement; report it missing before any
    // conversion work starts.
    if let Err(e) = transform::ensure_available() {
        fail(e.to_string());
    }

    let backend = match GttsBackend::new() {
        Ok(backend) => Arc::new(backend),
        Err(e) => fail(e.to_string()),
    };

    if cli.list_voices {
        match serde_json::to_string(&backend.list_voices()) {
            Ok(line) => println!("{}", line),
            Err(e) => fail(e.to_string()),
        }
        return;
    }

    let (raw_text, output_path) = match (cli.text, cli.output) {
        (Some(text), Some(output)) => (text, output),
        _ => fail(USAGE),
    };

    let text = match input::resolve_text(&raw_text, cli.base64) {
        Ok(text) => text,
        Err(e) => fail(e.to_string()),
    };

    let default_lang = SETTINGS
        .read()
        .map(|s| s.gtts_lang.clone())
        .unwrap_or_else(|_| gtts::DEFAULT_LANG.to_string());

    let request = ConversionRequest {
        text,
        output_path,
        voice: cli.lang.unwrap_or(default_lang),
        speed: rate::parse_speed(cli.speed.as_deref().unwrap_or("1.0")),
    };

    let result = run_conversion(backend, gtts::profile(), request).await;
    result.emit();
    exit(result.exit_code());
}
