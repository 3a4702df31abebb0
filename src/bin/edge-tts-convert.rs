//! edge-tts-convert - text to MP3 through the Edge neural voice service.
//!
//! Emits exactly one JSON result object on stdout; exit code 0 iff the
//! conversion succeeded.

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use tts_convert::backends::edge::{self, EdgeBackend};
use tts_convert::backends::SpeechBackend;
use tts_convert::config_loader::SETTINGS;
use tts_convert::convert::{run_conversion, ConversionRequest};
use tts_convert::input;
use tts_convert::rate;
use tts_convert::report::ConversionResult;

const USAGE: &str = "Usage: edge-tts-convert [--base64] 'text' 'output.mp3' [voice] [speed]";

/// Convert text to speech (MP3) using Edge neural voices
#[derive(Parser)]
#[command(name = "edge-tts-convert")]
#[command(version)]
#[command(about = "Convert text to speech (MP3) using Edge neural voices", long_about = None)]
struct Cli {
    /// Treat TEXT as base64-encoded UTF-8
    #[arg(long)]
    base64: bool,

    /// Print the voice catalog as JSON and exit
    #[arg(long)]
    list_voices: bool,

    /// Text to convert, or @path to read it from a file
    #[arg(required_unless_present = "list_voices")]
    text: Option<String>,

    /// Output MP3 file path
    #[arg(required_unless_present = "list_voices")]
    output: Option<PathBuf>,

    /// Voice name (e.g. vi-VN-HoaiMyNeural)
    voice: Option<String>,

    /// Speed multiplier (0.5 = slow, 1.0 = normal, 2.0 = fast)
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

    let backend = Arc::new(EdgeBackend::new());

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

    let default_voice = SETTINGS
        .read()
        .map(|s| s.edge_voice.clone())
        .unwrap_or_else(|_| edge::DEFAULT_VOICE.to_string());

    let request = ConversionRequest {
        text,
        output_path,
        voice: cli.voice.unwrap_or(default_voice),
        speed: rate::parse_speed(cli.speed.as_deref().unwrap_or("1.0")),
    };

    let result = run_conversion(backend, edge::profile(), request).await;
    result.emit();
    exit(result.exit_code());
}
