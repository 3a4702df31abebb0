use std::path::Path;
use std::process::{Command, Stdio};

use crate::config_loader::SETTINGS;
use crate::error::ConvertError;
use crate::rate::clamp_playback;

pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_FFPROBE: &str = "ffprobe";
pub const INSTALL_HINT: &str = "apt-get install ffmpeg";

// Used when the source sample rate cannot be probed; matches the MP3s the
// translate endpoint serves.
const FALLBACK_SAMPLE_RATE: u32 = 24_000;

fn ffmpeg_binary() -> String {
    SETTINGS
        .read()
        .map(|s| s.ffmpeg_binary.clone())
        .unwrap_or_else(|_| DEFAULT_FFMPEG.to_string())
}

fn ffprobe_binary() -> String {
    SETTINGS
        .read()
        .map(|s| s.ffprobe_binary.clone())
        .unwrap_or_else(|_| DEFAULT_FFPROBE.to_string())
}

/// Startup probe for the external transcoder. Called before any conversion
/// work so a missing tool surfaces as the dependency-missing failure rather
/// than a mid-conversion error.
pub fn ensure_available() -> Result<(), ConvertError> {
    let binary = ffmpeg_binary();
    let probe = Command::new(&binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match probe {
        Ok(status) if status.success() => Ok(()),
        _ => Err(ConvertError::MissingDependency {
            name: binary,
            remedy: INSTALL_HINT.to_string(),
        }),
    }
}

/// Re-encode `input` to `output` at a different playback speed, clamped to
/// [0.5, 2.0].
///
/// Speed-ups go through the tempo filter and change duration and
/// time-domain characteristics. Slow-downs use the declared-sample-rate
/// trick (lower the rate, resample back), which shifts pitch as a side
/// effect; that approximation is intentional.
///
/// The external process is waited on without a deadline.
pub fn change_speed(input: &Path, output: &Path, speed: f64) -> Result<(), ConvertError> {
    let speed = clamp_playback(speed);

    let filter = if speed > 1.0 {
        format!("atempo={}", speed)
    } else {
        let sample_rate = probe_sample_rate(input).unwrap_or(FALLBACK_SAMPLE_RATE);
        let lowered = (sample_rate as f64 * speed).round() as u32;
        format!("asetrate={},aresample={}", lowered, sample_rate)
    };

    let run = Command::new(ffmpeg_binary())
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input)
        .arg("-filter:a")
        .arg(&filter)
        .arg(output)
        .output()
        .map_err(|e| ConvertError::Transform(e.to_string()))?;

    if run.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&run.stderr);
        let detail = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("transcoder exited with an error")
            .to_string();
        Err(ConvertError::Transform(detail))
    }
}

fn probe_sample_rate(input: &Path) -> Option<u32> {
    let run = Command::new(ffprobe_binary())
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=sample_rate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .ok()?;

    if !run.status.success() {
        return None;
    }
    String::from_utf8_lossy(&run.stdout).trim().parse().ok()
}
