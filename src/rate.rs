use std::fmt;

/// Speaking rate as a signed percent offset from the engine's normal rate.
/// `+0%` is normal, `+100%` is twice as fast, `-50%` is half speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate(i32);

impl Rate {
    pub const BASELINE: Rate = Rate(0);

    /// Convert a human-facing speed multiplier into a rate offset.
    ///
    /// Speed-ups cap at +100%. Slow-downs saturate at a magnitude of 50:
    /// any multiplier below 1.0 maps to at least -50%, and multipliers far
    /// below the engine's real range still report the formula value
    /// (0.4 gives -60%).
    pub fn from_speed(speed: f64) -> Self {
        if !speed.is_finite() || speed == 1.0 {
            return Rate(0);
        }
        if speed > 1.0 {
            let percent = ((speed - 1.0) * 100.0).round() as i64;
            Rate(percent.min(100) as i32)
        } else {
            let percent = ((1.0 - speed) * 100.0).round() as i64;
            Rate(-(percent.max(50)) as i32)
        }
    }

    /// Lenient parse of a pre-formatted rate string.
    ///
    /// Empty input and the legacy multiplier literals `1` / `1.0` normalize
    /// to baseline; so does anything unparseable. `+25%` and `-50%` parse
    /// verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "1" || trimmed == "1.0" {
            return Rate(0);
        }
        let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);
        digits.parse::<i32>().map(Rate).unwrap_or(Rate(0))
    }

    pub fn percent(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "{}%", self.0)
        } else {
            write!(f, "+{}%", self.0)
        }
    }
}

/// Parse a speed multiplier argument, silently falling back to 1.0 for
/// absent or non-numeric input.
pub fn parse_speed(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
        .unwrap_or(1.0)
}

/// Bound a playback-speed multiplier to the post-processing range.
pub fn clamp_playback(speed: f64) -> f64 {
    speed.clamp(0.5, 2.0)
}
