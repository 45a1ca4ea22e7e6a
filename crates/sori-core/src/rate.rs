//! Speaking-rate overrides in edge-tts notation (`"+0%"`, `"-20%"`).

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static RE_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)(\d{1,3})%$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("rate must look like \"+10%\" or \"-20%\", got {0:?}")]
    Malformed(String),
    #[error("rate {0:?} would stop speech entirely")]
    OutOfRange(String),
}

/// Convert a percentage rate to a speed multiplier (`"-20%"` → `0.8`).
pub fn rate_to_speed(rate: &str) -> Result<f32, RateError> {
    let caps = RE_RATE
        .captures(rate.trim())
        .ok_or_else(|| RateError::Malformed(rate.to_string()))?;
    let magnitude: f32 = caps[2]
        .parse()
        .map_err(|_| RateError::Malformed(rate.to_string()))?;
    let percent = if &caps[1] == "-" { -magnitude } else { magnitude };

    let speed = 1.0 + percent / 100.0;
    if speed <= 0.0 {
        return Err(RateError::OutOfRange(rate.to_string()));
    }
    Ok(speed)
}
