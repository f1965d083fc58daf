//! Duration strings for the startup delay
//!
//! Accepts a signed sequence of decimal numbers, each with an optional
//! fraction and a required unit: `30s`, `5m`, `1h30m`, `1.5h`, `-2s`, `300ms`.
//! Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. The bare
//! literal `0` needs no unit.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest accepted magnitude, about 292 years
const MAX_NANOS: u128 = i64::MAX as u128;

/// Fraction digits beyond this cannot change the result at nanosecond precision
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration {0:?}: empty")]
    Empty(String),

    #[error("invalid duration {0:?}: expected a number")]
    InvalidNumber(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("invalid duration {0:?}: out of range")]
    Overflow(String),
}

/// A parsed startup delay
///
/// Keeps the sign of the input so a negative delay can be reported as given.
/// Zero and negative delays mean "start immediately".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupDelay {
    negative: bool,
    magnitude: Duration,
}

impl StartupDelay {
    pub const ZERO: StartupDelay = StartupDelay {
        negative: false,
        magnitude: Duration::ZERO,
    };

    pub const fn from_duration(duration: Duration) -> Self {
        Self {
            negative: false,
            magnitude: duration,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// How long to sleep before serving, `None` when the delay is not positive
    pub fn sleep_duration(&self) -> Option<Duration> {
        if self.negative || self.magnitude.is_zero() {
            None
        } else {
            Some(self.magnitude)
        }
    }
}

impl fmt::Display for StartupDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.magnitude.is_zero() {
            return f.write_str("0s");
        }
        if self.negative {
            f.write_str("-")?;
        }
        if self.magnitude < Duration::from_secs(1) {
            return write!(f, "{:?}", self.magnitude);
        }

        let total = self.magnitude.as_secs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{}m", minutes)?;
        }

        let nanos = self.magnitude.subsec_nanos();
        if nanos == 0 {
            write!(f, "{}s", seconds)
        } else {
            let fraction = format!("{:09}", nanos);
            write!(f, "{}.{}s", seconds, fraction.trim_end_matches('0'))
        }
    }
}

impl FromStr for StartupDelay {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parse a duration string such as `90s` or `1h30m`
pub fn parse_duration(input: &str) -> Result<StartupDelay, DurationError> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(StartupDelay::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::Empty(input.to_string()));
    }

    let overflow = || DurationError::Overflow(input.to_string());
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (whole, after) = rest.split_at(leading_digits(rest));
        let (fraction, after) = match after.strip_prefix('.') {
            Some(stripped) => stripped.split_at(leading_digits(stripped)),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(DurationError::InvalidNumber(input.to_string()));
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut term = whole.checked_mul(scale).ok_or_else(overflow)?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let value: u128 = digits.parse().map_err(|_| overflow())?;
            term = term
                .checked_add(value * scale / 10u128.pow(digits.len() as u32))
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(term).ok_or_else(overflow)?;
        if total > MAX_NANOS {
            return Err(overflow());
        }
        rest = after;
    }

    let magnitude = Duration::from_nanos(total as u64);
    Ok(StartupDelay {
        negative: negative && !magnitude.is_zero(),
        magnitude,
    })
}
