//! Conversion between ISO-8601 time-only durations (`PT1H2M3.5S`) and
//! milliseconds.

use crate::error::{ModelError, ModelResult};

/// Parse a duration made of hour, minute and second components.
///
/// Year, month and day components are rejected.
pub fn duration_to_millis(duration: &str) -> ModelResult<i64> {
    let invalid = || ModelError::InvalidDuration(duration.to_string());
    let (negative, rest) = match duration.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, duration),
    };
    let rest = rest.strip_prefix('P').ok_or_else(invalid)?;
    let time = rest.strip_prefix('T').ok_or_else(invalid)?;

    let mut millis = 0f64;
    let mut number = String::new();
    let mut last_unit = 0u8;
    for ch in time.chars() {
        let (unit, scale) = match ch {
            '0'..='9' | '.' => {
                number.push(ch);
                continue;
            }
            'H' => (1, 3_600_000.0),
            'M' => (2, 60_000.0),
            'S' => (3, 1_000.0),
            _ => return Err(invalid()),
        };
        if unit <= last_unit || number.is_empty() {
            return Err(invalid());
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;
        millis += value * scale;
        number.clear();
        last_unit = unit;
    }
    if !number.is_empty() || last_unit == 0 {
        return Err(invalid());
    }

    let millis = millis.trunc() as i64;
    Ok(if negative { -millis } else { millis })
}

/// Render milliseconds as a duration, rounded to the nearest centisecond.
pub fn millis_to_duration(millis: i64) -> String {
    let centis = (millis as f64 / 10.0).round() as i64;
    let sign = if centis < 0 { "-" } else { "" };
    let centis = centis.abs();

    let hours = centis / 360_000;
    let minutes = (centis % 360_000) / 6_000;
    let seconds = centis % 6_000;

    let mut text = format!("{sign}PT");
    if hours > 0 {
        text.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        text.push_str(&format!("{minutes}M"));
    }
    let (whole, fraction) = (seconds / 100, seconds % 100);
    match fraction {
        0 => text.push_str(&format!("{whole}S")),
        f if f % 10 == 0 => text.push_str(&format!("{whole}.{}S", f / 10)),
        f => text.push_str(&format!("{whole}.{f:02}S")),
    }
    text
}
