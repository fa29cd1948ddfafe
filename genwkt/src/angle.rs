//! Parsing and formatting of geographic angles.
//!
//! Angles are accepted either as decimal degrees (`"30.0002885"`) or as
//! whitespace separated degrees, minutes and seconds (`"29 59 59,91779"`).
//! A comma is accepted as the decimal separator in both forms.

use crate::error::{GeoError, Result};

/// Parses an angle given in decimal degrees or as `D M S` text.
///
/// The sign of the degrees token applies to the whole angle, so
/// `"-0 30 0"` is half a degree west/south.
pub fn parse_angle(text: &str) -> Result<f64> {
    let normalized = text.replace(',', ".");
    let trimmed = normalized.trim();

    if let Ok(value) = trimmed.parse::<f64>() {
        if !value.is_finite() {
            return Err(GeoError::parse(text, "angle is not a finite number"));
        }
        return Ok(value);
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(GeoError::parse(
            text,
            "expected decimal degrees or 'D M S'",
        ));
    }
    let mut values = [0.0f64; 3];
    for (slot, token) in values.iter_mut().zip(&parts) {
        *slot = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GeoError::parse(text, format!("'{}' is not a number", token)))?;
    }
    let [d, m, s] = values;
    let sign = if d.is_sign_negative() { -1.0 } else { 1.0 };
    let result = sign * (d.abs() + m / 60.0 + s / 3600.0);
    log::debug!("parsed DMS '{}' as {}", text, result);
    Ok(result)
}

/// Formats decimal degrees as `"D MM SS.sssss"`.
///
/// Seconds are rounded to five decimals with carry into minutes and degrees.
/// Only the degrees field carries the sign.
pub fn format_angle(degrees: f64) -> String {
    let negative = degrees.is_sign_negative();
    let value = degrees.abs();

    let mut d = value.trunc() as u64;
    let minutes_full = (value - d as f64) * 60.0;
    let mut m = minutes_full.trunc() as u64;
    let mut s = ((minutes_full - m as f64) * 60.0 * 1e5).round() / 1e5;

    if s >= 60.0 {
        s = 0.0;
        m += 1;
    }
    if m >= 60 {
        m = 0;
        d += 1;
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{} {:02} {:08.5}", sign, d, m, s)
}
