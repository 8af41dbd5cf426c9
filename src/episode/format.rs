// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::api::RawDuration;
use crate::error::TransformError;

/// Abbreviated month names, Portuguese (Brazil)
const PT_BR_MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Parse an ISO-8601 timestamp into UTC
///
/// Accepts RFC 3339 with an offset, and the offset-less forms the API
/// also emits (`T` or space separator, optional fraction, or a bare date),
/// which are taken as UTC.
pub fn parse_published_at(date_str: &str) -> Result<DateTime<Utc>, String> {
    let date_str = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for format in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| e.to_string())
}

/// Format a publish timestamp as `d MMM yy`, e.g. `5 Mar 22`
pub fn format_published_at(id: &str, date_str: &str) -> Result<String, TransformError> {
    let dt = parse_published_at(date_str).map_err(|reason| TransformError::InvalidDate {
        id: id.to_string(),
        date_str: date_str.to_string(),
        reason,
    })?;

    Ok(format!(
        "{} {} {}",
        dt.day(),
        PT_BR_MONTHS[dt.month0() as usize],
        dt.format("%y")
    ))
}

/// Convert a raw duration into whole seconds
///
/// Fractions are truncated. An empty string counts as zero; negative or
/// non-numeric values are rejected.
pub fn parse_duration(id: &str, raw: &RawDuration) -> Result<u64, TransformError> {
    let invalid = || TransformError::InvalidDuration {
        id: id.to_string(),
        raw: raw.to_string(),
    };

    match raw {
        RawDuration::Number(n) => match n.as_u64() {
            Some(seconds) => Ok(seconds),
            None => n.as_f64().and_then(whole_seconds).ok_or_else(invalid),
        },
        RawDuration::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_seconds))
                .ok_or_else(invalid)
        }
    }
}

fn whole_seconds(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

/// Render a duration in seconds as `HH:MM:SS`
pub fn duration_to_time_string(duration: u64) -> String {
    let hours = duration / 3600;
    let minutes = (duration % 3600) / 60;
    let seconds = duration % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
