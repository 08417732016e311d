//! Timing Features - Inter-arrival statistics
//!
//! Chuyển danh sách timestamps thành IAT (inter-arrival times) và các
//! reducer thống kê. Mọi giá trị đều tính bằng microseconds.
//!
//! Degenerate inputs never error: every reducer resolves to `0.0`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeDelta, Utc};

/// Gap (µs) above which an IAT counts as idle.
///
/// NOTE: documented upstream as "1 second" but the value the classifier was
/// trained against is 500000 µs (0.5 s). Keep the literal until product
/// confirms otherwise.
pub const DEFAULT_IDLE_THRESHOLD_US: f64 = 500_000.0;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ============================================================================
// PARSING
// ============================================================================

/// Parse an ISO-8601 timestamp into an absolute time point.
///
/// Accepts the `fromisoformat` family: date, date + hour, minute, second or
/// fractional second, `T` or space separator, optional `Z` / `±HH:MM` /
/// `±HHMM` offset. Naive values are taken as UTC.
/// Precision is truncated to whole microseconds.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    parse_any(raw.trim()).map(|dt| dt.trunc_subsecs(6))
}

fn parse_any(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let rfc_err = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    let raw = normalize(raw);

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&raw, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(rfc_err)
}

/// Rewrite forms chrono cannot parse directly: a trailing `Z` becomes
/// `+00:00`, and an hour-only time (`YYYY-MM-DDTHH`) gains `:00` minutes.
fn normalize(raw: &str) -> String {
    let mut out = match raw.strip_suffix(['Z', 'z']) {
        Some(head) if head.len() > 10 => format!("{}+00:00", head),
        _ => raw.to_string(),
    };

    let bytes = out.as_bytes();
    let hour_only = bytes.len() >= 13
        && matches!(bytes[10], b'T' | b' ')
        && bytes[11].is_ascii_digit()
        && bytes[12].is_ascii_digit()
        && matches!(bytes.get(13), None | Some(b'+') | Some(b'-'));

    if hour_only {
        out.insert_str(13, ":00");
    }

    out
}

// ============================================================================
// INTER-ARRIVAL TIMES
// ============================================================================

fn delta_micros(delta: TimeDelta) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64,
        None => delta.num_milliseconds() as f64 * 1000.0,
    }
}

/// Consecutive gaps (µs) between time points after sorting ascending.
///
/// Input order is irrelevant; the result is never negative.
/// `points.len() <= 1` yields an empty sequence.
pub fn inter_arrival_times(points: &[DateTime<Utc>]) -> Vec<f64> {
    if points.len() <= 1 {
        return Vec::new();
    }

    let mut sorted = points.to_vec();
    sorted.sort();

    sorted
        .windows(2)
        .map(|pair| delta_micros(pair[1] - pair[0]))
        .collect()
}

/// IATs strictly greater than `threshold_us`.
pub fn idle_times(points: &[DateTime<Utc>], threshold_us: f64) -> Vec<f64> {
    inter_arrival_times(points)
        .into_iter()
        .filter(|&iat| iat > threshold_us)
        .collect()
}

/// Span between the earliest and latest time point, 0 with fewer than two.
pub fn flow_duration(points: &[DateTime<Utc>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    match (points.iter().min(), points.iter().max()) {
        (Some(first), Some(last)) => delta_micros(*last - *first),
        _ => 0.0,
    }
}

// ============================================================================
// REDUCERS
// ============================================================================

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Population standard deviation (divides by N). Needs at least two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
