use std::time::Duration;

/// Round a seconds value to microsecond precision.
///
/// Header durations are stored at this resolution so repeated repairs
/// produce identical text.
pub fn round_micros(secs: f64) -> f64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0.0;
    }
    (secs * 1_000_000.0).round() / 1_000_000.0
}

/// Convert a non-negative seconds value to a `Duration`, saturating on junk input.
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Format seconds as a compact human-readable duration ("1h 2m 3s", "4.2s").
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    if secs < 60.0 {
        return format!("{:.1}s", secs);
    }

    let total = secs as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
