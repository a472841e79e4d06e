//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
///
/// Halves round away from zero.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round half toward positive infinity, the way browser `Math.round` does.
///
/// Only differs from [`round_f64_to_i32`] on negative halves (-2.5 → -2).
#[must_use]
pub fn round_half_up_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    round_f64_to_i32((value + 0.5).floor())
}

/// Convert a length to f64 for distance math.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Format meters as kilometres with one decimal place.
#[must_use]
pub fn format_km(meters: f64) -> String {
    if !meters.is_finite() {
        return "0.0 km".to_string();
    }
    format!("{:.1} km", meters / 1_000.0)
}

/// Format a duration in seconds as `{h}h {m}m`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0h 0m".to_string();
    }
    let total_minutes = cast::<f64, u64>((seconds / 60.0).round()).unwrap_or(0);
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn half_up_matches_browser_rounding() {
        assert_eq!(round_half_up_to_i32(2.5), 3);
        assert_eq!(round_half_up_to_i32(-2.5), -2);
        assert_eq!(round_half_up_to_i32(-2.6), -3);
        assert_eq!(round_half_up_to_i32(f64::NAN), 0);
    }

    #[test]
    fn formats_distance_and_duration() {
        assert_eq!(format_km(12_345.0), "12.3 km");
        assert_eq!(format_km(f64::INFINITY), "0.0 km");
        assert_eq!(format_duration(3_900.0), "1h 5m");
        assert_eq!(format_duration(-1.0), "0h 0m");
    }
}
