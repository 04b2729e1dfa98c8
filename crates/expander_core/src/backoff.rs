use std::time::Duration;

/// Delay before retry number `attempt` (1-based): `2^(attempt-1)` seconds,
/// clamped to `[min, max]`. `min` wins when the bounds are inverted.
pub fn backoff_delay(attempt: u32, min: Duration, max: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(32);
    let raw = Duration::from_secs(1u64 << exponent);
    raw.min(max).max(min)
}

/// Maps a unit sample `u` in `[0, 1]` onto the pacing interval `[min, max]`.
pub fn pacing_delay(min: Duration, max: Duration, u: f64) -> Duration {
    if max <= min {
        return min;
    }
    let span = (max - min).as_secs_f64();
    min + Duration::from_secs_f64(span * u.clamp(0.0, 1.0))
}
