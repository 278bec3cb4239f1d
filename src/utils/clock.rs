use lazy_static::lazy_static;
use std::time::Instant;

lazy_static! {
    static ref CLOCK_EPOCH: Instant = Instant::now();
}

/// Monotonic time in seconds since the process-local epoch.
///
/// The epoch is fixed on first use, so values are comparable across
/// the whole process lifetime and never go backwards. Subsystems never
/// read this directly inside the core; the controller samples it once
/// per tick and passes `now` down explicitly, which keeps the state
/// machine deterministic and testable with injected time.
pub fn monotonic_s() -> f64 {
    CLOCK_EPOCH.elapsed().as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_monotonic_never_decreases() {
        let first = monotonic_s();
        let second = monotonic_s();
        assert!(second >= first);
    }
}
