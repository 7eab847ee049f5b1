//! Spreads a plan over a time budget so step spacing looks organic rather
//! than metronomic.

use rand::Rng;
use std::time::Duration;

/// Fraction of the per-step base interval each step may deviate by.
const JITTER_FRACTION: f64 = 0.2;

/// Draw the account's total activity window. A degenerate `min >= max`
/// window collapses to the fixed minimum.
pub fn random_window(min_minutes: u64, max_minutes: u64) -> Duration {
    if min_minutes >= max_minutes {
        return Duration::from_secs(min_minutes * 60);
    }
    let minutes = rand::thread_rng().gen_range(min_minutes..=max_minutes);
    Duration::from_secs(minutes * 60)
}

/// Split `total` into `n` per-step waits, each `total/n` with independent
/// uniform jitter of ±20%.
pub fn distribute_intervals(n: usize, total: Duration) -> Vec<Duration> {
    if n == 0 {
        return Vec::new();
    }

    let base = total.as_secs_f64() / n as f64;
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            let jitter = rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
            Duration::from_secs_f64((base * (1.0 + jitter)).max(0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_steps_yield_no_intervals() {
        assert!(distribute_intervals(0, Duration::from_secs(600)).is_empty());
    }

    #[test]
    fn test_interval_sum_stays_within_jitter_bound() {
        let total = Duration::from_secs(30 * 60);
        for n in [1usize, 7, 25] {
            let intervals = distribute_intervals(n, total);
            assert_eq!(intervals.len(), n);

            let base = total.as_secs_f64() / n as f64;
            for interval in &intervals {
                let secs = interval.as_secs_f64();
                assert!(secs >= base * (1.0 - JITTER_FRACTION) - 1e-6);
                assert!(secs <= base * (1.0 + JITTER_FRACTION) + 1e-6);
            }

            // Worst case every step jitters the same way: n * 0.2 * base each
            // side, so the sum stays within n * 0.4 * base of the budget.
            let sum: f64 = intervals.iter().map(Duration::as_secs_f64).sum();
            let bound = n as f64 * 2.0 * JITTER_FRACTION * base;
            assert!((sum - total.as_secs_f64()).abs() <= bound + 1e-6);
        }
    }

    #[test]
    fn test_degenerate_window_is_fixed_minimum() {
        assert_eq!(random_window(30, 30), Duration::from_secs(30 * 60));
        assert_eq!(random_window(40, 20), Duration::from_secs(40 * 60));
        let drawn = random_window(20, 40);
        assert!(drawn >= Duration::from_secs(20 * 60));
        assert!(drawn <= Duration::from_secs(40 * 60));
    }
}
