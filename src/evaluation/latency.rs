//! Wall-clock latency tracking for search calls, summarized as percentiles.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Summary of recorded latencies, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Records wall-clock durations of calls.
#[derive(Debug, Clone, Default)]
pub struct LatencyTracker {
    latencies: Vec<f64>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, record how long it took and return its output with the
    /// latency in milliseconds.
    pub fn measure<F, R>(&mut self, f: F) -> (R, f64)
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let output = f();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.latencies.push(latency_ms);
        (output, latency_ms)
    }

    /// Record an externally measured latency.
    pub fn record(&mut self, latency_ms: f64) {
        self.latencies.push(latency_ms);
    }

    pub fn latencies(&self) -> &[f64] {
        &self.latencies
    }

    /// All zeros when nothing has been recorded.
    ///
    /// Percentiles take `sorted[floor(n * p)]`.
    pub fn stats(&self) -> LatencyStats {
        let n = self.latencies.len();
        if n == 0 {
            return LatencyStats::default();
        }

        let mut sorted = self.latencies.clone();
        sorted.sort_by(f64::total_cmp);

        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let percentile = |p: f64| sorted[((n as f64 * p) as usize).min(n - 1)];

        LatencyStats {
            mean: sorted.iter().sum::<f64>() / n as f64,
            median,
            p95: percentile(0.95),
            p99: percentile(0.99),
            min: sorted[0],
            max: sorted[n - 1],
            count: n,
        }
    }

    pub fn reset(&mut self) {
        self.latencies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        assert_eq!(LatencyTracker::new().stats(), LatencyStats::default());
    }

    #[test]
    fn test_stats() {
        let mut tracker = LatencyTracker::new();
        for latency in (1..=20).rev() {
            tracker.record(latency as f64);
        }
        let stats = tracker.stats();
        assert_eq!(stats.count, 20);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 20.0);
        assert_eq!(stats.mean, 10.5);
        assert_eq!(stats.median, 10.5);
        // floor(20 * 0.95) = 19 -> 20.0; floor(20 * 0.99) = 19 -> 20.0
        assert_eq!(stats.p95, 20.0);
        assert_eq!(stats.p99, 20.0);
    }

    #[test]
    fn test_odd_median() {
        let mut tracker = LatencyTracker::new();
        for latency in [5.0, 1.0, 3.0] {
            tracker.record(latency);
        }
        assert_eq!(tracker.stats().median, 3.0);
    }

    #[test]
    fn test_measure_and_reset() {
        let mut tracker = LatencyTracker::new();
        let (value, latency) = tracker.measure(|| 6 * 7);
        assert_eq!(value, 42);
        assert!(latency >= 0.0);
        assert_eq!(tracker.stats().count, 1);

        tracker.reset();
        assert_eq!(tracker.stats().count, 0);
    }
}
