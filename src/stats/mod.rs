//! Latency aggregation and throughput calculation
//!
//! Latency samples go through a [`LatencySampler`] that collects successes and
//! counts failures separately; only a run where every sample failed is an
//! error. Transfer rates are derived from a payload size and the
//! client-observed wall clock of one round trip.

use crate::{
    error::{AppError, Result},
    models::metrics::{LatencyResult, TransferResult},
};

/// Bytes per kilobyte used for every size conversion
pub const BYTES_PER_KB: u64 = 1024;

/// Collects latency samples for one run
#[derive(Debug, Clone)]
pub struct LatencySampler {
    requested: u32,
    samples: Vec<u64>,
    failures: Vec<String>,
}

impl LatencySampler {
    /// Create a sampler for a run of `requested` pings
    pub fn new(requested: u32) -> Self {
        Self {
            requested,
            samples: Vec::with_capacity(requested as usize),
            failures: Vec::new(),
        }
    }

    /// Record a successful round trip in milliseconds
    pub fn record_success(&mut self, elapsed_ms: u64) {
        self.samples.push(elapsed_ms);
    }

    /// Record a failed ping; it is excluded from the aggregate
    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.failures.push(reason.into());
    }

    pub fn success_count(&self) -> usize {
        self.samples.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Reduce the collected samples into a [`LatencyResult`]
    ///
    /// `n_samples` is the requested count, whatever number succeeded.
    pub fn finish(&self) -> Result<LatencyResult> {
        let min = self.samples.iter().copied().min();
        let max = self.samples.iter().copied().max();

        match (min, max) {
            (Some(min), Some(max)) => {
                let sum: u64 = self.samples.iter().sum();
                let mean = sum as f64 / self.samples.len() as f64;

                Ok(LatencyResult {
                    average: mean.round() as u64,
                    min,
                    max,
                    n_samples: self.requested,
                })
            }
            _ => {
                let detail = match self.failures.last() {
                    Some(last) => format!(
                        "All ping attempts failed ({} of {}); last error: {}",
                        self.failures.len(),
                        self.requested,
                        last
                    ),
                    None => "All ping attempts failed: no successful samples".to_string(),
                };
                Err(AppError::statistics(detail))
            }
        }
    }
}

/// Throughput derived from one transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferRate {
    /// Duration the rate was computed over, never zero
    pub effective_ms: u64,
    pub speed_bps: u64,
    pub speed_kbps: u64,
    pub speed_mbps: f64,
}

impl TransferRate {
    /// Compute the rate for `size_bytes` moved in `elapsed_ms`
    ///
    /// A zero duration is treated as one millisecond, which caps the rate
    /// instead of dividing by zero. Each unit is derived from the rounded
    /// value of the previous one.
    pub fn compute(size_bytes: u64, elapsed_ms: u64) -> Self {
        let effective_ms = elapsed_ms.max(1);
        let bytes_per_sec = size_bytes as f64 / (effective_ms as f64 / 1000.0);

        let speed_bps = bytes_per_sec.round() as u64;
        let speed_kbps = (speed_bps as f64 * 8.0 / 1000.0).round() as u64;
        let speed_mbps = round_to(speed_kbps as f64 / 1000.0, 2);

        Self {
            effective_ms,
            speed_bps,
            speed_kbps,
            speed_mbps,
        }
    }
}

/// Build a [`TransferResult`] from a transfer of `size_kb` kilobytes
pub fn transfer_result(size_kb: u64, elapsed_ms: u64) -> TransferResult {
    let rate = TransferRate::compute(size_kb.saturating_mul(BYTES_PER_KB), elapsed_ms);

    TransferResult {
        size_kb,
        requested_size_kb: None,
        transfer_time_ms: rate.effective_ms,
        speed_bps: rate.speed_bps,
        speed_kbps: rate.speed_kbps,
        speed_mbps: rate.speed_mbps,
        server_processing_time: None,
    }
}

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_latency_aggregate() {
        let mut sampler = LatencySampler::new(5);
        for ms in [10, 12, 11, 15, 13] {
            sampler.record_success(ms);
        }

        let result = sampler.finish().unwrap();
        assert_eq!(result.average, 12);
        assert_eq!(result.min, 10);
        assert_eq!(result.max, 15);
        assert_eq!(result.n_samples, 5);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let mut sampler = LatencySampler::new(2);
        sampler.record_success(10);
        sampler.record_success(11);
        assert_eq!(sampler.finish().unwrap().average, 11);
    }

    #[test]
    fn test_failed_samples_are_excluded_not_zero_filled() {
        let mut sampler = LatencySampler::new(5);
        sampler.record_success(40);
        sampler.record_failure("connection refused");
        sampler.record_success(60);
        sampler.record_failure("timed out");
        sampler.record_failure("timed out");

        let result = sampler.finish().unwrap();
        assert_eq!(result.min, 40);
        assert_eq!(result.average, 50);
        assert_eq!(result.n_samples, 5);
        assert_eq!(sampler.success_count(), 2);
        assert_eq!(sampler.failure_count(), 3);
    }

    #[test]
    fn test_all_failures_is_an_error() {
        let mut sampler = LatencySampler::new(3);
        for _ in 0..3 {
            sampler.record_failure("connection refused");
        }

        let error = sampler.finish().unwrap_err();
        assert!(matches!(error, AppError::Statistics(_)));
        assert!(error.to_string().contains("All ping attempts failed"));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_empty_run_is_an_error() {
        let sampler = LatencySampler::new(0);
        assert!(sampler.finish().is_err());
    }

    #[test]
    fn test_transfer_rate_known_values() {
        // 1000 KB in 500 ms
        let rate = TransferRate::compute(1000 * 1024, 500);
        assert_eq!(rate.speed_bps, 2_048_000);
        assert_eq!(rate.speed_kbps, 16_384);
        assert_eq!(rate.speed_mbps, 16.38);
        assert_eq!(rate.effective_ms, 500);
    }

    #[test]
    fn test_zero_duration_is_capped() {
        let rate = TransferRate::compute(1024, 0);
        assert_eq!(rate.effective_ms, 1);
        assert_eq!(rate.speed_bps, 1_024_000);
        assert!(rate.speed_mbps.is_finite());
    }

    #[test]
    fn test_transfer_result_from_measurement() {
        let result = transfer_result(50, 100);
        assert_eq!(result.size_kb, 50);
        assert_eq!(result.transfer_time_ms, 100);
        assert_eq!(result.speed_bps, 512_000);
        assert_eq!(result.speed_kbps, 4_096);
        assert_eq!(result.speed_mbps, 4.1);
        assert!(result.requested_size_kb.is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(16.384, 2), 16.38);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(2.0, 2), 2.0);
    }

    proptest! {
        #[test]
        fn prop_latency_bounds(samples in prop::collection::vec(0u64..10_000, 1..50), extra_failures in 0u32..10) {
            let requested = samples.len() as u32 + extra_failures;
            let mut sampler = LatencySampler::new(requested);
            for ms in &samples {
                sampler.record_success(*ms);
            }
            for _ in 0..extra_failures {
                sampler.record_failure("dropped");
            }

            let result = sampler.finish().unwrap();
            prop_assert!(result.min <= result.average);
            prop_assert!(result.average <= result.max);
            prop_assert_eq!(result.n_samples, requested);
        }

        #[test]
        fn prop_rate_conversions_chain(size_kb in 1u64..20_000, elapsed_ms in 1u64..600_000) {
            let rate = TransferRate::compute(size_kb * BYTES_PER_KB, elapsed_ms);
            prop_assert_eq!(rate.speed_kbps, (rate.speed_bps as f64 * 8.0 / 1000.0).round() as u64);
            prop_assert_eq!(rate.speed_mbps, round_to(rate.speed_kbps as f64 / 1000.0, 2));
        }
    }
}
