// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Bounded sample storage for per-message timings.
//!
//! A [`SampleBuffer`] holds at most `capacity` samples. What happens past
//! that point is an explicit [`OverflowPolicy`], and every sample that was
//! discarded is counted.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of samples kept per metric.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 1000;

/// What to do with a new sample once the buffer is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest sample to make room (ring buffer)
    #[default]
    DropOldest,
    /// Keep the first `capacity` samples and discard the rest
    StopRecording,
}

/// Fixed-capacity sample store.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
    policy: OverflowPolicy,
    dropped: u64,
}

impl SampleBuffer {
    /// Create a buffer. A zero capacity is treated as one.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            policy,
            dropped: 0,
        }
    }

    /// Record a sample, applying the overflow policy if full.
    pub fn record(&mut self, sample: f64) {
        if self.samples.len() < self.capacity {
            self.samples.push_back(sample);
            return;
        }

        self.dropped += 1;
        match self.policy {
            OverflowPolicy::DropOldest => {
                self.samples.pop_front();
                self.samples.push_back(sample);
            }
            OverflowPolicy::StopRecording => {}
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Samples discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Arithmetic mean of retained samples.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Statistical summary of retained samples.
    pub fn summary(&self) -> SampleSummary {
        SampleSummary::from_samples(self.samples.iter().copied(), self.dropped)
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAPACITY, OverflowPolicy::default())
    }
}

/// Distribution summary of a set of samples (unit is the caller's, usually ms).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub dropped: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl SampleSummary {
    pub fn from_samples(samples: impl IntoIterator<Item = f64>, dropped: u64) -> Self {
        let mut sorted: Vec<f64> = samples.into_iter().filter(|s| !s.is_nan()).collect();
        if sorted.is_empty() {
            return Self {
                dropped,
                ..Self::default()
            };
        }

        sorted.sort_by(f64::total_cmp);
        let len = sorted.len();
        let percentile = |p: f64| sorted[((len as f64 * p) as usize).min(len - 1)];

        Self {
            count: len,
            dropped,
            min: sorted[0],
            max: sorted[len - 1],
            mean: sorted.iter().sum::<f64>() / len as f64,
            p50: sorted[len / 2],
            p95: percentile(0.95),
            p99: percentile(0.99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_oldest_keeps_latest() {
        let mut buf = SampleBuffer::new(3, OverflowPolicy::DropOldest);
        for v in 1..=5 {
            buf.record(v as f64);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.dropped(), 2);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_stop_recording_keeps_first() {
        let mut buf = SampleBuffer::new(3, OverflowPolicy::StopRecording);
        for v in 1..=5 {
            buf.record(v as f64);
        }
        assert_eq!(buf.dropped(), 2);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_default_capacity() {
        let buf = SampleBuffer::default();
        assert_eq!(buf.capacity(), 1000);
        assert_eq!(buf.policy(), OverflowPolicy::DropOldest);
        assert!(buf.mean().is_none());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut buf = SampleBuffer::new(0, OverflowPolicy::StopRecording);
        buf.record(1.0);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_summary() {
        let mut buf = SampleBuffer::new(100, OverflowPolicy::DropOldest);
        for v in 1..=10 {
            buf.record(v as f64 * 10.0);
        }
        let summary = buf.summary();
        assert_eq!(summary.count, 10);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.p50, 60.0);
        assert_eq!(summary.p99, 100.0);
        assert!((summary.mean - 55.0).abs() < 1e-9);
        assert_eq!(buf.mean(), Some(55.0));
    }

    #[test]
    fn test_summary_empty() {
        let summary = SampleSummary::from_samples(Vec::new(), 4);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.dropped, 4);
        assert_eq!(summary.mean, 0.0);
    }

    #[test]
    fn test_negative_samples_allowed() {
        // Clock skew between hosts can make latency negative
        let summary = SampleSummary::from_samples(vec![-2.0, 1.0, 4.0], 0);
        assert_eq!(summary.min, -2.0);
        assert_eq!(summary.mean, 1.0);
    }
}
