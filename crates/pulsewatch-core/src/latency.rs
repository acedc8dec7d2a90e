//! Trailing response-latency sample.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

/// Samples retained for the mean.
pub const LATENCY_CAPACITY: usize = 100;

/// Opaque handle returned at request start.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    started: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    /// Elapsed wall-clock time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

/// Bounded FIFO of request durations (ms). Oldest is evicted first.
#[derive(Debug)]
pub struct LatencyWindow {
    capacity: usize,
    samples: Mutex<VecDeque<f64>>,
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyWindow {
    pub fn new() -> Self {
        Self::with_capacity(LATENCY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn observe(&self, duration_ms: f64) {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            tracing::debug!(duration_ms, "ignoring invalid latency sample");
            return;
        }
        // A poisoned lock only means another observer panicked mid-push;
        // the deque itself is still consistent.
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(duration_ms);
    }

    /// Arithmetic mean rounded to 2 decimals, `0.0` when empty.
    pub fn mean(&self) -> f64 {
        let samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        if samples.is_empty() {
            return 0.0;
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        (mean * 100.0).round() / 100.0
    }

    pub fn len(&self) -> usize {
        self.samples.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
