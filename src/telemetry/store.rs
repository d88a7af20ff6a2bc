//! In-process metrics store.
//!
//! Mirrors what is emitted through the `metrics` facade so the embedding
//! service can export gateway counters without installing a recorder.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Snapshot of all metrics at a point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: HashMap<String, u64>,
    pub gauges: HashMap<String, f64>,
    pub histograms: HashMap<String, HistogramSummary>,
}

impl MetricsSnapshot {
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

/// Summary statistics for a histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

struct HistogramData {
    count: AtomicU64,
    sum: AtomicU64, // f64 bits
    min: AtomicU64, // f64 bits
    max: AtomicU64, // f64 bits
}

impl HistogramData {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(f64::to_bits(0.0)),
            min: AtomicU64::new(f64::to_bits(f64::MAX)),
            max: AtomicU64::new(f64::to_bits(f64::MIN)),
        }
    }

    fn record(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        update_f64(&self.sum, |current| Some(current + value));
        update_f64(&self.min, |current| (value < current).then_some(value));
        update_f64(&self.max, |current| (value > current).then_some(value));
    }

    fn to_summary(&self) -> HistogramSummary {
        let count = self.count.load(Ordering::Relaxed);
        let sum = f64::from_bits(self.sum.load(Ordering::Relaxed));
        let min = f64::from_bits(self.min.load(Ordering::Relaxed));
        let max = f64::from_bits(self.max.load(Ordering::Relaxed));

        HistogramSummary {
            count,
            sum,
            min: if count == 0 { 0.0 } else { min },
            max: if count == 0 { 0.0 } else { max },
        }
    }
}

/// CAS loop over an f64 stored as bits. `f` returns None to leave it as is.
fn update_f64(atomic: &AtomicU64, f: impl Fn(f64) -> Option<f64>) {
    let _ = atomic.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
        f(f64::from_bits(bits)).map(f64::to_bits)
    });
}

/// Thread-safe metrics store keyed by metric name.
pub struct MetricsStore {
    counters: RwLock<HashMap<String, AtomicU64>>,
    gauges: RwLock<HashMap<String, AtomicU64>>,
    histograms: RwLock<HashMap<String, HistogramData>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
        }
    }

    /// Increment a counter by the given value.
    pub fn increment_counter(&self, name: &str, value: u64) {
        if let Some(counter) = self.counters.read().get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        self.counters
            .write()
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Set a gauge to the given value.
    pub fn set_gauge(&self, name: &str, value: f64) {
        if let Some(gauge) = self.gauges.read().get(name) {
            gauge.store(f64::to_bits(value), Ordering::Relaxed);
            return;
        }
        self.gauges
            .write()
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .store(f64::to_bits(value), Ordering::Relaxed);
    }

    /// Record a histogram observation.
    pub fn record_histogram(&self, name: &str, value: f64) {
        if let Some(histogram) = self.histograms.read().get(name) {
            histogram.record(value);
            return;
        }
        self.histograms
            .write()
            .entry(name.to_string())
            .or_insert_with(HistogramData::new)
            .record(value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
                .collect(),
            gauges: self
                .gauges
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), f64::from_bits(v.load(Ordering::Relaxed))))
                .collect(),
            histograms: self
                .histograms
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.to_summary()))
                .collect(),
        }
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}
