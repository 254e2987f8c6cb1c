use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::RwLock;

const MAX_DURATION_SAMPLES: usize = 1000;

#[derive(Clone, Default)]
pub struct Metrics {
    pub update_checks: Arc<AtomicU64>,
    pub updates_found: Arc<AtomicU64>,
    pub bad_requests: Arc<AtomicU64>,
    pub devices_not_found: Arc<AtomicU64>,
    pub failures: Arc<AtomicU64>,
    pub request_durations: Arc<RwLock<Vec<f64>>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_update_checks(&self) {
        self.update_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updates_found(&self) {
        self.updates_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bad_requests(&self) {
        self.bad_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.devices_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a duration in seconds, keeping at most the latest
    /// `MAX_DURATION_SAMPLES` entries.
    pub async fn record_request_duration(&self, duration: f64) {
        let mut durations = self.request_durations.write().await;
        durations.push(duration);
        if durations.len() > MAX_DURATION_SAMPLES {
            let excess = durations.len() - MAX_DURATION_SAMPLES;
            durations.drain(0..excess);
        }
    }

    pub async fn get_stats(&self) -> HashMap<String, String> {
        let counters = [
            ("update_checks_total", &self.update_checks),
            ("updates_found_total", &self.updates_found),
            ("bad_requests_total", &self.bad_requests),
            ("devices_not_found_total", &self.devices_not_found),
            ("failures_total", &self.failures),
        ];
        let mut stats: HashMap<String, String> = counters
            .iter()
            .map(|(name, counter)| (name.to_string(), counter.load(Ordering::Relaxed).to_string()))
            .collect();

        let durations = self.request_durations.read().await;
        if !durations.is_empty() {
            let avg = durations.iter().sum::<f64>() / durations.len() as f64;
            stats.insert("avg_request_duration_ms".to_string(), (avg * 1000.0).to_string());
        }

        stats
    }

    /// Prometheus text exposition of [`Metrics::get_stats`], sorted by name.
    pub async fn render(&self) -> String {
        let mut stats: Vec<_> = self.get_stats().await.into_iter().collect();
        stats.sort();

        let mut output = String::new();
        for (key, value) in stats {
            let kind = if key.ends_with("_total") { "counter" } else { "gauge" };
            output.push_str(&format!("# TYPE {} {}\n", key, kind));
            output.push_str(&format!("{} {}\n", key, value));
        }
        output
    }
}

/// Process-wide metrics, installed by [`initialize_metrics`]. Handlers skip
/// recording until then.
static METRICS: Lazy<RwLock<Option<Metrics>>> = Lazy::new(RwLock::default);

/// Installs a fresh set of counters and returns a handle to it.
pub async fn initialize_metrics() -> Metrics {
    let metrics = Metrics::new();
    *METRICS.write().await = Some(metrics.clone());
    metrics
}

pub async fn get_metrics() -> Option<Metrics> {
    METRICS.read().await.clone()
}
