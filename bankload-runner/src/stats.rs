//! Request statistics, aggregated per endpoint label

use crate::error::{RunnerError, RunnerResult};
use bankload_http::{ApiResponse, HttpError};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// One finished request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// HTTP status, `None` when the request failed before a response
    pub status: Option<u16>,
    pub elapsed: Duration,
    pub success: bool,
}

impl Sample {
    pub fn from_result(result: &Result<ApiResponse, HttpError>, elapsed: Duration) -> Self {
        match result {
            Ok(response) => Self {
                status: Some(response.status),
                elapsed,
                success: response.is_success(),
            },
            Err(_) => Self {
                status: None,
                elapsed,
                success: false,
            },
        }
    }
}

/// Lowest and highest trackable latency in microseconds, at three
/// significant digits. Slower samples saturate at the top bucket.
const LATENCY_LOW_US: u64 = 1;
const LATENCY_HIGH_US: u64 = 60_000_000;
const LATENCY_SIGFIG: u8 = 3;

#[derive(Clone)]
struct LabelAccumulator {
    requests: u64,
    failures: u64,
    transport_errors: u64,
    latencies_us: Histogram<u64>,
    status_codes: BTreeMap<u16, u64>,
}

impl LabelAccumulator {
    fn new(template: &Histogram<u64>) -> Self {
        Self {
            requests: 0,
            failures: 0,
            transport_errors: 0,
            latencies_us: Histogram::new_from(template),
            status_codes: BTreeMap::new(),
        }
    }

    fn record(&mut self, sample: Sample) {
        self.requests += 1;
        if !sample.success {
            self.failures += 1;
        }
        match sample.status {
            Some(status) => *self.status_codes.entry(status).or_insert(0) += 1,
            None => self.transport_errors += 1,
        }
        let elapsed_us = u64::try_from(sample.elapsed.as_micros()).unwrap_or(u64::MAX);
        self.latencies_us.saturating_record(elapsed_us);
    }

    fn merge(&mut self, other: &LabelAccumulator) {
        self.requests += other.requests;
        self.failures += other.failures;
        self.transport_errors += other.transport_errors;
        for (status, count) in &other.status_codes {
            *self.status_codes.entry(*status).or_insert(0) += count;
        }
        if let Err(e) = self.latencies_us.add(&other.latencies_us) {
            warn!("Failed to merge latencies: {:?}", e);
        }
    }

    fn report(&self, label: &str) -> LabelReport {
        let hist = &self.latencies_us;
        let mut report = LabelReport {
            label: label.to_string(),
            requests: self.requests,
            failures: self.failures,
            transport_errors: self.transport_errors,
            min_ms: 0.0,
            avg_ms: 0.0,
            max_ms: 0.0,
            p50_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            status_codes: self.status_codes.clone(),
        };

        if self.requests > 0 {
            report.min_ms = to_ms(hist.min());
            report.max_ms = to_ms(hist.max());
            report.avg_ms = hist.mean() / 1000.0;
            report.p50_ms = to_ms(hist.value_at_quantile(0.50));
            report.p95_ms = to_ms(hist.value_at_quantile(0.95));
            report.p99_ms = to_ms(hist.value_at_quantile(0.99));
        }

        report
    }
}

/// Thread-safe sample sink shared by every user of a run.
///
/// Latencies go into a fixed-size histogram per label, so memory does not
/// grow with the number of requests.
pub struct RequestStats {
    template: Histogram<u64>,
    labels: Mutex<HashMap<String, LabelAccumulator>>,
}

impl RequestStats {
    pub fn new() -> RunnerResult<Self> {
        let template = Histogram::new_with_bounds(LATENCY_LOW_US, LATENCY_HIGH_US, LATENCY_SIGFIG)
            .map_err(|e| RunnerError::Histogram(format!("{:?}", e)))?;
        Ok(Self {
            template,
            labels: Mutex::new(HashMap::new()),
        })
    }

    pub fn record(&self, label: &str, sample: Sample) {
        let mut labels = self.labels.lock();
        match labels.get_mut(label) {
            Some(acc) => acc.record(sample),
            None => {
                let mut acc = LabelAccumulator::new(&self.template);
                acc.record(sample);
                labels.insert(label.to_string(), acc);
            }
        }
    }

    /// Number of samples recorded under `label`
    pub fn count(&self, label: &str) -> u64 {
        self.labels
            .lock()
            .get(label)
            .map(|acc| acc.requests)
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> StatsReport {
        // Copy out so recording is not blocked while quantiles are computed
        let labels: Vec<(String, LabelAccumulator)> = self
            .labels
            .lock()
            .iter()
            .map(|(label, acc)| (label.clone(), acc.clone()))
            .collect();

        let mut all = LabelAccumulator::new(&self.template);
        let mut reports: Vec<LabelReport> = labels
            .iter()
            .map(|(label, acc)| {
                all.merge(acc);
                acc.report(label)
            })
            .collect();
        reports.sort_by(|a, b| a.label.cmp(&b.label));

        StatsReport {
            labels: reports,
            total: all.report("Aggregated"),
        }
    }
}

impl fmt::Debug for RequestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestStats")
            .field("labels", &self.labels.lock().len())
            .finish()
    }
}

/// Aggregates for one label. Latencies are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelReport {
    pub label: String,
    pub requests: u64,
    pub failures: u64,
    pub transport_errors: u64,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub status_codes: BTreeMap<u16, u64>,
}

impl LabelReport {
    pub fn error_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.failures as f64 / self.requests as f64
        }
    }
}

fn to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

/// Point-in-time view of [`RequestStats`], labels sorted by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub labels: Vec<LabelReport>,
    pub total: LabelReport,
}

impl StatsReport {
    pub fn label(&self, label: &str) -> Option<&LabelReport> {
        self.labels.iter().find(|r| r.label == label)
    }

    pub fn requests_per_second(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total.requests as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>8} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Name", "Reqs", "Fails", "Avg(ms)", "Min(ms)", "Max(ms)", "p50(ms)", "p95(ms)", "p99(ms)"
        )?;
        writeln!(f, "{}", "-".repeat(102))?;
        for row in self.labels.iter().chain(std::iter::once(&self.total)) {
            writeln!(
                f,
                "{:<20} {:>8} {:>8} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>9.1}",
                row.label,
                row.requests,
                row.failures,
                row.avg_ms,
                row.min_ms,
                row.max_ms,
                row.p50_ms,
                row.p95_ms,
                row.p99_ms
            )?;
        }
        Ok(())
    }
}
