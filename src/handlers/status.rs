//! Status and health check handlers for the Stockwatch service.
//!
//! This module provides HTTP endpoints for monitoring service health:
//! - `/status` - Detailed service status with runtime metrics
//! - `/health` - Simple health check for systemd/load balancers
//! - `/ready` - Readiness probe
//!
//! # Example Response
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "uptime_seconds": 3600,
//!   "webhooks_received": 1024,
//!   "alerts_sent": 12,
//!   "memory": {
//!     "rss_bytes": 52428800,
//!     "virtual_bytes": 268435456
//!   },
//!   "latency": {
//!     "p50_ms": 12.5,
//!     "p95_ms": 45.2,
//!     "p99_ms": 98.7
//!   }
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, instrument};

/// Service version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name from Cargo.toml
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Response Types
// ============================================================================

/// Health check response for simple liveness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (always "healthy" if responding)
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Detailed service status response with runtime metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Service version (from Cargo.toml)
    pub version: String,

    /// Service name
    pub name: String,

    /// Service uptime in seconds
    pub uptime_seconds: u64,

    /// Total webhook deliveries received
    pub webhooks_received: u64,

    /// Total low-stock alert emails sent
    pub alerts_sent: u64,

    /// Total pipeline failures (alerts lost to transport errors)
    pub pipeline_failures: u64,

    /// Total unexpected processing errors
    pub errors: u64,

    /// Memory usage metrics
    pub memory: MemoryMetrics,

    /// Delivery handling latency statistics (percentiles)
    pub latency: LatencyMetrics,

    /// Service status (always "running" if responding)
    pub status: String,

    /// ISO8601 timestamp of when status was generated
    pub timestamp: String,
}

/// Memory usage metrics collected from sysinfo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Resident Set Size - actual physical memory used (bytes)
    pub rss_bytes: u64,

    /// Virtual memory size (bytes)
    pub virtual_bytes: u64,
}

/// Delivery latency percentile metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// 50th percentile (median) latency in milliseconds
    pub p50_ms: f64,

    /// 95th percentile latency in milliseconds
    pub p95_ms: f64,

    /// 99th percentile latency in milliseconds
    pub p99_ms: f64,

    /// Total number of deliveries recorded
    pub total_requests: u64,

    /// Mean latency in milliseconds
    pub mean_ms: f64,

    /// Maximum latency recorded in milliseconds
    pub max_ms: f64,
}

// ============================================================================
// Latency Histogram
// ============================================================================

/// Thread-safe latency histogram for recording delivery timings.
///
/// Tracks latencies from 1us to 60 seconds with 3 significant figures.
#[derive(Debug)]
pub struct LatencyHistogram {
    inner: RwLock<Histogram<u64>>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    pub fn new() -> Self {
        let histogram =
            Histogram::new_with_bounds(1, 60_000_000, 3).expect("Failed to create histogram");
        Self {
            inner: RwLock::new(histogram),
        }
    }

    /// Record a latency value in microseconds.
    ///
    /// Values outside the histogram bounds are silently ignored.
    pub fn record(&self, latency_us: u64) {
        let mut hist = self.inner.write();
        let _ = hist.record(latency_us);
    }

    /// Record a latency duration.
    pub fn record_duration(&self, duration: std::time::Duration) {
        self.record(duration.as_micros() as u64);
    }

    /// Get the total count of recorded values.
    pub fn count(&self) -> u64 {
        self.inner.read().len()
    }

    /// Get complete latency metrics with percentiles in milliseconds.
    pub fn metrics(&self) -> LatencyMetrics {
        let hist = self.inner.read();
        LatencyMetrics {
            p50_ms: hist.value_at_percentile(50.0) as f64 / 1000.0,
            p95_ms: hist.value_at_percentile(95.0) as f64 / 1000.0,
            p99_ms: hist.value_at_percentile(99.0) as f64 / 1000.0,
            total_requests: hist.len(),
            mean_ms: hist.mean() / 1000.0,
            max_ms: hist.max() as f64 / 1000.0,
        }
    }

    /// Reset the histogram, clearing all recorded values.
    pub fn reset(&self) {
        self.inner.write().reset();
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for metrics and status tracking.
///
/// All fields are thread-safe and can be accessed concurrently: counters
/// are atomics, the histogram sits behind a `parking_lot::RwLock`.
#[derive(Debug)]
pub struct AppState {
    /// Service start time for uptime calculation
    start_time: Instant,

    /// Total webhook deliveries received
    webhooks_received: AtomicU64,

    /// Total alert emails sent
    alerts_sent: AtomicU64,

    /// Total alerts lost to transport failures
    pipeline_failures: AtomicU64,

    /// Total unexpected processing errors
    error_count: AtomicU64,

    /// Delivery handling latency histogram
    latency_histogram: LatencyHistogram,
}

impl AppState {
    /// Create a new AppState instance with zeroed counters.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            webhooks_received: AtomicU64::new(0),
            alerts_sent: AtomicU64::new(0),
            pipeline_failures: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            latency_histogram: LatencyHistogram::new(),
        }
    }

    /// Get the service uptime in seconds.
    #[inline]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Increment the delivery counter and return the new value.
    #[inline]
    pub fn record_webhook(&self) -> u64 {
        self.webhooks_received.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get the total number of webhook deliveries received.
    #[inline]
    pub fn webhooks_received(&self) -> u64 {
        self.webhooks_received.load(Ordering::Relaxed)
    }

    /// Increment the alerts-sent counter and return the new value.
    #[inline]
    pub fn record_alert(&self) -> u64 {
        self.alerts_sent.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get the total number of alerts sent.
    #[inline]
    pub fn alerts_sent(&self) -> u64 {
        self.alerts_sent.load(Ordering::Relaxed)
    }

    /// Record an alert lost to a transport failure.
    #[inline]
    pub fn record_pipeline_failure(&self) -> u64 {
        self.pipeline_failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get the total number of pipeline failures.
    #[inline]
    pub fn pipeline_failures(&self) -> u64 {
        self.pipeline_failures.load(Ordering::Relaxed)
    }

    /// Record an unexpected processing error.
    #[inline]
    pub fn record_error(&self) -> u64 {
        self.error_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get the total error count.
    #[inline]
    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Record a delivery handling latency.
    #[inline]
    pub fn record_latency(&self, duration: std::time::Duration) {
        self.latency_histogram.record_duration(duration);
    }

    /// Get the latency metrics.
    #[inline]
    pub fn latency_metrics(&self) -> LatencyMetrics {
        self.latency_histogram.metrics()
    }

    /// Reset all metrics (useful for testing).
    pub fn reset_metrics(&self) {
        self.webhooks_received.store(0, Ordering::Relaxed);
        self.alerts_sent.store(0, Ordering::Relaxed);
        self.pipeline_failures.store(0, Ordering::Relaxed);
        self.error_count.store(0, Ordering::Relaxed);
        self.latency_histogram.reset();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// System Metrics Collection
// ============================================================================

/// Collect memory metrics for the current process using sysinfo.
fn collect_memory_metrics() -> MemoryMetrics {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    match system.process(pid) {
        Some(process) => MemoryMetrics {
            rss_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
        },
        None => {
            debug!("Could not find current process in sysinfo");
            MemoryMetrics::default()
        }
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

/// Health check endpoint handler.
///
/// # Route
/// `GET /health`
///
/// # Response
/// - `200 OK` - Always, if the service is running
#[instrument(skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    debug!("Health check requested");
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// Detailed status endpoint handler.
///
/// # Route
/// `GET /status`
///
/// # Response
/// - `200 OK` with JSON [`StatusResponse`]
#[instrument(skip_all)]
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Status check requested");

    let memory = collect_memory_metrics();
    let latency = state.latency_metrics();

    let response = StatusResponse {
        version: SERVER_VERSION.to_string(),
        name: SERVER_NAME.to_string(),
        uptime_seconds: state.uptime_seconds(),
        webhooks_received: state.webhooks_received(),
        alerts_sent: state.alerts_sent(),
        pipeline_failures: state.pipeline_failures(),
        errors: state.error_count(),
        memory,
        latency,
        status: "running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check endpoint handler.
///
/// # Route
/// `GET /ready`
#[instrument(skip_all)]
pub async fn readiness_handler() -> impl IntoResponse {
    debug!("Readiness check requested");
    (StatusCode::OK, Json(HealthResponse::default()))
}

// ============================================================================
// Router Setup
// ============================================================================

/// Create the status router with all health and status endpoints.
///
/// # Routes
/// - `GET /health` - Simple health check
/// - `GET /status` - Detailed status with metrics
/// - `GET /ready` - Readiness probe
pub fn status_router(state: Arc<AppState>) -> axum::Router<Arc<AppState>> {
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/ready", get(readiness_handler))
        .with_state(state)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_default() {
        let health = HealthResponse::default();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn test_app_state_new() {
        let state = AppState::new();
        assert_eq!(state.webhooks_received(), 0);
        assert_eq!(state.alerts_sent(), 0);
        assert!(state.uptime_seconds() < 1);
    }

    #[test]
    fn test_app_state_counters() {
        let state = AppState::new();

        assert_eq!(state.record_webhook(), 1);
        assert_eq!(state.record_webhook(), 2);
        assert_eq!(state.webhooks_received(), 2);

        assert_eq!(state.record_alert(), 1);
        assert_eq!(state.alerts_sent(), 1);

        assert_eq!(state.record_pipeline_failure(), 1);
        assert_eq!(state.record_error(), 1);
    }

    #[test]
    fn test_latency_histogram() {
        let histogram = LatencyHistogram::new();

        histogram.record(1000); // 1ms
        histogram.record(5000); // 5ms
        histogram.record(50000); // 50ms

        assert_eq!(histogram.count(), 3);

        let metrics = histogram.metrics();
        assert!(metrics.p50_ms > 0.0);
        assert!(metrics.p95_ms >= metrics.p50_ms);
        assert!(metrics.p99_ms >= metrics.p95_ms);
    }

    #[test]
    fn test_app_state_reset_metrics() {
        let state = AppState::new();

        state.record_webhook();
        state.record_alert();
        state.record_latency(std::time::Duration::from_millis(5));
        state.record_error();

        state.reset_metrics();

        assert_eq!(state.webhooks_received(), 0);
        assert_eq!(state.alerts_sent(), 0);
        assert_eq!(state.error_count(), 0);
        assert_eq!(state.latency_metrics().total_requests, 0);
    }

    #[test]
    fn test_collect_memory_metrics() {
        // Should not panic; RSS should be non-zero for a running process
        let metrics = collect_memory_metrics();
        assert!(metrics.rss_bytes > 0);
    }

    #[test]
    fn test_status_response_serialization() {
        let response = StatusResponse {
            version: "0.1.0".to_string(),
            name: "stockwatch".to_string(),
            uptime_seconds: 3600,
            webhooks_received: 100,
            alerts_sent: 3,
            pipeline_failures: 1,
            errors: 0,
            memory: MemoryMetrics::default(),
            latency: LatencyMetrics::default(),
            status: "running".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&response).expect("Failed to serialize");
        assert!(json.contains("\"webhooks_received\":100"));
        assert!(json.contains("\"alerts_sent\":3"));
        assert!(json.contains("\"status\":\"running\""));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_handler() {
        let state = Arc::new(AppState::new());
        state.record_webhook();
        state.record_latency(std::time::Duration::from_millis(5));

        let response = status_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_app_state_thread_safety() {
        use std::thread;

        let state = Arc::new(AppState::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let state_clone = Arc::clone(&state);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    state_clone.record_webhook();
                    state_clone.record_latency(std::time::Duration::from_micros(500));
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(state.webhooks_received(), 10_000);
        assert_eq!(state.latency_metrics().total_requests, 10_000);
    }
}
