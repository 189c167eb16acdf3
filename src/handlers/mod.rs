//! HTTP handlers for service health and status endpoints.

pub mod status;

pub use status::{status_router, AppState, HealthResponse, LatencyHistogram, StatusResponse};
