//! Ping/status command models

/// Bot ping metrics and uptime information
#[derive(Debug)]
pub struct PingMetrics {
    pub response_roundtrip: u64,
    pub uptime: String,
    pub predict_endpoint: String,
}
