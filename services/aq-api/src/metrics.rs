//! Prometheus metric names and recording helpers.

use std::time::Instant;

use metrics::{counter, histogram};
use storage::CacheOutcome;

pub const REQUESTS_TOTAL: &str = "aq_requests_total";
pub const REQUEST_ERRORS_TOTAL: &str = "aq_request_errors_total";
pub const REQUEST_DURATION_MS: &str = "aq_request_duration_ms";
pub const RASTER_CACHE_HITS: &str = "raster_cache_hits_total";
pub const RASTER_CACHE_MISSES: &str = "raster_cache_misses_total";
pub const POINT_QUERIES_TOTAL: &str = "point_queries_total";

/// Times one handler invocation and records it on [`finish`](Self::finish).
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn start(endpoint: &'static str) -> Self {
        counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    pub fn finish(self, success: bool) {
        let elapsed = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(REQUEST_DURATION_MS, "endpoint" => self.endpoint).record(elapsed);
        if !success {
            counter!(REQUEST_ERRORS_TOTAL, "endpoint" => self.endpoint).increment(1);
        }
    }
}

pub fn record_cache_outcome(outcome: CacheOutcome) {
    match outcome {
        CacheOutcome::Hit => counter!(RASTER_CACHE_HITS).increment(1),
        CacheOutcome::Miss => counter!(RASTER_CACHE_MISSES).increment(1),
    }
}

/// Count a point query by source and by whether a value came back.
pub fn record_point_query(source: &'static str, found: bool) {
    let result = if found { "value" } else { "no_data" };
    counter!(POINT_QUERIES_TOTAL, "source" => source, "result" => result).increment(1);
}
