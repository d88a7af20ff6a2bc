//! Span utilities for request tracing.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for prediction request spans.
pub struct RequestSpan;

impl RequestSpan {
    /// Create a `predict` span.
    ///
    /// `slot` and `version` are filled in once routing has decided;
    /// `status`, `error.message` and `latency_ms` after the model returns.
    pub fn new(request_id: u64, batch_size: usize) -> Span {
        info_span!(
            "predict",
            request_id = request_id,
            batch_size = batch_size,
            slot = tracing::field::Empty,
            version = tracing::field::Empty,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}
