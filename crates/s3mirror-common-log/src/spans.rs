//! Tracing spans for mirroring calls and audit shipments.

use std::future::Future;
use tracing::{info_span, Instrument, Span};

/// Span covering one mirroring invocation.
pub fn mirror_span(operation: &str, bucket: &str) -> Span {
    info_span!(
        "mirror",
        op = %operation,
        bucket = %bucket,
        status = tracing::field::Empty,
        error = tracing::field::Empty
    )
}

/// Span covering one audit shipment.
pub fn shipment_span(operation: &str, bucket: &str) -> Span {
    info_span!(
        "ship",
        op = %operation,
        bucket = %bucket,
        enriched = tracing::field::Empty,
        error = tracing::field::Empty
    )
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}
