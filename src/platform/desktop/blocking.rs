use tracing::trace_span;

/// Marks a backend round-trip on the UI thread. Everything inside runs to
/// completion before the next event is processed; the span makes the
/// suspension boundary visible under RUST_LOG=trace.
pub fn run_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = trace_span!("backend_round_trip");
    let _guard = span.enter();
    f()
}
