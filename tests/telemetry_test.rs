//! Integration tests for telemetry initialization and span helpers.

use uuid::Uuid;

#[test]
fn telemetry_initializes_without_endpoint() {
    // Note: tracing subscriber can only be set once per process.
    // Using try_init() in the implementation avoids panics if another
    // test already initialized a subscriber.
    let config = barangay::telemetry::TelemetryConfig::new("barangay-test");
    // This may return Err if a global subscriber was already set by
    // another test in this process; that is acceptable.
    let _guard = barangay::telemetry::init_telemetry(config);
}

#[test]
fn transition_span_records_outcome() {
    let id = Uuid::new_v4();
    let span = barangay::telemetry::lifecycle::start_transition_span("complaint", &id, "resolved");
    barangay::telemetry::lifecycle::record_outcome(&span, "in_progress", "needs_input");
}

#[test]
fn progress_span_creates() {
    let id = Uuid::new_v4();
    let _span = barangay::telemetry::lifecycle::start_progress_span("append", &id);
}

#[test]
fn metric_instruments_build_without_provider() {
    barangay::telemetry::metrics::transitions_applied().add(1, &[]);
    barangay::telemetry::metrics::progress_operations().add(1, &[]);
}
