//! Metric instrument factories for barangay.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a provider these are no-ops.

use opentelemetry::metrics::{Counter, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("barangay")
}

/// Counter: applied status transitions.
/// Labels: `entity`, `from`, `to`.
pub fn transitions_applied() -> Counter<u64> {
    meter()
        .u64_counter("barangay.lifecycle.transitions")
        .with_description("Number of applied status transitions")
        .build()
}

/// Counter: transitions waiting on user input.
/// Labels: `entity`, `needs` ("scheduled_date" | "resolution_details").
pub fn transitions_deferred() -> Counter<u64> {
    meter()
        .u64_counter("barangay.lifecycle.deferred")
        .with_description("Number of transitions that asked for more input")
        .build()
}

/// Counter: refused transitions.
/// Labels: `entity`, `reason` ("invalid_target" | "invalid_payload").
pub fn transitions_rejected() -> Counter<u64> {
    meter()
        .u64_counter("barangay.lifecycle.rejected")
        .with_description("Number of rejected status transitions")
        .build()
}

/// Counter: project progress operations.
/// Labels: `operation` ("append" | "remove" | "percentage"), `result`.
pub fn progress_operations() -> Counter<u64> {
    meter()
        .u64_counter("barangay.progress.operations")
        .with_description("Number of project progress operations")
        .build()
}
