//! Status transition span helpers.
//!
//! One span per attempted transition; the outcome is filled in once the
//! engine has decided.

use tracing::Span;
use uuid::Uuid;

/// Start a span for a status transition attempt.
///
/// `transition.outcome` and `transition.from` are declared empty and set
/// later via [`record_outcome`].
pub fn start_transition_span(entity: &str, id: &Uuid, target: &str) -> Span {
    tracing::info_span!(
        "lifecycle.transition",
        "entity.kind" = entity,
        "entity.id" = %id,
        "transition.target" = target,
        "transition.from" = tracing::field::Empty,
        "transition.outcome" = tracing::field::Empty,
    )
}

/// Record the engine's decision on the span.
///
/// `outcome` is one of `applied`, `needs_input`, `rejected`.
pub fn record_outcome(span: &Span, from: &str, outcome: &str) {
    span.record("transition.from", from);
    span.record("transition.outcome", outcome);
}

/// Start a span for a progress operation (append, remove, percentage).
pub fn start_progress_span(operation: &str, id: &Uuid) -> Span {
    tracing::info_span!(
        "lifecycle.progress",
        "progress.operation" = operation,
        "entity.id" = %id,
    )
}
