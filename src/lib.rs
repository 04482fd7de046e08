//! # barangay
//!
//! Status lifecycle engine and in-memory records for a barangay
//! administrative dashboard.
//!
//! Complaints and public works projects move through closed status sets.
//! The lifecycle engine decides what each move does to the status-derived
//! fields; the dashboard applies its patches to pluggable entity stores and
//! records an event stream, with tracing and OpenTelemetry observability.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod model;
pub mod seed;
pub mod store;
pub mod telemetry;
