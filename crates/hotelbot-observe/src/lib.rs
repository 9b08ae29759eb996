//! Observability setup shared by hotelbot binaries.

pub mod tracing_setup;
