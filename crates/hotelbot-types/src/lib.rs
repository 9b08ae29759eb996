//! Shared domain types for the hotel-booking chatbot store.
//!
//! Chat sessions, messages, search preferences, hotel recommendations and
//! click analytics, plus the write-time validation and error types used by
//! every repository.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, url, thiserror.

pub mod config;
pub mod error;
pub mod message;
pub mod money;
pub mod preference;
pub mod recommendation;
pub mod session;
pub mod validate;
