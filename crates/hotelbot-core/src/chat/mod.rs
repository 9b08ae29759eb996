//! Session and message persistence plus the service that ties the
//! conversation aggregate together.

pub mod repository;
pub mod service;
