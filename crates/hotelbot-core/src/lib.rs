//! Repository trait definitions and the conversation service.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements. It depends only on `hotelbot-types` -- never on
//! `hotelbot-infra` or any database/IO crate.

pub mod chat;
pub mod repository;
