//! Infrastructure layer for the hotel-booking chatbot store.
//!
//! Contains the SQLite implementations of the repository traits defined in
//! `hotelbot-core`, the connection pool and embedded migrations, and the
//! `config.toml` loader.

pub mod config;
pub mod sqlite;
