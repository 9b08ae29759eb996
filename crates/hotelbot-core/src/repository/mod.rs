//! Repository traits for the entities that hang off a chat session.

pub mod preference;
pub mod recommendation;
