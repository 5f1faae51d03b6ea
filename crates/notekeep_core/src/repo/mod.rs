//! Persistence layer: repository contracts and their SQLite implementations.

pub mod note_repo;
