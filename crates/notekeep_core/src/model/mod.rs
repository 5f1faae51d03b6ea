//! Domain model for the note-keeping core.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep boundary validation rules next to the shapes they constrain.
//!
//! # Invariants
//! - Every domain object is identified by a stable `NoteId`.
//! - Field constraints live here; enforcement points are the boundary and
//!   the storage schema, never the service.

pub mod note;
