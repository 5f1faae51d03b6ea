//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and analyzer calls into use-case level APIs.
//! - Keep the inbound boundary decoupled from storage details.

pub mod note_service;
