//! Core domain logic for the NoteKeep backend.
//! This crate is the single source of truth for business invariants.

pub mod analysis;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod translate;

pub use analysis::words::{
    into_sorted_entries, word_frequencies, TextAnalyzer, WordFrequencyAnalyzer,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    validate_text, validate_title, Note, NoteDraft, NoteId, NoteTag, NoteValidationError,
};
pub use repo::note_repo::{
    NoteRepository, NoteSort, PageRequest, RepoError, RepoResult, SortDirection, SortField,
    SqliteNoteRepository,
};
pub use service::note_service::{ListFilter, NoteService, NoteServiceError, NotesPage};
pub use translate::{
    CreateNoteRequest, CreateNoteResponse, FetchNoteResponse, UpdateNoteRequest,
    UpdateNoteResponse,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
