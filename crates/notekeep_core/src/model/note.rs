//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its closed tag enumeration.
//! - Provide the pre-insert draft shape and boundary validation helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `created_at` is assigned once by the store and never modified.
//! - `tags` holds enumeration members only; `BTreeSet` makes duplicates
//!   impossible by construction and iteration order deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Minimum accepted character count for `title` and `text`.
pub const FIELD_MIN_CHARS: usize = 2;
/// Maximum accepted character count for `title` and `text`.
pub const FIELD_MAX_CHARS: usize = 255;

/// Stable identifier for every persisted note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Closed categorization set attached to notes.
///
/// The wire and storage spelling is the uppercase variant name; anything
/// outside this enumeration is rejected by both serde and the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteTag {
    Business,
    Personal,
    Important,
}

/// Canonical persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID assigned by the store at insert time.
    pub id: NoteId,
    /// Short display title, 2..=255 characters, never blank.
    pub title: String,
    /// Body text, 2..=255 characters, never blank. Subject of word analysis.
    pub text: String,
    /// Creation instant in Unix epoch milliseconds. Set once by the store.
    pub created_at: i64,
    /// Tag set drawn from [`NoteTag`]; may be empty.
    pub tags: BTreeSet<NoteTag>,
}

/// A note before the store has assigned `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub tags: BTreeSet<NoteTag>,
}

impl NoteDraft {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        tags: BTreeSet<NoteTag>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            tags,
        }
    }

    /// Checks the boundary field constraints for this draft.
    ///
    /// The core service never calls this; the inbound boundary must, before
    /// handing the data to the service. The storage schema enforces the same
    /// bounds independently, so drafts that skip this check still cannot be
    /// persisted out of range.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        validate_text(&self.text)?;
        Ok(())
    }
}

/// Field-constraint violations reported to the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// Body text is empty or whitespace-only.
    BlankText,
    /// Title character count is outside 2..=255.
    TitleLength { chars: usize },
    /// Body text character count is outside 2..=255.
    TextLength { chars: usize },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title cannot be blank"),
            Self::BlankText => write!(f, "text cannot be blank"),
            Self::TitleLength { chars } => write!(
                f,
                "title must be {FIELD_MIN_CHARS}..={FIELD_MAX_CHARS} characters, got {chars}"
            ),
            Self::TextLength { chars } => write!(
                f,
                "text must be {FIELD_MIN_CHARS}..={FIELD_MAX_CHARS} characters, got {chars}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Validates the `title` field constraints. Blank wins over length.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::BlankTitle);
    }
    let chars = title.chars().count();
    if !(FIELD_MIN_CHARS..=FIELD_MAX_CHARS).contains(&chars) {
        return Err(NoteValidationError::TitleLength { chars });
    }
    Ok(())
}

/// Validates the `text` field constraints. Blank wins over length.
pub fn validate_text(text: &str) -> Result<(), NoteValidationError> {
    if text.trim().is_empty() {
        return Err(NoteValidationError::BlankText);
    }
    let chars = text.chars().count();
    if !(FIELD_MIN_CHARS..=FIELD_MAX_CHARS).contains(&chars) {
        return Err(NoteValidationError::TextLength { chars });
    }
    Ok(())
}
