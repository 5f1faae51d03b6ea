//! Boundary DTOs and note translation.
//!
//! # Responsibility
//! - Define the request/response shapes exchanged with the inbound boundary.
//! - Map between those shapes and the domain [`Note`] record.
//!
//! # Invariants
//! - Translation is total and pure: no validation, no I/O, no failure modes.
//! - `note_from_update` never changes `id` or `created_at`.
//! - Wire field spelling is camelCase (`createdDate`); tag spelling is the
//!   uppercase enumeration name.

use crate::model::note::{Note, NoteDraft, NoteId, NoteTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inbound payload for note creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    pub text: String,
    /// Absent tags mean "no tags", not "keep previous".
    #[serde(default)]
    pub tags: BTreeSet<NoteTag>,
}

/// Inbound payload for note replacement. Same shape as creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: BTreeSet<NoteTag>,
}

/// Creation result projection: identity plus assigned creation instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteResponse {
    pub id: NoteId,
    pub created_date: i64,
}

/// Update result projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteResponse {
    pub id: NoteId,
    pub title: String,
    pub tags: BTreeSet<NoteTag>,
}

/// Minimal identity-and-timestamp view used for point fetches and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNoteResponse {
    pub id: NoteId,
    pub created_date: i64,
}

/// Builds the pre-insert draft from a create request.
///
/// `id` and `created_at` stay unset; the store assigns both.
pub fn draft_from_create(request: &CreateNoteRequest) -> NoteDraft {
    NoteDraft {
        title: request.title.clone(),
        text: request.text.clone(),
        tags: request.tags.clone(),
    }
}

/// Merges an update request over an existing note.
///
/// Produces the full replacement record: `title`, `text` and the tag set come
/// from the request, `id` and `created_at` carry over from `existing`.
pub fn note_from_update(existing: &Note, request: &UpdateNoteRequest) -> Note {
    Note {
        id: existing.id,
        title: request.title.clone(),
        text: request.text.clone(),
        created_at: existing.created_at,
        tags: request.tags.clone(),
    }
}

pub fn to_create_response(note: &Note) -> CreateNoteResponse {
    CreateNoteResponse {
        id: note.id,
        created_date: note.created_at,
    }
}

pub fn to_update_response(note: &Note) -> UpdateNoteResponse {
    UpdateNoteResponse {
        id: note.id,
        title: note.title.clone(),
        tags: note.tags.clone(),
    }
}

pub fn to_fetch_response(note: &Note) -> FetchNoteResponse {
    FetchNoteResponse {
        id: note.id,
        created_date: note.created_at,
    }
}

/// Projects a listing page into fetch-shaped entries, preserving order.
pub fn to_fetch_responses(notes: &[Note]) -> Vec<FetchNoteResponse> {
    notes.iter().map(to_fetch_response).collect()
}
