//! Note use-case service.
//!
//! # Responsibility
//! - Provide the create/update/delete/fetch/list APIs over notes.
//! - Derive word statistics for one note via the analyzer collaborator.
//! - Translate between boundary shapes and the domain record.
//!
//! # Invariants
//! - `update` uses full content replacement semantics and never touches
//!   `id` or `created_at`.
//! - `delete` treats a missing target as success.
//! - Listing order comes from the store's rendered sort; the service never
//!   re-sorts.
//! - Word statistics are returned in descending lexicographic key order.

use crate::analysis::words::{into_sorted_entries, TextAnalyzer};
use crate::model::note::{NoteId, NoteTag};
use crate::repo::note_repo::{normalize_page_size, NoteRepository, PageRequest, RepoError};
use crate::translate::{
    draft_from_create, note_from_update, to_create_response, to_fetch_response,
    to_fetch_responses, to_update_response, CreateNoteRequest, CreateNoteResponse,
    FetchNoteResponse, UpdateNoteRequest, UpdateNoteResponse,
};
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Listing scope, decided once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    /// Every note, regardless of tags.
    All,
    /// Notes whose tag set intersects the given set.
    Tags(BTreeSet<NoteTag>),
}

impl ListFilter {
    /// Folds an optional boundary filter parameter into an explicit scope.
    ///
    /// Absent and empty both mean unfiltered listing.
    pub fn from_tags(tags: Option<BTreeSet<NoteTag>>) -> Self {
        match tags {
            Some(tags) if !tags.is_empty() => Self::Tags(tags),
            _ => Self::All,
        }
    }
}

/// Listing envelope returned by [`NoteService::fetch_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesPage {
    /// Fetch-shaped entries in store order.
    pub items: Vec<FetchNoteResponse>,
    /// Effective normalized page size used by the query.
    pub applied_size: u32,
}

/// Note service facade over the store and analyzer collaborators.
pub struct NoteService<R: NoteRepository, A: TextAnalyzer> {
    repo: R,
    analyzer: A,
}

impl<R: NoteRepository, A: TextAnalyzer> NoteService<R, A> {
    /// Creates a service from explicit collaborators.
    pub fn new(repo: R, analyzer: A) -> Self {
        Self { repo, analyzer }
    }

    /// Creates one note; the store assigns `id` and `created_at`.
    pub fn create(
        &mut self,
        request: &CreateNoteRequest,
    ) -> Result<CreateNoteResponse, NoteServiceError> {
        info!("event=note_create module=service status=start");
        let draft = draft_from_create(request);
        let note = match self.repo.insert(&draft) {
            Ok(note) => note,
            Err(err) => {
                error!("event=note_create module=service status=error error={err}");
                return Err(err.into());
            }
        };

        info!(
            "event=note_create module=service status=ok id={} tags={}",
            note.id,
            note.tags.len()
        );
        Ok(to_create_response(&note))
    }

    /// Replaces `title`, `text` and the tag set of an existing note.
    pub fn update(
        &mut self,
        id: NoteId,
        request: &UpdateNoteRequest,
    ) -> Result<UpdateNoteResponse, NoteServiceError> {
        info!("event=note_update module=service status=start id={id}");
        let Some(existing) = self.repo.find_by_id(id)? else {
            error!("event=note_update module=service status=error id={id} error_code=note_not_found");
            return Err(NoteServiceError::NoteNotFound(id));
        };

        let merged = note_from_update(&existing, request);
        let stored = match self.repo.replace(&merged) {
            Ok(note) => note,
            Err(err) => {
                error!("event=note_update module=service status=error id={id} error={err}");
                return Err(err.into());
            }
        };

        info!("event=note_update module=service status=ok id={id}");
        Ok(to_update_response(&stored))
    }

    /// Deletes one note. Absence of the target is not an error.
    pub fn delete(&mut self, id: NoteId) -> Result<(), NoteServiceError> {
        info!("event=note_delete module=service status=start id={id}");
        if let Err(err) = self.repo.delete_by_id(id) {
            error!("event=note_delete module=service status=error id={id} error={err}");
            return Err(err.into());
        }

        info!("event=note_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Fetches the identity-and-timestamp view of one note.
    pub fn fetch_by_id(&self, id: NoteId) -> Result<FetchNoteResponse, NoteServiceError> {
        let note = self
            .repo
            .find_by_id(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        Ok(to_fetch_response(&note))
    }

    /// Fetches the raw body text of one note.
    pub fn fetch_text_by_id(&self, id: NoteId) -> Result<String, NoteServiceError> {
        let note = self
            .repo
            .find_by_id(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        Ok(note.text)
    }

    /// Computes word statistics over one note's text.
    ///
    /// Entries are ordered by key, descending lexicographically; counts come
    /// from the analyzer unchanged.
    pub fn fetch_unique_words(
        &self,
        id: NoteId,
    ) -> Result<Vec<(String, u64)>, NoteServiceError> {
        let note = self
            .repo
            .find_by_id(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        Ok(into_sorted_entries(self.analyzer.analyze(&note.text)))
    }

    /// Lists one page of notes under the given scope.
    ///
    /// Filtered and unfiltered listing honor the same page normalization and
    /// sort; entries arrive in store order.
    pub fn fetch_all(
        &self,
        filter: &ListFilter,
        page: &PageRequest,
    ) -> Result<NotesPage, NoteServiceError> {
        let notes = match filter {
            ListFilter::All => self.repo.list_page(page)?,
            ListFilter::Tags(tags) if tags.is_empty() => self.repo.list_page(page)?,
            ListFilter::Tags(tags) => self.repo.list_page_by_tags(tags, page)?,
        };

        Ok(NotesPage {
            items: to_fetch_responses(&notes),
            applied_size: normalize_page_size(page.size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ListFilter, NoteService, NoteServiceError};
    use crate::analysis::words::TextAnalyzer;
    use crate::model::note::{Note, NoteDraft, NoteId, NoteTag};
    use crate::repo::note_repo::{NoteRepository, PageRequest, RepoError, RepoResult};
    use crate::translate::{CreateNoteRequest, UpdateNoteRequest};
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};
    use std::rc::Rc;
    use uuid::Uuid;

    /// In-memory store double with call counters for the listing paths.
    #[derive(Default)]
    struct MemoryRepo {
        notes: Vec<Note>,
        clock: i64,
        list_page_calls: Rc<Cell<u32>>,
        list_by_tags_calls: Rc<Cell<u32>>,
    }

    impl MemoryRepo {
        fn with_notes(notes: Vec<Note>) -> Self {
            Self {
                notes,
                ..Self::default()
            }
        }
    }

    impl NoteRepository for MemoryRepo {
        fn insert(&mut self, draft: &NoteDraft) -> RepoResult<Note> {
            self.clock += 1;
            let note = Note {
                id: Uuid::new_v4(),
                title: draft.title.clone(),
                text: draft.text.clone(),
                created_at: self.clock,
                tags: draft.tags.clone(),
            };
            self.notes.push(note.clone());
            Ok(note)
        }

        fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
            Ok(self.notes.iter().find(|note| note.id == id).cloned())
        }

        fn replace(&mut self, note: &Note) -> RepoResult<Note> {
            let Some(stored) = self.notes.iter_mut().find(|stored| stored.id == note.id)
            else {
                return Err(RepoError::NotFound(note.id));
            };
            stored.title = note.title.clone();
            stored.text = note.text.clone();
            stored.tags = note.tags.clone();
            Ok(stored.clone())
        }

        fn delete_by_id(&mut self, id: NoteId) -> RepoResult<()> {
            self.notes.retain(|note| note.id != id);
            Ok(())
        }

        fn list_page(&self, _page: &PageRequest) -> RepoResult<Vec<Note>> {
            self.list_page_calls.set(self.list_page_calls.get() + 1);
            Ok(self.notes.clone())
        }

        fn list_page_by_tags(
            &self,
            tags: &BTreeSet<NoteTag>,
            _page: &PageRequest,
        ) -> RepoResult<Vec<Note>> {
            self.list_by_tags_calls.set(self.list_by_tags_calls.get() + 1);
            Ok(self
                .notes
                .iter()
                .filter(|note| !note.tags.is_disjoint(tags))
                .cloned()
                .collect())
        }
    }

    /// Analyzer double recording every text it was handed.
    struct StubAnalyzer {
        seen: Rc<RefCell<Vec<String>>>,
        canned: BTreeMap<String, u64>,
    }

    impl StubAnalyzer {
        fn silent() -> Self {
            Self {
                seen: Rc::new(RefCell::new(Vec::new())),
                canned: BTreeMap::new(),
            }
        }
    }

    impl TextAnalyzer for StubAnalyzer {
        fn analyze(&self, text: &str) -> BTreeMap<String, u64> {
            self.seen.borrow_mut().push(text.to_string());
            self.canned.clone()
        }
    }

    fn sample_note(text: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            title: "standup".to_string(),
            text: text.to_string(),
            created_at: 42,
            tags: BTreeSet::new(),
        }
    }

    fn create_request() -> CreateNoteRequest {
        CreateNoteRequest {
            title: "groceries".to_string(),
            text: "milk and bread".to_string(),
            tags: BTreeSet::from([NoteTag::Personal]),
        }
    }

    fn update_request() -> UpdateNoteRequest {
        UpdateNoteRequest {
            title: "errands".to_string(),
            text: "post office run".to_string(),
            tags: BTreeSet::from([NoteTag::Business]),
        }
    }

    #[test]
    fn absent_and_empty_filters_fold_to_all() {
        assert_eq!(ListFilter::from_tags(None), ListFilter::All);
        assert_eq!(ListFilter::from_tags(Some(BTreeSet::new())), ListFilter::All);
    }

    #[test]
    fn non_empty_filter_keeps_its_tags() {
        let filter = ListFilter::from_tags(Some(BTreeSet::from([NoteTag::Business])));
        assert_eq!(
            filter,
            ListFilter::Tags(BTreeSet::from([NoteTag::Business]))
        );
    }

    #[test]
    fn create_then_fetch_round_trips_store_assigned_identity() {
        let mut service = NoteService::new(MemoryRepo::default(), StubAnalyzer::silent());

        let created = service.create(&create_request()).expect("create should succeed");
        let fetched = service
            .fetch_by_id(created.id)
            .expect("created note should be fetchable");

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.created_date, created.created_date);
    }

    #[test]
    fn update_merges_over_existing_and_keeps_created_date() {
        let existing = sample_note("old body text");
        let id = existing.id;
        let mut service =
            NoteService::new(MemoryRepo::with_notes(vec![existing]), StubAnalyzer::silent());

        let updated = service
            .update(id, &update_request())
            .expect("update of existing note should succeed");
        assert_eq!(updated.id, id);
        assert_eq!(updated.title, "errands");
        assert_eq!(updated.tags, BTreeSet::from([NoteTag::Business]));

        let fetched = service.fetch_by_id(id).expect("note should still exist");
        assert_eq!(fetched.created_date, 42);
    }

    #[test]
    fn absent_id_is_not_found_for_lookups_but_not_delete() {
        let mut service = NoteService::new(MemoryRepo::default(), StubAnalyzer::silent());
        let missing = Uuid::new_v4();

        let update_err = service.update(missing, &update_request()).unwrap_err();
        assert!(matches!(update_err, NoteServiceError::NoteNotFound(id) if id == missing));

        let fetch_err = service.fetch_by_id(missing).unwrap_err();
        assert!(matches!(fetch_err, NoteServiceError::NoteNotFound(id) if id == missing));

        let text_err = service.fetch_text_by_id(missing).unwrap_err();
        assert!(matches!(text_err, NoteServiceError::NoteNotFound(id) if id == missing));

        let words_err = service.fetch_unique_words(missing).unwrap_err();
        assert!(matches!(words_err, NoteServiceError::NoteNotFound(id) if id == missing));

        service.delete(missing).expect("delete of absent id is a no-op");
        service.delete(missing).expect("second delete is equally fine");
    }

    #[test]
    fn fetch_text_returns_raw_body_without_translation() {
        let note = sample_note("raw body, untouched");
        let id = note.id;
        let service =
            NoteService::new(MemoryRepo::with_notes(vec![note]), StubAnalyzer::silent());

        assert_eq!(
            service.fetch_text_by_id(id).expect("text should be returned"),
            "raw body, untouched"
        );
    }

    #[test]
    fn unique_words_delegates_note_text_and_orders_keys_descending() {
        let note = sample_note("beta alpha beta");
        let id = note.id;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let analyzer = StubAnalyzer {
            seen: Rc::clone(&seen),
            canned: BTreeMap::from([("alpha".to_string(), 1), ("beta".to_string(), 2)]),
        };
        let service = NoteService::new(MemoryRepo::with_notes(vec![note]), analyzer);

        let words = service
            .fetch_unique_words(id)
            .expect("analysis should succeed");

        assert_eq!(
            words,
            vec![("beta".to_string(), 2), ("alpha".to_string(), 1)]
        );
        assert_eq!(seen.borrow().as_slice(), ["beta alpha beta".to_string()]);
    }

    #[test]
    fn listing_routes_to_exactly_one_store_path() {
        let repo = MemoryRepo::with_notes(vec![sample_note("first"), sample_note("second")]);
        let unfiltered_calls = Rc::clone(&repo.list_page_calls);
        let tagged_calls = Rc::clone(&repo.list_by_tags_calls);
        let service = NoteService::new(repo, StubAnalyzer::silent());
        let page = PageRequest::default();

        let all = service
            .fetch_all(&ListFilter::All, &page)
            .expect("unfiltered listing should succeed");
        assert_eq!(all.items.len(), 2);
        assert_eq!(all.applied_size, 10);
        assert_eq!((unfiltered_calls.get(), tagged_calls.get()), (1, 0));

        service
            .fetch_all(&ListFilter::Tags(BTreeSet::from([NoteTag::Business])), &page)
            .expect("filtered listing should succeed");
        assert_eq!((unfiltered_calls.get(), tagged_calls.get()), (1, 1));

        // A hand-built empty tag set folds to the unfiltered path.
        service
            .fetch_all(&ListFilter::Tags(BTreeSet::new()), &page)
            .expect("empty filter should fall back to unfiltered listing");
        assert_eq!((unfiltered_calls.get(), tagged_calls.get()), (2, 1));
    }
}
