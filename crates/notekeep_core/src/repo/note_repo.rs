//! Note store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the persistence API consumed by the note service.
//! - Own id/timestamp assignment at insert and tag-link replacement, both
//!   with atomic semantics.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `insert` assigns `id` and `created_at`; callers never supply them.
//! - `replace` rewrites `title`/`text` and the full tag set but never the
//!   stored `created_at`.
//! - `delete_by_id` treats absence as success.
//! - Listing order is deterministic: the requested sort, then `uuid ASC`.

use crate::db::DbError;
use crate::model::note::{Note, NoteDraft, NoteId, NoteTag};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    text,
    created_at
FROM notes";

/// Page size used when the request leaves it unset or zero.
pub const PAGE_SIZE_DEFAULT: u32 = 10;
/// Hard upper bound for one page of results.
pub const PAGE_SIZE_MAX: u32 = 50;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage transport or schema-constraint failure.
    Db(DbError),
    /// Write target does not exist.
    NotFound(NoteId),
    /// Persisted row violates the domain contract.
    InvalidData(String),
    /// Connection schema is missing a required table.
    MissingRequiredTable(&'static str),
    /// Connection schema is missing a required column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(
                f,
                "required table `{table}` is missing; apply database migrations first"
            ),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "required column `{table}.{column}` is missing; apply database migrations first"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sortable note columns exposed to listing callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Explicit listing sort; the store renders it, the service never re-sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for NoteSort {
    /// Newest-first, the boundary's default listing order.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// A bounded, offset-identified slice of the note listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number.
    pub page: u32,
    /// Rows per page. `None` and `Some(0)` fall back to the default size;
    /// values above [`PAGE_SIZE_MAX`] are clamped.
    pub size: Option<u32>,
    pub sort: NoteSort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: None,
            sort: NoteSort::default(),
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: Some(size),
            sort: NoteSort::default(),
        }
    }

    pub fn with_sort(mut self, sort: NoteSort) -> Self {
        self.sort = sort;
        self
    }
}

/// Normalizes a requested page size according to the listing contract.
pub fn normalize_page_size(size: Option<u32>) -> u32 {
    match size {
        Some(0) => PAGE_SIZE_DEFAULT,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
        None => PAGE_SIZE_DEFAULT,
    }
}

/// Repository interface for note persistence operations.
///
/// The service reaches storage only through this contract; implementations
/// own all I/O.
pub trait NoteRepository {
    /// Persists a draft, assigning `id` and `created_at`, and returns the
    /// stored note.
    fn insert(&mut self, draft: &NoteDraft) -> RepoResult<Note>;
    /// Point lookup by id. Absence is `Ok(None)`, not an error.
    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Full overwrite by `id` (fields and tag set). The stored `created_at`
    /// is preserved; the returned note is the post-replace stored state.
    fn replace(&mut self, note: &Note) -> RepoResult<Note>;
    /// Removes one note and its tag links. No-op when the id is absent.
    fn delete_by_id(&mut self, id: NoteId) -> RepoResult<()>;
    /// Lists one page of notes ordered per the request's sort.
    fn list_page(&self, page: &PageRequest) -> RepoResult<Vec<Note>>;
    /// Lists one page of notes whose tag set intersects `tags`. An empty
    /// `tags` set behaves like [`NoteRepository::list_page`].
    fn list_page_by_tags(
        &self,
        tags: &BTreeSet<NoteTag>,
        page: &PageRequest,
    ) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert(&mut self, draft: &NoteDraft) -> RepoResult<Note> {
        let note = Note {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            text: draft.text.clone(),
            created_at: now_epoch_ms(),
            tags: draft.tags.clone(),
        };

        let uuid = note.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (uuid, title, text, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                uuid.as_str(),
                note.title.as_str(),
                note.text.as_str(),
                note.created_at,
            ],
        )?;
        insert_tag_rows(&tx, uuid.as_str(), &note.tags)?;
        tx.commit()?;

        Ok(note)
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        fetch_note(self.conn, id.to_string().as_str())
    }

    fn replace(&mut self, note: &Note) -> RepoResult<Note> {
        let uuid = note.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // created_at is deliberately absent from the SET list: the stored
        // creation instant survives every replace.
        let changed = tx.execute(
            "UPDATE notes SET title = ?2, text = ?3 WHERE uuid = ?1;",
            params![uuid.as_str(), note.title.as_str(), note.text.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }

        tx.execute(
            "DELETE FROM note_tags WHERE note_uuid = ?1;",
            [uuid.as_str()],
        )?;
        insert_tag_rows(&tx, uuid.as_str(), &note.tags)?;

        let stored = fetch_note(&tx, uuid.as_str())?.ok_or_else(|| {
            RepoError::InvalidData(format!("note `{uuid}` missing after replace"))
        })?;
        tx.commit()?;

        Ok(stored)
    }

    fn delete_by_id(&mut self, id: NoteId) -> RepoResult<()> {
        // Zero affected rows is success: delete is idempotent from the
        // caller's view. Tag rows go with the note via ON DELETE CASCADE.
        self.conn.execute(
            "DELETE FROM notes WHERE uuid = ?1;",
            [id.to_string().as_str()],
        )?;
        Ok(())
    }

    fn list_page(&self, page: &PageRequest) -> RepoResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_SELECT_SQL} ORDER BY {} LIMIT ?1 OFFSET ?2;",
            order_by_clause(&page.sort)
        );
        let size = normalize_page_size(page.size);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![i64::from(size), page_offset(page.page, size)])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(read_note_row(self.conn, row)?);
        }

        Ok(notes)
    }

    fn list_page_by_tags(
        &self,
        tags: &BTreeSet<NoteTag>,
        page: &PageRequest,
    ) -> RepoResult<Vec<Note>> {
        if tags.is_empty() {
            return self.list_page(page);
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let sql = format!(
            "{NOTE_SELECT_SQL}
             WHERE EXISTS (
                SELECT 1
                FROM note_tags nt
                WHERE nt.note_uuid = notes.uuid
                  AND nt.tag IN ({placeholders})
             )
             ORDER BY {} LIMIT ? OFFSET ?;",
            order_by_clause(&page.sort)
        );

        let size = normalize_page_size(page.size);
        let mut bind_values: Vec<Value> = tags
            .iter()
            .map(|tag| Value::Text(tag_to_db(*tag).to_string()))
            .collect();
        bind_values.push(Value::Integer(i64::from(size)));
        bind_values.push(Value::Integer(page_offset(page.page, size)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(read_note_row(self.conn, row)?);
        }

        Ok(notes)
    }
}

/// Renders the ORDER BY clause for a sort choice.
///
/// Static strings only; the secondary `uuid ASC` keeps equal-key rows in a
/// stable order across calls.
fn order_by_clause(sort: &NoteSort) -> &'static str {
    match (sort.field, sort.direction) {
        (SortField::CreatedAt, SortDirection::Desc) => "created_at DESC, uuid ASC",
        (SortField::CreatedAt, SortDirection::Asc) => "created_at ASC, uuid ASC",
        (SortField::Title, SortDirection::Desc) => "title DESC, uuid ASC",
        (SortField::Title, SortDirection::Asc) => "title ASC, uuid ASC",
    }
}

fn page_offset(page: u32, size: u32) -> i64 {
    i64::from(page) * i64::from(size)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn fetch_note(conn: &Connection, uuid: &str) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([uuid])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(read_note_row(conn, row)?));
    }

    Ok(None)
}

fn read_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;
    let tags = load_tags_for_note(conn, &uuid_text)?;

    Ok(Note {
        id,
        title: row.get("title")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        tags,
    })
}

fn load_tags_for_note(conn: &Connection, note_uuid: &str) -> RepoResult<BTreeSet<NoteTag>> {
    let mut stmt = conn.prepare(
        "SELECT tag
         FROM note_tags
         WHERE note_uuid = ?1
         ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([note_uuid])?;
    let mut tags = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get("tag")?;
        let tag = parse_tag(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid tag value `{value}` in note_tags.tag"))
        })?;
        tags.insert(tag);
    }

    Ok(tags)
}

fn insert_tag_rows(
    tx: &Transaction<'_>,
    note_uuid: &str,
    tags: &BTreeSet<NoteTag>,
) -> RepoResult<()> {
    for tag in tags {
        tx.execute(
            "INSERT INTO note_tags (note_uuid, tag) VALUES (?1, ?2);",
            params![note_uuid, tag_to_db(*tag)],
        )?;
    }
    Ok(())
}

fn parse_uuid(value: &str) -> RepoResult<NoteId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in notes.uuid")))
}

fn tag_to_db(tag: NoteTag) -> &'static str {
    match tag {
        NoteTag::Business => "BUSINESS",
        NoteTag::Personal => "PERSONAL",
        NoteTag::Important => "IMPORTANT",
    }
}

fn parse_tag(value: &str) -> Option<NoteTag> {
    match value {
        "BUSINESS" => Some(NoteTag::Business),
        "PERSONAL" => Some(NoteTag::Personal),
        "IMPORTANT" => Some(NoteTag::Important),
        _ => None,
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["notes", "note_tags"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["uuid", "title", "text", "created_at"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    for column in ["note_uuid", "tag"] {
        if !table_has_column(conn, "note_tags", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "note_tags",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
