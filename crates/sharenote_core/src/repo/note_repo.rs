//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes with their access declarations.
//! - Run authorization callbacks inside the same transaction as the mutation
//!   they guard.
//!
//! # Invariants
//! - `access_control` is stored as JSON text; owner-only is stored as `{}`.
//! - `id`, `user_id` and `created_at` are never rewritten by updates.
//! - Lists are ordered by `updated_at DESC, id ASC`.

use crate::model::access_control::AccessControl;
use crate::model::identity::UserId;
use crate::model::note::{Note, NoteForm};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    data,
    meta,
    access_control,
    created_at,
    updated_at
FROM notes";

const OWNER_ONLY_JSON: &str = "{}";

/// Which rows a list query should consider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteScope {
    /// Every stored note.
    All,
    /// Notes owned by the user plus notes carrying any explicit grant.
    ///
    /// This is a storage-side prefilter only; callers still authorize each
    /// returned row.
    OwnedOrShared(UserId),
}

/// Repository interface for notes.
pub trait NoteRepository {
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: &str) -> RepoResult<Option<Note>>;
    fn list_notes(&self, scope: &NoteScope) -> RepoResult<Vec<Note>>;

    /// Replaces title, payloads and access declaration of one note.
    ///
    /// `authorize` sees the current row inside the write transaction; an
    /// error from it aborts the update unchanged.
    fn update_note<E, F>(
        &mut self,
        id: &str,
        form: &NoteForm,
        now: i64,
        authorize: F,
    ) -> Result<Note, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Note) -> Result<(), E>;

    /// Deletes one note after `authorize` accepts the current row, in one
    /// transaction.
    fn delete_note<E, F>(&mut self, id: &str, authorize: F) -> Result<(), E>
    where
        E: From<RepoError>,
        F: FnOnce(&Note) -> Result<(), E>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "notes"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        self.conn
            .execute(
                "INSERT INTO notes (
                    id,
                    user_id,
                    title,
                    data,
                    meta,
                    access_control,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    note.id.as_str(),
                    note.user_id.as_str(),
                    note.title.as_str(),
                    encode_json(note.data.as_ref())?,
                    encode_json(note.meta.as_ref())?,
                    encode_access_control(&note.access_control)?,
                    note.created_at,
                    note.updated_at,
                ],
            )
            .map_err(|err| RepoError::from_insert(err, "note", &note.id))?;
        Ok(())
    }

    fn get_note(&self, id: &str) -> RepoResult<Option<Note>> {
        load_note(&*self.conn, id)
    }

    fn list_notes(&self, scope: &NoteScope) -> RepoResult<Vec<Note>> {
        let mut sql = String::from(NOTE_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let NoteScope::OwnedOrShared(user_id) = scope {
            sql.push_str(" WHERE user_id = ? OR access_control != ?");
            bind_values.push(Value::Text(user_id.clone()));
            bind_values.push(Value::Text(OWNER_ONLY_JSON.to_string()));
        }
        sql.push_str(" ORDER BY updated_at DESC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update_note<E, F>(
        &mut self,
        id: &str,
        form: &NoteForm,
        now: i64,
        authorize: F,
    ) -> Result<Note, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Note) -> Result<(), E>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;

        let current = load_note(&tx, id)?.ok_or_else(|| RepoError::not_found("note", id))?;
        authorize(&current)?;

        let updated = Note {
            title: form.title.clone(),
            data: form.data.clone(),
            meta: form.meta.clone(),
            access_control: form.access_control.clone(),
            updated_at: now.max(current.created_at),
            ..current
        };
        updated.validate().map_err(RepoError::from)?;

        tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                data = ?3,
                meta = ?4,
                access_control = ?5,
                updated_at = ?6
             WHERE id = ?1;",
            params![
                updated.id.as_str(),
                updated.title.as_str(),
                encode_json(updated.data.as_ref())?,
                encode_json(updated.meta.as_ref())?,
                encode_access_control(&updated.access_control)?,
                updated.updated_at,
            ],
        )
        .map_err(RepoError::from)?;
        tx.commit().map_err(RepoError::from)?;

        Ok(updated)
    }

    fn delete_note<E, F>(&mut self, id: &str, authorize: F) -> Result<(), E>
    where
        E: From<RepoError>,
        F: FnOnce(&Note) -> Result<(), E>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;

        let current = load_note(&tx, id)?.ok_or_else(|| RepoError::not_found("note", id))?;
        authorize(&current)?;

        tx.execute("DELETE FROM notes WHERE id = ?1;", [id])
            .map_err(RepoError::from)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(())
    }
}

fn load_note(conn: &Connection, id: &str) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_note_row(row)?)),
        None => Ok(None),
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: String = row.get("id")?;
    let data = decode_json(row.get("data")?, "data", &id)?;
    let meta = decode_json(row.get("meta")?, "meta", &id)?;
    let access_text: String = row.get("access_control")?;
    let access_control = serde_json::from_str::<AccessControl>(&access_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid access_control for note `{id}`: {err}"))
    })?;

    let note = Note {
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        data,
        meta,
        access_control,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        id,
    };
    note.validate()?;
    Ok(note)
}

fn encode_json(value: Option<&serde_json::Value>) -> RepoResult<Option<String>> {
    value
        .map(|value| {
            serde_json::to_string(value)
                .map_err(|err| RepoError::InvalidData(format!("unencodable note payload: {err}")))
        })
        .transpose()
}

fn decode_json(
    text: Option<String>,
    column: &str,
    id: &str,
) -> RepoResult<Option<serde_json::Value>> {
    text.map(|text| {
        serde_json::from_str(&text).map_err(|err| {
            RepoError::InvalidData(format!("invalid {column} JSON for note `{id}`: {err}"))
        })
    })
    .transpose()
}

fn encode_access_control(access_control: &AccessControl) -> RepoResult<String> {
    serde_json::to_string(access_control)
        .map_err(|err| RepoError::InvalidData(format!("unencodable access_control: {err}")))
}
