//! In-process harness: one migrated in-memory database, seeded users and the
//! real router driven through `oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sharenote_core::model::now_epoch_nanos;
use sharenote_core::{
    open_db_in_memory, AccessControl, AppSettings, Note, NoteForm, NoteRepository, NewUser, Role,
    SharedSettings, SqliteGroupRepository, SqliteNoteRepository, SqliteUserRepository,
    UserService,
};
use sharenote_server::{build_router, ApiError, AppState, USER_ID_HEADER};
use tower::ServiceExt;

pub const ADMIN: &str = "admin-1";
pub const U1: &str = "user-1";
pub const U2: &str = "user-2";
pub const U3: &str = "user-3";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Fresh database with one admin and three regular users.
    pub async fn new() -> Self {
        let conn = open_db_in_memory().expect("in-memory db");
        let state = AppState::new(conn, SharedSettings::new(AppSettings::default()));
        let app = Self {
            router: build_router(state.clone()),
            state,
        };
        app.add_user(ADMIN, Role::Admin).await;
        for id in [U1, U2, U3] {
            app.add_user(id, Role::User).await;
        }
        app
    }

    pub async fn add_user(&self, id: &str, role: Role) {
        let request = NewUser {
            id: id.to_string(),
            name: format!("{id} name"),
            email: format!("{id}@example.com"),
            role,
        };
        self.state
            .with_db(move |conn| {
                users(conn).create_user(request)?;
                Ok(())
            })
            .await
            .expect("seed user");
    }

    /// Creates a group owned by `owner` with the extra `members`.
    pub async fn add_group(&self, owner: &str, name: &str, members: &[&str]) -> String {
        let owner = owner.to_string();
        let name = name.to_string();
        let members: Vec<String> = members.iter().map(|id| id.to_string()).collect();
        self.state
            .with_db(move |conn| {
                let service = users(conn);
                let group = service.create_group(&owner, &name)?;
                for member in &members {
                    service.add_group_member(&group.id, member)?;
                }
                Ok(group.id)
            })
            .await
            .expect("seed group")
    }

    /// Stores a note directly, bypassing the feature gate.
    pub async fn insert_note(&self, owner: &str, title: &str, access: AccessControl) -> Note {
        let note = Note::from_form(
            owner,
            NoteForm::titled(title).with_access_control(access),
            now_epoch_nanos(),
        );
        let stored = note.clone();
        self.state
            .with_db(move |conn| {
                SqliteNoteRepository::try_new(conn)?.insert_note(&stored)?;
                Ok(())
            })
            .await
            .expect("seed note");
        note
    }

    pub fn set_settings(&self, settings: AppSettings) {
        self.state.settings().replace(settings);
    }

    pub fn disable_user_notes(&self) {
        self.state
            .settings()
            .update(|settings| settings.user_permissions.features.notes = false);
    }

    pub async fn count_notes(&self) -> i64 {
        self.state
            .with_db(|conn| {
                conn.query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
                    .map_err(|err| ApiError::Internal(err.to_string()))
            })
            .await
            .expect("count notes")
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, user, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, user, None).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }
}

fn users(
    conn: &rusqlite::Connection,
) -> UserService<SqliteUserRepository<'_>, SqliteGroupRepository<'_>> {
    UserService::new(
        SqliteUserRepository::try_new(conn).expect("user repo"),
        SqliteGroupRepository::try_new(conn).expect("group repo"),
    )
}
