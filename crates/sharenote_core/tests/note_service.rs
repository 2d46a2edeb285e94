use rusqlite::Connection;
use serde_json::json;
use sharenote_core::db::open_db_in_memory;
use sharenote_core::{
    AccessControl, AccessGrant, AccessKind, AppSettings, Identity, NewUser, NoteForm,
    NoteService, NoteServiceError, Role, SharedSettings, SqliteGroupRepository,
    SqliteNoteRepository, SqliteUserRepository, UserService,
};

fn seeded_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    {
        let users = SqliteUserRepository::try_new(&conn).unwrap();
        let groups = SqliteGroupRepository::try_new(&conn).unwrap();
        let service = UserService::new(users, groups);
        for (id, name, role) in [
            ("user-1", "Owner", Role::User),
            ("user-2", "Collaborator", Role::User),
            ("user-3", "Viewer", Role::User),
            ("admin-1", "Admin", Role::Admin),
        ] {
            service
                .create_user(NewUser {
                    id: id.to_string(),
                    name: name.to_string(),
                    email: format!("{id}@example.com"),
                    role,
                })
                .unwrap();
        }
    }
    conn
}

fn user(id: &str) -> Identity {
    Identity::new(id, Role::User)
}

fn note_form(title: &str, access_control: AccessControl) -> NoteForm {
    NoteForm::titled(title)
        .with_data(json!({
            "content": {"html": format!("<p>{title}</p>"), "md": title, "json": null}
        }))
        .with_access_control(access_control)
}

#[test]
fn list_excludes_owner_only_notes_of_other_users() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, SharedSettings::default());

    let private = service
        .create_note(&user("user-1"), note_form("Private", AccessControl::OwnerOnly))
        .unwrap();

    let listed = service.list_notes(&user("user-2")).unwrap();
    assert!(listed.iter().all(|note| note.id != private.id));

    let own = service.list_notes(&user("user-1")).unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, private.id);
}

#[test]
fn list_includes_write_shared_note_and_get_forbids_third_user() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, SharedSettings::default());

    let existing = service
        .create_note(&user("user-1"), note_form("Existing", AccessControl::OwnerOnly))
        .unwrap();
    let shared = service
        .create_note(
            &user("user-1"),
            note_form(
                "Shared",
                AccessControl::shared(AccessGrant::default(), AccessGrant::users(["user-2"])),
            ),
        )
        .unwrap();

    let ids: Vec<String> = service
        .list_notes(&user("user-2"))
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert!(ids.contains(&shared.id));
    assert!(!ids.contains(&existing.id));

    let err = service.get_note(&user("user-3"), &shared.id).unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Forbidden {
            kind: AccessKind::Read,
            ..
        }
    ));
}

#[test]
fn list_includes_group_shared_notes_and_admin_sees_everything() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, SharedSettings::default());

    let team_note = service
        .create_note(
            &user("user-1"),
            note_form(
                "Team",
                AccessControl::shared(AccessGrant::groups(["team"]), AccessGrant::default()),
            ),
        )
        .unwrap();
    service
        .create_note(&user("user-2"), note_form("Mine", AccessControl::OwnerOnly))
        .unwrap();

    let member = user("user-3").with_groups(["team"]);
    let visible = service.list_notes(&member).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, team_note.id);
    assert_eq!(service.get_note(&member, &team_note.id).unwrap(), team_note);

    let admin = Identity::new("admin-1", Role::Admin);
    assert_eq!(service.list_notes(&admin).unwrap().len(), 2);
}

#[test]
fn disabled_feature_rejects_create_and_persists_nothing() {
    let mut conn = seeded_db();
    let settings = SharedSettings::default();
    settings.update(|s| s.user_permissions.features.notes = false);
    {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let service = NoteService::new(repo, settings.clone());

        let err = service
            .create_note(&user("user-1"), note_form("Blocked", AccessControl::OwnerOnly))
            .unwrap_err();
        assert!(matches!(err, NoteServiceError::PermissionDenied(_)));
        assert!(matches!(
            service.list_notes(&user("user-1")),
            Err(NoteServiceError::PermissionDenied(_))
        ));
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn settings_changes_apply_to_the_next_call() {
    let mut conn = seeded_db();
    let settings = SharedSettings::default();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, settings.clone());

    service
        .create_note(&user("user-1"), note_form("First", AccessControl::OwnerOnly))
        .unwrap();

    settings.replace(AppSettings {
        enable_notes: false,
        ..AppSettings::default()
    });
    let admin = Identity::new("admin-1", Role::Admin);
    assert!(matches!(
        service.list_notes(&admin),
        Err(NoteServiceError::PermissionDenied(_))
    ));

    settings.replace(AppSettings::default());
    assert_eq!(service.list_notes(&admin).unwrap().len(), 1);
}

#[test]
fn get_round_trips_title_and_content() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, SharedSettings::default());

    let created = service
        .create_note(&user("user-1"), note_form("Meeting notes", AccessControl::OwnerOnly))
        .unwrap();
    let loaded = service.get_note(&user("user-1"), &created.id).unwrap();

    assert_eq!(loaded.title, "Meeting notes");
    assert_eq!(loaded.user_id, "user-1");
    assert_eq!(
        loaded.data.as_ref().unwrap()["content"],
        json!({"html": "<p>Meeting notes</p>", "md": "Meeting notes", "json": null})
    );
    assert_eq!(loaded, created);
}

#[test]
fn get_missing_note_is_not_found_and_outcomes_are_stable() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo, SharedSettings::default());

    assert!(matches!(
        service.get_note(&user("user-1"), "missing"),
        Err(NoteServiceError::NotFound(id)) if id == "missing"
    ));

    let private = service
        .create_note(&user("user-1"), note_form("Private", AccessControl::OwnerOnly))
        .unwrap();
    for _ in 0..3 {
        assert!(matches!(
            service.get_note(&user("user-3"), &private.id),
            Err(NoteServiceError::Forbidden { .. })
        ));
        assert!(service.get_note(&user("user-1"), &private.id).is_ok());
    }
}

#[test]
fn update_requires_write_access() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, SharedSettings::default());

    let access = AccessControl::shared(
        AccessGrant::users(["user-3"]),
        AccessGrant::users(["user-2"]),
    );
    let note = service
        .create_note(&user("user-1"), note_form("Draft", access.clone()))
        .unwrap();

    let reader_err = service
        .update_note(&user("user-3"), &note.id, note_form("Hijacked", access.clone()))
        .unwrap_err();
    assert!(matches!(
        reader_err,
        NoteServiceError::Forbidden {
            kind: AccessKind::Write,
            ..
        }
    ));

    let updated = service
        .update_note(&user("user-2"), &note.id, note_form("Edited", access))
        .unwrap();
    assert_eq!(updated.title, "Edited");
    assert_eq!(updated.user_id, "user-1");
    assert_eq!(updated.created_at, note.created_at);
    assert!(updated.updated_at >= note.updated_at);
}

#[test]
fn only_owner_or_admin_may_change_access_control() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, SharedSettings::default());

    let access = AccessControl::shared(AccessGrant::default(), AccessGrant::users(["user-2"]));
    let note = service
        .create_note(&user("user-1"), note_form("Doc", access))
        .unwrap();

    let widened = AccessControl::shared(
        AccessGrant::users(["user-3"]),
        AccessGrant::users(["user-2", "user-3"]),
    );
    let err = service
        .update_note(&user("user-2"), &note.id, note_form("Doc", widened.clone()))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::Forbidden { .. }));
    assert_eq!(
        service.get_note(&user("user-1"), &note.id).unwrap().title,
        "Doc"
    );

    let reshared = service
        .update_note(&user("user-1"), &note.id, note_form("Doc", widened.clone()))
        .unwrap();
    assert_eq!(reshared.access_control, widened);

    let admin = Identity::new("admin-1", Role::Admin);
    let closed = service
        .update_note(&admin, &note.id, note_form("Doc", AccessControl::OwnerOnly))
        .unwrap();
    assert!(closed.access_control.is_owner_only());
}

#[test]
fn update_validates_form_and_reports_missing_notes() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, SharedSettings::default());

    assert!(matches!(
        service.update_note(&user("user-1"), "missing", NoteForm::titled("x")),
        Err(NoteServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.create_note(&user("user-1"), NoteForm::titled("   ")),
        Err(NoteServiceError::Validation(_))
    ));
}

#[test]
fn delete_requires_write_access_and_removes_the_note() {
    let mut conn = seeded_db();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, SharedSettings::default());

    let note = service
        .create_note(
            &user("user-1"),
            note_form(
                "Disposable",
                AccessControl::shared(AccessGrant::users(["user-3"]), AccessGrant::default()),
            ),
        )
        .unwrap();

    assert!(matches!(
        service.delete_note(&user("user-3"), &note.id),
        Err(NoteServiceError::Forbidden { .. })
    ));
    service.delete_note(&user("user-1"), &note.id).unwrap();
    assert!(matches!(
        service.get_note(&user("user-1"), &note.id),
        Err(NoteServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_note(&user("user-1"), &note.id),
        Err(NoteServiceError::NotFound(_))
    ));
}
