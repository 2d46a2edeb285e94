//! Group and membership persistence.
//!
//! Shares a plain `&Connection` with the user repository so both can back one
//! `UserService`. Multi-statement writes use unchecked transactions and must
//! not be nested inside another open transaction.

use crate::model::group::Group;
use crate::model::identity::GroupId;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;

/// Repository interface for groups.
pub trait GroupRepository {
    /// Inserts the group row and its initial members.
    fn insert_group(&self, group: &Group) -> RepoResult<()>;
    fn get_group(&self, id: &str) -> RepoResult<Option<Group>>;
    /// Adds one member and bumps `updated_at`. Adding an existing member is a no-op.
    fn add_member(&self, group_id: &str, user_id: &str, now: i64) -> RepoResult<()>;
    /// Groups the user belongs to, ordered by name.
    fn list_groups_for_user(&self, user_id: &str) -> RepoResult<Vec<Group>>;
    /// Ids of the groups the user belongs to.
    fn group_ids_for_user(&self, user_id: &str) -> RepoResult<BTreeSet<GroupId>>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["groups", "group_members"])?;
        Ok(Self { conn })
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn insert_group(&self, group: &Group) -> RepoResult<()> {
        if group.name.trim().is_empty() {
            return Err(RepoError::InvalidData(format!(
                "group `{}` has a blank name",
                group.id
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO groups (id, name, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                group.id.as_str(),
                group.name.as_str(),
                group.user_id.as_str(),
                group.created_at,
                group.updated_at,
            ],
        )
        .map_err(|err| RepoError::from_insert(err, "group", &group.id))?;
        for member in &group.member_ids {
            tx.execute(
                "INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?1, ?2);",
                params![group.id.as_str(), member.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_group(&self, id: &str) -> RepoResult<Option<Group>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, user_id, created_at, updated_at FROM groups WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Group {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        user_id: row.get("user_id")?,
                        member_ids: BTreeSet::new(),
                        created_at: row.get("created_at")?,
                        updated_at: row.get("updated_at")?,
                    })
                },
            )
            .optional()?;

        match row {
            Some(mut group) => {
                group.member_ids = load_members(self.conn, &group.id)?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    fn add_member(&self, group_id: &str, user_id: &str, now: i64) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        if !exists(&tx, "SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?1);", group_id)? {
            return Err(RepoError::not_found("group", group_id));
        }
        if !exists(&tx, "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);", user_id)? {
            return Err(RepoError::not_found("user", user_id));
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?1, ?2);",
            params![group_id, user_id],
        )?;
        if inserted > 0 {
            tx.execute(
                "UPDATE groups SET updated_at = ?2 WHERE id = ?1;",
                params![group_id, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn list_groups_for_user(&self, user_id: &str) -> RepoResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.id
             FROM groups g
             INNER JOIN group_members gm ON gm.group_id = g.id
             WHERE gm.user_id = ?1
             ORDER BY g.name ASC, g.id ASC;",
        )?;
        let ids = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            let group = self.get_group(&id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("group `{id}` vanished while listing"))
            })?;
            groups.push(group);
        }
        Ok(groups)
    }

    fn group_ids_for_user(&self, user_id: &str) -> RepoResult<BTreeSet<GroupId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT group_id FROM group_members WHERE user_id = ?1;")?;
        let ids = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(ids)
    }
}

fn load_members(conn: &Connection, group_id: &str) -> RepoResult<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT user_id FROM group_members WHERE group_id = ?1;")?;
    let members = stmt
        .query_map([group_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(members)
}

fn exists(conn: &Connection, sql: &str, id: &str) -> RepoResult<bool> {
    let found: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(found == 1)
}
