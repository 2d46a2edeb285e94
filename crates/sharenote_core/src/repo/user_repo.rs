//! User persistence.

use crate::model::identity::Role;
use crate::model::user::User;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, name, email, role, created_at FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    fn insert_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: &str) -> RepoResult<Option<User>>;
    /// All users ordered by `created_at ASC, id ASC`.
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;
        self.conn
            .execute(
                "INSERT INTO users (id, name, email, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.id.as_str(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.role.as_str(),
                    user.created_at,
                ],
            )
            .map_err(|err| RepoError::from_insert(err, "user", &user.id))?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_user_row,
            )
            .optional()?;
        row.map(RawUser::into_user).transpose()
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let rows = stmt.query_map([], read_user_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?.into_user()?);
        }
        Ok(users)
    }
}

struct RawUser {
    id: String,
    name: String,
    email: String,
    role: String,
    created_at: i64,
}

impl RawUser {
    fn into_user(self) -> RepoResult<User> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid role `{}` in users.role", self.role))
        })?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            created_at: self.created_at,
        })
    }
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role: row.get("role")?,
        created_at: row.get("created_at")?,
    })
}
