//! Admin CLI for seeding users and groups.
//!
//! # Responsibility
//! - Create and list users and groups in a sharenote database.
//! - Print one tab-separated line per record for scripting.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sharenote_core::{
    open_db, NewUser, Role, SqliteGroupRepository, SqliteUserRepository, UserService,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sharenote", version, about = "sharenote admin tool")]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long, global = true, default_value = "sharenote.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Group(GroupCommand),
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Create a user
    Add {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// admin or user
        #[arg(long, default_value = "user", value_parser = parse_role)]
        role: Role,
    },
    /// List users
    List,
}

#[derive(Debug, Subcommand)]
enum GroupCommand {
    /// Create a group; the owner becomes its first member
    Add {
        #[arg(long)]
        owner: String,
        name: String,
    },
    /// Add a user to a group
    AddMember { group_id: String, user_id: String },
    /// List groups a user belongs to
    List {
        #[arg(long)]
        user: String,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("unknown role `{value}`; expected admin|user"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database {}", cli.db.display()))?;
    let service = UserService::new(
        SqliteUserRepository::try_new(&conn)?,
        SqliteGroupRepository::try_new(&conn)?,
    );

    match cli.command {
        Command::User(UserCommand::Add {
            id,
            name,
            email,
            role,
        }) => {
            let user = service.create_user(NewUser {
                id,
                name,
                email,
                role,
            })?;
            println!("{}\t{}\t{}\t{}", user.id, user.role, user.name, user.email);
        }
        Command::User(UserCommand::List) => {
            for user in service.list_users()? {
                println!("{}\t{}\t{}\t{}", user.id, user.role, user.name, user.email);
            }
        }
        Command::Group(GroupCommand::Add { owner, name }) => {
            let group = service.create_group(&owner, &name)?;
            println!("{}\t{}", group.id, group.name);
        }
        Command::Group(GroupCommand::AddMember { group_id, user_id }) => {
            let group = service.add_group_member(&group_id, &user_id)?;
            let members: Vec<&str> = group.member_ids.iter().map(String::as_str).collect();
            println!("{}\t{}\t{}", group.id, group.name, members.join(","));
        }
        Command::Group(GroupCommand::List { user }) => {
            for group in service.list_groups_for_user(&user)? {
                println!("{}\t{}", group.id, group.name);
            }
        }
    }
    Ok(())
}
