//! user-admin: command line access to the user store.
//!
//! Composition root: loads configuration, initialises tracing, builds the
//! DynamoDB client and injects it into the repository, then runs a single
//! command and prints the result as JSON on stdout.
//!
//! Run:
//! ```bash
//! DYNAMO_TABLE_USERS=users cargo run -p user-admin -- list
//! DYNAMO_TABLE_USERS=users cargo run -p user-admin -- save --id 42 --name Ada --username ada --age 30
//!
//! # against DynamoDB Local
//! DYNAMO_TABLE_USERS=users DYNAMO_ENDPOINT_URL=http://localhost:8000 \
//!   cargo run -p user-admin -- get --id 42
//! ```
//!
//! `STORAGE_PROVIDER=memory` swaps in an in-process store. It lives only for
//! the single command being run, so a `save` in one invocation is not seen
//! by a `get` in the next. Useful for trying the CLI, not for keeping data.
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::process;

use aws_dynamo::DynamoUserRepo;
use clap::{Args, Parser, Subcommand};
use domain::adapters::memory_repo::InMemoryUserRepo;
use domain::{CoreError, User, UserRepository};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{Config, LogFormat, StorageProvider};

#[derive(Debug, Parser)]
#[command(name = "user-admin", version, about = "Manage users in the single-table store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every user
    List,
    /// Fetch a user by id
    Get {
        #[arg(long)]
        id: String,
    },
    /// Fetch the first user with the given username
    Find {
        #[arg(long)]
        username: String,
    },
    /// Create or overwrite a user
    Save(UserArgs),
    /// Overwrite name, username and age of a user
    Update(UserArgs),
    /// Delete a user by id
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Args)]
struct UserArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    age: u32,
}

impl From<UserArgs> for User {
    fn from(a: UserArgs) -> Self {
        User::new(a.id, a.name, a.username, a.age)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };
    init_tracing(&cfg);
    cfg.warn_if_ephemeral();

    let repo = build_repo(&cfg).await;
    if let Err(msg) = run(repo.as_ref(), cli.command).await {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

async fn build_repo(cfg: &Config) -> Box<dyn UserRepository> {
    match (&cfg.storage_provider, &cfg.table) {
        (StorageProvider::Dynamo, Some(table)) => {
            info!(table = %table.name, schema = ?table.schema, "using dynamo storage");
            Box::new(DynamoUserRepo::connect(table.clone()).await)
        }
        _ => {
            info!("using in-memory storage");
            Box::new(InMemoryUserRepo::new())
        }
    }
}

async fn run(repo: &dyn UserRepository, command: Command) -> Result<(), String> {
    match command {
        Command::List => print_json(&repo.get_all().await.map_err(fail)?),
        Command::Get { id } => {
            let user = repo.get_by_id(&id).await.map_err(fail)?;
            print_json(&user.ok_or_else(|| fail(CoreError::NotFound))?)
        }
        Command::Find { username } => {
            let user = repo.get_by_username(&username).await.map_err(fail)?;
            print_json(&user.ok_or_else(|| fail(CoreError::NotFound))?)
        }
        Command::Save(args) => print_json(&repo.save(args.into()).await.map_err(fail)?),
        Command::Update(args) => print_json(&repo.update(args.into()).await.map_err(fail)?),
        Command::Delete { id } => {
            // Only the id feeds the key, so unreadable items can still be removed.
            let user = User {
                id,
                ..User::default()
            };
            repo.delete(&user).await.map_err(fail)?;
            print_json(&serde_json::json!({ "deleted": user.id }))
        }
    }
}

fn fail(e: CoreError) -> String {
    if !matches!(e, CoreError::NotFound) {
        error!(error = %e, "command failed");
    }
    e.to_string()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let out = serde_json::to_string_pretty(value).map_err(|e| format!("encode output: {e}"))?;
    println!("{out}");
    Ok(())
}

fn init_tracing(cfg: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries command output, so logs go to stderr.
    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_dynamo::{user_to_item, ItemStore, KeySchema, MemoryItemStore};
    use aws_sdk_dynamodb::types::AttributeValue;

    fn dynamo_repo() -> DynamoUserRepo<MemoryItemStore> {
        let store = MemoryItemStore::new(KeySchema::default()).with_table("users");
        DynamoUserRepo::new(store, "users", KeySchema::default())
    }

    fn save_args() -> UserArgs {
        UserArgs {
            id: "42".into(),
            name: "Ada".into(),
            username: "ada".into(),
            age: 30,
        }
    }

    #[test]
    fn cli_parses_save() {
        let cli = Cli::try_parse_from([
            "user-admin", "save", "--id", "42", "--name", "Ada", "--username", "ada", "--age", "30",
        ])
        .unwrap();
        match cli.command {
            Command::Save(a) => assert_eq!(User::from(a), User::new("42", "Ada", "ada", 30)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_negative_age() {
        assert!(Cli::try_parse_from([
            "user-admin", "save", "--id", "1", "--name", "n", "--username", "u", "--age", "-3",
        ])
        .is_err());
    }

    #[tokio::test]
    async fn save_get_delete_through_commands() {
        let repo = dynamo_repo();
        run(&repo, Command::Save(save_args())).await.unwrap();
        run(&repo, Command::Get { id: "42".into() }).await.unwrap();
        run(&repo, Command::Find { username: "ada".into() }).await.unwrap();
        run(&repo, Command::Delete { id: "42".into() }).await.unwrap();
        assert_eq!(
            run(&repo, Command::Get { id: "42".into() }).await,
            Err("not found".to_string())
        );
    }

    #[tokio::test]
    async fn delete_of_unknown_user_succeeds() {
        let repo = InMemoryUserRepo::new();
        run(&repo, Command::Delete { id: "nope".into() }).await.unwrap();

        let repo = dynamo_repo();
        run(&repo, Command::Delete { id: "nope".into() }).await.unwrap();
        assert!(repo.store().items("users").is_empty());
    }

    #[tokio::test]
    async fn delete_removes_unreadable_item() {
        let repo = dynamo_repo();
        let mut broken = user_to_item(&KeySchema::default(), &User::new("42", "Ada", "ada", 30));
        broken.insert("age".into(), AttributeValue::N("old".into()));
        repo.store().put_item("users", broken).await.unwrap();
        assert!(run(&repo, Command::Get { id: "42".into() }).await.is_err());

        run(&repo, Command::Delete { id: "42".into() }).await.unwrap();
        assert!(repo.store().items("users").is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_saved_user() {
        let repo = dynamo_repo();
        run(&repo, Command::Save(save_args())).await.unwrap();
        let mut changed = save_args();
        changed.name = "Augusta".into();
        changed.age = 36;
        run(&repo, Command::Update(changed)).await.unwrap();
        let got = repo.get_by_id("42").await.unwrap().unwrap();
        assert_eq!(got, User::new("42", "Augusta", "ada", 36));
    }
}
