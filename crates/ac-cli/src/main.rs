use std::path::PathBuf;
use std::process;

use ac_engine::dispatch::{self, DispatchError};
use ac_engine::transaction::EngineError;
use ac_engine::{AccountEngine, StorePaths};
use clap::Parser;
use nix::unistd::Uid;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Rewrite one account's password hash or username across the shadow,
/// passwd and group stores.
#[derive(Debug, Parser)]
#[command(name = "accountctl", version, about)]
struct Cli {
    /// Account attribute to update ("password" or "username")
    attribute: String,

    /// Name of the target account
    username: String,

    /// New value: the plaintext password, or the replacement username
    value: String,

    /// Path of the shadow store
    #[arg(long, default_value = "/etc/shadow")]
    shadow: PathBuf,

    /// Path of the passwd store
    #[arg(long, default_value = "/etc/passwd")]
    passwd: PathBuf,

    /// Path of the group store
    #[arg(long, default_value = "/etc/group")]
    group: PathBuf,

    /// Skip the root privilege check (for running against fixture files)
    #[arg(long)]
    allow_unprivileged: bool,
}

/// Distinct exit status per failure kind, so callers can tell what went
/// wrong without scraping stderr.
fn exit_code(err: &DispatchError) -> i32 {
    match err {
        DispatchError::UnsupportedOperation(_) | DispatchError::Validation(_) => 2,
        DispatchError::Engine(engine) => match engine {
            EngineError::AccountNotFound { .. } | EngineError::DuplicateAccount { .. } => 4,
            EngineError::ForbiddenAccount => 5,
            EngineError::Record(_) => 6,
            EngineError::Password(_) => 7,
            EngineError::HomeMigration { .. } => 8,
            EngineError::Read { .. } | EngineError::Commit(_) => 9,
            EngineError::Substitution(_) => 2,
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if !cli.allow_unprivileged && !Uid::effective().is_root() {
        error!("accountctl must run as root; pass --allow-unprivileged to operate on fixture files");
        process::exit(3);
    }

    let engine = AccountEngine::new(StorePaths {
        shadow: cli.shadow,
        passwd: cli.passwd,
        group: cli.group,
    });

    if let Err(err) = dispatch::run(&engine, &cli.attribute, &cli.username, &cli.value) {
        error!("{err}");
        process::exit(exit_code(&err));
    }
}
