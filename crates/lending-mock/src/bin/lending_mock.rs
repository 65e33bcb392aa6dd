//! Command-line front end for the lending mock data layer.
//!
//! State lives in the directory named by `LENDING_MOCK_DATA_DIR`, so a user
//! listed by one invocation can be inspected or updated by the next. Results
//! are written to stdout as JSON; logs go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use lending_mock::{
    ApiError, DEFAULT_PER_PAGE, FileStorage, FilterOptions, MockApiSettings, PageRequest,
    PaginationError, RecordCache, RecordGenerator, SessionError, SessionGuard, SettingsError,
    StorageError, StoreError, UserFilter, UserStatus, UserStore, UsersApi, UsersService,
};

#[derive(Debug, Parser)]
#[command(name = "lending-mock", version, about = "Inspect and edit the mock lending dataset")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List users, optionally filtered, one page at a time.
    List(ListArgs),
    /// Show one user, served from the record cache when possible.
    Get {
        /// User id.
        id: String,
        /// Drop any cached copy before fetching.
        #[arg(long)]
        refresh: bool,
    },
    /// Show dashboard totals.
    Stats,
    /// Change a user's status.
    SetStatus {
        /// User id.
        id: String,
        /// One of Active, Inactive, Pending, Blacklisted.
        status: UserStatus,
    },
    /// Sign in with any valid email and an 8+ character password.
    Login {
        /// Email address.
        #[arg(long)]
        email: String,
        /// Password.
        #[arg(long)]
        password: String,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in admin.
    Whoami,
    /// Discard the dataset so the next command regenerates it.
    Reset,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Organization substring.
    #[arg(long, default_value_t)]
    organization: String,
    /// Username substring.
    #[arg(long, default_value_t)]
    username: String,
    /// Email substring.
    #[arg(long, default_value_t)]
    email: String,
    /// Join date substring.
    #[arg(long, default_value_t)]
    date: String,
    /// Phone number substring.
    #[arg(long, default_value_t)]
    phone_number: String,
    /// Exact status name.
    #[arg(long, default_value_t)]
    status: String,
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Users per page.
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: usize,
}

impl ListArgs {
    fn filter(&self) -> UserFilter {
        UserFilter::from(&FilterOptions {
            organization: self.organization.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            date: self.date.clone(),
            phone_number: self.phone_number.clone(),
            status: self.status.clone(),
        })
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to write output: {0}")]
    Output(String),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Api(ApiError::Store(err))
    }
}

impl From<PaginationError> for CliError {
    fn from(err: PaginationError) -> Self {
        Self::Api(ApiError::Pagination(err))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = MockApiSettings::load()?;
    let storage = Arc::new(FileStorage::open(&settings.data_dir())?);
    let sessions = SessionGuard::new(Arc::clone(&storage));
    let cache = RecordCache::new(Arc::clone(&storage));
    let api = UsersService::new(
        UserStore::new(
            Arc::clone(&storage),
            RecordGenerator::with_seed(settings.seed, settings.user_count),
        ),
        settings.latency(),
    );

    match cli.command {
        Command::List(args) => {
            let request = PageRequest::new(args.page, args.per_page)?;
            emit(&api.list_users_page(&args.filter(), request).await?)
        }
        Command::Get { id, refresh } => {
            if refresh {
                cache.evict(&id)?;
            }
            emit(&cache.get_or_fetch(&api, &id).await?)
        }
        Command::Stats => emit(&api.get_dashboard_stats().await?),
        Command::SetStatus { id, status } => {
            let updated = cache.update_status(&api, &id, status).await?;
            emit(&json!({ "id": id, "status": status, "updated": updated }))
        }
        Command::Login { email, password } => emit(&sessions.login(&email, &password)?),
        Command::Logout => {
            sessions.logout()?;
            emit(&json!({ "loggedOut": true }))
        }
        Command::Whoami => emit(&sessions.current()?),
        Command::Reset => {
            api.reset().await?;
            emit(&json!({ "reset": true }))
        }
    }
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(io::stdout().lock(), "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}
