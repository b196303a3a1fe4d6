//! user-store CLI
//!
//! Runs one CRUD operation against a snapshot file and prints the result as
//! JSON on stdout. Logs go to stderr. Settings come from the environment
//! (`DATA_PATH`, `USER_STORE_WRITE_MODE`, `USER_STORE_PRETTY`); flags win.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use user_store::{Config, Error, UserInput, UserService, UserStore, WriteMode};

/// Manage users in a JSON snapshot file
#[derive(Parser, Debug)]
#[command(name = "user-store")]
#[command(version)]
struct Args {
    /// Snapshot file [env: DATA_PATH, default: ./data/users.json]
    #[arg(short, long)]
    data_path: Option<PathBuf>,

    /// Write compact JSON instead of two-space indented
    #[arg(long)]
    compact: bool,

    /// Overwrite the snapshot in place instead of temp file + rename
    #[arg(long)]
    in_place: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every user
    List,

    /// Show one user
    Get {
        /// User id
        id: String,
    },

    /// Add a user
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,
    },

    /// Replace a user's name and email
    Update {
        /// User id
        id: String,

        /// New display name
        #[arg(long)]
        name: String,

        /// New email address
        #[arg(long)]
        email: String,
    },

    /// Remove a user
    Delete {
        /// User id
        id: String,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

// Environment first, then flags on top.
fn resolve_config(args: &Args) -> Result<Config, Error> {
    let mut config = Config::from_env()?;
    if let Some(path) = &args.data_path {
        config.data_path = path.clone();
    }
    if args.compact {
        config.pretty = false;
    }
    if args.in_place {
        config.write_mode = WriteMode::InPlace;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            eprintln!("error: {err}");
            return ExitCode::from(exit_code(&err));
        }
    };

    let store = match UserStore::from_config(&config) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(path = %config.data_path.display(), error = %err, "failed to open store");
            eprintln!("error: {err}");
            return ExitCode::from(exit_code(&err));
        }
    };
    tracing::debug!(
        path = %config.data_path.display(),
        write_mode = %config.write_mode,
        pretty = config.pretty,
        users = store.len(),
        "store opened"
    );

    let service = match UserService::new(Arc::new(store)) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(exit_code(&err));
        }
    };

    let outcome = run(&service, args.command);
    if args.metrics {
        match service.metrics().encode() {
            Ok(text) => eprint!("{text}"),
            Err(err) => tracing::warn!(error = %err, "failed to encode metrics"),
        }
    }
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(service: &UserService, command: Commands) -> Result<(), Error> {
    match command {
        Commands::List => print_json(&service.list_users()),
        Commands::Get { id } => print_json(&service.get_user(&id)?),
        Commands::Create { name, email } => {
            print_json(&service.create_user(UserInput::new(name, email))?)
        }
        Commands::Update { id, name, email } => {
            print_json(&service.update_user(&id, UserInput::new(name, email))?)
        }
        Commands::Delete { id } => service.delete_user(&id),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Error> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

// One code per error kind. 2 is left to clap for usage errors.
fn exit_code(err: &Error) -> u8 {
    match err.status_code() {
        404 => 3,
        409 => 4,
        400 => 5,
        _ => 1,
    }
}
