mod file_store;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use spendlens_core::{
    build_key,
    cache::KeyArg,
    config::Config,
    logging,
    models::{FilterState, Permission, Role, UserRecord},
    platform::SystemClock,
    Access, FilterTranslator, SessionStore, TenantSegment,
};

use file_store::FileStore;

#[derive(Parser, Debug)]
#[command(name = "spendlens")]
#[command(about = "SpendLens access control and cache key tooling", long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, env = "SPENDLENS_CONFIG")]
    config: Option<String>,

    /// Keep the configured log level instead of only showing warnings
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cache key for a query
    Key(KeyArgs),
    /// Print the permission matrix
    Permissions {
        /// Only this role
        #[arg(long)]
        role: Option<Role>,
    },
    /// Inspect or drive a session persisted in a JSON file
    Session {
        /// Session file
        #[arg(long, env = "SPENDLENS_SESSION_FILE", default_value = "spendlens-session.json")]
        file: PathBuf,

        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Query domain, e.g. analytics
    #[arg(long)]
    domain: String,

    /// Resource within the domain, e.g. overview
    #[arg(long)]
    resource: String,

    /// Positional arguments; integers and booleans are typed
    #[arg(long = "arg")]
    args: Vec<String>,

    /// Filter state as JSON, e.g. '{"suppliers":["Acme"]}'
    #[arg(long)]
    filters: Option<String>,

    /// Target organization instead of the caller's own
    #[arg(long)]
    org: Option<i64>,

    /// Also print the translated API parameters
    #[arg(long)]
    translate: bool,
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Show whether the session is active and how long it has left
    Status,
    /// Start a session
    Login {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "viewer")]
        role: Role,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        org: Option<i64>,
        #[arg(long)]
        super_admin: bool,
    },
    /// Record activity now
    Touch,
    /// End the session
    Logout,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        anyhow::bail!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        );
    }

    if !cli.verbose {
        config.logging.level = "warn".to_string();
    }
    logging::init_logging(&config.logging)?;
    debug!(?cli, "Starting");

    match cli.command {
        Command::Key(args) => print_key(&args),
        Command::Permissions { role } => {
            print_permissions(role);
            Ok(())
        }
        Command::Session { file, action } => run_session(&config, file, action),
    }
}

fn print_key(args: &KeyArgs) -> Result<()> {
    let filters: Option<FilterState> = args
        .filters
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("invalid --filters JSON")?;

    let key = build_key(
        &args.domain,
        &args.resource,
        args.args.iter().map(String::as_str).map(parse_arg),
        filters.as_ref(),
        TenantSegment::from(args.org),
    );
    println!("{key}");

    if args.translate {
        let api = filters
            .as_ref()
            .and_then(|f| FilterTranslator::new().translate(f));
        println!("{}", serde_json::to_string_pretty(&api)?);
    }
    Ok(())
}

/// Integers and booleans keep their type in the key; anything else is a string.
fn parse_arg(raw: &str) -> KeyArg {
    if let Ok(n) = raw.parse::<i64>() {
        return KeyArg::Int(n);
    }
    match raw {
        "true" => KeyArg::Bool(true),
        "false" => KeyArg::Bool(false),
        _ => KeyArg::Str(raw.to_string()),
    }
}

fn permission_matrix(roles: &[Role]) -> Vec<String> {
    let mut lines = Vec::with_capacity(roles.len() + 1);

    let header: Vec<&str> = Permission::ALL.iter().map(|p| p.as_str()).collect();
    lines.push(format!("{:<8} {}", "role", header.join(" ")));

    for &role in roles {
        let access = Access::new(Some(role), false);
        let cells: Vec<String> = Permission::ALL
            .iter()
            .map(|&p| {
                let mark = if access.has_permission(p) { "x" } else { "-" };
                format!("{mark:<width$}", width = p.as_str().len())
            })
            .collect();
        lines.push(format!("{:<8} {}", role.as_str(), cells.join(" ")));
    }
    lines
}

fn print_permissions(role: Option<Role>) {
    let roles = role.map_or_else(|| Role::ALL.to_vec(), |r| vec![r]);
    for line in permission_matrix(&roles) {
        println!("{}", line.trim_end());
    }
}

fn run_session(config: &Config, file: PathBuf, action: SessionAction) -> Result<()> {
    let storage = FileStore::open(&file)
        .with_context(|| format!("failed to open session file {}", file.display()))?;
    let store = SessionStore::new(Arc::new(SystemClock), Arc::new(storage), &config.session);

    match action {
        SessionAction::Status => {}
        SessionAction::Login {
            id,
            email,
            role,
            name,
            org,
            super_admin,
        } => {
            let mut user = UserRecord::new(id, email, role).with_super_admin(super_admin);
            user.name = name;
            user.organization_id = org;
            store.initialize(&user)?;
            info!(path = %file.display(), "Session written");
        }
        SessionAction::Touch => {
            if store.is_active() {
                store.touch()?;
            } else {
                eprintln!("No active session");
            }
        }
        SessionAction::Logout => store.logout(),
    }

    let user = store.current_user();
    let remaining_ms = if user.is_some() { store.remaining_millis() } else { 0 };
    let permissions: Option<Vec<&str>> = user.as_ref().map(|u| {
        Access::for_user(u)
            .permissions()
            .iter()
            .map(Permission::as_str)
            .collect()
    });
    let status = json!({
        "active": user.is_some(),
        "remaining_ms": remaining_ms,
        "last_activity_at": store.snapshot().last_activity_at,
        "user": user,
        "permissions": permissions,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
