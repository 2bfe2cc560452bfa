use std::path::PathBuf;
use std::sync::Arc;

use booking_client::config::{ClientConfig, ConfigError, normalize_base_url};
use booking_client::nav::{NavigationError, Route};
use booking_client::net::types::{
    BookingRequest, DEFAULT_SLOT_MINUTES, RegisterRequest, SlotCreate, TenantCreate, UserCreate,
};
use booking_client::state::session::LOGIN_FAILED;
use booking_client::storage::FileTokenStore;
use booking_client::{ApiError, BookingApp, TransportError};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("could not locate a config directory; pass --token-file or set BOOKING_TOKEN_FILE")]
    NoConfigDir,
    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Rejected(String),
    #[error("not logged in; run `booking login` first")]
    NotLoggedIn,
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "booking", about = "Multi-tenant booking API client")]
struct Cli {
    /// Overrides `BOOKING_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "BOOKING_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKING_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKING_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Show the signed-in user.
    Me,
    Tenants(TenantsCommand),
    Slots(SlotsCommand),
    Admin(AdminCommand),
    /// Run the navigation guard for a path and print where it lands.
    Open { path: String },
}

#[derive(Args, Debug)]
struct TenantsCommand {
    #[command(subcommand)]
    command: TenantsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TenantsSubcommand {
    List,
    Show {
        username: String,
    },
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        email: String,
    },
    Delete {
        tenant_id: i64,
    },
}

#[derive(Args, Debug)]
struct SlotsCommand {
    #[command(subcommand)]
    command: SlotsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SlotsSubcommand {
    List {
        tenant_id: i64,
    },
    Available {
        username: String,
    },
    Create {
        tenant_id: i64,
        #[arg(long, help = "Start time, e.g. 2025-03-14T09:00:00")]
        at: NaiveDateTime,
        #[arg(long, default_value_t = DEFAULT_SLOT_MINUTES)]
        duration: i64,
    },
    Book {
        username: String,
        slot_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    Delete {
        slot_id: i64,
    },
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Stats,
    Users,
    Tenants,
    Slots,
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKING_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    if let Ok(path) = &dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = &cli.base_url {
        config.base_url = normalize_base_url(raw)?;
    }
    let token_file = match cli.token_file {
        Some(path) => path,
        None => default_token_file(&config.token_key)?,
    };
    tracing::debug!(base_url = %config.base_url, token_file = %token_file.display(), "starting");

    let tokens = Arc::new(FileTokenStore::new(token_file));
    let app = BookingApp::from_config(&config, tokens, "/")?;

    let result = run(&app, cli.command).await;
    if let Some(route) = app.drain_events().await {
        eprintln!("session expired; sign in again (now at {route})");
    }
    result
}

fn default_token_file(token_key: &str) -> Result<PathBuf, CliError> {
    let dir = dirs::config_dir().ok_or(CliError::NoConfigDir)?;
    Ok(dir.join("booking").join(token_key))
}

async fn run(app: &BookingApp, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => run_login(app, &email, &password).await,
        Command::Logout => {
            app.session.logout().await;
            print_json(&json!({ "status": "logged out" }))
        }
        Command::Register { email, password, first_name, last_name } => {
            let request = RegisterRequest { email, password, first_name, last_name };
            let user = app.session.register(&request).await?;
            print_json(&user)
        }
        Command::Me => {
            app.start().await;
            let user = app.session.snapshot().user.ok_or(CliError::NotLoggedIn)?;
            print_json(&user)
        }
        Command::Tenants(tenants) => run_tenants(app, tenants).await,
        Command::Slots(slots) => run_slots(app, slots).await,
        Command::Admin(admin) => run_admin(app, admin).await,
        Command::Open { path } => {
            let route = app.router.navigate(&path).await?;
            print_json(&json!({
                "requested": path,
                "route": route.to_string(),
                "location": app.router.location().path(),
                "redirected": route != Route::parse(&path),
            }))
        }
    }
}

async fn run_login(app: &BookingApp, email: &str, password: &str) -> Result<(), CliError> {
    // Auth-page semantics: a 401 here is a bad password, not an expired session.
    app.router.location().set(Route::Login.path());
    if !app.session.login(email, password).await {
        let message = app.session.snapshot().error.unwrap_or_else(|| LOGIN_FAILED.to_owned());
        return Err(CliError::Rejected(message));
    }
    let state = app.session.snapshot();
    print_json(&json!({ "status": "logged in", "user": state.user }))
}

async fn run_tenants(app: &BookingApp, tenants: TenantsCommand) -> Result<(), CliError> {
    match tenants.command {
        TenantsSubcommand::List => {
            app.tenants.fetch_user_tenants().await;
            let state = app.tenants.snapshot();
            settled(state.error, &state.tenants)
        }
        TenantsSubcommand::Show { username } => match app.tenants.fetch_tenant_by_username(&username).await {
            Some(profile) => print_json(&profile),
            None => Err(rejected(app.tenants.snapshot().error)),
        },
        TenantsSubcommand::Create { username, display_name, email } => {
            let data = TenantCreate { username, display_name, email, ..TenantCreate::default() };
            let tenant = app.tenants.create_tenant(&data).await?;
            print_json(&tenant)
        }
        TenantsSubcommand::Delete { tenant_id } => {
            app.tenants.delete_tenant(tenant_id).await?;
            print_json(&json!({ "deleted": tenant_id }))
        }
    }
}

async fn run_slots(app: &BookingApp, slots: SlotsCommand) -> Result<(), CliError> {
    match slots.command {
        SlotsSubcommand::List { tenant_id } => {
            app.slots.fetch_tenant_slots(tenant_id).await;
            let state = app.slots.snapshot();
            settled(state.error, &state.slots)
        }
        SlotsSubcommand::Available { username } => {
            app.slots.fetch_available_slots(&username).await;
            let state = app.slots.snapshot();
            settled(state.error, &state.available)
        }
        SlotsSubcommand::Create { tenant_id, at, duration } => {
            let data = SlotCreate { tenant_id, datetime: at, duration_minutes: duration };
            let slot = app.slots.create_slot(tenant_id, &data).await?;
            print_json(&slot)
        }
        SlotsSubcommand::Book { username, slot_id, name, email, phone, message } => {
            let booking = BookingRequest {
                client_name: name,
                client_email: email,
                client_phone: phone,
                client_message: message,
            };
            let confirmation = app.slots.book_slot(&username, slot_id, &booking).await?;
            print_json(&confirmation)
        }
        SlotsSubcommand::Delete { slot_id } => {
            app.slots.delete_slot(slot_id).await?;
            print_json(&json!({ "deleted": slot_id }))
        }
    }
}

async fn run_admin(app: &BookingApp, admin: AdminCommand) -> Result<(), CliError> {
    let store = &app.admin;
    match admin.command {
        AdminSubcommand::Stats => {
            store.fetch_stats().await;
            let state = store.snapshot();
            settled(state.error, &state.stats)
        }
        AdminSubcommand::Users => {
            store.fetch_users().await;
            let state = store.snapshot();
            settled(state.error, &state.users)
        }
        AdminSubcommand::Tenants => {
            store.fetch_tenants().await;
            let state = store.snapshot();
            settled(state.error, &state.tenants)
        }
        AdminSubcommand::Slots => {
            store.fetch_slots().await;
            let state = store.snapshot();
            settled(state.error, &state.slots)
        }
        AdminSubcommand::CreateUser { email, password, first_name, last_name } => {
            let data = UserCreate { email, password, first_name, last_name };
            let user = store.create_user(&data).await?;
            print_json(&user)
        }
    }
}

/// Store reads record failures instead of returning them; surface them here.
fn settled<T: Serialize + ?Sized>(error: Option<String>, value: &T) -> Result<(), CliError> {
    match error {
        Some(message) => Err(CliError::Rejected(message)),
        None => print_json(value),
    }
}

fn rejected(error: Option<String>) -> CliError {
    CliError::Rejected(error.unwrap_or_else(|| "request failed".to_owned()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
