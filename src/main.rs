use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use toplist_cms::auth::{NewToken, TokenGenerator, issue_token};
use toplist_cms::config::{FileConfig, ServerConfig};
use toplist_cms::error::Error;
use toplist_cms::import::{BrandImport, ToplistImport, import_brands, import_toplists};
use toplist_cms::media::{HttpLogoPipeline, LogoNormalizer, MediaStorage};
use toplist_cms::naming::domain_to_site_key;
use toplist_cms::server::{AppState, create_router};
use toplist_cms::store::{SqliteStore, Store};
use toplist_cms::types::{Role, User};

const NOT_INITIALIZED: &str =
    "Server not initialized. Run 'toplist-cms admin init' first to create the database and admin token.";

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "toplist-cms")]
#[command(about = "A multi-tenant content backend for affiliate toplists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve(ServeArgs),

    /// Bulk-import JSON documents straight into the database
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },

    /// Print the site key derived from a domain
    SiteKey {
        domain: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and admin token)
    Init {
        /// Data directory for the database and media
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import brands from a `{"brands": {...}}` document, fetching their logos
    Brands {
        file: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Import toplists for one site from an `{"items", "toplists", "pageMapping"}` document
    Toplists {
        site_key: String,

        file: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Settings shared by every command that opens the database.
#[derive(Args)]
struct SettingsArgs {
    /// TOML config file; flags given on the command line win over it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the database and media
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Public base URL for external access (e.g., "https://cms.example.com").
    /// Used for stored logo URLs.
    #[arg(long)]
    public_base_url: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to
    #[arg(long, short)]
    port: Option<u16>,

    /// Origin allowed by CORS; repeat for several. Defaults to any origin.
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    #[command(flatten)]
    settings: SettingsArgs,
}

impl SettingsArgs {
    fn load(self) -> anyhow::Result<ServerConfig> {
        let mut config = ServerConfig::default();
        if let Some(path) = &self.config {
            FileConfig::load(path)
                .with_context(|| format!("failed to read config {}", path.display()))?
                .apply(&mut config);
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if self.public_base_url.is_some() {
            config.public_base_url = self.public_base_url;
        }
        Ok(config)
    }
}

impl ServeArgs {
    fn load(self) -> anyhow::Result<ServerConfig> {
        let mut config = self.settings.load()?;
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if !self.cors_origins.is_empty() {
            config.cors_origins = self.cors_origins;
        }
        Ok(config)
    }
}

/// Opens the database of an initialized data directory.
fn open_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
    if !config.db_path().exists() {
        bail!(NOT_INITIALIZED);
    }
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_token()? {
        bail!(NOT_INITIALIZED);
    }
    Ok(store)
}

fn run_init(data_dir: PathBuf, non_interactive: bool) -> anyhow::Result<()> {
    fs::create_dir_all(&data_dir)?;

    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.data_dir.join(".admin_token");

    if store.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new();
    let (raw_token, _) = issue_token(
        &store,
        &generator,
        NewToken {
            is_admin: true,
            description: Some("created by admin init".to_string()),
            ..NewToken::default()
        },
    )?;

    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Admin token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    if !non_interactive {
        create_admin_user_prompt(&store, &generator)?;
    }

    Ok(())
}

fn create_admin_user_prompt(store: &SqliteStore, generator: &TokenGenerator) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create an admin user?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let email = inquire::Text::new("Email:")
        .with_validator(|input: &str| {
            let input = input.trim();
            if input.is_empty() {
                Ok(inquire::validator::Validation::Invalid(
                    "Email cannot be empty".into(),
                ))
            } else if !input.contains('@') || input.contains(char::is_whitespace) {
                Ok(inquire::validator::Validation::Invalid(
                    "Enter a valid email address".into(),
                ))
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.trim().to_lowercase(),
        name: None,
        role: Role::Admin,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&user, &[])?;

    let (raw_token, _) = issue_token(
        store,
        generator,
        NewToken {
            user_id: Some(user.id.clone()),
            ..NewToken::default()
        },
    )?;

    println!();
    println!("========================================");
    println!("Created admin user '{}' with token:", user.email);
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();

    Ok(())
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.load()?;
    let store = open_store(&config)?;

    let state = Arc::new(AppState::new(Arc::new(store), &config)?);

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn read_document<T: serde::de::DeserializeOwned>(file: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("malformed import document {}", file.display()))
}

async fn run_import(command: ImportCommands) -> anyhow::Result<()> {
    let report = match command {
        ImportCommands::Brands { file, settings } => {
            let doc: BrandImport = read_document(&file)?;
            let config = settings.load()?;
            let store = open_store(&config)?;

            let logos = HttpLogoPipeline::new(
                Arc::new(MediaStorage::new(&config.data_dir)),
                LogoNormalizer::new(config.logo_max_dimension),
                config.logo_max_bytes,
                config.fetch_timeout(),
                config.base_url(),
            )?;

            import_brands(&store, &logos, doc).await
        }
        ImportCommands::Toplists {
            site_key,
            file,
            settings,
        } => {
            let doc: ToplistImport = read_document(&file)?;
            let config = settings.load()?;
            let store = open_store(&config)?;

            match import_toplists(&store, &site_key, doc) {
                Ok(report) => report,
                Err(Error::NotFound) => bail!("Site '{site_key}' not found"),
                Err(e) => return Err(e.into()),
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("toplist_cms=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve(args) => run_serve(args).await?,
        Commands::Import { command } => run_import(command).await?,
        Commands::SiteKey { domain } => println!("{}", domain_to_site_key(&domain)),
    }

    Ok(())
}
