// crates/edge/src/cli.rs

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::fs::ContentDir;
use crate::graphql::GraphqlClient;
use crate::prerender;
use crate::router::{self, AppState};
use crate::Result;

/// Meridian CLI — site server and build tooling
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(cmd) => do_serve(cmd).await,
        Commands::Routes(cmd) => do_routes(cmd).await,
        Commands::Sitemap(cmd) => do_sitemap(cmd).await,
        Commands::HashPassword(cmd) => do_hash_password(cmd),
    };

    result.map_or_else(
        |e| {
            error!("meridian failed: {e}");
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[tracing::instrument(skip_all)]
async fn do_serve(cmd: ServeCmd) -> Result<()> {
    // load settings -> missing file is fine, every setting defaults
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::load_settings(cmd)?;
    info!(
        "Settings loaded in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // wire capabilities -> CMS client, cache, content dir, home store, auth
    let then = Utc::now();
    let process = process.wire_capabilities().await?;
    info!(
        "Capabilities wired in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // bind the listener before declaring readiness
    let then = Utc::now();
    let process = process.bind_listener().await?;
    info!(
        "Listener bound in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.serve().await?;
    info!("server stopped");
    Ok(())
}

#[tracing::instrument(skip_all)]
async fn do_routes(cmd: RoutesCmd) -> Result<()> {
    let settings = load_settings(&cmd.dir)?;
    let client = GraphqlClient::new(
        settings.cms.endpoint.clone(),
        Duration::from_secs(settings.cms.timeout_secs),
    )?;
    let content = ContentDir::new(cmd.dir.join(&settings.content.dir));

    let routes = prerender::collect_routes(&client, &content).await?;
    let out = cmd
        .dir
        .join(cmd.out.as_ref().unwrap_or(&settings.prerender.routes_out));
    tokio::fs::write(&out, prerender::routes_file(&routes)).await?;
    info!("{} routes written to {}", routes.len(), out.display());
    Ok(())
}

#[tracing::instrument(skip_all)]
async fn do_sitemap(cmd: SitemapCmd) -> Result<()> {
    let settings = load_settings(&cmd.dir)?;
    let client = GraphqlClient::new(
        settings.cms.endpoint.clone(),
        Duration::from_secs(settings.cms.timeout_secs),
    )?;
    let content = ContentDir::new(cmd.dir.join(&settings.content.dir));

    let routes = prerender::collect_routes(&client, &content).await?;
    let xml = prerender::sitemap_xml(&routes, &settings.seo.base_url);
    let out = cmd
        .dir
        .join(cmd.out.as_ref().unwrap_or(&settings.prerender.sitemap_out));
    tokio::fs::write(&out, xml).await?;
    info!("sitemap with {} routes written to {}", routes.len(), out.display());
    Ok(())
}

#[tracing::instrument(skip_all)]
fn do_hash_password(cmd: HashPasswordCmd) -> Result<()> {
    let hash = domain::security::password::hash_password(&cmd.password)?;
    println!("{hash}");
    Ok(())
}

/// Settings come from `<dir>/meridian.toml` plus `MERIDIAN_*` environment
/// overrides (double underscore nests, e.g. `MERIDIAN_SERVER__PORT`).
fn load_settings(dir: &Path) -> Result<Settings> {
    let config = config::Config::builder()
        .add_source(config::File::from(dir.join("meridian.toml")).required(false))
        .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"))
        .build()?;
    Ok(config.try_deserialize()?)
}

#[derive(Parser, Debug)]
#[command(name = "meridian", version, about = "Meridian site server and build tooling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the site API from the specified directory
    Serve(ServeCmd),
    /// Write the newline-delimited prerender route list
    Routes(RoutesCmd),
    /// Write the sitemap
    Sitemap(SitemapCmd),
    /// Hash a password for the users file
    HashPassword(HashPasswordCmd),
}

#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Site directory (or set MERIDIAN_DIR)
    ///
    /// Must exist and contain the content directory.
    #[arg(
        value_name = "DIR",
        env = "MERIDIAN_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct RoutesCmd {
    /// Site directory (or set MERIDIAN_DIR)
    #[arg(
        value_name = "DIR",
        env = "MERIDIAN_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,

    /// Output file; defaults to the configured prerender.routes_out
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SitemapCmd {
    /// Site directory (or set MERIDIAN_DIR)
    #[arg(
        value_name = "DIR",
        env = "MERIDIAN_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,

    /// Output file; defaults to the configured prerender.sitemap_out
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct HashPasswordCmd {
    /// Plaintext password to hash (argon2id)
    #[arg(value_name = "PASSWORD", required = true)]
    pub password: String,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Serve process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    command: ServeCmd,
    settings: Settings,
}

struct CapabilitiesWired {
    command: ServeCmd,
    settings: Settings,
    app: AppState,
}

struct ListenerBound {
    _command: ServeCmd,
    _settings: Settings,
    app: AppState,
    listener: TcpListener,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for CapabilitiesWired {}
impl ProcessState for ListenerBound {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn load_settings(command: ServeCmd) -> Result<StartProcess<SettingsLoaded>> {
        let settings = load_settings(&command.dir)?;
        Ok(StartProcess {
            state: SettingsLoaded { command, settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    async fn wire_capabilities(self) -> Result<StartProcess<CapabilitiesWired>> {
        let app = AppState::from_settings(&self.state.command.dir, &self.state.settings).await?;
        Ok(StartProcess {
            state: CapabilitiesWired {
                command: self.state.command,
                settings: self.state.settings,
                app,
            },
        })
    }
}

impl StartProcess<CapabilitiesWired> {
    #[tracing::instrument(skip_all)]
    async fn bind_listener(self) -> Result<StartProcess<ListenerBound>> {
        let addr = SocketAddr::from((
            self.state.settings.server.ip,
            self.state.settings.server.port,
        ));
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {addr}");
        Ok(StartProcess {
            state: ListenerBound {
                _command: self.state.command,
                _settings: self.state.settings,
                app: self.state.app,
                listener,
            },
        })
    }
}

impl StartProcess<ListenerBound> {
    /// Runs until ctrl-c, then drains in-flight requests.
    #[tracing::instrument(skip_all)]
    async fn serve(self) -> Result<()> {
        let router = router::build(self.state.app);
        axum::serve(self.state.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "shutdown signal unavailable");
    }
    info!("shutdown signal received");
}
