use anyhow::Context;
use clap::Parser;
use forwarding_gateway::api::build_routes;
use forwarding_gateway::core::logger::init_logger;
use forwarding_gateway::core::models::GatewayConfig;
use forwarding_gateway::core::storage::ConfigStorage;
use forwarding_gateway::state::AppState;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(short, long, env = "BIND_ADDRESS", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// JSON configuration file; flags and environment override its values
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "BACKEND_URL")]
    backend_url: Option<String>,

    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Marks issued cookies `Secure`
    #[arg(long)]
    production: bool,

    /// Enables the daily-rolling log file
    #[arg(long, env = "LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Write the effective configuration to `--config` and exit
    #[arg(long, requires = "config")]
    init_config: bool,
}

impl Args {
    fn production(&self) -> bool {
        self.production
            || std::env::var("APP_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("production"))
    }

    fn load_config(&self) -> anyhow::Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) if path.exists() => ConfigStorage::load(path)?,
            Some(path) if !self.init_config => {
                anyhow::bail!("config file {} does not exist", path.display())
            }
            _ => GatewayConfig::default(),
        };

        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(secret) = self.session_secret.as_ref().filter(|s| !s.is_empty()) {
            config.session_secret = Some(secret.clone());
        }
        if self.production() {
            config.secure_cookies = true;
        }
        Ok(config)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logger(args.log_dir.as_deref());

    let config = args.load_config()?;

    if args.init_config {
        if let Some(path) = &args.config {
            ConfigStorage::save(path, &config)?;
            tracing::info!("Configuration written to {}", path.display());
        }
        return Ok(());
    }

    let state = AppState::new(config).context("failed to initialize gateway")?;
    tracing::info!("Gateway config: {:?}", state.config);

    if !state.gateway.resolver().codec().has_secret() {
        tracing::warn!("No session secret configured; admin routes will answer 401");
    }
    tracing::warn!(
        "Cron routes only check that X-CRON-SECRET is present; the backend must validate its value"
    );

    let app = build_routes(Arc::new(state));

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
