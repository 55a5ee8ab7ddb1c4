use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rmfx::log::init_logging;
use rmfx::mcp::RmfMcpServer;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the fund catalog and NAV history from the SEC API
    Refresh,
    /// Serve the catalog over MCP (stdio by default)
    Serve {
        /// Use HTTP transport instead of stdio
        #[arg(long)]
        http: bool,

        /// HTTP host to bind to (only used with --http)
        #[arg(long)]
        host: Option<String>,

        /// HTTP port (only used with --http)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Refresh) => {
            let config = rmfx::load_config(cli.config_path.as_deref())?;
            rmfx::refresh(&config).await
        }
        Some(Commands::Serve { http, host, port }) => {
            let config = rmfx::load_config(cli.config_path.as_deref())?;
            let store = rmfx::load_store(&config).await?;
            let server = RmfMcpServer::new(store);
            if http {
                let host = host.unwrap_or_else(|| config.server.host.clone());
                let port = port.unwrap_or(config.server.port);
                run_http_server(server, &host, port).await
            } else {
                run_stdio_server(server).await
            }
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> Result<()> {
    use anyhow::Context;

    let path = rmfx::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  sec:
    base_url: "https://api.sec.or.th"
    # api_key: "..."  # or set SEC_API_KEY

server:
  host: "127.0.0.1"
  port: 8080

history_days: 90
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

/// stdio transport, the default for local MCP clients.
async fn run_stdio_server(server: RmfMcpServer) -> Result<()> {
    use rmcp::{ServiceExt, transport::stdio};

    tracing::info!("Using stdio transport");

    let service = server.serve(stdio()).await?;
    tracing::info!("RMF MCP server ready");
    service.waiting().await?;

    Ok(())
}

#[cfg(feature = "http")]
async fn run_http_server(server: RmfMcpServer, host: &str, port: u16) -> Result<()> {
    use axum::Router;
    use rmcp::transport::streamable_http_server::{
        StreamableHttpService, session::local::LocalSessionManager,
    };
    use tower_http::cors::{Any, CorsLayer};

    tracing::info!("Using HTTP transport on {}:{}", host, port);

    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .nest_service("/mcp", mcp_service)
        .route("/health", axum::routing::get(health_check))
        .layer(cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("RMF MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install CTRL+C handler");
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

#[cfg(feature = "http")]
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(not(feature = "http"))]
async fn run_http_server(_server: RmfMcpServer, _host: &str, _port: u16) -> Result<()> {
    anyhow::bail!("HTTP transport not available. Rebuild with: cargo build --features http")
}
