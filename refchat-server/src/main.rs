use clap::Parser;
use refchat_core::{FileSessionStore, RefchatConfig, SessionStore};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "refchat.toml")]
    config: String,

    /// Override the sessions file from the config
    #[arg(long)]
    store: Option<String>,

    /// Override the listen port from the config
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Load the store, print its status and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience - production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let mut config = match RefchatConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };
    if let Some(store) = args.store {
        config.store.path = store;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    // Init logging
    let default_level = config
        .service
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    if args.health {
        let store = FileSessionStore::open(&config.store.path).await;
        let count = store.count().await?;
        println!("✅ Session store: {}", store.path().display());
        println!("✅ Sessions: {}", count);
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    refchat_server::http::start_http_server(config, tx.subscribe()).await?;

    Ok(())
}
