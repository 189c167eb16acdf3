//! Stockwatch Service
//!
//! Low-stock alerting for commerce platform inventory webhooks.

use std::sync::Arc;

use clap::Parser;

use stockwatch::config::AppConfig;
use stockwatch::handlers::{status_router, AppState};
use stockwatch::notify::{ConsoleMailer, Mailer, SendGridMailer};
use stockwatch::pipeline::PipelineDeps;
use stockwatch::resolver::PlatformSkuResolver;
use stockwatch::store::InMemoryStore;
use stockwatch::webhook::{webhook_router, WebhookState};

/// Stockwatch low-stock alert service
#[derive(Parser, Debug)]
#[command(name = "stockwatch")]
#[command(version)]
#[command(about = "Low-stock email alerting for inventory webhooks")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;

    // Development stand-in for the external config store; in production the
    // admin UI owns these entities.
    let store = Arc::new(InMemoryStore::new());
    for shop in &config.seed.shops {
        store.register_shop(shop.clone()).await;
    }
    for sku in &config.seed.skus {
        store.add_sku(sku.clone()).await;
    }
    for recipient in &config.seed.recipients {
        store.add_recipient(recipient.clone()).await;
    }
    if let Some(min_stock) = config.seed.min_stock {
        store.set_threshold(min_stock).await;
    }

    let mailer: Arc<dyn Mailer> = match &config.sendgrid_key {
        Some(key) => Arc::new(SendGridMailer::new(key.clone())),
        None => Arc::new(ConsoleMailer),
    };

    let resolver = Arc::new(PlatformSkuResolver::new(
        config.platform_base_url.clone(),
        config.platform_token.clone(),
    ));

    let metrics = Arc::new(AppState::new());
    let webhook_state = Arc::new(WebhookState {
        sessions: store.clone(),
        pipeline: PipelineDeps {
            store,
            resolver,
            mailer,
            from_email: config.from_email.clone(),
        },
        metrics: metrics.clone(),
    });

    let app = webhook_router(webhook_state)
        .merge(status_router(metrics.clone()).with_state(metrics))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::new(config.bind_addr, args.port);
    tracing::info!("Stockwatch listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
