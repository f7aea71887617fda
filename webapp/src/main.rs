//! Frontend server: JSON pages over the MiniCRUD API.

use minicrud_webapp::{router, ApiClient, WebSettings, WebState};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("minicrud_webapp=info,minicrud=info")),
        )
        .init();

    let settings = WebSettings::from_env();
    let api = ApiClient::from_env()?;
    tracing::info!(api = %api.base_url(), "using MiniCRUD API");

    let app = router(WebState { api }).layer(TraceLayer::new_for_http());
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("webapp listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
