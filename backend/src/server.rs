use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::assets::ASSETS_ROUTE;
use crate::routes;
use crate::{state::AppContext, types::Environment};

/// Upper bound for a whole request, sized for a 1 GiB upload plus remuxing
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Builds the application router over `context`
///
/// Thumbnails written to disk are served under `/assets` when that strategy is configured.
pub fn router(environment: Environment, context: &AppContext) -> Router {
    let mut openapi = OpenApi::default();

    let mut router = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(context.config.clone()))
        .layer(Extension(context.jwt_manager.clone()))
        .layer(Extension(context.videos.clone()))
        .layer(Extension(context.url_issuer.clone()))
        .layer(Extension(context.thumbnail_uploader.clone()))
        .layer(Extension(context.video_uploader.clone()));

    if let Some(assets_root) = context.config.assets_root() {
        router = router.nest_service(ASSETS_ROUTE, ServeDir::new(assets_root));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment, context: AppContext) -> anyhow::Result<()> {
    let router = router(environment, &context);

    if let Some(assets_root) = context.config.assets_root() {
        tokio::fs::create_dir_all(assets_root).await?;
    }
    tokio::fs::create_dir_all(&context.config.scratch_dir).await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], context.config.port));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Tubely backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
