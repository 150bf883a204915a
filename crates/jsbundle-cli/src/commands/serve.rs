//! Dev server: static files from the bundle directory.

use axum::Router;
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tower_http::services::ServeDir;

/// Files under `dir`; a directory request gets its `index.html`.
pub fn router(dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(dir))
}

/// Serve `dir` on all interfaces until Ctrl-C.
pub async fn serve(dir: PathBuf, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    tracing::info!(port, dir = %dir.display(), "dev server listening");

    axum::serve(listener, router(&dir))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .into_diagnostic()
}
