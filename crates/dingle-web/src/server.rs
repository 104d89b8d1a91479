//! HTTP server wrapping the dingle router.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::HttpServerConfig;
use crate::routes::build_router;
use crate::state::AppState;

pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        Self {
            config,
            router: build_router(state),
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> std::io::Result<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("dingle-web listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router).await
    }
}
