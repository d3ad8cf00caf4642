use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use tokengate_api::{ApiRouter, ApiState};
use tokengate_auth::{AuthGate, MemoryBackend, SledBackend};
use tokengate_core::KvBackend;

use crate::config::{BackendConfig, BackendKind, Config};

pub struct Application {
    config: Config,
    state: Arc<ApiState>,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let backend = connect_backend(&config.backend).await?;

        let gate = Arc::new(AuthGate::new(config.auth.clone(), backend)?);
        info!(
            ttl_seconds = config.auth.ttl_seconds,
            token_length = config.auth.token_length,
            debug_logging = config.auth.debug_logging,
            "auth gate initialized"
        );

        let state = Arc::new(ApiState::new(gate));
        Ok(Self { config, state })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let mut router = ApiRouter::new(self.state.clone());
        if let Some(origin) = self.config.server.cors_origin.as_deref() {
            if !origin.is_empty() {
                router = router.with_cors_origin(origin);
            }
        }
        let app = router.build();

        let addr = self.config.server.bind_address;
        let listener = TcpListener::bind(addr).await?;
        info!(address = %addr, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server shutdown complete");
        Ok(())
    }
}

async fn connect_backend(config: &BackendConfig) -> anyhow::Result<Arc<dyn KvBackend>> {
    match config.kind {
        BackendKind::Memory => {
            info!("using in-memory token backend");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Sled => {
            let data_dir = config.data_dir.join("sessions");
            std::fs::create_dir_all(&data_dir)?;
            let backend = SledBackend::new(&data_dir)?;
            info!(path = %data_dir.display(), "using sled token backend");
            Ok(Arc::new(backend))
        }
        #[cfg(feature = "redis")]
        BackendKind::Redis => {
            let backend = tokengate_auth::RedisBackend::connect(&config.redis_url).await?;
            info!(url = %config.redis_url, "using redis token backend");
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "redis"))]
        BackendKind::Redis => {
            anyhow::bail!("redis backend requested but the server was built without the redis feature")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
