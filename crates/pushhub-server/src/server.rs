use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use pushhub_notifications::{PushDelivery, WebPushDelivery};
use pushhub_storage::DynSubscriptionStore;
use tokio::sync::watch;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::subscriptions::{PushDispatcher, PushSweep, SubscriptionRegistry, handlers as subs};
use crate::{handlers, middleware as app_middleware, storage};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: SubscriptionRegistry,
    pub dispatcher: PushDispatcher,
    /// Served at `/vapid-public-key` when set.
    pub vapid_public_key: Option<String>,
}

impl AppState {
    pub fn new(store: DynSubscriptionStore, delivery: Arc<dyn PushDelivery>) -> Self {
        let registry = SubscriptionRegistry::new(store);
        let dispatcher = PushDispatcher::new(registry.clone(), delivery);
        Self {
            registry,
            dispatcher,
            vapid_public_key: None,
        }
    }

    pub fn with_vapid_public_key(mut self, key: impl Into<String>) -> Self {
        self.vapid_public_key = Some(key.into());
        self
    }
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        .route("/vapid-public-key", get(handlers::vapid_public_key))
        // Subscriptions
        .route(
            "/subscriptions",
            get(subs::list_subscriptions).post(subs::create_subscription),
        )
        .route(
            "/subscriptions/{id}",
            get(subs::get_subscription).delete(subs::delete_subscription),
        )
        .route("/send-push/{id}", post(subs::send_push))
        // Route layer so MatchedPath is available
        .route_layer(middleware::from_fn(app_middleware::http_metrics))
        // Middleware stack (order: request id -> compression/cors/trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .headers()
                        .get(app_middleware::REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[derive(Default)]
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<DynSubscriptionStore>,
    delivery: Option<Arc<dyn PushDelivery>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Use `store` instead of opening the configured backend.
    pub fn with_store(mut self, store: DynSubscriptionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `delivery` instead of web push with the configured VAPID keys.
    pub fn with_delivery(mut self, delivery: Arc<dyn PushDelivery>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub async fn build(self) -> anyhow::Result<PushhubServer> {
        let config = self.config;
        config.validate().map_err(anyhow::Error::msg)?;

        let store = match self.store {
            Some(store) => store,
            None => storage::create_store(&config.storage).await?,
        };
        tracing::info!(backend = store.backend_name(), "Subscription store ready");

        let delivery: Arc<dyn PushDelivery> = match self.delivery {
            Some(delivery) => delivery,
            None => Arc::new(WebPushDelivery::new(&config.vapid, config.push.ttl_secs)?),
        };

        let mut state = AppState::new(store.clone(), delivery.clone());
        if !config.vapid.public_key.is_empty() {
            state = state.with_vapid_public_key(config.vapid.public_key.clone());
        }

        let sweep = config.sweep.enabled.then(|| {
            Arc::new(PushSweep::new(
                state.registry.clone(),
                delivery,
                config.sweep.clone(),
            ))
        });
        if sweep.is_none() {
            tracing::info!("Push sweep disabled");
        }

        let app = build_app(state, &config);
        Ok(PushhubServer {
            addr: config.addr(),
            app,
            store,
            sweep,
            config,
        })
    }
}

pub struct PushhubServer {
    addr: SocketAddr,
    app: Router,
    store: DynSubscriptionStore,
    sweep: Option<Arc<PushSweep>>,
    config: AppConfig,
}

impl PushhubServer {
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Serves until SIGINT/SIGTERM, then stops the sweep and closes the store.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweep_handle = self
            .sweep
            .map(|sweep| sweep.spawn(self.config.sweep.interval(), shutdown_rx));

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        let _ = shutdown_tx.send(true);
        if let Some(handle) = sweep_handle
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "Push sweep task failed");
        }

        self.store.close().await;
        tracing::info!("shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}
