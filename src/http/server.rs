//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared [`AppState`] (stores, registries, clock)
//! - Create the Axum router with one throttle preset per route group
//! - Wire up middleware (request id, tracing, timeout)
//! - Start the sweepers and serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::clock::{SharedClock, SystemClock};
use crate::config::GuardConfig;
use crate::dsar::DsarBook;
use crate::http::request::{MakeRequestUuid, MakeSpanWithRequestId};
use crate::http::{auth, public};
use crate::lifecycle::Sweeper;
use crate::security::credentials::AccountDirectory;
use crate::security::login_guard::{LoginGuard, LoginGuardPolicy, MemoryLoginGuard};
use crate::security::rate_limit::{
    rate_limit_middleware, MemoryThrottle, RatePreset, RequestThrottle, ThrottleLayerState,
};
use crate::websites::WebsiteRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GuardConfig>,
    pub clock: SharedClock,
    pub throttle: Arc<dyn RequestThrottle>,
    pub login_guard: Arc<dyn LoginGuard>,
    pub accounts: Arc<AccountDirectory>,
    pub websites: Arc<WebsiteRegistry>,
    pub dsar: Arc<DsarBook>,
}

impl AppState {
    pub fn new(config: GuardConfig, clock: SharedClock) -> Self {
        let throttle = Arc::new(MemoryThrottle::new(clock.clone()));
        let login_guard = Arc::new(MemoryLoginGuard::new(
            LoginGuardPolicy::from(&config.login_guard),
            clock.clone(),
        ));

        Self {
            accounts: Arc::new(AccountDirectory::from_config(&config.accounts)),
            websites: Arc::new(WebsiteRegistry::from_config(&config.websites)),
            dsar: Arc::new(DsarBook::new(clock.clone())),
            throttle,
            login_guard,
            clock,
            config: Arc::new(config),
        }
    }

    fn throttle_layer(&self, preset: RatePreset) -> ThrottleLayerState {
        ThrottleLayerState {
            throttle: self.throttle.clone(),
            preset,
            policy: preset.policy(&self.config.rate_limit),
            enabled: self.config.rate_limit.enabled,
        }
    }
}

/// HTTP server for consent-guard.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server on the system clock.
    pub fn new(config: GuardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: GuardConfig, clock: SharedClock) -> Self {
        let state = AppState::new(config, clock);
        let router = Self::build_router(&state);
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let throttled = |router: Router<AppState>, preset: RatePreset| {
            router.route_layer(middleware::from_fn_with_state(
                state.throttle_layer(preset),
                rate_limit_middleware,
            ))
        };

        let widget = Router::new().route(
            "/api/public/widget/{website_id}",
            get(public::widget_config).options(public::widget_preflight),
        );
        let forms = Router::new()
            .route(
                "/api/public/consent",
                post(public::submit_consent).options(public::form_preflight),
            )
            .route(
                "/api/public/dsar",
                post(public::submit_dsar).options(public::form_preflight),
            );
        let sign_in = Router::new().route("/api/auth/login", post(auth::login));

        let mut router = Router::new()
            .route("/health", get(health))
            .merge(throttled(widget, RatePreset::Lenient))
            .merge(throttled(forms, RatePreset::PublicForm))
            .merge(throttled(sign_in, RatePreset::Strict));

        if state.config.admin.enabled {
            router = router.merge(throttled(
                admin::setup_admin_router(state.clone()),
                RatePreset::Standard,
            ));
        }

        router.with_state(state.clone()).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(MakeSpanWithRequestId))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    state.config.timeouts.request_secs,
                ))),
        )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Sweepers start with the server and stop on the same shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let config = &self.state.config;
        tracing::info!(
            address = %addr,
            websites = self.state.websites.len(),
            accounts = self.state.accounts.len(),
            admin = config.admin.enabled,
            "HTTP server starting"
        );

        let sweepers = [
            Sweeper::new(
                "throttle",
                self.state.throttle.clone(),
                Duration::from_secs(config.rate_limit.sweep_interval_secs),
            )
            .spawn(shutdown.resubscribe()),
            Sweeper::new(
                "login_guard",
                self.state.login_guard.clone(),
                Duration::from_secs(config.login_guard.sweep_interval_secs),
            )
            .spawn(shutdown.resubscribe()),
        ];

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        for sweeper in sweepers {
            let _ = sweeper.await;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
