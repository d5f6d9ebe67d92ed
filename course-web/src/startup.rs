//! Router assembly and application lifecycle.

use crate::config::Settings;
use crate::handlers::{app, auth, courses, curriculum, dashboard, lessons, metrics, payment};
use crate::middleware::auth::require_login;
use crate::services::api_client::ApiClient;
use crate::AppState;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use platform_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub fn build_router(state: AppState) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    Router::new()
        .route("/", get(courses::list_page))
        .route("/health", get(app::health_check))
        .route("/metrics", get(metrics::metrics))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route(
            "/dashboard",
            get(dashboard::dashboard_page).layer(from_fn(require_login)),
        )
        .route("/courses", post(courses::create))
        .route(
            "/courses/new",
            get(courses::new_course_page).layer(from_fn(require_login)),
        )
        .route("/courses/:id", get(courses::detail_page))
        .route("/courses/:id/price", post(courses::update_price))
        .route("/courses/:id/modules", post(curriculum::create_module))
        .route(
            "/courses/:id/checkout",
            get(payment::checkout_page).layer(from_fn(require_login)),
        )
        .route("/courses/:id/verify-payment", post(payment::verify_payment))
        .route("/courses/:id/enroll", post(payment::free_enroll))
        .route("/modules/:id/rename", post(curriculum::rename_module))
        .route("/modules/:id/delete", post(curriculum::delete_module))
        .route("/modules/:id/lessons", post(curriculum::create_lesson))
        .route("/lessons/:id", get(lessons::lesson_page))
        .route("/lessons/:id/content", post(lessons::update_content))
        .route("/lessons/:id/rename", post(curriculum::rename_lesson))
        .route("/lessons/:id/delete", post(curriculum::delete_lesson))
        .route("/lessons/:id/complete", post(lessons::mark_complete))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
///
/// Binds on build (port 0 gives an ephemeral port for tests) and serves
/// until stopped.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let api = Arc::new(ApiClient::new(settings.course_api.clone()));
        let state = AppState::new(api, settings.checkout.clone());

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}
