use crate::session::SessionAuth;
use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Guard for pages that require a logged-in session. Token presence is the
/// only signal checked here; identity resolution happens in the extractors.
pub async fn require_login(auth: SessionAuth, request: Request<Body>, next: Next) -> Response {
    if auth.token().await.is_none() {
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}
