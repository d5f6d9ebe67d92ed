use crate::models::user::Identity;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

const TOKEN_KEY: &str = "token";
const IDENTITY_KEY: &str = "identity";

/// Explicit get/set/clear interface over the session-persisted credential
/// and the identity cached alongside it.
///
/// The token is the sole signal of "logged in"; the cached identity exists
/// so `/me/` is fetched once per token lifecycle, not once per request.
#[derive(Clone)]
pub struct SessionAuth {
    session: Session,
}

impl SessionAuth {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn token(&self) -> Option<String> {
        self.session.get(TOKEN_KEY).await.unwrap_or(None)
    }

    pub async fn set_token(&self, token: &str) {
        if let Err(e) = self.session.insert(TOKEN_KEY, token).await {
            tracing::error!(error = %e, "Failed to store session token");
        }
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.session.get(IDENTITY_KEY).await.unwrap_or(None)
    }

    pub async fn cache_identity(&self, identity: &Identity) {
        if let Err(e) = self.session.insert(IDENTITY_KEY, identity).await {
            tracing::error!(error = %e, "Failed to cache identity in session");
        }
    }

    /// Drop the token and everything derived from it.
    pub async fn clear(&self) {
        self.session.clear().await;
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await.map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to extract session",
            )
                .into_response()
        })?;

        Ok(Self::new(session))
    }
}
