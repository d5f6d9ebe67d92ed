use crate::session::SessionAuth;
use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

/// Role label granting content-authoring affordances.
pub const INSTRUCTOR_GROUP: &str = "Instructors";

/// The authenticated user's profile and role set, as served by `GET /me/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub pk: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Identity {
    /// The one role check every view goes through.
    pub fn is_instructor(&self) -> bool {
        self.groups.iter().any(|group| group == INSTRUCTOR_GROUP)
    }

    /// The one ownership check every view goes through: does this identity
    /// own the resource with the given instructor reference?
    pub fn owns(&self, instructor_id: i64) -> bool {
        self.pk == instructor_id
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Session identity for pages that render both logged-in and anonymous.
///
/// Resolution: no token → anonymous. Token with a cached identity → cached.
/// Token seen for the first time → fetch `/me/` once; cache on success,
/// discard the token on any failure so the next request is anonymous (no
/// repeat attempts with a rejected credential).
pub struct MaybeUser {
    pub user: Option<Identity>,
    pub token: Option<String>,
}

impl MaybeUser {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = SessionAuth::from_request_parts(parts, state).await?;

        let Some(token) = auth.token().await else {
            return Ok(MaybeUser {
                user: None,
                token: None,
            });
        };

        if let Some(identity) = auth.identity().await {
            return Ok(MaybeUser {
                user: Some(identity),
                token: Some(token),
            });
        }

        match state.api.current_user(&token).await {
            Ok(identity) => {
                auth.cache_identity(&identity).await;
                Ok(MaybeUser {
                    user: Some(identity),
                    token: Some(token),
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Discarding session token: identity fetch failed");
                auth.clear().await;
                Ok(MaybeUser {
                    user: None,
                    token: None,
                })
            }
        }
    }
}

/// Session identity for pages that require login; redirects to /login
/// otherwise.
pub struct CurrentUser {
    pub user: Identity,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let maybe = MaybeUser::from_request_parts(parts, state).await?;

        match (maybe.user, maybe.token) {
            (Some(user), Some(token)) => Ok(CurrentUser { user, token }),
            _ => Err(Redirect::to("/login").into_response()),
        }
    }
}
