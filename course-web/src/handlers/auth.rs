use crate::errors::{ApiError, FieldErrors, PageError};
use crate::handlers::Nav;
use crate::models::user::MaybeUser;
use crate::services::api_client::RegisterPayload;
use crate::session::SessionAuth;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub username: String,
    pub email: String,
    pub errors: FieldErrors,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 150, message = "Enter a username."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "Passwords do not match."))]
    pub password2: String,
}

pub async fn login_page(maybe: MaybeUser) -> impl IntoResponse {
    LoginTemplate {
        nav: Nav::for_user(maybe.user.as_ref()),
        email: String::new(),
        error: None,
    }
}

/// Exchange credentials for a token and persist it in the session. The
/// identity itself is resolved on the next page load, once per token.
pub async fn login(
    State(state): State<AppState>,
    auth: SessionAuth,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.api.login(&form.email, &form.password).await {
        Ok(key) => {
            // Drop any previous login before storing the new credential
            auth.clear().await;
            auth.set_token(&key).await;
            tracing::info!(email = %form.email, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(ApiError::Validation(_)) | Err(ApiError::TokenRejected) => {
            let template = LoginTemplate {
                nav: Nav::anonymous(),
                email: form.email,
                error: Some("Login failed. Please check your credentials.".to_string()),
            };
            Ok(template.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn register_page(maybe: MaybeUser) -> impl IntoResponse {
    RegisterTemplate {
        nav: Nav::for_user(maybe.user.as_ref()),
        username: String::new(),
        email: String::new(),
        errors: FieldErrors::default(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    if let Err(validation) = form.validate() {
        let template = RegisterTemplate {
            nav: Nav::anonymous(),
            username: form.username,
            email: form.email,
            errors: FieldErrors::from_validation(&validation),
        };
        return Ok(template.into_response());
    }

    let payload = RegisterPayload {
        username: form.username.clone(),
        email: form.email.clone(),
        password1: form.password1,
        password2: form.password2,
    };

    match state.api.register(&payload).await {
        Ok(()) => {
            tracing::info!(email = %form.email, "User registered");
            Ok(Redirect::to("/login").into_response())
        }
        Err(ApiError::Validation(errors)) => {
            let template = RegisterTemplate {
                nav: Nav::anonymous(),
                username: form.username,
                email: form.email,
                errors,
            };
            Ok(template.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout(auth: SessionAuth) -> impl IntoResponse {
    auth.clear().await;
    Redirect::to("/login")
}
