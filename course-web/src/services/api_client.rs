//! Typed gateway to the course REST API.
//!
//! One method per remote operation; each is a single request/response with
//! no retry. The session token is injected as `Authorization: Token <value>`
//! when present, and trace context is propagated on every call.

use crate::config::CourseApiSettings;
use crate::errors::ApiError;
use crate::models::course::{Course, CourseSummary, Lesson};
use crate::models::user::Identity;
use metrics::counter;
use platform_core::observability::{TracedClientExt, TracedRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub struct ApiClient {
    client: Client,
    settings: CourseApiSettings,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    key: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Order descriptor returned by the create-order endpoint; the fields the
/// checkout widget needs. Amount is in the smallest currency unit.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// Payment proof handed back by the checkout widget on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

impl ApiClient {
    pub fn new(settings: CourseApiSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    fn authed(&self, request: TracedRequest, token: Option<&str>) -> TracedRequest {
        match token {
            Some(token) => request.header("Authorization", &format!("Token {token}")),
            None => request,
        }
    }

    /// Send a request, record the outcome, and map error statuses into the
    /// gateway error taxonomy.
    async fn execute(
        &self,
        operation: &'static str,
        request: TracedRequest,
    ) -> Result<reqwest::Response, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                counter!(
                    "course_api_requests_total",
                    "operation" => operation,
                    "status" => "unreachable"
                )
                .increment(1);
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        counter!(
            "course_api_requests_total",
            "operation" => operation,
            "status" => status.as_u16().to_string()
        )
        .increment(1);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(operation, status = %status, "Course API call failed");
        Err(ApiError::from_status(status, body))
    }

    // --- auth ---

    /// `POST /auth/login/`; returns the session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .traced_post(&self.url("/auth/login/"))
            .json(&json!({ "email": email, "password": password }));

        let response = self.execute("login", request).await?;
        let tokens: LoginResponse = response.json().await.map_err(ApiError::Decode)?;
        Ok(tokens.key)
    }

    /// `POST /auth/registration/`.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<(), ApiError> {
        let request = self
            .client
            .traced_post(&self.url("/auth/registration/"))
            .json(payload);

        self.execute("register", request).await?;
        Ok(())
    }

    /// `GET /me/`.
    pub async fn current_user(&self, token: &str) -> Result<Identity, ApiError> {
        let request = self.authed(self.client.traced_get(&self.url("/me/")), Some(token));
        let response = self.execute("current_user", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    // --- courses ---

    pub async fn list_courses(&self, token: Option<&str>) -> Result<Vec<CourseSummary>, ApiError> {
        let request = self.authed(self.client.traced_get(&self.url("/courses/")), token);
        let response = self.execute("list_courses", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn course(&self, token: Option<&str>, id: i64) -> Result<Course, ApiError> {
        let request = self.authed(
            self.client.traced_get(&self.url(&format!("/courses/{id}/"))),
            token,
        );
        let response = self.execute("course", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn create_course(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> Result<Course, ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url("/courses/"))
                .json(&json!({ "title": title, "description": description })),
            Some(token),
        );
        let response = self.execute("create_course", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn set_course_price(&self, token: &str, id: i64, price: &str) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_patch(&self.url(&format!("/courses/{id}/")))
                .json(&json!({ "price": price })),
            Some(token),
        );
        self.execute("set_course_price", request).await?;
        Ok(())
    }

    pub async fn my_courses(&self, token: &str) -> Result<Vec<CourseSummary>, ApiError> {
        let request = self.authed(self.client.traced_get(&self.url("/my-courses/")), Some(token));
        let response = self.execute("my_courses", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    // --- curriculum ---

    pub async fn create_module(
        &self,
        token: &str,
        course: i64,
        title: &str,
        order: u32,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url("/modules/"))
                .json(&json!({ "course": course, "title": title, "order": order })),
            Some(token),
        );
        self.execute("create_module", request).await?;
        Ok(())
    }

    pub async fn rename_module(&self, token: &str, id: i64, title: &str) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_patch(&self.url(&format!("/modules/{id}/")))
                .json(&json!({ "title": title })),
            Some(token),
        );
        self.execute("rename_module", request).await?;
        Ok(())
    }

    pub async fn delete_module(&self, token: &str, id: i64) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_delete(&self.url(&format!("/modules/{id}/"))),
            Some(token),
        );
        self.execute("delete_module", request).await?;
        Ok(())
    }

    pub async fn create_lesson(
        &self,
        token: &str,
        module: i64,
        title: &str,
        order: u32,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url("/lessons/"))
                .json(&json!({ "module": module, "title": title, "order": order })),
            Some(token),
        );
        self.execute("create_lesson", request).await?;
        Ok(())
    }

    pub async fn lesson(&self, token: Option<&str>, id: i64) -> Result<Lesson, ApiError> {
        let request = self.authed(
            self.client.traced_get(&self.url(&format!("/lessons/{id}/"))),
            token,
        );
        let response = self.execute("lesson", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn rename_lesson(&self, token: &str, id: i64, title: &str) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_patch(&self.url(&format!("/lessons/{id}/")))
                .json(&json!({ "title": title })),
            Some(token),
        );
        self.execute("rename_lesson", request).await?;
        Ok(())
    }

    pub async fn update_lesson_content(
        &self,
        token: &str,
        id: i64,
        content: &str,
        video_url: &str,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_patch(&self.url(&format!("/lessons/{id}/")))
                .json(&json!({ "content": content, "video_url": video_url })),
            Some(token),
        );
        self.execute("update_lesson_content", request).await?;
        Ok(())
    }

    pub async fn delete_lesson(&self, token: &str, id: i64) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_delete(&self.url(&format!("/lessons/{id}/"))),
            Some(token),
        );
        self.execute("delete_lesson", request).await?;
        Ok(())
    }

    pub async fn complete_lesson(&self, token: &str, id: i64) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url(&format!("/lessons/{id}/complete/"))),
            Some(token),
        );
        self.execute("complete_lesson", request).await?;
        Ok(())
    }

    // --- enrollment & payment ---

    pub async fn free_enroll(&self, token: &str, course: i64) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url(&format!("/courses/{course}/free-enroll/"))),
            Some(token),
        );
        self.execute("free_enroll", request).await?;
        Ok(())
    }

    pub async fn create_order(&self, token: &str, course: i64) -> Result<PaymentOrder, ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url(&format!("/courses/{course}/create-order/"))),
            Some(token),
        );
        let response = self.execute("create_order", request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn verify_payment(
        &self,
        token: &str,
        course: i64,
        proof: &PaymentProof,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            self.client
                .traced_post(&self.url(&format!("/courses/{course}/verify-payment/")))
                .json(proof),
            Some(token),
        );
        self.execute("verify_payment", request).await?;
        Ok(())
    }
}
