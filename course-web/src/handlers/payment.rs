//! Checkout and enrollment. Order creation and payment verification are
//! independent failure points; each gets its own user-facing alert and
//! neither is retried.

use crate::errors::{ApiError, ErrorTemplate, PageError};
use crate::handlers::Nav;
use crate::models::user::CurrentUser;
use crate::services::api_client::PaymentProof;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};

#[derive(Template)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub nav: Nav,
    pub course_id: i64,
    pub course_title: String,
    pub key_id: String,
    pub order_id: String,
    /// Smallest currency unit, as returned by the order endpoint.
    pub amount: u64,
    pub currency: String,
    pub prefill_name: String,
    pub prefill_email: String,
}

fn alert(user: &CurrentUser, status: StatusCode, title: &str, message: &str) -> Response {
    let template = ErrorTemplate {
        nav: Nav::for_user(Some(&user.user)),
        title: title.to_string(),
        message: message.to_string(),
    };
    (status, template).into_response()
}

/// Request an order descriptor and render the checkout widget configured
/// with it. Enrolled viewers and free courses bounce back to the course page.
pub async fn checkout_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<Response, PageError> {
    let course = state.api.course(Some(&user.token), id).await?;

    if course.is_enrolled || course.is_free() {
        return Ok(Redirect::to(&format!("/courses/{id}")).into_response());
    }

    match state.api.create_order(&user.token, id).await {
        Ok(order) => {
            let template = CheckoutTemplate {
                nav: Nav::for_user(Some(&user.user)),
                course_id: id,
                course_title: course.title,
                key_id: state.checkout.key_id.clone(),
                order_id: order.id,
                amount: order.amount,
                currency: order.currency,
                prefill_name: user.user.display_name(),
                prefill_email: user.user.email.clone(),
            };
            Ok(template.into_response())
        }
        Err(ApiError::TokenRejected) => Err(PageError::SessionExpired),
        Err(err) => {
            tracing::error!(course_id = id, error = %err, "Order creation failed");
            Ok(alert(
                &user,
                StatusCode::BAD_GATEWAY,
                "Payment Unavailable",
                "Could not initiate payment. Please try again.",
            ))
        }
    }
}

/// Completion callback of the checkout widget: submit the payment proof for
/// verification, then reload the course so enrollment is reflected.
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(proof): Form<PaymentProof>,
) -> Result<Response, PageError> {
    match state.api.verify_payment(&user.token, id, &proof).await {
        Ok(()) => {
            tracing::info!(course_id = id, order_id = %proof.razorpay_order_id, "Payment verified");
            Ok(Redirect::to(&format!("/courses/{id}?notice=paid")).into_response())
        }
        Err(ApiError::TokenRejected) => Err(PageError::SessionExpired),
        Err(err) => {
            tracing::error!(course_id = id, error = %err, "Payment verification failed");
            Ok(alert(
                &user,
                StatusCode::BAD_REQUEST,
                "Payment Failed",
                "Payment verification failed. Please contact support.",
            ))
        }
    }
}

/// Explicit enrollment into a zero-price course.
pub async fn free_enroll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<Response, PageError> {
    match state.api.free_enroll(&user.token, id).await {
        Ok(()) => {
            tracing::info!(course_id = id, "Enrolled in free course");
            Ok(Redirect::to(&format!("/courses/{id}?notice=enrolled")).into_response())
        }
        Err(ApiError::TokenRejected) => Err(PageError::SessionExpired),
        Err(ApiError::Validation(errors)) => {
            let message = errors
                .first("error")
                .unwrap_or_else(|| "Could not enroll in this course.".to_string());
            Ok(alert(&user, StatusCode::BAD_REQUEST, "Enrollment Failed", &message))
        }
        Err(err) => Err(err.into()),
    }
}
