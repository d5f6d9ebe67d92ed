//! Module and lesson CRUD. Every mutation posts to the API and redirects
//! back to the owning course page, which re-fetches the full tree; a failed
//! save re-renders the page with the draft and error inline.

use crate::errors::{ApiError, PageError};
use crate::handlers::courses::{render_detail_with, DetailEdit};
use crate::models::user::CurrentUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

const NOT_COURSE_INSTRUCTOR: &str = "You are not the instructor of this course.";

fn course_url(course_id: i64) -> String {
    format!("/courses/{course_id}")
}

#[derive(Deserialize)]
pub struct NewModuleForm {
    pub title: String,
    /// Sibling count + 1, computed when the page was rendered.
    pub order: u32,
}

pub async fn create_module(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<NewModuleForm>,
) -> Result<Response, PageError> {
    match state
        .api
        .create_module(&user.token, course_id, form.title.trim(), form.order)
        .await
    {
        Ok(()) => Ok(Redirect::to(&course_url(course_id)).into_response()),
        Err(ApiError::Validation(errors)) => {
            let edit = DetailEdit::NewModule {
                draft: form.title,
                error: Some(errors.first("title").unwrap_or_else(|| errors.summary())),
            };
            render_detail_with(&state, &user, course_id, edit).await
        }
        Err(ApiError::Forbidden) => Err(PageError::forbidden(NOT_COURSE_INSTRUCTOR)),
        Err(err) => Err(err.into()),
    }
}

#[derive(Deserialize)]
pub struct RenameModuleForm {
    pub title: String,
    pub course: i64,
}

pub async fn rename_module(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<RenameModuleForm>,
) -> Result<Response, PageError> {
    match state
        .api
        .rename_module(&user.token, id, form.title.trim())
        .await
    {
        Ok(()) => Ok(Redirect::to(&course_url(form.course)).into_response()),
        Err(ApiError::Validation(errors)) => {
            let edit = DetailEdit::ModuleTitle {
                id,
                draft: form.title,
                error: Some(errors.first("title").unwrap_or_else(|| errors.summary())),
            };
            render_detail_with(&state, &user, form.course, edit).await
        }
        Err(ApiError::Forbidden) => Err(PageError::forbidden(NOT_COURSE_INSTRUCTOR)),
        Err(err) => Err(err.into()),
    }
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub course: i64,
}

pub async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<DeleteForm>,
) -> Result<Response, PageError> {
    match state.api.delete_module(&user.token, id).await {
        Ok(()) => Ok(Redirect::to(&course_url(form.course)).into_response()),
        Err(ApiError::Forbidden) => Err(PageError::forbidden(NOT_COURSE_INSTRUCTOR)),
        Err(err) => Err(err.into()),
    }
}

#[derive(Deserialize)]
pub struct NewLessonForm {
    pub title: String,
    /// Sibling count + 1, computed when the page was rendered.
    pub order: u32,
    pub course: i64,
}

pub async fn create_lesson(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<NewLessonForm>,
) -> Result<Response, PageError> {
    match state
        .api
        .create_lesson(&user.token, module_id, form.title.trim(), form.order)
        .await
    {
        Ok(()) => Ok(Redirect::to(&course_url(form.course)).into_response()),
        Err(ApiError::Validation(errors)) => {
            let edit = DetailEdit::NewLesson {
                module_id,
                draft: form.title,
                error: Some(errors.first("title").unwrap_or_else(|| errors.summary())),
            };
            render_detail_with(&state, &user, form.course, edit).await
        }
        Err(ApiError::Forbidden) => Err(PageError::forbidden(NOT_COURSE_INSTRUCTOR)),
        Err(err) => Err(err.into()),
    }
}

#[derive(Deserialize)]
pub struct RenameLessonForm {
    pub title: String,
    pub course: i64,
}

pub async fn rename_lesson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<RenameLessonForm>,
) -> Result<Response, PageError> {
    match state
        .api
        .rename_lesson(&user.token, id, form.title.trim())
        .await
    {
        Ok(()) => Ok(Redirect::to(&course_url(form.course)).into_response()),
        Err(ApiError::Validation(errors)) => {
            let edit = DetailEdit::LessonTitle {
                id,
                draft: form.title,
                error: Some(errors.first("title").unwrap_or_else(|| errors.summary())),
            };
            render_detail_with(&state, &user, form.course, edit).await
        }
        Err(ApiError::Forbidden) => Err(PageError::forbidden(NOT_COURSE_INSTRUCTOR)),
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<DeleteForm>,
) -> Result<Response, PageError> {
    match state.api.delete_lesson(&user.token, id).await {
        Ok(()) => Ok(Redirect::to(&course_url(form.course)).into_response()),
        Err(ApiError::Forbidden) => Err(PageError::forbidden(NOT_COURSE_INSTRUCTOR)),
        Err(err) => Err(err.into()),
    }
}
