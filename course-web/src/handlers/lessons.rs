use crate::errors::{ApiError, PageError};
use crate::handlers::Nav;
use crate::models::course::Lesson;
use crate::models::user::{CurrentUser, MaybeUser};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

const ENROLLMENT_REQUIRED: &str = "You must be enrolled in this course to view this lesson.";

#[derive(Template)]
#[template(path = "lesson.html")]
pub struct LessonTemplate {
    pub nav: Nav,
    pub id: i64,
    pub title: String,
    pub content: String,
    pub embed_url: Option<String>,
    pub completed: bool,
    pub is_owner: bool,
    pub editing: bool,
    pub draft_content: String,
    pub draft_video_url: String,
    pub error: Option<String>,
}

impl LessonTemplate {
    fn viewing(nav: Nav, lesson: &Lesson, is_owner: bool) -> Self {
        Self {
            nav,
            id: lesson.id,
            title: lesson.title.clone(),
            content: lesson.content.clone().unwrap_or_default(),
            embed_url: lesson.video_url.as_deref().and_then(youtube_embed_url),
            completed: lesson.is_completed,
            is_owner,
            editing: false,
            draft_content: lesson.content.clone().unwrap_or_default(),
            draft_video_url: lesson.video_url.clone().unwrap_or_default(),
            error: None,
        }
    }
}

/// Extract the embeddable player URL from a YouTube watch link (`?v=` form).
fn youtube_embed_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("v="))
        .filter(|id| !id.is_empty())
        .map(|id| format!("https://www.youtube.com/embed/{id}"))
}

#[derive(Deserialize)]
pub struct LessonQuery {
    pub edit: Option<String>,
}

pub async fn lesson_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    maybe: MaybeUser,
    Query(query): Query<LessonQuery>,
) -> Result<Response, PageError> {
    let lesson = match state.api.lesson(maybe.token(), id).await {
        Ok(lesson) => lesson,
        Err(ApiError::Forbidden) => return Err(PageError::forbidden(ENROLLMENT_REQUIRED)),
        Err(ApiError::NotFound) => {
            return Err(PageError::not_found(
                "Failed to load the lesson. It may not exist.",
            ))
        }
        Err(err) => return Err(err.into()),
    };

    let is_owner = maybe
        .user
        .as_ref()
        .map(|user| user.owns(lesson.instructor_id))
        .unwrap_or(false);

    let mut template = LessonTemplate::viewing(Nav::for_user(maybe.user.as_ref()), &lesson, is_owner);
    // The content editor seeds its draft from the fetched lesson
    template.editing = is_owner && query.edit.as_deref() == Some("content");

    Ok(template.into_response())
}

#[derive(Deserialize)]
pub struct LessonContentForm {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: String,
}

pub async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<LessonContentForm>,
) -> Result<Response, PageError> {
    match state
        .api
        .update_lesson_content(&user.token, id, &form.content, &form.video_url)
        .await
    {
        Ok(()) => Ok(Redirect::to(&format!("/lessons/{id}")).into_response()),
        Err(ApiError::Validation(errors)) => {
            // Failed save: stay in Editing with the draft intact
            let lesson = state.api.lesson(Some(&user.token), id).await?;
            let mut template =
                LessonTemplate::viewing(Nav::for_user(Some(&user.user)), &lesson, true);
            template.editing = true;
            template.draft_content = form.content;
            template.draft_video_url = form.video_url;
            template.error = Some(
                errors
                    .first("video_url")
                    .or_else(|| errors.first("content"))
                    .unwrap_or_else(|| "Failed to update lesson.".to_string()),
            );
            Ok(template.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// HTMX endpoint: flips the completion indicator in place, no page reload.
pub async fn mark_complete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Response {
    match state.api.complete_lesson(&user.token, id).await {
        Ok(()) => {
            tracing::info!(lesson_id = id, "Lesson marked complete");
            Html(r#"<span class="completed">✓ Completed</span>"#).into_response()
        }
        Err(err) => {
            tracing::error!(lesson_id = id, error = %err, "Failed to mark lesson complete");
            Html(r#"<span class="form-error">Could not mark lesson as complete.</span>"#)
                .into_response()
        }
    }
}
