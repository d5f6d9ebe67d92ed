use crate::errors::{ApiError, PageError};
use crate::handlers::Nav;
use crate::models::course::{Course, CourseSummary};
use crate::models::user::{CurrentUser, Identity, MaybeUser};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "course_list.html")]
pub struct CourseListTemplate {
    pub nav: Nav,
    pub courses: Vec<CourseSummary>,
}

pub async fn list_page(
    State(state): State<AppState>,
    maybe: MaybeUser,
) -> Result<Response, PageError> {
    let courses = state.api.list_courses(maybe.token()).await?;

    let template = CourseListTemplate {
        nav: Nav::for_user(maybe.user.as_ref()),
        courses,
    };
    Ok(template.into_response())
}

/// Which inline editor on the course detail page is open, and with what
/// draft. Pages render in Viewing unless a single target is in Editing;
/// a failed save re-enters Editing with the submitted draft and the error.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailEdit {
    None,
    Price {
        draft: String,
        error: Option<String>,
    },
    ModuleTitle {
        id: i64,
        draft: String,
        error: Option<String>,
    },
    LessonTitle {
        id: i64,
        draft: String,
        error: Option<String>,
    },
    NewModule {
        draft: String,
        error: Option<String>,
    },
    NewLesson {
        module_id: i64,
        draft: String,
        error: Option<String>,
    },
}

impl DetailEdit {
    /// Enter Editing from an `?edit=` parameter, seeding the draft from the
    /// current server value. Unknown or stale targets stay in Viewing.
    pub fn from_query(course: &Course, edit: Option<&str>) -> Self {
        let Some(edit) = edit else {
            return DetailEdit::None;
        };

        if edit == "price" {
            return DetailEdit::Price {
                draft: course.price.clone(),
                error: None,
            };
        }

        if let Some(raw) = edit.strip_prefix("module:") {
            if let Ok(id) = raw.parse::<i64>() {
                if let Some(module) = course.module(id) {
                    return DetailEdit::ModuleTitle {
                        id,
                        draft: module.title.clone(),
                        error: None,
                    };
                }
            }
        }

        if let Some(raw) = edit.strip_prefix("lesson:") {
            if let Ok(id) = raw.parse::<i64>() {
                let lesson = course
                    .modules
                    .iter()
                    .flat_map(|module| module.lessons.iter())
                    .find(|lesson| lesson.id == id);
                if let Some(lesson) = lesson {
                    return DetailEdit::LessonTitle {
                        id,
                        draft: lesson.title.clone(),
                        error: None,
                    };
                }
            }
        }

        DetailEdit::None
    }
}

pub struct LessonView {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub editing: bool,
    pub draft_title: String,
    pub error: Option<String>,
}

pub struct ModuleView {
    pub id: i64,
    pub title: String,
    pub editing: bool,
    pub draft_title: String,
    pub error: Option<String>,
    pub lessons: Vec<LessonView>,
    pub next_lesson_order: u32,
    pub new_lesson_title: String,
    pub new_lesson_error: Option<String>,
}

#[derive(Template)]
#[template(path = "course_detail.html")]
pub struct CourseDetailTemplate {
    pub nav: Nav,
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: String,
    pub is_enrolled: bool,
    pub is_free: bool,
    pub first_lesson_id: Option<i64>,
    pub is_owner: bool,
    pub editing_price: bool,
    pub draft_price: String,
    pub price_error: Option<String>,
    pub modules: Vec<ModuleView>,
    pub next_module_order: u32,
    pub new_module_title: String,
    pub new_module_error: Option<String>,
    pub notice: Option<String>,
}

impl CourseDetailTemplate {
    pub fn build(
        course: &Course,
        viewer: Option<&Identity>,
        edit: DetailEdit,
        notice: Option<String>,
    ) -> Self {
        let is_owner = viewer
            .map(|user| user.owns(course.instructor))
            .unwrap_or(false);
        // Only the owner ever sees the inline editors
        let edit = if is_owner { edit } else { DetailEdit::None };

        let (editing_price, draft_price, price_error) = match &edit {
            DetailEdit::Price { draft, error } => (true, draft.clone(), error.clone()),
            _ => (false, course.price.clone(), None),
        };

        let (new_module_title, new_module_error) = match &edit {
            DetailEdit::NewModule { draft, error } => (draft.clone(), error.clone()),
            _ => (String::new(), None),
        };

        let modules = course
            .modules
            .iter()
            .map(|module| {
                let (editing, draft_title, error) = match &edit {
                    DetailEdit::ModuleTitle { id, draft, error } if *id == module.id => {
                        (true, draft.clone(), error.clone())
                    }
                    _ => (false, module.title.clone(), None),
                };

                let (new_lesson_title, new_lesson_error) = match &edit {
                    DetailEdit::NewLesson {
                        module_id,
                        draft,
                        error,
                    } if *module_id == module.id => (draft.clone(), error.clone()),
                    _ => (String::new(), None),
                };

                let lessons = module
                    .lessons
                    .iter()
                    .map(|lesson| {
                        let (editing, draft_title, error) = match &edit {
                            DetailEdit::LessonTitle { id, draft, error } if *id == lesson.id => {
                                (true, draft.clone(), error.clone())
                            }
                            _ => (false, lesson.title.clone(), None),
                        };

                        LessonView {
                            id: lesson.id,
                            title: lesson.title.clone(),
                            completed: lesson.is_completed,
                            editing,
                            draft_title,
                            error,
                        }
                    })
                    .collect();

                ModuleView {
                    id: module.id,
                    title: module.title.clone(),
                    editing,
                    draft_title,
                    error,
                    lessons,
                    next_lesson_order: module.next_lesson_order(),
                    new_lesson_title,
                    new_lesson_error,
                }
            })
            .collect();

        Self {
            nav: Nav::for_user(viewer),
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            price: course.price.clone(),
            is_enrolled: course.is_enrolled,
            is_free: course.is_free(),
            first_lesson_id: course.first_lesson_id(),
            is_owner,
            editing_price,
            draft_price,
            price_error,
            modules,
            next_module_order: course.next_module_order(),
            new_module_title,
            new_module_error,
            notice,
        }
    }
}

#[derive(Deserialize)]
pub struct DetailQuery {
    pub edit: Option<String>,
    pub notice: Option<String>,
}

fn notice_text(code: &str) -> Option<String> {
    match code {
        "enrolled" => Some("Successfully enrolled!".to_string()),
        "paid" => Some("Payment successful! You are now enrolled.".to_string()),
        _ => None,
    }
}

pub async fn detail_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    maybe: MaybeUser,
    Query(query): Query<DetailQuery>,
) -> Result<Response, PageError> {
    let course = state.api.course(maybe.token(), id).await?;

    let edit = DetailEdit::from_query(&course, query.edit.as_deref());
    let notice = query.notice.as_deref().and_then(notice_text);

    let template = CourseDetailTemplate::build(&course, maybe.user.as_ref(), edit, notice);
    Ok(template.into_response())
}

/// Re-render the detail page after a failed save, keeping the submitted
/// draft and the error inline (the form stays in Editing).
pub(crate) async fn render_detail_with(
    state: &AppState,
    user: &CurrentUser,
    course_id: i64,
    edit: DetailEdit,
) -> Result<Response, PageError> {
    let course = state.api.course(Some(&user.token), course_id).await?;
    let template = CourseDetailTemplate::build(&course, Some(&user.user), edit, None);
    Ok(template.into_response())
}

#[derive(Template)]
#[template(path = "course_new.html")]
pub struct CourseNewTemplate {
    pub nav: Nav,
    pub title: String,
    pub description: String,
    pub title_error: Option<String>,
    pub description_error: Option<String>,
    pub form_error: Option<String>,
}

pub async fn new_course_page(user: CurrentUser) -> impl IntoResponse {
    CourseNewTemplate {
        nav: Nav::for_user(Some(&user.user)),
        title: String::new(),
        description: String::new(),
        title_error: None,
        description_error: None,
        form_error: None,
    }
}

#[derive(Deserialize)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<CourseForm>,
) -> Result<Response, PageError> {
    match state
        .api
        .create_course(&user.token, &form.title, &form.description)
        .await
    {
        Ok(course) => {
            tracing::info!(course_id = course.id, "Course created");
            Ok(Redirect::to(&format!("/courses/{}", course.id)).into_response())
        }
        Err(ApiError::Validation(errors)) => {
            let template = CourseNewTemplate {
                nav: Nav::for_user(Some(&user.user)),
                title: form.title,
                description: form.description,
                title_error: errors.first("title"),
                description_error: errors.first("description"),
                form_error: errors.first("non_field_errors"),
            };
            Ok(template.into_response())
        }
        Err(ApiError::Forbidden) => {
            let template = CourseNewTemplate {
                nav: Nav::for_user(Some(&user.user)),
                title: form.title,
                description: form.description,
                title_error: None,
                description_error: None,
                form_error: Some(
                    "Failed to create course. Are you logged in as an instructor?".to_string(),
                ),
            };
            Ok(template.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Deserialize)]
pub struct PriceForm {
    pub price: String,
}

pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    Form(form): Form<PriceForm>,
) -> Result<Response, PageError> {
    let price = form.price.trim().to_string();

    if price.parse::<f64>().is_err() {
        let edit = DetailEdit::Price {
            draft: form.price,
            error: Some("Enter a valid price.".to_string()),
        };
        return render_detail_with(&state, &user, id, edit).await;
    }

    match state.api.set_course_price(&user.token, id, &price).await {
        Ok(()) => Ok(Redirect::to(&format!("/courses/{id}")).into_response()),
        Err(ApiError::Validation(errors)) => {
            let message = errors
                .first("price")
                .unwrap_or_else(|| "Failed to update price.".to_string());
            let edit = DetailEdit::Price {
                draft: price,
                error: Some(message),
            };
            render_detail_with(&state, &user, id, edit).await
        }
        Err(err) => Err(err.into()),
    }
}
