use crate::errors::PageError;
use crate::handlers::Nav;
use crate::models::course::CourseSummary;
use crate::models::user::CurrentUser;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav: Nav,
    pub courses: Vec<CourseSummary>,
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, PageError> {
    let courses = state.api.my_courses(&user.token).await?;

    let template = DashboardTemplate {
        nav: Nav::for_user(Some(&user.user)),
        courses,
    };
    Ok(template.into_response())
}
