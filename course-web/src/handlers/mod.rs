pub mod app;
pub mod auth;
pub mod courses;
pub mod curriculum;
pub mod dashboard;
pub mod lessons;
pub mod metrics;
pub mod payment;

use crate::models::user::Identity;

/// Navigation context shared by every page template. Affordances are gated
/// here once instead of per template.
pub struct Nav {
    pub logged_in: bool,
    pub is_instructor: bool,
    pub username: String,
}

impl Nav {
    pub fn anonymous() -> Self {
        Self {
            logged_in: false,
            is_instructor: false,
            username: String::new(),
        }
    }

    pub fn for_user(user: Option<&Identity>) -> Self {
        match user {
            Some(user) => Self {
                logged_in: true,
                is_instructor: user.is_instructor(),
                username: user.display_name(),
            },
            None => Self::anonymous(),
        }
    }
}
