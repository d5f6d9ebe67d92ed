use serde::Deserialize;

/// Course as it appears in list views (`GET /courses/`, `GET /my-courses/`).
#[derive(Debug, Clone, Deserialize)]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor: i64,
}

/// Full course tree as served by `GET /courses/{id}/`.
///
/// `is_enrolled` is derived server-side for the identity the request was
/// authenticated as; anonymous requests always see `false`.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor: i64,
    /// Decimal string, exactly as the API serializes it (e.g. "499.00").
    pub price: String,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub is_enrolled: bool,
}

impl Course {
    /// Parsed price. Unparsable values behave as zero, matching how the
    /// views route them to the free-enrollment path.
    pub fn price_amount(&self) -> f64 {
        self.price.trim().parse().unwrap_or(0.0)
    }

    /// `price <= 0` is free; only strictly positive prices go through the
    /// paid checkout.
    pub fn is_free(&self) -> bool {
        self.price_amount() <= 0.0
    }

    /// Order position for a module appended to this course.
    pub fn next_module_order(&self) -> u32 {
        self.modules.len() as u32 + 1
    }

    pub fn module(&self, id: i64) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Entry point for "Go to Course": the first lesson of the first module.
    pub fn first_lesson_id(&self) -> Option<i64> {
        self.modules
            .first()
            .and_then(|module| module.lessons.first())
            .map(|lesson| lesson.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    pub id: i64,
    pub title: String,
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Module {
    /// Order position for a lesson appended to this module.
    pub fn next_lesson_order(&self) -> u32 {
        self.lessons.len() as u32 + 1
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub order: u32,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    /// Instructor of the owning course, for ownership checks on lesson pages.
    pub instructor_id: i64,
}
