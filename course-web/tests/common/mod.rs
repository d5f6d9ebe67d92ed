//! Shared test harness: the app under test plus a stub course API, both
//! bound to ephemeral ports. The stub keeps an in-memory course catalog and
//! a request log so tests can assert exactly which upstream calls were made.

#![allow(dead_code)]

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use course_web::config::{
    CheckoutSettings, CourseApiSettings, ServerSettings, Settings, TelemetrySettings,
};
use course_web::startup::Application;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub stub: StubState,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn get_text(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("read body failed")
    }

    /// POST without a body, for action endpoints that take none.
    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        form: &T,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .form(form)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn login_as(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }
}

/// Spawn the app against a fresh stub course API. The reqwest client keeps
/// cookies (the session) and follows redirects, so a mutate-then-redirect
/// flow lands on the re-fetched page.
pub async fn spawn_app() -> TestApp {
    let stub = StubState::default();

    let stub_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub listener");
    let stub_port = stub_listener.local_addr().unwrap().port();
    let stub_router = stub_router(stub.clone());
    tokio::spawn(async move {
        axum::serve(stub_listener, stub_router)
            .await
            .expect("stub server failed");
    });

    let settings = Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        course_api: CourseApiSettings {
            base_url: format!("http://127.0.0.1:{stub_port}/api"),
        },
        checkout: CheckoutSettings {
            key_id: "rzp_test_key".into(),
            currency: "INR".into(),
        },
        telemetry: TelemetrySettings::default(),
    };

    let application = Application::build(settings)
        .await
        .expect("failed to build application");
    let address = format!("http://127.0.0.1:{}", application.port());
    tokio::spawn(application.run_until_stopped());

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("failed to build client");

    TestApp {
        address,
        client,
        stub,
    }
}

/// `/me/` body for a seeded account.
pub fn identity(pk: i64, username: &str, groups: &[&str]) -> Value {
    json!({
        "pk": pk,
        "username": username,
        "email": format!("{username}@example.com"),
        "first_name": "",
        "last_name": "",
        "groups": groups,
    })
}

pub fn course(id: i64, title: &str, instructor: i64, price: &str) -> StubCourse {
    StubCourse {
        id,
        title: title.into(),
        description: format!("About {title}"),
        instructor,
        price: price.into(),
        modules: vec![],
    }
}

pub fn module(id: i64, title: &str, order: u32, lessons: Vec<StubLesson>) -> StubModule {
    StubModule {
        id,
        title: title.into(),
        order,
        lessons,
    }
}

pub fn lesson(id: i64, title: &str, order: u32) -> StubLesson {
    StubLesson {
        id,
        title: title.into(),
        order,
        content: Some(format!("{title} content")),
        video_url: None,
    }
}

#[derive(Clone)]
pub struct StubCourse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor: i64,
    pub price: String,
    pub modules: Vec<StubModule>,
}

#[derive(Clone)]
pub struct StubModule {
    pub id: i64,
    pub title: String,
    pub order: u32,
    pub lessons: Vec<StubLesson>,
}

#[derive(Clone)]
pub struct StubLesson {
    pub id: i64,
    pub title: String,
    pub order: u32,
    pub content: Option<String>,
    pub video_url: Option<String>,
}

struct Account {
    email: String,
    password: String,
    token: String,
}

#[derive(Default)]
struct Stub {
    log: Vec<(String, String)>,
    accounts: Vec<Account>,
    tokens: Vec<(String, Value)>,
    usernames: HashSet<String>,
    courses: Vec<StubCourse>,
    enrollments: HashSet<(String, i64)>,
    completed: HashSet<(String, i64)>,
    next_id: i64,
    fail_orders: bool,
    fail_verify: bool,
}

impl Stub {
    fn identity(&self, token: &str) -> Option<Value> {
        self.tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.clone())
    }

    fn identity_pk(&self, token: &str) -> Option<i64> {
        self.identity(token).and_then(|v| v["pk"].as_i64())
    }

    fn is_instructor(&self, token: &str) -> bool {
        self.identity(token)
            .and_then(|v| {
                v["groups"]
                    .as_array()
                    .map(|groups| groups.iter().any(|g| g == "Instructors"))
            })
            .unwrap_or(false)
    }

    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn bump_next_id(&mut self, id: i64) {
        if id > self.next_id {
            self.next_id = id;
        }
    }

    fn enrolled(&self, token: Option<&str>, course_id: i64) -> bool {
        token
            .map(|t| self.enrollments.contains(&(t.to_string(), course_id)))
            .unwrap_or(false)
    }

    fn summary_json(course: &StubCourse) -> Value {
        json!({
            "id": course.id,
            "title": course.title,
            "description": course.description,
            "instructor": course.instructor,
        })
    }

    fn lesson_json(&self, course: &StubCourse, lesson: &StubLesson, token: Option<&str>) -> Value {
        let completed = token
            .map(|t| self.completed.contains(&(t.to_string(), lesson.id)))
            .unwrap_or(false);
        json!({
            "id": lesson.id,
            "title": lesson.title,
            "order": lesson.order,
            "content": lesson.content,
            "video_url": lesson.video_url,
            "is_completed": completed,
            "instructor_id": course.instructor,
        })
    }

    fn course_json(&self, course: &StubCourse, token: Option<&str>) -> Value {
        json!({
            "id": course.id,
            "title": course.title,
            "description": course.description,
            "instructor": course.instructor,
            "price": course.price,
            "is_enrolled": self.enrolled(token, course.id),
            "modules": course.modules.iter().map(|module| json!({
                "id": module.id,
                "title": module.title,
                "order": module.order,
                "lessons": module.lessons.iter()
                    .map(|lesson| self.lesson_json(course, lesson, token))
                    .collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        })
    }

    fn course_of_module(&self, module_id: i64) -> Option<i64> {
        self.courses
            .iter()
            .find(|c| c.modules.iter().any(|m| m.id == module_id))
            .map(|c| c.id)
    }

    fn course_of_lesson(&self, lesson_id: i64) -> Option<i64> {
        self.courses
            .iter()
            .find(|c| {
                c.modules
                    .iter()
                    .any(|m| m.lessons.iter().any(|l| l.id == lesson_id))
            })
            .map(|c| c.id)
    }
}

#[derive(Clone, Default)]
pub struct StubState {
    inner: Arc<Mutex<Stub>>,
}

impl StubState {
    /// Account whose token the API accepts.
    pub fn add_account(&self, email: &str, password: &str, token: &str, identity: Value) {
        let mut stub = self.inner.lock().unwrap();
        stub.accounts.push(Account {
            email: email.into(),
            password: password.into(),
            token: token.into(),
        });
        stub.tokens.push((token.into(), identity));
    }

    /// Account that can log in, but whose token the API then rejects
    /// (`/me/` returns 401).
    pub fn add_account_with_dead_token(&self, email: &str, password: &str, token: &str) {
        let mut stub = self.inner.lock().unwrap();
        stub.accounts.push(Account {
            email: email.into(),
            password: password.into(),
            token: token.into(),
        });
    }

    pub fn add_course(&self, course: StubCourse) {
        let mut stub = self.inner.lock().unwrap();
        stub.bump_next_id(course.id);
        for module in &course.modules {
            stub.bump_next_id(module.id);
            for lesson in &module.lessons {
                stub.bump_next_id(lesson.id);
            }
        }
        stub.courses.push(course);
    }

    pub fn enroll(&self, token: &str, course_id: i64) {
        self.inner
            .lock()
            .unwrap()
            .enrollments
            .insert((token.into(), course_id));
    }

    pub fn fail_orders(&self) {
        self.inner.lock().unwrap().fail_orders = true;
    }

    pub fn fail_verify(&self) {
        self.inner.lock().unwrap().fail_verify = true;
    }

    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    pub fn is_enrolled(&self, token: &str, course_id: i64) -> bool {
        self.inner.lock().unwrap().enrolled(Some(token), course_id)
    }

    pub fn is_completed(&self, token: &str, lesson_id: i64) -> bool {
        self.inner
            .lock()
            .unwrap()
            .completed
            .contains(&(token.to_string(), lesson_id))
    }

    pub fn module_orders(&self, course_id: i64) -> Vec<u32> {
        self.inner
            .lock()
            .unwrap()
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| c.modules.iter().map(|m| m.order).collect())
            .unwrap_or_default()
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Token ")
        .map(str::to_string)
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Not found."})),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid token."})),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "You do not have permission to perform this action."})),
    )
        .into_response()
}

fn blank_title() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"title": ["This field may not be blank."]})),
    )
        .into_response()
}

async fn record_request(State(state): State<StubState>, request: Request, next: Next) -> Response {
    {
        let mut stub = state.inner.lock().unwrap();
        stub.log
            .push((request.method().to_string(), request.uri().path().to_string()));
    }
    next.run(request).await
}

fn stub_router(state: StubState) -> Router {
    Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/registration/", post(register))
        .route("/api/me/", get(me))
        .route("/api/courses/", get(list_courses).post(create_course))
        .route("/api/courses/:id/", get(get_course).patch(patch_course))
        .route("/api/courses/:id/create-order/", post(create_order))
        .route("/api/courses/:id/verify-payment/", post(verify_payment))
        .route("/api/courses/:id/free-enroll/", post(free_enroll))
        .route("/api/modules/", post(create_module))
        .route("/api/modules/:id/", patch(patch_module).delete(delete_module))
        .route("/api/lessons/", post(create_lesson))
        .route(
            "/api/lessons/:id/",
            get(get_lesson).patch(patch_lesson).delete(delete_lesson),
        )
        .route("/api/lessons/:id/complete/", post(complete_lesson))
        .route("/api/my-courses/", get(my_courses))
        .layer(from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

async fn login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let stub = state.inner.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match stub
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
    {
        Some(account) => Json(json!({ "key": account.token })).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": ["Unable to log in with provided credentials."]})),
        )
            .into_response(),
    }
}

async fn register(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if !stub.usernames.insert(username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["A user with that username already exists."]})),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({}))).into_response()
}

async fn me(State(state): State<StubState>, headers: HeaderMap) -> Response {
    let stub = state.inner.lock().unwrap();
    match bearer(&headers).and_then(|token| stub.identity(&token)) {
        Some(identity) => Json(identity).into_response(),
        None => unauthorized(),
    }
}

async fn list_courses(State(state): State<StubState>) -> Response {
    let stub = state.inner.lock().unwrap();
    Json(stub.courses.iter().map(Stub::summary_json).collect::<Vec<_>>()).into_response()
}

async fn get_course(State(state): State<StubState>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    let stub = state.inner.lock().unwrap();
    let token = bearer(&headers);
    match stub.courses.iter().find(|c| c.id == id) {
        Some(course) => Json(stub.course_json(course, token.as_deref())).into_response(),
        None => not_found(),
    }
}

async fn create_course(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let Some(pk) = stub.identity_pk(&token) else {
        return unauthorized();
    };
    if !stub.is_instructor(&token) {
        return forbidden();
    }
    let title = body["title"].as_str().unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return blank_title();
    }

    let id = stub.alloc_id();
    let course = StubCourse {
        id,
        title,
        description: body["description"].as_str().unwrap_or_default().to_string(),
        instructor: pk,
        price: "0.00".to_string(),
        modules: vec![],
    };
    let body = stub.course_json(&course, Some(&token));
    stub.courses.push(course);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn patch_course(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let Some(course) = stub.courses.iter_mut().find(|c| c.id == id) else {
        return not_found();
    };
    if course.instructor != pk {
        return forbidden();
    }
    if let Some(price) = body["price"].as_str() {
        if price.trim().parse::<f64>().is_err() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"price": ["A valid number is required."]})),
            )
                .into_response();
        }
        course.price = price.to_string();
    }
    Json(json!({})).into_response()
}

async fn create_order(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let stub = state.inner.lock().unwrap();
    if bearer(&headers).and_then(|t| stub.identity_pk(&t)).is_none() {
        return unauthorized();
    }
    if stub.fail_orders {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "order creation failed"})),
        )
            .into_response();
    }
    let Some(course) = stub.courses.iter().find(|c| c.id == id) else {
        return not_found();
    };
    let amount = (course.price.parse::<f64>().unwrap_or(0.0) * 100.0).round() as u64;
    Json(json!({
        "id": format!("order_stub_{id}"),
        "amount": amount,
        "currency": "INR",
    }))
    .into_response()
}

async fn verify_payment(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    if stub.identity_pk(&token).is_none() {
        return unauthorized();
    }
    if stub.fail_verify {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Payment verification failed"})),
        )
            .into_response();
    }
    stub.enrollments.insert((token, id));
    Json(json!({"status": "Payment successful"})).into_response()
}

async fn free_enroll(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    if stub.identity_pk(&token).is_none() {
        return unauthorized();
    }
    let Some(course) = stub.courses.iter().find(|c| c.id == id) else {
        return not_found();
    };
    if course.price.parse::<f64>().unwrap_or(0.0) > 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "This course is not free."})),
        )
            .into_response();
    }
    stub.enrollments.insert((token, id));
    Json(json!({"status": "Enrolled successfully"})).into_response()
}

async fn create_module(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let course_id = body["course"].as_i64().unwrap_or_default();
    let title = body["title"].as_str().unwrap_or_default().trim().to_string();
    let order = body["order"].as_u64().unwrap_or_default() as u32;

    let Some(course) = stub.courses.iter().find(|c| c.id == course_id) else {
        return not_found();
    };
    if course.instructor != pk {
        return forbidden();
    }
    if title.is_empty() {
        return blank_title();
    }

    let id = stub.alloc_id();
    let course = stub.courses.iter_mut().find(|c| c.id == course_id).unwrap();
    course.modules.push(StubModule {
        id,
        title,
        order,
        lessons: vec![],
    });
    (StatusCode::CREATED, Json(json!({"id": id}))).into_response()
}

async fn patch_module(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let Some(course_id) = stub.course_of_module(id) else {
        return not_found();
    };
    let course = stub.courses.iter_mut().find(|c| c.id == course_id).unwrap();
    if course.instructor != pk {
        return forbidden();
    }
    let Some(title) = body["title"].as_str() else {
        return blank_title();
    };
    if title.trim().is_empty() {
        return blank_title();
    }
    let module = course.modules.iter_mut().find(|m| m.id == id).unwrap();
    module.title = title.trim().to_string();
    Json(json!({})).into_response()
}

async fn delete_module(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let Some(course_id) = stub.course_of_module(id) else {
        return not_found();
    };
    let course = stub.courses.iter_mut().find(|c| c.id == course_id).unwrap();
    if course.instructor != pk {
        return forbidden();
    }
    course.modules.retain(|m| m.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn create_lesson(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let module_id = body["module"].as_i64().unwrap_or_default();
    let title = body["title"].as_str().unwrap_or_default().trim().to_string();
    let order = body["order"].as_u64().unwrap_or_default() as u32;

    let Some(course_id) = stub.course_of_module(module_id) else {
        return not_found();
    };
    let course = stub.courses.iter().find(|c| c.id == course_id).unwrap();
    if course.instructor != pk {
        return forbidden();
    }
    if title.is_empty() {
        return blank_title();
    }

    let id = stub.alloc_id();
    let course = stub.courses.iter_mut().find(|c| c.id == course_id).unwrap();
    let module = course.modules.iter_mut().find(|m| m.id == module_id).unwrap();
    module.lessons.push(StubLesson {
        id,
        title,
        order,
        content: None,
        video_url: None,
    });
    (StatusCode::CREATED, Json(json!({"id": id}))).into_response()
}

async fn get_lesson(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let stub = state.inner.lock().unwrap();
    let token = bearer(&headers);
    let Some(course_id) = stub.course_of_lesson(id) else {
        return not_found();
    };
    let course = stub.courses.iter().find(|c| c.id == course_id).unwrap();

    let is_owner = token
        .as_deref()
        .and_then(|t| stub.identity_pk(t))
        .map(|pk| pk == course.instructor)
        .unwrap_or(false);
    if !is_owner && !stub.enrolled(token.as_deref(), course_id) {
        return forbidden();
    }

    let lesson = course
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .find(|l| l.id == id)
        .unwrap();
    Json(stub.lesson_json(course, lesson, token.as_deref())).into_response()
}

async fn patch_lesson(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let Some(course_id) = stub.course_of_lesson(id) else {
        return not_found();
    };
    let course = stub.courses.iter_mut().find(|c| c.id == course_id).unwrap();
    if course.instructor != pk {
        return forbidden();
    }

    if let Some(title) = body.get("title").and_then(Value::as_str) {
        if title.trim().is_empty() {
            return blank_title();
        }
    }

    let lesson = course
        .modules
        .iter_mut()
        .flat_map(|m| m.lessons.iter_mut())
        .find(|l| l.id == id)
        .unwrap();
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        lesson.title = title.trim().to_string();
    }
    if let Some(content) = body.get("content").and_then(Value::as_str) {
        lesson.content = Some(content.to_string());
    }
    if let Some(video_url) = body.get("video_url").and_then(Value::as_str) {
        lesson.video_url = Some(video_url.to_string());
    }
    Json(json!({})).into_response()
}

async fn delete_lesson(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(pk) = bearer(&headers).and_then(|t| stub.identity_pk(&t)) else {
        return unauthorized();
    };
    let Some(course_id) = stub.course_of_lesson(id) else {
        return not_found();
    };
    let course = stub.courses.iter_mut().find(|c| c.id == course_id).unwrap();
    if course.instructor != pk {
        return forbidden();
    }
    for module in &mut course.modules {
        module.lessons.retain(|l| l.id != id);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn complete_lesson(
    State(state): State<StubState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut stub = state.inner.lock().unwrap();
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    if stub.identity_pk(&token).is_none() {
        return unauthorized();
    }
    let Some(course_id) = stub.course_of_lesson(id) else {
        return not_found();
    };
    if !stub.enrolled(Some(&token), course_id) {
        return forbidden();
    }
    stub.completed.insert((token, id));
    Json(json!({"status": "completed"})).into_response()
}

async fn my_courses(State(state): State<StubState>, headers: HeaderMap) -> Response {
    let stub = state.inner.lock().unwrap();
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    if stub.identity_pk(&token).is_none() {
        return unauthorized();
    }
    let courses: Vec<Value> = stub
        .courses
        .iter()
        .filter(|c| stub.enrolled(Some(&token), c.id))
        .map(Stub::summary_json)
        .collect();
    Json(courses).into_response()
}
