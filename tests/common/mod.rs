#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use course_client::ClientError;
use course_client::api::{AuthApi, CourseRepository};
use course_client::models::{AccessToken, Course, Credentials, NewCourse};
use course_client::session::Session;
use course_client::ui::{NotifyLevel, UiHost};

pub fn course(id: i64, name: &str, teacher: &str) -> Course {
    Course {
        id,
        name: name.to_string(),
        credit: 3,
        category: "Cơ sở".to_string(),
        teacher: teacher.to_string(),
    }
}

pub fn seven_courses() -> Vec<Course> {
    vec![
        course(1, "Toán rời rạc", "Nguyễn An"),
        course(2, "Lập trình C", "Trần Bình"),
        course(3, "Cơ sở dữ liệu", "Nguyễn An"),
        course(4, "Mạng máy tính", "Lê Chi"),
        course(5, "Lập trình Java", "Trần Bình"),
        course(6, "Hệ điều hành", "Lê Chi"),
        course(7, "Lập trình web", "Nguyễn An"),
    ]
}

// ========================
// UI host
// ========================

pub struct RecordingUi {
    pub notifications: Mutex<Vec<(NotifyLevel, String)>>,
    pub navigations: Mutex<Vec<String>>,
    pub confirm_answer: AtomicBool,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            notifications: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        })
    }

    pub fn notifications(&self) -> Vec<(NotifyLevel, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn last_notification(&self) -> Option<(NotifyLevel, String)> {
        self.notifications.lock().unwrap().last().cloned()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl UiHost for RecordingUi {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().unwrap().push(path.to_string());
    }

    fn confirm(&self, _prompt: &str) -> bool {
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

// ========================
// In-memory backend
// ========================

#[derive(Default)]
pub struct FakeBackend {
    pub courses: Mutex<Vec<Course>>,
    pub users: Mutex<HashMap<String, String>>,
    pub session: Session,
    pub delay: Mutex<Duration>,
    pub offline: AtomicBool,
    pub list_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub auth_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_courses(courses: Vec<Course>) -> Arc<Self> {
        let backend = Self::default();
        *backend.courses.lock().unwrap() = courses;
        Arc::new(backend)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    async fn roundtrip(&self) -> Result<(), ClientError> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    fn stored(&self) -> Vec<Course> {
        self.courses.lock().unwrap().clone()
    }
}

#[async_trait]
impl CourseRepository for FakeBackend {
    async fn list(&self) -> Result<Vec<Course>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        Ok(self.stored())
    }

    async fn get_by_id(&self, id: i64) -> Result<Course, ClientError> {
        self.roundtrip().await?;
        self.stored()
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(ClientError::NotFound)
    }

    async fn create(&self, course: &NewCourse) -> Result<Course, ClientError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        let mut courses = self.courses.lock().unwrap();
        let id = courses.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let created = Course::from_new(id, course.clone());
        courses.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, course: &NewCourse) -> Result<Course, ClientError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        let mut courses = self.courses.lock().unwrap();
        let slot = courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ClientError::NotFound)?;
        *slot = Course::from_new(id, course.clone());
        Ok(slot.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        let mut courses = self.courses.lock().unwrap();
        let before = courses.len();
        courses.retain(|c| c.id != id);
        if courses.len() == before {
            return Err(ClientError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ClientError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        let users = self.users.lock().unwrap();
        match users.get(&credentials.email) {
            None => Err(ClientError::InvalidCredentials("Cannot find user".to_string())),
            Some(p) if *p != credentials.password => {
                Err(ClientError::InvalidCredentials("Incorrect password".to_string()))
            }
            Some(_) => {
                let token = format!("token-{}", credentials.email);
                self.session.set(token.clone());
                Ok(AccessToken {
                    access_token: token,
                })
            }
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&credentials.email) {
            return Err(ClientError::InvalidCredentials("Email already exists".to_string()));
        }
        users.insert(credentials.email.clone(), credentials.password.clone());
        Ok(())
    }

    fn logout(&self) {
        self.session.clear();
    }
}

// ========================
// Mock HTTP server
// ========================

#[derive(Default)]
pub struct MockDb {
    pub courses: Vec<Course>,
    pub users: HashMap<String, String>,
    pub auth_headers: Vec<Option<String>>,
    pub fail_list: bool,
}

pub type SharedDb = Arc<Mutex<MockDb>>;

/// Start a json-server style backend on an ephemeral port.
/// Returns its base url and a handle on its data.
pub async fn spawn_mock_server(courses: Vec<Course>) -> (String, SharedDb) {
    let db: SharedDb = Arc::new(Mutex::new(MockDb {
        courses,
        ..MockDb::default()
    }));

    let app = Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/login", post(login))
        .route("/register", post(register))
        .with_state(db.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}", addr), db)
}

/// A base url nothing listens on.
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{}", addr)
}

async fn list_courses(State(db): State<SharedDb>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    db.auth_headers.push(auth);

    if db.fail_list {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(db.courses.clone()).into_response()
}

async fn get_course(State(db): State<SharedDb>, Path(id): Path<i64>) -> Response {
    let db = db.lock().unwrap();
    match db.courses.iter().find(|c| c.id == id) {
        Some(course) => Json(course.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn create_course(State(db): State<SharedDb>, Json(req): Json<NewCourse>) -> Response {
    let mut db = db.lock().unwrap();
    if db.courses.iter().any(|c| c.name == req.name) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Course name already exists" })),
        )
            .into_response();
    }

    let id = db.courses.iter().map(|c| c.id).max().unwrap_or(0) + 1;
    let course = Course::from_new(id, req);
    db.courses.push(course.clone());
    (StatusCode::CREATED, Json(course)).into_response()
}

async fn update_course(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(req): Json<Course>,
) -> Response {
    let mut db = db.lock().unwrap();
    match db.courses.iter_mut().find(|c| c.id == id) {
        Some(slot) => {
            *slot = Course { id, ..req };
            Json(slot.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn delete_course(State(db): State<SharedDb>, Path(id): Path<i64>) -> Response {
    let mut db = db.lock().unwrap();
    let before = db.courses.len();
    db.courses.retain(|c| c.id != id);
    if db.courses.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    }
    Json(json!({})).into_response()
}

async fn login(State(db): State<SharedDb>, Json(req): Json<Credentials>) -> Response {
    let db = db.lock().unwrap();
    match db.users.get(&req.email) {
        None => (StatusCode::BAD_REQUEST, Json("Cannot find user")).into_response(),
        Some(p) if *p != req.password => {
            (StatusCode::BAD_REQUEST, Json("Incorrect password")).into_response()
        }
        Some(_) => Json(json!({
            "accessToken": format!("token-{}", req.email),
            "user": { "email": req.email.clone() },
        }))
        .into_response(),
    }
}

async fn register(State(db): State<SharedDb>, Json(req): Json<Credentials>) -> Response {
    let mut db = db.lock().unwrap();
    if db.users.contains_key(&req.email) {
        return (StatusCode::BAD_REQUEST, Json("Email already exists")).into_response();
    }
    db.users.insert(req.email.clone(), req.password.clone());
    (
        StatusCode::CREATED,
        Json(json!({
            "accessToken": format!("token-{}", req.email),
            "user": { "email": req.email },
        })),
    )
        .into_response()
}
