pub mod http;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{AccessToken, Course, Credentials, NewCourse};

pub use http::HttpClient;

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Course>, ClientError>;
    async fn get_by_id(&self, id: i64) -> Result<Course, ClientError>;
    async fn create(&self, course: &NewCourse) -> Result<Course, ClientError>;
    async fn update(&self, id: i64, course: &NewCourse) -> Result<Course, ClientError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), ClientError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Sets the session on success.
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ClientError>;
    /// Does not touch the session; the caller logs in separately.
    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError>;
    fn logout(&self);
}
