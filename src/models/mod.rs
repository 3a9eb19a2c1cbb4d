pub mod auth;
pub mod course;

pub use auth::{AccessToken, CredentialField, Credentials};
pub use course::{Category, Course, CourseDraft, CourseField, NewCourse};
