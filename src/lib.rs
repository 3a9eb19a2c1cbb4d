pub mod api;
pub mod auth_form;
pub mod config;
pub mod error;
pub mod form;
pub mod listing;
pub mod models;
pub mod session;
pub mod ui;
pub mod validation;

pub use error::ClientError;
