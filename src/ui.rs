use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Success,
    Error,
}

/// Whatever renders the pages: toasts, routing and confirm dialogs.
pub trait UiHost: Send + Sync {
    fn notify(&self, level: NotifyLevel, message: &str);

    fn navigate(&self, path: &str);

    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub const LIST_PATH: &str = "/list";
pub const LOGIN_PATH: &str = "/login";

pub fn edit_path(id: i64) -> String {
    format!("/edit/{}", id)
}
