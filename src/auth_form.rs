use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::api::AuthApi;
use crate::models::{CredentialField, Credentials};
use crate::ui::{self, NotifyLevel, UiHost};
use crate::validation::{self, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    LoggedIn,
    Registered,
    Invalid(Violations),
    Busy,
    Failed(String),
}

#[derive(Default)]
struct AuthFormState {
    draft: Credentials,
    errors: Violations,
}

/// Login/register page.
pub struct AuthForm {
    auth: Arc<dyn AuthApi>,
    ui: Arc<dyn UiHost>,
    mode: AuthMode,
    state: Mutex<AuthFormState>,
    submitting: AtomicBool,
}

impl AuthForm {
    pub fn new(auth: Arc<dyn AuthApi>, ui: Arc<dyn UiHost>, mode: AuthMode) -> Self {
        Self {
            auth,
            ui,
            mode,
            state: Mutex::new(AuthFormState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, AuthFormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn draft(&self) -> Credentials {
        self.state().draft.clone()
    }

    pub fn errors(&self) -> Violations {
        self.state().errors.clone()
    }

    pub fn set_field(&self, field: CredentialField, raw: &str) {
        let mut state = self.state();
        state.draft.set(field, raw);
        let message = validation::validate_credential_field(&state.draft, field);
        state.errors.replace(field.as_str(), message);
    }

    pub async fn submit(&self) -> AuthOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return AuthOutcome::Busy;
        }

        let outcome = self.run().await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run(&self) -> AuthOutcome {
        let credentials = {
            let mut state = self.state();
            let violations = validation::validate_credentials(&state.draft);
            state.errors = violations.clone();
            if !violations.is_empty() {
                return AuthOutcome::Invalid(violations);
            }
            Credentials::new(state.draft.email.trim(), state.draft.password.clone())
        };

        let result = match self.mode {
            AuthMode::Login => self.auth.login(&credentials).await.map(|_| ()),
            AuthMode::Register => self.auth.register(&credentials).await,
        };

        match result {
            Ok(()) => {
                *self.state() = AuthFormState::default();
                let (message, path, outcome) = match self.mode {
                    AuthMode::Login => ("Đăng nhập thành công", ui::LIST_PATH, AuthOutcome::LoggedIn),
                    AuthMode::Register => ("Đăng ký thành công", ui::LOGIN_PATH, AuthOutcome::Registered),
                };
                self.ui.notify(NotifyLevel::Success, message);
                self.ui.navigate(path);
                outcome
            }
            Err(e) => {
                warn!("{:?} failed: {}", self.mode, e);
                let message = e.user_message().unwrap_or("Có lỗi xảy ra").to_string();
                self.ui.notify(NotifyLevel::Error, &message);
                AuthOutcome::Failed(message)
            }
        }
    }
}
