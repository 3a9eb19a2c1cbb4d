//! Add/edit course form.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{info, warn};

use crate::api::CourseRepository;
use crate::config::ClientConfig;
use crate::models::{Course, CourseDraft, CourseField};
use crate::ui::{self, NotifyLevel, UiHost};
use crate::validation::{self, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

impl FormMode {
    pub fn from_id(id: Option<i64>) -> Self {
        id.map_or(FormMode::Create, FormMode::Edit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved(Course),
    Invalid(Violations),
    Busy,
    Failed(String),
    Detached,
}

#[derive(Debug, Clone)]
pub struct FormOptions {
    pub validate_on_change: bool,
    /// Pause between the success notification and leaving the page.
    pub redirect_delay: Duration,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            redirect_delay: Duration::ZERO,
        }
    }
}

impl From<&ClientConfig> for FormOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            validate_on_change: true,
            redirect_delay: config.redirect_delay,
        }
    }
}

struct FormState {
    mode: FormMode,
    phase: FormPhase,
    draft: CourseDraft,
    errors: Violations,
}

pub struct FormController {
    repo: Arc<dyn CourseRepository>,
    ui: Arc<dyn UiHost>,
    options: FormOptions,
    state: Mutex<FormState>,
    mounted: AtomicBool,
}

impl FormController {
    pub fn new(
        repo: Arc<dyn CourseRepository>,
        ui: Arc<dyn UiHost>,
        mode: FormMode,
        options: FormOptions,
    ) -> Self {
        Self {
            repo,
            ui,
            options,
            state: Mutex::new(FormState {
                mode,
                phase: FormPhase::Idle,
                draft: CourseDraft::default(),
                errors: Violations::default(),
            }),
            mounted: AtomicBool::new(true),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn mode(&self) -> FormMode {
        self.state().mode
    }

    pub fn phase(&self) -> FormPhase {
        self.state().phase
    }

    pub fn draft(&self) -> CourseDraft {
        self.state().draft.clone()
    }

    pub fn errors(&self) -> Violations {
        self.state().errors.clone()
    }

    /// Load the course being edited. A create form has nothing to load.
    ///
    /// On failure the user is sent back to the list.
    pub async fn open(&self) -> bool {
        let id = match self.mode() {
            FormMode::Create => return true,
            FormMode::Edit(id) => id,
        };

        let result = self.repo.get_by_id(id).await;
        if !self.is_mounted() {
            return false;
        }

        match result {
            Ok(course) => {
                self.state().draft = CourseDraft::from(&course);
                true
            }
            Err(e) => {
                warn!("failed to load course {}: {}", id, e);
                self.ui.notify(NotifyLevel::Error, "Không tìm thấy dữ liệu");
                self.ui.navigate(ui::LIST_PATH);
                false
            }
        }
    }

    pub fn set_field(&self, field: CourseField, raw: &str) {
        let mut state = self.state();
        state.draft.set(field, raw);
        if self.options.validate_on_change {
            let message = validation::validate_course_field(&state.draft, field);
            state.errors.replace(field.as_str(), message);
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (mode, course) = {
            let mut state = self.state();
            // A saved form is leaving the page; it never sends again.
            if matches!(state.phase, FormPhase::Submitting | FormPhase::Success) {
                return SubmitOutcome::Busy;
            }

            state.phase = FormPhase::Validating;
            match state.draft.validate() {
                Ok(course) => {
                    state.errors = Violations::default();
                    state.phase = FormPhase::Submitting;
                    (state.mode, course)
                }
                Err(violations) => {
                    state.errors = violations.clone();
                    state.phase = FormPhase::Idle;
                    return SubmitOutcome::Invalid(violations);
                }
            }
        };

        let result = match mode {
            FormMode::Create => self.repo.create(&course).await,
            FormMode::Edit(id) => self.repo.update(id, &course).await,
        };

        if !self.is_mounted() {
            self.state().phase = FormPhase::Idle;
            return SubmitOutcome::Detached;
        }

        match result {
            Ok(saved) => {
                self.state().phase = FormPhase::Success;
                info!("saved course {}", saved.id);
                let message = match mode {
                    FormMode::Create => "Thêm khóa học thành công!",
                    FormMode::Edit(_) => "Cập nhật thành công",
                };
                self.ui.notify(NotifyLevel::Success, message);

                if !self.options.redirect_delay.is_zero() {
                    tokio::time::sleep(self.options.redirect_delay).await;
                }
                if self.is_mounted() {
                    self.ui.navigate(ui::LIST_PATH);
                }
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                self.state().phase = FormPhase::Failure;
                warn!("failed to save course: {}", e);
                let fallback = match mode {
                    FormMode::Create => "Thêm thất bại!",
                    FormMode::Edit(_) => "Cập nhật thất bại",
                };
                let message = e.user_message().unwrap_or(fallback).to_string();
                self.ui.notify(NotifyLevel::Error, &message);
                self.state().phase = FormPhase::Idle;
                SubmitOutcome::Failed(message)
            }
        }
    }
}
