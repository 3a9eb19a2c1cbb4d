//! Course list page: search, teacher filter and pagination.
//!
//! [`derive_view`] is the pure part. [`ListController`] owns the page state,
//! talks to the repository and recomputes the view after every event.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use crate::api::CourseRepository;
use crate::models::Course;
use crate::ui::{self, NotifyLevel, UiHost};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub search: String,
    pub teacher: String,
    pub page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            teacher: String::new(),
            page: 1,
        }
    }
}

impl ListQuery {
    pub fn matches(&self, course: &Course) -> bool {
        let search = self.search.to_lowercase();
        course.name.to_lowercase().contains(&search)
            && (self.teacher.is_empty() || course.teacher == self.teacher)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub page_items: Vec<Course>,
    pub filtered_count: usize,
    /// Zero when nothing matches.
    pub total_pages: usize,
    pub current_page: usize,
    pub teacher_options: Vec<String>,
}

pub fn total_pages(count: usize, per_page: usize) -> usize {
    count.div_ceil(per_page.max(1))
}

pub fn derive_view(all: &[Course], query: &ListQuery, per_page: usize) -> ListView {
    let per_page = per_page.max(1);
    let filtered: Vec<&Course> = all.iter().filter(|c| query.matches(c)).collect();

    let page = query.page.max(1);
    let start = (page - 1).saturating_mul(per_page);
    let page_items = filtered
        .iter()
        .skip(start)
        .take(per_page)
        .map(|c| (*c).clone())
        .collect();

    ListView {
        page_items,
        filtered_count: filtered.len(),
        total_pages: total_pages(filtered.len(), per_page),
        current_page: page,
        teacher_options: teacher_options(all),
    }
}

/// Distinct teachers in first-seen order.
pub fn teacher_options(all: &[Course]) -> Vec<String> {
    let mut seen = HashSet::new();
    all.iter()
        .filter(|c| seen.insert(c.teacher.as_str()))
        .map(|c| c.teacher.clone())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    AlreadyDeleting,
    Failed,
    Detached,
}

#[derive(Debug, Default)]
struct ListState {
    courses: Vec<Course>,
    query: ListQuery,
    deleting: HashSet<i64>,
}

impl ListState {
    fn clamp_page(&mut self, per_page: usize) {
        let filtered = self.courses.iter().filter(|c| self.query.matches(c)).count();
        let last = total_pages(filtered, per_page).max(1);
        self.query.page = self.query.page.clamp(1, last);
    }
}

pub struct ListController {
    repo: Arc<dyn CourseRepository>,
    ui: Arc<dyn UiHost>,
    per_page: usize,
    state: Mutex<ListState>,
    mounted: AtomicBool,
}

impl ListController {
    pub fn new(repo: Arc<dyn CourseRepository>, ui: Arc<dyn UiHost>, per_page: usize) -> Self {
        Self {
            repo,
            ui,
            per_page: per_page.max(1),
            state: Mutex::new(ListState::default()),
            mounted: AtomicBool::new(true),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn view(&self) -> ListView {
        let state = self.state();
        derive_view(&state.courses, &state.query, self.per_page)
    }

    pub fn query(&self) -> ListQuery {
        self.state().query.clone()
    }

    /// Fetch the full collection. A failure keeps whatever was shown before.
    pub async fn load(&self) -> bool {
        let result = self.repo.list().await;
        if !self.is_mounted() {
            return false;
        }

        match result {
            Ok(courses) => {
                info!("loaded {} courses", courses.len());
                let mut state = self.state();
                state.courses = courses;
                state.clamp_page(self.per_page);
                true
            }
            Err(e) => {
                warn!("failed to load courses: {}", e);
                self.ui.notify(NotifyLevel::Error, "Lỗi khi tải dữ liệu");
                false
            }
        }
    }

    pub fn set_search(&self, search: &str) {
        let mut state = self.state();
        state.query.search = search.to_string();
        state.query.page = 1;
    }

    pub fn set_teacher_filter(&self, teacher: &str) {
        let mut state = self.state();
        state.query.teacher = teacher.to_string();
        state.query.page = 1;
    }

    pub fn go_to_page(&self, page: usize) {
        let mut state = self.state();
        state.query.page = page;
        state.clamp_page(self.per_page);
    }

    pub fn edit(&self, id: i64) {
        self.ui.navigate(&ui::edit_path(id));
    }

    pub async fn delete(&self, id: i64) -> DeleteOutcome {
        if !self.ui.confirm("Bạn có chắc muốn xóa không?") {
            return DeleteOutcome::Cancelled;
        }

        if !self.state().deleting.insert(id) {
            warn!("delete of course {} already in flight", id);
            return DeleteOutcome::AlreadyDeleting;
        }

        let result = self.repo.delete_by_id(id).await;

        let mut state = self.state();
        state.deleting.remove(&id);
        if !self.is_mounted() {
            return DeleteOutcome::Detached;
        }

        match result {
            Ok(()) => {
                state.courses.retain(|c| c.id != id);
                state.clamp_page(self.per_page);
                drop(state);
                self.ui.notify(NotifyLevel::Success, "Xóa thành công");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                drop(state);
                warn!("failed to delete course {}: {}", id, e);
                self.ui.notify(NotifyLevel::Error, "Xóa thất bại");
                DeleteOutcome::Failed
            }
        }
    }
}
