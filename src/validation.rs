//! Field rules for course drafts and credentials.
//!
//! Each field has exactly one validator; the tables below fix the order in
//! which violations are reported.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{Category, CourseDraft, CourseField, CredentialField, Credentials};

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 100;
pub const MIN_TEACHER_LEN: usize = 3;
pub const MIN_CREDIT: i64 = 1;
pub const MAX_CREDIT: i64 = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.message.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn first(&self) -> Option<&Violation> {
        self.0.first()
    }

    fn push(&mut self, field: &'static str, message: String) {
        self.0.push(Violation { field, message });
    }

    /// Replace the violation for `field`, or drop it when `message` is `None`.
    pub fn replace(&mut self, field: &'static str, message: Option<String>) {
        match (self.0.iter().position(|v| v.field == field), message) {
            (Some(i), Some(message)) => self.0[i].message = message,
            (Some(i), None) => {
                self.0.remove(i);
            }
            (None, Some(message)) => self.push(field, message),
            (None, None) => {}
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

type CourseRule = fn(&CourseDraft) -> Option<String>;
type CredentialRule = fn(&Credentials) -> Option<String>;

const COURSE_RULES: [(CourseField, CourseRule); 4] = [
    (CourseField::Name, check_name),
    (CourseField::Credit, check_credit),
    (CourseField::Category, check_category),
    (CourseField::Teacher, check_teacher),
];

const CREDENTIAL_RULES: [(CredentialField, CredentialRule); 2] = [
    (CredentialField::Email, check_email),
    (CredentialField::Password, check_password),
];

pub fn validate_course(draft: &CourseDraft) -> Violations {
    let mut violations = Violations::default();
    for (field, rule) in COURSE_RULES {
        if let Some(message) = rule(draft) {
            violations.push(field.as_str(), message);
        }
    }
    violations
}

pub fn validate_course_field(draft: &CourseDraft, field: CourseField) -> Option<String> {
    COURSE_RULES
        .iter()
        .find(|(f, _)| *f == field)
        .and_then(|(_, rule)| rule(draft))
}

pub fn validate_credentials(credentials: &Credentials) -> Violations {
    let mut violations = Violations::default();
    for (field, rule) in CREDENTIAL_RULES {
        if let Some(message) = rule(credentials) {
            violations.push(field.as_str(), message);
        }
    }
    violations
}

pub fn validate_credential_field(
    credentials: &Credentials,
    field: CredentialField,
) -> Option<String> {
    CREDENTIAL_RULES
        .iter()
        .find(|(f, _)| *f == field)
        .and_then(|(_, rule)| rule(credentials))
}

fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

fn check_name(draft: &CourseDraft) -> Option<String> {
    let len = char_len(&draft.name);
    if len == 0 {
        Some("Tên khóa học bắt buộc".to_string())
    } else if len < MIN_NAME_LEN {
        Some(format!("Tối thiểu {} ký tự", MIN_NAME_LEN))
    } else if len > MAX_NAME_LEN {
        Some(format!("Tối đa {} ký tự", MAX_NAME_LEN))
    } else {
        None
    }
}

fn check_credit(draft: &CourseDraft) -> Option<String> {
    match draft.credit {
        None => Some("Số tín chỉ bắt buộc".to_string()),
        Some(c) if c < MIN_CREDIT => Some("Số tín chỉ phải > 0".to_string()),
        Some(c) if c > MAX_CREDIT => Some(format!("Số tín chỉ tối đa {}", MAX_CREDIT)),
        Some(_) => None,
    }
}

fn check_category(draft: &CourseDraft) -> Option<String> {
    if draft.category.trim().is_empty() {
        Some("Vui lòng chọn danh mục".to_string())
    } else if draft.category.parse::<Category>().is_err() {
        Some("Danh mục không hợp lệ".to_string())
    } else {
        None
    }
}

fn check_teacher(draft: &CourseDraft) -> Option<String> {
    let len = char_len(&draft.teacher);
    if len == 0 {
        Some("Tên giảng viên bắt buộc".to_string())
    } else if len < MIN_TEACHER_LEN {
        Some(format!("Tối thiểu {} ký tự", MIN_TEACHER_LEN))
    } else {
        None
    }
}

fn check_email(credentials: &Credentials) -> Option<String> {
    let email = credentials.email.trim();
    if email.is_empty() {
        Some("Email không được để trống".to_string())
    } else if !EMAIL_RE.is_match(email) {
        Some("Email không hợp lệ".to_string())
    } else {
        None
    }
}

fn check_password(credentials: &Credentials) -> Option<String> {
    let len = credentials.password.chars().count();
    if len == 0 {
        Some("Password không được để trống".to_string())
    } else if len < MIN_PASSWORD_LEN {
        Some(format!("Password tối thiểu {} ký tự", MIN_PASSWORD_LEN))
    } else {
        None
    }
}
