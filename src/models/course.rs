use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{self, Violations};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub credit: i64,
    pub category: String,
    pub teacher: String,
}

impl Course {
    pub fn from_new(id: i64, course: NewCourse) -> Self {
        Self {
            id,
            name: course.name,
            credit: course.credit,
            category: course.category,
            teacher: course.teacher,
        }
    }

    /// Copy without the server-assigned id.
    pub fn to_new(&self) -> NewCourse {
        NewCourse {
            name: self.name.clone(),
            credit: self.credit,
            category: self.category.clone(),
            teacher: self.teacher.clone(),
        }
    }
}

/// A course that passed validation and has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub credit: i64,
    pub category: String,
    pub teacher: String,
}

/// Raw form input for the add/edit page.
///
/// `credit` is `None` while the input is empty or not a number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub name: String,
    pub credit: Option<i64>,
    pub category: String,
    pub teacher: String,
}

impl CourseDraft {
    pub fn validate(&self) -> Result<NewCourse, Violations> {
        let violations = validation::validate_course(self);
        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(NewCourse {
            name: self.name.trim().to_string(),
            credit: self.credit.unwrap_or_default(),
            category: self.category.clone(),
            teacher: self.teacher.trim().to_string(),
        })
    }

    pub fn set(&mut self, field: CourseField, raw: &str) {
        match field {
            CourseField::Name => self.name = raw.to_string(),
            CourseField::Credit => self.credit = raw.trim().parse().ok(),
            CourseField::Category => self.category = raw.to_string(),
            CourseField::Teacher => self.teacher = raw.to_string(),
        }
    }
}

impl From<&Course> for CourseDraft {
    fn from(course: &Course) -> Self {
        Self {
            name: course.name.clone(),
            credit: Some(course.credit),
            category: course.category.clone(),
            teacher: course.teacher.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseField {
    Name,
    Credit,
    Category,
    Teacher,
}

impl CourseField {
    pub const ALL: [CourseField; 4] = [
        CourseField::Name,
        CourseField::Credit,
        CourseField::Category,
        CourseField::Teacher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseField::Name => "name",
            CourseField::Credit => "credit",
            CourseField::Category => "category",
            CourseField::Teacher => "teacher",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Cơ sở")]
    Foundation,
    #[serde(rename = "Chuyên ngành")]
    Major,
    #[serde(rename = "Đại cương")]
    General,
    #[serde(rename = "Tự chọn")]
    Elective,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Foundation,
        Category::Major,
        Category::General,
        Category::Elective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Foundation => "Cơ sở",
            Category::Major => "Chuyên ngành",
            Category::General => "Đại cương",
            Category::Elective => "Tự chọn",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}
