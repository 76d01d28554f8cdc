use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listing::Collection;

pub const MINIMUM_SKILLS: &[&str] = &["beginner", "intermediate", "advanced"];

pub static COURSES: Collection = Collection {
    table: "courses",
    columns: &[
        "id",
        "title",
        "description",
        "weeks",
        "tuition",
        "minimum_skill",
        "scholarship_available",
        "created_at",
        "bootcamp_id",
        "user_id",
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: i64,
    pub minimum_skill: String,
    pub scholarship_available: bool,
    pub created_at: DateTime<Utc>,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: i64,
    pub minimum_skill: String,
    #[serde(default)]
    pub scholarship_available: bool,
}

impl CreateCourse {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if self.title.trim().is_empty() {
            field_errors.insert("title".to_string(), "Please add a course title".to_string());
        }
        if self.description.trim().is_empty() {
            field_errors.insert("description".to_string(), "Please add a description".to_string());
        }
        if self.weeks.trim().is_empty() {
            field_errors.insert("weeks".to_string(), "Please add number of weeks".to_string());
        }
        if self.tuition < 0 {
            field_errors.insert("tuition".to_string(), "Please add a tuition cost".to_string());
        }
        validate_minimum_skill(&self.minimum_skill, &mut field_errors);
        finish(field_errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<i64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

impl UpdateCourse {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                field_errors.insert("title".to_string(), "Please add a course title".to_string());
            }
        }
        if let Some(tuition) = self.tuition {
            if tuition < 0 {
                field_errors.insert("tuition".to_string(), "Please add a tuition cost".to_string());
            }
        }
        if let Some(minimum_skill) = &self.minimum_skill {
            validate_minimum_skill(minimum_skill, &mut field_errors);
        }
        finish(field_errors)
    }
}

fn validate_minimum_skill(minimum_skill: &str, field_errors: &mut HashMap<String, String>) {
    if !MINIMUM_SKILLS.contains(&minimum_skill) {
        field_errors.insert(
            "minimum_skill".to_string(),
            format!("Invalid minimum skill: {}", minimum_skill),
        );
    }
}

fn finish(field_errors: HashMap<String, String>) -> Result<(), ApiError> {
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid course data", Some(field_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_known_skill_level() {
        let payload = CreateCourse {
            title: "Front End Web Development".to_string(),
            description: "12 weeks of HTML/CSS/JS".to_string(),
            weeks: "12".to_string(),
            tuition: 8000,
            minimum_skill: "wizard".to_string(),
            scholarship_available: false,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn update_validates_only_present_fields() {
        let payload = UpdateCourse { tuition: Some(9000), ..Default::default() };
        assert!(payload.validate().is_ok());
    }
}
