use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listing::Collection;

pub static REVIEWS: Collection = Collection {
    table: "reviews",
    columns: &["id", "title", "text", "rating", "created_at", "bootcamp_id", "user_id"],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub title: String,
    pub text: String,
    pub rating: i32,
}

impl CreateReview {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        validate_title(&self.title, &mut field_errors);
        if self.text.trim().is_empty() {
            field_errors.insert("text".to_string(), "Please add some text".to_string());
        }
        validate_rating(self.rating, &mut field_errors);
        finish(field_errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

impl UpdateReview {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if let Some(title) = &self.title {
            validate_title(title, &mut field_errors);
        }
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                field_errors.insert("text".to_string(), "Please add some text".to_string());
            }
        }
        if let Some(rating) = self.rating {
            validate_rating(rating, &mut field_errors);
        }
        finish(field_errors)
    }
}

fn validate_title(title: &str, field_errors: &mut HashMap<String, String>) {
    if title.trim().is_empty() {
        field_errors.insert("title".to_string(), "Please add a title for the review".to_string());
    } else if title.len() > 100 {
        field_errors.insert(
            "title".to_string(),
            "Title can not be more than 100 characters".to_string(),
        );
    }
}

fn validate_rating(rating: i32, field_errors: &mut HashMap<String, String>) {
    if !(1..=10).contains(&rating) {
        field_errors.insert(
            "rating".to_string(),
            "Please add a rating between 1 and 10".to_string(),
        );
    }
}

fn finish(field_errors: HashMap<String, String>) -> Result<(), ApiError> {
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid review data", Some(field_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        for rating in [1, 10] {
            let payload = CreateReview {
                title: "Great course".to_string(),
                text: "Learned a lot".to_string(),
                rating,
            };
            assert!(payload.validate().is_ok(), "rating {} should validate", rating);
        }
        for rating in [0, 11] {
            let payload = CreateReview {
                title: "Great course".to_string(),
                text: "Learned a lot".to_string(),
                rating,
            };
            assert!(payload.validate().is_err(), "rating {} should fail", rating);
        }
    }
}
