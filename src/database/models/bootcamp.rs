use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listing::Collection;

pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

pub static BOOTCAMPS: Collection = Collection {
    table: "bootcamps",
    columns: &[
        "id",
        "name",
        "slug",
        "description",
        "website",
        "phone",
        "email",
        "address",
        "formatted_address",
        "street",
        "city",
        "state",
        "zipcode",
        "country",
        "lat",
        "lng",
        "careers",
        "average_rating",
        "average_cost",
        "housing",
        "job_assistance",
        "job_guarantee",
        "accept_gi",
        "created_at",
        "user_id",
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<i64>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBootcamp {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

impl CreateBootcamp {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        validate_name(&self.name, &mut field_errors);
        validate_description(&self.description, &mut field_errors);
        if self.address.trim().is_empty() {
            field_errors.insert("address".to_string(), "Please add an address".to_string());
        }
        validate_careers(&self.careers, &mut field_errors);
        if let Some(website) = &self.website {
            validate_website(website, &mut field_errors);
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone, &mut field_errors);
        }
        finish(field_errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBootcamp {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl UpdateBootcamp {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if let Some(name) = &self.name {
            validate_name(name, &mut field_errors);
        }
        if let Some(description) = &self.description {
            validate_description(description, &mut field_errors);
        }
        if let Some(careers) = &self.careers {
            validate_careers(careers, &mut field_errors);
        }
        if let Some(website) = &self.website {
            validate_website(website, &mut field_errors);
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone, &mut field_errors);
        }
        finish(field_errors)
    }
}

fn validate_name(name: &str, field_errors: &mut HashMap<String, String>) {
    if name.trim().is_empty() {
        field_errors.insert("name".to_string(), "Please add a name".to_string());
    } else if name.len() > 50 {
        field_errors.insert(
            "name".to_string(),
            "Name can not be more than 50 characters".to_string(),
        );
    }
}

fn validate_description(description: &str, field_errors: &mut HashMap<String, String>) {
    if description.trim().is_empty() {
        field_errors.insert("description".to_string(), "Please add a description".to_string());
    } else if description.len() > 500 {
        field_errors.insert(
            "description".to_string(),
            "Description can not be more than 500 characters".to_string(),
        );
    }
}

fn validate_careers(careers: &[String], field_errors: &mut HashMap<String, String>) {
    if careers.is_empty() {
        field_errors.insert("careers".to_string(), "Please add at least one career".to_string());
        return;
    }
    for career in careers {
        if !CAREERS.contains(&career.as_str()) {
            field_errors.insert("careers".to_string(), format!("Invalid career: {}", career));
            return;
        }
    }
}

fn validate_website(website: &str, field_errors: &mut HashMap<String, String>) {
    if !website.starts_with("http://") && !website.starts_with("https://") {
        field_errors.insert(
            "website".to_string(),
            "Please use a valid URL with HTTP or HTTPS".to_string(),
        );
    }
}

fn validate_phone(phone: &str, field_errors: &mut HashMap<String, String>) {
    if phone.len() > 20 {
        field_errors.insert(
            "phone".to_string(),
            "Phone number can not be longer than 20 characters".to_string(),
        );
    }
}

fn finish(field_errors: HashMap<String, String>) -> Result<(), ApiError> {
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid bootcamp data", Some(field_errors)))
    }
}

/// Derive the URL slug from the bootcamp name: lowercase, runs of anything
/// non-alphanumeric collapsed to a single dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
