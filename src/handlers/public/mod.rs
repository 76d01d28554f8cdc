pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
