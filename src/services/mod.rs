pub mod geocoder;
pub mod mailer;
pub mod password;
pub mod stats;
