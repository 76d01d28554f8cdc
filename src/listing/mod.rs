pub mod error;
pub mod materialize;
pub mod order;
pub mod params;
pub mod predicate;
pub mod types;

pub use error::ListError;
pub use materialize::materialize;
pub use types::*;
