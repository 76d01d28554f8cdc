use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Invalid filter parameter: {0}")]
    InvalidFilter(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
