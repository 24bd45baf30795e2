use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Question ID is invalid: {0}")]
    InvalidQuestion(String),

    #[error("Answer text is invalid: {0:?}")]
    InvalidAnswerText(String),

    #[error("Unable to determine personality type")]
    NoProfile,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("embedded seed data is invalid: {0}")]
    Seed(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
