#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No valid rows found in import")]
    NoValidRows,

    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
