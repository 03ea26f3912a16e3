use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::TransactionId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("no credential provided")]
    Unauthenticated,

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("validation failed for field(s): {}", .fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("transaction not found: {0}")]
    NotFound(TransactionId),

    #[error("transaction {0} belongs to another user")]
    Forbidden(TransactionId),

    #[error("storage error: {0}")]
    Store(#[from] anyhow::Error),
}

impl AppError {
    pub(crate) fn validation(field: &str) -> Self {
        AppError::Validation {
            fields: vec![field.to_string()],
        }
    }

    /// Stable outward code for this failure kind. Transports map these 1:1
    /// onto their own status signals instead of collapsing everything into
    /// one generic failure.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidCredential(_) => "INVALID_CREDENTIAL",
            AppError::Validation { .. } => "VALIDATION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Store(_) => "STORE_FAILURE",
        }
    }

    /// Distinct process exit status for the CLI boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Unauthenticated => 10,
            AppError::InvalidCredential(_) => 11,
            AppError::Validation { .. } => 12,
            AppError::NotFound(_) => 13,
            AppError::Forbidden(_) => 14,
            AppError::Store(_) => 15,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AppError::Unauthenticated,
            other => AppError::InvalidCredential(other.to_string()),
        }
    }
}
