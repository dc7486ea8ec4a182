use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid email address: {reason}")]
    InvalidEmail { reason: &'static str },

    #[error("a superuser account requires a password")]
    PasswordRequired,

    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("email address is already registered")]
    EmailTaken,

    #[error("user {id} not found")]
    NotFound { id: Uuid },

    #[error("invalid pagination: page={page} page_size={page_size}")]
    InvalidPagination { page: u64, page_size: u64 },

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

pub type AppResult<T> = Result<T, AppError>;
