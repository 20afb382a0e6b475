// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

/// Application error type.
///
/// Every asynchronous boundary converts its failures into one of these
/// variants; the UI shell renders them through [`AppError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User not authorized")]
    AuthorizationDenied,

    #[error("Sign-in failed: {0}")]
    SignInFailure(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Map the error to the single user-visible message slot.
    ///
    /// Database and internal details are logged here rather than shown.
    pub fn user_message(&self) -> String {
        match self {
            AppError::AuthorizationDenied => {
                "User not authorized. Contact the administrator.".to_string()
            }
            AppError::SignInFailure(msg) => {
                tracing::warn!(error = %msg, "Sign-in failed");
                "Could not sign in with Google.".to_string()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "Could not save data. Check your connection.".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
