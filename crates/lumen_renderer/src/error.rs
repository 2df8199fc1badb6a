//! Render errors.

use thiserror::Error;

/// Errors that can occur when starting or running a render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid render config: {0}")]
    InvalidConfig(String),

    #[error("Render was cancelled")]
    Cancelled,
}

pub type RenderResult<T> = Result<T, RenderError>;
