use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required input was missing or empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The filesystem entry does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The filesystem entry already exists.
    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The action does not apply to this kind of node.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Navigation was requested with nothing selected.
    #[error("No node is currently selected")]
    NoSelection,

    /// A line or index outside the visible projection.
    #[error("Line {0} is out of bounds")]
    OutOfBounds(usize),

    /// I/O errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn already_exists_display_includes_path() {
        let err = AppError::AlreadyExists(PathBuf::from("/notes/a.md"));
        assert_eq!(err.to_string(), "Already exists: /notes/a.md");
    }

    #[test]
    fn out_of_bounds_display() {
        let err = AppError::OutOfBounds(42);
        assert_eq!(err.to_string(), "Line 42 is out of bounds");
    }

    #[test]
    fn invalid_path_error_display() {
        let err = AppError::InvalidPath("/nonexistent".into());
        assert_eq!(err.to_string(), "Invalid path: /nonexistent");
    }
}
