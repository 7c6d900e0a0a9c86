use std::{fmt, io};
use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    Io(io::Error),
    NotFound,
    InvalidPath,
    InvalidInput(String),
    InvalidCredentials,
    EmptyCollection,
    TemplateError(String),
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Io(err)
    }
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
            WikiError::NotFound => write!(f, "Not found"),
            WikiError::InvalidPath => write!(f, "Not found"),
            WikiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            WikiError::InvalidCredentials => write!(f, "Invalid password and/or username"),
            WikiError::EmptyCollection => write!(f, "No pages have been written yet"),
            WikiError::TemplateError(e) => write!(f, "Template error: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl WikiError {
    pub fn status(&self) -> StatusCode {
        match self {
            WikiError::NotFound | WikiError::InvalidPath | WikiError::EmptyCollection => {
                StatusCode::NOT_FOUND
            }
            WikiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            WikiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            WikiError::Io(_) | WikiError::TemplateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected with {}: {}", status, self);
        }
        (status, self.to_string()).into_response()
    }
}
