use std::path::{Component, Path};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use time::OffsetDateTime;
use crate::errors::WikiError;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Whether `title` is a non-empty run of ASCII letters, digits, `_` or `-`.
pub fn is_valid_title(title: &str) -> bool {
    !title.is_empty()
        && title
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Turn a free-form page name into a title candidate: spaces become underscores.
pub fn normalize_page_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Reject request paths that try to climb out of their root.
pub fn ensure_safe_path(req_path: &str) -> Result<(), WikiError> {
    for comp in Path::new(req_path).components() {
        match comp {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(WikiError::NotFound),
        }
    }
    Ok(())
}

/// Normalize request path
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Generate last modified metadata HTML
pub fn last_modified_html(path: &Path) -> String {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => mtime,
        Err(_) => return String::new(),
    };
    let fmt = time::format_description::well_known::Rfc3339;
    match OffsetDateTime::from(modified).format(&fmt) {
        Ok(s) => format!("<p class=\"meta\">Last modified: {}</p>", escape_html(&s)),
        Err(_) => String::new(),
    }
}

/// Determine content type for a file from its extension
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// A 302 Found redirect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
