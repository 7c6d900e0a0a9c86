use std::convert::Infallible;
use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use log::debug;
use crate::errors::WikiError;
use crate::services::session_service::token_from_headers;
use crate::types::AppState;
use crate::utils::is_valid_title;

/// The session attached to this request, resolved from its cookie.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    pub token: Option<String>,
    pub username: Option<String>,
}

impl CurrentUser {
    pub fn name(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(Self::default());
        };
        let username = state.sessions.resolve(&token).await;
        if username.is_none() {
            debug!("Request carried an unknown or expired session token");
        }
        Ok(Self { token: Some(token), username })
    }
}

/// The `<identifier>` segment of `/<verb>/<identifier>`, checked against
/// `[A-Za-z0-9_-]+`. Anything else is answered with 404.
#[derive(Debug, Clone)]
pub struct PageTitle(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for PageTitle
where
    S: Send + Sync,
{
    type Rejection = WikiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(title) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| WikiError::NotFound)?;
        if !is_valid_title(&title) {
            debug!("Rejecting invalid page title {:?}", title);
            return Err(WikiError::InvalidPath);
        }
        Ok(Self(title))
    }
}
