use std::sync::Arc;
use serde::Deserialize;
use crate::config::Config;
use crate::services::{AccountService, MarkdownService, PageFinder, PageStore, SessionService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pages: PageStore,
    pub finder: PageFinder,
    pub renderer: MarkdownService,
    pub accounts: AccountService,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pages = PageStore::new(config.pages_dir.as_ref().clone());
        let finder = PageFinder::new(pages.clone());
        let accounts = AccountService::new(config.users_dir.as_ref().clone(), config.hash_rounds);
        let sessions = SessionService::new(config.session_ttl);
        Self {
            config: Arc::new(config),
            pages,
            finder,
            renderer: MarkdownService::new(),
            accounts,
            sessions,
        }
    }
}

/// A titled unit of content stored as one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    /// A page that has not been written yet.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Template rendering context
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub title: String,
    pub content: String,
    pub sidebar: String,
    pub actions: String,
}

/// Result of a login attempt that was allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The username was unseen and an account was created for it.
    Registered,
    Authenticated,
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPageForm {
    #[serde(default)]
    pub pagename: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
