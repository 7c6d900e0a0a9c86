use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use log::{debug, error};
use crate::errors::WikiError;
use crate::types::{Page, TemplateContext};
use crate::utils::{escape_attr, escape_html};

const FALLBACK_BASE: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{{TITLE}}</title>{{STYLE}}</head><body><div class=\"layout\"><aside class=\"sidebar\">{{SIDEBAR}}</aside><main class=\"content\">{{ACTIONS}}<article>{{CONTENT}}</article></main></div></body></html>";

const FALLBACK_VIEW: &str = "<h1>{{TITLE}}</h1>{{META}}<div class=\"page-body\">{{BODY}}</div><p class=\"page-links\"><a href=\"/edit/{{TITLE_ATTR}}\">edit</a></p>";

const FALLBACK_EDIT: &str = "<h1>Editing {{TITLE}}</h1><form action=\"/save/{{TITLE_ATTR}}\" method=\"POST\"><div><textarea name=\"body\" rows=\"20\" cols=\"80\">{{BODY}}</textarea></div><div><input type=\"submit\" value=\"Save\"></div></form>";

const FALLBACK_HOME: &str = "<h1>Wiki</h1><p class=\"user\">User: {{USER}}</p>{{NOTICE}}<form action=\"/\" method=\"POST\"><input type=\"text\" name=\"search\" placeholder=\"Search page titles\"><input type=\"submit\" value=\"Search\"></form>";

const FALLBACK_NEW: &str = "<h1>New page</h1><form action=\"/new\" method=\"POST\"><input type=\"text\" name=\"pagename\" placeholder=\"Page name\"><input type=\"submit\" value=\"Create\"></form>";

const FALLBACK_LOGIN: &str = "<h1>Log in</h1>{{NOTICE}}<form action=\"/login\" method=\"POST\"><div><input type=\"text\" name=\"username\" value=\"{{USERNAME}}\" placeholder=\"Username\"></div><div><input type=\"password\" name=\"password\" placeholder=\"Password\"></div><div><input type=\"submit\" value=\"Log in\"></div></form>";

/// Component for handling HTML template rendering
///
/// Templates are read from `<template_dir>/<name>.html` on every render and
/// fall back to built-in markup when the file is missing. Markers look like
/// `{{NAME}}`; values are substituted in one pass, so inserted text is never
/// rescanned for markers.
#[derive(Clone)]
pub struct TemplateComponent {
    template_dir: PathBuf,
}

impl TemplateComponent {
    /// Create a new template component
    pub fn new(template_dir: PathBuf) -> Self {
        Self { template_dir }
    }

    /// Wrap page content in the HTML shell
    pub fn render_shell(&self, context: &TemplateContext) -> Result<String, WikiError> {
        let base = self.load("base", FALLBACK_BASE)?;
        let title = escape_html(&context.title);
        Ok(fill(
            &base,
            &[
                ("TITLE", title.as_str()),
                ("STYLE", "<link rel=\"stylesheet\" href=\"/static/css/wiki.css\">"),
                ("SIDEBAR", context.sidebar.as_str()),
                ("ACTIONS", context.actions.as_str()),
                ("CONTENT", context.content.as_str()),
            ],
        ))
    }

    /// Page view; the body is stored sanitized and goes in unescaped.
    pub fn render_view(&self, page: &Page, meta: &str) -> Result<String, WikiError> {
        let tpl = self.load("view", FALLBACK_VIEW)?;
        let body = page.body_text();
        Ok(fill(
            &tpl,
            &[
                ("TITLE", escape_html(&page.title).as_str()),
                ("TITLE_ATTR", escape_attr(&page.title).as_str()),
                ("META", meta),
                ("BODY", body.as_str()),
            ],
        ))
    }

    pub fn render_edit(&self, page: &Page) -> Result<String, WikiError> {
        let tpl = self.load("edit", FALLBACK_EDIT)?;
        Ok(fill(
            &tpl,
            &[
                ("TITLE", escape_html(&page.title).as_str()),
                ("TITLE_ATTR", escape_attr(&page.title).as_str()),
                ("BODY", escape_html(&page.body_text()).as_str()),
            ],
        ))
    }

    pub fn render_home(&self, user: Option<&str>, notice: Option<&str>) -> Result<String, WikiError> {
        let tpl = self.load("home", FALLBACK_HOME)?;
        let user = escape_html(user.unwrap_or("Not logged in"));
        Ok(fill(&tpl, &[("USER", user.as_str()), ("NOTICE", notice_html(notice).as_str())]))
    }

    pub fn render_new(&self) -> Result<String, WikiError> {
        self.load("new", FALLBACK_NEW)
    }

    pub fn render_login(&self, username: &str, notice: Option<&str>) -> Result<String, WikiError> {
        let tpl = self.load("login", FALLBACK_LOGIN)?;
        Ok(fill(
            &tpl,
            &[
                ("USERNAME", escape_attr(username).as_str()),
                ("NOTICE", notice_html(notice).as_str()),
            ],
        ))
    }

    fn load(&self, name: &str, fallback: &str) -> Result<String, WikiError> {
        let path = self.template_dir.join(format!("{}.html", name));
        match fs::read_to_string(&path) {
            Ok(tpl) => Ok(tpl),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Template {:?} missing, using built-in markup", path);
                Ok(fallback.to_string())
            }
            Err(e) => {
                error!("Failed to read template {:?}: {}", path, e);
                Err(WikiError::TemplateError(format!("{}: {}", path.display(), e)))
            }
        }
    }
}

fn notice_html(notice: Option<&str>) -> String {
    match notice {
        Some(text) => format!("<p class=\"notice\">{}</p>", escape_html(text)),
        None => String::new(),
    }
}

/// Replace `{{KEY}}` markers with their values in a single left-to-right pass.
/// Unknown markers are left as they are.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
