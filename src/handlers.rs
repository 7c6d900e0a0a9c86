use axum::{
    body::Body,
    extract::{Path as AxumPath, State},
    http::{header, Response, StatusCode},
    response::{Html, IntoResponse},
    Form,
};

use crate::components::{ActionBarComponent, NavigationComponent, TemplateComponent};
use crate::errors::WikiError;
use crate::extract::{CurrentUser, PageTitle};
use crate::types::{
    AppState, LoginForm, LoginOutcome, NewPageForm, Page, SaveForm, SearchForm, TemplateContext,
};
use crate::utils::{
    content_type_for, ensure_safe_path, found, is_valid_title, last_modified_html,
    normalize_page_name, normalize_path,
};

/// Wrap `content` in the site shell with sidebar and action bar.
fn render_layout(
    state: &AppState,
    user: &CurrentUser,
    page_title: Option<&str>,
    window_title: &str,
    content: String,
) -> Result<Html<String>, WikiError> {
    let navigation = NavigationComponent::new(state.finder.clone());
    let sidebar = navigation.build_sidebar_html(page_title)?;
    let bar = ActionBarComponent::new();
    let actions = bar.generate_actions(page_title);
    let actions_html = bar.generate_html(&actions, user.name());
    let templates = TemplateComponent::new(state.config.template_dir.as_ref().clone());
    let page = templates.render_shell(&TemplateContext {
        title: window_title.to_string(),
        content,
        sidebar,
        actions: actions_html,
    })?;
    Ok(Html(page))
}

fn render_page_view(state: &AppState, user: &CurrentUser, page: &Page) -> Result<Html<String>, WikiError> {
    let templates = TemplateComponent::new(state.config.template_dir.as_ref().clone());
    let meta = state
        .pages
        .path_for(&page.title)
        .map(|path| last_modified_html(&path))
        .unwrap_or_default();
    let content = templates.render_view(page, &meta)?;
    render_layout(state, user, Some(&page.title), &page.title, content)
}

fn render_home(state: &AppState, user: &CurrentUser, notice: Option<&str>) -> Result<Html<String>, WikiError> {
    let templates = TemplateComponent::new(state.config.template_dir.as_ref().clone());
    let content = templates.render_home(user.name(), notice)?;
    render_layout(state, user, None, "Wiki", content)
}

fn render_login(
    state: &AppState,
    user: &CurrentUser,
    username: &str,
    notice: Option<&str>,
) -> Result<Html<String>, WikiError> {
    let templates = TemplateComponent::new(state.config.template_dir.as_ref().clone());
    let content = templates.render_login(username, notice)?;
    render_layout(state, user, None, "Log in", content)
}

/// Handle root path requests
pub async fn handle_root(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, WikiError> {
    render_home(&state, &user, None)
}

/// Title search from the home page: show the first matching page.
pub async fn handle_search(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<SearchForm>,
) -> Result<impl IntoResponse, WikiError> {
    let query = normalize_page_name(&form.search);
    log::info!("Search request received for query: '{}'", query);

    let hit = match state.finder.search(&query)? {
        Some(title) => title,
        None => {
            let notice = format!("No page matched \"{}\".", form.search.trim());
            return render_home(&state, &user, Some(&notice));
        }
    };

    match state.pages.load(&hit) {
        Ok(page) => render_page_view(&state, &user, &page),
        Err(WikiError::NotFound) => {
            log::warn!("Search hit '{}' disappeared before it could be loaded", hit);
            render_home(&state, &user, Some("That page no longer exists."))
        }
        Err(e) => Err(e),
    }
}

pub async fn handle_view(
    State(state): State<AppState>,
    user: CurrentUser,
    PageTitle(title): PageTitle,
) -> Result<Response<Body>, WikiError> {
    match state.pages.load(&title) {
        Ok(page) => Ok(render_page_view(&state, &user, &page)?.into_response()),
        Err(WikiError::NotFound) => {
            log::debug!("Page '{}' missing, redirecting to editor", title);
            Ok(found(&format!("/edit/{}", title)))
        }
        Err(e) => Err(e),
    }
}

pub async fn handle_edit(
    State(state): State<AppState>,
    user: CurrentUser,
    PageTitle(title): PageTitle,
) -> Result<impl IntoResponse, WikiError> {
    let page = match state.pages.load(&title) {
        Ok(page) => page,
        Err(WikiError::NotFound) => Page::empty(&title),
        Err(e) => return Err(e),
    };
    let templates = TemplateComponent::new(state.config.template_dir.as_ref().clone());
    let content = templates.render_edit(&page)?;
    render_layout(&state, &user, Some(&title), &format!("Editing {}", title), content)
}

pub async fn handle_save(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
    Form(form): Form<SaveForm>,
) -> Result<impl IntoResponse, WikiError> {
    let html = state.renderer.render(&form.body);
    state.pages.save(&Page::new(title.as_str(), html))?;
    log::info!("Saved page '{}'", title);
    Ok(found(&format!("/view/{}", title)))
}

/// Page-name entry form
pub async fn handle_new_form(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, WikiError> {
    let templates = TemplateComponent::new(state.config.template_dir.as_ref().clone());
    let content = templates.render_new()?;
    render_layout(&state, &user, None, "New page", content)
}

pub async fn handle_new(Form(form): Form<NewPageForm>) -> Result<impl IntoResponse, WikiError> {
    let title = normalize_page_name(&form.pagename);
    if !is_valid_title(&title) {
        log::warn!("Rejected new page name {:?}", form.pagename);
        return Err(WikiError::InvalidInput(
            "page names may only contain letters, digits, spaces, '_' and '-'".to_string(),
        ));
    }
    Ok(found(&format!("/edit/{}", title)))
}

pub async fn handle_new_titled(PageTitle(title): PageTitle) -> impl IntoResponse {
    found(&format!("/edit/{}", title))
}

pub async fn handle_random(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, WikiError> {
    let page = state.finder.random_page()?;
    log::info!("Serving random page '{}'", page.title);
    render_page_view(&state, &user, &page)
}

pub async fn handle_random_seeded(
    state: State<AppState>,
    user: CurrentUser,
    _seed: PageTitle,
) -> Result<impl IntoResponse, WikiError> {
    handle_random(state, user).await
}

pub async fn handle_login_form(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, WikiError> {
    render_login(&state, &user, "", None)
}

pub async fn handle_login_form_named(
    State(state): State<AppState>,
    user: CurrentUser,
    PageTitle(name): PageTitle,
) -> Result<impl IntoResponse, WikiError> {
    render_login(&state, &user, &name, None)
}

/// Authenticate, registering unseen usernames on first use.
pub async fn handle_login(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<LoginForm>,
) -> Result<Response<Body>, WikiError> {
    let username = form.username.trim();
    if form.password.is_empty() {
        let page = render_login(&state, &user, username, Some("A password is required."))?;
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    let outcome = match state.accounts.login(username, &form.password) {
        Ok(outcome) => outcome,
        Err(WikiError::InvalidCredentials) => {
            let page = render_login(&state, &user, username, Some("Invalid password and/or username."))?;
            return Ok((StatusCode::UNAUTHORIZED, page).into_response());
        }
        Err(WikiError::InvalidInput(msg)) => {
            let page = render_login(&state, &user, "", Some(&msg))?;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
        Err(e) => return Err(e),
    };

    if let Some(old) = user.token.as_deref() {
        state.sessions.revoke(old).await;
    }
    let token = state.sessions.issue(username).await;
    let session = CurrentUser { token: Some(token.clone()), username: Some(username.to_string()) };
    let notice = match outcome {
        LoginOutcome::Registered => "Account created, you are now logged in.",
        LoginOutcome::Authenticated => "Login successful.",
    };
    let page = render_home(&state, &session, Some(notice))?;
    Ok(([(header::SET_COOKIE, state.sessions.cookie_for(&token))], page).into_response())
}

pub async fn handle_logout(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    if let Some(token) = user.token.as_deref() {
        state.sessions.revoke(token).await;
    }
    let mut resp = found("/");
    if let Ok(value) = state.sessions.clear_cookie().parse() {
        resp.headers_mut().insert(header::SET_COOKIE, value);
    }
    resp
}

/// Handle static file requests
pub async fn handle_static(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<impl IntoResponse, WikiError> {
    let normalized = normalize_path(&path);
    ensure_safe_path(&normalized)?;
    let requested = state.config.static_dir.join(&normalized);

    if !requested.is_file() {
        log::debug!("Static asset not found: {:?}", requested);
        return Err(WikiError::NotFound);
    }

    let bytes = std::fs::read(&requested)?;
    let content_type = content_type_for(&requested);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

pub async fn handle_not_found() -> WikiError {
    WikiError::NotFound
}
