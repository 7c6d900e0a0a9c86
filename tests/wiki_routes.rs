use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;

use tinywiki::{build_router, prepare_storage, AppState, Config};

const FORM: &str = "application/x-www-form-urlencoded";

fn wiki(dir: &Path) -> Router {
    let mut config = Config::with_data_root(dir);
    config.static_dir = Arc::new(dir.join("static"));
    config.template_dir = Arc::new(dir.join("no-templates"));
    config.hash_rounds = 16;
    let state = AppState::new(config);
    prepare_storage(&state).unwrap();
    build_router(state)
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    app.clone().oneshot(req.body(Body::from(form.to_string())).unwrap()).await.unwrap()
}

async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[tokio::test]
async fn saving_markdown_stores_sanitized_html_and_redirects_to_view() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = post_form(&app, "/save/Test", "body=%23+Hi", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/view/Test");

    let stored = std::fs::read_to_string(dir.path().join("pages/Test.txt")).unwrap();
    assert_eq!(stored, "<h1>Hi</h1>\n");

    let first = get(&app, "/view/Test", None).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_string(first).await;
    assert!(first.contains("<h1>Hi</h1>"));

    let second = body_string(get(&app, "/view/Test", None).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn saving_again_replaces_the_whole_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    post_form(&app, "/save/Notes", "body=first+version", None).await;
    post_form(&app, "/save/Notes", "body=second", None).await;

    let stored = std::fs::read_to_string(dir.path().join("pages/Notes.txt")).unwrap();
    assert_eq!(stored, "<p>second</p>\n");
}

#[tokio::test]
async fn script_injection_never_reaches_disk() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    post_form(&app, "/save/Evil", "body=hi%3Cscript%3Ealert(1)%3C%2Fscript%3E", None).await;

    let stored = std::fs::read_to_string(dir.path().join("pages/Evil.txt")).unwrap();
    assert!(!stored.contains("script"));
    assert!(stored.contains("hi"));
}

#[tokio::test]
async fn viewing_a_missing_page_offers_the_editor() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = get(&app, "/view/Missing", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/edit/Missing");

    let resp = get(&app, "/edit/Missing", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("action=\"/save/Missing\""));
    assert!(html.contains("<textarea name=\"body\" rows=\"20\" cols=\"80\"></textarea>"));
}

#[tokio::test]
async fn invalid_titles_are_not_found_and_never_stored() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    for uri in ["/view/bad.title", "/view/a%20b", "/edit/..%2Fsecret", "/view/a/b", "/view/", "/delete/Page"] {
        let resp = get(&app, uri, None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let resp = post_form(&app, "/save/..%2Fescape", "body=x", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = post_form(&app, "/save/has.dot", "body=x", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(std::fs::read_dir(dir.path().join("pages")).unwrap().count(), 0);
    assert!(!dir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn random_page_on_empty_store_is_an_explicit_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = get(&app, "/random", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_string(resp).await.contains("No pages"));

    post_form(&app, "/save/Only", "body=lonely", None).await;
    for uri in ["/random", "/random/again"] {
        let resp = get(&app, uri, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("<p>lonely</p>"));
    }
}

#[tokio::test]
async fn home_search_shows_first_title_match() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());
    for (title, body) in [("Dog", "woof"), ("Catalog", "list"), ("Cat", "meow")] {
        post_form(&app, &format!("/save/{title}"), &format!("body={body}"), None).await;
    }

    for _ in 0..3 {
        let html = body_string(post_form(&app, "/", "search=Cat", None).await).await;
        assert!(html.contains("<p>meow</p>"));
    }

    let html = body_string(post_form(&app, "/", "search=Zebra", None).await).await;
    assert!(html.contains("No page matched"));
    assert!(html.contains("Not logged in"));
}

#[tokio::test]
async fn search_treats_spaces_as_underscores() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());
    post_form(&app, "/save/Shopping_List", "body=eggs", None).await;

    let html = body_string(post_form(&app, "/", "search=Shopping+List", None).await).await;
    assert!(html.contains("<p>eggs</p>"));
}

#[tokio::test]
async fn new_page_names_are_normalized_into_the_editor() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = get(&app, "/new", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("name=\"pagename\""));

    let resp = post_form(&app, "/new", "pagename=My+New+Page", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/edit/My_New_Page");

    let resp = get(&app, "/new/Direct", None).await;
    assert_eq!(location(&resp), "/edit/Direct");

    let resp = post_form(&app, "/new", "pagename=..%2Fetc", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_registers_then_sessions_are_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = post_form(&app, "/login", "username=ada&password=s3cret", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).expect("session cookie");
    assert!(cookie.starts_with("tinywiki_session="));
    assert_eq!(cookie.len(), "tinywiki_session=".len() + 64);
    let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=31536000"));
    assert!(body_string(resp).await.contains("User: ada"));
    assert!(dir.path().join("users/ada.data").is_file());

    let html = body_string(get(&app, "/", Some(&cookie)).await).await;
    assert!(html.contains("User: ada"));

    let html = body_string(get(&app, "/", None).await).await;
    assert!(html.contains("User: Not logged in"));

    let forged = body_string(get(&app, "/", Some("tinywiki_session=ada")).await).await;
    assert!(forged.contains("User: Not logged in"));
}

#[tokio::test]
async fn wrong_password_is_refused_without_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    post_form(&app, "/login", "username=ada&password=right", None).await;
    let resp = post_form(&app, "/login", "username=ada&password=wrong", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(resp).await.contains("Invalid password"));

    let resp = post_form(&app, "/login", "username=ada&password=right", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_some());
}

#[tokio::test]
async fn bad_usernames_are_rejected_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = post_form(&app, "/login", "username=..%2Fpages%2FTest&password=x", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(dir.path().join("users")).unwrap().count(), 0);

    let resp = get(&app, "/login/ada", None).await;
    assert!(body_string(resp).await.contains("value=\"ada\""));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());

    let resp = post_form(&app, "/login", "username=ada&password=pw", None).await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = post_form(&app, "/logout", "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(session_cookie(&resp).unwrap().starts_with("tinywiki_session="));

    let html = body_string(get(&app, "/", Some(&cookie)).await).await;
    assert!(html.contains("User: Not logged in"));
}

#[tokio::test]
async fn static_assets_are_served_with_their_content_type() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());
    std::fs::create_dir_all(dir.path().join("static/css")).unwrap();
    std::fs::write(dir.path().join("static/css/wiki.css"), "body{}").unwrap();

    let resp = get(&app, "/static/css/wiki.css", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");
    assert_eq!(body_string(resp).await, "body{}");

    let resp = get(&app, "/static/../pages/x", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = get(&app, "/static/%2E%2E/users/ada.data", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_saves_leave_one_whole_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = wiki(dir.path());
    let a = format!("body={}", "a".repeat(64 * 1024));
    let b = format!("body={}", "b".repeat(64 * 1024));

    let (ra, rb) = tokio::join!(
        post_form(&app, "/save/Race", &a, None),
        post_form(&app, "/save/Race", &b, None)
    );
    assert_eq!(ra.status(), StatusCode::FOUND);
    assert_eq!(rb.status(), StatusCode::FOUND);

    let stored = std::fs::read_to_string(dir.path().join("pages/Race.txt")).unwrap();
    let expect_a = format!("<p>{}</p>\n", "a".repeat(64 * 1024));
    let expect_b = format!("<p>{}</p>\n", "b".repeat(64 * 1024));
    assert!(stored == expect_a || stored == expect_b);
}
