#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use fotodown_engine::{
    CancellationToken, Credentials, EngineEvent, ProgressSink, RequestSettings, Session,
    SiteConfig,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 41 characters, like the hash suffix the site appends to preview names.
pub const HASH_SUFFIX: &str = "-0123456789abcdef0123456789abcdef0123.jpg";
pub const ACCOUNT_ID: u64 = 42;

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("alice", "s3cret")
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{body}</body></html>"),
        "text/html; charset=utf-8",
    )
}

pub fn photo_anchor(base: &str, name: &str, id: u64) -> String {
    format!(
        r#"<a class="fcx-detail-link fcx-show-detail" href="/photo/{name}/{id}" data-id="{id}"><img alt="Title {name}" data-src="{base}/images/{name}{HASH_SUFFIX}?w=300"></a>"#
    )
}

pub fn pagination(current: u32, total: u32) -> String {
    format!(
        r#"<div class="fcx-pagination text-center text-right-md">Seite {current} von {total}</div>"#
    )
}

/// Listing page for `names`, ids derived from position.
pub fn listing_page(base: &str, names: &[String], current: u32, total: u32) -> String {
    let anchors: String = names
        .iter()
        .enumerate()
        .map(|(i, name)| photo_anchor(base, name, 1000 + i as u64))
        .collect();
    format!("<div class=\"grid\">{anchors}</div>{}", pagination(current, total))
}

pub fn origin_prefix(base: &str, name: &str) -> String {
    format!("{base}/images/{name}{HASH_SUFFIX}")
}

pub fn detail_page(base: &str, name: &str) -> String {
    let prefix = origin_prefix(base, name);
    format!(
        r#"<a href="{base}/images/unrelated.jpg">other</a><a href="{prefix}?size=original">Original</a>"#
    )
}

pub fn image_bytes(name: &str) -> Vec<u8> {
    format!("jpeg:{name}").into_bytes()
}

pub async fn mount_login(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("login form").insert_header("Set-Cookie", "sid=abc; Path=/"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(html(body))
        .mount(server)
        .await;
}

pub async fn mount_successful_login(server: &MockServer) {
    mount_login(server, &format!("<span>[fc-user:{ACCOUNT_ID}]</span>")).await;
}

pub async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/user_photos/{ACCOUNT_ID}")))
        .and(query_param("sort", "new"))
        .and(query_param("page", page.to_string()))
        .respond_with(html(&body))
        .mount(server)
        .await;
}

/// Detail page plus image for one photo.
pub async fn mount_photo(server: &MockServer, name: &str, id: u64) {
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(format!("/photo/{name}/{id}")))
        .respond_with(html(&detail_page(&base, name)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/images/{name}{HASH_SUFFIX}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(image_bytes(name), "image/jpeg"))
        .mount(server)
        .await;
}

pub async fn login(server: &MockServer) -> Session {
    Session::login(
        &SiteConfig::with_base(&server.uri()),
        &RequestSettings::default(),
        &credentials(),
        &CancellationToken::new(),
    )
    .await
    .expect("login succeeds")
}

pub fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}
