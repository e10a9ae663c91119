#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use praktijk::auth::{session_layer, AuthGate, SingleAdminVerifier};
use praktijk::contact::{
    ContactDispatcher, Envelope, MailTransport, OutboundMail, TransportFailure,
};
use praktijk::records::DocumentStore;
use praktijk::web::{site_router, SiteState};
use tower::ServiceExt;

mod scratch;

pub use scratch::scratch_dir;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// Mail transport double that remembers every message and can be told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMail>>,
    failure: Option<TransportFailure>,
}

impl RecordingTransport {
    pub fn failing(failure: TransportFailure) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().expect("transport mutex").clone()
    }
}

impl MailTransport for RecordingTransport {
    async fn send(&self, mail: OutboundMail) -> Result<(), TransportFailure> {
        self.sent.lock().expect("transport mutex").push(mail);
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

pub struct TestSite {
    pub app: Router,
    pub store: Arc<DocumentStore>,
    pub state: Arc<SiteState<RecordingTransport>>,
    pub transport: Arc<RecordingTransport>,
}

pub fn envelope() -> Envelope {
    Envelope {
        from_name: "Website".to_string(),
        from_address: "website@praktijk.test".to_string(),
        to: "info@praktijk.test".to_string(),
    }
}

pub fn site(label: &str) -> TestSite {
    site_with_transport(label, RecordingTransport::default())
}

pub fn site_with_transport(label: &str, transport: RecordingTransport) -> TestSite {
    let store = Arc::new(DocumentStore::new(scratch_dir(label).join("data.json")));
    let transport = Arc::new(transport);
    let gate = AuthGate::new(Arc::new(SingleAdminVerifier::new(
        ADMIN_USER,
        Some(ADMIN_PASSWORD.to_string()),
    )));
    let contact = ContactDispatcher::new(Arc::clone(&transport), envelope());
    let state = Arc::new(SiteState::new(Arc::clone(&store), gate, contact));
    let app = site_router(Arc::clone(&state)).layer(session_layer(false));

    TestSite {
        app,
        store,
        state,
        transport,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request builds")
}

pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// `name=value` pair from the response's session cookie, ready for a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("praktijk.sid="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Log in with the configured admin identity and return the session cookie.
pub async fn login(app: &Router) -> String {
    let body = format!("username={ADMIN_USER}&password={ADMIN_PASSWORD}");
    let response = send(app, form_post("/backoffice/login", &body, None)).await;
    assert_eq!(location(&response).as_deref(), Some("/backoffice"));
    session_cookie(&response).expect("login sets a session cookie")
}
