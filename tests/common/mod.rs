//! In-process stand-in for the devthoughts REST API.
//!
//! Tests build an axum `Router` with just the endpoints they need and serve
//! it on an ephemeral port. Every request that reaches a route is recorded
//! so tests can assert on paths, queries and headers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};

use devthoughts::config::PaginationConfig;
use devthoughts::{ApiClient, SessionStore};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

impl Recorded {
    /// Value of a query parameter, undecoded.
    pub fn param(&self, name: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == name).then(|| v.to_string())
        })
    }
}

#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<Recorded>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.all().into_iter().map(|r| r.path).collect()
    }

    /// First recorded request to `path`.
    pub fn find(&self, path: &str) -> Option<Recorded> {
        self.all().into_iter().find(|r| r.path == path)
    }

    fn push(&self, recorded: Recorded) {
        self.0.lock().unwrap().push(recorded);
    }
}

async fn record(State(log): State<RequestLog>, req: Request, next: Next) -> Response {
    log.push(Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    next.run(req).await
}

pub struct MockServer {
    pub base_url: String,
    pub log: RequestLog,
}

impl MockServer {
    pub async fn start(router: Router) -> Self {
        let log = RequestLog::default();
        let app = router.layer(middleware::from_fn_with_state(log.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/", addr),
            log,
        }
    }

    pub fn client(&self, session: SessionStore) -> ApiClient {
        ApiClient::with_http(
            reqwest::Client::new(),
            &self.base_url,
            session,
            PaginationConfig::default(),
        )
        .unwrap()
    }

    /// Client whose session already holds `token` for `username`.
    pub fn logged_in_client(&self, token: &str, username: &str) -> ApiClient {
        let session = SessionStore::in_memory();
        session.login(token, Some(username)).unwrap();
        self.client(session)
    }
}

pub fn post_json(id: &str, text: &str, like_count: u64, is_liked: bool) -> Value {
    json!({
        "_id": id,
        "user_id": 1,
        "username": "alice",
        "content": { "text": text, "media": [] },
        "comments": [],
        "likes": [],
        "like_count": like_count,
        "is_liked": is_liked,
        "created_at": "2024-05-10T12:00:00Z",
    })
}
