use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const GOOD_TOKEN: &str = "good-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct BackendData {
    pub entries: Vec<Value>,
    pub next_id: i64,
    pub requests: Vec<RecordedRequest>,
    pub fail_lists: bool,
    pub fail_mutations: bool,
    // Reply to create/update with an acknowledgement instead of the entry.
    pub ack_mutations: bool,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    data: Arc<Mutex<BackendData>>,
}

impl MockBackend {
    pub fn with_entries(count: usize) -> Self {
        let backend = Self::default();
        {
            let mut data = backend.lock();
            for index in 0..count {
                let id = index as i64 + 1;
                data.entries.push(entry_json(id, &format!("Movie {id}"), "Movie", "2001"));
                data.next_id = id;
            }
        }
        backend
    }

    pub fn lock(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().expect("mock backend lock must not be poisoned")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    pub async fn spawn(self) -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/api/favorites", get(list_favorites).post(create_favorite))
            .route(
                "/api/favorites/{id}",
                put(update_favorite).delete(delete_favorite),
            )
            .route("/api/auth/validate", get(validate))
            .route("/api/auth/signup", post(issue_token))
            .route("/api/auth/login", post(issue_token))
            .with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}"), join_handle)
    }

    fn record(&self, method: &Method, uri: &Uri, query: HashMap<String, String>) {
        self.lock().requests.push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
        });
    }
}

pub fn entry_json(id: i64, title: &str, kind: &str, year: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "type": kind,
        "director": "Test Director",
        "budget": "$1M",
        "location": "Test City",
        "duration": "100 min",
        "year": year,
        "posterUrl": null,
        "createdAt": "2026-02-24T10:00:00Z"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {GOOD_TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid token" }))).into_response()
}

async fn list_favorites(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.record(&method, &uri, params.clone());
    if !authorized(&headers) {
        return unauthorized();
    }
    let data = backend.lock();
    if data.fail_lists {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
    let matching: Vec<&Value> = data
        .entries
        .iter()
        .filter(|entry| params.get("type").map_or(true, |kind| entry["type"] == kind.as_str()))
        .filter(|entry| params.get("year").map_or(true, |year| entry["year"] == year.as_str()))
        .filter(|entry| {
            params.get("search").map_or(true, |needle| {
                entry["title"]
                    .as_str()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
        })
        .collect();
    let start = (page.saturating_sub(1) * limit).min(matching.len());
    let end = (start + limit).min(matching.len());
    let slice: Vec<Value> = matching[start..end].iter().map(|entry| (*entry).clone()).collect();

    Json(json!({ "data": slice, "hasMore": end < matching.len() })).into_response()
}

async fn create_favorite(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record(&method, &uri, HashMap::new());
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = backend.lock();
    if data.fail_mutations {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    data.next_id += 1;
    let mut entry = body;
    entry["id"] = json!(data.next_id);
    entry["createdAt"] = json!("2026-02-24T10:00:00Z");
    data.entries.insert(0, entry.clone());
    if data.ack_mutations {
        return (StatusCode::CREATED, Json(json!({ "message": "Favorite created" })))
            .into_response();
    }
    (StatusCode::CREATED, Json(entry)).into_response()
}

async fn update_favorite(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    backend.record(&method, &uri, HashMap::new());
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = backend.lock();
    if data.fail_mutations {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let Some(existing) = data.entries.iter_mut().find(|entry| entry["id"] == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Favorite not found" })))
            .into_response();
    };
    let created_at = existing["createdAt"].clone();
    let mut entry = body;
    entry["id"] = json!(id);
    entry["createdAt"] = created_at;
    *existing = entry.clone();
    if data.ack_mutations {
        return Json(json!({ "message": "Favorite updated" })).into_response();
    }
    Json(entry).into_response()
}

async fn delete_favorite(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    backend.record(&method, &uri, HashMap::new());
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = backend.lock();
    if data.fail_mutations {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let before = data.entries.len();
    data.entries.retain(|entry| entry["id"] != id);
    if data.entries.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn validate(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    backend.record(&method, &uri, HashMap::new());
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "valid": true })).into_response()
}

async fn issue_token(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    backend.record(&method, &uri, HashMap::new());
    if body["password"] == "wrong-password" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })))
            .into_response();
    }
    Json(json!({
        "token": GOOD_TOKEN,
        "user": { "id": 1, "email": body["email"], "name": body["name"] }
    }))
    .into_response()
}
