//! Minimal stand-in for the hosted table and auth APIs.

use animedash::config::BackendConfig;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const USER_ID: &str = "3f1f6a0e-8c1b-4c7a-9a51-6d0f2f9b7c11";
pub const ANIME_ID: &str = "0b6f2b36-1d5e-4b8e-8f0c-2a4b6c8d0e12";
pub const PASSWORD: &str = "hunter22";
pub const ACCESS_TOKEN: &str = "access-1";
pub const ANON_KEY: &str = "anon-key";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct Shared {
    requests: Arc<Mutex<Vec<Recorded>>>,
    refresh_works: bool,
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        Self::spawn_with(true).await
    }

    pub async fn spawn_with(refresh_works: bool) -> Self {
        let shared = Shared {
            requests: Arc::default(),
            refresh_works,
        };
        let requests = shared.requests.clone();
        let app = Router::new().fallback(handle).with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            url: format!("http://{}/", self.addr),
            anon_key: ANON_KEY.to_string(),
            request_timeout_seconds: 5,
            ..BackendConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

fn stamp() -> &'static str {
    "2024-05-01T12:00:00+00:00"
}

fn session_json() -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": USER_ID, "email": "mai@example.com" }
    })
}

fn catalog_json() -> Value {
    let episode = |id: &str, number: i32, links: Value| {
        json!({
            "id": id,
            "anime_id": ANIME_ID,
            "episode_number": number,
            "title": format!("Episode {number}"),
            "duration": "24:00",
            "created_at": stamp(),
            "updated_at": stamp(),
            "episode_links": links,
        })
    };

    json!([{
        "id": ANIME_ID,
        "title": "Frieren",
        "description": "An elf mage outlives her party.",
        "synopsis": null,
        "release_year": 2023,
        "episode_count": 2,
        "rating": 9.1,
        "status": "completed",
        "created_at": stamp(),
        "updated_at": stamp(),
        "added_by": USER_ID,
        "is_archived": false,
        "genres": ["Fantasy", "Adventure"],
        "episodes": [
            episode("9a1c7e52-52c6-4c0e-9a57-0e5f8f1a2b02", 2, json!([{
                "id": "c2d4e6f8-1a3b-4c5d-8e7f-9a0b1c2d3e4f",
                "episode_id": "9a1c7e52-52c6-4c0e-9a57-0e5f8f1a2b02",
                "platform": "WatchDT",
                "url": "https://watch.example/2",
                "quality": "1080p",
                "created_at": stamp(),
                "updated_at": stamp(),
                "subtitles": [{
                    "id": "d1e2f3a4-b5c6-4d7e-8f90-a1b2c3d4e5f6",
                    "link_id": "c2d4e6f8-1a3b-4c5d-8e7f-9a0b1c2d3e4f",
                    "language": "English",
                    "url": "https://subs.example/2.vtt",
                    "created_at": stamp(),
                    "updated_at": stamp()
                }]
            }])),
            episode("9a1c7e52-52c6-4c0e-9a57-0e5f8f1a2b01", 1, Value::Null),
        ]
    }])
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query: HashMap<String, String> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = String::from_utf8_lossy(&body).to_string();

    shared.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: query.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        return error(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "No API key found in request" }),
        );
    }

    let bearer = format!("Bearer {ACCESS_TOKEN}");
    let signed_in = authorization.as_deref() == Some(bearer.as_str());

    match (method.as_str(), uri.path()) {
        ("GET", "/rest/v1/anime") => axum::Json(catalog_json()).into_response(),
        ("PATCH", "/rest/v1/anime") => axum::Json(json!([])).into_response(),
        ("DELETE", "/rest/v1/anime") => StatusCode::NO_CONTENT.into_response(),
        ("POST", "/rest/v1/episodes") => error(
            StatusCode::CONFLICT,
            json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"episodes_anime_id_episode_number_key\""
            }),
        ),
        ("GET", "/rest/v1/profiles") if signed_in => axum::Json(json!({
            "id": USER_ID,
            "email": "mai@example.com",
            "name": "Mai",
            "created_at": stamp(),
        }))
        .into_response(),
        ("GET", "/rest/v1/profiles") => error(
            StatusCode::NOT_ACCEPTABLE,
            json!({ "message": "JSON object requested, multiple (or no) rows returned" }),
        ),
        ("POST", "/auth/v1/token") => {
            let grant = query.get("grant_type").map(String::as_str);
            let payload: Value = serde_json::from_str(&body).unwrap_or_default();
            match grant {
                Some("password") if payload["password"] == PASSWORD => {
                    axum::Json(session_json()).into_response()
                }
                Some("refresh_token") if shared.refresh_works => {
                    axum::Json(session_json()).into_response()
                }
                Some("refresh_token") => error(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "invalid_grant", "error_description": "Invalid Refresh Token: Already Used" }),
                ),
                _ => error(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
                ),
            }
        }
        ("POST", "/auth/v1/signup") => axum::Json(json!({
            "id": USER_ID,
            "email": "mai@example.com",
            "user_metadata": serde_json::from_str::<Value>(&body).unwrap_or_default()["data"].clone(),
        }))
        .into_response(),
        ("POST", "/auth/v1/logout") => StatusCode::NO_CONTENT.into_response(),
        ("POST", "/auth/v1/recover") => axum::Json(json!({})).into_response(),
        _ => error(StatusCode::NOT_FOUND, json!({ "message": "not found" })),
    }
}
