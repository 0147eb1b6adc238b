//! Synthetic REST surface.
//!
//! The handlers behave like a tiny backend, routes and status codes
//! included, but run in-process against the fixture store. Every
//! mutating request persists the whole store before the response is
//! returned, so a reload within the same demo picks up where it left off.
//!
//! Surface, per entity `E` at `/api/<entities>`:
//! - `GET    /api/<entities>`          → 200, full flattened list
//! - `POST   /api/<entities>`          → 201, created flattened record
//! - `PATCH  /api/<entities>/:id`      → 200, updated flattened record
//! - `DELETE /api/<entities>/:id`      → 204, cascades applied first
//! - `PUT    /api/<entities>/:id/move` → 200, `[{id, order}]` for every row

mod handlers;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::db::reorder::Position;
use crate::db::{seed, Database, Row};
use crate::error::{BackofficeError, Result};
use crate::schema::EntityKind;
use crate::storage::{self, JsonStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    fn created(body: Value) -> Self {
        Self {
            status: 201,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn error(status: u16, message: String) -> Self {
        Self {
            status,
            body: Some(json!({ "error": message })),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The mock backend: fixture store plus persistence bridge.
pub struct ApiServer {
    db: Database,
    store: JsonStore,
}

impl ApiServer {
    /// Load persisted state, or seed the demo data when there is none
    /// (first run, or a discarded corrupt state file).
    pub fn new(store: JsonStore) -> Result<Self> {
        let mut db = Database::new();
        match store.load() {
            Some(dump) => {
                info!("loading state from {}", store.backoffice_dir().display());
                storage::restore(&mut db, &dump);
            }
            None => {
                info!("seeding demo data");
                db = seed::demo_database()?;
                store.save(&db)?;
            }
        }
        Ok(Self { db, store })
    }

    /// Route a request, run the handler, persist after mutations and map
    /// errors onto status codes.
    pub fn dispatch(&mut self, request: &ApiRequest) -> ApiResponse {
        debug!(method = %request.method, path = %request.path, "dispatch");
        match self.route(request) {
            Ok(response) => response,
            Err(BackofficeError::RowNotFound(kind, id)) => {
                ApiResponse::error(404, format!("{} not found: {}", kind, id))
            }
            Err(BackofficeError::RouteNotFound(path)) => {
                ApiResponse::error(404, format!("No route matches: {}", path))
            }
            Err(BackofficeError::UnknownEntity(name)) => {
                ApiResponse::error(404, format!("Unknown entity: {}", name))
            }
            Err(BackofficeError::InvalidPayload(message)) => ApiResponse::error(400, message),
            Err(err) => ApiResponse::error(500, err.to_string()),
        }
    }

    fn route(&mut self, request: &ApiRequest) -> Result<ApiResponse> {
        let rest = request
            .path
            .strip_prefix("/api/")
            .ok_or_else(|| BackofficeError::RouteNotFound(request.path.clone()))?;
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        let kind = segments
            .first()
            .and_then(|s| EntityKind::from_api_segment(s))
            .ok_or_else(|| {
                BackofficeError::UnknownEntity(segments.first().unwrap_or(&"").to_string())
            })?;

        match (request.method, segments.as_slice()) {
            (Method::Get, [_]) => Ok(ApiResponse::ok(handlers::list(&self.db, kind))),
            (Method::Post, [_]) => {
                let input = body_object(request)?;
                let created = handlers::create(&mut self.db, kind, &input);
                self.store.save(&self.db)?;
                Ok(ApiResponse::created(Value::Object(created)))
            }
            (Method::Patch, [_, id]) => {
                let id = parse_id(id)?;
                let input = body_object(request)?;
                let updated = handlers::update(&mut self.db, kind, id, &input)?;
                self.store.save(&self.db)?;
                Ok(ApiResponse::ok(Value::Object(updated)))
            }
            (Method::Delete, [_, id]) => {
                let id = parse_id(id)?;
                handlers::delete(&mut self.db, kind, id)?;
                self.store.save(&self.db)?;
                Ok(ApiResponse::no_content())
            }
            (Method::Put, [_, id, "move"]) => {
                let id = parse_id(id)?;
                let (target_id, position) = parse_move_body(request)?;
                let patches = handlers::move_row(&mut self.db, kind, id, target_id, position)?;
                self.store.save(&self.db)?;
                Ok(ApiResponse::ok(serde_json::to_value(patches)?))
            }
            _ => Err(BackofficeError::RouteNotFound(format!(
                "{} {}",
                request.method, request.path
            ))),
        }
    }
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| BackofficeError::InvalidPayload(format!("Invalid id: {}", raw)))
}

fn body_object(request: &ApiRequest) -> Result<Row> {
    match &request.body {
        Some(Value::Object(map)) => Ok(map.clone()),
        _ => Err(BackofficeError::InvalidPayload(
            "expected a JSON object body".to_string(),
        )),
    }
}

/// Move body: `{ "target": <row>, "position": "above" | "below" }`.
fn parse_move_body(request: &ApiRequest) -> Result<(u64, Position)> {
    let body = body_object(request)?;

    let target_id = body
        .get("target")
        .and_then(|t| t.get("id"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            BackofficeError::InvalidPayload("move body needs target.id".to_string())
        })?;

    let position = body
        .get("position")
        .cloned()
        .map(serde_json::from_value::<Position>)
        .transpose()?
        .ok_or_else(|| {
            BackofficeError::InvalidPayload("move body needs position above|below".to_string())
        })?;

    Ok((target_id, position))
}
