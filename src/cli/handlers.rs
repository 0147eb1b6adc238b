use std::env;
use std::path::PathBuf;

use serde_json::Value;

use crate::api::{ApiRequest, ApiResponse, ApiServer};
use crate::error::{BackofficeError, Result};
use crate::schema::EntityKind;
use crate::storage::JsonStore;

/// Find the project root by looking for .backoffice/ or .git/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(".backoffice").exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_server() -> Result<ApiServer> {
    let root = find_project_root();
    let store = JsonStore::open(&root)?;
    ApiServer::new(store)
}

fn parse_entity(raw: &str) -> Result<EntityKind> {
    raw.parse()
        .map_err(|_| BackofficeError::UnknownEntity(raw.to_string()))
}

fn parse_record(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(BackofficeError::InvalidPayload(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Turn a non-2xx response into an error carrying the server's message.
fn into_body(response: ApiResponse) -> Result<Option<Value>> {
    if response.is_success() {
        return Ok(response.body);
    }
    let message = response
        .body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .map_or_else(|| format!("status {}", response.status), str::to_string);
    Err(BackofficeError::Request(message))
}

/// Something human-readable to print for a row.
fn row_label(row: &Value) -> String {
    for field in ["name", "title", "content", "due_date"] {
        if let Some(text) = row.get(field).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    String::from("-")
}

fn print_row(kind: EntityKind, row: &Value) {
    let id = row.get("id").and_then(Value::as_u64).unwrap_or(0);
    let order = row.get("order").and_then(Value::as_u64).unwrap_or(0);
    println!("{:>3}. {} {} - {}", order, kind, id, row_label(row));
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let store = JsonStore::init(&root)?;
    let _server = ApiServer::new(store)?;

    println!(
        "Initialized backoffice project in {} (seeded demo data)",
        root.display()
    );
    Ok(())
}

pub fn handle_reset() -> Result<()> {
    let root = find_project_root();
    let store = JsonStore::open(&root)?;
    store.reset()?;

    // Rebuilding the server reseeds and persists the demo data.
    let _server = ApiServer::new(store)?;

    println!("Demo data reset.");
    Ok(())
}

pub fn handle_list(entity: String, json: bool) -> Result<()> {
    let kind = parse_entity(&entity)?;
    let mut server = open_server()?;

    let response = server.dispatch(&ApiRequest::get(format!("/api/{}", kind.api_segment())));
    let body = into_body(response)?.unwrap_or(Value::Array(Vec::new()));

    if json {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let mut rows: Vec<&Value> = body.as_array().map(|a| a.iter().collect()).unwrap_or_default();
    rows.sort_by_key(|r| r.get("order").and_then(Value::as_u64).unwrap_or(0));
    for row in rows {
        print_row(kind, row);
    }
    Ok(())
}

pub fn handle_add(entity: String, data: String, json: bool) -> Result<()> {
    let kind = parse_entity(&entity)?;
    let record = parse_record(&data)?;
    let mut server = open_server()?;

    let response = server.dispatch(&ApiRequest::post(
        format!("/api/{}", kind.api_segment()),
        record,
    ));
    let created = into_body(response)?.unwrap_or(Value::Null);

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        let id = created.get("id").and_then(Value::as_u64).unwrap_or(0);
        println!("Created {} {} - {}", kind, id, row_label(&created));
    }
    Ok(())
}

pub fn handle_update(entity: String, id: u64, data: String, json: bool) -> Result<()> {
    let kind = parse_entity(&entity)?;
    let record = parse_record(&data)?;
    let mut server = open_server()?;

    let response = server.dispatch(&ApiRequest::patch(
        format!("/api/{}/{}", kind.api_segment(), id),
        record,
    ));
    let updated = into_body(response)?.unwrap_or(Value::Null);

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!("Updated {} {} - {}", kind, id, row_label(&updated));
    }
    Ok(())
}

pub fn handle_delete(entity: String, id: u64) -> Result<()> {
    let kind = parse_entity(&entity)?;
    let mut server = open_server()?;

    let response = server.dispatch(&ApiRequest::delete(format!(
        "/api/{}/{}",
        kind.api_segment(),
        id
    )));
    into_body(response)?;

    println!("Deleted {} {}", kind, id);
    Ok(())
}

pub fn handle_move(entity: String, id: u64, target: u64, position: String) -> Result<()> {
    let kind = parse_entity(&entity)?;
    let position: crate::db::reorder::Position = position
        .parse()
        .map_err(BackofficeError::InvalidPayload)?;
    let mut server = open_server()?;

    let response = server.dispatch(&ApiRequest::put(
        format!("/api/{}/{}/move", kind.api_segment(), id),
        serde_json::json!({ "target": { "id": target }, "position": position }),
    ));
    let patches = into_body(response)?.unwrap_or(Value::Array(Vec::new()));

    let mut ids: Vec<(u64, u64)> = patches
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|p| {
                    Some((
                        p.get("order").and_then(Value::as_u64)?,
                        p.get("id").and_then(Value::as_u64)?,
                    ))
                })
                .collect()
        })
        .unwrap_or_default();
    ids.sort_unstable();

    let sequence: Vec<String> = ids.iter().map(|(_, id)| id.to_string()).collect();
    println!("New {} order: {}", kind, sequence.join(", "));
    Ok(())
}
