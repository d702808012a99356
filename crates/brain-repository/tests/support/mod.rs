//! In-memory stand-in for a PostgREST backend.
//!
//! Supports what the brain repository sends: `*`, `alias:column`, embedded
//! `alias: table(*)` and `alias:table(count)` joined on `brain_id`, `eq`/`neq`
//! filters, `now()` in updates, and the `delete_secret` procedure.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use postgrest_client::{Action, Filter, Operator, PostgrestError, QueryExecutor, Request, RpcCall};
use serde_json::{json, Map, Value};
use uuid::Uuid;

type Row = Map<String, Value>;

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    vault: Vec<String>,
    rpc_calls: Vec<RpcCall>,
    clock: u64,
}

impl State {
    fn now(&mut self) -> String {
        self.clock += 1;
        format!(
            "2030-01-01T00:{:02}:{:02}+00:00",
            (self.clock / 60) % 60,
            self.clock % 60
        )
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing defaults.
    pub fn seed(&self, table: &str, row: Value) {
        let row = match row {
            Value::Object(map) => map,
            other => panic!("seed row must be an object, got {other}"),
        };
        let mut state = self.state.lock().unwrap();
        state.tables.entry(table.to_string()).or_default().push(row);
    }

    /// Store a secret under its vault name.
    pub fn add_secret(&self, name: impl Into<String>) {
        self.state.lock().unwrap().vault.push(name.into());
    }

    pub fn has_secret(&self, name: &str) -> bool {
        self.state.lock().unwrap().vault.iter().any(|s| s == name)
    }

    pub fn rpc_calls(&self) -> Vec<RpcCall> {
        self.state.lock().unwrap().rpc_calls.clone()
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueryExecutor for MemoryBackend {
    async fn execute(&self, request: Request) -> Result<Value, PostgrestError> {
        let mut state = self.state.lock().unwrap();
        match request {
            Request::Table(query) => {
                for filter in &query.filters {
                    if !matches!(filter.operator, Operator::Eq | Operator::Neq) {
                        return Err(bad_request(format!(
                            "unsupported operator {}",
                            filter.operator
                        )));
                    }
                }

                match query.action {
                    Action::Select { columns } => {
                        let rows = state.tables.get(&query.table).cloned().unwrap_or_default();
                        let projected = rows
                            .iter()
                            .filter(|row| matches_all(row, &query.filters))
                            .map(|row| project(&columns, row, &state.tables))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Value::Array(projected))
                    }
                    Action::Insert { values } => {
                        let records = match values {
                            Value::Array(items) => items,
                            other => vec![other],
                        };
                        let mut inserted = Vec::new();
                        for record in records {
                            let Value::Object(mut row) = record else {
                                return Err(bad_request("insert body must be an object"));
                            };
                            if query.table == "brains" {
                                apply_brain_defaults(&mut row, &mut state);
                            }
                            inserted.push(Value::Object(row.clone()));
                            state.tables.entry(query.table.clone()).or_default().push(row);
                        }
                        Ok(Value::Array(inserted))
                    }
                    Action::Update { values } => {
                        let Value::Object(patch) = values else {
                            return Err(bad_request("update body must be an object"));
                        };
                        let now = state.now();
                        let mut updated = Vec::new();
                        if let Some(rows) = state.tables.get_mut(&query.table) {
                            for row in rows.iter_mut().filter(|r| matches_all(r, &query.filters)) {
                                for (key, value) in &patch {
                                    let value = if value == "now()" {
                                        Value::String(now.clone())
                                    } else {
                                        value.clone()
                                    };
                                    row.insert(key.clone(), value);
                                }
                                updated.push(Value::Object(row.clone()));
                            }
                        }
                        Ok(Value::Array(updated))
                    }
                    Action::Delete => {
                        let mut removed = Vec::new();
                        if let Some(rows) = state.tables.get_mut(&query.table) {
                            rows.retain(|row| {
                                if matches_all(row, &query.filters) {
                                    removed.push(Value::Object(row.clone()));
                                    false
                                } else {
                                    true
                                }
                            });
                        }
                        Ok(Value::Array(removed))
                    }
                }
            }
            Request::Rpc(call) => {
                state.rpc_calls.push(call.clone());
                match call.function.as_str() {
                    "delete_secret" => {
                        let name = call
                            .args
                            .get("secret_name")
                            .and_then(Value::as_str)
                            .ok_or_else(|| bad_request("missing secret_name"))?
                            .to_string();
                        let before = state.vault.len();
                        state.vault.retain(|s| s != &name);
                        Ok(Value::Bool(state.vault.len() < before))
                    }
                    other => Err(PostgrestError::Api {
                        status: 404,
                        code: Some("PGRST202".to_string()),
                        message: format!("Could not find the function {other}"),
                        details: None,
                        hint: None,
                    }),
                }
            }
        }
    }
}

fn bad_request(message: impl Into<String>) -> PostgrestError {
    PostgrestError::Api {
        status: 400,
        code: Some("PGRST100".to_string()),
        message: message.into(),
        details: None,
        hint: None,
    }
}

fn apply_brain_defaults(row: &mut Row, state: &mut State) {
    row.entry("brain_id")
        .or_insert_with(|| json!(Uuid::new_v4()));
    row.entry("status").or_insert_with(|| json!("private"));
    row.entry("brain_type").or_insert_with(|| json!("doc"));
    if !row.contains_key("last_update") {
        let now = state.now();
        row.insert("last_update".to_string(), json!(now));
    }
}

fn as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let equal = as_text(row.get(&filter.column)) == filter.value;
        match filter.operator {
            Operator::Neq => !equal,
            _ => equal,
        }
    })
}

/// Split a projection on commas that are not inside parentheses.
fn split_columns(columns: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in columns.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(columns[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(columns[start..].trim());
    items.into_iter().filter(|item| !item.is_empty()).collect()
}

fn project(
    columns: &str,
    row: &Row,
    tables: &HashMap<String, Vec<Row>>,
) -> Result<Value, PostgrestError> {
    let mut out = Row::new();
    for item in split_columns(columns) {
        if item == "*" {
            for (key, value) in row {
                out.entry(key.clone()).or_insert_with(|| value.clone());
            }
            continue;
        }

        if let Some(open) = item.find('(') {
            let head = &item[..open];
            let inner = item[open + 1..].trim_end_matches(')').trim();
            let (alias, table) = match head.split_once(':') {
                Some((alias, table)) => (alias.trim(), table.trim()),
                None => (head.trim(), head.trim()),
            };

            let parent_id = as_text(row.get("brain_id"));
            let related: Vec<&Row> = tables
                .get(table)
                .map(|rows| {
                    rows.iter()
                        .filter(|r| as_text(r.get("brain_id")) == parent_id)
                        .collect()
                })
                .unwrap_or_default();

            let embedded = match inner {
                "*" => Value::Array(related.into_iter().cloned().map(Value::Object).collect()),
                "count" => json!([{ "count": related.len() }]),
                other => return Err(bad_request(format!("unsupported embed {other}"))),
            };
            out.insert(alias.to_string(), embedded);
            continue;
        }

        let (alias, column) = match item.split_once(':') {
            Some((alias, column)) => (alias.trim(), column.trim()),
            None => (item, item),
        };
        out.insert(
            alias.to_string(),
            row.get(column).cloned().unwrap_or(Value::Null),
        );
    }
    Ok(Value::Object(out))
}
