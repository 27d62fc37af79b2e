//! In-process transport
//!
//! Keeps tables in memory with server-style generated ids. Used by tests
//! and by `--memory` runs that have no remote store. Faults can be injected
//! per table, and insert responses can be made to omit rows.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::cmp::Ordering;
use async_trait::async_trait;
use serde_json::{json, Value};
use super::{columns, RawResponse, Row, SelectQuery, Table, Transport, TransportResult};

/// Which response shape the transport answers in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    #[default]
    Status,
    DataError,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Insert,
    Select,
}

/// One recorded operation
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub kind: CallKind,
    pub table: Table,
    pub rows: usize,
    pub query: Option<SelectQuery>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Row>>,
    next_ids: HashMap<Table, i64>,
    calls: Vec<StoreCall>,
    failing_inserts: HashSet<Table>,
    failing_selects: HashSet<Table>,
    omitted_titles: HashSet<String>,
    discarded_titles: HashSet<String>,
}

/// Table store held in process memory
#[derive(Default)]
pub struct MemoryTransport {
    shape: ResponseShape,
    state: Mutex<MemoryState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer in a specific response shape
    pub fn with_shape(mut self, shape: ResponseShape) -> Self {
        self.shape = shape;
        self
    }

    /// Make every insert into `table` report an error
    pub fn fail_inserts(&self, table: Table) {
        self.state().failing_inserts.insert(table);
    }

    /// Make every select on `table` report an error
    pub fn fail_selects(&self, table: Table) {
        self.state().failing_selects.insert(table);
    }

    /// Store topics with this title but leave them out of the insert response
    pub fn omit_from_response(&self, title: &str) {
        self.state().omitted_titles.insert(title.to_string());
    }

    /// Acknowledge topics with this title without storing or returning them
    pub fn discard_on_insert(&self, title: &str) {
        self.state().discarded_titles.insert(title.to_string());
    }

    /// Snapshot of a table, in insertion order
    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.state().tables.get(&table).cloned().unwrap_or_default()
    }

    /// Every operation performed so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(&self, rows: Vec<Row>) -> RawResponse {
        let data = Value::Array(rows.into_iter().map(Value::Object).collect());
        match self.shape {
            ResponseShape::Status => RawResponse::Status { status: 200, data: Some(data), error: None },
            ResponseShape::DataError => RawResponse::DataError { data: Some(data), error: None },
            ResponseShape::Plain => RawResponse::Plain(data),
        }
    }

    fn fail(&self, table: Table) -> RawResponse {
        let error = json!({ "message": format!("injected failure on {}", table) });
        match self.shape {
            ResponseShape::Status => RawResponse::Status { status: 500, data: None, error: Some(error) },
            ResponseShape::DataError => RawResponse::DataError { data: None, error: Some(error) },
            ResponseShape::Plain => RawResponse::Plain(json!({ "error": error })),
        }
    }
}

/// Ascending order; numbers numerically, strings lexically, missing first
fn compare_column(a: &Row, b: &Row, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn insert(&self, table: Table, rows: &[Row]) -> TransportResult {
        let mut state = self.state();
        state.calls.push(StoreCall {
            kind: CallKind::Insert,
            table,
            rows: rows.len(),
            query: None,
        });

        if state.failing_inserts.contains(&table) {
            return Ok(self.fail(table));
        }

        let mut echoed = Vec::with_capacity(rows.len());
        for row in rows {
            let title = row.get(columns::TITLE).and_then(Value::as_str).map(str::to_string);
            if let Some(title) = &title {
                if state.discarded_titles.contains(title) {
                    continue;
                }
            }

            let next_id = state.next_ids.entry(table).or_insert(1);
            let id = *next_id;
            *next_id += 1;

            let mut stored = row.clone();
            stored.insert(columns::ID.to_string(), json!(id));
            state.tables.entry(table).or_default().push(stored.clone());

            let omitted = title.is_some_and(|t| state.omitted_titles.contains(&t));
            if !omitted {
                echoed.push(stored);
            }
        }

        Ok(self.respond(echoed))
    }

    async fn select(&self, table: Table, query: &SelectQuery) -> TransportResult {
        let mut state = self.state();
        state.calls.push(StoreCall {
            kind: CallKind::Select,
            table,
            rows: 0,
            query: Some(query.clone()),
        });

        if state.failing_selects.contains(&table) {
            return Ok(self.fail(table));
        }

        let mut rows: Vec<Row> = state
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(column) = &query.order_by {
            rows.sort_by(|a, b| compare_column(a, b, column));
        }

        Ok(self.respond(rows))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
