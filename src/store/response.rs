//! Response normalization
//!
//! Table APIs and their client libraries report results in different
//! shapes. Every shape is funneled through [`normalize`], which either
//! yields rows or a classified [`StoreError`]. An error payload is never
//! treated as success, whatever shape carries it.

use super::{Row, StoreError};
use serde_json::Value;

/// A response exactly as a transport received it
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Status-code bearing response (raw HTTP)
    Status {
        status: u16,
        data: Option<Value>,
        error: Option<Value>,
    },
    /// `{data, error}` pair without a status code
    DataError {
        data: Option<Value>,
        error: Option<Value>,
    },
    /// A bare JSON value: rows, a single row, or an object that may hold
    /// `data` and `error` keys
    Plain(Value),
}

/// Turn any response shape into rows, or the failure it describes.
///
/// `context` names the operation (`"insert into topics"`) and is carried
/// into the error.
pub fn normalize(raw: RawResponse, context: &str) -> Result<Vec<Row>, StoreError> {
    match raw {
        RawResponse::Status { status, data, error } => {
            if status >= 400 {
                let message = error
                    .as_ref()
                    .filter(|e| is_truthy(e))
                    .or(data.as_ref())
                    .map(describe)
                    .unwrap_or_else(|| "no response body".to_string());
                return Err(StoreError::Status {
                    context: context.to_string(),
                    status,
                    message,
                });
            }
            if let Some(err) = error.filter(is_truthy) {
                return Err(payload_error(context, &err));
            }
            rows_from(data.unwrap_or(Value::Null), context)
        }
        RawResponse::DataError { data, error } => {
            if let Some(err) = error.filter(is_truthy) {
                return Err(payload_error(context, &err));
            }
            rows_from(data.unwrap_or(Value::Null), context)
        }
        RawResponse::Plain(Value::Object(mut obj)) => {
            if let Some(err) = obj.get("error").filter(|e| is_truthy(e)) {
                return Err(payload_error(context, err));
            }
            match obj.remove("data") {
                Some(data) => rows_from(data, context),
                None => {
                    obj.remove("error");
                    Ok(vec![obj])
                }
            }
        }
        RawResponse::Plain(other) => rows_from(other, context),
    }
}

/// Rows carried by a response body
fn rows_from(data: Value, context: &str) -> Result<Vec<Row>, StoreError> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Object(obj) => Ok(vec![obj]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(obj) => Ok(obj),
                other => Err(StoreError::Malformed {
                    context: context.to_string(),
                    message: format!("expected a row object, got {}", other),
                }),
            })
            .collect(),
        other => Err(StoreError::Malformed {
            context: context.to_string(),
            message: format!("expected rows, got {}", other),
        }),
    }
}

fn payload_error(context: &str, err: &Value) -> StoreError {
    StoreError::Payload {
        context: context.to_string(),
        message: describe(err),
    }
}

/// Human-readable form of an error value; prefers a `message` field
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get("message").and_then(Value::as_str) {
            Some(msg) => msg.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Empty strings, empty collections, `false`, `0` and `null` carry no error
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
