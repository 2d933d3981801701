//! Input parsing and output rendering
//!
//! Inputs are CSV (`1,2,3`) or JSON (`[1, 2, 3]`). A CSV input with a
//! single field is a scalar. Sequences become `Vec<i64>` when every item
//! is an integer, `Vec<f64>` when every item is a number, and
//! `Vec<String>` otherwise.

use crate::error::{PlanError, Result};
use ferry_pipeline::Value;
use serde_json::Value as Json;

/// Parse an input given on the command line or in a plan
///
/// # Errors
/// Returns an error for malformed JSON or JSON shapes with no
/// corresponding carried type
pub fn parse_input(input: &str) -> Result<Value> {
    let trimmed = input.trim();
    if trimmed.starts_with(['[', '{', '"']) {
        return from_json(serde_json::from_str(trimmed)?);
    }
    if trimmed.is_empty() {
        return Ok(Value::new(Vec::<i64>::new()));
    }

    let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if let [single] = fields.as_slice() {
        return Ok(parse_literal(single));
    }

    if let Some(ints) = parse_all::<i64>(&fields) {
        return Ok(Value::new(ints));
    }
    if let Some(floats) = parse_all::<f64>(&fields) {
        return Ok(Value::new(floats));
    }
    Ok(Value::new(
        fields.into_iter().map(String::from).collect::<Vec<_>>(),
    ))
}

/// Parse one scalar: `i64`, then `f64`, otherwise the text itself
#[must_use]
pub fn parse_literal(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::new(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        return Value::new(float);
    }
    Value::new(trimmed.to_string())
}

fn parse_all<T: std::str::FromStr>(fields: &[&str]) -> Option<Vec<T>> {
    fields.iter().map(|f| f.parse().ok()).collect()
}

fn from_json(json: Json) -> Result<Value> {
    match json {
        Json::Bool(b) => Ok(Value::new(b)),
        Json::Number(n) => match n.as_i64() {
            Some(int) => Ok(Value::new(int)),
            None => n
                .as_f64()
                .map(Value::new)
                .ok_or_else(|| PlanError::UnsupportedInput(n.to_string())),
        },
        Json::String(s) => Ok(Value::new(s)),
        Json::Array(items) => from_json_array(&items),
        Json::Null => Err(PlanError::UnsupportedInput("null".to_string())),
        Json::Object(_) => Err(PlanError::UnsupportedInput("object".to_string())),
    }
}

fn from_json_array(items: &[Json]) -> Result<Value> {
    if let Some(ints) = items.iter().map(Json::as_i64).collect::<Option<Vec<_>>>() {
        return Ok(Value::new(ints));
    }
    if let Some(floats) = items.iter().map(Json::as_f64).collect::<Option<Vec<_>>>() {
        return Ok(Value::new(floats));
    }
    if let Some(strings) = items
        .iter()
        .map(|item| item.as_str().map(String::from))
        .collect::<Option<Vec<_>>>()
    {
        return Ok(Value::new(strings));
    }
    if let Some(bools) = items.iter().map(Json::as_bool).collect::<Option<Vec<_>>>() {
        return Ok(Value::new(bools));
    }
    Err(PlanError::UnsupportedInput("mixed array".to_string()))
}

macro_rules! render_as {
    ($value:expr; $($ty:ty),+ $(,)?) => {
        $(
            if let Some(v) = $value.downcast_ref::<$ty>() {
                return Ok(serde_json::to_value(v)?);
            }
        )+
    };
}

/// Convert a result value to JSON
///
/// # Errors
/// Returns `Unrenderable` for types the CLI does not produce
pub fn render_json(value: &Value) -> Result<Json> {
    render_as!(value;
        i64, f64, bool, String, usize,
        Vec<i64>, Vec<f64>, Vec<bool>, Vec<String>, Vec<usize>,
    );
    Err(PlanError::Unrenderable(value.type_tag()))
}

/// Render a result value as plain text
///
/// Scalars print bare; sequences print comma-separated.
///
/// # Errors
/// See [`render_json`]
pub fn render_plain(value: &Value) -> Result<String> {
    Ok(match render_json(value)? {
        Json::String(s) => s,
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    })
}
