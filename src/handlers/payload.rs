//! RPC payload assembly: merges body JSON, path parameters, and query
//! parameters into a single JSON object, in that order of precedence.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::error::GatewayError;

const BODY_METHODS: [&str; 4] = ["POST", "PUT", "PATCH", "DELETE"];

/// Build the RPC payload for one request.
///
/// `raw_query` is the request's query string (without the leading `?`).
pub fn assemble_payload(
    http_method: &str,
    body: &[u8],
    path_params: &HashMap<String, String>,
    raw_query: &str,
) -> Result<Value, GatewayError> {
    let mut payload = if BODY_METHODS.contains(&http_method.to_uppercase().as_str()) {
        parse_body(body)?
    } else {
        Value::Object(Map::new())
    };

    for (key, value) in path_params {
        let path: Vec<&str> = key.split('.').collect();
        set_path(&mut payload, &path, Value::String(value.clone()));
    }

    apply_query_params(&mut payload, raw_query);

    Ok(payload)
}

fn parse_body(body: &[u8]) -> Result<Value, GatewayError> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|err| GatewayError::PayloadParse(err.to_string()))
}

/// `name[subkey]=value` is rewritten to field path `name.subkey`; every
/// other key is used as-is. Each distinct field path accumulates its values
/// in arrival order into a JSON array, and is only written if body/path
/// params didn't already claim that path.
fn apply_query_params(payload: &mut Value, raw_query: &str) {
    let mut ordered_keys: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();

    for pair in raw_query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = urlencoding_decode(raw_key);
        let value = urlencoding_decode(raw_value);
        let field_path = rewrite_bracket_key(&key);

        if !grouped.contains_key(&field_path) {
            ordered_keys.push(field_path.clone());
        }
        grouped.entry(field_path).or_default().push(value);
    }

    for field_path in ordered_keys {
        let path: Vec<&str> = field_path.split('.').collect();
        if get_path(payload, &path).is_some() {
            continue;
        }
        let values = grouped.remove(&field_path).unwrap_or_default();
        let array = Value::Array(values.into_iter().map(Value::String).collect());
        set_path(payload, &path, array);
    }
}

/// Rewrites `name[subkey]` into `name.subkey`; leaves any other key alone.
fn rewrite_bracket_key(key: &str) -> String {
    if let Some(open) = key.find('[') {
        if let Some(stripped) = key.strip_suffix(']') {
            if stripped.len() > open {
                let name = &stripped[..open];
                let subkey = &stripped[open + 1..];
                return format!("{}.{}", name, subkey);
            }
        }
    }
    key.to_string()
}

fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in path {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

fn set_path(value: &mut Value, path: &[&str], new_value: Value) {
    let Some((last, rest)) = path.split_last() else {
        return;
    };

    let mut current = value;
    for segment in rest {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let map = current.as_object_mut().unwrap();
        current = map.entry(segment.to_string()).or_insert(Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    current
        .as_object_mut()
        .unwrap()
        .insert(last.to_string(), new_value);
}

/// Minimal percent-decoding; query strings here are ASCII-dominated HTTP
/// parameters, not full URIs.
fn urlencoding_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '+' => out.push(' '),
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    out.push(byte as char);
                } else {
                    out.push('%');
                    out.push_str(&hex);
                }
            }
            other => out.push(other),
        }
    }
    out
}
