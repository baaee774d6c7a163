//! Translation between bus values and plain values.
//!
//! The bus properties convention wraps every value in a variant container,
//! and method bodies carry the bus library's own value model. Callers of
//! this crate see plain JSON values instead. All knowledge of the wrapping
//! convention lives here, so a change in the bus library's value model
//! stays contained in this module.

use serde_json::{json, Map};
use thiserror::Error;
use zbus::zvariant::{Structure, Value};

/// Errors from translating plain values into bus values.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("cannot express JSON {0} as a bus argument (scalars only)")]
    Unsupported(&'static str),
}

/// Strip any number of nested variant layers, returning the innermost
/// concrete value.
///
/// Property access returns values wrapped in a variant; some services
/// nest a variant inside that again. Callers always want the payload.
pub fn unwrap_variant<'a>(value: &'a Value<'a>) -> &'a Value<'a> {
    let mut value = value;
    while let Value::Value(inner) = value {
        value = inner;
    }
    value
}

/// Translate a bus value into a plain JSON value.
///
/// Total over the bus value model: integers and booleans map to their JSON
/// counterparts, strings, object paths and signatures to strings, arrays
/// and structs to JSON arrays, dictionaries to JSON objects. Nested
/// variants are unwrapped in place. Non-finite floats become `null`
/// (JSON has no representation for them), and file descriptors are
/// rendered as their debug string.
pub fn to_json(value: &Value<'_>) -> serde_json::Value {
    match value {
        Value::U8(v) => json!(v),
        Value::Bool(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::U16(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::U32(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::U64(v) => json!(v),
        Value::F64(v) => json!(v),
        Value::Str(v) => json!(v.as_str()),
        Value::Signature(v) => json!(v.to_string()),
        Value::ObjectPath(v) => json!(v.as_str()),
        Value::Value(inner) => to_json(inner),
        Value::Array(array) => {
            serde_json::Value::Array(array.iter().map(to_json).collect())
        }
        Value::Dict(dict) => {
            let mut map = Map::new();
            for (key, val) in dict.iter() {
                map.insert(json_key(key), to_json(val));
            }
            serde_json::Value::Object(map)
        }
        Value::Structure(fields) => {
            serde_json::Value::Array(fields.fields().iter().map(to_json).collect())
        }
        Value::Fd(fd) => json!(format!("{fd:?}")),
    }
}

/// Dictionary keys on the bus can be any basic type; JSON keys must be
/// strings. String keys pass through, the rest render via their JSON form.
fn json_key(key: &Value<'_>) -> String {
    match to_json(unwrap_variant(key)) {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Translate a plain JSON scalar into a bus value for a dynamic method
/// argument.
///
/// Deliberately limited to scalars: the bus needs a concrete element type
/// for containers, which untyped JSON cannot supply. Integers map to `i32`
/// when they fit and `i64` (or `u64`) otherwise; use the typed call API
/// when a method wants something else.
pub fn from_json(value: &serde_json::Value) -> Result<Value<'static>, ValueError> {
    match value {
        serde_json::Value::Bool(b) => Ok(Value::from(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if let Ok(small) = i32::try_from(i) {
                    Ok(Value::from(small))
                } else {
                    Ok(Value::from(i))
                }
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                // as_f64 is total for serde_json numbers.
                Ok(Value::from(n.as_f64().unwrap_or(0.0)))
            }
        }
        serde_json::Value::String(s) => Ok(Value::from(s.clone())),
        serde_json::Value::Null => Err(ValueError::Unsupported("null")),
        serde_json::Value::Array(_) => Err(ValueError::Unsupported("arrays")),
        serde_json::Value::Object(_) => Err(ValueError::Unsupported("objects")),
    }
}

/// Translate a reply body structure into a plain JSON value: no fields is
/// `null`, one field is that value, several fields become an array.
pub fn reply_to_json(body: &Structure<'_>) -> serde_json::Value {
    let fields = body.fields();
    match fields.len() {
        0 => serde_json::Value::Null,
        1 => to_json(unwrap_variant(&fields[0])),
        _ => serde_json::Value::Array(
            fields.iter().map(|f| to_json(unwrap_variant(f))).collect(),
        ),
    }
}
