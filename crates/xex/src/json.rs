//! Conversion between `serde_json` documents and [`Value`]s.

use crate::error::JsonError;
use crate::value::{MapEntry, Value, Values};
use serde_json::{Map, Number, Value as Json};

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| MapEntry::new(k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Values {
    /// Binds every top-level key of a JSON object.
    pub fn from_json(json: Json) -> Result<Self, JsonError> {
        match json {
            Json::Object(fields) => Ok(fields
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()),
            other => Err(JsonError::NotAnObject(json_kind(&other).to_string())),
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn float(n: f64) -> Result<Json, JsonError> {
    Number::from_f64(n)
        .map(Json::Number)
        .ok_or_else(|| JsonError::Unrepresentable(format!("float {n}")))
}

fn key(value: &Value) -> Result<String, JsonError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        v if v.is_number() || matches!(v, Value::Bool(_)) => Ok(v.to_string()),
        other => Err(JsonError::Unrepresentable(format!(
            "map key of type {}",
            other.type_name()
        ))),
    }
}

impl Value {
    pub fn to_json(&self) -> Result<Json, JsonError> {
        Ok(match self {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::I8(n) => Json::from(*n),
            Value::I16(n) => Json::from(*n),
            Value::I32(n) => Json::from(*n),
            Value::I64(n) => Json::from(*n),
            Value::U8(n) => Json::from(*n),
            Value::U16(n) => Json::from(*n),
            Value::U32(n) => Json::from(*n),
            Value::U64(n) => Json::from(*n),
            Value::F32(n) => float(f64::from(*n))?,
            Value::F64(n) => float(*n)?,
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => {
                let mut fields = Map::new();
                for entry in entries {
                    fields.insert(key(&entry.key)?, entry.value.to_json()?);
                }
                Json::Object(fields)
            }
            Value::Entry(entry) => {
                let mut fields = Map::new();
                fields.insert("Key".to_string(), entry.key.to_json()?);
                fields.insert("Value".to_string(), entry.value.to_json()?);
                Json::Object(fields)
            }
            Value::Object(o) => {
                return Err(JsonError::Unrepresentable(format!("object {}", o.type_name())))
            }
            Value::Expression(e) => {
                return Err(JsonError::Unrepresentable(format!("expression {e}")))
            }
        })
    }
}
