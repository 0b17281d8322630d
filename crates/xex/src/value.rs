use crate::expression::Expression;
use crate::object::Object;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Any value an expression can produce or consume.
///
/// Numeric widths are kept apart on purpose: `I8(1)` and `I64(1)` are
/// different values and arithmetic never widens one into the other.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    List(Vec<Value>),
    /// Insertion-ordered key/value pairs; keys are compared with `==`.
    Map(Vec<MapEntry>),
    Entry(Box<MapEntry>),
    /// A host object exposed through the [`Object`] capability trait.
    Object(Arc<dyn Object>),
    /// An unevaluated sub-expression handed to a function as data.
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Value,
    pub value: Value,
}

impl MapEntry {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        MapEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::I8(_) => "int8",
            Value::I16(_) => "int16",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U8(_) => "uint8",
            Value::U16(_) => "uint16",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Entry(_) => "entry",
            Value::Object(o) => o.type_name(),
            Value::Expression(_) => "expression",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
                | Value::F32(_)
                | Value::F64(_)
        )
    }

    /// Numeric value as `f64`, for comparisons. `None` for non-numbers.
    pub fn as_f64(&self) -> Option<f64> {
        Some(match *self {
            Value::I8(n) => n as f64,
            Value::I16(n) => n as f64,
            Value::I32(n) => n as f64,
            Value::I64(n) => n as f64,
            Value::U8(n) => n as f64,
            Value::U16(n) => n as f64,
            Value::U32(n) => n as f64,
            Value::U64(n) => n as f64,
            Value::F32(n) => n as f64,
            Value::F64(n) => n,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Resolves `name` as a field: an object field or a string key of a map.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(o) => o.field(name),
            Value::Map(entries) => lookup(entries, &Value::from(name)).cloned(),
            _ => None,
        }
    }
}

/// Finds the value stored under `key`.
pub fn lookup<'a>(entries: &'a [MapEntry], key: &Value) -> Option<&'a Value> {
    entries.iter().find(|e| &e.key == key).map(|e| &e.value)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Entry(a), Value::Entry(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Expression(a), Value::Expression(b)) => a == b,
            _ => false,
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I8(n) => write!(f, "{n}"),
            Value::I16(n) => write!(f, "{n}"),
            Value::I32(n) => write!(f, "{n}"),
            Value::I64(n) => write!(f, "{n}"),
            Value::U8(n) => write!(f, "{n}"),
            Value::U16(n) => write!(f, "{n}"),
            Value::U32(n) => write!(f, "{n}"),
            Value::U64(n) => write!(f, "{n}"),
            Value::F32(n) => write!(f, "{n}"),
            Value::F64(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("map[")?;
                write_joined(f, entries)?;
                f.write_str("]")
            }
            Value::Entry(e) => write!(f, "{{{} {}}}", e.key, e.value),
            Value::Object(o) => write!(f, "{o:?}"),
            Value::Expression(e) => write!(f, "{e}"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<Value> => List,
    Vec<MapEntry> => Map,
    Arc<dyn Object> => Object,
    Expression => Expression,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Object> From<Arc<T>> for Value {
    fn from(o: Arc<T>) -> Self {
        Value::Object(o)
    }
}

impl From<MapEntry> for Value {
    fn from(e: MapEntry) -> Self {
        Value::Entry(Box::new(e))
    }
}

/// The named-value environment an expression is evaluated against.
///
/// Only top-level property lookups (no parent) read from it. The empty name
/// is a legal key: collection functions bind the current element there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    entries: HashMap<String, Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Binds `name`, returning the value it replaced.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Builder form of [`Values::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The whole environment as a string-keyed map, sorted by name.
    pub fn to_value(&self) -> Value {
        let mut entries: Vec<MapEntry> = self
            .entries
            .iter()
            .map(|(k, v)| MapEntry::new(k.as_str(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.key.as_str().cmp(&b.key.as_str()));
        Value::Map(entries)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Values {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_are_never_equal() {
        assert_ne!(Value::I8(1), Value::I64(1));
        assert_ne!(Value::F32(1.0), Value::F64(1.0));
        assert_eq!(Value::I64(1), Value::from(1i64));
    }

    #[test]
    fn test_display() {
        let list = Value::List(vec![Value::I64(1), Value::from("a"), Value::Bool(true)]);
        assert_eq!(list.to_string(), "[1 a true]");
        let map = Value::Map(vec![MapEntry::new(1i64, "x")]);
        assert_eq!(map.to_string(), "map[1:x]");
        assert_eq!(Value::F64(45.0).to_string(), "45");
        assert_eq!(Value::Nil.to_string(), "<nil>");
    }

    #[test]
    fn test_map_field_access() {
        let map = Value::Map(vec![MapEntry::new("City", "London")]);
        assert_eq!(map.field("City"), Some(Value::from("London")));
        assert_eq!(map.field("Street"), None);
        assert_eq!(Value::I64(3).field("City"), None);
    }

    #[test]
    fn test_values_to_value_is_sorted() {
        let values = Values::new().with("b", 2i64).with("a", 1i64);
        assert_eq!(
            values.to_value(),
            Value::Map(vec![MapEntry::new("a", 1i64), MapEntry::new("b", 2i64)])
        );
    }
}
