use crate::expression::Expression;
use crate::function::{Documentation, Function, Rest};
use crate::value::{lookup, MapEntry, Value, Values};
use tracing::trace;

/// Name under which `select` binds its n-th extra argument.
pub fn reference_name(index: usize) -> String {
    format!("ref{index}")
}

fn slice(values: Rest<Value>) -> Result<Value, String> {
    let values = values.into_inner();
    let first = values
        .first()
        .ok_or("error creating slice: no values passed")?
        .type_name();
    if let Some(other) = values.iter().find(|v| v.type_name() != first) {
        return Err(format!(
            "error creating slice: cannot put {} in a slice of {first}",
            other.type_name()
        ));
    }
    trace!(element = first, len = values.len(), "created slice");
    Ok(Value::List(values))
}

fn map(entries: Rest<MapEntry>) -> Result<Value, String> {
    let entries = entries.into_inner();
    let first = entries.first().ok_or("error creating map: no entries passed")?;
    let (key_type, value_type) = (first.key.type_name(), first.value.type_name());
    let mut out: Vec<MapEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.key.type_name() != key_type || entry.value.type_name() != value_type {
            return Err(format!(
                "error creating map: cannot put {}:{} in a map of {key_type}:{value_type}",
                entry.key.type_name(),
                entry.value.type_name()
            ));
        }
        // Later entries replace earlier ones with the same key.
        match out.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => existing.value = entry.value,
            None => out.push(entry),
        }
    }
    Ok(Value::Map(out))
}

fn selected(predicate: &Expression, values: &Values) -> Result<bool, String> {
    match predicate.evaluate(values) {
        Ok(Value::Bool(b)) => Ok(b),
        Ok(other) => Err(format!(
            "selector expression must return bool (true/false) not {:?}",
            other.type_name()
        )),
        Err(e) => Err(format!("error selecting: {e}")),
    }
}

fn select(
    coll: Value,
    for_each: String,
    predicate: Expression,
    refs: Rest<Value>,
) -> Result<Value, String> {
    let mut values: Values = refs
        .into_inner()
        .into_iter()
        .enumerate()
        .map(|(i, r)| (reference_name(i), r))
        .collect();
    match coll {
        Value::List(items) => {
            let mut out = Vec::new();
            for item in items {
                values.set(for_each.as_str(), item.clone());
                if selected(&predicate, &values)? {
                    out.push(item);
                }
            }
            trace!(selected = out.len(), "selected from list");
            Ok(Value::List(out))
        }
        Value::Map(entries) => {
            let mut out = Vec::new();
            for entry in entries {
                values.set(for_each.as_str(), entry.value.clone());
                if selected(&predicate, &values)? {
                    out.push(entry);
                }
            }
            trace!(selected = out.len(), "selected from map");
            Ok(Value::Map(out))
        }
        other => Err(format!("cannot select from {:?}", other.type_name())),
    }
}

fn index_of(coll: Value, index: Value) -> Result<Value, String> {
    match (&coll, &index) {
        (Value::List(items), Value::I64(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| format!("indexOf: index {i} out of range for list of length {}", items.len())),
        (Value::List(_), _) => Err(format!(
            "indexOf: cannot access list using a {}",
            index.type_name()
        )),
        (Value::Map(entries), _) => lookup(entries, &index).cloned().ok_or_else(|| {
            format!(
                "indexOf could not find map entry with key {index} of type {}",
                index.type_name()
            )
        }),
        _ => Err(format!(
            "indexOf: expected list or map, not {}",
            coll.type_name()
        )),
    }
}

fn count(coll: Value) -> Result<i64, String> {
    match coll {
        Value::List(items) => Ok(items.len() as i64),
        Value::Map(entries) => Ok(entries.len() as i64),
        other => Err(format!("cannot count type {}", other.type_name())),
    }
}

pub fn functions() -> Vec<Function> {
    vec![
        Function::new(
            "slice",
            Documentation::new(
                "Makes a new list containing the passed in values. \
                 Every value must have the type of the first one.",
            )
            .param("values", "variadic - any number of values of one type."),
            slice,
        ),
        Function::new(
            "map",
            Documentation::new(
                "Makes a new map from the passed in entries. \
                 Keys and values must have the types of the first entry.",
            )
            .param("values", "variadic - any number of map entries."),
            map,
        ),
        Function::new(
            "entry",
            Documentation::new("Creates a map entry with the passed in key and value.")
                .param("key", "The map entry key.")
                .param("value", "The map entry value."),
            |key: Value, value: Value| MapEntry { key, value },
        ),
        Function::new(
            "select",
            Documentation::new(
                "Returns the elements of a list or map for which the predicate evaluates to true. \
                 For a map the predicate sees each value, not the key. \
                 Extra arguments are bound as ref0, ref1 and so on. \
                 Example: select(lib.GetBooks(), \"book\", book.Author.Name == ref0, name)",
            )
            .param("coll", "The list or map to select from.")
            .param("forEach", "The name by which the predicate refers to each element.")
            .param("expression", "The predicate, evaluated once per element.")
            .param("refs", "variadic - values made available to the predicate."),
            select,
        ),
        Function::new(
            "indexOf",
            Documentation::new("Returns the entry from the passed collection at the requested index.")
                .param("coll", "The list or map from which to extract a value.")
                .param("index", "The position or key to extract from coll."),
            index_of,
        ),
        Function::new(
            "count",
            Documentation::new("Returns the number of elements in the passed in list or map.")
                .param("in", "The collection to count."),
            count,
        ),
    ]
}
