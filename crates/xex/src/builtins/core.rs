//! Equality, boolean logic, comparison and the functions operators and
//! grouping are rewritten into.

use crate::builtins::{numbers, strings};
use crate::error::InvokeError;
use crate::function::{Documentation, Function, Rest};
use crate::value::Value;
use std::cmp::Ordering;

fn doc_pair(text: &str, first: &str, second: &str) -> Documentation {
    Documentation::new(text)
        .param("val1", first)
        .param("val2", second)
}

/// Orders two strings or two numbers of the same width. `None` when a
/// float operand is NaN.
fn ordering(name: &str, a: &Value, b: &Value) -> Result<Option<Ordering>, String> {
    if let (Value::String(a), Value::String(b)) = (a, b) {
        return Ok(Some(a.cmp(b)));
    }
    if a.type_name() != b.type_name() {
        return Err(format!(
            "{name}: mismatched types {} and {}",
            a.type_name(),
            b.type_name()
        ));
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
        _ => Err(format!("{name}: cannot compare {} values", a.type_name())),
    }
}

fn switch(values: Rest<Value>) -> Result<Value, &'static str> {
    let mut values = values.into_inner();
    if values.is_empty() {
        return Err("switch requires a value to test");
    }
    // An even count means the last value is the default.
    let default = if values.len() % 2 == 0 {
        values.pop().unwrap_or_default()
    } else {
        Value::Nil
    };
    let (subject, cases) = values.split_at(1);
    Ok(cases
        .chunks_exact(2)
        .find(|pair| pair[0] == subject[0])
        .map_or(default, |pair| pair[1].clone()))
}

pub fn add_or_concat(val1: Value, val2: Value) -> Result<Value, InvokeError> {
    if val1.is_number() && val2.is_number() {
        return numbers::add(val1, val2).map_err(InvokeError::Failed);
    }
    let first = strings::text(1, val1)?;
    let second = strings::text(2, val2)?;
    Ok(Value::String(first + &second))
}

pub fn functions() -> Vec<Function> {
    vec![
        Function::new(
            "equals",
            doc_pair(
                "compares 2 inputs returning a bool",
                "The first value to compare",
                "The second value to compare",
            ),
            |val1: Value, val2: Value| val1 == val2,
        ),
        Function::new(
            "notEquals",
            doc_pair(
                "Compares 2 inputs returning a bool.",
                "The first value to compare.",
                "The second value to compare.",
            ),
            |val1: Value, val2: Value| val1 != val2,
        ),
        Function::new(
            "switch",
            Documentation::new(
                "Switches on the first value. The following values are case/result pairs. \
                 If an even number of values is passed the last one is the default. \
                 With no default and no match, switch returns nil.",
            )
            .param(
                "values",
                "variadic - the value to test, then case/result pairs and an optional default",
            ),
            switch,
        ),
        Function::new(
            "and",
            doc_pair(
                "Returns true if both inputs are true, else false.",
                "The first bool value",
                "The second bool value",
            ),
            |val1: bool, val2: bool| val1 && val2,
        ),
        Function::new(
            "or",
            doc_pair(
                "Returns true if either or both inputs are true, else false.",
                "The first bool value",
                "The second bool value",
            ),
            |val1: bool, val2: bool| val1 || val2,
        ),
        Function::new(
            "not",
            Documentation::new("Accepts a boolean and returns its inverse")
                .param("value", "The value to invert."),
            |value: bool| !value,
        ),
        Function::new(
            "greaterThan",
            doc_pair(
                "Returns the result of val1 > val2. Values must be numeric or string.",
                "The first value.",
                "The second value.",
            ),
            |val1: Value, val2: Value| {
                ordering("greaterThan", &val1, &val2).map(|o| o.is_some_and(Ordering::is_gt))
            },
        ),
        Function::new(
            "greaterThanEqual",
            doc_pair(
                "Returns the result of val1 >= val2. Values must be numeric or string.",
                "The first value.",
                "The second value.",
            ),
            |val1: Value, val2: Value| {
                ordering("greaterThanEqual", &val1, &val2).map(|o| o.is_some_and(Ordering::is_ge))
            },
        ),
        Function::new(
            "lessThan",
            doc_pair(
                "Returns the result of val1 < val2. Values must be numeric or string.",
                "The first value.",
                "The second value.",
            ),
            |val1: Value, val2: Value| {
                ordering("lessThan", &val1, &val2).map(|o| o.is_some_and(Ordering::is_lt))
            },
        ),
        Function::new(
            "lessThanEqual",
            doc_pair(
                "Returns the result of val1 <= val2. Values must be numeric or string.",
                "The first value.",
                "The second value.",
            ),
            |val1: Value, val2: Value| {
                ordering("lessThanEqual", &val1, &val2).map(|o| o.is_some_and(Ordering::is_le))
            },
        ),
        Function::new(
            "nil",
            Documentation::new("Returns what is passed. Used to implement parenthesis grouping.")
                .param("value", "The value which will be returned unchanged."),
            |value: Value| value,
        ),
        Function::new(
            "addOrConcat",
            doc_pair(
                "Calls add when both arguments are numeric, otherwise concatenates them.",
                "The first value to add or concatenate.",
                "The second value to add or concatenate.",
            ),
            add_or_concat,
        ),
    ]
}
