use crate::error::InvokeError;
use crate::function::{Documentation, Function, ParamKind, Rest};
use crate::value::Value;

/// A string argument at `position`, with nil read as "".
pub(crate) fn text(position: usize, value: Value) -> Result<String, InvokeError> {
    match value {
        Value::Nil => Ok(String::new()),
        Value::String(s) => Ok(s),
        other => Err(InvokeError::ArgumentType {
            position,
            expected: ParamKind::String,
            actual: other.type_name().to_string(),
        }),
    }
}

/// Byte range `start..end` of `input`; `end < 1` means the end of the string.
fn substring(input: String, start: i64, end: i64) -> Result<String, String> {
    let end = if end < 1 { input.len() as i64 } else { end };
    usize::try_from(start)
        .ok()
        .zip(usize::try_from(end).ok())
        .and_then(|(start, end)| input.get(start..end))
        .map(str::to_string)
        .ok_or_else(|| {
            format!(
                "substring: slice bounds [{start}:{end}] out of range for string of length {}",
                input.len()
            )
        })
}

pub fn functions() -> Vec<Function> {
    vec![
        Function::new(
            "string",
            Documentation::new("Converts an input into its display string")
                .param("in", "The value to convert to a string."),
            |value: Value| value.to_string(),
        ),
        Function::new(
            "concat",
            Documentation::new("concatenates any number of strings returning a single string result")
                .param("strs", "variadic - the strings to concatenate."),
            |strs: Rest<String>| strs.concat(),
        ),
        Function::new(
            "len",
            Documentation::new("returns the length of a string in bytes")
                .param("in", "The string to measure."),
            |input: String| input.len() as i64,
        ),
        Function::new(
            "substring",
            Documentation::new(
                "returns the substring of the input string from start to end - 1. \
                 If end is less than 1, everything to the end of the string is returned",
            )
            .param("input", "The string to take a substring from.")
            .param("start", "The start index (counting from 0).")
            .param("end", "The end index. If this is less than 1, defaults to the end of the string."),
            substring,
        ),
        Function::new(
            "instring",
            Documentation::new(
                "returns the start position in the input string of the search string \
                 or -1 if the search string is not found",
            )
            .param("input", "The string to search.")
            .param("search", "The string to find in the input."),
            |input: String, search: String| input.find(&search).map_or(-1, |i| i as i64),
        ),
    ]
}
