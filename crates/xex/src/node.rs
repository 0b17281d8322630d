use crate::error::EvalError;
use crate::evaluate;
use crate::function::Function;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Value, Values};
use std::fmt::{self, Write};

/// One element of a parsed expression tree.
///
/// `Display` renders source text that parses back to an equivalent tree.
#[derive(Debug, PartialEq)]
pub enum Node {
    Literal(Value),
    /// Environment lookup when `parent` is `None`, field access otherwise.
    Property {
        name: String,
        parent: Option<Box<Node>>,
    },
    /// Call of a registry function, resolved at parse time.
    FunctionCall {
        function: Function,
        arguments: Vec<Node>,
        result_index: usize,
    },
    /// Call of a method on the parent's value, resolved at evaluation time.
    MethodCall {
        method: String,
        parent: Box<Node>,
        arguments: Vec<Node>,
        result_index: usize,
    },
}

impl Node {
    pub fn property(name: impl Into<String>) -> Self {
        Node::Property {
            name: name.into(),
            parent: None,
        }
    }

    pub fn call(function: Function, arguments: Vec<Node>) -> Self {
        Node::FunctionCall {
            function,
            arguments,
            result_index: 0,
        }
    }

    pub fn evaluate(&self, values: &Values) -> Result<Value, EvalError> {
        evaluate::evaluate(self, values)
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        ensure_sufficient_stack(|| match self {
            Node::Literal(v) => Node::Literal(v.clone()),
            Node::Property { name, parent } => Node::Property {
                name: name.clone(),
                parent: parent.clone(),
            },
            Node::FunctionCall {
                function,
                arguments,
                result_index,
            } => Node::FunctionCall {
                function: function.clone(),
                arguments: arguments.clone(),
                result_index: *result_index,
            },
            Node::MethodCall {
                method,
                parent,
                arguments,
                result_index,
            } => Node::MethodCall {
                method: method.clone(),
                parent: parent.clone(),
                arguments: arguments.clone(),
                result_index: *result_index,
            },
        })
    }
}

impl Drop for Node {
    // Children are released here rather than by drop glue so that every
    // level of a deep tree runs under the stack check.
    fn drop(&mut self) {
        ensure_sufficient_stack(|| match self {
            Node::Literal(_) => {}
            Node::Property { parent, .. } => drop(parent.take()),
            Node::FunctionCall { arguments, .. } => drop(std::mem::take(arguments)),
            Node::MethodCall {
                parent, arguments, ..
            } => {
                drop(std::mem::take(arguments));
                drop(std::mem::replace(&mut **parent, Node::Literal(Value::Nil)));
            }
        })
    }
}

/// Quotes `s` using only the escapes the lexer understands.
fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Float literals always carry a decimal point so they stay floats.
fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let text = n.to_string();
    if !n.is_finite() || text.contains('.') {
        f.write_str(&text)
    } else {
        write!(f, "{text}.0")
    }
}

/// Only `int64`, `float64`, string and bool literals exist in the grammar;
/// other widths render as a call of their conversion function.
fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write_string(f, s),
        Value::F64(n) => write_float(f, *n),
        Value::F32(n) => {
            f.write_str("float32(")?;
            write_float(f, f64::from(*n))?;
            f.write_str(")")
        }
        Value::I8(n) => write!(f, "int8({n})"),
        Value::I16(n) => write!(f, "int16({n})"),
        Value::I32(n) => write!(f, "int32({n})"),
        Value::U8(n) => write!(f, "uint8({n})"),
        Value::U16(n) => write!(f, "uint16({n})"),
        Value::U32(n) => write!(f, "uint32({n})"),
        Value::U64(n) => write!(f, "uint64({n})"),
        other => write!(f, "{other}"),
    }
}

fn write_call(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    arguments: &[Node],
    result_index: usize,
) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in arguments.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")?;
    if result_index != 0 {
        write!(f, "{{{result_index}}}")?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Node::Literal(v) => write_literal(f, v),
            Node::Property { name, parent } => {
                if let Some(parent) = parent {
                    write!(f, "{parent}.")?;
                }
                if name.is_empty() {
                    f.write_str("#")
                } else {
                    f.write_str(name)
                }
            }
            Node::FunctionCall {
                function,
                arguments,
                result_index,
            } => write_call(f, function.name(), arguments, *result_index),
            Node::MethodCall {
                method,
                parent,
                arguments,
                result_index,
            } => {
                write!(f, "{parent}.")?;
                write_call(f, method, arguments, *result_index)
            }
        })
    }
}
