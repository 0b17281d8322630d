//! Tree-walking evaluation of [`Node`]s against a [`Values`] environment.

use crate::error::{EvalError, InvokeError};
use crate::expression::Expression;
use crate::function::{guarded, ParamKind, Signature};
use crate::node::Node;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Value, Values};
use tracing::trace;

pub fn evaluate(node: &Node, values: &Values) -> Result<Value, EvalError> {
    ensure_sufficient_stack(|| evaluate_node(node, values))
}

fn evaluate_node(node: &Node, values: &Values) -> Result<Value, EvalError> {
    match node {
        Node::Literal(v) => Ok(v.clone()),

        Node::Property { name, parent: None } => {
            if let Some(v) = values.get(name) {
                return Ok(v.clone());
            }
            if name.is_empty() {
                return Ok(values.to_value());
            }
            Err(EvalError::MissingValue(name.clone()))
        }

        Node::Property {
            name,
            parent: Some(parent),
        } => {
            let target = evaluate(parent, values)?;
            if name.is_empty() {
                return Ok(target);
            }
            target
                .field(name)
                .ok_or_else(|| EvalError::MissingProperty {
                    property: name.clone(),
                    type_name: target.type_name().to_string(),
                })
        }

        Node::FunctionCall {
            function,
            arguments,
            result_index,
        } => {
            let args = evaluate_arguments(function.signature(), arguments, values)?;
            trace!(function = function.name(), args = args.len(), "calling function");
            function
                .invoke(args)
                .and_then(|results| select(results, *result_index))
                .map_err(|source| EvalError::Call {
                    name: function.name().to_string(),
                    source,
                })
        }

        Node::MethodCall {
            method,
            parent,
            arguments,
            result_index,
        } => {
            let target = evaluate(parent, values)?;
            let wrap = |source| EvalError::Call {
                name: method.clone(),
                source,
            };
            let not_found = || {
                wrap(InvokeError::MethodNotFound {
                    method: method.clone(),
                    type_name: target.type_name().to_string(),
                })
            };
            let Value::Object(object) = &target else {
                return Err(not_found());
            };
            let native = object.method_table().get(method).ok_or_else(not_found)?;
            let args = evaluate_arguments(native.signature(), arguments, values)?;
            trace!(method = %method, receiver = object.type_name(), "calling method");
            guarded(method, || native.call(object.as_ref(), args))
                .and_then(|results| select(results, *result_index))
                .map_err(wrap)
        }
    }
}

/// Evaluates call arguments left to right. Arguments bound to an
/// expression-kind parameter are passed as unevaluated sub-expressions.
fn evaluate_arguments(
    signature: &Signature,
    arguments: &[Node],
    values: &Values,
) -> Result<Vec<Value>, EvalError> {
    arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| match signature.kind_at(i) {
            Some(ParamKind::Expression) => Ok(Value::Expression(Expression::new(arg.clone()))),
            _ => evaluate(arg, values),
        })
        .collect()
}

fn select(results: Vec<Value>, index: usize) -> Result<Value, InvokeError> {
    let len = results.len();
    results
        .into_iter()
        .nth(index)
        .ok_or(InvokeError::ResultIndex { index, len })
}
