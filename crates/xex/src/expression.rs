use crate::error::EvalError;
use crate::node::Node;
use crate::value::{Value, Values};
use std::fmt;
use std::sync::Arc;

/// A parsed, immutable expression tree.
///
/// Cheap to clone and safe to evaluate from many threads at once, each
/// against its own [`Values`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Arc<Node>,
}

impl Expression {
    pub fn new(root: Node) -> Self {
        Expression {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn evaluate(&self, values: &Values) -> Result<Value, EvalError> {
        self.root.evaluate(values)
    }
}

impl From<Node> for Expression {
    fn from(root: Node) -> Self {
        Expression::new(root)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
