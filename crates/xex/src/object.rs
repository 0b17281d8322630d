//! Host objects: named fields and named methods resolved at evaluation time.

use crate::error::InvokeError;
use crate::function::{guarded, ArgList, MethodWrapper, NativeMethod};
use crate::value::Value;
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A host value reachable from expressions.
///
/// Fields are read with `a.b`, methods called with `a.b(...)`. Types that
/// expose methods build a [`MethodTable`] once and return it from
/// [`Object::method_table`].
pub trait Object: Any + fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    fn method_table(&self) -> &MethodTable {
        MethodTable::empty()
    }
}

static EMPTY: Lazy<MethodTable> = Lazy::new(MethodTable::default);

#[derive(Default)]
pub struct MethodTable {
    methods: HashMap<&'static str, Arc<dyn NativeMethod>>,
}

impl MethodTable {
    pub fn builder<T: Object>() -> MethodTableBuilder<T> {
        MethodTableBuilder {
            table: MethodTable::default(),
            _receiver: PhantomData,
        }
    }

    pub fn empty() -> &'static MethodTable {
        &EMPTY
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn NativeMethod>> {
        self.methods.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    /// Looks up and calls `name` on `receiver`, capturing panics.
    pub fn call(
        &self,
        receiver: &dyn Object,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, InvokeError> {
        let method = self.get(name).ok_or_else(|| InvokeError::MethodNotFound {
            method: name.to_string(),
            type_name: receiver.type_name().to_string(),
        })?;
        guarded(name, || method.call(receiver, args))
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}

pub struct MethodTableBuilder<T> {
    table: MethodTable,
    _receiver: PhantomData<fn(&T)>,
}

impl<T: Object> MethodTableBuilder<T> {
    /// Adds a method whose first parameter is the receiver.
    pub fn method<Args, F>(mut self, name: &'static str, function: F) -> Self
    where
        Args: ArgList,
        MethodWrapper<T, Args, F>: NativeMethod + 'static,
    {
        let method = MethodWrapper::<T, Args, F>::new(function);
        self.table.methods.insert(name, Arc::new(method));
        self
    }

    pub fn build(self) -> MethodTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        start: i64,
    }

    static COUNTER_METHODS: Lazy<MethodTable> = Lazy::new(|| {
        MethodTable::builder::<Counter>()
            .method("Plus", |c: &Counter, n: i64| c.start + n)
            .method("Fail", |_: &Counter| -> Result<i64, &'static str> { Err("failed") })
            .build()
    });

    impl Object for Counter {
        fn type_name(&self) -> &'static str {
            "Counter"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "Start" => Some(Value::I64(self.start)),
                _ => None,
            }
        }

        fn method_table(&self) -> &MethodTable {
            &COUNTER_METHODS
        }
    }

    #[derive(Debug)]
    struct Other;

    impl Object for Other {
        fn type_name(&self) -> &'static str {
            "Other"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_method_call() {
        let c = Counter { start: 40 };
        assert_eq!(
            c.method_table().call(&c, "Plus", vec![Value::I64(2)]),
            Ok(vec![Value::I64(42)])
        );
        assert_eq!(
            c.method_table().call(&c, "Fail", vec![]),
            Err(InvokeError::Failed("failed".to_string()))
        );
    }

    #[test]
    fn test_missing_method() {
        let c = Counter { start: 0 };
        assert_eq!(
            c.method_table().call(&c, "Minus", vec![]),
            Err(InvokeError::MethodNotFound {
                method: "Minus".to_string(),
                type_name: "Counter".to_string()
            })
        );
        assert!(Other.method_table().get("Plus").is_none());
    }

    #[test]
    fn test_wrong_receiver_type() {
        let result = COUNTER_METHODS.call(&Other, "Plus", vec![Value::I64(1)]);
        assert!(matches!(
            result,
            Err(InvokeError::ArgumentType { position: 0, .. })
        ));
    }
}
