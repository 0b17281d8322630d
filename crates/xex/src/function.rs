//! Native functions and the marshalling between untyped [`Value`] argument
//! lists and typed Rust closures.
//!
//! A closure such as `|a: i64, b: Rest<String>| -> String { .. }` is wrapped
//! into a [`FnWrapper`] whose [`NativeFn`] impl converts each positional
//! argument with [`FromValue`] and the return with [`IntoReturns`]. The
//! parameter list is recorded once, at wrap time, as a [`Signature`].

use crate::error::InvokeError;
use crate::expression::Expression;
use crate::object::Object;
use crate::value::{MapEntry, Value};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

/// The declared kind of a native parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Any,
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    List,
    Map,
    Entry,
    Object,
    /// Receives the argument's node unevaluated.
    Expression,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Any => "any",
            ParamKind::Bool => "bool",
            ParamKind::String => "string",
            ParamKind::I8 => "int8",
            ParamKind::I16 => "int16",
            ParamKind::I32 => "int32",
            ParamKind::I64 => "int64",
            ParamKind::U8 => "uint8",
            ParamKind::U16 => "uint16",
            ParamKind::U32 => "uint32",
            ParamKind::U64 => "uint64",
            ParamKind::F32 => "float32",
            ParamKind::F64 => "float64",
            ParamKind::List => "list",
            ParamKind::Map => "map",
            ParamKind::Entry => "entry",
            ParamKind::Object => "object",
            ParamKind::Expression => "expression",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Declared parameters of a native callable. A variadic tail, if any, is
/// always the last parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<ParamKind>,
    variadic: Option<ParamKind>,
}

impl Signature {
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    pub fn variadic(&self) -> Option<ParamKind> {
        self.variadic
    }

    /// Kind expected at argument `index`, counting into the variadic tail.
    pub fn kind_at(&self, index: usize) -> Option<ParamKind> {
        self.params.get(index).copied().or(self.variadic)
    }

    pub fn arity(&self) -> Arity {
        match self.variadic {
            Some(_) => Arity::AtLeast(self.params.len()),
            None => Arity::Exactly(self.params.len()),
        }
    }

    pub fn push(&mut self, kind: ParamKind, variadic: bool) {
        if variadic {
            self.variadic = Some(kind);
        } else {
            self.params.push(kind);
        }
    }
}

/// Cursor over the positional arguments of one call.
pub struct Arguments {
    values: std::vec::IntoIter<Value>,
    taken: usize,
    total: usize,
    arity: Arity,
}

impl Arguments {
    pub fn new(values: Vec<Value>, arity: Arity) -> Self {
        Arguments {
            total: values.len(),
            values: values.into_iter(),
            taken: 0,
            arity,
        }
    }

    fn arity_error(&self) -> InvokeError {
        InvokeError::Arity {
            expected: self.arity,
            actual: self.total,
        }
    }

    /// Next argument with its 1-based position.
    pub fn next_value(&mut self) -> Result<(usize, Value), InvokeError> {
        let value = self.values.next().ok_or_else(|| self.arity_error())?;
        self.taken += 1;
        Ok((self.taken, value))
    }

    pub fn remaining(&mut self) -> Vec<(usize, Value)> {
        let mut out = Vec::with_capacity(self.values.len());
        for value in self.values.by_ref() {
            self.taken += 1;
            out.push((self.taken, value));
        }
        out
    }

    /// Fails if arguments are left over.
    pub fn finish(self) -> Result<(), InvokeError> {
        if self.values.len() > 0 {
            return Err(self.arity_error());
        }
        Ok(())
    }
}

/// Conversion from a [`Value`] argument into a typed native parameter.
pub trait FromValue: Sized {
    fn kind() -> ParamKind;

    /// Converts, handing the value back when it has the wrong kind.
    fn from_value(value: Value) -> Result<Self, Value>;

    /// What a nil argument becomes, if this kind has a zero value.
    fn zero() -> Option<Self> {
        None
    }

    fn describe(signature: &mut Signature) {
        signature.push(Self::kind(), false);
    }

    fn take(args: &mut Arguments) -> Result<Self, InvokeError> {
        let (position, value) = args.next_value()?;
        convert(position, value)
    }
}

fn convert<T: FromValue>(position: usize, value: Value) -> Result<T, InvokeError> {
    if value.is_nil() {
        if let Some(zero) = T::zero() {
            return Ok(zero);
        }
    }
    T::from_value(value).map_err(|v| InvokeError::ArgumentType {
        position,
        expected: T::kind(),
        actual: v.type_name().to_string(),
    })
}

/// Trailing variadic parameter collecting every remaining argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rest<T>(pub Vec<T>);

impl<T> Rest<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> std::ops::Deref for Rest<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T: FromValue> FromValue for Rest<T> {
    fn kind() -> ParamKind {
        T::kind()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        T::from_value(value).map(|v| Rest(vec![v]))
    }

    fn describe(signature: &mut Signature) {
        signature.push(T::kind(), true);
    }

    fn take(args: &mut Arguments) -> Result<Self, InvokeError> {
        args.remaining()
            .into_iter()
            .map(|(position, value)| convert(position, value))
            .collect::<Result<Vec<T>, _>>()
            .map(Rest)
    }
}

/// Conversion of a native return into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion of a native return into the ordered result list of a call.
pub trait IntoReturns {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError>;
}

macro_rules! marshal_variant {
    ($($ty:ty => $variant:ident, $zero:expr;)*) => {
        $(
            impl FromValue for $ty {
                fn kind() -> ParamKind {
                    ParamKind::$variant
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }

                fn zero() -> Option<Self> {
                    $zero
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl IntoReturns for $ty {
                fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
                    Ok(vec![self.into_value()])
                }
            }
        )*
    };
}

marshal_variant! {
    bool => Bool, Some(false);
    i8 => I8, Some(0);
    i16 => I16, Some(0);
    i32 => I32, Some(0);
    i64 => I64, Some(0);
    u8 => U8, Some(0);
    u16 => U16, Some(0);
    u32 => U32, Some(0);
    u64 => U64, Some(0);
    f32 => F32, Some(0.0);
    f64 => F64, Some(0.0);
    String => String, Some(String::new());
    Vec<Value> => List, Some(Vec::new());
    Vec<MapEntry> => Map, Some(Vec::new());
    Expression => Expression, None;
    Arc<dyn Object> => Object, None;
}

impl FromValue for Value {
    fn kind() -> ParamKind {
        ParamKind::Any
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoReturns for Value {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self])
    }
}

impl FromValue for MapEntry {
    fn kind() -> ParamKind {
        ParamKind::Entry
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Entry(e) => Ok(*e),
            other => Err(other),
        }
    }

    fn zero() -> Option<Self> {
        Some(MapEntry::new(Value::Nil, Value::Nil))
    }
}

impl IntoValue for MapEntry {
    fn into_value(self) -> Value {
        Value::Entry(Box::new(self))
    }
}

impl IntoReturns for MapEntry {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self.into_value()])
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn kind() -> ParamKind {
        T::kind()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        T::from_value(value).map(Some)
    }

    fn zero() -> Option<Self> {
        Some(None)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Nil, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoReturns for Option<T> {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self.into_value()])
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoReturns for &str {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self.into_value()])
    }
}

impl<T: Object> IntoValue for Arc<T> {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl<T: Object> IntoReturns for Arc<T> {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self.into_value()])
    }
}

impl<T: Object> IntoValue for Vec<Arc<T>> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: Object> IntoReturns for Vec<Arc<T>> {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self.into_value()])
    }
}

impl IntoReturns for () {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(Vec::new())
    }
}

impl<A: IntoValue, B: IntoValue> IntoReturns for (A, B) {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![self.0.into_value(), self.1.into_value()])
    }
}

impl<A: IntoValue, B: IntoValue, C: IntoValue> IntoReturns for (A, B, C) {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        Ok(vec![
            self.0.into_value(),
            self.1.into_value(),
            self.2.into_value(),
        ])
    }
}

/// A trailing error return: `Err` becomes [`InvokeError::Failed`].
impl<R: IntoReturns, E: fmt::Display> IntoReturns for Result<R, E> {
    fn into_returns(self) -> Result<Vec<Value>, InvokeError> {
        match self {
            Ok(r) => r.into_returns(),
            Err(e) => Err(InvokeError::Failed(e.to_string())),
        }
    }
}

/// Tuple of parameter types a closure takes.
pub trait ArgList {
    fn signature() -> Signature;
}

/// A callable that can be stored in a registry.
pub trait NativeFn: Send + Sync {
    fn signature(&self) -> &Signature;
    fn call(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError>;
}

/// A callable bound to a receiver type, stored in a [`MethodTable`].
///
/// [`MethodTable`]: crate::object::MethodTable
pub trait NativeMethod: Send + Sync {
    fn signature(&self) -> &Signature;
    fn call(&self, receiver: &dyn Object, args: Vec<Value>) -> Result<Vec<Value>, InvokeError>;
}

pub struct FnWrapper<Args, F> {
    function: F,
    signature: Signature,
    _args: PhantomData<fn(Args)>,
}

impl<Args: ArgList, F> FnWrapper<Args, F> {
    pub fn new(function: F) -> Self {
        FnWrapper {
            function,
            signature: Args::signature(),
            _args: PhantomData,
        }
    }
}

pub struct MethodWrapper<T, Args, F> {
    function: F,
    signature: Signature,
    _receiver: PhantomData<fn(&T, Args)>,
}

impl<T, Args: ArgList, F> MethodWrapper<T, Args, F> {
    pub fn new(function: F) -> Self {
        MethodWrapper {
            function,
            signature: Args::signature(),
            _receiver: PhantomData,
        }
    }
}

macro_rules! impl_native {
    ($($arg:ident),*) => {
        impl<$($arg: FromValue,)*> ArgList for ($($arg,)*) {
            fn signature() -> Signature {
                #[allow(unused_mut)]
                let mut signature = Signature::default();
                $($arg::describe(&mut signature);)*
                signature
            }
        }

        impl<F, R, $($arg,)*> NativeFn for FnWrapper<($($arg,)*), F>
        where
            F: Fn($($arg),*) -> R + Send + Sync,
            R: IntoReturns,
            $($arg: FromValue,)*
        {
            fn signature(&self) -> &Signature {
                &self.signature
            }

            #[allow(non_snake_case, unused_mut)]
            fn call(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
                let mut args = Arguments::new(args, self.signature.arity());
                $(let $arg = $arg::take(&mut args)?;)*
                args.finish()?;
                (self.function)($($arg),*).into_returns()
            }
        }

        impl<T, F, R, $($arg,)*> NativeMethod for MethodWrapper<T, ($($arg,)*), F>
        where
            T: Object,
            F: Fn(&T, $($arg),*) -> R + Send + Sync,
            R: IntoReturns,
            $($arg: FromValue,)*
        {
            fn signature(&self) -> &Signature {
                &self.signature
            }

            #[allow(non_snake_case, unused_mut)]
            fn call(&self, receiver: &dyn Object, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
                // Position 0 is the receiver.
                let Some(this) = receiver.as_any().downcast_ref::<T>() else {
                    return Err(InvokeError::ArgumentType {
                        position: 0,
                        expected: ParamKind::Object,
                        actual: receiver.type_name().to_string(),
                    });
                };
                let mut args = Arguments::new(args, self.signature.arity());
                $(let $arg = $arg::take(&mut args)?;)*
                args.finish()?;
                (self.function)(this, $($arg),*).into_returns()
            }
        }
    };
}

impl_native!();
impl_native!(A1);
impl_native!(A1, A2);
impl_native!(A1, A2, A3);
impl_native!(A1, A2, A3, A4);
impl_native!(A1, A2, A3, A4, A5);
impl_native!(A1, A2, A3, A4, A5, A6);

/// Help text attached to a registered function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documentation {
    pub text: String,
    pub parameters: Vec<(String, String)>,
}

impl Documentation {
    pub fn new(text: impl Into<String>) -> Self {
        Documentation {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.push((name.into(), description.into()));
        self
    }
}

impl fmt::Display for Documentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        for (name, description) in &self.parameters {
            write!(f, "\n  {name}: {description}")?;
        }
        Ok(())
    }
}

struct FunctionInner {
    name: String,
    documentation: Documentation,
    native: Box<dyn NativeFn>,
}

/// A named native function. Cloning shares the underlying callable.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    pub fn new<Args, F>(name: impl Into<String>, documentation: Documentation, function: F) -> Self
    where
        Args: ArgList,
        FnWrapper<Args, F>: NativeFn + 'static,
    {
        Self::from_native(name, documentation, FnWrapper::<Args, F>::new(function))
    }

    pub fn from_native(
        name: impl Into<String>,
        documentation: Documentation,
        native: impl NativeFn + 'static,
    ) -> Self {
        Function {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                documentation,
                native: Box::new(native),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn documentation(&self) -> &Documentation {
        &self.inner.documentation
    }

    pub fn signature(&self) -> &Signature {
        self.inner.native.signature()
    }

    /// Calls the function. A panic inside it is reported as
    /// [`InvokeError::Panicked`] and never crosses this boundary.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
        guarded(self.name(), || self.inner.native.call(args))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .field("signature", self.signature())
            .finish()
    }
}

/// Identity: a function equals its clones, never another registration
/// that happens to share its name.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Runs a native call, turning a panic into [`InvokeError::Panicked`].
pub(crate) fn guarded(
    name: &str,
    call: impl FnOnce() -> Result<Vec<Value>, InvokeError>,
) -> Result<Vec<Value>, InvokeError> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => {
            if let Err(err) = &result {
                debug!(function = name, error = %err, "native call failed");
            }
            result
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            debug!(function = name, panic = %message, "recovered from panic in native call");
            Err(InvokeError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
