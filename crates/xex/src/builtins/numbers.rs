//! Arithmetic and numeric conversion.
//!
//! Binary arithmetic only combines operands of the same width; mixing
//! widths is an error asking the caller to convert first. Integer add,
//! subtract and multiply wrap on overflow.

use crate::function::{Documentation, Function};
use crate::value::Value;

fn mismatch(name: &str, a: &Value, b: &Value) -> String {
    if a.is_number() && b.is_number() {
        format!(
            "{name} cannot use different types ({} & {}) - convert them first",
            a.type_name(),
            b.type_name()
        )
    } else {
        format!(
            "{name} can only use numeric types, not {} and {}",
            a.type_name(),
            b.type_name()
        )
    }
}

/// Applies `$int` to same-width integer pairs and `$float` to float pairs.
macro_rules! same_width {
    ($name:expr, $a:expr, $b:expr, |$x:ident, $y:ident| $int:expr, $float:expr) => {
        match ($a, $b) {
            (Value::I8($x), Value::I8($y)) => $int.map(Value::I8),
            (Value::I16($x), Value::I16($y)) => $int.map(Value::I16),
            (Value::I32($x), Value::I32($y)) => $int.map(Value::I32),
            (Value::I64($x), Value::I64($y)) => $int.map(Value::I64),
            (Value::U8($x), Value::U8($y)) => $int.map(Value::U8),
            (Value::U16($x), Value::U16($y)) => $int.map(Value::U16),
            (Value::U32($x), Value::U32($y)) => $int.map(Value::U32),
            (Value::U64($x), Value::U64($y)) => $int.map(Value::U64),
            (Value::F32($x), Value::F32($y)) => Some(Value::F32($float)),
            (Value::F64($x), Value::F64($y)) => Some(Value::F64($float)),
            (a, b) => return Err(mismatch($name, &a, &b)),
        }
    };
}

pub fn add(num1: Value, num2: Value) -> Result<Value, String> {
    Ok(same_width!("add", num1, num2, |x, y| Some(x.wrapping_add(y)), x + y)
        .unwrap_or_default())
}

pub fn subtract(num1: Value, num2: Value) -> Result<Value, String> {
    Ok(same_width!("subtract", num1, num2, |x, y| Some(x.wrapping_sub(y)), x - y)
        .unwrap_or_default())
}

pub fn multiply(num1: Value, num2: Value) -> Result<Value, String> {
    Ok(same_width!("multiply", num1, num2, |x, y| Some(x.wrapping_mul(y)), x * y)
        .unwrap_or_default())
}

pub fn divide(dividend: Value, divisor: Value) -> Result<Value, String> {
    same_width!("divide", dividend, divisor, |x, y| x.checked_div(y), x / y)
        .ok_or_else(|| "divide: integer division by zero or overflow".to_string())
}

pub fn negate(number: Value) -> Result<Value, String> {
    Ok(match number {
        Value::I8(n) => Value::I8(n.wrapping_neg()),
        Value::I16(n) => Value::I16(n.wrapping_neg()),
        Value::I32(n) => Value::I32(n.wrapping_neg()),
        Value::I64(n) => Value::I64(n.wrapping_neg()),
        Value::U8(n) => Value::U8(n.wrapping_neg()),
        Value::U16(n) => Value::U16(n.wrapping_neg()),
        Value::U32(n) => Value::U32(n.wrapping_neg()),
        Value::U64(n) => Value::U64(n.wrapping_neg()),
        Value::F32(n) => Value::F32(-n),
        Value::F64(n) => Value::F64(-n),
        other => return Err(format!("cannot negate {}", other.type_name())),
    })
}

fn doc_pair(text: &str, first: (&str, &str), second: (&str, &str)) -> Documentation {
    Documentation::new(text)
        .param(first.0, first.1)
        .param(second.0, second.1)
}

/// Numeric casts with native `as` semantics.
macro_rules! conversions {
    ($($name:literal => $ty:ty),* $(,)?) => {
        vec![$(
            Function::new(
                $name,
                Documentation::new(concat!(
                    $name,
                    " converts the passed in number to ",
                    stringify!($ty),
                    " or fails if conversion isn't possible"
                ))
                .param("number", "The number to convert."),
                |number: Value| -> Result<$ty, String> {
                    Ok(match number {
                        Value::I8(n) => n as $ty,
                        Value::I16(n) => n as $ty,
                        Value::I32(n) => n as $ty,
                        Value::I64(n) => n as $ty,
                        Value::U8(n) => n as $ty,
                        Value::U16(n) => n as $ty,
                        Value::U32(n) => n as $ty,
                        Value::U64(n) => n as $ty,
                        Value::F32(n) => n as $ty,
                        Value::F64(n) => n as $ty,
                        other => {
                            return Err(format!("cannot convert {} to {}", other.type_name(), $name))
                        }
                    })
                },
            ),
        )*]
    };
}

pub fn functions() -> Vec<Function> {
    let mut functions = vec![
        Function::new(
            "add",
            doc_pair(
                "adds two numbers of the same type returning a single numerical result",
                ("num1", "The first number to add."),
                ("num2", "The second number to add."),
            ),
            add,
        ),
        Function::new(
            "subtract",
            doc_pair(
                "subtracts num2 from num1 returning a single numerical result",
                ("num1", "The number to subtract from."),
                ("num2", "The number to subtract."),
            ),
            subtract,
        ),
        Function::new(
            "multiply",
            doc_pair(
                "multiplies two numbers returning a single numerical result",
                ("num1", "The first number to multiply."),
                ("num2", "The second number to multiply."),
            ),
            multiply,
        ),
        Function::new(
            "divide",
            doc_pair(
                "divides two numbers returning a single numerical result",
                ("dividend", "The number to be divided."),
                ("divisor", "The number to divide by."),
            ),
            divide,
        ),
        Function::new(
            "pow",
            doc_pair(
                "pow returns x to the power of y (x**y).",
                ("x", "The base number."),
                ("y", "The exponent."),
            ),
            |x: f64, y: f64| x.powf(y),
        ),
        Function::new(
            "mod",
            doc_pair(
                "mod returns the remainder of dividend divided by divisor.",
                ("dividend", "The number to be divided."),
                ("divisor", "The number to divide by."),
            ),
            |x: f64, y: f64| x % y,
        ),
        Function::new(
            "negate",
            Documentation::new("negate returns the number with its sign flipped")
                .param("number", "The number to negate."),
            negate,
        ),
    ];
    functions.extend(conversions! {
        "int" => i64,
        "int8" => i8,
        "int16" => i16,
        "int32" => i32,
        "int64" => i64,
        "uint" => u64,
        "uint8" => u8,
        "uint16" => u16,
        "uint32" => u32,
        "uint64" => u64,
        "float32" => f32,
        "float64" => f64,
    });
    functions
}
