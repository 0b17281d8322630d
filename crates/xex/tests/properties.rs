//! Property tests for arithmetic and lookup semantics.

mod common;

use proptest::prelude::*;
use xex::{Registry, Value, Values};

fn registry() -> Registry {
    common::registry()
}

fn evaluate(source: &str, values: &Values) -> Result<Value, String> {
    let expr = xex::parse_with(source, &registry()).map_err(|e| e.to_string())?;
    expr.evaluate(values).map_err(|e| e.to_string())
}

proptest! {
    #[test]
    fn same_width_addition_wraps(a in any::<i32>(), b in any::<i32>()) {
        let values = Values::new().with("a", a).with("b", b);
        prop_assert_eq!(evaluate("a + b", &values), Ok(Value::I32(a.wrapping_add(b))));
    }

    #[test]
    fn same_width_subtraction(a in any::<u16>(), b in any::<u16>()) {
        let values = Values::new().with("a", a).with("b", b);
        prop_assert_eq!(evaluate("a - b", &values), Ok(Value::U16(a.wrapping_sub(b))));
    }

    #[test]
    fn mixed_widths_never_combine(a in any::<i64>(), b in any::<i32>()) {
        let values = Values::new().with("a", a).with("b", b);
        for op in ["+", "-", "*", "/"] {
            let result = evaluate(&format!("a {op} b"), &values);
            prop_assert!(result.is_err(), "{op} produced {:?}", result);
        }
    }

    #[test]
    fn operators_fold_left(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        let values = Values::new().with("a", a).with("b", b).with("c", c);
        prop_assert_eq!(evaluate("a + b * c", &values), Ok(Value::I64((a + b) * c)));
        prop_assert_eq!(evaluate("a - b - c", &values), Ok(Value::I64(a - b - c)));
    }

    #[test]
    fn comparisons_agree_with_rust(a in any::<f64>(), b in any::<f64>()) {
        let values = Values::new().with("a", a).with("b", b);
        prop_assert_eq!(evaluate("a < b", &values), Ok(Value::Bool(a < b)));
        prop_assert_eq!(evaluate("a >= b", &values), Ok(Value::Bool(a >= b)));
    }

    #[test]
    fn evaluation_is_repeatable(s in "[a-z ]{0,16}", n in any::<i64>()) {
        let values = Values::new().with("s", s.as_str()).with("n", n);
        let expr = xex::parse_with("concat(s, string(n))", &registry()).unwrap();
        let first = expr.evaluate(&values);
        prop_assert_eq!(&first, &expr.evaluate(&values));
        prop_assert_eq!(first, Ok(Value::String(format!("{s}{n}"))));
    }

    #[test]
    fn missing_names_always_fail(name in "[a-z][a-zA-Z0-9]{0,8}") {
        prop_assume!(name != "true" && name != "false" && name != "bound");
        let values = Values::new().with("bound", 1i64);
        let result = evaluate(&name, &values);
        prop_assert!(result.is_err());
    }
}
