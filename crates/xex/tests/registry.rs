//! Registration, the process-wide registry and the invocation contract.

mod common;

use std::sync::Arc;
use xex::{
    registry, Documentation, EvalError, Function, InvokeError, ParseError, Registry,
    RegistryError, Value, Values,
};

fn get_a_book() -> Function {
    Function::new(
        "test_getABook",
        Documentation::new("returns the first book of the fixture library"),
        || common::library().books[0].clone(),
    )
}

#[test]
fn test_property_of_function_return_value() {
    let mut registry = common::registry();
    registry.register(get_a_book());
    let expr = xex::parse_with("test_getABook().Title", &registry).unwrap();
    assert_eq!(
        expr.evaluate(&Values::new()),
        Ok(Value::from("Sense & Sensibility"))
    );
}

#[test]
fn test_function_unknown_to_registry() {
    let registry = common::registry();
    assert_eq!(
        xex::parse_with("test_getABook().Title", &registry),
        Err(ParseError::UnknownFunction {
            name: "test_getABook".to_string(),
            offset: 0
        })
    );
}

#[test]
#[should_panic(expected = "already registered")]
fn test_duplicate_registration_panics() {
    let mut registry = common::registry();
    registry.register(Function::new("concat", Documentation::default(), || ()));
}

#[test]
#[should_panic(expected = "invalid function name")]
fn test_invalid_name_panics() {
    Registry::new().register(Function::new("Bad-Name", Documentation::default(), || ()));
}

#[test]
fn test_panicking_function_is_contained() {
    let mut registry = common::registry();
    registry.register(Function::new(
        "explode",
        Documentation::default(),
        |n: i64| -> i64 {
            let items: Vec<i64> = Vec::new();
            items[n as usize]
        },
    ));
    let expr = xex::parse_with("explode(3)", &registry).unwrap();
    match expr.evaluate(&Values::new()) {
        Err(EvalError::Call {
            name,
            source: InvokeError::Panicked(message),
        }) => {
            assert_eq!(name, "explode");
            assert!(message.contains("index out of bounds"), "got: {message}");
        }
        other => panic!("expected a captured panic, got {other:?}"),
    }
}

#[test]
fn test_error_return_and_invocation_failure_share_a_channel() {
    let mut registry = common::registry();
    registry.register(Function::new(
        "checked",
        Documentation::default(),
        |n: i64| if n < 0 { Err("negative") } else { Ok(n) },
    ));
    let f = registry.resolve("checked").unwrap();
    assert_eq!(registry.invoke(&f, vec![Value::I64(1)]), Ok(vec![Value::I64(1)]));
    assert_eq!(
        registry.invoke(&f, vec![Value::I64(-1)]),
        Err(InvokeError::Failed("negative".to_string()))
    );
    assert!(matches!(
        registry.invoke(&f, vec![Value::from("x")]),
        Err(InvokeError::ArgumentType { .. })
    ));
    assert!(matches!(
        registry.invoke(&f, vec![]),
        Err(InvokeError::Arity { .. })
    ));
}

#[test]
fn test_documentation_is_kept() {
    let registry = common::registry();
    let substring = registry.resolve("substring").unwrap();
    let doc = substring.documentation();
    assert!(doc.text.contains("substring"));
    let names: Vec<&str> = doc.parameters.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["input", "start", "end"]);
}

#[test]
fn test_install_process_wide_registry() {
    let mut custom = Registry::with_builtins();
    custom.register(get_a_book());
    registry::install(custom).unwrap();
    assert_eq!(registry::install(Registry::new()), Err(RegistryError::AlreadyInstalled));

    let expr = xex::parse("test_getABook().PublicationYear").unwrap();
    assert_eq!(expr.evaluate(&Values::new()), Ok(Value::I64(1811)));
    assert!(registry::global().contains("test_getABook"));

    let lib: Arc<dyn xex::Object> = common::library();
    let values = Values::new().with("lib", lib);
    let expr = xex::parse_reader("lib.Address.City".as_bytes()).unwrap();
    assert_eq!(expr.evaluate(&values), Ok(Value::from("London")));
}
