//! Shared fixture: a small library of books exposed as host objects.

#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::any::Any;
use std::sync::{Arc, Once};
use xex::{MapEntry, MethodTable, Object, Registry, Value, Values};

static TRACING_INIT: Once = Once::new();

/// Installs a subscriber when `RUST_LOG` is set, e.g. `RUST_LOG=xex=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer())
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[derive(Debug)]
pub struct Address {
    pub building: String,
    pub street: String,
    pub city: String,
}

impl Object for Address {
    fn type_name(&self) -> &'static str {
        "Address"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "Building" => self.building.as_str().into(),
            "Street" => self.street.as_str().into(),
            "City" => self.city.as_str().into(),
            _ => return None,
        })
    }
}

#[derive(Debug)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

static AUTHOR_METHODS: Lazy<MethodTable> = Lazy::new(|| {
    MethodTable::builder::<Author>()
        .method("Books", |author: &Author, lib: Arc<dyn Object>| {
            let Some(lib) = lib.as_any().downcast_ref::<Library>() else {
                return Err(format!("expected a Library, got {}", lib.type_name()));
            };
            let books: Vec<Arc<Book>> = lib
                .books
                .iter()
                .filter(|b| std::ptr::eq(Arc::as_ptr(&b.author), author))
                .cloned()
                .collect();
            if books.is_empty() {
                return Err("No books for author".to_string());
            }
            Ok(books)
        })
        .build()
});

impl Object for Author {
    fn type_name(&self) -> &'static str {
        "Author"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Id" => Some(Value::I64(self.id)),
            "Name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }

    fn method_table(&self) -> &MethodTable {
        &AUTHOR_METHODS
    }
}

#[derive(Debug)]
pub struct Book {
    pub title: String,
    pub author: Arc<Author>,
    pub publication_year: i64,
    pub price: f32,
}

impl Object for Book {
    fn type_name(&self) -> &'static str {
        "Book"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "Title" => self.title.as_str().into(),
            "Author" => self.author.clone().into(),
            "PublicationYear" => Value::I64(self.publication_year),
            "Price" => Value::F32(self.price),
            _ => return None,
        })
    }
}

#[derive(Debug)]
pub struct Library {
    pub address: Arc<Address>,
    pub books: Vec<Arc<Book>>,
}

static LIBRARY_METHODS: Lazy<MethodTable> = Lazy::new(|| {
    MethodTable::builder::<Library>()
        .method("GetAddress", |lib: &Library| lib.address.clone())
        .method("GetBooks", |lib: &Library| lib.books.clone())
        .method("Authors", |lib: &Library| {
            let mut authors: Vec<MapEntry> = Vec::new();
            for book in &lib.books {
                let id = Value::I64(book.author.id);
                if !authors.iter().any(|e| e.key == id) {
                    authors.push(MapEntry::new(id, book.author.name.as_str()));
                }
            }
            authors
        })
        .method("Book", |lib: &Library, title: String| {
            lib.books
                .iter()
                .find(|b| b.title == title)
                .cloned()
                .ok_or("Book not found")
        })
        .build()
});

impl Object for Library {
    fn type_name(&self) -> &'static str {
        "Library"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Address" => Some(self.address.clone().into()),
            "Books" => Some(Value::List(
                self.books.iter().cloned().map(Value::from).collect(),
            )),
            _ => None,
        }
    }

    fn method_table(&self) -> &MethodTable {
        &LIBRARY_METHODS
    }
}

fn book(title: &str, year: i64, price: f32, id: i64, author: &str) -> Arc<Book> {
    Arc::new(Book {
        title: title.to_string(),
        author: Arc::new(Author {
            id,
            name: author.to_string(),
        }),
        publication_year: year,
        price,
    })
}

pub fn library() -> Arc<Library> {
    Arc::new(Library {
        address: Arc::new(Address {
            building: "123".to_string(),
            street: "New Street".to_string(),
            city: "London".to_string(),
        }),
        books: vec![
            book("Sense & Sensibility", 1811, 4.99, 1, "Jane Austen"),
            book("Pride & Prejudice", 1813, 6.99, 1, "Jane Austen"),
            book("1984", 1949, 9.99, 2, "George Orwell"),
            book("Animal Farm", 1945, 8.99, 2, "George Orwell"),
            book("The Lion, the With & the Wardrobe", 1950, 5.49, 3, "C.S. Lewis"),
        ],
    })
}

pub fn values() -> Values {
    Values::new().with("lib", library())
}

pub fn registry() -> Registry {
    init_tracing();
    Registry::with_builtins()
}

/// Parses against the builtins and evaluates against the library fixture.
pub fn eval(source: &str) -> Result<Value, String> {
    let registry = registry();
    let expr = xex::parse_with(source, &registry).map_err(|e| e.to_string())?;
    expr.evaluate(&values()).map_err(|e| e.to_string())
}

pub fn check(source: &str, expected: impl Into<Value>) {
    let result = eval(source).unwrap_or_else(|e| panic!("{source} failed: {e}"));
    assert_eq!(result, expected.into(), "expression: {source}");
}

pub fn check_err(source: &str) -> String {
    eval(source)
        .err()
        .unwrap_or_else(|| panic!("expected error for {source}"))
}

pub fn titles(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items
            .iter()
            .filter_map(|v| v.field("Title"))
            .map(|t| t.to_string())
            .collect(),
        other => panic!("expected a list, got {other}"),
    }
}
