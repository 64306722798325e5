//! Convert low-level errors into domain errors and print chain events as JSON.
use raises::prelude::*;
use std::fmt;
use std::io;

#[derive(Debug)]
enum ImportError {
    Source(io::Error),
    Rejected(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Source(e) => write!(f, "source unavailable: {e}"),
            ImportError::Rejected(reason) => write!(f, "import rejected: {reason}"),
        }
    }
}

impl std::error::Error for ImportError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Import,
    Source,
    Rejected,
}

impl Category for Kind {
    fn parent(&self) -> Option<Self> {
        match self {
            Kind::Import => None,
            Kind::Source | Kind::Rejected => Some(Kind::Import),
        }
    }
}

impl Categorized for ImportError {
    type Category = Kind;

    fn category(&self) -> Kind {
        match self {
            ImportError::Source(_) => Kind::Source,
            ImportError::Rejected(_) => Kind::Rejected,
        }
    }
}

fn main() {
    let sink = MemorySink::new();

    let result = attempt(|| {
        Err(ImportError::Source(io::Error::new(io::ErrorKind::NotFound, "orders.csv")))
    })
    .with_sink(sink.clone())
    .if_raises(Kind::Source)
    .then_throw(|e| ImportError::Rejected(e.to_string()))
    .finally_done(|| println!("import attempt finished"));

    if let Err(e) = result {
        println!("{e}");
    }
    for event in sink.events() {
        println!("{}", event.to_json());
    }
}
