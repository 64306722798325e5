//! Supply a fallback value when a lookup fails with a recoverable error.
use raises::prelude::*;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Lookup,
    Missing,
    Corrupt,
}

impl Category for Kind {
    fn parent(&self) -> Option<Self> {
        match self {
            Kind::Lookup => None,
            Kind::Missing | Kind::Corrupt => Some(Kind::Lookup),
        }
    }
}

#[derive(Debug)]
struct LookupError {
    kind: Kind,
    key: String,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} while reading {}", self.kind, self.key)
    }
}

impl std::error::Error for LookupError {}

impl Categorized for LookupError {
    type Category = Kind;

    fn category(&self) -> Kind {
        self.kind
    }
}

fn read_port(settings: &HashMap<&str, &str>) -> Result<u16, LookupError> {
    let raw = settings
        .get("port")
        .ok_or_else(|| LookupError { kind: Kind::Missing, key: "port".into() })?;
    raw.parse().map_err(|_| LookupError { kind: Kind::Corrupt, key: "port".into() })
}

fn main() -> Result<(), LookupError> {
    let mut settings = HashMap::new();
    settings.insert("host", "localhost");

    let port = compute(|| read_port(&settings))
        .if_raises(Kind::Missing)
        .then_get(|_| 8080)
        .else_call(|port| println!("configured port {port}"))
        .finally_done(|| println!("settings lookup finished"))?;

    println!("listening on {port}");
    Ok(())
}
