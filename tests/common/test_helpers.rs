#![allow(dead_code)]

use raises::{Categorized, Category, Resource};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

/// Category hierarchy shared by the integration tests:
///
/// ```text
/// Any
/// ├── Io
/// │   ├── Timeout
/// │   └── NotFound
/// └── Validation
///     └── Range
/// Fatal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Any,
    Io,
    Timeout,
    NotFound,
    Validation,
    Range,
    Fatal,
}

impl Category for Kind {
    fn parent(&self) -> Option<Self> {
        match self {
            Kind::Any | Kind::Fatal => None,
            Kind::Io | Kind::Validation => Some(Kind::Any),
            Kind::Timeout | Kind::NotFound => Some(Kind::Io),
            Kind::Range => Some(Kind::Validation),
        }
    }
}

/// Error carrying a category and an identity tag so tests can check that the
/// surfaced error is the exact value that was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub kind: Kind,
    pub tag: &'static str,
}

impl AppError {
    pub fn new(kind: Kind, tag: &'static str) -> Self {
        Self { kind, tag }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.tag)
    }
}

impl std::error::Error for AppError {}

impl Categorized for AppError {
    type Category = Kind;

    fn category(&self) -> Kind {
        self.kind
    }
}

/// Shared, ordered record of observed calls.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }
}

/// A resource that records its release and optionally fails it.
#[derive(Debug)]
pub struct TrackedResource {
    name: &'static str,
    recorder: Recorder,
    failure: Option<AppError>,
}

impl TrackedResource {
    pub fn new(name: &'static str, recorder: &Recorder) -> Self {
        Self { name, recorder: recorder.clone(), failure: None }
    }

    pub fn failing(name: &'static str, recorder: &Recorder, failure: AppError) -> Self {
        Self { name, recorder: recorder.clone(), failure: Some(failure) }
    }
}

impl Resource<AppError> for TrackedResource {
    fn release(&mut self) -> Result<(), AppError> {
        self.recorder.record(format!("release {}", self.name));
        match self.failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// In-memory log sink for `tracing-subscriber`.
#[derive(Clone, Default)]
pub struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl SharedWriter {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedGuard(self.0.clone())
    }
}

pub struct SharedGuard(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `body` under a fmt subscriber and return everything it logged.
pub fn capture_logs<F: FnOnce()>(body: F) -> String {
    let writer = SharedWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(BoxMakeWriter::new(writer.clone()))
        .with_target(true)
        .without_time()
        .finish();
    tracing::subscriber::with_default(subscriber, body);
    writer.contents()
}
