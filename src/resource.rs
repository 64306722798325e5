//! Resource scope: externally acquired resources released in reverse order.
//!
//! Semantics:
//! - Resources are recorded in acquisition order and released in exactly the
//!   reverse order.
//! - Each resource is released at most once; `release` drains the scope.
//! - A failing release never short-circuits the remaining releases. When several
//!   releases fail, the last failure (chronologically) is reported and earlier
//!   ones are logged as superseded.
//! - Dropping a scope that still holds resources releases them. Errors at that
//!   point have nowhere to go and are logged with their `Debug` rendering.
//!
//! Example
//! ```rust
//! use raises::ResourceScope;
//! use std::cell::RefCell;
//!
//! let log = RefCell::new(Vec::new());
//! let mut scope: ResourceScope<'_, std::io::Error> = ResourceScope::new()
//!     .defer(|| { log.borrow_mut().push("first"); Ok(()) })
//!     .defer(|| { log.borrow_mut().push("second"); Ok(()) });
//! scope.release().unwrap();
//! assert_eq!(*log.borrow(), vec!["second", "first"]);
//! ```

use std::fmt;

/// Something that must be released once the protected operation is over.
pub trait Resource<E> {
    fn release(&mut self) -> Result<(), E>;
}

impl<E, R> Resource<E> for Box<R>
where
    R: Resource<E> + ?Sized,
{
    fn release(&mut self) -> Result<(), E> {
        (**self).release()
    }
}

/// Adapts a release closure into a [`Resource`]. Runs the closure at most once.
pub struct Deferred<F> {
    release: Option<F>,
}

impl<F> Deferred<F> {
    pub fn new(release: F) -> Self {
        Self { release: Some(release) }
    }
}

impl<F> fmt::Debug for Deferred<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("pending", &self.release.is_some()).finish()
    }
}

impl<E, F> Resource<E> for Deferred<F>
where
    F: FnOnce() -> Result<(), E>,
{
    fn release(&mut self) -> Result<(), E> {
        match self.release.take() {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

/// Outcome of draining a scope.
#[derive(Debug)]
pub(crate) struct ReleaseReport<E> {
    pub(crate) released: usize,
    pub(crate) failed: usize,
    pub(crate) error: Option<E>,
}

/// Ordered list of acquired resources owned by one execution.
///
/// `E: Debug` lets release failures be logged with their value, including
/// those that happen while an unreleased scope is dropped.
pub struct ResourceScope<'a, E: fmt::Debug> {
    resources: Vec<Box<dyn Resource<E> + 'a>>,
}

impl<'a, E: fmt::Debug> ResourceScope<'a, E> {
    pub fn new() -> Self {
        Self { resources: Vec::new() }
    }

    /// Record `resource` as the most recently acquired one.
    pub fn acquire<R>(mut self, resource: R) -> Self
    where
        R: Resource<E> + 'a,
    {
        self.push(resource);
        self
    }

    /// Record every resource in `resources`, in iteration order.
    pub fn acquire_all<R, I>(mut self, resources: I) -> Self
    where
        R: Resource<E> + 'a,
        I: IntoIterator<Item = R>,
    {
        for resource in resources {
            self.push(resource);
        }
        self
    }

    /// Record a release closure as the most recently acquired resource.
    pub fn defer<F>(self, release: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        self.acquire(Deferred::new(release))
    }

    pub fn push<R>(&mut self, resource: R)
    where
        R: Resource<E> + 'a,
    {
        self.resources.push(Box::new(resource));
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Release every resource, newest first, returning the last failure.
    pub fn release(&mut self) -> Result<(), E> {
        match self.release_all().error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub(crate) fn release_all(&mut self) -> ReleaseReport<E> {
        let mut report = ReleaseReport { released: 0, failed: 0, error: None };
        while let Some(mut resource) = self.resources.pop() {
            let index = self.resources.len();
            report.released += 1;
            if let Err(error) = resource.release() {
                report.failed += 1;
                tracing::warn!(target: "raises::resource", index, error = ?error, "resource release failed");
                if let Some(previous) = report.error.replace(error) {
                    tracing::warn!(
                        target: "raises::resource",
                        superseded = ?previous,
                        "release error superseded by a later release failure"
                    );
                }
            }
        }
        report
    }
}

impl<'a, E: fmt::Debug> Default for ResourceScope<'a, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: fmt::Debug> fmt::Debug for ResourceScope<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceScope").field("resources", &self.resources.len()).finish()
    }
}

impl<'a, E: fmt::Debug> Drop for ResourceScope<'a, E> {
    fn drop(&mut self) {
        while let Some(mut resource) = self.resources.pop() {
            if let Err(error) = resource.release() {
                let index = self.resources.len();
                tracing::error!(
                    target: "raises::resource",
                    index,
                    error = ?error,
                    "resource release failed while dropping an unreleased scope"
                );
            }
        }
    }
}
