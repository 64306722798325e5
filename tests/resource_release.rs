mod common;

use common::test_helpers::{AppError, Kind, Recorder, TrackedResource};
use raises::{attempt_with, compute_with, ChainEvent, MemorySink, ResourceScope};
use std::panic::{self, AssertUnwindSafe};

fn scope_of<'a>(recorder: &Recorder, names: &[&'static str]) -> ResourceScope<'a, AppError> {
    ResourceScope::new()
        .acquire_all(names.iter().copied().map(|name| TrackedResource::new(name, recorder)))
}

#[test]
fn unmatched_error_releases_in_reverse_order() {
    let recorder = Recorder::new();

    let result = attempt_with(scope_of(&recorder, &["R1", "R2"]), || {
        Err(AppError::new(Kind::Fatal, "boom"))
    })
    .if_raises(Kind::Io)
    .then_call(|_| recorder.record("handler"))
    .done();

    assert_eq!(result, Err(AppError::new(Kind::Fatal, "boom")));
    assert_eq!(recorder.calls(), vec!["release R2".to_string(), "release R1".to_string()]);
}

#[test]
fn release_follows_cleanup_on_success() {
    let recorder = Recorder::new();

    let value = compute_with(scope_of(&recorder, &["R1", "R2", "R3"]), || {
        recorder.record("operation");
        Ok::<_, AppError>(3)
    })
    .if_raises(Kind::Any)
    .then_get(|_| 0)
    .else_call(|_| recorder.record("success"))
    .finally_done(|| recorder.record("cleanup"));

    assert_eq!(value, Ok(3));
    assert_eq!(
        recorder.calls(),
        vec!["operation", "success", "cleanup", "release R3", "release R2", "release R1"]
    );
}

#[test]
fn each_resource_released_once_on_handled_and_transformed_paths() {
    for kind in [Kind::Io, Kind::Range] {
        let recorder = Recorder::new();
        let _ = attempt_with(scope_of(&recorder, &["R1", "R2"]), move || {
            Err(AppError::new(kind, "e"))
        })
        .if_raises(Kind::Io)
        .then_call(|_| {})
        .else_if_raises(Kind::Validation)
        .then_throw(|e| e)
        .done();

        assert_eq!(recorder.count("release R1"), 1);
        assert_eq!(recorder.count("release R2"), 1);
    }
}

#[test]
fn release_failure_supersedes_pending_error_and_keeps_releasing() {
    let recorder = Recorder::new();
    let sink = MemorySink::new();
    let scope = ResourceScope::new()
        .acquire(TrackedResource::failing("R1", &recorder, AppError::new(Kind::Io, "close R1")))
        .acquire(TrackedResource::failing("R2", &recorder, AppError::new(Kind::Io, "close R2")))
        .acquire(TrackedResource::new("R3", &recorder));

    let result = attempt_with(scope, || Err(AppError::new(Kind::Fatal, "operation")))
        .with_sink(sink.clone())
        .if_raises(Kind::Io)
        .then_call(|_| {})
        .finally_try_done(|| Err(AppError::new(Kind::Validation, "cleanup")));

    assert_eq!(result, Err(AppError::new(Kind::Io, "close R1")));
    assert_eq!(recorder.calls(), vec!["release R3", "release R2", "release R1"]);
    assert!(sink.events().contains(&ChainEvent::Released { released: 3, failed: 2 }));
}

#[test]
fn release_failure_replaces_successful_value() {
    let recorder = Recorder::new();
    let scope = ResourceScope::new()
        .acquire(TrackedResource::failing("R1", &recorder, AppError::new(Kind::Io, "close")));

    let value =
        compute_with(scope, || Ok::<_, AppError>(1)).if_raises(Kind::Io).then_get(|_| 0).done();

    assert_eq!(value, Err(AppError::new(Kind::Io, "close")));
}

#[test]
fn deferred_closures_act_as_resources() {
    let recorder = Recorder::new();
    let scope: ResourceScope<'_, AppError> = ResourceScope::new()
        .defer(|| {
            recorder.record("close file");
            Ok(())
        })
        .defer(|| {
            recorder.record("unlock");
            Ok(())
        });

    attempt_with(scope, || Ok(()))
        .if_raises(Kind::Any)
        .then_call(|_| {})
        .done()
        .expect("success");

    assert_eq!(recorder.calls(), vec!["unlock", "close file"]);
}

#[test]
fn panicking_operation_still_releases_resources() {
    let recorder = Recorder::new();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        attempt_with(scope_of(&recorder, &["R1", "R2"]), || -> Result<(), AppError> {
            panic!("operation blew up")
        })
        .if_raises(Kind::Any)
        .then_call(|_| {})
        .done()
    }));

    assert!(outcome.is_err());
    assert_eq!(recorder.calls(), vec!["release R2", "release R1"]);
}

#[test]
fn abandoned_chain_releases_resources() {
    let recorder = Recorder::new();
    let protected = attempt_with(scope_of(&recorder, &["R1"]), || Ok::<(), AppError>(()));
    let err = protected.if_raises_any(Vec::new()).unwrap_err();

    assert_eq!(err.clause(), 0);
    assert_eq!(recorder.calls(), vec!["release R1"]);
}
