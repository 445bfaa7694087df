//! Typed checks against an engine's observable state.
//!
//! An engine call that errors inside a check is a precondition failure and
//! aborts (`fatal`). A mismatch between expected and observed state is a
//! verification failure and is recorded (`error`) so the rest of the test
//! can still surface further problems.

use std::fmt::Debug;

use kvprobe_core::{Engine, Result};

use crate::report::Reporter;

fn show(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Key must exist.
pub fn assert_key_exists<R, E>(r: &R, engine: &E, key: &[u8])
where
    R: Reporter + ?Sized,
    E: Engine + ?Sized,
{
    match engine.exists(key) {
        Ok(true) => {}
        Ok(false) => r.error(&format!("expected key {:?} to exist", show(key))),
        Err(e) => r.fatal(&format!("exists({:?}) failed: {}", show(key), e)),
    }
}

/// Key must not exist.
pub fn assert_key_not_exists<R, E>(r: &R, engine: &E, key: &[u8])
where
    R: Reporter + ?Sized,
    E: Engine + ?Sized,
{
    match engine.exists(key) {
        Ok(false) => {}
        Ok(true) => r.error(&format!("expected key {:?} not to exist", show(key))),
        Err(e) => r.fatal(&format!("exists({:?}) failed: {}", show(key), e)),
    }
}

/// Key must hold exactly `expected`.
pub fn assert_key_value<R, E>(r: &R, engine: &E, key: &[u8], expected: &[u8])
where
    R: Reporter + ?Sized,
    E: Engine + ?Sized,
{
    match engine.get(key) {
        Ok(actual) if actual == expected => {}
        Ok(actual) => r.error(&format!(
            "key {:?}: expected value {:?}, got {:?}",
            show(key),
            show(expected),
            show(&actual)
        )),
        Err(e) => r.fatal(&format!("get({:?}) failed: {}", show(key), e)),
    }
}

/// `actual` must equal `expected`.
pub fn assert_equal<R, T>(r: &R, expected: T, actual: T, what: &str)
where
    R: Reporter + ?Sized,
    T: PartialEq + Debug,
{
    if expected != actual {
        r.error(&format!("{}: expected {:?}, got {:?}", what, expected, actual));
    }
}

/// `actual` must differ from `unexpected`.
pub fn assert_not_equal<R, T>(r: &R, unexpected: T, actual: T, what: &str)
where
    R: Reporter + ?Sized,
    T: PartialEq + Debug,
{
    if unexpected == actual {
        r.error(&format!("{}: did not expect {:?}", what, actual));
    }
}

/// Byte-exact equality.
pub fn assert_bytes_equal<R>(r: &R, expected: &[u8], actual: &[u8], what: &str)
where
    R: Reporter + ?Sized,
{
    if expected != actual {
        r.error(&format!(
            "{}: expected {} bytes {:?}, got {} bytes {:?}",
            what,
            expected.len(),
            show(expected),
            actual.len(),
            show(actual)
        ));
    }
}

/// Condition must hold.
pub fn assert_true<R: Reporter + ?Sized>(r: &R, condition: bool, what: &str) {
    if !condition {
        r.error(&format!("{}: expected true", what));
    }
}

/// Condition must not hold.
pub fn assert_false<R: Reporter + ?Sized>(r: &R, condition: bool, what: &str) {
    if condition {
        r.error(&format!("{}: expected false", what));
    }
}

/// Result must be `Ok`; returns the value, aborting otherwise.
pub fn require_ok<R, T>(r: &R, result: Result<T>, what: &str) -> T
where
    R: Reporter + ?Sized,
{
    match result {
        Ok(value) => value,
        Err(e) => r.fatal(&format!("{}: unexpected error: {}", what, e)),
    }
}

/// Result must be `Err`.
pub fn assert_err<R, T>(r: &R, result: &Result<T>, what: &str)
where
    R: Reporter + ?Sized,
    T: Debug,
{
    if let Ok(value) = result {
        r.error(&format!("{}: expected an error, got Ok({:?})", what, value));
    }
}

/// Result must be an error classified as "not found".
pub fn assert_not_found<R, T>(r: &R, result: &Result<T>, what: &str)
where
    R: Reporter + ?Sized,
    T: Debug,
{
    match result {
        Err(e) if e.is_not_found() => {}
        Err(e) => r.error(&format!("{}: expected a not-found error, got: {}", what, e)),
        Ok(value) => r.error(&format!(
            "{}: expected a not-found error, got Ok({:?})",
            what, value
        )),
    }
}
