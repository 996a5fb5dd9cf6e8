//! Readability helpers for the return value of a step.

use crate::outcome::Outcome;

/// Mark `value` as the successful result of a step.
pub fn success<T>(value: T) -> Outcome<T> {
    Outcome::Success(value)
}

/// Mark `value` as the failed result of a step.
pub fn failure<T>(value: T) -> Outcome<T> {
    Outcome::Success(value).into_failure()
}

/// Default success marker, carrying `true`.
pub fn succeed() -> Outcome<bool> {
    success(true)
}

/// Default failure marker, carrying `false`.
pub fn fail() -> Outcome<bool> {
    failure(false)
}
