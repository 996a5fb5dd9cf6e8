/// Result of running a step or a whole pipeline.
///
/// A value is a failure if and only if it is tagged [`Outcome::Failure`];
/// the payload type plays no part in the decision. Plain values returned by
/// steps are lifted into [`Outcome::Success`] at the step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Outcome<T> {
    /// The step completed and produced a value.
    Success(T),
    /// The step failed deliberately; remaining steps are skipped.
    Failure(T),
}

impl<T> Outcome<T> {
    /// Returns `true` if the outcome is tagged as a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns `true` unless the outcome is tagged as a failure.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !self.is_failure()
    }

    /// Retags the outcome as a failure, keeping its payload.
    ///
    /// Failures are returned unchanged, so the conversion is idempotent.
    pub fn into_failure(self) -> Self {
        match self {
            Self::Success(value) | Self::Failure(value) => Self::Failure(value),
        }
    }

    /// Borrow the payload regardless of the tag.
    #[must_use]
    pub const fn payload(&self) -> &T {
        match self {
            Self::Success(value) | Self::Failure(value) => value,
        }
    }

    /// Unwrap the payload regardless of the tag.
    #[must_use]
    pub fn into_payload(self) -> T {
        match self {
            Self::Success(value) | Self::Failure(value) => value,
        }
    }

    /// Transform the payload, preserving the tag.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(value) => Outcome::Failure(f(value)),
        }
    }

    /// Converts into a standard [`Result`], with the failure payload as the error.
    ///
    /// # Errors
    ///
    /// Returns the payload as `Err` when the outcome is a failure.
    pub fn into_result(self) -> Result<T, T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(value) => Err(value),
        }
    }
}

impl<T> From<Result<T, T>> for Outcome<T> {
    fn from(result: Result<T, T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(value) => Self::Failure(value),
        }
    }
}

/// Returns `true` if `outcome` is tagged as a failure.
#[must_use]
pub const fn is_failure<T>(outcome: &Outcome<T>) -> bool {
    outcome.is_failure()
}

/// Returns `true` unless `outcome` is tagged as a failure.
#[must_use]
pub const fn is_success<T>(outcome: &Outcome<T>) -> bool {
    outcome.is_success()
}

/// Converts `outcome` into a failure if it is not one already.
pub fn to_failure<T>(outcome: Outcome<T>) -> Outcome<T> {
    outcome.into_failure()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_successes_are_not_failures() {
        for value in [0_i64, 5, -1] {
            let outcome = Outcome::Success(value);
            assert!(!is_failure(&outcome));
            assert!(is_success(&outcome));
        }
    }

    #[test]
    fn tagged_failure_is_a_failure() {
        let outcome = Outcome::Failure("abc");

        assert!(is_failure(&outcome));
        assert!(!is_success(&outcome));
    }

    #[test]
    fn payload_type_does_not_decide_the_tag() {
        assert!(Outcome::Success(false).is_success());
        assert!(Outcome::Failure(true).is_failure());
    }

    #[test]
    fn to_failure_wraps_success() {
        assert_eq!(to_failure(Outcome::Success(true)), Outcome::Failure(true));
        assert_eq!(to_failure(Outcome::Success("abc")), Outcome::Failure("abc"));
    }

    #[test]
    fn to_failure_is_idempotent() {
        let once = to_failure(Outcome::Success(42));
        let twice = to_failure(once);

        assert_eq!(once, twice);
        assert!(twice.is_failure());
    }

    #[test]
    fn failures_compare_by_payload() {
        assert_eq!(Outcome::Failure("x"), Outcome::Failure("x"));
        assert_ne!(Outcome::Failure("x"), Outcome::Failure("y"));
        assert_ne!(Outcome::Failure("x"), Outcome::Success("x"));
    }

    #[test]
    fn map_keeps_the_tag() {
        assert_eq!(Outcome::Success(2).map(|n| n * 10), Outcome::Success(20));
        assert_eq!(Outcome::Failure(2).map(|n| n * 10), Outcome::Failure(20));
    }

    #[test]
    fn into_result_round_trips_through_from() {
        let failed: Outcome<&str> = Outcome::from(Err("nope"));

        assert_eq!(failed.into_result(), Err("nope"));
        assert_eq!(Outcome::Success(1).into_result(), Ok(1));
    }

    #[test]
    fn payload_accessors_ignore_the_tag() {
        let failure = Outcome::Failure(String::from("boom"));

        assert_eq!(failure.payload(), "boom");
        assert_eq!(failure.into_payload(), "boom");
    }
}
