//! Specification pattern for composable query filters
//!
//! Specifications are predicate objects handed to the repository's
//! filtered find. They compose with boolean logic so callers can build
//! richer filters without the repository learning about them.

use std::marker::PhantomData;

/// Predicate over candidate records
pub trait Specification<T>: Send + Sync {
    /// Check whether the candidate satisfies this specification
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// Combine with another specification using AND
    fn and<S>(self, other: S) -> And<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        And {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Combine with another specification using OR
    fn or<S>(self, other: S) -> Or<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        Or {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Negate this specification
    fn not(self) -> Not<T>
    where
        Self: Sized + 'static,
    {
        Not {
            inner: Box::new(self),
        }
    }
}

/// AND composite
pub struct And<T> {
    left: Box<dyn Specification<T>>,
    right: Box<dyn Specification<T>>,
}

impl<T: Send + Sync> Specification<T> for And<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// OR composite
pub struct Or<T> {
    left: Box<dyn Specification<T>>,
    right: Box<dyn Specification<T>>,
}

impl<T: Send + Sync> Specification<T> for Or<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) || self.right.is_satisfied_by(candidate)
    }
}

/// NOT wrapper
pub struct Not<T> {
    inner: Box<dyn Specification<T>>,
}

impl<T: Send + Sync> Specification<T> for Not<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}

/// Closure-backed specification
pub struct Predicate<T, F> {
    check: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> Specification<T> for Predicate<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.check)(candidate)
    }
}

/// Build a specification from a closure
pub fn predicate<T, F>(check: F) -> Predicate<T, F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    Predicate {
        check,
        _marker: PhantomData,
    }
}

/// Specification matching every candidate
pub fn all<T>() -> Predicate<T, fn(&T) -> bool> {
    predicate(|_| true)
}
