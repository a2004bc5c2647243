use thiserror::Error;

/// Errors produced while validating detector and matcher configuration.
///
/// Everything is checked up front by the constructors; once a
/// [`Harris`](crate::Harris) or [`PatchMatcher`](crate::PatchMatcher) exists,
/// detection and matching cannot fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{name} must be an odd number, got {value}")]
    EvenWindowSize { name: &'static str, value: usize },
    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("invalid matching method {0:?}, expected \"ssd\" or \"ncc\"")]
    UnknownMatchingMethod(String),
}

pub(crate) fn ensure_odd(name: &'static str, value: usize) -> Result<(), Error> {
    if value % 2 == 1 {
        Ok(())
    } else {
        Err(Error::EvenWindowSize { name, value })
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositive { name, value })
    }
}
