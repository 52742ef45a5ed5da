//! Failure reporting for the `coverage-rollup` binary.
//!
//! Reading a snapshot, running the aggregator and serializing the report all
//! fail with different error types. The binary folds them into one boxed
//! [`LocatedError`] that remembers which call site in `main.rs` gave up.
use std::error::Error;
use std::fmt::Display;
use std::panic::Location;

/// A failure message tagged with the source location that raised it.
#[derive(Debug, thiserror::Error)]
#[error("{message} at {file}:{line}")]
pub struct LocatedError {
    message: String,
    file: &'static str,
    line: u32,
}

impl LocatedError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Box `err` as a [`LocatedError`] pointing at the caller.
#[track_caller]
pub fn error_with_location<E>(err: E) -> Box<dyn Error>
where
    E: Display,
{
    let loc = Location::caller();
    Box::new(LocatedError {
        message: err.to_string(),
        file: loc.file(),
        line: loc.line(),
    })
}

/// Unwrap a `Result` or return its error as a [`LocatedError`].
///
/// Extra arguments are formatted as context and prefixed to the message,
/// e.g. `loc_try!(load_snapshot(&path), "snapshot {}", path.display())`.
#[macro_export]
macro_rules! loc_try {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => {
                return Err($crate::error_with_location(err));
            }
        }
    };
    ($expr:expr, $($ctx:tt)+) => {
        match $expr {
            Ok(val) => val,
            Err(err) => {
                return Err($crate::error_with_location(format!(
                    "{}: {}",
                    format!($($ctx)+),
                    err
                )));
            }
        }
    };
}
