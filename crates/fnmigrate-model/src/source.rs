//! Legacy state collaborators
//!
//! Interfaces through which a migration run obtains legacy records. The HTTP
//! implementations live in the CLI crate; tests use in-memory ones.

use crate::error::FetchError;
use crate::legacy::Function;
use crate::snapshot::LegacyState;

/// Supplies the six legacy collections
pub trait StateSource {
    /// Retrieve every legacy collection
    ///
    /// The returned state has an empty name-change table.
    ///
    /// # Errors
    /// Any retrieval failure.
    fn fetch_state(&self) -> Result<LegacyState, FetchError>;
}

/// Supplies the authoritative record of one function
pub trait FunctionSource {
    /// Fetch the function named `name`, pinned to `uid` when given
    ///
    /// # Errors
    /// [`FetchError::NotFound`] when no such function exists.
    fn fetch_function(&self, name: &str, uid: Option<&str>) -> Result<Function, FetchError>;
}

impl<T: FunctionSource + ?Sized> FunctionSource for &T {
    fn fetch_function(&self, name: &str, uid: Option<&str>) -> Result<Function, FetchError> {
        (**self).fetch_function(name, uid)
    }
}
