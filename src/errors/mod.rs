//! The error carrier used across the scanner, parser, and evaluator.
//!
//! # Usage
//!
//! ```
//! use pbg::errors::{PbgError, is_error};
//!
//! fn might_fail() -> Result<(), PbgError> {
//!     Ok(())
//! }
//!
//! let result = might_fail();
//! assert!(!is_error(&result));
//! ```

pub mod types;

pub use types::{print_error, Origin, PbgError, PbgErrorKind};
pub(crate) use types::pbg_err;

/// `true` iff `result` is `Err`. A thin convenience matching spec §6's
/// `is_error(err) -> bool` entry in the API surface; idiomatic callers
/// should just match on the `Result` directly.
pub fn is_error<T>(result: &Result<T, PbgError>) -> bool {
    result.is_err()
}
