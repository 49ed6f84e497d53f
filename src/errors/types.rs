//! The structured error carrier shared by the scanner, parser, and
//! evaluator (spec §4.4).
//!
//! Rust's `Result` already gives us "is this an error" and "propagate
//! until handled" for free, so there is no `PBG_NONE` sentinel kind here
//! and no `free`/re-initialize-on-entry dance: those exist in the original
//! C implementation to manage a mutable out-parameter, a problem ownership
//! makes moot. [`PbgError`] only models the kind-specific payloads.

use thiserror::Error;

use crate::field::FieldType;

/// Where a `PbgError` was raised, for diagnostics (spec §4.4: "originating
/// file/line").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub file: &'static str,
    pub line: u32,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A structured error produced by the scanner, parser, or evaluator.
#[derive(Debug, Clone, Error)]
#[error("{kind} ({origin})")]
pub struct PbgError {
    pub kind: PbgErrorKind,
    pub origin: Origin,
}

/// Kind-specific payload for a [`PbgError`] (spec §4.4 table).
#[derive(Debug, Clone, Error)]
pub enum PbgErrorKind {
    /// Allocation failure. In a hosted Rust build the global allocator
    /// aborts the process on OOM rather than returning an error, so this
    /// variant exists for fidelity with spec §4.4's table and for
    /// allocator implementations that do return failure (e.g. fallible
    /// collection APIs); it is not reachable from the standard build.
    #[error("allocation failure")]
    Alloc,

    /// An internal invariant was violated — the parser's own bookkeeping
    /// disagreed with itself, or the evaluator encountered an operator
    /// that passed parsing but isn't recognized.
    #[error("{0}")]
    State(String),

    /// A syntactic defect detected by the scanner or parser, with the
    /// byte index in `source` where the defect was found.
    #[error("{message} at byte {index} in `{source_str}`")]
    Syntax {
        message: String,
        source_str: String,
        index: usize,
    },

    /// A field's bytes didn't match any recognized [`FieldType`].
    #[error("unknown field type for `{slice}` (length {length})")]
    UnknownType { slice: String, length: usize },

    /// An operator was given the wrong number of children.
    #[error("{op_type:?} does not accept arity {arity}")]
    OpArity { op_type: FieldType, arity: usize },

    /// An operator's operands had the wrong type for the operation
    /// (ill-typed equality/comparison/type-check).
    #[error("{0}")]
    OpArgType(String),
}

/// Prints `err` to stderr. A thin wrapper over `Display`, provided to
/// mirror spec §6's `print_error` entry in the API surface.
pub fn print_error(err: &PbgError) {
    eprintln!("{err}");
}

/// Builds a [`PbgError`] with its origin set to the call site.
macro_rules! pbg_err {
    ($kind:expr) => {
        $crate::errors::PbgError {
            kind: $kind,
            origin: $crate::errors::Origin {
                file: file!(),
                line: line!(),
            },
        }
    };
}

pub(crate) use pbg_err;
