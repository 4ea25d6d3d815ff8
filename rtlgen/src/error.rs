//! Error types.

use crate::graph::{Param, ParamKind};

use std::io;
use std::path::PathBuf;

/// Fatal errors raised while instantiating templates, generating arbitration logic, or emitting text.
///
/// None of these are transient; each one points at a builder call that has to be fixed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A template constraint names a parameter that the supplied arguments don't contain.
    #[error("missing type argument for parameter \"{param}\" of template \"{template}\"")]
    MissingTemplateArgument {
        /// Name of the template being instantiated.
        template: String,
        /// The parameter with no argument.
        param: String,
    },

    /// A template argument is present, but of a different kind than its constraint requires.
    #[error("type parameter \"{param}\" of template \"{template}\" must be {expected}, got {actual}")]
    TemplateKindMismatch {
        /// Name of the template being instantiated.
        template: String,
        /// The offending parameter.
        param: String,
        /// Kind required by the constraint.
        expected: ParamKind,
        /// Kind of the supplied argument.
        actual: ParamKind,
    },

    /// A template argument has the right kind, but a value the generator can't build from.
    #[error("invalid value {value} for parameter \"{param}\" of template \"{template}\": {reason}")]
    InvalidTemplateArgument {
        /// Name of the template being instantiated.
        template: String,
        /// The offending parameter.
        param: String,
        /// The rejected value.
        value: Param,
        /// What the generator requires instead.
        reason: String,
    },

    /// A template was instantiated before a generator function was set.
    #[error("no generator function set for template \"{template}\"")]
    MissingGenerator {
        /// Name of the template.
        template: String,
    },

    /// Arbitration logic was requested twice for the same mutex.
    #[error("arbitration logic for mutex \"{mutex}\" has already been generated")]
    ArbiterAlreadyGenerated {
        /// Name of the mutex.
        mutex: String,
    },

    /// The output file for emitted text couldn't be created.
    #[error("cannot create output file {}: {source}", .path.display())]
    OutputSink {
        /// Path that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Writing emitted text to the sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The code writer was unindented past column zero.
    #[error("code writer indent level underflow")]
    IndentUnderflow,
}

/// Non-fatal data error reported by [`Signal::check_width`](crate::Signal::check_width).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("width mismatch: {lhs} has width {lhs_width}, {rhs} has width {rhs_width}")]
pub struct WidthMismatch {
    /// Rendered name of the left-hand signal.
    pub lhs: String,
    /// Bit width of the left-hand signal.
    pub lhs_width: u32,
    /// Rendered name of the right-hand signal.
    pub rhs: String,
    /// Bit width of the right-hand signal.
    pub rhs_width: u32,
}
