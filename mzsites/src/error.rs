//! The [`ModificationErrorKind`] which makes it easy for downstream users of the error type to match on the exact error.

use context_error::{BoxedError, ErrorKind};

/// The kind of error that can occur while building the modification dictionary or resolving the
/// modifications of a peptide
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ModificationErrorKind {
    /// A modification declaration did not follow the `[<count> ]<name> (<sites>)` grammar
    #[default]
    ConfigParse,
    /// An observed modification has no declared counterpart in either the fixed or variable pool
    UnknownModification,
    /// An observed modification points to a position outside of the peptide sequence
    InvalidPosition,
}

impl ErrorKind for ModificationErrorKind {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        "error"
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

/// The error type for all fallible operations in this crate
pub type ModificationError = BoxedError<'static, ModificationErrorKind>;
