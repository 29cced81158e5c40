//! The [`SearchErrorKind`] for everything that can go wrong while reading a search result file.

use context_error::{BoxedError, ErrorKind};

/// The kind of error that can occur while reading a search result file
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SearchErrorKind {
    /// The file could not be opened or read
    #[default]
    Io,
    /// The file extension does not belong to any supported search engine
    UnknownFormat,
    /// The ProteomeDiscoverer database could not be queried
    Database,
    /// The Mascot file is not valid XML
    Xml,
    /// A required field is missing or could not be interpreted
    Malformed,
    /// The modifications in the file could not be declared or resolved
    Modification,
}

impl ErrorKind for SearchErrorKind {
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

/// The error type for reading search result files
pub type SearchError = BoxedError<'static, SearchErrorKind>;
