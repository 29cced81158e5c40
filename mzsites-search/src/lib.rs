#![doc = include_str!("../README.md")]

/// The error type for reading search files
pub mod error;
pub mod formats;
mod helper_functions;
mod source;

pub use source::*;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use context_error::FullErrorContent;
    pub use crate::error::{SearchError, SearchErrorKind};
    pub use crate::source::{SearchFileFormat, SearchHits, SearchResults, open_search_file};
}
