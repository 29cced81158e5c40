#![doc = include_str!("../README.md")]

/// The error type for all modification handling
pub mod error;
pub mod modification;
/// Peptide spectrum matches and their resolved modifications
pub mod peptide;
/// Resolving all peptides from a single search at once
pub mod process;
/// Sites on a peptide that a modification can be placed on
pub mod site;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use context_error::FullErrorContent;
    pub use crate::error::{ModificationError, ModificationErrorKind};
    pub use crate::modification::{
        ModificationClass, ModificationPool, ModificationSpec, ObservedSite, ResolvedModification,
        combinatorial_count,
    };
    pub use crate::peptide::{PeptideHit, PeptideRecord};
    pub use crate::process::resolve_peptides;
    pub use crate::site::{SequencePosition, Site, Terminal};
}
