use std::path::Path;

use context_error::{BoxedError, Context, CreateError, FullErrorContent};
use itertools::Itertools;
use mzsites::{
    modification::ModificationPool,
    peptide::{PeptideHit, PeptideRecord},
    process::{Progress, resolve_peptides},
};

use crate::{
    error::{SearchError, SearchErrorKind},
    helper_functions::actual_extension,
};

/// The search engines that results can be read from
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SearchFileFormat {
    /// ProteomeDiscoverer, a SQLite database with the `.msf` extension
    ProteomeDiscoverer,
    /// Mascot XML export, with the `.xml` extension and optionally gzipped
    Mascot,
}

impl SearchFileFormat {
    /// All supported formats
    pub const ALL: &[Self] = &[Self::ProteomeDiscoverer, Self::Mascot];

    /// The extension that identifies this format
    pub const fn extension(self) -> &'static str {
        match self {
            Self::ProteomeDiscoverer => "msf",
            Self::Mascot => "xml",
        }
    }

    /// Determine the format from the extension of the path, ignoring case and a trailing `.gz`
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = actual_extension(path.as_ref())?;
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extension() == extension)
    }

    fn read(self, path: &Path) -> Result<SearchHits, SearchError> {
        match self {
            #[cfg(feature = "discoverer")]
            Self::ProteomeDiscoverer => crate::formats::read_discoverer_msf(path),
            #[cfg(feature = "mascot")]
            Self::Mascot => crate::formats::read_mascot_xml(path),
            #[allow(unreachable_patterns)]
            _ => Err(BoxedError::new(
                SearchErrorKind::UnknownFormat,
                "Format not supported",
                format!("Support for {self} files is not enabled in this build"),
                Context::none().source(path.to_string_lossy()).to_owned(),
            )),
        }
    }
}

impl std::fmt::Display for SearchFileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::ProteomeDiscoverer => "ProteomeDiscoverer",
                Self::Mascot => "Mascot",
            }
        )
    }
}

/// The raw contents of a search result file, before the modifications are resolved
#[derive(Clone, Debug, Default)]
pub struct SearchHits {
    /// The fixed modification declarations, as `[<count> ]<name> (<sites>)`
    pub fixed_modifications: Vec<String>,
    /// The variable modification declarations, as `[<count> ]<name> (<sites>)`
    pub variable_modifications: Vec<String>,
    /// All top ranked peptides
    pub peptides: Vec<PeptideHit>,
}

impl SearchHits {
    /// Build the modification pool from the declarations and resolve all peptides.
    /// # Errors
    /// If any declaration is invalid or any peptide has an undeclared modification.
    pub fn resolve(self, progress: Option<Progress<'_>>) -> Result<SearchResults, SearchError> {
        let pool = ModificationPool::build(&self.fixed_modifications, &self.variable_modifications)
            .map_err(|err| err.convert::<_, SearchError>(|_| SearchErrorKind::Modification))?;
        let total = self.peptides.len();
        let peptides = resolve_peptides(&pool, self.peptides, progress)
            .map_err(|err| err.convert::<_, SearchError>(|_| SearchErrorKind::Modification))?;
        log::debug!(
            "Resolved {} peptides, {} duplicates removed",
            peptides.len(),
            total - peptides.len()
        );
        Ok(SearchResults {
            fixed_modifications: self.fixed_modifications,
            variable_modifications: self.variable_modifications,
            peptides,
        })
    }
}

/// The results of a single search with all modifications resolved
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    /// The fixed modification declarations
    pub fixed_modifications: Vec<String>,
    /// The variable modification declarations
    pub variable_modifications: Vec<String>,
    /// All unique peptides, ordered on scan number
    pub peptides: Vec<PeptideRecord>,
}

impl SearchResults {
    /// The peptides for which the placement of the variable modifications is ambiguous
    pub fn ambiguous(&self) -> impl Iterator<Item = &PeptideRecord> {
        self.peptides.iter().filter(|p| p.is_ambiguous())
    }
}

/// Open the selected path and determine the search engine based on the extension. Gzipped Mascot
/// files are decompressed automatically. The progress callback is called for every resolved
/// peptide.
///
/// # Errors
/// If the extension is not recognised, the file could not be read, or the modifications could not
/// be resolved.
pub fn open_search_file(
    path: impl AsRef<Path>,
    progress: Option<Progress<'_>>,
) -> Result<SearchResults, SearchError> {
    let path = path.as_ref();
    let format = SearchFileFormat::from_path(path).ok_or_else(|| {
        BoxedError::new(
            SearchErrorKind::UnknownFormat,
            "Unknown extension",
            format!(
                "Use {}, or xml.gz for gzipped Mascot files",
                SearchFileFormat::ALL
                    .iter()
                    .map(|f| format!("{} ({f})", f.extension().to_uppercase()))
                    .join(", ")
            ),
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    })?;
    log::info!("Using {format} backend for {}", path.display());
    format.read(path)?.resolve(progress)
}
