use context_error::{BoxedError, Context, CreateError};

use crate::{
    error::{ModificationError, ModificationErrorKind},
    modification::{ModificationClass, ModificationPool, ModificationSpec},
    site::{SequencePosition, Site},
};

/// A single modification as reported by a search engine for a peptide
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservedSite {
    /// The abbreviation of the modification, this does not have to be unique over all
    /// declarations, the site is used to disambiguate
    pub abbreviation: String,
    /// Where the modification is placed
    pub locus: SequencePosition,
}

impl ObservedSite {
    /// Create a new observed modification
    pub fn new(abbreviation: impl Into<String>, locus: impl Into<SequencePosition>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            locus: locus.into(),
        }
    }
}

/// The observed modifications of a peptide classified into the fixed and variable pool
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Resolution<'pool> {
    /// All variable modifications with the declaration they belong to
    pub variable: Vec<(&'pool ModificationSpec, ObservedSite)>,
    /// All fixed modifications with the declaration they belong to
    pub fixed: Vec<(&'pool ModificationSpec, ObservedSite)>,
}

impl<'pool> Resolution<'pool> {
    /// The total number of classified modifications
    pub fn len(&self) -> usize {
        self.variable.len() + self.fixed.len()
    }

    /// Check if no modifications were classified
    pub fn is_empty(&self) -> bool {
        self.variable.is_empty() && self.fixed.is_empty()
    }

    /// Get all classified modifications with their class
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (ModificationClass, &'pool ModificationSpec, &ObservedSite)> {
        self.variable
            .iter()
            .map(|(spec, hit)| (ModificationClass::Variable, *spec, hit))
            .chain(
                self.fixed
                    .iter()
                    .map(|(spec, hit)| (ModificationClass::Fixed, *spec, hit)),
            )
    }
}

impl ModificationPool {
    /// Classify all observed modifications on the given sequence as fixed or variable.
    /// # Errors
    /// * If an internal modification is placed outside of the sequence.
    /// * If no declaration in either pool matches the abbreviation and site of an observed
    ///   modification.
    pub fn resolve(
        &self,
        sequence: &str,
        observed: impl IntoIterator<Item = ObservedSite>,
    ) -> Result<Resolution<'_>, ModificationError> {
        let mut resolution = Resolution::default();
        for hit in observed {
            let site = Site::at(sequence, hit.locus).ok_or_else(|| {
                BoxedError::new(
                    ModificationErrorKind::InvalidPosition,
                    "Invalid modification position",
                    format!(
                        "The modification '{}' is placed at index {} which is outside of the sequence of length {}",
                        hit.abbreviation,
                        hit.locus,
                        sequence.chars().count()
                    ),
                    Context::show(sequence).to_owned(),
                )
            })?;
            match self.find(&hit.abbreviation, site) {
                Some((ModificationClass::Variable, spec)) => resolution.variable.push((spec, hit)),
                Some((ModificationClass::Fixed, spec)) => resolution.fixed.push((spec, hit)),
                None => {
                    return Err(BoxedError::new(
                        ModificationErrorKind::UnknownModification,
                        "Unexpected modification",
                        format!(
                            "The modification '{}' on {site} is not declared as a fixed or variable modification",
                            hit.abbreviation
                        ),
                        Context::show(sequence).to_owned(),
                    ));
                }
            }
        }
        Ok(resolution)
    }
}
