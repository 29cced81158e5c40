use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    modification::{ModificationSpec, Resolution},
    site::Site,
};

/// A modification type found on a peptide with the number of times it was found
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedModification {
    /// The number of occurrences on the peptide, always at least 1
    pub count: usize,
    /// The abbreviation of the modification
    pub abbreviation: String,
    /// All declared sites for this modification, not only the sites that were hit
    pub residues: BTreeSet<Site>,
}

impl ResolvedModification {
    /// Create a new resolved modification
    pub fn new(
        count: usize,
        abbreviation: impl Into<String>,
        residues: impl IntoIterator<Item = Site>,
    ) -> Self {
        Self {
            count,
            abbreviation: abbreviation.into(),
            residues: residues.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for ResolvedModification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} (", self.count, self.abbreviation)?;
        for site in &self.residues {
            write!(f, "{site}")?;
        }
        write!(f, ")")
    }
}

/// Count the number of times each declaration occurs. The groups are returned in order of first
/// occurrence.
pub fn aggregate<'a>(
    declarations: impl IntoIterator<Item = &'a ModificationSpec>,
) -> Vec<ResolvedModification> {
    let mut counts: IndexMap<&ModificationSpec, usize> = IndexMap::new();
    for spec in declarations {
        *counts.entry(spec).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(spec, count)| ResolvedModification {
            count,
            abbreviation: spec.abbreviation().to_string(),
            residues: spec.target_sites().clone(),
        })
        .collect()
}

impl Resolution<'_> {
    /// Aggregate the classified modifications, returns the variable and fixed modifications in
    /// that order.
    pub fn aggregate(&self) -> (Vec<ResolvedModification>, Vec<ResolvedModification>) {
        (
            aggregate(self.variable.iter().map(|(spec, _)| *spec)),
            aggregate(self.fixed.iter().map(|(spec, _)| *spec)),
        )
    }
}
