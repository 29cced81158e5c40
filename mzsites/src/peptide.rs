use context_error::{BoxedError, Context, CreateError, FullErrorContent};

use crate::{
    error::ModificationError,
    modification::{ModificationPool, ObservedSite, ResolvedModification, combinatorial_count},
    site::{SequencePosition, Site, Terminal},
};

/// Isobaric labelling reagents, these are placed on the N terminus (and lysines) of all peptides
const LABEL_MODIFICATIONS: &[&str] = &[
    "TMT",
    "TMT2plex",
    "TMT6plex",
    "TMT10plex",
    "TMTpro",
    "TMTpro_zero",
    "iTRAQ4plex",
    "iTRAQ8plex",
];

/// A peptide as read from a search result before its modifications are resolved
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeptideHit {
    /// The protein accession
    pub accession: String,
    /// The protein description
    pub protein: String,
    /// The search engine query identifier
    pub query: usize,
    /// The name of the raw file the spectrum originates from
    pub file_name: String,
    /// The experimental precursor m/z
    pub precursor_mz: f64,
    /// The experimental precursor charge
    pub charge: isize,
    /// The peptide sequence, without any terminal tokens
    pub sequence: String,
    /// The scan number of the spectrum
    pub scan: usize,
    /// All modifications on residues, as the abbreviation and 0 based index into the sequence
    pub residue_modifications: Vec<(String, usize)>,
    /// All modifications on the termini
    pub terminal_modifications: Vec<(String, Terminal)>,
}

impl PeptideHit {
    /// All modifications on this peptide, residue modifications first
    pub fn observed_sites(&self) -> impl Iterator<Item = ObservedSite> + '_ {
        self.residue_modifications
            .iter()
            .map(|(abbreviation, index)| {
                ObservedSite::new(abbreviation.clone(), SequencePosition::Index(*index))
            })
            .chain(
                self.terminal_modifications
                    .iter()
                    .map(|(abbreviation, terminal)| ObservedSite::new(abbreviation.clone(), *terminal)),
            )
    }
}

/// A peptide spectrum match with all of its modifications resolved.
///
/// Two records are the same observation if the accession, query, sequence, and scan number are
/// identical, equality and hashing only consider these fields.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeptideRecord {
    /// The protein accession
    pub accession: String,
    /// The protein description
    pub protein: String,
    /// The search engine query identifier
    pub query: usize,
    /// The name of the raw file the spectrum originates from
    pub file_name: String,
    /// The experimental precursor m/z
    pub precursor_mz: f64,
    /// The experimental precursor charge
    pub charge: isize,
    /// The scan number of the spectrum
    pub scan: usize,
    sequence: String,
    variable_modifications: Vec<ResolvedModification>,
    fixed_modifications: Vec<ResolvedModification>,
    combinatorial_count: u128,
}

impl PeptideRecord {
    /// Resolve all modifications on this peptide and count the possible placements of the
    /// variable modifications.
    /// # Errors
    /// If any of the modifications could not be resolved, see [`ModificationPool::resolve`].
    pub fn resolve(pool: &ModificationPool, hit: PeptideHit) -> Result<Self, ModificationError> {
        let resolution = pool
            .resolve(&hit.sequence, hit.observed_sites())
            .map_err(|err| {
                BoxedError::new(
                    err.get_kind(),
                    "Could not resolve peptide modifications",
                    format!(
                        "The modifications for peptide {} (query {}, scan {}) could not be resolved",
                        hit.sequence, hit.query, hit.scan
                    ),
                    Context::none().source(hit.file_name.as_str()).to_owned(),
                )
                .add_underlying_errors(vec![err])
            })?;
        let (variable_modifications, fixed_modifications) = resolution.aggregate();
        let combinatorial_count = combinatorial_count(&hit.sequence, &variable_modifications);
        Ok(Self {
            accession: hit.accession,
            protein: hit.protein,
            query: hit.query,
            file_name: hit.file_name,
            precursor_mz: hit.precursor_mz,
            charge: hit.charge,
            scan: hit.scan,
            sequence: hit.sequence,
            variable_modifications,
            fixed_modifications,
            combinatorial_count,
        })
    }

    /// The peptide sequence
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// The variable modifications
    pub fn variable_modifications(&self) -> &[ResolvedModification] {
        &self.variable_modifications
    }

    /// The fixed modifications
    pub fn fixed_modifications(&self) -> &[ResolvedModification] {
        &self.fixed_modifications
    }

    /// All modifications, variable modifications first
    pub fn modifications(&self) -> impl Iterator<Item = &ResolvedModification> {
        self.variable_modifications
            .iter()
            .chain(&self.fixed_modifications)
    }

    /// The number of distinguishable placements of the variable modifications
    pub const fn combinatorial_count(&self) -> u128 {
        self.combinatorial_count
    }

    /// Check if there is more than one way to place the variable modifications, if so the
    /// placement has to be validated manually.
    pub const fn is_ambiguous(&self) -> bool {
        self.combinatorial_count > 1
    }

    /// Check if some variable modification occurs more often than it has sites on this peptide
    pub const fn is_inconsistent(&self) -> bool {
        self.combinatorial_count == 0
    }

    /// The isobaric labels placed on the N terminus of this peptide
    pub fn label_modifications(&self) -> impl Iterator<Item = &str> {
        self.modifications()
            .filter(|m| {
                m.residues.contains(&Site::NTerm)
                    && LABEL_MODIFICATIONS.contains(&m.abbreviation.as_str())
            })
            .map(|m| m.abbreviation.as_str())
    }

    /// The number of C13 isotopes in the precursor that was selected for fragmentation, based on
    /// the difference between the experimental and isolation m/z.
    pub fn c13_count(&self, isolation_mz: f64) -> usize {
        (self.charge as f64 * (self.precursor_mz - isolation_mz).abs()).round() as usize
    }

    fn identity(&self) -> (&str, usize, &str, usize) {
        (&self.accession, self.query, &self.sequence, self.scan)
    }
}

impl PartialEq for PeptideRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for PeptideRecord {}

impl std::hash::Hash for PeptideRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl std::fmt::Display for PeptideRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, query {}, scan {})",
            self.sequence, self.accession, self.query, self.scan
        )
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::ModificationErrorKind;

    fn pool() -> ModificationPool {
        ModificationPool::build(
            ["Carbamidomethyl (C)", "TMT6plex (N-term)", "TMT6plex (K)"],
            ["Oxidation (M)", "Dioxidation (M)", "Phospho (ST)", "Phospho (Y)"],
        )
        .unwrap()
    }

    fn hit(sequence: &str, scan: usize) -> PeptideHit {
        PeptideHit {
            accession: "P31749".to_string(),
            protein: "RAC-alpha serine/threonine-protein kinase".to_string(),
            query: 12,
            file_name: "run_01.raw".to_string(),
            precursor_mz: 512.7765,
            charge: 2,
            sequence: sequence.to_string(),
            scan,
            ..Default::default()
        }
    }

    #[test]
    fn resolve_record() {
        let mut peptide = hit("MSCPTMKY", 1024);
        peptide.residue_modifications = vec![
            ("Oxidation".to_string(), 0),
            ("Carbamidomethyl".to_string(), 2),
            ("Phospho".to_string(), 1),
            ("Dioxidation".to_string(), 5),
            ("TMT6plex".to_string(), 6),
        ];
        peptide.terminal_modifications = vec![("TMT6plex".to_string(), Terminal::N)];
        let record = PeptideRecord::resolve(&pool(), peptide).unwrap();

        assert_eq!(record.sequence(), "MSCPTMKY");
        assert_eq!(
            record.variable_modifications(),
            &[
                ResolvedModification::new(1, "Oxidation", [Site::Residue('M')]),
                ResolvedModification::new(1, "Phospho", [Site::Residue('S'), Site::Residue('T')]),
                ResolvedModification::new(1, "Dioxidation", [Site::Residue('M')]),
            ]
        );
        assert_eq!(record.fixed_modifications().len(), 3);
        assert_eq!(record.modifications().map(|m| m.count).sum::<usize>(), 6);
        // Oxidation: C(2 - 1, 1), Phospho: C(3, 1), Dioxidation: C(2 - 1, 1)
        assert_eq!(record.combinatorial_count(), 3);
        assert!(record.is_ambiguous());
        assert!(!record.is_inconsistent());
        assert_eq!(record.label_modifications().collect::<Vec<_>>(), vec!["TMT6plex"]);
    }

    #[test]
    fn unambiguous_without_modifications() {
        let record = PeptideRecord::resolve(&pool(), hit("PEPTIDE", 1)).unwrap();
        assert_eq!(record.combinatorial_count(), 1);
        assert!(!record.is_ambiguous());
        assert_eq!(record.label_modifications().count(), 0);
    }

    #[test]
    fn unknown_modification_rejects_record() {
        let mut peptide = hit("PEPTIDE", 1);
        peptide.residue_modifications = vec![("Deamidated".to_string(), 0)];
        let error = PeptideRecord::resolve(&pool(), peptide).unwrap_err();
        assert_eq!(error.get_kind(), ModificationErrorKind::UnknownModification);
    }

    #[test]
    fn identity() {
        let a = PeptideRecord::resolve(&pool(), hit("PEPTIDE", 1)).unwrap();
        let mut other = hit("PEPTIDE", 1);
        other.precursor_mz = 100.0;
        other.file_name = "run_02.raw".to_string();
        let b = PeptideRecord::resolve(&pool(), other).unwrap();
        let c = PeptideRecord::resolve(&pool(), hit("PEPTIDE", 2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn c13() {
        let record = PeptideRecord::resolve(&pool(), hit("PEPTIDE", 1)).unwrap();
        assert_eq!(record.c13_count(512.7765), 0);
        assert_eq!(record.c13_count(512.2748), 1);
        assert_eq!(record.c13_count(513.7800), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialise() {
        let record = PeptideRecord::resolve(&pool(), hit("PEPTIDE", 1)).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let back: PeptideRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
        assert_eq!(back.combinatorial_count(), 1);
    }
}
