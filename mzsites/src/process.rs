use std::sync::atomic::{AtomicUsize, Ordering};

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    error::ModificationError,
    modification::ModificationPool,
    peptide::{PeptideHit, PeptideRecord},
};

/// A callback that is given the number of resolved peptides and the total number of peptides
pub type Progress<'a> = &'a (dyn Fn(usize, usize) + Sync);

/// Resolve all peptides from a single search. With the `rayon` feature the peptides are resolved
/// in parallel. Duplicate observations (see [`PeptideRecord`]) are removed, keeping the first
/// one, and the records are ordered on scan number.
/// # Errors
/// If any peptide could not be resolved, in which case no records are returned at all.
pub fn resolve_peptides(
    pool: &ModificationPool,
    hits: Vec<PeptideHit>,
    progress: Option<Progress<'_>>,
) -> Result<Vec<PeptideRecord>, ModificationError> {
    let total = hits.len();
    let done = AtomicUsize::new(0);
    let resolve = |hit: PeptideHit| {
        let record = PeptideRecord::resolve(pool, hit);
        if let Some(progress) = progress {
            progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
        }
        record
    };

    #[cfg(feature = "rayon")]
    let records = hits
        .into_par_iter()
        .map(resolve)
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let records = hits
        .into_iter()
        .map(resolve)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(deduplicate_and_sort(records))
}

/// Remove duplicate observations, keeping the first occurrence, and sort on scan number. Records
/// with the same scan number keep their relative order.
pub fn deduplicate_and_sort(records: impl IntoIterator<Item = PeptideRecord>) -> Vec<PeptideRecord> {
    let mut records: Vec<_> = records.into_iter().unique().collect();
    records.sort_by_key(|record| record.scan);
    records
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::sync::Mutex;

    use context_error::FullErrorContent;

    use super::*;
    use crate::{error::ModificationErrorKind, site::Terminal};

    fn pool() -> ModificationPool {
        ModificationPool::build(["Carbamidomethyl (C)"], ["Oxidation (M)", "Acetyl (N-term)"])
            .unwrap()
    }

    fn hit(accession: &str, sequence: &str, scan: usize) -> PeptideHit {
        PeptideHit {
            accession: accession.to_string(),
            query: scan,
            sequence: sequence.to_string(),
            scan,
            ..Default::default()
        }
    }

    #[test]
    fn ordered_and_unique() {
        let mut oxidised = hit("P1", "MPEPMK", 30);
        oxidised.residue_modifications = vec![("Oxidation".to_string(), 4)];
        oxidised.terminal_modifications = vec![("Acetyl".to_string(), Terminal::N)];
        let hits = vec![
            oxidised,
            hit("P1", "PEPTIDE", 10),
            hit("P2", "PEPTIDE", 10),
            hit("P1", "PEPTIDE", 10),
            hit("P1", "CPEPTIDE", 20),
        ];
        let records = resolve_peptides(&pool(), hits, None).unwrap();
        assert_eq!(
            records
                .iter()
                .map(|r| (r.accession.as_str(), r.scan))
                .collect::<Vec<_>>(),
            vec![("P1", 10), ("P2", 10), ("P1", 20), ("P1", 30)]
        );
        assert_eq!(records[3].combinatorial_count(), 2);
    }

    #[test]
    fn progress_is_reported() {
        let seen = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| seen.lock().unwrap().push((done, total));
        let hits = (0..5).map(|i| hit("P1", "PEPTIDE", i)).collect();
        resolve_peptides(&pool(), hits, Some(&progress)).unwrap();
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (1..=5).map(|i| (i, 5)).collect::<Vec<_>>());
    }

    #[test]
    fn single_failure_fails_all() {
        let mut broken = hit("P1", "PEPTIDE", 2);
        broken.residue_modifications = vec![("Phospho".to_string(), 3)];
        let hits = vec![hit("P1", "PEPTIDE", 1), broken, hit("P1", "PEPTIDE", 3)];
        let error = resolve_peptides(&pool(), hits, None).unwrap_err();
        assert_eq!(error.get_kind(), ModificationErrorKind::UnknownModification);
    }

    #[test]
    fn empty() {
        assert!(resolve_peptides(&pool(), Vec::new(), None).unwrap().is_empty());
    }
}
