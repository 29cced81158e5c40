use std::{borrow::Cow, collections::BTreeSet};

use crate::{modification::ResolvedModification, site::Site};

/// The number of ways to choose `k` unordered items out of `n`. This is 0 if `n` is negative or
/// smaller than `k`. Saturates at [`u128::MAX`].
pub fn n_choose_k(n: isize, k: usize) -> u128 {
    let Ok(n) = usize::try_from(n) else {
        return 0;
    };
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // C(n, i + 1) = C(n, i) * (n - i) / (i + 1), the part of i + 1 not shared with C(n, i)
        // always divides n - i so only the final value can overflow
        let step = i as u128 + 1;
        let shared = gcd(result, step);
        match (result / shared).checked_mul((n - i) as u128 / (step / shared)) {
            Some(v) => result = v,
            None => return u128::MAX,
        }
    }
    result
}

const fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// The sites that are interchangeable for this modification when localising it on a peptide.
/// This is the declared set of sites except for phosphorylation on serine and threonine, which is
/// ambiguous with tyrosine as well.
// TODO: read these expansions from a per search table instead of only handling Phospho (ST)
pub fn candidate_sites(modification: &ResolvedModification) -> Cow<'_, BTreeSet<Site>> {
    if modification.abbreviation == "Phospho"
        && modification.residues == BTreeSet::from([Site::Residue('S'), Site::Residue('T')])
    {
        Cow::Owned(BTreeSet::from([
            Site::Residue('S'),
            Site::Residue('T'),
            Site::Residue('Y'),
        ]))
    } else {
        Cow::Borrowed(&modification.residues)
    }
}

/// The number of places on the sequence where any of these sites can be found
pub fn available_sites<'a>(sequence: &str, sites: impl IntoIterator<Item = &'a Site>) -> usize {
    sites.into_iter().map(|site| site.count_in(sequence)).sum()
}

/// Count the number of distinguishable ways to place all variable modifications on the sequence.
/// Modifications of different types that target the exact same set of sites compete for those
/// sites. A result of 1 means the placement is unambiguous, a result of 0 means that some
/// modification occurs more often than it has sites on this sequence.
pub fn combinatorial_count(sequence: &str, variable: &[ResolvedModification]) -> u128 {
    let candidates: Vec<_> = variable.iter().map(candidate_sites).collect();
    variable
        .iter()
        .zip(&candidates)
        .map(|(modification, sites)| {
            let taken: usize = variable
                .iter()
                .zip(&candidates)
                .filter(|(other, other_sites)| {
                    other.abbreviation != modification.abbreviation && other_sites == &sites
                })
                .map(|(other, _)| other.count)
                .sum();
            let available = available_sites(sequence, sites.iter()) as isize - taken as isize;
            n_choose_k(available, modification.count)
        })
        .fold(1, u128::saturating_mul)
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn residues(letters: &str) -> Vec<Site> {
        letters.chars().map(Site::Residue).collect()
    }

    #[test]
    fn binomial() {
        assert_eq!(n_choose_k(5, 0), 1);
        assert_eq!(n_choose_k(0, 0), 1);
        assert_eq!(n_choose_k(5, 1), 5);
        assert_eq!(n_choose_k(5, 2), 10);
        assert_eq!(n_choose_k(5, 5), 1);
        assert_eq!(n_choose_k(30, 15), 155_117_520);
        assert_eq!(n_choose_k(2, 3), 0);
        assert_eq!(n_choose_k(-1, 0), 0);
        assert_eq!(n_choose_k(-1, 1), 0);
        assert_eq!(n_choose_k(200, 100), u128::MAX);
    }

    #[test]
    fn binomial_close_to_limit() {
        assert_eq!(
            n_choose_k(130, 65),
            95_067_625_827_960_698_145_584_333_020_095_113_100
        );
        assert_eq!(
            n_choose_k(131, 65),
            188_694_833_082_770_476_622_296_176_145_946_360_850
        );
        assert_eq!(
            n_choose_k(131, 65),
            n_choose_k(130, 64) + n_choose_k(130, 65)
        );
        assert_eq!(n_choose_k(132, 66), u128::MAX);
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
    }

    #[test]
    fn empty() {
        assert_eq!(combinatorial_count("PEPTIDE", &[]), 1);
    }

    #[test]
    fn disjoint_sites() {
        let variable = [
            ResolvedModification::new(1, "Oxidation", residues("M")),
            ResolvedModification::new(1, "Acetyl", residues("K")),
        ];
        assert_eq!(combinatorial_count("MPEMK", &variable), 2);
    }

    #[test]
    fn phospho_ambiguity() {
        let variable = [ResolvedModification::new(1, "Phospho", residues("ST"))];
        assert_eq!(
            *candidate_sites(&variable[0]),
            BTreeSet::from_iter(residues("STY"))
        );
        assert_eq!(combinatorial_count("SPTPY", &variable), 3);
    }

    #[test]
    fn phospho_expansion_is_narrow() {
        // Declared on STY already, no expansion needed
        let variable = [ResolvedModification::new(1, "Phospho", residues("STY"))];
        assert!(matches!(candidate_sites(&variable[0]), Cow::Borrowed(_)));
        // Only serine
        let variable = [ResolvedModification::new(1, "Phospho", residues("S"))];
        assert_eq!(combinatorial_count("SPTPY", &variable), 1);
        // Any other modification on ST
        let variable = [ResolvedModification::new(1, "Glycosyl", residues("ST"))];
        assert_eq!(combinatorial_count("SPTPY", &variable), 2);
    }

    #[test]
    fn shared_site_pool() {
        let variable = [
            ResolvedModification::new(1, "Oxidation", residues("M")),
            ResolvedModification::new(1, "Dioxidation", residues("M")),
        ];
        assert_eq!(combinatorial_count("MPEPMK", &variable), 1);
        // Oxidation: C(3 - 1, 1) = 2, Dioxidation: C(3 - 1, 1) = 2
        assert_eq!(combinatorial_count("MMPEPMK", &variable), 4);
    }

    #[test]
    fn same_abbreviation_does_not_compete() {
        let variable = [
            ResolvedModification::new(1, "Phospho", residues("STY")),
            ResolvedModification::new(1, "Phospho", residues("STY")),
        ];
        assert_eq!(combinatorial_count("SPTPY", &variable), 9);
    }

    #[test]
    fn more_modifications_than_sites() {
        let variable = [
            ResolvedModification::new(2, "Oxidation", residues("M")),
            ResolvedModification::new(1, "Acetyl", residues("K")),
        ];
        assert_eq!(combinatorial_count("MPEPK", &variable), 0);

        let variable = [
            ResolvedModification::new(2, "Oxidation", residues("M")),
            ResolvedModification::new(1, "Dioxidation", residues("M")),
        ];
        // Oxidation: C(2 - 1, 2) = 0
        assert_eq!(combinatorial_count("MPEPMK", &variable), 0);
    }

    #[test]
    fn terminal_sites() {
        let variable = [
            ResolvedModification::new(1, "Acetyl", [Site::NTerm]),
            ResolvedModification::new(1, "Oxidation", residues("M")),
        ];
        assert_eq!(combinatorial_count("MPEPMK", &variable), 2);
    }
}
