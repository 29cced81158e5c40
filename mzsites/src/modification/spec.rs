use std::{collections::BTreeSet, sync::LazyLock};

use context_error::{BoxedError, Context, CreateError};
use itertools::Itertools;
use regex::Regex;

use crate::{
    error::{ModificationError, ModificationErrorKind},
    site::Site,
};

/// The grammar for modification declarations: `[<count> ]<name> (<sites>)`
static DECLARATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+) )?(.+) \((.+)\)$").unwrap());

/// A declared modification type, as configured for a search
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModificationSpec {
    abbreviation: String,
    target_sites: BTreeSet<Site>,
}

impl ModificationSpec {
    /// Create a new modification type.
    /// # Errors
    /// If there are no sites, or if terminal sites are combined with residues or each other.
    pub fn new(
        abbreviation: impl Into<String>,
        target_sites: impl IntoIterator<Item = Site>,
    ) -> Result<Self, ModificationError> {
        let abbreviation = abbreviation.into();
        let target_sites: BTreeSet<Site> = target_sites.into_iter().collect();
        let terminals = target_sites.iter().filter(|s| s.is_terminal()).count();
        if target_sites.is_empty() {
            Err(BoxedError::new(
                ModificationErrorKind::ConfigParse,
                "Invalid modification",
                "A modification needs at least one target site",
                Context::show(abbreviation).to_owned(),
            ))
        } else if terminals > 1 || (terminals == 1 && target_sites.len() > 1) {
            Err(BoxedError::new(
                ModificationErrorKind::ConfigParse,
                "Invalid modification",
                "A terminal modification cannot target any other site",
                Context::show(format!(
                    "{abbreviation} ({})",
                    target_sites.iter().join(",")
                )),
            ))
        } else {
            Ok(Self {
                abbreviation,
                target_sites,
            })
        }
    }

    /// Parse a modification declaration as written in a search configuration, for example
    /// `Phospho (STY)`, `2 Oxidation (M)`, or `Acetyl (N-term)`. The optional leading count is
    /// ignored.
    /// # Errors
    /// If the text does not follow the declaration grammar.
    pub fn parse(text: &str) -> Result<Self, ModificationError> {
        let captures = DECLARATION_REGEX.captures(text).ok_or_else(|| {
            BoxedError::new(
                ModificationErrorKind::ConfigParse,
                "Invalid modification declaration",
                "A modification declaration should look like '[<count> ]<name> (<sites>)'",
                Context::show(text).to_owned(),
            )
        })?;
        let name = captures.get(2).map_or("", |m| m.as_str());
        let sites = captures.get(3).map_or("", |m| m.as_str());
        Self::new(name, parse_sites(sites, text)?)
    }

    /// The abbreviation, or short name, of this modification
    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    /// All sites this modification is declared to target
    pub const fn target_sites(&self) -> &BTreeSet<Site> {
        &self.target_sites
    }

    /// Check if this is the declaration for the given abbreviation placed on the given site
    pub fn matches(&self, abbreviation: &str, site: Site) -> bool {
        self.abbreviation == abbreviation && self.target_sites.contains(&site)
    }
}

impl std::fmt::Display for ModificationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.abbreviation,
            self.target_sites.iter().join("")
        )
    }
}

impl std::str::FromStr for ModificationSpec {
    type Err = ModificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Expand a site list, either a run of residue letters or a single terminal token
fn parse_sites(sites: &str, declaration: &str) -> Result<Vec<Site>, ModificationError> {
    match sites {
        "N-term" => Ok(vec![Site::NTerm]),
        "C-term" => Ok(vec![Site::CTerm]),
        letters if letters.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(letters.chars().map(Site::Residue).collect())
        }
        _ => Err(BoxedError::new(
            ModificationErrorKind::ConfigParse,
            "Invalid modification sites",
            format!(
                "The sites '{sites}' should be a run of amino acid letters, 'N-term', or 'C-term'"
            ),
            Context::show(declaration).to_owned(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use context_error::FullErrorContent;

    use super::*;

    #[test]
    fn parse_residues() {
        let spec = ModificationSpec::parse("Phospho (STY)").unwrap();
        assert_eq!(spec.abbreviation(), "Phospho");
        assert_eq!(
            spec.target_sites(),
            &BTreeSet::from([Site::Residue('S'), Site::Residue('T'), Site::Residue('Y')])
        );
        assert_eq!(spec.to_string(), "Phospho (STY)");
    }

    #[test]
    fn parse_count_prefix() {
        let spec = ModificationSpec::parse("2 Oxidation (M)").unwrap();
        assert_eq!(spec.abbreviation(), "Oxidation");
        assert_eq!(spec.target_sites(), &BTreeSet::from([Site::Residue('M')]));
    }

    #[test]
    fn parse_terminal() {
        let spec = ModificationSpec::parse("Acetyl (N-term)").unwrap();
        assert_eq!(spec.target_sites(), &BTreeSet::from([Site::NTerm]));
        assert_eq!(spec.to_string(), "Acetyl (N-term)");
        let spec = ModificationSpec::parse("1 Amidated (C-term)").unwrap();
        assert_eq!(spec.target_sites(), &BTreeSet::from([Site::CTerm]));
    }

    #[test]
    fn parse_name_with_brackets() {
        let spec = ModificationSpec::parse("Label:13C(6) (K)").unwrap();
        assert_eq!(spec.abbreviation(), "Label:13C(6)");
        assert_eq!(spec.target_sites(), &BTreeSet::from([Site::Residue('K')]));
    }

    #[test]
    fn parse_duplicate_letters() {
        let spec = ModificationSpec::parse("Oxidation (MM)").unwrap();
        assert_eq!(spec.target_sites().len(), 1);
    }

    #[test]
    fn parse_invalid() {
        for text in [
            "",
            "Phospho",
            "Phospho STY",
            "Phospho (STY",
            "(STY)",
            "Phospho ()",
            "Phospho (S T)",
            "Acetyl (Protein N-term)",
            "Gln->pyro-Glu (N-term Q)",
            "Phospho (S1)",
        ] {
            let error = ModificationSpec::parse(text).unwrap_err();
            assert_eq!(
                error.get_kind(),
                ModificationErrorKind::ConfigParse,
                "{text}"
            );
        }
    }

    #[test]
    fn invariants() {
        assert!(ModificationSpec::new("Nothing", []).is_err());
        assert!(ModificationSpec::new("Mixed", [Site::NTerm, Site::Residue('K')]).is_err());
        assert!(ModificationSpec::new("Both", [Site::NTerm, Site::CTerm]).is_err());
        assert!(ModificationSpec::new("TMT6plex", [Site::NTerm]).is_ok());
    }

    #[test]
    fn matches() {
        let spec = ModificationSpec::parse("Phospho (ST)").unwrap();
        assert!(spec.matches("Phospho", Site::Residue('S')));
        assert!(!spec.matches("Phospho", Site::Residue('Y')));
        assert!(!spec.matches("Oxidation", Site::Residue('S')));
    }
}
