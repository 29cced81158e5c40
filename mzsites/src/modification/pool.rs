use context_error::{BoxedError, Context, CreateError, FullErrorContent};

use crate::{
    error::ModificationError,
    modification::ModificationSpec,
    site::Site,
};

/// If a modification is applied at every occurrence of its site or only optionally
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModificationClass {
    /// Static modification, present on every occurrence of its site
    Fixed,
    /// Dynamic modification, may or may not be present on each of its sites
    Variable,
}

impl std::fmt::Display for ModificationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// All modifications declared for a single search, split in fixed and variable modifications.
/// This is built once per search and only read afterwards.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModificationPool {
    fixed: Vec<ModificationSpec>,
    variable: Vec<ModificationSpec>,
}

impl ModificationPool {
    /// Create a pool from already parsed modifications
    pub const fn new(fixed: Vec<ModificationSpec>, variable: Vec<ModificationSpec>) -> Self {
        Self { fixed, variable }
    }

    /// Build the pool from the raw declarations for the static (fixed) and dynamic (variable)
    /// modifications of a search.
    /// # Errors
    /// If any of the declarations is invalid, a single invalid declaration fails the whole pool.
    pub fn build(
        fixed: impl IntoIterator<Item = impl AsRef<str>>,
        variable: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ModificationError> {
        Ok(Self {
            fixed: parse_declarations(fixed, ModificationClass::Fixed)?,
            variable: parse_declarations(variable, ModificationClass::Variable)?,
        })
    }

    /// The fixed modifications
    pub fn fixed(&self) -> &[ModificationSpec] {
        &self.fixed
    }

    /// The variable modifications
    pub fn variable(&self) -> &[ModificationSpec] {
        &self.variable
    }

    /// Check if no modifications are declared at all
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.variable.is_empty()
    }

    /// Find the declaration for this abbreviation on this site. The variable modifications are
    /// searched before the fixed ones, so a modification declared in both is always variable.
    pub fn find(
        &self,
        abbreviation: &str,
        site: Site,
    ) -> Option<(ModificationClass, &ModificationSpec)> {
        self.variable
            .iter()
            .find(|spec| spec.matches(abbreviation, site))
            .map(|spec| (ModificationClass::Variable, spec))
            .or_else(|| {
                self.fixed
                    .iter()
                    .find(|spec| spec.matches(abbreviation, site))
                    .map(|spec| (ModificationClass::Fixed, spec))
            })
    }
}

fn parse_declarations(
    declarations: impl IntoIterator<Item = impl AsRef<str>>,
    class: ModificationClass,
) -> Result<Vec<ModificationSpec>, ModificationError> {
    declarations
        .into_iter()
        .enumerate()
        .map(|(index, declaration)| {
            ModificationSpec::parse(declaration.as_ref()).map_err(|err| {
                BoxedError::new(
                    err.get_kind(),
                    "Invalid modification configuration",
                    format!("The {class} modification declaration at index {index} is invalid"),
                    Context::show(declaration.as_ref()).to_owned(),
                )
                .add_underlying_errors(vec![err])
            })
        })
        .collect()
}
