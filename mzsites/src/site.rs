use context_error::{BoxedError, Context, CreateError};

use crate::error::{ModificationError, ModificationErrorKind};

/// A location that a modification can be declared to target: a residue or one of the termini
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Site {
    /// N-terminal
    NTerm,
    /// An amino acid, given by its one letter code
    Residue(char),
    /// C-terminal
    CTerm,
}

impl Site {
    /// Check if this is one of the termini
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::NTerm | Self::CTerm)
    }

    /// The number of times this site occurs on the given sequence. Each terminus is present
    /// exactly once, residues are counted by occurrence.
    pub fn count_in(self, sequence: &str) -> usize {
        match self {
            Self::NTerm | Self::CTerm => 1,
            Self::Residue(aa) => sequence.chars().filter(|c| *c == aa).count(),
        }
    }

    /// Find the site at the given position on the sequence, returns None if the index is outside
    /// of the sequence.
    pub fn at(sequence: &str, position: SequencePosition) -> Option<Self> {
        match position {
            SequencePosition::NTerm => Some(Self::NTerm),
            SequencePosition::Index(index) => sequence.chars().nth(index).map(Self::Residue),
            SequencePosition::CTerm => Some(Self::CTerm),
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NTerm => write!(f, "N-term"),
            Self::Residue(aa) => write!(f, "{aa}"),
            Self::CTerm => write!(f, "C-term"),
        }
    }
}

impl std::str::FromStr for Site {
    type Err = ModificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (s, chars.next(), chars.next()) {
            ("N-term", _, _) => Ok(Self::NTerm),
            ("C-term", _, _) => Ok(Self::CTerm),
            (_, Some(aa), None) if aa.is_ascii_alphabetic() => Ok(Self::Residue(aa)),
            _ => Err(BoxedError::new(
                ModificationErrorKind::ConfigParse,
                "Invalid modification site",
                "A site should be a single amino acid letter, 'N-term', or 'C-term'",
                Context::show(s).to_owned(),
            )),
        }
    }
}

/// A position on a sequence
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SequencePosition {
    /// N-terminal
    NTerm,
    /// An amino acid at the given index (0 based)
    Index(usize),
    /// C-terminal
    CTerm,
}

impl std::fmt::Display for SequencePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NTerm => write!(f, "N-terminal"),
            Self::Index(index) => write!(f, "{index}"),
            Self::CTerm => write!(f, "C-terminal"),
        }
    }
}

impl From<Terminal> for SequencePosition {
    fn from(value: Terminal) -> Self {
        match value {
            Terminal::N => Self::NTerm,
            Terminal::C => Self::CTerm,
        }
    }
}

/// A peptide terminus, as reported for terminal modifications by search engines
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Terminal {
    /// N-terminal
    N,
    /// C-terminal
    C,
}

impl Terminal {
    /// Translate the position type code used by ProteomeDiscoverer, where `1` is the N terminus
    /// and anything else is the C terminus.
    pub const fn from_position_type(code: i64) -> Self {
        if code == 1 { Self::N } else { Self::C }
    }
}

impl From<Terminal> for Site {
    fn from(value: Terminal) -> Self {
        match value {
            Terminal::N => Self::NTerm,
            Terminal::C => Self::CTerm,
        }
    }
}
