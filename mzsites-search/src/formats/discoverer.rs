use std::{path::Path, sync::LazyLock};

use context_error::{BoxedError, Context, CreateError};
use mzsites::{peptide::PeptideHit, site::Terminal};
use regex::Regex;
use rusqlite::{Connection, OpenFlags, Row, types::Type};

use crate::{
    error::{SearchError, SearchErrorKind},
    source::SearchHits,
};

static DESCRIPTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>sp\|[\dA-Za-z]+\|([\dA-Za-z_]+) (.*)$").unwrap());

const PARAMETERS_QUERY: &str = "SELECT ParameterName, ParameterValue FROM ProcessingNodeParameters";

const PEPTIDES_QUERY: &str = "SELECT
    Peptides.PeptideID,
    ProteinAnnotations.Description,
    Peptides.Sequence,
    SpectrumHeaders.FirstScan,
    MassPeaks.Mass,
    MassPeaks.Charge,
    FileInfos.FileName
FROM Peptides
    JOIN PeptidesProteins ON PeptidesProteins.PeptideID = Peptides.PeptideID
    JOIN ProteinAnnotations ON ProteinAnnotations.ProteinID = PeptidesProteins.ProteinID
    JOIN SpectrumHeaders ON SpectrumHeaders.SpectrumID = Peptides.SpectrumID
    JOIN MassPeaks ON MassPeaks.MassPeakID = SpectrumHeaders.MassPeakID
    JOIN FileInfos ON FileInfos.FileID = MassPeaks.FileID
WHERE Peptides.SearchEngineRank = 1";

const RESIDUE_MODIFICATIONS_QUERY: &str = "SELECT
    AminoAcidModifications.ModificationName,
    PeptidesAminoAcidModifications.Position
FROM PeptidesAminoAcidModifications
    JOIN AminoAcidModifications ON AminoAcidModifications.AminoAcidModificationID = PeptidesAminoAcidModifications.AminoAcidModificationID
WHERE PeptidesAminoAcidModifications.PeptideID = ?1";

const TERMINAL_MODIFICATIONS_QUERY: &str = "SELECT
    AminoAcidModifications.ModificationName,
    AminoAcidModifications.PositionType
FROM PeptidesTerminalModifications
    JOIN AminoAcidModifications ON AminoAcidModifications.AminoAcidModificationID = PeptidesTerminalModifications.TerminalModificationID
WHERE PeptidesTerminalModifications.PeptideID = ?1";

/// Read a ProteomeDiscoverer MSF file (an SQLite database). Only the top ranked peptides are
/// read.
/// # Errors
/// If the file could not be opened or does not contain the expected tables.
pub fn read_discoverer_msf(path: impl AsRef<Path>) -> Result<SearchHits, SearchError> {
    let path = path.as_ref();
    log::info!(
        "Loading ProteomeDiscoverer peptides from \"{}\"",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let database_error = |err: rusqlite::Error| {
        BoxedError::new(
            SearchErrorKind::Database,
            "Could not read ProteomeDiscoverer file",
            err.to_string(),
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    };
    if !path.is_file() {
        return Err(BoxedError::new(
            SearchErrorKind::Io,
            "Could not open file",
            "The file does not exist",
            Context::none().source(path.to_string_lossy()).to_owned(),
        ));
    }
    let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(database_error)?;

    let (fixed_modifications, variable_modifications) =
        read_declarations(&connection).map_err(database_error)?;
    let peptides = read_peptides(&connection).map_err(database_error)?;
    log::debug!(
        "Read {} fixed and {} variable modifications and {} peptides",
        fixed_modifications.len(),
        variable_modifications.len(),
        peptides.len()
    );

    Ok(SearchHits {
        fixed_modifications,
        variable_modifications,
        peptides,
    })
}

fn read_declarations(connection: &Connection) -> rusqlite::Result<(Vec<String>, Vec<String>)> {
    let mut statement = connection.prepare(PARAMETERS_QUERY)?;
    let mut fixed = Vec::new();
    let mut variable = Vec::new();
    for row in statement.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))? {
        let (name, value) = row?;
        if name.starts_with("StaticMod_") {
            fixed.push(value);
        } else if name.starts_with("DynMod_") {
            variable.push(value);
        }
    }
    Ok((fixed, variable))
}

fn read_peptides(connection: &Connection) -> rusqlite::Result<Vec<PeptideHit>> {
    let mut peptides = connection.prepare(PEPTIDES_QUERY)?;
    let mut residue_modifications = connection.prepare(RESIDUE_MODIFICATIONS_QUERY)?;
    let mut terminal_modifications = connection.prepare(TERMINAL_MODIFICATIONS_QUERY)?;

    let rows = peptides.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            PeptideHit {
                sequence: row.get(2)?,
                scan: get_index(row, 3)?,
                precursor_mz: row.get(4)?,
                charge: row.get(5)?,
                file_name: row.get(6)?,
                ..Default::default()
            },
        ))
    })?;

    let mut output = Vec::new();
    for row in rows {
        let (id, description, mut hit) = row?;
        let (accession, protein) = split_description(&description);
        hit.accession = accession;
        hit.protein = protein;
        hit.query = usize::try_from(id).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err))
        })?;
        hit.residue_modifications = residue_modifications
            .query_map([id], |row| Ok((row.get::<_, String>(0)?, get_index(row, 1)?)))?
            .collect::<Result<_, _>>()?;
        hit.terminal_modifications = terminal_modifications
            .query_map([id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    Terminal::from_position_type(row.get(1)?),
                ))
            })?
            .collect::<Result<_, _>>()?;
        output.push(hit);
    }
    Ok(output)
}

/// SQLite only stores signed integers
fn get_index(row: &Row<'_>, index: usize) -> rusqlite::Result<usize> {
    usize::try_from(row.get::<_, i64>(index)?).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(err))
    })
}

/// Split a FASTA header like `>sp|P31749|AKT1_HUMAN RAC-alpha serine/threonine-protein kinase OS=Homo sapiens`
/// into the accession and the protein description. Headers that do not follow this pattern are
/// kept whole with the first word as accession.
fn split_description(description: &str) -> (String, String) {
    if let Some(captures) = DESCRIPTION_REGEX.captures(description) {
        let protein = captures[2]
            .split_once(" OS=")
            .map_or(&captures[2], |(protein, _)| protein);
        (captures[1].to_string(), protein.trim().to_string())
    } else {
        (
            description
                .trim_start_matches('>')
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            description.to_string(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn descriptions() {
        assert_eq!(
            split_description(
                ">sp|P31749|AKT1_HUMAN RAC-alpha serine/threonine-protein kinase OS=Homo sapiens OX=9606 GN=AKT1"
            ),
            (
                "AKT1_HUMAN".to_string(),
                "RAC-alpha serine/threonine-protein kinase".to_string()
            )
        );
        assert_eq!(
            split_description(">sp|P68871|HBB_HUMAN Hemoglobin subunit beta"),
            ("HBB_HUMAN".to_string(), "Hemoglobin subunit beta".to_string())
        );
        assert_eq!(
            split_description(">tr|A0A024R161|A0A024R161_HUMAN Guanine"),
            (
                "tr|A0A024R161|A0A024R161_HUMAN".to_string(),
                ">tr|A0A024R161|A0A024R161_HUMAN Guanine".to_string()
            )
        );
        assert_eq!(split_description(""), (String::new(), String::new()));
    }
}
