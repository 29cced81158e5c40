use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::LazyLock,
};

use context_error::{BoxedError, Context, CreateError, FullErrorContent};
use flate2::bufread::GzDecoder;
use mzsites::{
    modification::ModificationSpec,
    peptide::PeptideHit,
    site::{Site, Terminal},
};
use regex::Regex;
use roxmltree::{Document, Node};

use crate::{
    error::{SearchError, SearchErrorKind},
    helper_functions::check_extension,
    source::SearchHits,
};

static SCAN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(scans:|Cmpd_)(\d+)").unwrap());

/// Read a Mascot XML export, gzipped files are decompressed automatically. Only the top ranked
/// peptides assigned to a protein hit are read.
/// # Errors
/// If the file could not be read or is not a valid Mascot XML file.
pub fn read_mascot_xml(path: impl AsRef<Path>) -> Result<SearchHits, SearchError> {
    let path = path.as_ref();
    log::info!(
        "Loading Mascot peptides from \"{}\"",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let io_error = |err: std::io::Error| {
        BoxedError::new(
            SearchErrorKind::Io,
            "Could not read file",
            err.to_string(),
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    };
    let mut file = BufReader::new(File::open(path).map_err(io_error)?);
    let mut text = String::new();
    if check_extension(path, "gz") {
        GzDecoder::new(file).read_to_string(&mut text)
    } else {
        file.read_to_string(&mut text)
    }
    .map_err(io_error)?;
    parse_mascot_xml(&text, &path.to_string_lossy())
}

/// Parse the text of a Mascot XML export. The source is only used for error messages.
/// # Errors
/// If the text is not valid XML, the modification declarations are invalid, or a peptide misses
/// a required field.
pub fn parse_mascot_xml(text: &str, source: &str) -> Result<SearchHits, SearchError> {
    let document = Document::parse(text).map_err(|err| {
        BoxedError::new(
            SearchErrorKind::Xml,
            "Invalid Mascot XML",
            err.to_string(),
            Context::none().source(source).to_owned(),
        )
    })?;
    let root = document.root_element();

    let fixed_modifications = declarations(root, "fixed_mods");
    let variable_modifications = declarations(root, "variable_mods");
    let fixed = parse_specs(&fixed_modifications)?;
    let variable = parse_specs(&variable_modifications)?;
    let file_name = root
        .descendants()
        .find(|n| n.has_tag_name("FILENAME"))
        .and_then(|n| n.text())
        .unwrap_or_default()
        .trim();

    let mut peptides = Vec::new();
    for protein in children(root, "hits")
        .flat_map(|hits| children(hits, "hit"))
        .flat_map(|hit| children(hit, "protein"))
    {
        let accession = protein.attribute("accession").unwrap_or_default();
        let description = child_text(protein, "prot_desc").unwrap_or_default();
        for peptide in children(protein, "peptide") {
            if peptide
                .attribute("rank")
                .is_some_and(|rank| rank.trim() != "1")
            {
                continue;
            }
            let mut hit = parse_peptide(peptide, &variable, source)?;
            hit.accession = accession.to_string();
            hit.protein = description
                .split_once(" OS=")
                .map_or(description, |(protein, _)| protein)
                .trim()
                .to_string();
            hit.file_name = file_name.to_string();
            hit.residue_modifications
                .extend(fixed_residue_hits(&fixed, &hit.sequence));
            hit.terminal_modifications
                .extend(fixed_terminal_hits(&fixed));
            peptides.push(hit);
        }
    }
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

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &'static str) -> Option<&'a str> {
    children(node, tag).next().and_then(|n| n.text()).map(str::trim)
}

fn declarations(root: Node<'_, '_>, tag: &'static str) -> Vec<String> {
    children(root, tag)
        .flat_map(|mods| children(mods, "modification"))
        .filter_map(|modification| child_text(modification, "name"))
        .map(ToString::to_string)
        .collect()
}

fn parse_specs(declarations: &[String]) -> Result<Vec<ModificationSpec>, SearchError> {
    declarations
        .iter()
        .map(|declaration| {
            ModificationSpec::parse(declaration)
                .map_err(|err| err.convert(|_| SearchErrorKind::Modification))
        })
        .collect()
}

fn parse_peptide(
    peptide: Node<'_, '_>,
    variable: &[ModificationSpec],
    source: &str,
) -> Result<PeptideHit, SearchError> {
    let required = |tag: &'static str| {
        child_text(peptide, tag).ok_or_else(|| {
            malformed(
                "Missing peptide field",
                format!("The peptide does not have a '{tag}' field"),
                source,
                None,
            )
        })
    };
    let query = peptide.attribute("query").unwrap_or_default();
    let query = query.trim().parse::<usize>().map_err(|err| {
        malformed(
            "Invalid query",
            format!("The query attribute is not a valid number: {err}"),
            source,
            Some(query),
        )
    })?;
    let mz = required("pep_exp_mz")?;
    let precursor_mz = mz.parse::<f64>().map_err(|err| {
        malformed(
            "Invalid precursor m/z",
            format!("The experimental m/z is not a valid number: {err}"),
            source,
            Some(mz),
        )
    })?;
    let z = required("pep_exp_z")?;
    let charge = z.trim_end_matches('+').parse::<isize>().map_err(|err| {
        malformed(
            "Invalid precursor charge",
            format!("The experimental charge is not a valid number: {err}"),
            source,
            Some(z),
        )
    })?;
    let sequence = required("pep_seq")?;
    let title = required("pep_scan_title")?;
    let scan = SCAN_REGEX
        .captures(title)
        .and_then(|c| c[2].parse::<usize>().ok())
        .ok_or_else(|| {
            malformed(
                "Missing scan number",
                "The scan title does not contain a scan number, as 'scans:<number>' or 'Cmpd_<number>'",
                source,
                Some(title),
            )
        })?;
    let (residue_modifications, terminal_modifications) =
        match child_text(peptide, "pep_var_mod_pos") {
            Some(positions) => variable_positions(positions, sequence, variable)
                .map_err(|description| {
                    malformed(
                        "Invalid variable modification positions",
                        description,
                        source,
                        Some(positions),
                    )
                })?,
            None => (Vec::new(), Vec::new()),
        };

    Ok(PeptideHit {
        query,
        precursor_mz,
        charge,
        sequence: sequence.to_string(),
        scan,
        residue_modifications,
        terminal_modifications,
        ..Default::default()
    })
}

/// Decode the variable modifications from the `N.<residues>.C` position string, where every
/// digit is the 1 based index into the variable modifications and 0 is unmodified.
#[allow(clippy::type_complexity)]
fn variable_positions(
    positions: &str,
    sequence: &str,
    variable: &[ModificationSpec],
) -> Result<(Vec<(String, usize)>, Vec<(String, Terminal)>), String> {
    let Some((n_term, rest)) = positions.split_once('.') else {
        return Err("Expected the format 'N.<residues>.C'".to_string());
    };
    let Some((residues, c_term)) = rest.split_once('.') else {
        return Err("Expected the format 'N.<residues>.C'".to_string());
    };
    if residues.chars().count() != sequence.chars().count() {
        return Err(format!(
            "The number of residues does not match the length of peptide {sequence}"
        ));
    }
    let lookup = |digit: char| -> Result<Option<String>, String> {
        match digit.to_digit(36) {
            Some(0) => Ok(None),
            Some(index) => variable
                .get(index as usize - 1)
                .map(|spec| Some(spec.abbreviation().to_string()))
                .ok_or_else(|| format!("There is no variable modification with number {digit}")),
            None => Err(format!("Invalid modification number '{digit}'")),
        }
    };

    let mut residue_modifications = Vec::new();
    for (index, digit) in residues.chars().enumerate() {
        if let Some(abbreviation) = lookup(digit)? {
            residue_modifications.push((abbreviation, index));
        }
    }
    let mut terminal_modifications = Vec::new();
    for (terminal, digits) in [(Terminal::N, n_term), (Terminal::C, c_term)] {
        for digit in digits.chars() {
            if let Some(abbreviation) = lookup(digit)? {
                terminal_modifications.push((abbreviation, terminal));
            }
        }
    }
    Ok((residue_modifications, terminal_modifications))
}

/// Mascot does not list fixed modifications per peptide, they are placed on every matching residue
fn fixed_residue_hits<'a>(
    fixed: &'a [ModificationSpec],
    sequence: &'a str,
) -> impl Iterator<Item = (String, usize)> + 'a {
    fixed.iter().flat_map(move |spec| {
        sequence
            .chars()
            .enumerate()
            .filter(|(_, aa)| spec.target_sites().contains(&Site::Residue(*aa)))
            .map(|(index, _)| (spec.abbreviation().to_string(), index))
    })
}

fn fixed_terminal_hits(fixed: &[ModificationSpec]) -> impl Iterator<Item = (String, Terminal)> + '_ {
    fixed.iter().flat_map(|spec| {
        spec.target_sites().iter().filter_map(|site| match site {
            Site::NTerm => Some((spec.abbreviation().to_string(), Terminal::N)),
            Site::CTerm => Some((spec.abbreviation().to_string(), Terminal::C)),
            Site::Residue(_) => None,
        })
    })
}

fn malformed(
    short: &'static str,
    description: impl Into<String>,
    source: &str,
    text: Option<&str>,
) -> SearchError {
    let context = match text {
        Some(text) => Context::show(text),
        None => Context::none(),
    };
    BoxedError::new(
        SearchErrorKind::Malformed,
        short,
        description.into(),
        context.source(source).to_owned(),
    )
}
