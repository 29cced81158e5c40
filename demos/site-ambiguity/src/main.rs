//! List the modification site ambiguity for all peptides in a search result file

use std::{
    fs::File,
    io::{BufWriter, Write},
};

use clap::Parser;
use itertools::Itertools;
use mzsites::{modification::ResolvedModification, peptide::PeptideRecord};
use mzsites_search::open_search_file;

/// The command line interface arguments
#[derive(Debug, Parser)]
struct Cli {
    /// The search result file, ProteomeDiscoverer (.msf) or Mascot (.xml or .xml.gz)
    #[arg(short, long)]
    in_path: String,
    /// The output path to output the resulting csv file
    #[arg(short, long)]
    out_path: String,
    /// Only list the peptides with an ambiguous modification placement
    #[arg(long)]
    only_ambiguous: bool,
}

fn main() {
    let args = Cli::parse();
    let progress = |done: usize, total: usize| {
        if done % 1000 == 0 || done == total {
            eprint!("\rResolved {done}/{total} peptides");
        }
    };
    let results = match open_search_file(&args.in_path, Some(&progress)) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };
    eprintln!();

    let mut out_file =
        BufWriter::new(File::create(&args.out_path).expect("Could not create out CSV file"));
    writeln!(
        &mut out_file,
        "accession,protein,query,file,scan,mz,z,sequence,variable,fixed,combinations,ambiguous"
    )
    .unwrap();
    let mut written = 0;
    for peptide in results
        .peptides
        .iter()
        .filter(|p| !args.only_ambiguous || p.is_ambiguous())
    {
        write_record(&mut out_file, peptide).unwrap();
        written += 1;
    }
    eprintln!(
        "Written {written} of {} peptides, {} with an ambiguous placement",
        results.peptides.len(),
        results.ambiguous().count()
    );
}

fn write_record(out: &mut impl Write, peptide: &PeptideRecord) -> std::io::Result<()> {
    writeln!(
        out,
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        quote(&peptide.accession),
        quote(&peptide.protein),
        peptide.query,
        quote(&peptide.file_name),
        peptide.scan,
        peptide.precursor_mz,
        peptide.charge,
        peptide.sequence(),
        quote(&modifications(peptide.variable_modifications())),
        quote(&modifications(peptide.fixed_modifications())),
        peptide.combinatorial_count(),
        peptide.is_ambiguous(),
    )
}

fn modifications(modifications: &[ResolvedModification]) -> String {
    modifications.iter().join(";")
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
