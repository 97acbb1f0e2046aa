use crate::dna_sequence::DNAsequence;

const FASTA_LINE_LEN: usize = 60;

/// FASTA text for a record: `>name description` header, residues wrapped
/// at 60 columns.
pub fn generate(record: &DNAsequence) -> String {
    let mut out = String::with_capacity(record.len() + record.len() / FASTA_LINE_LEN + 64);
    out.push('>');
    out.push_str(record.name());
    if !record.description().is_empty() {
        out.push(' ');
        out.push_str(record.description());
    }
    out.push('\n');
    for line in record.forward().chunks(FASTA_LINE_LEN) {
        out.extend(line.iter().map(|&c| c as char));
        out.push('\n');
    }
    out
}
