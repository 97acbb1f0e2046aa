use enzymes::Enzymes;
use lazy_static::lazy_static;

pub mod dna_sequence;
pub mod enzymes;
pub mod fasta;
pub mod feature;
pub mod gc_contents;
pub mod genbank_reader;
pub mod genbank_writer;
pub mod iupac_code;
pub mod restriction_enzyme;
pub mod translation;

lazy_static! {
    // Restriction enzyme catalog, read-only after process start
    pub static ref ENZYMES: Enzymes = Enzymes::default();
}
