use crate::{
    fasta,
    feature::{Feature, Primer},
    gc_contents::{self, GcContents},
    genbank_reader, genbank_writer,
    iupac_code::reverse_complement,
    restriction_enzyme::{scan_sites, RestrictionSite},
    translation, ENZYMES,
};
use anyhow::Result;
use bio::io::fasta as bio_fasta;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, fs::File, ops::Range};

// Average molecular weights of single-stranded DNA monophosphates, and the
// weight of the water lost at the terminus.
const WEIGHT_A: f64 = 313.21;
const WEIGHT_T: f64 = 304.2;
const WEIGHT_C: f64 = 289.18;
const WEIGHT_G: f64 = 329.21;
const TERMINAL_WATER: f64 = 61.96;

/// An annotated DNA sequence record: residues, metadata, features, primers,
/// and the derived restriction site list.
///
/// The residues are stored uppercase over {A,C,G,T}. `restriction_sites` is
/// never authoritative: it is recomputed from the residues before any
/// mutating operation returns, so reads always see the current sequence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DNAsequence {
    id: String,
    name: String,
    description: String,
    organism: String,
    accession: String,
    date: String,
    seq: Vec<u8>,
    is_circular: bool,
    features: Vec<Feature>,
    primers: Vec<Primer>,
    #[serde(skip)]
    restriction_sites: Vec<RestrictionSite>,
    #[serde(skip)]
    annotation_serial: u64,
}

impl DNAsequence {
    /// Builds a record from a raw residue string. Anything outside
    /// {A,C,G,T} (any case) is stripped, not rejected.
    pub fn new_from_raw(name: &str, raw_sequence: &str, is_circular: bool) -> Self {
        let mut ret = Self {
            id: name.to_string(),
            name: name.to_string(),
            seq: Self::normalize_residues(raw_sequence.as_bytes()),
            is_circular,
            ..Default::default()
        };
        ret.update_computed_features();
        ret
    }

    pub(crate) fn from_decoded(
        id: String,
        name: String,
        description: String,
        organism: String,
        accession: String,
        date: String,
        seq: Vec<u8>,
        is_circular: bool,
        features: Vec<Feature>,
    ) -> Self {
        let mut ret = Self {
            id,
            name,
            description,
            organism,
            accession,
            date,
            seq,
            is_circular,
            annotation_serial: features.len() as u64,
            features,
            ..Default::default()
        };
        ret.update_computed_features();
        ret
    }

    /// All records in a GenBank text (records are separated by `//`).
    pub fn from_genbank_text(text: &str) -> Vec<DNAsequence> {
        genbank_reader::parse_text(text)
    }

    pub fn from_genbank_file(filename: &str) -> Result<Vec<DNAsequence>> {
        Ok(Self::from_genbank_text(&fs::read_to_string(filename)?))
    }

    pub fn from_fasta_file(filename: &str) -> Result<Vec<DNAsequence>> {
        let file = File::open(filename)?;
        Ok(bio_fasta::Reader::new(file)
            .records()
            .filter_map(|record| record.ok())
            .map(|record| DNAsequence::from_fasta_record(&record))
            .collect())
    }

    pub fn from_fasta_record(record: &bio_fasta::Record) -> Self {
        let mut ret = Self::new_from_raw(record.id(), "", false);
        ret.seq = Self::normalize_residues(record.seq());
        if let Some(desc) = record.desc() {
            ret.description = desc.to_string();
        }
        ret.update_computed_features();
        ret
    }

    pub fn to_genbank_string(&self) -> String {
        genbank_writer::generate(self)
    }

    pub fn write_genbank_file(&self, filename: &str) -> Result<()> {
        fs::write(filename, self.to_genbank_string())?;
        Ok(())
    }

    pub fn to_fasta_string(&self) -> String {
        fasta::generate(self)
    }

    pub fn write_fasta_file(&self, filename: &str) -> Result<()> {
        fs::write(filename, self.to_fasta_string())?;
        Ok(())
    }

    /// Uppercases and drops everything that is not a concrete base.
    pub fn normalize_residues(raw: &[u8]) -> Vec<u8> {
        raw.iter()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| matches!(c, b'A' | b'C' | b'G' | b'T'))
            .collect()
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq
    }

    pub fn get_forward_string(&self) -> String {
        String::from_utf8_lossy(&self.seq).to_string()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn organism(&self) -> &str {
        &self.organism
    }

    pub fn accession(&self) -> &str {
        &self.accession
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn is_circular(&self) -> bool {
        self.is_circular
    }

    /// Changing topology changes which windows the site scan may wrap, so
    /// the derived sites are recomputed here as well.
    pub fn set_circular(&mut self, is_circular: bool) {
        self.is_circular = is_circular;
        self.update_computed_features();
    }

    pub fn features(&self) -> &Vec<Feature> {
        &self.features
    }

    pub fn primers(&self) -> &Vec<Primer> {
        &self.primers
    }

    pub fn restriction_sites(&self) -> &Vec<RestrictionSite> {
        &self.restriction_sites
    }

    /// Recomputes all derived state from the current residues.
    pub fn update_computed_features(&mut self) {
        self.restriction_sites =
            scan_sites(ENZYMES.restriction_enzymes(), &self.seq, self.is_circular);
    }

    fn next_annotation_id(&mut self, prefix: &str) -> String {
        self.annotation_serial += 1;
        format!("{prefix}-{}", self.annotation_serial)
    }

    /// Adds a feature, assigning an id if the caller left it empty.
    /// Returns the feature id.
    pub fn add_feature(&mut self, mut feature: Feature) -> String {
        if feature.id.is_empty() {
            feature.id = self.next_annotation_id("feature");
        }
        let id = feature.id.clone();
        self.features.push(feature);
        id
    }

    pub fn remove_feature(&mut self, feature_id: &str) -> bool {
        let before = self.features.len();
        self.features.retain(|f| f.id != feature_id);
        self.features.len() != before
    }

    pub fn update_feature(&mut self, feature_id: &str, update: impl FnOnce(&mut Feature)) -> bool {
        match self.features.iter_mut().find(|f| f.id == feature_id) {
            Some(feature) => {
                update(feature);
                true
            }
            None => false,
        }
    }

    pub fn add_primer(&mut self, mut primer: Primer) -> String {
        if primer.id.is_empty() {
            primer.id = self.next_annotation_id("primer");
        }
        let id = primer.id.clone();
        self.primers.push(primer);
        id
    }

    pub fn remove_primer(&mut self, primer_id: &str) -> bool {
        let before = self.primers.len();
        self.primers.retain(|p| p.id != primer_id);
        self.primers.len() != before
    }

    /// Inserts bases before the 0-based residue offset `position`
    /// (`position == len()` appends). Invalid characters are stripped.
    /// Feature and primer coordinates downstream of the insertion point
    /// are shifted with the edit.
    pub fn insert_residues(&mut self, position: usize, bases: &str) {
        let bases = Self::normalize_residues(bases.as_bytes());
        if bases.is_empty() {
            return;
        }
        let position = position.min(self.seq.len());
        self.seq.splice(position..position, bases.iter().copied());
        self.remap_annotations(|start, end| {
            Some((
                shift_for_insert(start, position, bases.len()),
                shift_for_insert(end, position, bases.len()),
            ))
        });
        self.update_computed_features();
    }

    /// Removes the half-open 0-based range `[start, end)`. Annotations
    /// entirely inside the range are dropped; overlapping ones are clamped.
    pub fn delete_residues(&mut self, start: usize, end: usize) {
        let end = end.min(self.seq.len());
        let start = start.min(end);
        if start == end {
            return;
        }
        self.seq.drain(start..end);
        self.remap_annotations(|span_start, span_end| {
            let new_start = shift_for_delete_start(span_start, start, end);
            let new_end = shift_for_delete_end(span_end, start, end);
            if new_start > new_end || new_end == 0 {
                None
            } else {
                Some((new_start, new_end))
            }
        });
        self.update_computed_features();
    }

    /// Deletes `[start, end)` and inserts the normalized bases at `start`.
    pub fn replace_residues(&mut self, start: usize, end: usize, bases: &str) {
        let bases = Self::normalize_residues(bases.as_bytes());
        let end = end.min(self.seq.len());
        let start = start.min(end);
        let inserted = bases.len();
        self.seq.splice(start..end, bases.iter().copied());
        self.remap_annotations(|span_start, span_end| {
            let new_start = shift_for_delete_start(span_start, start, end);
            let new_end = shift_for_delete_end(span_end, start, end);
            if new_start > new_end || new_end == 0 {
                return None;
            }
            Some((
                shift_for_insert(new_start, start, inserted),
                shift_for_insert(new_end, start, inserted),
            ))
        });
        self.update_computed_features();
    }

    /// Reverses the residue order and complements each base. Feature and
    /// primer spans are reflected across the sequence and their strands
    /// flipped, so annotations keep pointing at the same biology.
    pub fn reverse_complement(&mut self) {
        self.seq = reverse_complement(&self.seq);
        let len = self.seq.len();
        for feature in &mut self.features {
            let (start, end) = reflect_span(len, feature.start, feature.end);
            feature.start = start;
            feature.end = end;
            feature.strand = feature.strand.flipped();
        }
        for primer in &mut self.primers {
            let (start, end) = reflect_span(len, primer.start, primer.end);
            primer.start = start;
            primer.end = end;
            primer.strand = primer.strand.flipped();
        }
        self.update_computed_features();
    }

    fn remap_annotations(&mut self, remap: impl Fn(usize, usize) -> Option<(usize, usize)>) {
        self.features.retain_mut(|feature| {
            match remap(feature.start, feature.end) {
                Some((start, end)) => {
                    feature.start = start;
                    feature.end = end;
                    true
                }
                None => false,
            }
        });
        self.primers.retain_mut(|primer| match remap(primer.start, primer.end) {
            Some((start, end)) => {
                primer.start = start;
                primer.end = end;
                true
            }
            None => false,
        });
    }

    /// Circular-aware substring. The 0-based half-open range may run past
    /// the end on a circular sequence, in which case it wraps across the
    /// origin. Returns `None` for out-of-bounds ranges on linear sequences.
    pub fn get_range_safe(&self, range: Range<usize>) -> Option<Vec<u8>> {
        let Range { start, end } = range;
        if start >= end || self.seq.is_empty() {
            return None;
        }
        if !self.is_circular {
            if end > self.seq.len() {
                return None;
            }
            return Some(self.seq[start..end].to_vec());
        }
        let len = self.seq.len();
        let start = start % len;
        let last = (end - 1) % len;
        if start > last {
            Some(
                self.seq[start..]
                    .iter()
                    .chain(self.seq[..=last].iter())
                    .copied()
                    .collect(),
            )
        } else {
            Some(self.seq[start..=last].to_vec())
        }
    }

    /// Reverse complement of a substring; does not mutate the record.
    pub fn reverse_complement_range(&self, range: Range<usize>) -> Option<Vec<u8>> {
        self.get_range_safe(range).map(|s| reverse_complement(&s))
    }

    /// GC content as a percentage; 0.0 for the empty sequence.
    pub fn gc_percent(&self) -> f64 {
        gc_contents::gc_percent(&self.seq)
    }

    /// Windowed GC content along the sequence.
    pub fn gc_regions(&self) -> GcContents {
        GcContents::new_from_sequence(&self.seq)
    }

    /// Estimated single-stranded molecular weight in g/mol; 0.0 for the
    /// empty sequence.
    pub fn molecular_weight(&self) -> f64 {
        if self.seq.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .seq
            .iter()
            .map(|base| match base {
                b'A' => WEIGHT_A,
                b'T' => WEIGHT_T,
                b'C' => WEIGHT_C,
                b'G' => WEIGHT_G,
                _ => 0.0,
            })
            .sum();
        sum - TERMINAL_WATER
    }

    pub fn translate(&self, frame: usize) -> String {
        translation::translate(&self.seq, frame)
    }

    pub fn translate_six_frames(&self) -> Vec<String> {
        translation::translate_six_frames(&self.seq)
    }
}

impl fmt::Display for DNAsequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.seq))
    }
}

#[inline(always)]
fn shift_for_insert(coord: usize, at: usize, inserted: usize) -> usize {
    // 1-based coordinate, insertion before 0-based offset `at`
    if coord > at {
        coord + inserted
    } else {
        coord
    }
}

#[inline(always)]
fn shift_for_delete_start(coord: usize, del_start: usize, del_end: usize) -> usize {
    if coord > del_end {
        coord - (del_end - del_start)
    } else if coord > del_start {
        del_start + 1
    } else {
        coord
    }
}

#[inline(always)]
fn shift_for_delete_end(coord: usize, del_start: usize, del_end: usize) -> usize {
    if coord > del_end {
        coord - (del_end - del_start)
    } else if coord > del_start {
        del_start
    } else {
        coord
    }
}

#[inline(always)]
fn reflect_span(len: usize, start: usize, end: usize) -> (usize, usize) {
    if len == 0 || start == 0 || end == 0 {
        return (start, end);
    }
    // decoded records may carry spans past the sequence end; clamp before
    // reflecting so the subtraction cannot underflow
    let end = end.min(len);
    let start = start.min(end);
    (len + 1 - end, len + 1 - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Strand;

    fn feature_at(start: usize, end: usize) -> Feature {
        Feature {
            kind: "misc_feature".to_string(),
            start,
            end,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_from_raw_normalizes() {
        let dna = DNAsequence::new_from_raw("test", "at cg\nN-xq", false);
        assert_eq!(dna.get_forward_string(), "ATCG");
        assert_eq!(dna.len(), 4);
        assert!(dna.features().is_empty());
        assert!(dna.primers().is_empty());
    }

    #[test]
    fn test_sites_computed_at_creation() {
        let dna = DNAsequence::new_from_raw("test", "TTGAATTCTT", false);
        assert!(
            dna.restriction_sites()
                .iter()
                .any(|s| s.name == "EcoRI" && s.position == 3)
        );
    }

    #[test]
    fn test_insert_creates_site_and_rescans() {
        let mut dna = DNAsequence::new_from_raw("test", "TTTTTTTT", false);
        assert!(
            !dna.restriction_sites().iter().any(|s| s.name == "EcoRI"),
            "no EcoRI site before the edit"
        );
        dna.insert_residues(4, "GAATTC");
        assert_eq!(dna.len(), 14);
        let ecori: Vec<_> = dna
            .restriction_sites()
            .iter()
            .filter(|s| s.name == "EcoRI")
            .collect();
        assert_eq!(ecori.len(), 1);
        assert_eq!(ecori[0].position, 5);
        // the cached set equals a fresh scan of the post-edit sequence
        let fresh = scan_sites(ENZYMES.restriction_enzymes(), dna.forward(), false);
        assert_eq!(dna.restriction_sites(), &fresh);
    }

    #[test]
    fn test_insert_shifts_downstream_features() {
        let mut dna = DNAsequence::new_from_raw("test", "AAAAAAAAAA", false);
        dna.add_feature(feature_at(2, 4));
        dna.add_feature(feature_at(7, 9));
        dna.insert_residues(5, "CC");
        assert_eq!(dna.features()[0].start, 2);
        assert_eq!(dna.features()[0].end, 4);
        assert_eq!(dna.features()[1].start, 9);
        assert_eq!(dna.features()[1].end, 11);
    }

    #[test]
    fn test_insert_at_ends() {
        let mut dna = DNAsequence::new_from_raw("test", "AAAA", false);
        dna.insert_residues(0, "GG");
        dna.insert_residues(100, "TT"); // clamped to append
        assert_eq!(dna.get_forward_string(), "GGAAAATT");
    }

    #[test]
    fn test_delete_clamps_and_drops_features() {
        let mut dna = DNAsequence::new_from_raw("test", "AAAAAAAAAA", false);
        dna.add_feature(feature_at(1, 3)); // upstream, untouched
        dna.add_feature(feature_at(4, 7)); // overlaps the hole
        dna.add_feature(feature_at(5, 6)); // entirely inside, dropped
        dna.add_feature(feature_at(8, 10)); // downstream, shifted
        dna.delete_residues(4, 6); // removes residues 5..=6 (1-based)
        assert_eq!(dna.len(), 8);
        assert_eq!(dna.features().len(), 3);
        assert_eq!((dna.features()[0].start, dna.features()[0].end), (1, 3));
        assert_eq!((dna.features()[1].start, dna.features()[1].end), (4, 5));
        assert_eq!((dna.features()[2].start, dna.features()[2].end), (6, 8));
        let fresh = scan_sites(ENZYMES.restriction_enzymes(), dna.forward(), false);
        assert_eq!(dna.restriction_sites(), &fresh);
    }

    #[test]
    fn test_replace_is_delete_then_insert() {
        let mut dna = DNAsequence::new_from_raw("test", "AAAATTTT", false);
        dna.replace_residues(2, 6, "GG");
        assert_eq!(dna.get_forward_string(), "AAGGTT");
        let fresh = scan_sites(ENZYMES.restriction_enzymes(), dna.forward(), false);
        assert_eq!(dna.restriction_sites(), &fresh);
    }

    #[test]
    fn test_reverse_complement_reflects_annotations() {
        let mut dna = DNAsequence::new_from_raw("test", "ATCGATCGAT", false);
        dna.add_feature(feature_at(1, 3));
        dna.reverse_complement();
        assert_eq!(dna.get_forward_string(), "ATCGATCGAT".chars().rev().map(|c| match c {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            other => other,
        }).collect::<String>());
        assert_eq!(dna.features()[0].start, 8);
        assert_eq!(dna.features()[0].end, 10);
        assert_eq!(dna.features()[0].strand, Strand::Reverse);
        let fresh = scan_sites(ENZYMES.restriction_enzymes(), dna.forward(), false);
        assert_eq!(dna.restriction_sites(), &fresh);
    }

    #[test]
    fn test_reverse_complement_clamps_oversized_spans() {
        // decoded coordinates may run past the sequence end; reversing must
        // not underflow, and the clamped span stays within [1, len]
        let text = "\
LOCUS       x
FEATURES             Location/Qualifiers
     gene            10..50
ORIGIN
        1 acgt
//
";
        let mut dna = DNAsequence::from_genbank_text(text).pop().unwrap();
        assert_eq!((dna.features()[0].start, dna.features()[0].end), (10, 50));
        dna.reverse_complement();
        assert_eq!((dna.features()[0].start, dna.features()[0].end), (1, 1));
        assert_eq!(dna.features()[0].strand, Strand::Reverse);
    }

    #[test]
    fn test_feature_crud() {
        let mut dna = DNAsequence::new_from_raw("test", "ATCG", false);
        let id = dna.add_feature(feature_at(1, 2));
        assert_eq!(dna.features().len(), 1);
        assert!(dna.update_feature(&id, |f| f.name = "ori".to_string()));
        assert_eq!(dna.features()[0].name, "ori");
        assert!(!dna.update_feature("nope", |f| f.name = "x".to_string()));
        assert!(dna.remove_feature(&id));
        assert!(!dna.remove_feature(&id));
    }

    #[test]
    fn test_primer_crud() {
        let mut dna = DNAsequence::new_from_raw("test", "ATCGATCG", false);
        let id = dna.add_primer(Primer {
            name: "fwd".to_string(),
            sequence: "ATCG".to_string(),
            start: 1,
            end: 4,
            ..Default::default()
        });
        assert_eq!(dna.primers().len(), 1);
        assert!(dna.remove_primer(&id));
        assert!(dna.primers().is_empty());
    }

    #[test]
    fn test_gc_and_weight_queries() {
        assert_eq!(DNAsequence::new_from_raw("t", "GCGC", false).gc_percent(), 100.0);
        assert_eq!(DNAsequence::new_from_raw("t", "ATAT", false).gc_percent(), 0.0);
        let empty = DNAsequence::new_from_raw("t", "", false);
        assert_eq!(empty.gc_percent(), 0.0);
        assert_eq!(empty.molecular_weight(), 0.0);
        let single = DNAsequence::new_from_raw("t", "A", false);
        assert!((single.molecular_weight() - 251.25).abs() < 1e-9);
    }

    #[test]
    fn test_get_range_safe() {
        let mut dna = DNAsequence::new_from_raw("t", "ATGC", false);
        assert_eq!(dna.get_range_safe(0..4), Some(b"ATGC".to_vec()));
        assert_eq!(dna.get_range_safe(0..5), None);
        dna.set_circular(true);
        assert_eq!(dna.get_range_safe(0..4), Some(b"ATGC".to_vec()));
        assert_eq!(dna.get_range_safe(4..8), Some(b"ATGC".to_vec()));
        assert_eq!(dna.get_range_safe(1..5), Some(b"TGCA".to_vec()));
    }

    #[test]
    fn test_reverse_complement_range_is_pure() {
        let dna = DNAsequence::new_from_raw("t", "ATCG", false);
        assert_eq!(dna.reverse_complement_range(0..4), Some(b"CGAT".to_vec()));
        assert_eq!(dna.get_forward_string(), "ATCG");
    }

    #[test]
    fn test_pmini_genbank_file() {
        let records = DNAsequence::from_genbank_file("test_files/pMINI.gb").unwrap();
        let dna = records.first().unwrap();
        assert_eq!(dna.name(), "pMINI");
        assert!(dna.is_circular());
        assert_eq!(dna.len(), 120);
        assert_eq!(dna.features().len(), 3);
        assert_eq!(dna.features()[2].name, "demoA");
        assert!(
            dna.restriction_sites()
                .iter()
                .any(|s| s.name == "EcoRI" && s.position == 11)
        );
        assert!(
            dna.restriction_sites()
                .iter()
                .any(|s| s.name == "BamHI" && s.position == 111)
        );
    }

    #[test]
    fn test_pmini_fasta_file() {
        let records = DNAsequence::from_fasta_file("test_files/pMINI.fa").unwrap();
        let dna = records.first().unwrap();
        assert_eq!(dna.name(), "pMINI");
        assert_eq!(dna.description(), "minimal demo plasmid");
        assert_eq!(dna.len(), 120);
        assert!(dna.restriction_sites().iter().any(|s| s.name == "EcoRI"));
    }

    #[test]
    fn test_write_then_reread_genbank() {
        let records = DNAsequence::from_genbank_file("test_files/pMINI.gb").unwrap();
        let dna = records.first().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gb");
        dna.write_genbank_file(path.to_str().unwrap()).unwrap();
        let reread = DNAsequence::from_genbank_file(path.to_str().unwrap()).unwrap();
        let reread = reread.first().unwrap();
        assert_eq!(reread.get_forward_string(), dna.get_forward_string());
        assert_eq!(reread.is_circular(), dna.is_circular());
        assert_eq!(reread.features().len(), dna.features().len());
    }

    #[test]
    fn test_set_circular_rescans() {
        // EcoRI site only exists across the origin
        let mut dna = DNAsequence::new_from_raw("t", "TTCAAAAGAA", false);
        assert!(!dna.restriction_sites().iter().any(|s| s.name == "EcoRI"));
        dna.set_circular(true);
        assert!(
            dna.restriction_sites()
                .iter()
                .any(|s| s.name == "EcoRI" && s.position == 8)
        );
    }
}
