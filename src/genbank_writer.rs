//! GenBank flat-file encoder.
//!
//! Produces a syntactically valid record from a `DNAsequence`. Metadata
//! that is absent on the record is written with placeholder values rather
//! than omitting the line, so the output always carries the full header.

use crate::{
    dna_sequence::DNAsequence,
    feature::{Feature, Strand},
};
use chrono::Local;

const ORIGIN_LINE_LEN: usize = 60;
const ORIGIN_CHUNK_LEN: usize = 10;
const QUALIFIER_INDENT: &str = "                     ";

fn locus_date(record: &DNAsequence) -> String {
    if !record.date().is_empty() {
        return record.date().to_string();
    }
    Local::now().format("%d-%b-%Y").to_string().to_uppercase()
}

fn location(feature: &Feature) -> String {
    match feature.strand {
        Strand::Reverse => format!("complement({}..{})", feature.start, feature.end),
        _ => format!("{}..{}", feature.start, feature.end),
    }
}

fn push_feature(out: &mut String, feature: &Feature) {
    out.push_str(&format!(
        "     {:<15} {}\n",
        feature.kind,
        location(feature)
    ));
    if !feature.name.is_empty() {
        out.push_str(&format!("{QUALIFIER_INDENT}/gene=\"{}\"\n", feature.name));
    }
    if !feature.label.is_empty() && feature.label != feature.name {
        out.push_str(&format!("{QUALIFIER_INDENT}/label=\"{}\"\n", feature.label));
    }
    if !feature.note.is_empty() {
        out.push_str(&format!("{QUALIFIER_INDENT}/note=\"{}\"\n", feature.note));
    }
    if let Some(frame) = feature.frame {
        out.push_str(&format!("{QUALIFIER_INDENT}/codon_start={}\n", frame + 1));
    }
}

fn push_origin(out: &mut String, seq: &[u8]) {
    out.push_str("ORIGIN\n");
    for (line_index, line) in seq.chunks(ORIGIN_LINE_LEN).enumerate() {
        out.push_str(&format!("{:>9}", line_index * ORIGIN_LINE_LEN + 1));
        for chunk in line.chunks(ORIGIN_CHUNK_LEN) {
            out.push(' ');
            out.extend(chunk.iter().map(|c| c.to_ascii_lowercase() as char));
        }
        out.push('\n');
    }
}

pub fn generate(record: &DNAsequence) -> String {
    let name = if record.name().is_empty() {
        "unknown"
    } else {
        record.name()
    };
    let accession = if record.accession().is_empty() {
        "unknown"
    } else {
        record.accession()
    };
    let organism = if record.organism().is_empty() {
        "unknown"
    } else {
        record.organism()
    };
    let topology = if record.is_circular() {
        "circular"
    } else {
        "linear"
    };

    let mut out = String::new();
    out.push_str(&format!(
        "LOCUS       {:<16} {:>7} bp    DNA     {}   {}\n",
        name,
        record.len(),
        topology,
        locus_date(record)
    ));
    let definition = if record.description().is_empty() {
        name
    } else {
        record.description()
    };
    out.push_str(&format!("DEFINITION  {definition}\n"));
    out.push_str(&format!("ACCESSION   {accession}\n"));
    out.push_str(&format!("VERSION     {accession}.1\n"));
    out.push_str("KEYWORDS    .\n");
    out.push_str(&format!("SOURCE      {organism}\n"));
    out.push_str(&format!("  ORGANISM  {organism}\n"));
    out.push_str("            .\n");

    out.push_str("FEATURES             Location/Qualifiers\n");
    for feature in record.features() {
        push_feature(&mut out, feature);
    }

    push_origin(&mut out, record.forward());
    out.push_str("//\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_record() -> DNAsequence {
        let mut dna = DNAsequence::new_from_raw("pDEMO", &"GAATTC".repeat(12), true);
        dna.add_feature(Feature {
            kind: "gene".to_string(),
            start: 5,
            end: 20,
            strand: Strand::Reverse,
            name: "lacZ".to_string(),
            label: "beta-gal".to_string(),
            note: "test gene".to_string(),
            ..Default::default()
        });
        dna.add_feature(Feature {
            kind: "CDS".to_string(),
            start: 21,
            end: 60,
            name: "orf1".to_string(),
            frame: Some(0),
            ..Default::default()
        });
        dna
    }

    #[test]
    fn test_header_lines() {
        let text = generate(&demo_record());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("LOCUS       pDEMO"));
        assert!(lines[0].contains("72 bp"));
        assert!(lines[0].contains("circular"));
        assert_eq!(lines[1], "DEFINITION  pDEMO");
        assert_eq!(lines[2], "ACCESSION   unknown");
        assert_eq!(lines[3], "VERSION     unknown.1");
        assert_eq!(lines[4], "KEYWORDS    .");
        assert_eq!(lines[5], "SOURCE      unknown");
        assert!(text.ends_with("//\n"));
    }

    #[test]
    fn test_feature_lines() {
        let text = generate(&demo_record());
        assert!(text.contains("     gene            complement(5..20)\n"));
        assert!(text.contains("                     /gene=\"lacZ\"\n"));
        assert!(text.contains("                     /label=\"beta-gal\"\n"));
        assert!(text.contains("                     /note=\"test gene\"\n"));
        assert!(text.contains("     CDS             21..60\n"));
        assert!(text.contains("                     /codon_start=1\n"));
        // label equal to the gene name is not repeated
        let mut dna = demo_record();
        dna.update_feature("feature-1", |f| f.label = "lacZ".to_string());
        assert!(!generate(&dna).contains("/label="));
    }

    #[test]
    fn test_origin_block_layout() {
        let dna = DNAsequence::new_from_raw("x", &"A".repeat(70), false);
        let text = generate(&dna);
        let origin: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "ORIGIN")
            .skip(1)
            .take_while(|l| *l != "//")
            .collect();
        assert_eq!(origin.len(), 2);
        assert_eq!(
            origin[0],
            format!("        1 {}", "aaaaaaaaaa ".repeat(6).trim_end())
        );
        assert_eq!(origin[1], "       61 aaaaaaaaaa");
    }

    #[test]
    fn test_round_trip() {
        let original = demo_record();
        let decoded = DNAsequence::from_genbank_text(&generate(&original));
        assert_eq!(decoded.len(), 1);
        let decoded = &decoded[0];
        assert_eq!(decoded.get_forward_string(), original.get_forward_string());
        assert_eq!(decoded.len(), original.len());
        assert_eq!(decoded.is_circular(), original.is_circular());
        assert_eq!(decoded.features().len(), original.features().len());
        for (a, b) in original.features().iter().zip(decoded.features()) {
            assert_eq!((a.start, a.end, a.strand), (b.start, b.end, b.strand));
            assert_eq!(a.name, b.name);
        }
        assert_eq!(decoded.restriction_sites(), original.restriction_sites());
    }

    #[test]
    fn test_empty_record_still_valid() {
        let dna = DNAsequence::new_from_raw("", "", false);
        let text = generate(&dna);
        assert!(text.starts_with("LOCUS       unknown"));
        assert!(text.contains("\nORIGIN\n//\n"));
        let decoded = DNAsequence::from_genbank_text(&text);
        assert_eq!(decoded.len(), 1);
        assert!(decoded[0].is_empty());
    }
}
