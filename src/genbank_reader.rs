//! Line-oriented GenBank flat-file decoder.
//!
//! The decoder is deliberately forgiving: lines that do not match a
//! recognized shape are ignored, missing sections degrade to empty fields,
//! and record text never produces an error.

use crate::{
    dna_sequence::DNAsequence,
    feature::{Feature, QualifierKey, Strand},
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RANGE_RE: Regex = Regex::new(r"(\d+)\.\.(\d+)").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"(\d+)").unwrap();
    static ref QUALIFIER_RE: Regex = Regex::new(r#"^/([^=\s]+)(?:=(.*))?$"#).unwrap();
    static ref SEQUENCE_LINE_RE: Regex = Regex::new(r"\d+\s+([acgtnACGTN\s]+)").unwrap();
    static ref LOCUS_DATE_RE: Regex = Regex::new(r"\d{1,2}-[A-Za-z]{3}-\d{4}").unwrap();
}

#[derive(Clone, Copy)]
enum State {
    Header,
    Features,
    Sequence,
}

#[derive(Default)]
struct RecordBuilder {
    locus_name: String,
    definition: String,
    accession: String,
    organism: String,
    source: String,
    date: String,
    is_circular: bool,
    features: Vec<Feature>,
    current_feature: Option<(String, Vec<String>)>,
    sequence: String,
}

impl RecordBuilder {
    fn has_data(&self) -> bool {
        !self.locus_name.is_empty()
            || !self.definition.is_empty()
            || !self.accession.is_empty()
            || !self.sequence.is_empty()
            || !self.features.is_empty()
            || self.current_feature.is_some()
    }

    fn parse_locus(&mut self, rest: &str) {
        let mut tokens = rest.split_whitespace();
        if let Some(name) = tokens.next() {
            self.locus_name = name.to_string();
        }
        for token in rest.split_whitespace() {
            if token.eq_ignore_ascii_case("circular") {
                self.is_circular = true;
            }
            if LOCUS_DATE_RE.is_match(token) {
                self.date = token.to_string();
            }
        }
    }

    fn open_feature(&mut self, line: &str) {
        self.finalize_feature();
        let trimmed = line.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let kind = match parts.next() {
            Some(kind) if !kind.is_empty() => kind.to_string(),
            _ => return,
        };
        let location = parts.next().unwrap_or("").trim().to_string();
        self.current_feature = Some((kind, vec![location]));
    }

    fn continue_feature(&mut self, line: &str) {
        if let Some((_, lines)) = &mut self.current_feature {
            lines.push(line.trim().to_string());
        }
    }

    /// Turns the buffered raw lines of the current feature into a `Feature`.
    /// The first line is the location expression; the rest are qualifiers.
    fn finalize_feature(&mut self) {
        let Some((kind, lines)) = self.current_feature.take() else {
            return;
        };
        let mut feature = Feature {
            id: format!("feature-{}", self.features.len()),
            kind,
            // fallback when the location yields no usable position
            start: 1,
            end: 1,
            ..Default::default()
        };
        if let Some(location) = lines.first() {
            if location.contains("complement") {
                feature.strand = Strand::Reverse;
            }
            if let Some(caps) = RANGE_RE.captures(location) {
                feature.start = caps[1].parse().unwrap_or(1);
                feature.end = caps[2].parse().unwrap_or(feature.start);
            } else if let Some(caps) = NUMBER_RE.captures(location) {
                feature.start = caps[1].parse().unwrap_or(1);
                feature.end = feature.start;
            }
        }
        for line in lines.iter().skip(1) {
            let Some(caps) = QUALIFIER_RE.captures(line) else {
                continue;
            };
            let Some(key) = QualifierKey::from_key(&caps[1]) else {
                continue;
            };
            let value = caps
                .get(2)
                .map(|m| m.as_str().trim().trim_matches('"'))
                .unwrap_or("");
            key.apply(&mut feature, value);
        }
        if feature.name.is_empty() {
            feature.name = format!("{}_{}", feature.kind, feature.start);
        }
        self.features.push(feature);
    }

    fn append_sequence_line(&mut self, line: &str) {
        if let Some(caps) = SEQUENCE_LINE_RE.captures(line) {
            self.sequence.extend(
                caps[1]
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| c.to_ascii_uppercase()),
            );
        }
    }

    fn build(mut self) -> DNAsequence {
        self.finalize_feature();
        let id = if !self.accession.is_empty() {
            self.accession.clone()
        } else if !self.locus_name.is_empty() {
            self.locus_name.clone()
        } else {
            "unknown".to_string()
        };
        let organism = if !self.organism.is_empty() {
            self.organism
        } else {
            self.source
        };
        DNAsequence::from_decoded(
            id,
            self.locus_name,
            self.definition,
            organism,
            self.accession,
            self.date,
            DNAsequence::normalize_residues(self.sequence.as_bytes()),
            self.is_circular,
            self.features,
        )
    }
}

fn rest_after<'a>(line: &'a str, keyword: &str) -> &'a str {
    line[keyword.len()..].trim()
}

/// A feature-table line that opens a new feature: exactly five leading
/// spaces followed by the feature type token. A whitespace-only line of
/// five spaces is not a feature line.
fn is_new_feature_line(line: &str) -> bool {
    line.starts_with("     ")
        && line
            .as_bytes()
            .get(5)
            .is_some_and(|b| !b.is_ascii_whitespace())
}

/// Parses GenBank text into records. Records are separated by `//`; text
/// after the last terminator that still carries data becomes a final record.
pub fn parse_text(text: &str) -> Vec<DNAsequence> {
    let mut records = vec![];
    let mut builder = RecordBuilder::default();
    let mut state = State::Header;

    for line in text.lines() {
        if line.starts_with("//") {
            if builder.has_data() {
                records.push(std::mem::take(&mut builder).build());
            } else {
                builder = RecordBuilder::default();
            }
            state = State::Header;
            continue;
        }
        match state {
            State::Header => {
                if line.starts_with("LOCUS") {
                    builder.parse_locus(rest_after(line, "LOCUS"));
                } else if line.starts_with("DEFINITION") {
                    builder.definition = rest_after(line, "DEFINITION").to_string();
                } else if line.starts_with("ACCESSION") {
                    builder.accession = rest_after(line, "ACCESSION").to_string();
                } else if line.starts_with("VERSION") || line.starts_with("KEYWORDS") {
                    // recognized, but not carried in the data model
                } else if line.starts_with("SOURCE") {
                    builder.source = rest_after(line, "SOURCE").to_string();
                } else if line.starts_with(' ') && line.trim_start().starts_with("ORGANISM") {
                    builder.organism = rest_after(line.trim_start(), "ORGANISM").to_string();
                } else if line.starts_with("FEATURES") {
                    state = State::Features;
                } else if line.starts_with("ORIGIN") {
                    state = State::Sequence;
                }
            }
            State::Features => {
                if line.starts_with("ORIGIN") {
                    builder.finalize_feature();
                    state = State::Sequence;
                } else if is_new_feature_line(line) {
                    builder.open_feature(line);
                } else if line.starts_with("      ") {
                    builder.continue_feature(line);
                }
            }
            State::Sequence => builder.append_sequence_line(line),
        }
    }
    // tolerate a missing final terminator
    if builder.has_data() {
        records.push(builder.build());
    }
    records
}
