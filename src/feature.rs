use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strand of an annotated region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
    Both,
}

impl Strand {
    pub fn flipped(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Both => Strand::Both,
        }
    }
}

/// An annotated region of a sequence. `start` and `end` are 1-based
/// inclusive residue positions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub kind: String,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
    pub name: String,
    pub label: String,
    pub note: String,
    /// Reading frame offset (0, 1 or 2), only meaningful for CDS features.
    pub frame: Option<u8>,
}

impl Feature {
    /// Label shown in feature lists; falls back to the name when no
    /// explicit label was set.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// A PCR primer. Plain data, no derived state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Primer {
    pub id: String,
    pub name: String,
    pub sequence: String,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
}

/// The feature qualifiers the data model understands. Everything else in a
/// feature table is ignored. Adding a qualifier means adding a variant and
/// a match arm here, not another string comparison in the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualifierKey {
    Gene,
    Label,
    Note,
    LocusTag,
    Product,
    CodonStart,
}

impl QualifierKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gene" => Some(Self::Gene),
            "label" => Some(Self::Label),
            "note" => Some(Self::Note),
            "locus_tag" => Some(Self::LocusTag),
            "product" => Some(Self::Product),
            "codon_start" => Some(Self::CodonStart),
            _ => None,
        }
    }

    /// Applies one qualifier value to a feature under construction.
    pub fn apply(self, feature: &mut Feature, value: &str) {
        match self {
            // gene owns the name, label owns the label; each fills the
            // other field only when it is still empty, so a record carrying
            // both qualifiers keeps both values across a round trip
            Self::Gene => {
                feature.name = value.to_string();
                if feature.label.is_empty() {
                    feature.label = value.to_string();
                }
            }
            Self::Label => {
                feature.label = value.to_string();
                if feature.name.is_empty() {
                    feature.name = value.to_string();
                }
            }
            Self::Note => feature.note = value.to_string(),
            Self::LocusTag => {
                if feature.name.is_empty() {
                    feature.name = value.to_string();
                }
            }
            Self::Product => {
                if feature.label.is_empty() {
                    feature.label = value.to_string();
                }
            }
            Self::CodonStart => {
                // GenBank codon_start is 1-based; frame is the 0-based offset
                if let Ok(n) = value.parse::<u8>() {
                    if (1..=3).contains(&n) {
                        feature.frame = Some(n - 1);
                    }
                }
            }
        }
    }
}

const DEFAULT_FEATURE_COLOR: &str = "#BB8FCE";

lazy_static! {
    static ref FEATURE_COLORS: HashMap<&'static str, &'static str> = HashMap::from([
        ("gene", "#FF6B6B"),
        ("CDS", "#4ECDC4"),
        ("exon", "#45B7D1"),
        ("intron", "#96CEB4"),
        ("promoter", "#FFEAA7"),
        ("terminator", "#DDA0DD"),
        ("rep_origin", "#98D8C8"),
        ("primer_bind", "#F7DC6F"),
        ("misc_feature", "#BB8FCE"),
        ("misc_binding", "#85C1E9"),
        ("LTR", "#F8C471"),
        ("repeat_region", "#82E0AA"),
        ("stem_loop", "#F1948A"),
        ("protein_bind", "#85C1E9"),
        ("sig_peptide", "#F7DC6F"),
        ("mat_peptide", "#BB8FCE"),
        ("source", "#D5DBDB"),
        ("D-loop", "#AED6F1"),
        ("variation", "#FAD7A0"),
        ("5'UTR", "#AED6F1"),
        ("3'UTR", "#A9DFBF"),
        ("enhancer", "#F9E79F"),
        ("attenuator", "#D7BDE2"),
        ("RBS", "#F5B7B1"),
        ("polyA_signal", "#A3E4D7"),
        ("polyA_site", "#FAD7A0"),
        ("prim_transcript", "#AED6F1"),
        ("tRNA", "#A9DFBF"),
        ("rRNA", "#F9E79F"),
        ("mRNA", "#D7BDE2"),
        ("ncRNA", "#F5B7B1"),
        ("miRNA", "#A3E4D7"),
        ("snRNA", "#FAD7A0"),
        ("snoRNA", "#AED6F1"),
    ]);
}

/// Display color for a feature type. Purely cosmetic, used by the UI layer.
pub fn feature_color(kind: &str) -> &'static str {
    FEATURE_COLORS.get(kind).copied().unwrap_or(DEFAULT_FEATURE_COLOR)
}
