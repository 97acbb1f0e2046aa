use crate::iupac_code::IupacCode;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One catalog entry: an enzyme name and its recognition sequence.
/// The recognition sequence may contain IUPAC ambiguity codes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestrictionEnzyme {
    pub name: String,
    pub sequence: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// A single recognition site match. Derived data: the full set is
/// recomputed from the sequence on every edit, never patched in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestrictionSite {
    pub id: String,
    pub name: String,
    pub pattern: String,
    /// 1-based start of the match on the forward strand.
    pub position: usize,
}

impl RestrictionEnzyme {
    /// Uppercases the recognition sequence so scanning can compare bytes
    /// without re-normalizing per window.
    pub fn normalize(&mut self) {
        self.sequence = self
            .sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
    }

    /// All matches of this enzyme's recognition sequence against `seq`.
    /// Every start offset is tested independently, so overlapping matches
    /// are all reported. On a circular sequence, windows that wrap across
    /// the origin are tested as well.
    pub fn get_sites(&self, seq: &[u8], is_circular: bool) -> Vec<RestrictionSite> {
        let pattern = self.sequence.as_bytes();
        if pattern.is_empty() || seq.is_empty() || pattern.len() > seq.len() {
            return vec![];
        }
        let starts = if is_circular {
            seq.len()
        } else {
            seq.len() - pattern.len() + 1
        };
        let mut ret = vec![];
        'windows: for start in 0..starts {
            for (i, &p) in pattern.iter().enumerate() {
                let base = seq[(start + i) % seq.len()];
                if !IupacCode::letter_matches(p, base) {
                    continue 'windows;
                }
            }
            ret.push(RestrictionSite {
                id: format!("{}-{}", self.name, start + 1),
                name: self.name.clone(),
                pattern: self.sequence.clone(),
                position: start + 1,
            });
        }
        ret
    }
}

/// Scans `seq` with every catalog enzyme and returns the complete site set,
/// sorted by position, ties broken by enzyme name.
pub fn scan_sites(
    enzymes: &[RestrictionEnzyme],
    seq: &[u8],
    is_circular: bool,
) -> Vec<RestrictionSite> {
    let mut sites: Vec<RestrictionSite> = enzymes
        .par_iter()
        .flat_map(|re| re.get_sites(seq, is_circular))
        .collect();
    sites.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
    sites
}
