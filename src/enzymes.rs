use crate::restriction_enzyme::RestrictionEnzyme;
use anyhow::{anyhow, Result};
use std::fs;

const BUILTIN_ENZYMES_JSON: &str = include_str!("../assets/enzymes.json");

/// The restriction enzyme catalog. Loaded once at process start (see the
/// `ENZYMES` global in `lib.rs`) and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Enzymes {
    restriction_enzymes: Vec<RestrictionEnzyme>,
    max_re_length: usize,
}

impl Enzymes {
    fn new(json_text: &str) -> Result<Self> {
        let mut ret = Self {
            restriction_enzymes: vec![],
            max_re_length: 0,
        };
        let res: serde_json::Value = serde_json::from_str(json_text)?;
        let arr = res
            .as_array()
            .ok_or(anyhow!("Enzymes file is not a JSON array"))?;
        for row in arr {
            let enzyme_type = match row.get("type") {
                Some(et) => et,
                None => {
                    eprintln!("Enzyme row without a type, skipping: {row}");
                    continue;
                }
            };
            match enzyme_type.as_str() {
                Some("restriction") => {
                    let mut re: RestrictionEnzyme = match serde_json::from_str(&row.to_string()) {
                        Ok(re) => re,
                        Err(_) => return Err(anyhow!("Bad restriction enzyme: {row}")),
                    };
                    re.normalize();
                    ret.restriction_enzymes.push(re);
                }
                Some(other) => {
                    eprintln!("Unknown enzyme type '{other}', skipping: {row}");
                }
                None => return Err(anyhow!("Missing enzyme type for {row}")),
            }
        }
        ret.max_re_length = ret
            .restriction_enzymes
            .iter()
            .map(|re| re.sequence.len())
            .max()
            .unwrap_or(0);
        Ok(ret)
    }

    pub fn from_json_text(json_text: &str) -> Result<Self> {
        Self::new(json_text)
    }

    pub fn from_json_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::new(&text)
    }

    pub fn restriction_enzymes(&self) -> &Vec<RestrictionEnzyme> {
        &self.restriction_enzymes
    }

    pub fn restriction_enzymes_by_name(&self, names: &[&str]) -> Vec<RestrictionEnzyme> {
        self.restriction_enzymes
            .iter()
            .filter(|re| names.contains(&re.name.as_str()))
            .cloned()
            .collect()
    }

    /// Length of the longest recognition sequence in the catalog.
    pub fn max_re_length(&self) -> usize {
        self.max_re_length
    }
}

impl Default for Enzymes {
    fn default() -> Self {
        Enzymes::new(BUILTIN_ENZYMES_JSON).unwrap()
    }
}
