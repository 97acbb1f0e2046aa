const MAX_SECTION_SIZE: usize = 100;

/// GC fraction of one window of the sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct GcRegion {
    from: usize,
    to: usize,
    gc: f64,
}

impl GcRegion {
    #[inline(always)]
    pub fn from(&self) -> usize {
        self.from
    }

    #[inline(always)]
    pub fn to(&self) -> usize {
        self.to
    }

    #[inline(always)]
    pub fn gc(&self) -> f64 {
        self.gc
    }
}

/// Windowed GC content along a sequence, for plotting.
#[derive(Clone, Debug, Default)]
pub struct GcContents {
    regions: Vec<GcRegion>,
}

impl GcContents {
    pub fn new_from_sequence(sequence: &[u8]) -> Self {
        let mut ret = Self::default();
        let section_size = sequence.len().min(MAX_SECTION_SIZE);
        let mut pos = 0;
        while pos < sequence.len() {
            let to = sequence.len().min(pos + section_size);
            ret.regions.push(GcRegion {
                from: pos,
                to,
                gc: gc_fraction(&sequence[pos..to]),
            });
            pos += section_size;
        }
        ret
    }

    #[inline(always)]
    pub fn regions(&self) -> &[GcRegion] {
        &self.regions
    }
}

#[inline(always)]
fn gc_fraction(sequence: &[u8]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gc = sequence
        .iter()
        .map(|c| c.to_ascii_uppercase())
        .filter(|&c| c == b'G' || c == b'C')
        .count();
    gc as f64 / sequence.len() as f64
}

/// GC content of the whole sequence as a percentage. Empty sequence is 0.
pub fn gc_percent(sequence: &[u8]) -> f64 {
    gc_fraction(sequence) * 100.0
}
