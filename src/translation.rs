use crate::iupac_code::reverse_complement;

/// Translates one codon with the standard genetic code. Stop codons map to
/// `*`; anything that is not a complete, recognized codon maps to `?`.
pub fn codon_to_amino_acid(codon: &[u8]) -> char {
    if codon.len() != 3 {
        return '?';
    }
    let codon = [
        codon[0].to_ascii_uppercase(),
        codon[1].to_ascii_uppercase(),
        codon[2].to_ascii_uppercase(),
    ];
    match &codon {
        b"TTT" | b"TTC" => 'F',
        b"TTA" | b"TTG" | b"CTT" | b"CTC" | b"CTA" | b"CTG" => 'L',
        b"TCT" | b"TCC" | b"TCA" | b"TCG" | b"AGT" | b"AGC" => 'S',
        b"TAT" | b"TAC" => 'Y',
        b"TAA" | b"TAG" | b"TGA" => '*',
        b"TGT" | b"TGC" => 'C',
        b"TGG" => 'W',
        b"CCT" | b"CCC" | b"CCA" | b"CCG" => 'P',
        b"CAT" | b"CAC" => 'H',
        b"CAA" | b"CAG" => 'Q',
        b"CGT" | b"CGC" | b"CGA" | b"CGG" | b"AGA" | b"AGG" => 'R',
        b"ATT" | b"ATC" | b"ATA" => 'I',
        b"ATG" => 'M',
        b"ACT" | b"ACC" | b"ACA" | b"ACG" => 'T',
        b"AAT" | b"AAC" => 'N',
        b"AAA" | b"AAG" => 'K',
        b"GTT" | b"GTC" | b"GTA" | b"GTG" => 'V',
        b"GCT" | b"GCC" | b"GCA" | b"GCG" => 'A',
        b"GAT" | b"GAC" => 'D',
        b"GAA" | b"GAG" => 'E',
        b"GGT" | b"GGC" | b"GGA" | b"GGG" => 'G',
        _ => '?',
    }
}

/// Translates `seq` starting at `frame` (0, 1 or 2). The trailing partial
/// codon, if any, is dropped.
pub fn translate(seq: &[u8], frame: usize) -> String {
    let mut protein = String::with_capacity(seq.len() / 3);
    let mut i = frame;
    while i + 3 <= seq.len() {
        protein.push(codon_to_amino_acid(&seq[i..i + 3]));
        i += 3;
    }
    protein
}

/// Translations of all six reading frames: forward 0/1/2, then the
/// reverse complement 0/1/2.
pub fn translate_six_frames(seq: &[u8]) -> Vec<String> {
    let rc = reverse_complement(seq);
    (0..3)
        .map(|frame| translate(seq, frame))
        .chain((0..3).map(|frame| translate(&rc, frame)))
        .collect()
}
