use crate::genome::{Chromosome, Gene, Genome};

/// Genome of `size` identical chromosomes whose genes all carry `dna` and
/// are switched on per direction by `active`.
pub(crate) fn uniform_genome(active: [bool; 4], dna: usize, size: usize) -> Genome {
    let chromosome = Chromosome::new(std::array::from_fn(|i| Gene::new(dna, active[i])));
    Genome::from_chromosomes(vec![chromosome; size]).expect("size must be non-zero")
}
