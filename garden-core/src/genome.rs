//! Genetic encoding of a plant's branching program.
//!
//! A [`Genome`] is a list of [`Chromosome`]s, each holding one [`Gene`] per
//! [`Direction`]. A growth tip reads the genes of its genome's *active*
//! chromosome to decide where to branch; the `dna` of each gene names the
//! chromosome that becomes active in the branch grown from it.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::{debug, warn};

use crate::{
    error::{SimError, Violation},
    types::{CHROMOSOME_LENGTH, Direction},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gene {
    dna: usize,
    active: bool,
}

impl Gene {
    pub fn new(dna: usize, active: bool) -> Self {
        Self { dna, active }
    }

    pub fn dna(&self) -> usize {
        self.dna
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn random(dna_range: RangeInclusive<usize>, active_chance: f64, rng: &mut impl Rng) -> Self {
        Self {
            dna: rng.random_range(dna_range),
            active: rng.random_bool(active_chance),
        }
    }

    /// Redraws both fields: `dna` uniformly from `dna_range`, `active`
    /// with probability `active_chance`.
    ///
    /// ### Panics
    /// If `dna_range` is empty or `active_chance` is outside `[0, 1]`.
    pub fn mutate(&mut self, dna_range: RangeInclusive<usize>, active_chance: f64, rng: &mut impl Rng) {
        *self = Self::random(dna_range, active_chance, rng);
    }
}

/// One gene per [`Direction`], stored in [`Direction::ALL`] order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chromosome {
    genes: [Gene; CHROMOSOME_LENGTH],
}

impl Chromosome {
    pub fn new(genes: [Gene; CHROMOSOME_LENGTH]) -> Self {
        Self { genes }
    }

    pub fn genes(&self) -> &[Gene; CHROMOSOME_LENGTH] {
        &self.genes
    }

    pub fn gene(&self, direction: Direction) -> Gene {
        self.genes[direction as usize]
    }

    /// Mutates one gene picked uniformly at random.
    pub fn mutate(&mut self, dna_range: RangeInclusive<usize>, active_chance: f64, rng: &mut impl Rng) {
        let index = rng.random_range(0..self.genes.len());
        self.genes[index].mutate(dna_range, active_chance, rng);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genome {
    chromosomes: Vec<Chromosome>,
    active: usize,
}

impl Genome {
    /// Builds a genome whose active chromosome is the first one.
    ///
    /// ### Errors
    /// [`Violation::EmptyGenome`] if `chromosomes` is empty.
    pub fn from_chromosomes(chromosomes: Vec<Chromosome>) -> Result<Self, SimError> {
        if chromosomes.is_empty() {
            return Err(Violation::EmptyGenome.into());
        }
        Ok(Self {
            chromosomes,
            active: 0,
        })
    }

    /// Draws a random genome of `size` chromosomes.
    ///
    /// Every gene gets a `dna` uniform in `[0, size - 1]` and is active with
    /// probability `active_chance`.
    ///
    /// ### Parameters
    /// - `size` - Number of chromosomes.
    /// - `chromosome_length` - Genes per chromosome; must equal the number
    ///   of grid directions.
    /// - `active_chance` - Probability that a gene is active.
    /// - `rng` - Source of randomness.
    ///
    /// ### Errors
    /// - [`Violation::ChromosomeLength`] if `chromosome_length` is not the
    ///   direction count.
    /// - [`Violation::EmptyGenome`] if `size` is zero.
    /// - [`SimError::InvalidConfig`] if `active_chance` is not a probability.
    pub fn random(
        size: usize,
        chromosome_length: usize,
        active_chance: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if chromosome_length != CHROMOSOME_LENGTH {
            return Err(Violation::ChromosomeLength {
                expected: CHROMOSOME_LENGTH,
                actual: chromosome_length,
            }
            .into());
        }
        if size == 0 {
            return Err(Violation::EmptyGenome.into());
        }
        if !(0.0..=1.0).contains(&active_chance) {
            return Err(SimError::InvalidConfig("active_chance must be in [0, 1]"));
        }

        let chromosomes = (0..size)
            .map(|_| {
                Chromosome::new(std::array::from_fn(|_| {
                    Gene::random(0..=size - 1, active_chance, rng)
                }))
            })
            .collect();

        Self::from_chromosomes(chromosomes)
    }

    /// Deep copy with the active chromosome reset to the first one.
    pub fn copy(&self) -> Self {
        Self {
            chromosomes: self.chromosomes.clone(),
            active: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_chromosome(&self) -> &Chromosome {
        &self.chromosomes[self.active]
    }

    pub fn set_active_chromosome(&mut self, index: usize) -> Result<(), SimError> {
        if index >= self.chromosomes.len() {
            return Err(SimError::OutOfRange {
                index,
                len: self.chromosomes.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    /// Applies one point mutation to a chromosome picked uniformly at random.
    /// An empty `dna_range` skips the mutation.
    ///
    /// ### Panics
    /// If `active_chance` is outside `[0, 1]`.
    pub fn mutate(&mut self, dna_range: RangeInclusive<usize>, active_chance: f64, rng: &mut impl Rng) {
        if dna_range.is_empty() {
            warn!(?dna_range, "empty dna range, mutation skipped");
            return;
        }
        let index = rng.random_range(0..self.chromosomes.len());
        self.chromosomes[index].mutate(dna_range, active_chance, rng);
        debug!(chromosome = index, "genome mutated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn all_genes(genome: &Genome) -> Vec<Gene> {
        genome
            .chromosomes()
            .iter()
            .flat_map(|c| c.genes().iter().copied())
            .collect()
    }

    #[test]
    fn random_genome_has_requested_shape_and_bounded_dna() {
        let mut rng = StdRng::seed_from_u64(1);
        let genome = Genome::random(16, 4, 0.5, &mut rng).unwrap();

        assert_eq!(genome.len(), 16);
        assert_eq!(genome.active_index(), 0);
        for chromosome in genome.chromosomes() {
            assert_eq!(chromosome.genes().len(), Direction::ALL.len());
        }
        assert!(all_genes(&genome).iter().all(|g| g.dna() < 16));
    }

    #[test]
    fn random_genome_respects_active_chance_extremes() {
        let mut rng = StdRng::seed_from_u64(2);
        let all_on = Genome::random(8, 4, 1.0, &mut rng).unwrap();
        let all_off = Genome::random(8, 4, 0.0, &mut rng).unwrap();

        assert!(all_genes(&all_on).iter().all(|g| g.is_active()));
        assert!(all_genes(&all_off).iter().all(|g| !g.is_active()));
    }

    #[test]
    fn random_genome_rejects_wrong_chromosome_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = Genome::random(16, 3, 0.5, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SimError::InvariantViolation(Violation::ChromosomeLength {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn random_genome_rejects_zero_size() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(
            Genome::random(0, 4, 0.5, &mut rng),
            Err(SimError::InvariantViolation(Violation::EmptyGenome))
        );
    }

    #[test]
    fn random_genome_rejects_chance_outside_unit_interval() {
        let mut rng = StdRng::seed_from_u64(4);
        for chance in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                Genome::random(8, 4, chance, &mut rng),
                Err(SimError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn same_seed_gives_same_genome() {
        let a = Genome::random(16, 4, 0.5, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = Genome::random(16, 4, 0.5, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn copy_is_deep_and_resets_active_chromosome() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut original = Genome::random(16, 4, 0.5, &mut rng).unwrap();
        original.set_active_chromosome(7).unwrap();

        let mut copy = original.copy();
        assert_eq!(copy.active_index(), 0);
        assert_eq!(copy.chromosomes(), original.chromosomes());

        let before = all_genes(&original);
        for _ in 0..50 {
            copy.mutate(0..=15, 0.5, &mut rng);
        }

        assert_eq!(all_genes(&original), before);
        assert_eq!(original.active_index(), 7);
    }

    #[test]
    fn set_active_chromosome_rejects_index_past_end() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut genome = Genome::random(4, 4, 0.5, &mut rng).unwrap();

        assert_eq!(genome.set_active_chromosome(3), Ok(()));
        assert_eq!(genome.active_index(), 3);
        assert_eq!(
            genome.set_active_chromosome(4),
            Err(SimError::OutOfRange { index: 4, len: 4 })
        );
        // A failed call leaves the previous choice in place.
        assert_eq!(genome.active_index(), 3);
    }

    #[test]
    fn mutate_touches_at_most_one_gene() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = Genome::random(16, 4, 0.5, &mut rng).unwrap();

        for _ in 0..20 {
            let before = all_genes(&genome);
            genome.mutate(0..=15, 0.5, &mut rng);
            let after = all_genes(&genome);

            let changed = before.iter().zip(&after).filter(|(a, b)| a != b).count();
            assert!(changed <= 1, "mutation changed {changed} genes");
            assert!(after.iter().all(|g| g.dna() <= 15));
        }
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn mutate_with_empty_range_is_ignored() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut genome = Genome::random(4, 4, 0.5, &mut rng).unwrap();
        let before = genome.clone();

        genome.mutate(5..=1, 0.5, &mut rng);

        assert_eq!(genome, before);
    }

    #[test]
    fn chromosome_genes_follow_direction_order() {
        let chromosome = Chromosome::new([
            Gene::new(0, true),
            Gene::new(1, false),
            Gene::new(2, true),
            Gene::new(3, false),
        ]);

        assert_eq!(chromosome.gene(Direction::Up).dna(), 0);
        assert_eq!(chromosome.gene(Direction::Down).dna(), 1);
        assert_eq!(chromosome.gene(Direction::Left).dna(), 2);
        assert_eq!(chromosome.gene(Direction::Right).dna(), 3);
    }
}
