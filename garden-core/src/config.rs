use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Tunable constants of a garden run.
///
/// Built once at startup and handed to [`crate::garden::Garden::new`];
/// nothing reads these values from the environment afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Number of chromosomes in every genome; also bounds gene `dna` values.
    pub genome_size: usize,
    /// Age a plant may reach before it dies of old age.
    pub plant_max_age: u32,
    /// Capacity gained by a plant each time one of its growth tips settles.
    pub plant_energy_per_cell: u32,
    /// Light multiplier granted to the topmost occupied slot of a column.
    pub sun_level: u32,
    /// Number of occupied slots per column that receive any light at all.
    pub density_factor: i32,
    /// Point mutations applied to a seed genome when it mutates.
    pub mutation_rate: u32,
    /// Probability that a seed left by a dead plant mutates.
    pub mutation_chance: f64,
    /// Energy payload of every seed.
    pub initial_energy: u32,
    /// Probability that a freshly drawn gene is active.
    pub gene_active_chance: f64,
    /// Local energy a growth tip needs before it branches.
    pub growth_energy_threshold: u32,
    /// Seed for the garden RNG; `None` draws a fresh one.
    pub rng_seed: Option<u64>,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            genome_size: 16,
            plant_max_age: 120,
            plant_energy_per_cell: 60,
            sun_level: 12,
            density_factor: 10,
            mutation_rate: 3,
            mutation_chance: 0.3,
            initial_energy: 400,
            gene_active_chance: 0.4,
            growth_energy_threshold: 16,
            rng_seed: None,
        }
    }
}

impl GardenConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.genome_size == 0 {
            return Err(SimError::InvalidConfig("genome_size must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.mutation_chance) {
            return Err(SimError::InvalidConfig(
                "mutation_chance must be between 0.0 and 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&self.gene_active_chance) {
            return Err(SimError::InvalidConfig(
                "gene_active_chance must be between 0.0 and 1.0",
            ));
        }
        Ok(())
    }
}
