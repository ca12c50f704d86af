//! The four passes of a garden tick.
//!
//! [`crate::garden::Garden::update`] runs them in this order:
//! 1. [`energy_phase`]: every occupied slot produces energy according to the
//!    light reaching it, then consumes its upkeep.
//! 2. [`update_phase`]: growth tips branch and seeds fall or germinate.
//! 3. [`aging_phase`]: every live plant grows one tick older.
//! 4. [`dead_plant_phase`]: cells of dead plants are cleared or turned into
//!    seeds, and the dead plants are dropped.

use rand::Rng;
use tracing::debug;

use crate::{
    cell::{Cell, Dispersal, GrowthTip},
    config::GardenConfig,
    error::{SimError, tolerate},
    garden::Garden,
};

/// Light falling down a single column.
///
/// Each occupied slot met on the way down takes one step of sun away from
/// the slots below it. Once `density_factor` occupied slots have been
/// passed, nothing further down receives any light.
#[derive(Clone, Copy, Debug)]
pub struct Sunlight {
    sun: u32,
    density: i32,
}

impl Sunlight {
    pub fn new(cfg: &GardenConfig) -> Self {
        Self {
            sun: cfg.sun_level,
            density: cfg.density_factor,
        }
    }

    /// Multiplier for the next occupied slot down the column.
    pub fn next_multiplier(&mut self) -> u32 {
        let multiplier = if self.density > 0 { self.sun } else { 0 };
        self.density = self.density.saturating_sub(1);
        self.sun = self.sun.saturating_sub(1);
        multiplier
    }
}

/// Lets every occupied slot produce and then consume energy.
///
/// Columns are scanned left to right, each from the top down, with a fresh
/// [`Sunlight`] per column. For every occupant the multiplier is taken from
/// the column's light, then [`Cell::produce_energy`] and
/// [`Cell::consume_energy`] are called in that order.
///
/// Cells whose plant is missing from the registry are logged and skipped.
///
/// ### Parameters
/// - `garden` - The garden whose cells and plants exchange energy.
pub fn energy_phase(garden: &mut Garden) {
    let Garden {
        width,
        height,
        grid,
        plants,
        cfg,
        ..
    } = garden;

    for x in 0..*width {
        let mut light = Sunlight::new(cfg);
        for y in 0..*height {
            let Some(cell) = grid[y * *width + x].as_mut() else {
                continue;
            };
            let multiplier = light.next_multiplier();
            tolerate(cell.produce_energy(multiplier, plants));
            tolerate(cell.consume_energy(plants));
        }
    }
}

/// Runs the per-tick hook of every growth tip and seed.
///
/// The positions to visit are captured before any cell is touched, row by
/// row from the top. Cells placed during the pass only land on slots that
/// were empty at capture time or were already visited, so a branch grown or
/// a seed moved in this pass is not updated again until the next tick.
///
/// ### Parameters
/// - `garden` - The garden whose cells are updated.
///
/// ### Errors
/// [`SimError::OutOfRange`] as soon as one growth tip fails to branch;
/// the remaining cells are not updated.
pub fn update_phase(garden: &mut Garden) -> Result<(), SimError> {
    let snapshot: Vec<(i32, i32)> = garden
        .cells()
        .filter(|(_, _, cell)| cell.is_updatable())
        .map(|(x, y, _)| (x, y))
        .collect();

    for (x, y) in snapshot {
        garden.update_cell(x, y)?;
    }
    Ok(())
}

/// Ages every registered plant by one tick.
pub fn aging_phase(garden: &mut Garden) {
    for (_, plant) in garden.plants.iter_mut() {
        plant.update_age();
    }
}

/// Clears away the cells of dead plants.
///
/// Scans the grid row by row. For each structural cell or growth tip whose
/// plant is dead (or already dropped from the registry):
///
/// 1. The plant is removed from the registry.
/// 2. Structural cells and growth tips without local energy are removed.
/// 3. Growth tips with local energy are replaced by a seed; see
///    [`seed_from`].
///
/// ### Parameters
/// - `garden` - The garden to clean up.
pub fn dead_plant_phase(garden: &mut Garden) {
    for y in 0..garden.height as i32 {
        for x in 0..garden.width as i32 {
            let Some(plant) = garden.get_cell(x, y).and_then(Cell::plant) else {
                continue;
            };
            if garden.plants.is_alive(plant) {
                continue;
            }
            if garden.plants.remove(plant).is_some() {
                debug!(plant, "dead plant dropped from the garden");
            }

            let Some(cell) = tolerate(garden.remove_cell(x, y)) else {
                continue;
            };
            if let Cell::GrowthTip(tip) = cell
                && tip.energy() > 0
            {
                let seed = seed_from(&tip, garden);
                tolerate(garden.place_cell(Cell::Dispersal(seed), x, y));
            }
        }
    }
}

/// Builds the seed a dying growth tip leaves behind.
///
/// The seed gets a copy of the tip's genome and `cfg.initial_energy`. With
/// probability `cfg.mutation_chance` the copy receives `cfg.mutation_rate`
/// point mutations drawing `dna` from `[0, cfg.genome_size - 1]`.
fn seed_from(tip: &GrowthTip, garden: &mut Garden) -> Dispersal {
    let mut genome = tip.genome().copy();
    let cfg = &garden.cfg;

    if garden.rng.random_bool(cfg.mutation_chance) {
        for _ in 0..cfg.mutation_rate {
            genome.mutate(
                0..=cfg.genome_size - 1,
                cfg.gene_active_chance,
                &mut garden.rng,
            );
        }
    }

    Dispersal::new(genome, cfg.initial_energy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cell::{CellKind, Structural},
        plant::Plant,
        testing::uniform_genome,
        types::PlantId,
    };

    fn config() -> GardenConfig {
        GardenConfig {
            sun_level: 5,
            density_factor: 2,
            growth_energy_threshold: 1,
            mutation_chance: 0.0,
            initial_energy: 33,
            rng_seed: Some(21),
            ..GardenConfig::default()
        }
    }

    fn tip(plant: PlantId, energy: u32) -> Cell {
        Cell::GrowthTip(GrowthTip::new(plant, uniform_genome([true; 4], 0, 4), energy, 0))
    }

    fn local_energy(garden: &Garden, x: i32, y: i32) -> u32 {
        match garden.get_cell(x, y) {
            Some(Cell::GrowthTip(tip)) => tip.energy(),
            other => panic!("expected growth tip at ({x}, {y}), found {other:?}"),
        }
    }

    #[test]
    fn sunlight_fades_per_occupied_slot_and_cuts_off_at_density() {
        let mut light = Sunlight::new(&GardenConfig {
            sun_level: 2,
            density_factor: 4,
            ..config()
        });
        let seen: Vec<_> = (0..5).map(|_| light.next_multiplier()).collect();
        assert_eq!(seen, vec![2, 1, 0, 0, 0]);

        let mut light = Sunlight::new(&config());
        let seen: Vec<_> = (0..3).map(|_| light.next_multiplier()).collect();
        assert_eq!(seen, vec![5, 4, 0]);
    }

    #[test]
    fn energy_phase_feeds_tips_by_light_and_drains_plant() {
        let mut garden = Garden::empty(2, 5, config()).unwrap();
        let plant = garden.add_plant(Plant::new(1_000, 50, 10));
        for y in [0, 1, 3] {
            garden.place_cell(tip(plant, 0), 0, y).unwrap();
        }
        garden.place_cell(tip(plant, 0), 1, 2).unwrap();

        energy_phase(&mut garden);

        assert_eq!(local_energy(&garden, 0, 0), 10);
        assert_eq!(local_energy(&garden, 0, 1), 8);
        assert_eq!(local_energy(&garden, 0, 3), 0);
        assert_eq!(local_energy(&garden, 1, 2), 10);
        assert_eq!(
            garden.plant(plant).unwrap().energy(),
            1_000 - 4 * GrowthTip::ENERGY_CONSUMPTION
        );
    }

    #[test]
    fn energy_phase_counts_seeds_as_shade() {
        let mut garden = Garden::empty(1, 3, config()).unwrap();
        let plant = garden.add_plant(Plant::new(1_000, 50, 10));
        let seed = Dispersal::new(uniform_genome([true; 4], 0, 4), 9);
        garden.place_cell(Cell::Dispersal(seed), 0, 0).unwrap();
        garden.place_cell(tip(plant, 0), 0, 1).unwrap();

        energy_phase(&mut garden);

        assert_eq!(local_energy(&garden, 0, 1), 8);
    }

    #[test]
    fn energy_phase_can_starve_a_plant() {
        let mut garden = Garden::empty(1, 3, config()).unwrap();
        let plant = garden.add_plant(Plant::new(50, 50, 10));
        garden
            .place_cell(Cell::Structural(Structural::new(plant, 0)), 0, 0)
            .unwrap();
        garden.place_cell(tip(plant, 0), 0, 1).unwrap();

        energy_phase(&mut garden);

        // 50 + 50 clamped to 50, -30, then -40 clamped to what is left.
        let plant = garden.plant(plant).unwrap();
        assert_eq!(plant.energy(), 0);
        assert!(!plant.is_alive());
    }

    #[test]
    fn update_phase_does_not_revisit_new_branches() {
        let mut garden = Garden::empty(5, 5, config()).unwrap();
        let plant = garden.add_plant(Plant::new(1_000, 50, 10));
        garden.place_cell(tip(plant, 1), 2, 2).unwrap();

        update_phase(&mut garden).unwrap();

        // The branches carry enough energy to branch but must wait a tick.
        assert_eq!(garden.cells().count(), 5);
        for (x, y) in [(2, 1), (2, 3), (1, 2), (3, 2)] {
            assert_eq!(local_energy(&garden, x, y), 1);
        }
        assert_eq!(
            garden.get_cell(2, 2).map(Cell::kind),
            Some(CellKind::Structural)
        );
    }

    #[test]
    fn update_phase_moves_a_seed_one_row_per_tick() {
        let mut garden = Garden::empty(1, 5, config()).unwrap();
        let seed = Dispersal::new(uniform_genome([true; 4], 0, 4), 9);
        garden.place_cell(Cell::Dispersal(seed), 0, 0).unwrap();

        update_phase(&mut garden).unwrap();
        assert_eq!(garden.get_cell(0, 1).map(Cell::kind), Some(CellKind::Dispersal));

        update_phase(&mut garden).unwrap();
        assert_eq!(garden.get_cell(0, 2).map(Cell::kind), Some(CellKind::Dispersal));
        assert_eq!(garden.cells().count(), 1);
    }

    #[test]
    fn update_phase_stops_at_first_out_of_range_branch() {
        let mut garden = Garden::empty(3, 3, config()).unwrap();
        let plant = garden.add_plant(Plant::new(1_000, 50, 10));
        let broken = GrowthTip::new(plant, uniform_genome([true; 4], 9, 2), 5, 0);
        garden.place_cell(Cell::GrowthTip(broken), 1, 1).unwrap();

        assert_eq!(
            update_phase(&mut garden),
            Err(SimError::OutOfRange { index: 9, len: 2 })
        );
        assert_eq!(garden.cells().count(), 1);
    }

    #[test]
    fn aging_phase_ages_every_live_plant() {
        let mut garden = Garden::empty(2, 2, config()).unwrap();
        let a = garden.add_plant(Plant::new(10, 50, 10));
        let b = garden.add_plant(Plant::new(10, 50, 10));

        aging_phase(&mut garden);
        aging_phase(&mut garden);

        assert_eq!(garden.plant(a).unwrap().age(), 2);
        assert_eq!(garden.plant(b).unwrap().age(), 2);
    }

    #[test]
    fn dead_plant_phase_clears_cells_and_leaves_seeds() {
        let mut garden = Garden::empty(4, 2, config()).unwrap();
        let dead = garden.add_plant(Plant::new(10, 50, 10));
        let alive = garden.add_plant(Plant::new(10, 50, 10));
        let genome = uniform_genome([true, false, true, false], 2, 4);

        garden
            .place_cell(Cell::Structural(Structural::new(dead, 0)), 0, 0)
            .unwrap();
        garden.place_cell(tip(dead, 0), 1, 0).unwrap();
        garden
            .place_cell(Cell::GrowthTip(GrowthTip::new(dead, genome.clone(), 4, 0)), 2, 0)
            .unwrap();
        garden.place_cell(tip(alive, 3), 3, 0).unwrap();
        garden
            .place_cell(Cell::Structural(Structural::new(alive, 0)), 3, 1)
            .unwrap();

        let drained = garden.plants.get_mut(dead).unwrap();
        drained.take_energy(10);
        assert!(!drained.is_alive());

        dead_plant_phase(&mut garden);

        assert!(garden.get_cell(0, 0).is_none());
        assert!(garden.get_cell(1, 0).is_none());
        match garden.get_cell(2, 0) {
            Some(Cell::Dispersal(seed)) => {
                assert_eq!(seed.energy(), 33);
                assert_eq!(seed.genome(), &genome.copy());
            }
            other => panic!("expected a seed, found {other:?}"),
        }
        assert_eq!(local_energy(&garden, 3, 0), 3);
        assert_eq!(garden.get_cell(3, 1).and_then(Cell::plant), Some(alive));

        assert!(garden.plant(dead).is_none());
        assert_eq!(garden.plant_count(), 1);
    }

    #[test]
    fn seeds_of_dead_plants_mutate_when_chance_is_certain() {
        let cfg = GardenConfig {
            mutation_chance: 1.0,
            mutation_rate: 3,
            gene_active_chance: 0.5,
            genome_size: 4,
            ..config()
        };
        let mut garden = Garden::empty(1, 1, cfg).unwrap();
        let dead = garden.add_plant(Plant::new(0, 50, 10));
        garden.plants.get_mut(dead).unwrap().check_alive();
        let genome = uniform_genome([false; 4], 0, 4);
        garden
            .place_cell(Cell::GrowthTip(GrowthTip::new(dead, genome.clone(), 4, 0)), 0, 0)
            .unwrap();

        dead_plant_phase(&mut garden);

        let Some(Cell::Dispersal(seed)) = garden.get_cell(0, 0) else {
            panic!("expected a seed");
        };
        let changed = genome
            .chromosomes()
            .iter()
            .zip(seed.genome().chromosomes())
            .flat_map(|(a, b)| a.genes().iter().zip(b.genes()))
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed <= 3);
        assert!(
            seed.genome()
                .chromosomes()
                .iter()
                .flat_map(|c| c.genes())
                .all(|g| g.dna() < 4)
        );
    }
}
