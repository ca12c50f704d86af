//! Grid occupants.
//!
//! Every slot of a [`Garden`] holds at most one [`Cell`]. The variants differ
//! in how they trade energy and in what they do on their per-tick update:
//!
//! - [`Structural`]: settled plant tissue, only feeds and drains its plant.
//! - [`GrowthTip`]: collects light locally and branches once it has enough.
//! - [`Dispersal`]: a falling seed that germinates when it hits the bottom.

use glam::IVec2;
use tracing::debug;

use crate::{
    error::{SimError, Violation, tolerate},
    garden::Garden,
    genome::Genome,
    plant::{Plant, PlantRegistry},
    types::{Direction, PlantId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Structural,
    GrowthTip,
    Dispersal,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Structural(Structural),
    GrowthTip(GrowthTip),
    Dispersal(Dispersal),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Structural(_) => CellKind::Structural,
            Cell::GrowthTip(_) => CellKind::GrowthTip,
            Cell::Dispersal(_) => CellKind::Dispersal,
        }
    }

    /// Plant this cell belongs to; seeds belong to none.
    pub fn plant(&self) -> Option<PlantId> {
        match self {
            Cell::Structural(stem) => Some(stem.plant),
            Cell::GrowthTip(tip) => Some(tip.plant),
            Cell::Dispersal(_) => None,
        }
    }

    /// Index of the visual tile variant picked when the cell was created.
    pub fn tile(&self) -> u8 {
        match self {
            Cell::Structural(stem) => stem.tile,
            Cell::GrowthTip(tip) => tip.tile,
            Cell::Dispersal(_) => 0,
        }
    }

    pub fn genome(&self) -> Option<&Genome> {
        match self {
            Cell::Structural(_) => None,
            Cell::GrowthTip(tip) => Some(&tip.genome),
            Cell::Dispersal(seed) => Some(&seed.genome),
        }
    }

    /// Whether the cell-update pass visits this cell.
    pub fn is_updatable(&self) -> bool {
        match self {
            Cell::Structural(_) => false,
            Cell::GrowthTip(_) | Cell::Dispersal(_) => true,
        }
    }

    pub fn produce_energy(&mut self, multiplier: u32, plants: &mut PlantRegistry) -> Result<(), SimError> {
        match self {
            Cell::Structural(stem) => stem.produce_energy(multiplier, plants),
            Cell::GrowthTip(tip) => {
                tip.produce_energy(multiplier);
                Ok(())
            }
            Cell::Dispersal(_) => Ok(()),
        }
    }

    pub fn consume_energy(&mut self, plants: &mut PlantRegistry) -> Result<(), SimError> {
        match self {
            Cell::Structural(stem) => stem.consume_energy(plants),
            Cell::GrowthTip(tip) => tip.consume_energy(plants),
            Cell::Dispersal(_) => Ok(()),
        }
    }

    /// Runs the per-tick hook of a cell that was taken out of slot `(x, y)`.
    ///
    /// The cell is responsible for putting itself, or whatever replaces it,
    /// back into the grid.
    pub(crate) fn update(self, x: i32, y: i32, garden: &mut Garden) -> Result<(), SimError> {
        match self {
            Cell::GrowthTip(tip) => tip.update(x, y, garden),
            Cell::Dispersal(seed) => {
                seed.update(x, y, garden);
                Ok(())
            }
            stem @ Cell::Structural(_) => {
                tolerate(garden.place_cell(stem, x, y));
                Ok(())
            }
        }
    }
}

fn plant_mut(plants: &mut PlantRegistry, id: PlantId) -> Result<&mut Plant, SimError> {
    plants
        .get_mut(id)
        .ok_or(SimError::InvariantViolation(Violation::UnknownPlant(id)))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Structural {
    plant: PlantId,
    tile: u8,
}

impl Structural {
    pub const ENERGY_CONSUMPTION: u32 = 30;
    pub const ENERGY_GAIN: u32 = 10;
    pub const TILES: u8 = 7;

    pub fn new(plant: PlantId, tile: u8) -> Self {
        Self { plant, tile }
    }

    pub fn plant(&self) -> PlantId {
        self.plant
    }

    pub fn produce_energy(&self, multiplier: u32, plants: &mut PlantRegistry) -> Result<(), SimError> {
        plant_mut(plants, self.plant)?.add_energy(Self::ENERGY_GAIN.saturating_mul(multiplier));
        Ok(())
    }

    pub fn consume_energy(&self, plants: &mut PlantRegistry) -> Result<(), SimError> {
        plant_mut(plants, self.plant)?.take_energy(Self::ENERGY_CONSUMPTION);
        Ok(())
    }
}

/// Branching end of a plant.
///
/// A tip has two energy pools: its own counter, which only grows and pays
/// for branching, and the shared plant pool, which it only drains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowthTip {
    plant: PlantId,
    genome: Genome,
    energy: u32,
    tile: u8,
}

impl GrowthTip {
    pub const ENERGY_CONSUMPTION: u32 = 40;
    pub const ENERGY_GAIN: u32 = 2;
    pub const TILES: u8 = 3;

    pub fn new(plant: PlantId, genome: Genome, energy: u32, tile: u8) -> Self {
        Self {
            plant,
            genome,
            energy,
            tile,
        }
    }

    pub fn plant(&self) -> PlantId {
        self.plant
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn produce_energy(&mut self, multiplier: u32) {
        self.energy = self
            .energy
            .saturating_add(Self::ENERGY_GAIN.saturating_mul(multiplier));
    }

    pub fn consume_energy(&self, plants: &mut PlantRegistry) -> Result<(), SimError> {
        plant_mut(plants, self.plant)?.take_energy(Self::ENERGY_CONSUMPTION);
        Ok(())
    }

    /// Branches into free neighbours and settles into a structural cell.
    ///
    /// Below the growth threshold the tip is put back unchanged. Otherwise,
    /// for each [`Direction`] whose gene in the active chromosome is active
    /// and whose neighbour is free (and not the tip's own slot after
    /// wrapping), a new tip with local energy 1 is placed
    /// there; its genome is a copy of this one with the gene's `dna` as the
    /// active chromosome. The tip then becomes a [`Structural`] cell and its
    /// plant gains capacity once.
    ///
    /// ### Errors
    /// [`SimError::OutOfRange`] if a gene's `dna` does not address a
    /// chromosome. Nothing is placed in that case and the tip stays as it was.
    fn update(self, x: i32, y: i32, garden: &mut Garden) -> Result<(), SimError> {
        if self.energy < garden.config().growth_energy_threshold {
            tolerate(garden.place_cell(Cell::GrowthTip(self), x, y));
            return Ok(());
        }

        let origin = IVec2::new(x, y);
        let branches = Direction::ALL
            .into_iter()
            .zip(self.genome.active_chromosome().genes())
            .filter(|&(direction, gene)| {
                let target = origin + direction.offset();
                // The tip is out of the grid while it updates, so its own
                // slot reads as free when a neighbour wraps onto it.
                gene.is_active()
                    && !garden.same_slot(target, origin)
                    && garden.is_available(target.x, target.y)
            })
            .map(|(direction, gene)| -> Result<(IVec2, Genome), SimError> {
                let mut genome = self.genome.copy();
                genome.set_active_chromosome(gene.dna())?;
                Ok((origin + direction.offset(), genome))
            })
            .collect::<Result<Vec<_>, _>>();

        let branches = match branches {
            Ok(branches) => branches,
            Err(err) => {
                tolerate(garden.place_cell(Cell::GrowthTip(self), x, y));
                return Err(err);
            }
        };

        for (target, genome) in branches {
            // Left and right meet on a two-wide grid.
            if !garden.is_available(target.x, target.y) {
                continue;
            }
            let tile = garden.random_tile(Self::TILES);
            let branch = GrowthTip::new(self.plant, genome, 1, tile);
            tolerate(garden.place_cell(Cell::GrowthTip(branch), target.x, target.y));
        }

        if let Some(plant) = tolerate(plant_mut(&mut garden.plants, self.plant)) {
            plant.increase_capacity();
        }
        let tile = garden.random_tile(Structural::TILES);
        tolerate(garden.place_cell(Cell::Structural(Structural::new(self.plant, tile)), x, y));
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispersal {
    genome: Genome,
    energy: u32,
}

impl Dispersal {
    pub fn new(genome: Genome, energy: u32) -> Self {
        Self { genome, energy }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    /// Falls one row, germinates on the bottom edge, or is destroyed.
    fn update(self, x: i32, y: i32, garden: &mut Garden) {
        if garden.is_available(x, y + 1) {
            tolerate(garden.place_cell(Cell::Dispersal(self), x, y + 1));
            return;
        }

        if !garden.is_within(x, y + 1) && self.energy != 0 {
            let plant = Plant::from_config(self.energy, garden.config());
            let plant = garden.add_plant(plant);
            let tile = garden.random_tile(GrowthTip::TILES);
            debug!(x, y, plant, "dispersal cell germinated");
            let tip = GrowthTip::new(plant, self.genome, 0, tile);
            tolerate(garden.place_cell(Cell::GrowthTip(tip), x, y));
            return;
        }

        debug!(x, y, energy = self.energy, "dispersal cell destroyed");
    }
}
