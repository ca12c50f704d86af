use glam::IVec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{info, warn};

use crate::{
    cell::{Cell, Dispersal},
    config::GardenConfig,
    error::{SimError, Violation, tolerate},
    genome::Genome,
    phases::{self, Sunlight},
    plant::{Plant, PlantRegistry},
    types::{CHROMOSOME_LENGTH, PlantId},
};

/// The grid of cells and the plants living on it.
///
/// The grid is stored row-major. It wraps around horizontally and is
/// bounded vertically; row 0 is the top.
#[derive(Debug)]
pub struct Garden {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) grid: Vec<Option<Cell>>,
    pub(crate) plants: PlantRegistry,
    pub(crate) cfg: GardenConfig,
    pub(crate) rng: StdRng,
    tick: u64,
}

impl Garden {
    /// Creates a garden with a single seed at its centre.
    ///
    /// The seed carries a random genome of `cfg.genome_size` chromosomes and
    /// `cfg.initial_energy`.
    ///
    /// ### Errors
    /// Everything [`Garden::empty`] rejects.
    pub fn new(width: usize, height: usize, cfg: GardenConfig) -> Result<Self, SimError> {
        let mut garden = Self::empty(width, height, cfg)?;

        let genome = Genome::random(
            garden.cfg.genome_size,
            CHROMOSOME_LENGTH,
            garden.cfg.gene_active_chance,
            &mut garden.rng,
        )?;
        let seed = Dispersal::new(genome, garden.cfg.initial_energy);
        garden.place_cell(Cell::Dispersal(seed), (width / 2) as i32, (height / 2) as i32)?;

        Ok(garden)
    }

    /// Creates a garden with no cells and no plants.
    ///
    /// ### Errors
    /// [`SimError::InvalidConfig`] if `cfg` does not validate or the grid
    /// dimensions are zero or too large to address.
    pub fn empty(width: usize, height: usize, cfg: GardenConfig) -> Result<Self, SimError> {
        cfg.validate()?;
        if width == 0 || height == 0 {
            return Err(SimError::InvalidConfig("grid dimensions must be non-zero"));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(SimError::InvalidConfig("grid dimensions must fit in i32"));
        }

        let seed = cfg.rng_seed.unwrap_or_else(|| rand::rng().random());
        info!(width, height, seed, ?cfg, "garden created");

        Ok(Self {
            width,
            height,
            grid: (0..width * height).map(|_| None).collect(),
            plants: PlantRegistry::new(),
            cfg,
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
        })
    }

    /// Advances the simulation by one tick.
    ///
    /// Runs, in order: [`phases::energy_phase`], [`phases::update_phase`],
    /// [`phases::aging_phase`] and [`phases::dead_plant_phase`].
    ///
    /// ### Errors
    /// [`SimError::OutOfRange`] from a growth tip whose genome points at a
    /// chromosome it does not have. The remaining phases of the tick are
    /// skipped in that case.
    pub fn update(&mut self) -> Result<(), SimError> {
        phases::energy_phase(self);
        phases::update_phase(self)?;
        phases::aging_phase(self);
        phases::dead_plant_phase(self);
        self.tick += 1;
        Ok(())
    }

    /// Runs the per-tick hook of the cell in slot `(x, y)`.
    pub fn update_cell(&mut self, x: i32, y: i32) -> Result<(), SimError> {
        match tolerate(self.remove_cell(x, y)) {
            Some(cell) => cell.update(x, y, self),
            None => Ok(()),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn config(&self) -> &GardenConfig {
        &self.cfg
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn wrap_x(&self, x: i32) -> i32 {
        x.rem_euclid(self.width as i32)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.is_within(x, y)
            .then(|| y as usize * self.width + self.wrap_x(x) as usize)
    }

    /// Whether two positions address the same slot once `x` is wrapped.
    pub(crate) fn same_slot(&self, a: IVec2, b: IVec2) -> bool {
        a.y == b.y && self.wrap_x(a.x) == self.wrap_x(b.x)
    }

    /// Every `x` is within after wrapping; only `y` is bounds-checked.
    pub fn is_within(&self, _x: i32, y: i32) -> bool {
        y >= 0 && (y as usize) < self.height
    }

    pub fn is_available(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.grid[i].is_none())
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).and_then(|i| self.grid[i].as_ref())
    }

    /// Puts `cell` into an empty slot. An occupied slot keeps its occupant
    /// and `cell` is dropped.
    pub fn place_cell(&mut self, cell: Cell, x: i32, y: i32) -> Result<(), SimError> {
        let index = self.index(x, y).ok_or(Violation::OutsideGrid { x, y })?;
        let slot = &mut self.grid[index];
        if slot.is_some() {
            return Err(Violation::SlotOccupied {
                x: self.wrap_x(x),
                y,
            }
            .into());
        }
        *slot = Some(cell);
        Ok(())
    }

    /// Empties a slot and returns what it held.
    pub fn remove_cell(&mut self, x: i32, y: i32) -> Result<Cell, SimError> {
        let index = self.index(x, y).ok_or(Violation::OutsideGrid { x, y })?;
        let wrapped = self.wrap_x(x);
        self.grid[index]
            .take()
            .ok_or(SimError::InvariantViolation(Violation::SlotEmpty { x: wrapped, y }))
    }

    pub fn replace_cell(&mut self, cell: Cell, x: i32, y: i32) -> Result<(), SimError> {
        if let Err(err) = self.remove_cell(x, y) {
            warn!(%err, "replacing a slot that held nothing");
        }
        self.place_cell(cell, x, y)
    }

    /// Occupied slots as `(x, y, cell)`, row by row from the top.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, &Cell)> {
        let width = self.width;
        self.grid.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref()
                .map(|cell| ((i % width) as i32, (i / width) as i32, cell))
        })
    }

    /// Registers a plant in the live set.
    pub fn add_plant(&mut self, plant: Plant) -> PlantId {
        self.plants.insert(plant)
    }

    pub fn plant(&self, id: PlantId) -> Option<&Plant> {
        self.plants.get(id)
    }

    pub fn plants(&self) -> &PlantRegistry {
        &self.plants
    }

    pub fn has_plants(&self) -> bool {
        !self.plants.is_empty()
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// Light multiplier each occupied slot would receive in the energy
    /// phase, row-major; `None` for empty slots.
    pub fn light_map(&self) -> Vec<Option<u32>> {
        let mut map = vec![None; self.grid.len()];
        for x in 0..self.width {
            let mut light = Sunlight::new(&self.cfg);
            for y in 0..self.height {
                let index = y * self.width + x;
                if self.grid[index].is_some() {
                    map[index] = Some(light.next_multiplier());
                }
            }
        }
        map
    }

    pub(crate) fn random_tile(&mut self, variants: u8) -> u8 {
        self.rng.random_range(0..variants.max(1))
    }
}
