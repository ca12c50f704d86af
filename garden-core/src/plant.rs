use std::collections::BTreeMap;

use tracing::info;

use crate::{config::GardenConfig, types::PlantId};

/// Shared energy pool and age of one organism.
///
/// A plant never knows its cells; structural cells and growth tips point
/// at it through a [`PlantId`]. Once dead, every mutator is a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plant {
    age: u32,
    energy: u32,
    capacity: u32,
    alive: bool,
    max_age: u32,
    energy_per_cell: u32,
}

impl Plant {
    /// Creates a plant holding `energy`, which is also its starting capacity.
    pub fn new(energy: u32, max_age: u32, energy_per_cell: u32) -> Self {
        Self {
            age: 0,
            energy,
            capacity: energy,
            alive: true,
            max_age,
            energy_per_cell,
        }
    }

    pub fn from_config(energy: u32, cfg: &GardenConfig) -> Self {
        Self::new(energy, cfg.plant_max_age, cfg.plant_energy_per_cell)
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Kills the plant once it runs out of energy or outlives its max age.
    pub fn check_alive(&mut self) {
        if self.alive && (self.energy == 0 || self.age > self.max_age) {
            self.alive = false;
            info!(
                age = self.age,
                energy = self.energy,
                capacity = self.capacity,
                "plant died"
            );
        }
    }

    /// Adds energy without exceeding the capacity.
    pub fn add_energy(&mut self, amount: u32) {
        if !self.alive {
            return;
        }
        let room = self.capacity - self.energy;
        self.energy += amount.min(room);
    }

    /// Takes up to `amount` energy and returns how much was actually taken.
    pub fn take_energy(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }
        let taken = amount.min(self.energy);
        self.energy -= taken;
        self.check_alive();
        taken
    }

    pub fn increase_capacity(&mut self) {
        if !self.alive {
            return;
        }
        self.capacity = self.capacity.saturating_add(self.energy_per_cell);
    }

    /// Checks aliveness first, then ages by one tick.
    pub fn update_age(&mut self) {
        if !self.alive {
            return;
        }
        self.check_alive();
        self.age += 1;
    }
}

/// Live plants of a garden, keyed by id.
#[derive(Debug, Default)]
pub struct PlantRegistry {
    plants: BTreeMap<PlantId, Plant>,
    next_id: PlantId,
}

impl PlantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plant` under a fresh id.
    pub fn insert(&mut self, plant: Plant) -> PlantId {
        let id = self.next_id;
        self.next_id += 1;
        info!(plant = id, energy = plant.energy(), "plant created");
        self.plants.insert(id, plant);
        id
    }

    pub fn get(&self, id: PlantId) -> Option<&Plant> {
        self.plants.get(&id)
    }

    pub fn get_mut(&mut self, id: PlantId) -> Option<&mut Plant> {
        self.plants.get_mut(&id)
    }

    pub fn remove(&mut self, id: PlantId) -> Option<Plant> {
        self.plants.remove(&id)
    }

    /// `false` for dead plants and for ids that are no longer registered.
    pub fn is_alive(&self, id: PlantId) -> bool {
        self.plants.get(&id).is_some_and(Plant::is_alive)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlantId, &Plant)> {
        self.plants.iter().map(|(&id, plant)| (id, plant))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlantId, &mut Plant)> {
        self.plants.iter_mut().map(|(&id, plant)| (id, plant))
    }
}
