//! Core 2-D plant garden simulation library.
//!
//! Main components:
//! - [`genome`]: genes, chromosomes and genomes driving branching.
//! - [`cell`]: grid occupants (structural cells, growth tips, seeds).
//! - [`plant`]: per-plant energy bookkeeping and the live-plant registry.
//! - [`garden`]: the wrapping grid and the tick entry point.
//! - [`phases`]: the four passes making up one tick.
//! - [`config`]: tunable constants of a run.
//! - [`error`]: error and contract-violation kinds.
//! - [`types`]: shared ids and grid directions.

pub mod cell;
pub mod config;
pub mod error;
pub mod garden;
pub mod genome;
pub mod phases;
pub mod plant;
pub mod types;

#[cfg(test)]
mod testing;

pub use cell::{Cell, CellKind};
pub use config::GardenConfig;
pub use error::{SimError, Violation};
pub use garden::Garden;
pub use types::PlantId;
