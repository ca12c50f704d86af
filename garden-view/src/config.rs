//! Startup configuration for the viewer.
//!
//! The garden configuration is assembled once, before the window opens:
//! 1. [`GardenConfig::default`], or the RON file named by `GARDEN_CONFIG`.
//! 2. Individual overrides from environment variables.
//! 3. [`GardenConfig::validate`].
//!
//! Any unreadable file, unparseable variable or invalid value aborts
//! startup.

use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use garden_core::GardenConfig;
use tracing::info;

/// Environment variable naming an optional RON configuration file.
pub const CONFIG_PATH_VAR: &str = "GARDEN_CONFIG";

/// Loads the configuration from the process environment.
pub fn load() -> Result<GardenConfig> {
    load_from(|key| std::env::var(key).ok())
}

/// Loads the configuration, reading variables through `lookup`.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<GardenConfig> {
    let mut cfg = match lookup(CONFIG_PATH_VAR) {
        Some(path) => read_ron(Path::new(&path))?,
        None => GardenConfig::default(),
    };

    override_from(&lookup, "PLANT_MAX_AGE", &mut cfg.plant_max_age)?;
    override_from(&lookup, "PLANT_ENERGY_PER_CELL", &mut cfg.plant_energy_per_cell)?;
    override_from(&lookup, "GARDEN_SUN_LEVEL", &mut cfg.sun_level)?;
    override_from(&lookup, "GARDEN_DENSITY_FACTOR", &mut cfg.density_factor)?;
    override_from(&lookup, "GARDEN_MUTATION_RATE", &mut cfg.mutation_rate)?;
    override_from(&lookup, "GARDEN_MUTATION_CHANCE", &mut cfg.mutation_chance)?;
    override_from(&lookup, "GARDEN_INITIAL_ENERGY", &mut cfg.initial_energy)?;
    override_from(&lookup, "GARDEN_GENOME_SIZE", &mut cfg.genome_size)?;
    override_from(&lookup, "GENE_ACTIVE_CHANCE", &mut cfg.gene_active_chance)?;
    override_from(&lookup, "BULB_ENERGY_TO_GROW", &mut cfg.growth_energy_threshold)?;

    if let Some(raw) = lookup("GARDEN_SEED") {
        let seed = raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("GARDEN_SEED={raw:?} is not a valid seed"))?;
        cfg.rng_seed = Some(seed);
    }

    cfg.validate().context("invalid garden configuration")?;
    info!(?cfg, "configuration loaded");
    Ok(cfg)
}

fn read_ron(path: &Path) -> Result<GardenConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn override_from<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &mut T,
) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *field = raw
            .trim()
            .parse()
            .with_context(|| format!("{key}={raw:?} is not a valid value"))?;
    }
    Ok(())
}
