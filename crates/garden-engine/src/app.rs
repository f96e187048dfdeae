//! Headless garden runner.
//!
//! Loads species, builds the garden and drives it tick by tick, logging a
//! summary every report interval.

use anyhow::Result;
use garden_sim::{DefinitionRegistry, Garden};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::loader::DefinitionLoader;

/// Outcome of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks simulated.
    pub ticks: u64,
    /// Plants alive at the end.
    pub plants_alive: usize,
    /// Plants that died and were removed.
    pub plants_removed: usize,
}

/// Build the species registry for a run.
pub fn load_registry(config: &EngineConfig) -> Result<DefinitionRegistry> {
    let mut loader = DefinitionLoader::new(&config.definitions_dir);
    loader.load_all()?;
    let mut registry = loader.into_registry();

    if registry.is_empty() && config.builtin_fallback {
        warn!("No plant definitions loaded, using built-in species");
        registry.register_defaults();
    }
    Ok(registry)
}

/// Run the garden for the configured number of ticks.
pub fn run(mut config: EngineConfig) -> Result<RunSummary> {
    config.validate();
    let registry = load_registry(&config)?;
    let mut garden = Garden::new(config.garden.clone(), registry);

    // The garden starts with one plant rather than waiting a full interval.
    garden.add_plant();

    let mut summary = RunSummary::default();
    while config.ticks == 0 || garden.tick_count() < config.ticks {
        garden.update();
        summary.plants_removed += garden.take_removed().len();

        if garden.tick_count() % config.report_interval == 0 {
            report(&garden);
        }
    }

    summary.ticks = garden.tick_count();
    summary.plants_alive = garden.plant_count();
    info!(
        "Run finished after {} ticks: {} plants alive, {} removed",
        summary.ticks, summary.plants_alive, summary.plants_removed
    );
    Ok(summary)
}

fn report(garden: &Garden) {
    let env = garden.environment();
    info!(
        "Tick {} (day {}): {}, wind {:.1}, light {:.0}, water {:.0}, humidity {:.0}, {} plants",
        garden.tick_count(),
        garden.day().day_count(),
        garden.weather().current().display_name(),
        garden.weather().wind_speed(),
        env.light_level,
        env.water_level,
        env.humidity,
        garden.plant_count()
    );

    for (id, plant) in garden.plants() {
        debug!(
            "  plant {} {}: {} age={} health={:.1} growth={:.2} branches={} flowers={} stress={}",
            id.raw(),
            plant.definition().display_name(),
            plant.state().display_name(),
            plant.age(),
            plant.health(),
            plant.growth_stage(),
            plant.stem().branch_count(),
            plant.flowers().flowering_count(),
            plant
                .environment()
                .dominant_stress_factor()
                .map_or("none", |f| f.display_name()),
        );
    }
}
