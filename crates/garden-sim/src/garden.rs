//! The garden: a strip of ground holding a handful of plants.
//!
//! The garden owns the environment driver and every plant, feeds all plants
//! the same conditions each tick, removes the dead and periodically sows a
//! new plant of a random species.

use std::collections::BTreeMap;
use std::sync::Arc;

use garden_common::{GardenError, GardenResult, PlantId, PlantIdAllocator, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::definition::{DefinitionRegistry, PlantDefinition};
use crate::environment::EnvironmentalFactors;
use crate::plant::{LifecycleParams, Plant};
use crate::rng::SimRng;
use crate::time::{DayCycle, DEFAULT_DAY_LENGTH};
use crate::weather::{EnvironmentDriver, WeatherConfig, WeatherSystem};

/// Garden configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Seed for every random decision in the garden.
    pub seed: u64,
    /// Width of the planting strip.
    pub width: f32,
    /// Vertical position of the ground line.
    pub ground_y: f32,
    /// Maximum number of live plants.
    pub max_plants: usize,
    /// Ticks between automatic plantings.
    pub plant_interval: u64,
    /// Keep-out distance from each edge.
    pub placement_margin: f32,
    /// Random positions tried per planting.
    pub placement_attempts: u32,
    /// Ticks per day.
    pub day_length: u64,
    /// Conditions at tick zero.
    pub initial_environment: EnvironmentalFactors,
    /// Weather behaviour.
    pub weather: WeatherConfig,
    /// Plant lifecycle thresholds.
    pub lifecycle: LifecycleParams,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            width: 1200.0,
            ground_y: 750.0,
            max_plants: 4,
            plant_interval: 600,
            placement_margin: 50.0,
            placement_attempts: 10,
            day_length: DEFAULT_DAY_LENGTH,
            initial_environment: EnvironmentalFactors::default(),
            weather: WeatherConfig::default(),
            lifecycle: LifecycleParams::default(),
        }
    }
}

impl GardenConfig {
    /// Clamp values to usable ranges.
    pub fn validate(&mut self) {
        if !(self.width > 0.0) {
            self.width = Self::default().width;
        }
        self.placement_margin = self.placement_margin.clamp(0.0, self.width / 2.0);
        self.placement_attempts = self.placement_attempts.max(1);
        self.plant_interval = self.plant_interval.max(1);
        self.day_length = self.day_length.max(1);
        self.weather.validate();
    }

    /// Minimum horizontal distance between plants.
    #[must_use]
    pub fn min_spacing(&self) -> f32 {
        self.width / 5.0
    }
}

/// A collection of plants sharing one environment.
#[derive(Debug)]
pub struct Garden {
    config: GardenConfig,
    registry: DefinitionRegistry,
    plants: BTreeMap<PlantId, Plant>,
    ids: PlantIdAllocator,
    driver: EnvironmentDriver,
    rng: SimRng,
    tick_count: u64,
    ticks_since_planting: u64,
    removed: Vec<PlantId>,
}

impl Garden {
    /// Create an empty garden.
    #[must_use]
    pub fn new(mut config: GardenConfig, registry: DefinitionRegistry) -> Self {
        config.validate();
        let mut rng = SimRng::new(config.seed);
        let weather = WeatherSystem::new(config.weather.clone(), rng.derive());
        let driver = EnvironmentDriver::new(
            config.initial_environment,
            DayCycle::new(config.day_length),
            weather,
        );

        info!(
            "Garden created: width={}, species={}, seed={}",
            config.width,
            registry.len(),
            config.seed
        );

        Self {
            config,
            registry,
            plants: BTreeMap::new(),
            ids: PlantIdAllocator::default(),
            driver,
            rng,
            tick_count: 0,
            ticks_since_planting: 0,
            removed: Vec::new(),
        }
    }

    /// Sow a random species at a random free spot.
    ///
    /// Returns `None` when the garden is full, the registry is empty or no
    /// spot far enough from existing plants was found.
    pub fn add_plant(&mut self) -> Option<PlantId> {
        if self.plants.len() >= self.config.max_plants {
            return None;
        }

        let min_x = self.config.placement_margin;
        let max_x = self.config.width - self.config.placement_margin;
        let spacing = self.config.min_spacing();

        for _ in 0..self.config.placement_attempts {
            let x = self.rng.range(min_x, max_x);
            if self.is_spot_free(x, spacing) {
                let definition = self.registry.choose(&mut self.rng)?;
                return Some(self.insert(definition, x));
            }
        }

        debug!("No free spot found after {} attempts", self.config.placement_attempts);
        None
    }

    /// Plant a specific species at `x`, ignoring spacing and capacity.
    pub fn plant(&mut self, species: &str, x: f32) -> GardenResult<PlantId> {
        let definition = self
            .registry
            .get(species)
            .ok_or_else(|| GardenError::UnknownSpecies(species.to_string()))?;
        Ok(self.insert(definition, x))
    }

    fn insert(&mut self, definition: Arc<PlantDefinition>, x: f32) -> PlantId {
        let id = self.ids.allocate();
        let seed = self.rng.derive().seed();
        let position = Vec2::new(x, self.config.ground_y);
        info!(
            "Added plant {}: {} at ({:.0}, {:.0})",
            id.raw(),
            definition.display_name(),
            position.x,
            position.y
        );
        let plant = Plant::with_params(definition, position, seed, self.config.lifecycle);
        self.plants.insert(id, plant);
        id
    }

    fn is_spot_free(&self, x: f32, spacing: f32) -> bool {
        self.plants
            .values()
            .all(|plant| (plant.position().x - x).abs() >= spacing)
    }

    /// Advance the whole garden by one tick.
    pub fn update(&mut self) {
        let environment = self.driver.tick();
        for plant in self.plants.values_mut() {
            plant.update(&environment);
        }

        let dead: Vec<PlantId> = self
            .plants
            .iter()
            .filter(|(_, plant)| plant.is_dead())
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            if let Some(plant) = self.plants.remove(&id) {
                info!(
                    "Removed dead plant {}: {} (age {})",
                    id.raw(),
                    plant.definition().display_name(),
                    plant.age()
                );
                self.removed.push(id);
            }
        }

        self.tick_count += 1;
        self.ticks_since_planting += 1;
        if self.ticks_since_planting >= self.config.plant_interval {
            self.ticks_since_planting = 0;
            self.add_plant();
        }
    }

    /// Take the ids of plants removed since the last call.
    pub fn take_removed(&mut self) -> Vec<PlantId> {
        std::mem::take(&mut self.removed)
    }

    /// Iterate over live plants in planting order.
    pub fn plants(&self) -> impl Iterator<Item = (PlantId, &Plant)> {
        self.plants.iter().map(|(id, plant)| (*id, plant))
    }

    /// Get a plant by id.
    #[must_use]
    pub fn get(&self, id: PlantId) -> Option<&Plant> {
        self.plants.get(&id)
    }

    /// Number of live plants.
    #[must_use]
    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// Conditions from the latest tick.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentalFactors {
        self.driver.environment()
    }

    /// Weather system.
    #[must_use]
    pub fn weather(&self) -> &WeatherSystem {
        self.driver.weather()
    }

    /// Day cycle.
    #[must_use]
    pub fn day(&self) -> &DayCycle {
        self.driver.day()
    }

    /// Ticks simulated so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Registered species.
    #[must_use]
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GardenConfig {
        &self.config
    }
}
