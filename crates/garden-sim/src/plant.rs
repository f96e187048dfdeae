//! A single plant instance and its lifecycle.
//!
//! A plant grows while healthy, starts withering once it outlives its
//! lifespan or its health runs low, and is dead once withering completes.

use std::sync::Arc;

use garden_common::{BranchId, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::definition::PlantDefinition;
use crate::environment::{
    EnvironmentSystem, EnvironmentalFactors, OptimalRange, FACTOR_MAX, MAX_HEALTH,
};
use crate::flowering::FloweringStateMachine;
use crate::rng::SimRng;
use crate::stem::StemSystem;

/// Base growth per tick before stress and species rate.
pub const BASE_GROWTH_PER_TICK: f32 = 0.005;
/// Stem growth per unit of plant growth.
pub const STEM_GROWTH_FACTOR: f32 = 2.0;
/// Plants at or below this health stop growing.
pub const MIN_GROWING_HEALTH: f32 = 50.0;
/// Health lost per tick per unit of coarse stress.
pub const STRESS_DAMAGE: f32 = 0.1;
/// Health regained per tick on perfect soil when unstressed.
pub const SOIL_RECOVERY: f32 = 0.05;
/// Health lost per tick while withering.
pub const WITHER_DAMAGE: f32 = 0.5;

/// Where a plant is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Alive and growing.
    #[default]
    Growing,
    /// Counting down to death.
    Withering,
    /// Finished; updates are ignored.
    Dead,
}

impl LifecycleState {
    /// Get the display name of this state.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Growing => "Growing",
            Self::Withering => "Withering",
            Self::Dead => "Dead",
        }
    }
}

/// Tunable lifecycle thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleParams {
    /// Ticks from the start of withering to death.
    pub max_wither_time: u64,
    /// Health at or below which a growing plant starts withering.
    pub wither_health_threshold: f32,
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            max_wither_time: 300,
            wither_health_threshold: 20.0,
        }
    }
}

/// Single-sided stress of a value against its optimal range.
///
/// Drives growth and health drift while growing. Drought and heat
/// tolerances never apply here; a zero span or a NaN value saturates.
#[must_use]
pub fn coarse_stress(value: f32, range: OptimalRange) -> f32 {
    if value.is_nan() {
        return 1.0;
    }
    let (deviation, span) = if value < range.min {
        (range.min - value, range.min)
    } else if value > range.max {
        (value - range.max, FACTOR_MAX - range.max)
    } else {
        return 0.0;
    };
    if !(span > 0.0) {
        return 1.0;
    }
    (deviation / span).min(1.0)
}

/// A single instance of a plant.
#[derive(Debug, Clone)]
pub struct Plant {
    definition: Arc<PlantDefinition>,
    params: LifecycleParams,
    position: Vec2,
    growth_stage: f32,
    health: f32,
    age: u64,
    state: LifecycleState,
    wither_time: u64,
    stem: StemSystem,
    flowers: FloweringStateMachine,
    environment: EnvironmentSystem,
    rng: SimRng,
}

impl Plant {
    /// Create a seedling with default lifecycle parameters.
    #[must_use]
    pub fn new(definition: Arc<PlantDefinition>, position: Vec2, seed: u64) -> Self {
        Self::with_params(definition, position, seed, LifecycleParams::default())
    }

    /// Create a seedling with explicit lifecycle parameters.
    #[must_use]
    pub fn with_params(
        definition: Arc<PlantDefinition>,
        position: Vec2,
        seed: u64,
        params: LifecycleParams,
    ) -> Self {
        let stem = StemSystem::new(
            definition.stem.clone(),
            definition.growth_characteristics.max_height.max(0.0),
        );
        let flowers = FloweringStateMachine::new(definition.growth_characteristics.flowering.clone());
        let environment = EnvironmentSystem::new(definition.environmental_requirements.clone());

        Self {
            definition,
            params,
            position,
            growth_stage: 0.0,
            health: MAX_HEALTH,
            age: 0,
            state: LifecycleState::Growing,
            wither_time: 0,
            stem,
            flowers,
            environment,
            rng: SimRng::new(seed),
        }
    }

    /// Advance one tick under the given conditions.
    pub fn update(&mut self, environment: &EnvironmentalFactors) {
        match self.state {
            LifecycleState::Dead => {},
            LifecycleState::Withering => {
                self.environment.update(environment);
                self.update_withering();
            },
            LifecycleState::Growing => {
                self.environment.update(environment);
                self.update_growing(environment);
            },
        }
    }

    fn update_growing(&mut self, environment: &EnvironmentalFactors) {
        let (water_stress, light_stress) = {
            let req = &self.definition.environmental_requirements;
            (
                coarse_stress(environment.water_level, req.optimal_water),
                coarse_stress(environment.light_level, req.optimal_light),
            )
        };
        let stress = water_stress.max(light_stress);

        if self.health > MIN_GROWING_HEALTH {
            let rate = self.definition.growth_characteristics.growth_rate;
            let delta = (BASE_GROWTH_PER_TICK * (1.0 - stress) * rate).max(0.0);
            if delta.is_finite() {
                self.growth_stage = (self.growth_stage + delta).min(1.0);
                self.stem.grow(delta * STEM_GROWTH_FACTOR, &mut self.rng);
            }
        }

        if stress > 0.0 {
            self.health -= stress * STRESS_DAMAGE;
        } else {
            let soil = environment.soil_quality.clamp(0.0, FACTOR_MAX) / FACTOR_MAX;
            self.health += SOIL_RECOVERY * soil;
        }
        self.health = self.health.clamp(0.0, MAX_HEALTH);

        self.age += 1;
        self.stem.set_health(self.health);
        self.flowers
            .update(&self.stem, self.growth_stage, self.age, &mut self.rng);

        if self.age % 100 == 0 {
            debug!(
                "{} at ({:.0}, {:.0}): age={}, health={:.1}, growth={:.2}, branches={}, water_stress={water_stress:.2}, light_stress={light_stress:.2}",
                self.definition.species,
                self.position.x,
                self.position.y,
                self.age,
                self.health,
                self.growth_stage,
                self.stem.branch_count(),
            );
        }

        if self.age >= self.definition.growth_characteristics.lifespan
            || self.health <= self.params.wither_health_threshold
        {
            self.state = LifecycleState::Withering;
            info!(
                "{} is starting to wither (age {}, health {:.1})",
                self.definition.species, self.age, self.health
            );
        }
    }

    fn update_withering(&mut self) {
        self.wither_time += 1;
        self.health = (self.health - WITHER_DAMAGE).max(0.0);

        let progress = if self.params.max_wither_time == 0 {
            1.0
        } else {
            self.wither_time as f32 / self.params.max_wither_time as f32
        };
        self.stem.set_wither_progress(progress);
        self.stem.set_health(self.health);

        if self.wither_time >= self.params.max_wither_time || self.health <= 0.0 {
            self.state = LifecycleState::Dead;
            info!(
                "{} died after {} ticks of withering",
                self.definition.species, self.wither_time
            );
        }
    }

    /// Override health, clamped to [0, 100].
    pub fn set_health(&mut self, health: f32) {
        self.health = if health.is_nan() { 0.0 } else { health.clamp(0.0, MAX_HEALTH) };
        self.stem.set_health(self.health);
    }

    /// Species definition.
    #[must_use]
    pub fn definition(&self) -> &Arc<PlantDefinition> {
        &self.definition
    }

    /// Lifecycle parameters in use.
    #[must_use]
    pub fn params(&self) -> &LifecycleParams {
        &self.params
    }

    /// Spawn position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Overall growth (0-1).
    #[must_use]
    pub fn growth_stage(&self) -> f32 {
        self.growth_stage
    }

    /// Health (0-100).
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Ticks lived while growing.
    #[must_use]
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Ticks spent withering.
    #[must_use]
    pub fn wither_time(&self) -> u64 {
        self.wither_time
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Check if the plant has started withering (or is dead).
    #[must_use]
    pub fn is_withering(&self) -> bool {
        self.state != LifecycleState::Growing
    }

    /// Check if the plant is dead and can be removed.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state == LifecycleState::Dead
    }

    /// Whether the detailed stress model considers the plant failing.
    #[must_use]
    pub fn should_wither(&self) -> bool {
        self.environment.should_wither()
    }

    /// Stem tree.
    #[must_use]
    pub fn stem(&self) -> &StemSystem {
        &self.stem
    }

    /// Flower records.
    #[must_use]
    pub fn flowers(&self) -> &FloweringStateMachine {
        &self.flowers
    }

    /// Detailed environmental response.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentSystem {
        &self.environment
    }

    /// Size at which to draw the flower on a branch, if one is showing.
    #[must_use]
    pub fn rendered_flower_size(&self, branch: BranchId) -> Option<f32> {
        self.flowers
            .record(branch)
            .and_then(|record| record.rendered_size(self.growth_stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowering::FloweringCharacteristics;
    use proptest::prelude::*;

    fn definition(lifespan: u64, growth_rate: f32) -> Arc<PlantDefinition> {
        Arc::new(
            PlantDefinition::builder("test_plant")
                .growth(200.0, growth_rate, lifespan)
                .water(40.0, 80.0)
                .light(50.0, 90.0)
                .temperature(15.0, 30.0)
                .humidity(40.0, 80.0)
                .tolerances(0.5, 0.3)
                .build(),
        )
    }

    fn optimal() -> EnvironmentalFactors {
        EnvironmentalFactors {
            water_level: 60.0,
            light_level: 70.0,
            temperature: 22.0,
            humidity: 60.0,
            soil_quality: 90.0,
        }
    }

    #[test]
    fn test_new_plant() {
        let plant = Plant::new(definition(1000, 1.0), Vec2::new(100.0, 500.0), 1);
        assert_eq!(plant.age(), 0);
        assert_eq!(plant.growth_stage(), 0.0);
        assert_eq!(plant.health(), MAX_HEALTH);
        assert_eq!(plant.state(), LifecycleState::Growing);
        assert_eq!(plant.stem().branch_count(), 1);
        assert!(!plant.is_withering());
    }

    #[test]
    fn test_coarse_stress() {
        let range = OptimalRange::new(40.0, 80.0);
        assert_eq!(coarse_stress(60.0, range), 0.0);
        assert!((coarse_stress(20.0, range) - 0.5).abs() < 1e-6);
        assert!((coarse_stress(90.0, range) - 0.5).abs() < 1e-6);
        assert_eq!(coarse_stress(-50.0, range), 1.0);
        assert_eq!(coarse_stress(0.0, OptimalRange::new(0.0, 100.0)), 0.0);
        assert_eq!(coarse_stress(-1.0, OptimalRange::new(0.0, 100.0)), 1.0);
        assert_eq!(coarse_stress(f32::NAN, range), 1.0);
        assert_eq!(coarse_stress(f32::INFINITY, range), 1.0);
        assert_eq!(coarse_stress(100.0, OptimalRange::new(10.0, 100.0)), 0.0);
    }

    #[test]
    fn test_tolerances_do_not_soften_growing_damage() {
        let tolerant_def = Arc::new(
            PlantDefinition::builder("tolerant")
                .growth(200.0, 1.0, 100_000)
                .water(40.0, 80.0)
                .light(50.0, 90.0)
                .temperature(15.0, 30.0)
                .tolerances(0.9, 0.9)
                .build(),
        );
        let fragile_def = Arc::new(
            PlantDefinition::builder("fragile")
                .growth(200.0, 1.0, 100_000)
                .water(40.0, 80.0)
                .light(50.0, 90.0)
                .temperature(15.0, 30.0)
                .tolerances(0.0, 0.0)
                .build(),
        );
        let env = EnvironmentalFactors {
            water_level: 20.0,
            temperature: 45.0,
            ..optimal()
        };

        let mut tolerant = Plant::new(tolerant_def, Vec2::ZERO, 9);
        let mut fragile = Plant::new(fragile_def, Vec2::ZERO, 9);
        for _ in 0..100 {
            tolerant.update(&env);
            fragile.update(&env);
        }

        // water 20 against [40, 80] costs 0.05 health per tick either way
        assert_eq!(tolerant.health().to_bits(), fragile.health().to_bits());
        assert!((tolerant.health() - 95.0).abs() < 1e-3);
        assert_eq!(tolerant.growth_stage().to_bits(), fragile.growth_stage().to_bits());

        // the detailed model does honour them
        assert!(tolerant.environment().overall_health() > fragile.environment().overall_health());
    }

    #[test]
    fn test_grows_in_optimal_conditions() {
        let mut plant = Plant::new(definition(5000, 1.0), Vec2::ZERO, 2);
        let env = optimal();
        for _ in 0..100 {
            plant.update(&env);
        }
        assert_eq!(plant.age(), 100);
        assert!((plant.growth_stage() - 0.5).abs() < 1e-3);
        assert_eq!(plant.health(), MAX_HEALTH);
        assert!(plant.stem().main_stem().growth() > 0.9);
    }

    #[test]
    fn test_unhealthy_plant_does_not_grow() {
        let mut plant = Plant::new(definition(5000, 1.0), Vec2::ZERO, 3);
        plant.set_health(45.0);
        plant.update(&optimal());
        assert_eq!(plant.growth_stage(), 0.0);
        assert!(plant.health() > 45.0);
    }

    #[test]
    fn test_drought_triggers_should_wither() {
        let mut plant = Plant::new(definition(100_000, 1.0), Vec2::ZERO, 4);
        let env = EnvironmentalFactors {
            water_level: 20.0,
            ..optimal()
        };
        let mut reached = false;
        while plant.age() < 1000 {
            plant.update(&env);
            if plant.should_wither() {
                reached = true;
                break;
            }
        }
        assert!(reached, "should_wither not reached by age {}", plant.age());
        assert!(!plant.is_dead());
    }

    #[test]
    fn test_lifespan_withering_and_death() {
        let mut plant = Plant::new(definition(50, 1.0), Vec2::ZERO, 5);
        let env = optimal();
        for _ in 0..50 {
            plant.update(&env);
        }
        assert_eq!(plant.state(), LifecycleState::Withering);
        let thickness = plant.stem().thickness();

        for _ in 0..150 {
            plant.update(&env);
        }
        assert_eq!(plant.age(), 50);
        assert_eq!(plant.wither_time(), 150);
        assert!(plant.stem().thickness() < thickness);

        // health runs out at 0.5 per tick before the wither timer does
        for _ in 0..150 {
            plant.update(&env);
        }
        assert!(plant.is_dead());
        assert_eq!(plant.wither_time(), 200);
        assert_eq!(plant.health(), 0.0);

        let health = plant.health();
        plant.update(&env);
        assert_eq!(plant.wither_time(), 200);
        assert_eq!(plant.health(), health);
    }

    #[test]
    fn test_low_health_starts_withering() {
        let mut plant = Plant::new(definition(100_000, 1.0), Vec2::ZERO, 6);
        let env = EnvironmentalFactors {
            water_level: 0.0,
            light_level: 0.0,
            ..optimal()
        };
        let mut started_at = None;
        for _ in 0..2000 {
            plant.update(&env);
            if started_at.is_none() && plant.is_withering() {
                started_at = Some(plant.health());
            }
        }
        let health = started_at.expect("started withering");
        assert!(health <= 20.0);
        assert!(plant.is_dead());
    }

    #[test]
    fn test_custom_wither_threshold() {
        let params = LifecycleParams {
            max_wither_time: 10,
            wither_health_threshold: 99.0,
        };
        let env = EnvironmentalFactors {
            water_level: 0.0,
            ..optimal()
        };
        let mut plant = Plant::with_params(definition(100_000, 1.0), Vec2::ZERO, 7, params);
        for _ in 0..20 {
            plant.update(&env);
        }
        assert!(plant.is_withering());
        for _ in 0..20 {
            plant.update(&env);
        }
        assert!(plant.is_dead());
        assert_eq!(plant.wither_time(), 10);
    }

    #[test]
    fn test_flowers_appear_on_mature_plant() {
        let def = Arc::new(
            PlantDefinition::builder("bloomer")
                .growth(200.0, 10.0, 100_000)
                .flowering(FloweringCharacteristics {
                    min_maturity: 0.7,
                    chance: 1.0,
                    min_delay: 0,
                    max_delay: 0,
                    bloom_duration: 100,
                })
                .build(),
        );
        let mut plant = Plant::new(def, Vec2::ZERO, 8);
        let env = optimal();
        for _ in 0..60 {
            plant.update(&env);
        }
        assert_eq!(plant.growth_stage(), 1.0);
        assert!(!plant.flowers().is_empty());
        assert!(plant.flowers().flowering_count() > 0);

        let record = plant.flowers().record(BranchId::ROOT).expect("root record");
        let size = plant.rendered_flower_size(BranchId::ROOT).expect("showing");
        assert!(size <= record.size());
        assert!(size > 0.0);
    }

    #[test]
    fn test_same_seed_same_plant() {
        let env = optimal();
        let mut a = Plant::new(definition(5000, 2.0), Vec2::ZERO, 42);
        let mut b = Plant::new(definition(5000, 2.0), Vec2::ZERO, 42);
        for _ in 0..300 {
            a.update(&env);
            b.update(&env);
        }
        let ends_a: Vec<Vec2> = a.stem().branches().map(|br| br.end_pos()).collect();
        let ends_b: Vec<Vec2> = b.stem().branches().map(|br| br.end_pos()).collect();
        assert_eq!(ends_a, ends_b);
        assert_eq!(a.flowers().len(), b.flowers().len());
    }

    fn arb_env() -> impl Strategy<Value = EnvironmentalFactors> {
        (-20.0f32..120.0, -20.0f32..120.0, -10.0f32..50.0, 0.0f32..100.0, -10.0f32..110.0).prop_map(
            |(water_level, light_level, temperature, humidity, soil_quality)| {
                EnvironmentalFactors {
                    water_level,
                    light_level,
                    temperature,
                    humidity,
                    soil_quality,
                }
            },
        )
    }

    proptest! {
        #[test]
        fn prop_health_and_growth_bounded(
            envs in prop::collection::vec(arb_env(), 1..200),
            rate in 0.0f32..50.0,
            seed in any::<u64>(),
        ) {
            let mut plant = Plant::new(definition(150, rate), Vec2::ZERO, seed);
            for env in &envs {
                plant.update(env);
                prop_assert!((0.0..=MAX_HEALTH).contains(&plant.health()));
                prop_assert!((0.0..=1.0).contains(&plant.growth_stage()));
                for branch in plant.stem().branches() {
                    prop_assert!((0.0..=1.0).contains(&branch.growth()));
                }
            }
        }

        #[test]
        fn prop_dead_is_final(
            envs in prop::collection::vec(arb_env(), 1..100),
            seed in any::<u64>(),
        ) {
            let params = LifecycleParams { max_wither_time: 5, wither_health_threshold: 20.0 };
            let mut plant = Plant::with_params(definition(20, 1.0), Vec2::ZERO, seed, params);
            let mut was_dead = false;
            for env in &envs {
                plant.update(env);
                if was_dead {
                    prop_assert!(plant.is_dead());
                }
                was_dead = plant.is_dead();
            }
        }
    }
}
