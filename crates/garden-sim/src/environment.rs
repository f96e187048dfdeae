//! Environmental conditions and the plant stress model.
//!
//! This module provides:
//! - The per-tick [`EnvironmentalFactors`] snapshot supplied by the garden
//! - Species requirement ranges ([`GrowthRequirements`])
//! - [`stress_for`], the tolerance-aware stress curve
//! - [`EnvironmentSystem`], which turns stress into health and a growth modifier

use serde::{Deserialize, Serialize};

/// Upper bound of the percentage-scaled factors.
pub const FACTOR_MAX: f32 = 100.0;

/// Maximum health value.
pub const MAX_HEALTH: f32 = 100.0;

/// Environmental conditions for one tick.
///
/// All levels are percentages (0-100) except temperature, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalFactors {
    /// Soil water level (0-100).
    pub water_level: f32,
    /// Light level (0-100).
    pub light_level: f32,
    /// Air temperature in °C.
    pub temperature: f32,
    /// Relative humidity (0-100).
    pub humidity: f32,
    /// Soil quality (0-100).
    pub soil_quality: f32,
}

impl Default for EnvironmentalFactors {
    fn default() -> Self {
        Self {
            water_level: 70.0,
            light_level: 80.0,
            temperature: 22.0,
            humidity: 60.0,
            soil_quality: 90.0,
        }
    }
}

/// Optimal `[min, max]` range for one factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f32, f32)", into = "(f32, f32)")]
pub struct OptimalRange {
    /// Lower bound (inclusive).
    pub min: f32,
    /// Upper bound (inclusive).
    pub max: f32,
}

impl OptimalRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check if a value lies within the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check that `min <= max` and both bounds are finite.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<(f32, f32)> for OptimalRange {
    fn from((min, max): (f32, f32)) -> Self {
        Self { min, max }
    }
}

impl From<OptimalRange> for (f32, f32) {
    fn from(range: OptimalRange) -> Self {
        (range.min, range.max)
    }
}

/// A species' optimal growing conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRequirements {
    /// Optimal water level.
    pub optimal_water: OptimalRange,
    /// Optimal light level.
    pub optimal_light: OptimalRange,
    /// Optimal temperature in °C.
    pub optimal_temp: OptimalRange,
    /// Optimal humidity.
    pub optimal_humidity: OptimalRange,
    /// Resistance to water deficit (0-1).
    pub drought_tolerance: f32,
    /// Resistance to excess heat (0-1).
    pub heat_tolerance: f32,
}

impl Default for GrowthRequirements {
    fn default() -> Self {
        Self {
            optimal_water: OptimalRange::new(40.0, 80.0),
            optimal_light: OptimalRange::new(50.0, 90.0),
            optimal_temp: OptimalRange::new(15.0, 30.0),
            optimal_humidity: OptimalRange::new(40.0, 80.0),
            drought_tolerance: 0.3,
            heat_tolerance: 0.3,
        }
    }
}

/// Which side of a range a tolerance softens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Both sides unscaled.
    None,
    /// Deficit stress scaled by `1 - t`.
    Deficit(f32),
    /// Excess stress scaled by `1 - t`.
    Excess(f32),
}

/// Stress in `[0, 1]` for a value relative to its optimal range.
///
/// Inside the range the stress is zero. Below it the deficit is measured
/// against `min`, above it the excess against `100 - max`. A degenerate span
/// (`min <= 0` for a deficit, `max >= 100` for an excess) or a non-finite
/// value saturates at `1.0`.
#[must_use]
pub fn stress_for(value: f32, range: OptimalRange, tolerance: Tolerance) -> f32 {
    if range.contains(value) {
        return 0.0;
    }
    if !value.is_finite() {
        return 1.0;
    }

    let raw = if value < range.min {
        let stress = saturating_ratio(range.min - value, range.min);
        match tolerance {
            Tolerance::Deficit(t) => stress * (1.0 - t.clamp(0.0, 1.0)),
            Tolerance::None | Tolerance::Excess(_) => stress,
        }
    } else {
        let stress = saturating_ratio(value - range.max, FACTOR_MAX - range.max);
        match tolerance {
            Tolerance::Excess(t) => stress * (1.0 - t.clamp(0.0, 1.0)),
            Tolerance::None | Tolerance::Deficit(_) => stress,
        }
    };

    if raw.is_nan() {
        return 1.0;
    }
    raw.clamp(0.0, 1.0)
}

/// `deviation / span`, or `1.0` when the span cannot divide.
fn saturating_ratio(deviation: f32, span: f32) -> f32 {
    if !(span > 0.0) {
        return 1.0;
    }
    deviation / span
}

/// Environmental factor that a plant can be stressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressFactor {
    /// Water deficit or excess.
    Water,
    /// Too dark or too bright.
    Light,
    /// Too cold or too hot.
    Temperature,
    /// Air too dry or too damp.
    Humidity,
}

impl StressFactor {
    /// Get the display name of this factor.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Water => "Water",
            Self::Light => "Light",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
        }
    }

    /// Get all factors, in tie-break order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Water, Self::Light, Self::Temperature, Self::Humidity]
    }
}

/// Per-factor stress values from the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StressFactors {
    /// Water stress.
    pub water: f32,
    /// Light stress.
    pub light: f32,
    /// Temperature stress.
    pub temperature: f32,
    /// Humidity stress.
    pub humidity: f32,
}

impl StressFactors {
    /// Stress for a single factor.
    #[must_use]
    pub fn get(&self, factor: StressFactor) -> f32 {
        match factor {
            StressFactor::Water => self.water,
            StressFactor::Light => self.light,
            StressFactor::Temperature => self.temperature,
            StressFactor::Humidity => self.humidity,
        }
    }

    /// Sum of all factor stresses.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.water + self.light + self.temperature + self.humidity
    }

    /// Mean of all factor stresses.
    #[must_use]
    pub fn mean(&self) -> f32 {
        self.total() / StressFactor::all().len() as f32
    }

    /// Factor with the highest stress; the first wins ties.
    #[must_use]
    pub fn dominant(&self) -> Option<StressFactor> {
        let mut best: Option<(StressFactor, f32)> = None;
        for factor in StressFactor::all() {
            let value = self.get(factor);
            if value <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((factor, value));
            }
        }
        best.map(|(factor, _)| factor)
    }
}

/// Tolerance-aware model of a plant's response to its environment.
///
/// Tracks its own health, separate from the coarse health used by the
/// plant lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSystem {
    requirements: GrowthRequirements,
    stress: StressFactors,
    overall_health: f32,
    growth_rate_modifier: f32,
}

impl EnvironmentSystem {
    /// Create a system at full health.
    #[must_use]
    pub fn new(requirements: GrowthRequirements) -> Self {
        Self {
            requirements,
            stress: StressFactors::default(),
            overall_health: MAX_HEALTH,
            growth_rate_modifier: 1.0,
        }
    }

    /// Update the response to this tick's conditions.
    pub fn update(&mut self, environment: &EnvironmentalFactors) {
        let req = &self.requirements;
        self.stress = StressFactors {
            water: stress_for(
                environment.water_level,
                req.optimal_water,
                Tolerance::Deficit(req.drought_tolerance),
            ),
            light: stress_for(environment.light_level, req.optimal_light, Tolerance::None),
            temperature: stress_for(
                environment.temperature,
                req.optimal_temp,
                Tolerance::Excess(req.heat_tolerance),
            ),
            humidity: stress_for(environment.humidity, req.optimal_humidity, Tolerance::None),
        };

        self.update_health(environment.soil_quality);
        self.update_growth_rate();
    }

    fn update_health(&mut self, soil_quality: f32) {
        let avg_stress = self.stress.mean();
        if avg_stress > 0.0 {
            self.overall_health -= avg_stress * 2.0;
        } else {
            let soil = soil_quality.clamp(0.0, FACTOR_MAX) / FACTOR_MAX;
            self.overall_health += 0.1 * soil;
        }
        self.overall_health = self.overall_health.clamp(0.0, MAX_HEALTH);
    }

    fn update_growth_rate(&mut self) {
        let base_rate = self.overall_health / MAX_HEALTH;
        let stress_modifier = 1.0 - self.stress.mean() / 4.0;
        self.growth_rate_modifier = (base_rate * stress_modifier).max(0.0);
    }

    /// Requirements this system evaluates against.
    #[must_use]
    pub fn requirements(&self) -> &GrowthRequirements {
        &self.requirements
    }

    /// Per-factor stress from the last update.
    #[must_use]
    pub fn stress(&self) -> &StressFactors {
        &self.stress
    }

    /// Health on the 0-100 scale.
    #[must_use]
    pub fn overall_health(&self) -> f32 {
        self.overall_health
    }

    /// Current growth rate modifier.
    #[must_use]
    pub fn growth_modifier(&self) -> f32 {
        self.growth_rate_modifier
    }

    /// Check if the plant is in optimal growing conditions.
    #[must_use]
    pub fn is_flourishing(&self) -> bool {
        self.overall_health > 90.0 && self.growth_rate_modifier > 0.9
    }

    /// Check if the plant is under significant stress.
    #[must_use]
    pub fn is_stressed(&self) -> bool {
        self.overall_health < 50.0 || self.growth_rate_modifier < 0.5
    }

    /// Check if conditions are severe enough to cause withering.
    #[must_use]
    pub fn should_wither(&self) -> bool {
        self.overall_health < 20.0 || self.growth_rate_modifier < 0.1
    }

    /// Factor causing the most stress, if any.
    #[must_use]
    pub fn dominant_stress_factor(&self) -> Option<StressFactor> {
        self.stress.dominant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn optimal() -> EnvironmentalFactors {
        EnvironmentalFactors {
            water_level: 60.0,
            light_level: 70.0,
            temperature: 20.0,
            humidity: 60.0,
            soil_quality: 100.0,
        }
    }

    #[test]
    fn test_in_range_is_stress_free() {
        let range = OptimalRange::new(40.0, 80.0);
        assert_eq!(stress_for(40.0, range, Tolerance::None), 0.0);
        assert_eq!(stress_for(80.0, range, Tolerance::None), 0.0);
        assert_eq!(stress_for(55.0, range, Tolerance::Deficit(0.5)), 0.0);
    }

    #[test]
    fn test_deficit_and_excess() {
        let range = OptimalRange::new(40.0, 80.0);
        assert!((stress_for(20.0, range, Tolerance::None) - 0.5).abs() < 1e-6);
        assert!((stress_for(90.0, range, Tolerance::None) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tolerance_scales_one_side_only() {
        let range = OptimalRange::new(40.0, 80.0);
        let deficit = stress_for(20.0, range, Tolerance::Deficit(0.5));
        assert!((deficit - 0.25).abs() < 1e-6);
        // Drought tolerance does not soften over-watering
        let excess = stress_for(90.0, range, Tolerance::Deficit(0.5));
        assert!((excess - 0.5).abs() < 1e-6);

        let hot = stress_for(90.0, range, Tolerance::Excess(0.5));
        assert!((hot - 0.25).abs() < 1e-6);
        let cold = stress_for(20.0, range, Tolerance::Excess(0.5));
        assert!((cold - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_ranges_saturate() {
        assert_eq!(stress_for(-5.0, OptimalRange::new(0.0, 50.0), Tolerance::None), 1.0);
        assert_eq!(stress_for(120.0, OptimalRange::new(20.0, 100.0), Tolerance::None), 1.0);
        assert_eq!(stress_for(-1.0, OptimalRange::new(-0.0, 0.0), Tolerance::None), 1.0);
        assert_eq!(stress_for(f32::NAN, OptimalRange::new(10.0, 20.0), Tolerance::None), 1.0);
    }

    #[test]
    fn test_far_outside_range_clamps_to_one() {
        let range = OptimalRange::new(40.0, 80.0);
        assert_eq!(stress_for(500.0, range, Tolerance::None), 1.0);
        assert_eq!(stress_for(-500.0, range, Tolerance::None), 1.0);
    }

    #[test]
    fn test_optimal_conditions_recover() {
        let mut system = EnvironmentSystem::new(GrowthRequirements {
            optimal_water: OptimalRange::new(40.0, 80.0),
            optimal_light: OptimalRange::new(50.0, 90.0),
            optimal_temp: OptimalRange::new(15.0, 30.0),
            optimal_humidity: OptimalRange::new(40.0, 80.0),
            drought_tolerance: 0.0,
            heat_tolerance: 0.0,
        });
        system.update(&optimal());
        assert_eq!(system.overall_health(), MAX_HEALTH);
        assert!((system.growth_modifier() - 1.0).abs() < 1e-6);
        assert!(system.is_flourishing());
        assert!(!system.is_stressed());
        assert_eq!(system.dominant_stress_factor(), None);
    }

    #[test]
    fn test_health_and_modifier_use_distinct_curves() {
        let mut system = EnvironmentSystem::new(GrowthRequirements {
            drought_tolerance: 0.0,
            ..GrowthRequirements::default()
        });
        let mut env = optimal();
        env.water_level = 20.0; // water stress 0.5, mean 0.125
        system.update(&env);

        assert!((system.stress().water - 0.5).abs() < 1e-6);
        assert!((system.overall_health() - 99.75).abs() < 1e-4);
        let expected = (99.75 / 100.0) * (1.0 - 0.125 / 4.0);
        assert!((system.growth_modifier() - expected).abs() < 1e-5);
        assert_eq!(system.dominant_stress_factor(), Some(StressFactor::Water));
    }

    #[test]
    fn test_dominant_tie_prefers_first() {
        let stress = StressFactors {
            water: 0.0,
            light: 0.4,
            temperature: 0.4,
            humidity: 0.1,
        };
        assert_eq!(stress.dominant(), Some(StressFactor::Light));
    }

    #[test]
    fn test_persistent_stress_leads_to_wither() {
        let mut system = EnvironmentSystem::new(GrowthRequirements::default());
        let env = EnvironmentalFactors {
            water_level: 0.0,
            light_level: 0.0,
            temperature: 50.0,
            humidity: 0.0,
            soil_quality: 50.0,
        };
        for _ in 0..200 {
            system.update(&env);
        }
        assert!(system.should_wither());
        assert!(system.is_stressed());
        assert_eq!(system.overall_health(), 0.0);
    }

    #[test]
    fn test_optimal_range_serde_as_array() {
        let range: OptimalRange = serde_json::from_str("[10.0, 25.5]").expect("parse");
        assert_eq!(range, OptimalRange::new(10.0, 25.5));
        let json = serde_json::to_string(&range).expect("serialize");
        assert_eq!(json, "[10.0,25.5]");
    }

    proptest! {
        #[test]
        fn proptest_stress_bounded_and_finite(
            value in -200.0f32..300.0,
            min in -50.0f32..120.0,
            width in 0.0f32..120.0,
            tol in -1.0f32..2.0,
        ) {
            let range = OptimalRange::new(min, min + width);
            for tolerance in [Tolerance::None, Tolerance::Deficit(tol), Tolerance::Excess(tol)] {
                let s = stress_for(value, range, tolerance);
                prop_assert!(s.is_finite());
                prop_assert!((0.0..=1.0).contains(&s));
                if range.contains(value) {
                    prop_assert_eq!(s, 0.0);
                }
            }
        }

        #[test]
        fn proptest_health_stays_bounded(
            steps in proptest::collection::vec(
                (0.0f32..100.0, 0.0f32..100.0, -20.0f32..60.0, 0.0f32..100.0, 0.0f32..100.0),
                1..200,
            ),
        ) {
            let mut system = EnvironmentSystem::new(GrowthRequirements::default());
            for (water, light, temperature, humidity, soil) in steps {
                system.update(&EnvironmentalFactors {
                    water_level: water,
                    light_level: light,
                    temperature,
                    humidity,
                    soil_quality: soil,
                });
                prop_assert!((0.0..=MAX_HEALTH).contains(&system.overall_health()));
                prop_assert!(system.growth_modifier() >= 0.0);
            }
        }
    }
}
