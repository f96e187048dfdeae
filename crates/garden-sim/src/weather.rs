//! Weather and the per-tick environment.
//!
//! This module provides:
//! - Weather states and their effect on light, humidity and soil water
//! - A seeded weather system with random durations and drifting wind
//! - [`EnvironmentDriver`], which combines the day cycle and weather into
//!   one [`EnvironmentalFactors`] snapshot per tick

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::environment::{EnvironmentalFactors, FACTOR_MAX};
use crate::rng::SimRng;
use crate::time::DayCycle;

/// Fraction of the gap to the target wind speed closed each tick.
const WIND_SMOOTHING: f32 = 0.01;
/// Shortest interval between wind target changes.
const MIN_WIND_CHANGE: u64 = 200;
/// Longest interval between wind target changes.
const MAX_WIND_CHANGE: u64 = 400;

/// Weather states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherState {
    /// Clear skies; soil slowly dries.
    #[default]
    Clear,
    /// Overcast, reduced light.
    Cloudy,
    /// Rain; waters the soil.
    Raining,
    /// Heavy rain and wind.
    Storm,
}

impl WeatherState {
    /// Get the display name for this weather state.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Cloudy => "Cloudy",
            Self::Raining => "Raining",
            Self::Storm => "Storm",
        }
    }

    /// Check if it's currently raining (includes storm).
    #[must_use]
    pub fn is_raining(self) -> bool {
        matches!(self, Self::Raining | Self::Storm)
    }

    /// Multiplier on daylight.
    #[must_use]
    pub fn light_modifier(self) -> f32 {
        match self {
            Self::Clear => 1.0,
            Self::Cloudy => 0.7,
            Self::Raining => 0.5,
            Self::Storm => 0.3,
        }
    }

    /// Humidity added per tick.
    #[must_use]
    pub fn humidity_gain(self) -> f32 {
        match self {
            Self::Clear => 0.0,
            Self::Cloudy => 0.1,
            Self::Raining => 0.3,
            Self::Storm => 0.5,
        }
    }

    /// Soil water change per tick.
    #[must_use]
    pub fn water_change(self) -> f32 {
        match self {
            Self::Clear => -0.1,
            Self::Cloudy => 0.0,
            Self::Raining => 0.2,
            Self::Storm => 0.4,
        }
    }

    /// Range the wind target is drawn from.
    #[must_use]
    pub fn wind_range(self) -> (f32, f32) {
        match self {
            Self::Clear => (0.2, 1.0),
            Self::Cloudy => (0.5, 1.5),
            Self::Raining => (1.0, 2.0),
            Self::Storm => (2.0, 3.0),
        }
    }

    /// Get all weather states.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Clear, Self::Cloudy, Self::Raining, Self::Storm]
    }

    /// Apply this tick's weather to the environment, clamping every level.
    pub fn apply(self, environment: &mut EnvironmentalFactors) {
        environment.light_level =
            (environment.light_level * self.light_modifier()).clamp(0.0, FACTOR_MAX);
        environment.humidity = (environment.humidity + self.humidity_gain()).clamp(0.0, FACTOR_MAX);
        environment.water_level =
            (environment.water_level + self.water_change()).clamp(0.0, FACTOR_MAX);
    }
}

/// Configuration for weather changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Minimum ticks a weather state lasts.
    pub min_duration: u64,
    /// Maximum ticks a weather state lasts.
    pub max_duration: u64,
    /// Relative likelihood of each state, in [`WeatherState::all`] order.
    pub weights: [f32; 4],
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            min_duration: 300,
            max_duration: 600,
            // Clear, Cloudy, Raining, Storm
            weights: [0.4, 0.3, 0.2, 0.1],
        }
    }
}

impl WeatherConfig {
    /// Clamp values to usable ranges.
    pub fn validate(&mut self) {
        self.min_duration = self.min_duration.max(1);
        self.max_duration = self.max_duration.max(self.min_duration);
        if self.weights.iter().all(|w| !(*w > 0.0)) {
            self.weights = Self::default().weights;
        }
    }
}

/// Manages weather state and wind.
#[derive(Debug, Clone)]
pub struct WeatherSystem {
    current_state: WeatherState,
    time_remaining: u64,
    wind_speed: f32,
    target_wind_speed: f32,
    wind_timer: u64,
    config: WeatherConfig,
    rng: SimRng,
}

impl WeatherSystem {
    /// Create a weather system. The first update rolls the opening weather.
    #[must_use]
    pub fn new(config: WeatherConfig, rng: SimRng) -> Self {
        Self {
            current_state: WeatherState::Clear,
            time_remaining: 0,
            wind_speed: 0.0,
            target_wind_speed: 0.0,
            wind_timer: 0,
            config,
            rng,
        }
    }

    /// Get the current weather state.
    #[must_use]
    pub fn current(&self) -> WeatherState {
        self.current_state
    }

    /// Ticks left in the current weather.
    #[must_use]
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    /// Current wind speed.
    #[must_use]
    pub fn wind_speed(&self) -> f32 {
        self.wind_speed
    }

    /// Advance one tick.
    ///
    /// Returns `Some(new_state)` if the weather changed.
    pub fn update(&mut self) -> Option<WeatherState> {
        let mut changed = None;
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            let next = self.pick_next_state();
            if next != self.current_state {
                self.current_state = next;
                changed = Some(next);
            }
            self.time_remaining = self.roll_duration();
        }

        self.wind_timer = self.wind_timer.saturating_sub(1);
        if self.wind_timer == 0 {
            let (min, max) = self.current_state.wind_range();
            self.target_wind_speed = self.rng.range(min, max);
            self.wind_timer = self.rng.range_inclusive(MIN_WIND_CHANGE, MAX_WIND_CHANGE);
        }
        self.wind_speed += (self.target_wind_speed - self.wind_speed) * WIND_SMOOTHING;

        changed
    }

    fn pick_next_state(&mut self) -> WeatherState {
        self.rng
            .weighted(&self.config.weights)
            .and_then(|idx| WeatherState::all().get(idx).copied())
            .unwrap_or_default()
    }

    fn roll_duration(&mut self) -> u64 {
        self.rng
            .range_inclusive(self.config.min_duration, self.config.max_duration)
            .max(1)
    }
}

/// Produces the environment snapshot for each tick.
#[derive(Debug, Clone)]
pub struct EnvironmentDriver {
    environment: EnvironmentalFactors,
    day: DayCycle,
    weather: WeatherSystem,
}

impl EnvironmentDriver {
    /// Create a driver starting from the given conditions.
    #[must_use]
    pub fn new(initial: EnvironmentalFactors, day: DayCycle, weather: WeatherSystem) -> Self {
        Self {
            environment: initial,
            day,
            weather,
        }
    }

    /// Advance time and weather by one tick and return the new conditions.
    pub fn tick(&mut self) -> EnvironmentalFactors {
        if self.day.tick() {
            info!("Day {} begins", self.day.day_count());
        }
        if let Some(state) = self.weather.update() {
            info!("Weather changed to {}", state.display_name());
        }

        self.environment.light_level = self.day.light_level();
        self.weather.current().apply(&mut self.environment);
        self.environment
    }

    /// Conditions from the latest tick.
    #[must_use]
    pub fn environment(&self) -> &EnvironmentalFactors {
        &self.environment
    }

    /// Day cycle.
    #[must_use]
    pub fn day(&self) -> &DayCycle {
        &self.day
    }

    /// Weather system.
    #[must_use]
    pub fn weather(&self) -> &WeatherSystem {
        &self.weather
    }
}
