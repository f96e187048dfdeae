//! Day/night cycle measured in simulation ticks.
//!
//! Light rises through dawn, holds during the day and falls through dusk.

use serde::{Deserialize, Serialize};

/// Default ticks per day.
pub const DEFAULT_DAY_LENGTH: u64 = 1200;
/// Fraction of the day spent in dawn.
const DAWN_END: f32 = 0.2;
/// Fraction of the day at which dusk begins.
const DUSK_START: f32 = 0.8;
/// Light at the start of dawn and end of dusk.
const NIGHT_LIGHT: f32 = 20.0;
/// Light during the day.
const DAY_LIGHT: f32 = 80.0;

/// Phase of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    /// Light rising.
    Dawn,
    /// Full daylight.
    Day,
    /// Light falling.
    Dusk,
}

impl DayPhase {
    /// Get the display name of this phase.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dawn => "Dawn",
            Self::Day => "Day",
            Self::Dusk => "Dusk",
        }
    }
}

/// Tick-based day/night cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCycle {
    day_length: u64,
    current_time: u64,
    day_count: u64,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_LENGTH)
    }
}

impl DayCycle {
    /// Create a cycle of the given length in ticks (at least 1).
    #[must_use]
    pub fn new(day_length: u64) -> Self {
        Self {
            day_length: day_length.max(1),
            current_time: 0,
            day_count: 0,
        }
    }

    /// Advance one tick. Returns `true` when a new day starts.
    pub fn tick(&mut self) -> bool {
        self.current_time = (self.current_time + 1) % self.day_length;
        if self.current_time == 0 {
            self.day_count += 1;
            return true;
        }
        false
    }

    /// Position within the day (0.0 to 1.0).
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.current_time as f32 / self.day_length as f32
    }

    /// Current phase of the day.
    #[must_use]
    pub fn phase(&self) -> DayPhase {
        let p = self.progress();
        if p < DAWN_END {
            DayPhase::Dawn
        } else if p < DUSK_START {
            DayPhase::Day
        } else {
            DayPhase::Dusk
        }
    }

    /// Light level before weather (0-100).
    #[must_use]
    pub fn light_level(&self) -> f32 {
        let p = self.progress();
        match self.phase() {
            DayPhase::Dawn => NIGHT_LIGHT + (DAY_LIGHT - NIGHT_LIGHT) * (p / DAWN_END),
            DayPhase::Day => DAY_LIGHT,
            DayPhase::Dusk => {
                let phase_progress = (p - DUSK_START) / (1.0 - DUSK_START);
                DAY_LIGHT - (DAY_LIGHT - NIGHT_LIGHT) * phase_progress
            },
        }
    }

    /// Ticks per day.
    #[must_use]
    pub fn day_length(&self) -> u64 {
        self.day_length
    }

    /// Ticks since the start of the current day.
    #[must_use]
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Completed days.
    #[must_use]
    pub fn day_count(&self) -> u64 {
        self.day_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ticks: u64) -> DayCycle {
        let mut cycle = DayCycle::default();
        for _ in 0..ticks {
            cycle.tick();
        }
        cycle
    }

    #[test]
    fn test_day_cycle_creation() {
        let cycle = DayCycle::default();
        assert_eq!(cycle.day_length(), 1200);
        assert_eq!(cycle.current_time(), 0);
        assert_eq!(cycle.phase(), DayPhase::Dawn);
        assert!((cycle.light_level() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_light_through_the_day() {
        // halfway through dawn
        assert!((at(120).light_level() - 50.0).abs() < 1e-3);
        assert_eq!(at(240).phase(), DayPhase::Day);
        assert!((at(600).light_level() - 80.0).abs() < 1e-4);
        // halfway through dusk
        let dusk = at(1080);
        assert_eq!(dusk.phase(), DayPhase::Dusk);
        assert!((dusk.light_level() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_day_rollover() {
        let mut cycle = DayCycle::new(10);
        let mut new_days = 0;
        for _ in 0..25 {
            if cycle.tick() {
                new_days += 1;
            }
        }
        assert_eq!(new_days, 2);
        assert_eq!(cycle.day_count(), 2);
        assert_eq!(cycle.current_time(), 5);
    }

    #[test]
    fn test_zero_length_day() {
        let mut cycle = DayCycle::new(0);
        assert_eq!(cycle.day_length(), 1);
        assert!(cycle.tick());
        assert!((0.0..=100.0).contains(&cycle.light_level()));
    }

    #[test]
    fn test_light_in_range() {
        let mut cycle = DayCycle::new(97);
        for _ in 0..300 {
            cycle.tick();
            let light = cycle.light_level();
            assert!((NIGHT_LIGHT - 1e-3..=DAY_LIGHT + 1e-3).contains(&light));
        }
    }
}
