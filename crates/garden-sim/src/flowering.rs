//! Per-branch flowering lifecycle.
//!
//! Each branch that becomes eligible gets one [`FlowerRecord`], which steps
//! through bud → opening → bloomed → withering on fixed tick durations and
//! then either reschedules itself or stops for good.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use garden_common::BranchId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rng::SimRng;
use crate::stem::StemSystem;

/// Ticks spent as a bud.
pub const BUD_DURATION: u64 = 100;
/// Ticks spent opening.
pub const OPENING_DURATION: u64 = 150;
/// Ticks spent withering.
pub const WITHERING_DURATION: u64 = 100;
/// Branch growth needed before a branch can flower.
pub const FLOWER_ELIGIBLE_GROWTH: f32 = 0.95;
/// Chance that a withered flower schedules another bloom.
pub const REBLOOM_CHANCE: f32 = 0.3;
/// Shortest wait before a rebloom.
pub const REBLOOM_MIN_DELAY: u64 = 300;
/// Longest wait before a rebloom.
pub const REBLOOM_MAX_DELAY: u64 = 600;
/// Nominal flower size per unit of stem thickness.
pub const FLOWER_SIZE_PER_THICKNESS: f32 = 7.5;
/// Relative size of a bud.
pub const BUD_SCALE: f32 = 0.3;
/// Relative size at the end of withering.
pub const WITHERED_SCALE: f32 = 0.8;

/// Flowering behaviour of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloweringCharacteristics {
    /// Plant growth stage required before flowering (0-1).
    pub min_maturity: f32,
    /// Probability that an eligible branch flowers at all.
    pub chance: f32,
    /// Minimum ticks between eligibility and the first bud.
    pub min_delay: u64,
    /// Maximum ticks between eligibility and the first bud.
    pub max_delay: u64,
    /// Ticks a flower stays in full bloom.
    pub bloom_duration: u64,
}

impl Default for FloweringCharacteristics {
    fn default() -> Self {
        Self {
            min_maturity: 0.7,
            chance: 0.6,
            min_delay: 50,
            max_delay: 200,
            bloom_duration: 400,
        }
    }
}

/// Stage of an active flower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowerStage {
    /// Closed bud.
    #[default]
    Bud,
    /// Petals unfolding.
    Opening,
    /// Fully open.
    Bloomed,
    /// Fading.
    Withering,
}

impl FlowerStage {
    /// Get the display name of this stage.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Bud => "Bud",
            Self::Opening => "Opening",
            Self::Bloomed => "Bloomed",
            Self::Withering => "Withering",
        }
    }

    /// Fixed duration of this stage, if it has one.
    #[must_use]
    pub fn duration(self) -> Option<u64> {
        match self {
            Self::Bud => Some(BUD_DURATION),
            Self::Opening => Some(OPENING_DURATION),
            Self::Bloomed => None,
            Self::Withering => Some(WITHERING_DURATION),
        }
    }

    /// Size relative to nominal at a given stage progress.
    ///
    /// Continuous across stage boundaries.
    #[must_use]
    pub fn scale(self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Self::Bud => BUD_SCALE,
            Self::Opening => BUD_SCALE + (1.0 - BUD_SCALE) * p,
            Self::Bloomed => 1.0,
            Self::Withering => 1.0 - (1.0 - WITHERED_SCALE) * p,
        }
    }
}

fn timed_progress(elapsed: u64, duration: u64) -> f32 {
    if duration == 0 {
        return 1.0;
    }
    (elapsed as f32 / duration as f32).min(1.0)
}

/// Flowering bookkeeping for one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowerRecord {
    branch: BranchId,
    should_flower: bool,
    flower_time: u64,
    stage: FlowerStage,
    stage_progress: f32,
    stage_start_tick: Option<u64>,
    bloom_end_tick: u64,
    size: f32,
}

impl FlowerRecord {
    /// Draw the flowering decision for a branch that just became eligible.
    pub fn schedule(
        branch: BranchId,
        age: u64,
        characteristics: &FloweringCharacteristics,
        stem_thickness: f32,
        rng: &mut SimRng,
    ) -> Self {
        let should_flower = rng.chance(characteristics.chance);
        let delay = rng.range_inclusive(characteristics.min_delay, characteristics.max_delay);
        let size = stem_thickness.max(0.0) * FLOWER_SIZE_PER_THICKNESS * rng.range(0.8, 1.2);
        Self {
            branch,
            should_flower,
            flower_time: age.saturating_add(delay),
            stage: FlowerStage::Bud,
            stage_progress: 0.0,
            stage_start_tick: None,
            bloom_end_tick: 0,
            size,
        }
    }

    /// Advance the record to the given plant age.
    pub fn advance(&mut self, age: u64, bloom_duration: u64, rng: &mut SimRng) {
        if !self.should_flower || age < self.flower_time {
            return;
        }

        let Some(start) = self.stage_start_tick else {
            self.enter(FlowerStage::Bud, age);
            return;
        };
        let elapsed = age.saturating_sub(start);

        match self.stage {
            FlowerStage::Bud => {
                if elapsed >= BUD_DURATION {
                    self.enter(FlowerStage::Opening, age);
                } else {
                    self.stage_progress = timed_progress(elapsed, BUD_DURATION);
                }
            },
            FlowerStage::Opening => {
                if elapsed >= OPENING_DURATION {
                    self.enter(FlowerStage::Bloomed, age);
                    self.bloom_end_tick = age.saturating_add(bloom_duration);
                } else {
                    self.stage_progress = timed_progress(elapsed, OPENING_DURATION);
                }
            },
            FlowerStage::Bloomed => {
                if age > self.bloom_end_tick {
                    self.enter(FlowerStage::Withering, age);
                } else {
                    self.stage_progress = timed_progress(elapsed, bloom_duration);
                }
            },
            FlowerStage::Withering => {
                if elapsed >= WITHERING_DURATION {
                    self.finish(age, rng);
                } else {
                    self.stage_progress = timed_progress(elapsed, WITHERING_DURATION);
                }
            },
        }
    }

    fn enter(&mut self, stage: FlowerStage, age: u64) {
        self.stage = stage;
        self.stage_progress = 0.0;
        self.stage_start_tick = Some(age);
        debug!("Flower on branch {} entered {}", self.branch.raw(), stage.display_name());
    }

    fn finish(&mut self, age: u64, rng: &mut SimRng) {
        self.stage = FlowerStage::Bud;
        self.stage_progress = 0.0;
        self.stage_start_tick = None;

        if rng.chance(REBLOOM_CHANCE) {
            let delay = rng.range_inclusive(REBLOOM_MIN_DELAY, REBLOOM_MAX_DELAY);
            self.flower_time = age.saturating_add(delay);
            debug!(
                "Flower on branch {} will rebloom at tick {}",
                self.branch.raw(),
                self.flower_time
            );
        } else {
            self.should_flower = false;
            debug!("Flower on branch {} is spent", self.branch.raw());
        }
    }

    /// Branch this record belongs to.
    #[must_use]
    pub fn branch(&self) -> BranchId {
        self.branch
    }

    /// Whether the branch will (still) flower.
    #[must_use]
    pub fn should_flower(&self) -> bool {
        self.should_flower
    }

    /// Age at which flowering may begin.
    #[must_use]
    pub fn flower_time(&self) -> u64 {
        self.flower_time
    }

    /// Current (or next) stage.
    #[must_use]
    pub fn stage(&self) -> FlowerStage {
        self.stage
    }

    /// Progress through the current stage (0-1).
    #[must_use]
    pub fn stage_progress(&self) -> f32 {
        self.stage_progress
    }

    /// Age at which the current stage began, if a flower is active.
    #[must_use]
    pub fn stage_start_tick(&self) -> Option<u64> {
        self.stage_start_tick
    }

    /// Age after which a bloom starts withering.
    #[must_use]
    pub fn bloom_end_tick(&self) -> u64 {
        self.bloom_end_tick
    }

    /// Nominal full-bloom size.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Check if a flower is currently visible on this branch.
    #[must_use]
    pub fn is_flowering(&self) -> bool {
        self.should_flower && self.stage_start_tick.is_some()
    }

    /// Size to draw, scaled by the plant's growth stage.
    #[must_use]
    pub fn rendered_size(&self, growth_stage: f32) -> Option<f32> {
        if !self.is_flowering() {
            return None;
        }
        let scale = self.stage.scale(self.stage_progress);
        Some(self.size * scale * growth_stage.clamp(0.0, 1.0))
    }
}

/// Flower records for every branch of one plant.
#[derive(Debug, Clone)]
pub struct FloweringStateMachine {
    characteristics: FloweringCharacteristics,
    records: HashMap<BranchId, FlowerRecord>,
}

impl FloweringStateMachine {
    /// Create an empty table.
    #[must_use]
    pub fn new(characteristics: FloweringCharacteristics) -> Self {
        Self {
            characteristics,
            records: HashMap::new(),
        }
    }

    /// Evaluate every branch for the given plant state.
    ///
    /// Branches without a record get one the first tick they pass the
    /// eligibility gate; existing records advance regardless of the gate.
    pub fn update(&mut self, stem: &StemSystem, growth_stage: f32, age: u64, rng: &mut SimRng) {
        let thickness = stem.properties().thickness;
        for branch in stem.branches() {
            let record = match self.records.entry(branch.id()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    if branch.growth() < FLOWER_ELIGIBLE_GROWTH
                        || growth_stage < self.characteristics.min_maturity
                    {
                        continue;
                    }
                    entry.insert(FlowerRecord::schedule(
                        branch.id(),
                        age,
                        &self.characteristics,
                        thickness,
                        rng,
                    ))
                },
            };
            record.advance(age, self.characteristics.bloom_duration, rng);
        }
    }

    /// Flowering characteristics in use.
    #[must_use]
    pub fn characteristics(&self) -> &FloweringCharacteristics {
        &self.characteristics
    }

    /// Record for a branch, if one was created.
    #[must_use]
    pub fn record(&self, branch: BranchId) -> Option<&FlowerRecord> {
        self.records.get(&branch)
    }

    /// Iterate over all records.
    pub fn records(&self) -> impl Iterator<Item = &FlowerRecord> {
        self.records.values()
    }

    /// Number of records created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no branch has become eligible yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of branches currently showing a flower.
    #[must_use]
    pub fn flowering_count(&self) -> usize {
        self.records.values().filter(|r| r.is_flowering()).count()
    }
}
