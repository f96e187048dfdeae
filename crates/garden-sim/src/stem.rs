//! Stem system: the recursive tree of growable branches.
//!
//! This module provides:
//! - Stem definitions loaded with each species
//! - [`Branch`], a line segment that grows in place and owns its children
//! - [`StemSystem`], which grows the whole tree and spawns side branches
//!   from the main stem under spacing and count limits

use garden_common::{height_between, polar_offset, BranchId, Vec2, UPRIGHT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::MAX_HEALTH;
use crate::rng::SimRng;

/// Shortest side branch, as a fraction of the main stem's length.
pub const MIN_CHILD_LENGTH_RATIO: f32 = 0.4;
/// Longest side branch, as a fraction of the main stem's length.
pub const MAX_CHILD_LENGTH_RATIO: f32 = 0.8;

/// Physical properties shared by every branch of one plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemProperties {
    /// Base stem thickness.
    pub thickness: f32,
    /// How much the stem bends.
    pub flexibility: f32,
    /// Base angle between the main stem and a side branch (radians).
    pub branching_angle: f32,
    /// Uniform jitter applied to the branching angle (radians).
    pub branching_variance: f32,
    /// Maximum number of side branches on the main stem.
    pub max_branches: u32,
    /// Multiplier applied to every growth amount.
    pub growth_rate: f32,
    /// Growth needed between spawns, as a fraction of main stem length.
    pub branch_spacing: f32,
}

impl Default for StemProperties {
    fn default() -> Self {
        Self {
            thickness: 4.0,
            flexibility: 0.3,
            branching_angle: 0.6,
            branching_variance: 0.15,
            max_branches: 6,
            growth_rate: 1.0,
            branch_spacing: 0.2,
        }
    }
}

/// Surface texture of a stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemTexture {
    /// Plain green stem.
    #[default]
    Smooth,
    /// Bark-like stem.
    Woody,
    /// Stem with thorns.
    Thorny,
}

impl StemTexture {
    /// Get the display name of this texture.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Smooth => "Smooth",
            Self::Woody => "Woody",
            Self::Thorny => "Thorny",
        }
    }
}

/// Visual properties of a stem, carried for external renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemAppearance {
    /// Base RGB color.
    pub color: [u8; 3],
    /// Surface texture.
    pub texture: StemTexture,
    /// How visible nodes are (0-1).
    pub node_visibility: f32,
    /// Thorn density, only meaningful for thorny stems.
    #[serde(default)]
    pub thorn_frequency: f32,
}

impl Default for StemAppearance {
    fn default() -> Self {
        Self {
            color: [60, 140, 60],
            texture: StemTexture::Smooth,
            node_visibility: 0.5,
            thorn_frequency: 0.0,
        }
    }
}

/// Complete definition of a stem system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StemDefinition {
    /// Physical properties.
    pub properties: StemProperties,
    /// Visual properties.
    pub appearance: StemAppearance,
}

/// A single branch in the plant.
///
/// Angle and length are fixed at creation; only `growth` changes. The end
/// position is always derived from the other four fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    id: BranchId,
    start_pos: Vec2,
    angle: f32,
    length: f32,
    growth: f32,
    end_pos: Vec2,
    children: Vec<Branch>,
}

impl Branch {
    /// Create an ungrown branch.
    #[must_use]
    pub fn new(id: BranchId, start_pos: Vec2, angle: f32, length: f32) -> Self {
        let mut branch = Self {
            id,
            start_pos,
            angle,
            length: length.max(0.0),
            growth: 0.0,
            end_pos: start_pos,
            children: Vec::new(),
        };
        branch.update_end_pos();
        branch
    }

    fn update_end_pos(&mut self) {
        self.end_pos = polar_offset(self.start_pos, self.angle, self.length * self.growth);
    }

    /// Grow this branch and every descendant by the same amount.
    pub fn grow(&mut self, amount: f32) {
        self.set_growth(self.growth + amount);
        for child in &mut self.children {
            child.grow(amount);
        }
    }

    /// Set the growth fraction, clamped to [0, 1].
    pub fn set_growth(&mut self, growth: f32) {
        self.growth = if growth.is_nan() { 0.0 } else { growth.clamp(0.0, 1.0) };
        self.update_end_pos();
    }

    /// Attach a new child at the current tip, rotated by `angle_offset`.
    pub fn add_child(&mut self, id: BranchId, angle_offset: f32, length: f32) {
        let child = Branch::new(id, self.end_pos, self.angle + angle_offset, length);
        self.children.push(child);
    }

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> BranchId {
        self.id
    }

    /// Base position, relative to the plant origin.
    #[must_use]
    pub fn start_pos(&self) -> Vec2 {
        self.start_pos
    }

    /// Tip position, relative to the plant origin.
    #[must_use]
    pub fn end_pos(&self) -> Vec2 {
        self.end_pos
    }

    /// Direction in radians.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Full-grown length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Growth fraction (0-1).
    #[must_use]
    pub fn growth(&self) -> f32 {
        self.growth
    }

    /// Direct children, in spawn order.
    #[must_use]
    pub fn children(&self) -> &[Branch] {
        &self.children
    }

    /// Check if this branch has no children.
    #[must_use]
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal of this branch and all descendants.
    pub fn iter(&self) -> BranchIter<'_> {
        BranchIter { stack: vec![self] }
    }
}

/// Pre-order iterator over a branch tree.
#[derive(Debug)]
pub struct BranchIter<'a> {
    stack: Vec<&'a Branch>,
}

impl<'a> Iterator for BranchIter<'a> {
    type Item = &'a Branch;

    fn next(&mut self) -> Option<Self::Item> {
        let branch = self.stack.pop()?;
        self.stack.extend(branch.children.iter().rev());
        Some(branch)
    }
}

/// Manages the growth of a plant's stem tree.
#[derive(Debug, Clone)]
pub struct StemSystem {
    definition: StemDefinition,
    main_stem: Branch,
    last_branch_height: f32,
    health: f32,
    wither_progress: f32,
    next_id: BranchId,
}

impl StemSystem {
    /// Create a stem system with an upright main stem of the given length.
    #[must_use]
    pub fn new(definition: StemDefinition, main_stem_length: f32) -> Self {
        Self {
            definition,
            main_stem: Branch::new(BranchId::ROOT, Vec2::ZERO, UPRIGHT, main_stem_length),
            last_branch_height: 0.0,
            health: MAX_HEALTH,
            wither_progress: 0.0,
            next_id: BranchId::ROOT.next(),
        }
    }

    /// Grow the tree and spawn side branches when spacing allows.
    ///
    /// `amount` is scaled by the stem's growth rate and applied to every
    /// branch without attenuation by depth.
    pub fn grow(&mut self, amount: f32, rng: &mut SimRng) {
        let scaled = amount * self.definition.properties.growth_rate;
        if scaled.is_finite() {
            self.main_stem.grow(scaled);
        }
        self.try_spawn_branches(rng);
    }

    fn try_spawn_branches(&mut self, rng: &mut SimRng) {
        let props = &self.definition.properties;
        let max_branches = props.max_branches as usize;
        let root_length = self.main_stem.length;
        if max_branches == 0 || root_length <= 0.0 {
            return;
        }

        let current_height = height_between(self.main_stem.start_pos, self.main_stem.end_pos);
        let min_spacing = props.branch_spacing * root_length;
        if current_height - self.last_branch_height < min_spacing
            || self.main_stem.children.len() >= max_branches
        {
            return;
        }

        for side in [-1.0_f32, 1.0] {
            if self.main_stem.children.len() >= max_branches {
                break;
            }
            let variance = rng.range(-props.branching_variance, props.branching_variance);
            let angle_offset = props.branching_angle * side + variance;
            let length =
                root_length * rng.range(MIN_CHILD_LENGTH_RATIO, MAX_CHILD_LENGTH_RATIO);

            let id = self.next_id;
            self.next_id = id.next();
            self.main_stem.add_child(id, angle_offset, length);
            debug!(
                "Added branch {}: angle={angle_offset:.2}, length={length:.1}",
                id.raw()
            );
        }

        self.last_branch_height = current_height;
    }

    /// Store health for visual/structural effects.
    pub fn set_health(&mut self, health: f32) {
        self.health = if health.is_nan() { 0.0 } else { health.clamp(0.0, MAX_HEALTH) };
    }

    /// Set how far withering has progressed (0-1).
    pub fn set_wither_progress(&mut self, progress: f32) {
        self.wither_progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    }

    /// Stem definition.
    #[must_use]
    pub fn definition(&self) -> &StemDefinition {
        &self.definition
    }

    /// Physical properties.
    #[must_use]
    pub fn properties(&self) -> &StemProperties {
        &self.definition.properties
    }

    /// The root branch.
    #[must_use]
    pub fn main_stem(&self) -> &Branch {
        &self.main_stem
    }

    /// Stored health (0-100).
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Withering progress (0-1).
    #[must_use]
    pub fn wither_progress(&self) -> f32 {
        self.wither_progress
    }

    /// Current thickness after withering.
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.definition.properties.thickness * (1.0 - self.wither_progress)
    }

    /// Height of the main stem at the last branch spawn.
    #[must_use]
    pub fn last_branch_height(&self) -> f32 {
        self.last_branch_height
    }

    /// Pre-order traversal of every branch.
    pub fn branches(&self) -> BranchIter<'_> {
        self.main_stem.iter()
    }

    /// Every branch in pre-order.
    #[must_use]
    pub fn get_all_branches(&self) -> Vec<&Branch> {
        self.branches().collect()
    }

    /// Look up a branch by ID.
    #[must_use]
    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches().find(|b| b.id == id)
    }

    /// Total number of branches, including the main stem.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches().count()
    }
}
