//! Plant species definitions.
//!
//! Definitions are plain data loaded from JSON (or built in code with
//! [`PlantDefinitionBuilder`]) and shared between every plant of a species.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::environment::{GrowthRequirements, OptimalRange};
use crate::flowering::FloweringCharacteristics;
use crate::rng::SimRng;
use crate::stem::{StemAppearance, StemDefinition, StemProperties, StemTexture};

/// Errors raised while loading or registering definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Malformed JSON or a missing required field.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed data with out-of-range values.
    #[error("invalid definition '{species}': {reason}")]
    Invalid {
        /// Species being validated.
        species: String,
        /// What was wrong.
        reason: String,
    },

    /// A species with this name is already registered.
    #[error("duplicate species: {0}")]
    Duplicate(String),
}

/// Broad growth form of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantType {
    /// Woody, tall.
    Tree,
    /// Grass or grass-like.
    Grass,
    /// Low spreading cover.
    GroundCover,
    /// Soft-stemmed herb.
    Herb,
    /// Woody, bushy.
    Shrub,
    /// Flowering plant.
    #[default]
    Flower,
}

impl PlantType {
    /// Get the display name of this type.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Tree => "Tree",
            Self::Grass => "Grass",
            Self::GroundCover => "Ground Cover",
            Self::Herb => "Herb",
            Self::Shrub => "Shrub",
            Self::Flower => "Flower",
        }
    }
}

/// How fast and how long a species grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthCharacteristics {
    /// Length of the main stem when fully grown.
    pub max_height: f32,
    /// Multiplier on the base growth rate.
    pub growth_rate: f32,
    /// Age in ticks at which the plant starts withering.
    pub lifespan: u64,
    /// Flowering behaviour.
    #[serde(default)]
    pub flowering: FloweringCharacteristics,
}

impl Default for GrowthCharacteristics {
    fn default() -> Self {
        Self {
            max_height: 300.0,
            growth_rate: 1.0,
            lifespan: 5000,
            flowering: FloweringCharacteristics::default(),
        }
    }
}

/// Complete definition of a plant species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDefinition {
    /// Unique species name.
    pub species: String,
    /// Human readable name.
    #[serde(default)]
    pub common_name: String,
    /// Growth form.
    #[serde(rename = "type", default)]
    pub plant_type: PlantType,
    /// Growth speed, size and lifespan.
    pub growth_characteristics: GrowthCharacteristics,
    /// Optimal conditions and tolerances.
    pub environmental_requirements: GrowthRequirements,
    /// Stem shape and branching.
    pub stem: StemDefinition,
}

impl PlantDefinition {
    /// Create a new plant definition builder.
    #[must_use]
    pub fn builder(species: &str) -> PlantDefinitionBuilder {
        PlantDefinitionBuilder::new(species)
    }

    /// Parse and validate a definition from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.species.trim().is_empty() {
            return Err(self.invalid("species must not be empty"));
        }

        let growth = &self.growth_characteristics;
        if !(growth.max_height > 0.0) {
            return Err(self.invalid("max_height must be positive"));
        }
        if !(growth.growth_rate >= 0.0) {
            return Err(self.invalid("growth_rate must not be negative"));
        }

        let req = &self.environmental_requirements;
        for (name, range) in [
            ("optimal_water", req.optimal_water),
            ("optimal_light", req.optimal_light),
            ("optimal_temp", req.optimal_temp),
            ("optimal_humidity", req.optimal_humidity),
        ] {
            if !range.is_well_formed() {
                return Err(self.invalid(&format!("{name} must satisfy min <= max")));
            }
        }
        for (name, value) in [
            ("drought_tolerance", req.drought_tolerance),
            ("heat_tolerance", req.heat_tolerance),
            ("flowering.chance", growth.flowering.chance),
            ("flowering.min_maturity", growth.flowering.min_maturity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(self.invalid(&format!("{name} must be within [0, 1]")));
            }
        }
        if growth.flowering.min_delay > growth.flowering.max_delay {
            return Err(self.invalid("flowering.min_delay must not exceed max_delay"));
        }

        let props = &self.stem.properties;
        if !(props.growth_rate >= 0.0) {
            return Err(self.invalid("stem growth_rate must not be negative"));
        }
        if !(props.branch_spacing >= 0.0) {
            return Err(self.invalid("stem branch_spacing must not be negative"));
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> DefinitionError {
        DefinitionError::Invalid {
            species: self.species.clone(),
            reason: reason.to_string(),
        }
    }

    /// Name to show in logs, falling back to the species.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.common_name.is_empty() {
            &self.species
        } else {
            &self.common_name
        }
    }
}

/// Builder for plant definitions.
#[derive(Debug)]
pub struct PlantDefinitionBuilder {
    def: PlantDefinition,
}

impl PlantDefinitionBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(species: &str) -> Self {
        Self {
            def: PlantDefinition {
                species: species.to_string(),
                common_name: String::new(),
                plant_type: PlantType::default(),
                growth_characteristics: GrowthCharacteristics::default(),
                environmental_requirements: GrowthRequirements::default(),
                stem: StemDefinition::default(),
            },
        }
    }

    /// Set the common name.
    #[must_use]
    pub fn common_name(mut self, name: &str) -> Self {
        self.def.common_name = name.to_string();
        self
    }

    /// Set the growth form.
    #[must_use]
    pub fn plant_type(mut self, plant_type: PlantType) -> Self {
        self.def.plant_type = plant_type;
        self
    }

    /// Set height, growth rate and lifespan.
    #[must_use]
    pub fn growth(mut self, max_height: f32, growth_rate: f32, lifespan: u64) -> Self {
        self.def.growth_characteristics.max_height = max_height;
        self.def.growth_characteristics.growth_rate = growth_rate;
        self.def.growth_characteristics.lifespan = lifespan;
        self
    }

    /// Set flowering behaviour.
    #[must_use]
    pub fn flowering(mut self, flowering: FloweringCharacteristics) -> Self {
        self.def.growth_characteristics.flowering = flowering;
        self
    }

    /// Set the optimal water range.
    #[must_use]
    pub fn water(mut self, min: f32, max: f32) -> Self {
        self.def.environmental_requirements.optimal_water = OptimalRange::new(min, max);
        self
    }

    /// Set the optimal light range.
    #[must_use]
    pub fn light(mut self, min: f32, max: f32) -> Self {
        self.def.environmental_requirements.optimal_light = OptimalRange::new(min, max);
        self
    }

    /// Set the optimal temperature range.
    #[must_use]
    pub fn temperature(mut self, min: f32, max: f32) -> Self {
        self.def.environmental_requirements.optimal_temp = OptimalRange::new(min, max);
        self
    }

    /// Set the optimal humidity range.
    #[must_use]
    pub fn humidity(mut self, min: f32, max: f32) -> Self {
        self.def.environmental_requirements.optimal_humidity = OptimalRange::new(min, max);
        self
    }

    /// Set drought and heat tolerance.
    #[must_use]
    pub fn tolerances(mut self, drought: f32, heat: f32) -> Self {
        self.def.environmental_requirements.drought_tolerance = drought;
        self.def.environmental_requirements.heat_tolerance = heat;
        self
    }

    /// Set stem properties.
    #[must_use]
    pub fn stem(mut self, properties: StemProperties) -> Self {
        self.def.stem.properties = properties;
        self
    }

    /// Set stem appearance.
    #[must_use]
    pub fn appearance(mut self, appearance: StemAppearance) -> Self {
        self.def.stem.appearance = appearance;
        self
    }

    /// Build the plant definition.
    #[must_use]
    pub fn build(self) -> PlantDefinition {
        self.def
    }
}

/// Registered species, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<String, Arc<PlantDefinition>>,
}

impl DefinitionRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in species.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Register the built-in species, skipping any already present.
    pub fn register_defaults(&mut self) {
        for definition in default_definitions() {
            if self.contains(&definition.species) {
                continue;
            }
            let species = definition.species.clone();
            if let Err(e) = self.register(definition) {
                warn!("Built-in species {species} rejected: {e}");
            }
        }
    }

    /// Validate and register a definition.
    pub fn register(&mut self, definition: PlantDefinition) -> Result<(), DefinitionError> {
        definition.validate()?;
        if self.definitions.contains_key(&definition.species) {
            return Err(DefinitionError::Duplicate(definition.species));
        }
        self.definitions
            .insert(definition.species.clone(), Arc::new(definition));
        Ok(())
    }

    /// Get a definition by species.
    #[must_use]
    pub fn get(&self, species: &str) -> Option<Arc<PlantDefinition>> {
        self.definitions.get(species).cloned()
    }

    /// Check if a species is registered.
    #[must_use]
    pub fn contains(&self, species: &str) -> bool {
        self.definitions.contains_key(species)
    }

    /// Iterate over definitions in species order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PlantDefinition>> {
        self.definitions.values()
    }

    /// Registered species names in order.
    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Number of registered species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Pick a species uniformly at random.
    pub fn choose(&self, rng: &mut SimRng) -> Option<Arc<PlantDefinition>> {
        let index = rng.index(self.definitions.len())?;
        self.definitions.values().nth(index).cloned()
    }
}

fn default_definitions() -> Vec<PlantDefinition> {
    vec![
        PlantDefinition::builder("helianthus_annuus")
            .common_name("Sunflower")
            .plant_type(PlantType::Flower)
            .growth(350.0, 1.2, 4000)
            .water(40.0, 80.0)
            .light(60.0, 100.0)
            .tolerances(0.4, 0.5)
            .stem(StemProperties {
                thickness: 6.0,
                flexibility: 0.2,
                branching_angle: 0.5,
                branching_variance: 0.1,
                max_branches: 4,
                growth_rate: 1.0,
                branch_spacing: 0.25,
            })
            .flowering(FloweringCharacteristics {
                min_maturity: 0.8,
                chance: 0.7,
                min_delay: 50,
                max_delay: 150,
                bloom_duration: 600,
            })
            .build(),
        PlantDefinition::builder("rosa_rubiginosa")
            .common_name("Sweet Briar")
            .plant_type(PlantType::Shrub)
            .growth(220.0, 0.9, 6000)
            .water(35.0, 75.0)
            .light(50.0, 90.0)
            .tolerances(0.5, 0.3)
            .stem(StemProperties {
                thickness: 3.0,
                flexibility: 0.4,
                branching_angle: 0.7,
                branching_variance: 0.2,
                max_branches: 8,
                growth_rate: 1.1,
                branch_spacing: 0.15,
            })
            .appearance(StemAppearance {
                color: [74, 92, 38],
                texture: StemTexture::Thorny,
                node_visibility: 0.4,
                thorn_frequency: 0.3,
            })
            .build(),
        PlantDefinition::builder("mentha_spicata")
            .common_name("Spearmint")
            .plant_type(PlantType::Herb)
            .growth(120.0, 1.5, 3000)
            .water(50.0, 90.0)
            .light(40.0, 80.0)
            .humidity(50.0, 90.0)
            .tolerances(0.1, 0.2)
            .stem(StemProperties {
                thickness: 2.0,
                flexibility: 0.6,
                branching_angle: 0.8,
                branching_variance: 0.25,
                max_branches: 6,
                growth_rate: 1.3,
                branch_spacing: 0.2,
            })
            .flowering(FloweringCharacteristics {
                min_maturity: 0.6,
                chance: 0.5,
                min_delay: 100,
                max_delay: 300,
                bloom_duration: 300,
            })
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNFLOWER_JSON: &str = r#"{
        "species": "helianthus_annuus",
        "common_name": "Sunflower",
        "type": "flower",
        "growth_characteristics": {
            "max_height": 350.0,
            "growth_rate": 1.2,
            "lifespan": 4000
        },
        "environmental_requirements": {
            "optimal_water": [40.0, 80.0],
            "optimal_light": [60.0, 100.0],
            "optimal_temp": [18.0, 30.0],
            "optimal_humidity": [40.0, 70.0],
            "drought_tolerance": 0.4,
            "heat_tolerance": 0.5
        },
        "stem": {
            "properties": {
                "thickness": 6.0,
                "flexibility": 0.2,
                "branching_angle": 0.5,
                "branching_variance": 0.1,
                "max_branches": 4,
                "growth_rate": 1.0,
                "branch_spacing": 0.25
            },
            "appearance": {
                "color": [60, 120, 40],
                "texture": "smooth",
                "node_visibility": 0.3
            }
        },
        "leaves": { "shape": "heart" },
        "flower": { "petal_count": 21 }
    }"#;

    #[test]
    fn test_parse_json() {
        let def = PlantDefinition::from_json_str(SUNFLOWER_JSON).expect("valid");
        assert_eq!(def.species, "helianthus_annuus");
        assert_eq!(def.plant_type, PlantType::Flower);
        assert_eq!(def.growth_characteristics.lifespan, 4000);
        assert_eq!(def.environmental_requirements.optimal_water, OptimalRange::new(40.0, 80.0));
        assert_eq!(def.stem.properties.max_branches, 4);
        assert_eq!(def.stem.appearance.texture, StemTexture::Smooth);
        assert_eq!(def.stem.appearance.thorn_frequency, 0.0);
        assert_eq!(def.growth_characteristics.flowering, FloweringCharacteristics::default());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let json = SUNFLOWER_JSON.replace("\"type\": \"flower\"", "\"type\": \"cactus\"");
        assert!(matches!(
            PlantDefinition::from_json_str(&json),
            Err(DefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let json = r#"{ "species": "bare" }"#;
        assert!(matches!(
            PlantDefinition::from_json_str(json),
            Err(DefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let def = PlantDefinition::builder("backwards").water(80.0, 40.0).build();
        assert!(matches!(def.validate(), Err(DefinitionError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let def = PlantDefinition::builder("brittle").tolerances(1.5, 0.0).build();
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_delays() {
        let def = PlantDefinition::builder("late")
            .flowering(FloweringCharacteristics {
                min_delay: 500,
                max_delay: 100,
                ..FloweringCharacteristics::default()
            })
            .build();
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_species() {
        assert!(PlantDefinition::builder("  ").build().validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_type_key() {
        let def = PlantDefinition::builder("fern").plant_type(PlantType::GroundCover).build();
        let json = def.to_json_string().expect("serialize");
        assert!(json.contains("\"type\": \"ground_cover\""));
        let back = PlantDefinition::from_json_str(&json).expect("parse");
        assert_eq!(back, def);
    }

    #[test]
    fn test_registry_duplicate() {
        let mut registry = DefinitionRegistry::new();
        registry
            .register(PlantDefinition::builder("fern").build())
            .expect("first");
        let result = registry.register(PlantDefinition::builder("fern").build());
        assert!(matches!(result, Err(DefinitionError::Duplicate(ref s)) if s == "fern"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_defaults_validate() {
        let registry = DefinitionRegistry::with_defaults();
        assert_eq!(registry.len(), default_definitions().len());
        for def in registry.iter() {
            assert!(def.validate().is_ok(), "{} failed validation", def.species);
        }
    }

    #[test]
    fn test_register_defaults_keeps_loaded_species() {
        let mut registry = DefinitionRegistry::new();
        registry
            .register(
                PlantDefinition::builder("helianthus_annuus")
                    .common_name("Dwarf Sunflower")
                    .build(),
            )
            .expect("valid");
        registry.register_defaults();

        assert_eq!(registry.len(), default_definitions().len());
        let kept = registry.get("helianthus_annuus").expect("present");
        assert_eq!(kept.common_name, "Dwarf Sunflower");
    }

    #[test]
    fn test_registry_choose() {
        let registry = DefinitionRegistry::with_defaults();
        let mut rng = SimRng::new(11);
        for _ in 0..20 {
            let def = registry.choose(&mut rng).expect("non-empty");
            assert!(registry.contains(&def.species));
        }
        assert!(DefinitionRegistry::new().choose(&mut rng).is_none());
    }

    #[test]
    fn test_display_name_fallback() {
        let def = PlantDefinition::builder("fern").build();
        assert_eq!(def.display_name(), "fern");
        let def = PlantDefinition::builder("fern").common_name("Fern").build();
        assert_eq!(def.display_name(), "Fern");
    }
}
