use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::game::error::GameError;

pub const WORLD_CONFIG_PATH: &str = "assets/world_config.ron";

/// World generation parameters, loaded once at startup.
///
/// Sizes are in map tiles; the rendered map is `map_width * scale` by
/// `map_height * scale` pixels.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    // Map layout
    pub map_width: u32,
    pub map_height: u32,
    pub scale: u32,
    pub settlement_count: usize,
    pub kingdom_count: usize,

    // Placement
    pub habitable_threshold: f64,
    pub settlement_names: Vec<String>,
    pub name_prefixes: Vec<String>,

    // Connectivity repair
    pub detour_ratio: f32,

    // Clustering
    pub clustering_max_iterations: usize,

    // Generation driver
    pub max_generation_attempts: u32,
    /// Fixed seed for reproducible maps; a fresh OS seed when absent.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_width: 30,
            map_height: 20,
            scale: 30,
            settlement_count: 20,
            kingdom_count: 4,
            habitable_threshold: 0.6,
            settlement_names: default_names(),
            name_prefixes: vec!["Castle".into(), "Fort".into(), "Keep".into()],
            detour_ratio: 1.3,
            clustering_max_iterations: 100,
            max_generation_attempts: 5,
            seed: None,
        }
    }
}

fn default_names() -> Vec<String> {
    [
        "Ashford", "Blackmoor", "Brightwater", "Coldhaven", "Dunmere", "Eastwatch",
        "Fairhollow", "Greystone", "Highmarch", "Ironvale", "Kingsbridge", "Longmeadow",
        "Northreach", "Oakheart", "Ravenhill", "Redcliff", "Stonegate", "Thornbury",
        "Westfall", "Wolfden",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl WorldConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, GameError> {
        let config: WorldConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Reject values generation cannot work with.
    ///
    /// Map sizes below the generator's minimum are not an error here; they
    /// are clamped when a map is generated.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.scale == 0 {
            return Err(GameError::InvalidArgument("scale must be positive".into()));
        }
        if self.settlement_count == 0 {
            return Err(GameError::InvalidArgument(
                "settlement_count must be positive".into(),
            ));
        }
        if self.kingdom_count == 1 {
            return Err(GameError::InvalidArgument(
                "kingdom_count must be 0 (no kingdoms) or at least 2".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.habitable_threshold) {
            return Err(GameError::InvalidArgument(format!(
                "habitable_threshold {} is outside 0..=1",
                self.habitable_threshold
            )));
        }
        if self.detour_ratio.is_nan() || self.detour_ratio < 1.0 {
            return Err(GameError::InvalidArgument(format!(
                "detour_ratio must be at least 1, got {}",
                self.detour_ratio
            )));
        }
        if self.max_generation_attempts == 0 {
            return Err(GameError::InvalidArgument(
                "max_generation_attempts must be positive".into(),
            ));
        }
        Ok(())
    }
}

pub struct WorldConfigPlugin;

impl Plugin for WorldConfigPlugin {
    fn build(&self, app: &mut App) {
        // A config inserted before the plugin (tests, tools) wins over the file.
        if app.world().contains_resource::<WorldConfig>() {
            return;
        }
        app.insert_resource(load_world_config(WORLD_CONFIG_PATH));
    }
}

/// Load the world config synchronously, falling back to defaults.
fn load_world_config(path: &str) -> WorldConfig {
    match WorldConfig::load(path) {
        Ok(config) => {
            info!("Loaded world config from {}", path);
            config
        }
        Err(e) => {
            error!("Failed to load {}: {}", path, e);
            error!("Using default WorldConfig");
            WorldConfig::default()
        }
    }
}
