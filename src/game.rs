use bevy::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod kingdoms;
pub mod map;
pub mod mapgen;
pub mod math;
pub mod profiling;
pub mod search;
pub mod terrain;

use config::{WorldConfig, WorldConfigPlugin};
use mapgen::MapGenerationPlugin;

/// Headless game core: world config plus startup map generation.
///
/// Insert a [`terrain::TerrainSampler`] before startup to control where
/// settlements may be placed; without one the whole map is habitable.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((WorldConfigPlugin, MapGenerationPlugin))
            .add_systems(Startup, log_game_setup);
    }
}

fn log_game_setup(config: Res<WorldConfig>) {
    info!(
        "Game setup started: {} settlements on {}x{} tiles",
        config.settlement_count, config.map_width, config.map_height
    );
}
