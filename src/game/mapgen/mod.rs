//! Procedural map generation.
//!
//! Pipeline: settlement placement on habitable land, connectivity repair,
//! kingdom clustering, kingdom labelling and a final connectivity check.
//! [`generate_map`] runs one attempt; retrying on
//! [`GameError::GenerationFailure`] is left to the caller
//! ([`generate_with_retries`], [`MapGenerationPlugin`]).

mod placement;
mod repair;


pub use placement::{PlacementGrid, SettlementPlacer};
pub use repair::{repair_connectivity, ConnectivityRepair, RepairStats, DEFAULT_DETOUR_RATIO};

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::config::WorldConfig;
use crate::game::error::GameError;
use crate::game::graph::{Graph, NodeId};
use crate::game::kingdoms::{Clustering, Kingdom};
use crate::game::map::{GameMap, Settlement};
use crate::game::profiling::profile;
use crate::game::terrain::{Habitability, TerrainSampler};

pub const MIN_MAP_WIDTH: u32 = 15;
pub const MIN_MAP_HEIGHT: u32 = 10;

/// Generate one map from `config`.
///
/// The map size is clamped to at least [`MIN_MAP_WIDTH`] x [`MIN_MAP_HEIGHT`]
/// tiles. Invalid parameters fail with `InvalidArgument`; a map without any
/// settlement or one that cannot be connected fails with `GenerationFailure`.
/// Fewer settlements than requested is not an error.
#[profile(label = "map generation", threshold_ms = 10)]
pub fn generate_map<H, R>(config: &WorldConfig, terrain: &H, rng: &mut R) -> Result<GameMap, GameError>
where
    H: Habitability + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;

    let width = config.map_width.max(MIN_MAP_WIDTH);
    let height = config.map_height.max(MIN_MAP_HEIGHT);
    info!(
        "[MAPGEN] Generating map: {}x{} tiles (scale {}), {} settlements, {} kingdoms",
        width, height, config.scale, config.settlement_count, config.kingdom_count
    );

    let placer = SettlementPlacer::new(config, width, height)?;
    let settlements = placer.place(terrain, rng);
    if settlements.is_empty() {
        return Err(GameError::GenerationFailure(
            "no habitable location for any settlement".to_string(),
        ));
    }
    if settlements.len() < config.settlement_count {
        info!(
            "[MAPGEN] Only {} of {} settlements fit on the map",
            settlements.len(),
            config.settlement_count
        );
    }

    let mut graph = Graph::new();
    for settlement in settlements {
        graph.add_node(settlement);
    }

    ConnectivityRepair::new(config.detour_ratio).repair(&mut graph)?;

    let kingdoms = partition_kingdoms(
        &mut graph,
        config.kingdom_count,
        config.clustering_max_iterations,
        rng,
    )?;

    if !graph.all_nodes_connected()? {
        return Err(GameError::GenerationFailure(
            "generated map is not connected".to_string(),
        ));
    }

    info!(
        "[MAPGEN] Map ready: {} settlements, {} roads, {} kingdoms",
        graph.node_count(),
        graph.edge_count(),
        kingdoms.len()
    );
    Ok(GameMap::new(width, height, config.scale, graph, kingdoms))
}

/// Split settlements into kingdoms and label each settlement with its
/// kingdom index. Skipped (no kingdoms) unless `0 < count < settlements`.
fn partition_kingdoms<R>(
    graph: &mut Graph<Settlement>,
    count: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Vec<Kingdom>, GameError>
where
    R: Rng + ?Sized,
{
    if count == 0 || count >= graph.node_count() {
        return Ok(Vec::new());
    }

    let outcome = {
        let settlements = graph.values();
        Clustering::new(&settlements, count)?
            .with_max_iterations(max_iterations)
            .run(rng)
    };

    for (index, kingdom) in outcome.kingdoms.iter().enumerate() {
        for &member in kingdom.members() {
            if let Some(settlement) = graph.value_mut(NodeId(member)) {
                settlement.kingdom = Some(index);
            }
        }
    }

    info!(
        "[CLUSTERING] {} kingdoms after {} iterations (converged: {})",
        outcome.kingdoms.len(),
        outcome.iterations,
        outcome.converged
    );
    Ok(outcome.kingdoms)
}

/// Run [`generate_map`] until it succeeds, at most
/// `config.max_generation_attempts` times. Only `GenerationFailure` is
/// retried. Returns the map and the attempt that produced it.
pub fn generate_with_retries<H, R>(
    config: &WorldConfig,
    terrain: &H,
    rng: &mut R,
) -> Result<(GameMap, u32), GameError>
where
    H: Habitability + ?Sized,
    R: Rng + ?Sized,
{
    let mut last_error = None;
    for attempt in 1..=config.max_generation_attempts {
        match generate_map(config, terrain, rng) {
            Ok(map) => return Ok((map, attempt)),
            Err(e) if e.is_retryable() => {
                warn!(
                    "[MAPGEN] Attempt {}/{} failed: {}",
                    attempt, config.max_generation_attempts, e
                );
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        GameError::GenerationFailure("no generation attempt was made".to_string())
    }))
}

/// Outcome of the startup map generation.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub enum MapGenerationStatus {
    #[default]
    Pending,
    Ready {
        attempts: u32,
    },
    Failed {
        reason: String,
    },
}

/// Generates the [`GameMap`] resource at startup from [`WorldConfig`] and an
/// optional [`TerrainSampler`].
pub struct MapGenerationPlugin;

impl Plugin for MapGenerationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapGenerationStatus>()
            .add_systems(Startup, generate_world);
    }
}

fn generate_world(
    mut commands: Commands,
    config: Res<WorldConfig>,
    terrain: Option<Res<TerrainSampler>>,
    mut status: ResMut<MapGenerationStatus>,
) {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let fallback = TerrainSampler::default();
    let terrain: &TerrainSampler = terrain.as_deref().unwrap_or(&fallback);

    let start = std::time::Instant::now();
    match generate_with_retries(&config, terrain, &mut rng) {
        Ok((map, attempts)) => {
            info!(
                "=== WORLD GENERATED in {:?} ({} attempt(s)) ===",
                start.elapsed(),
                attempts
            );
            commands.insert_resource(map);
            *status = MapGenerationStatus::Ready { attempts };
        }
        Err(e) => {
            error!("World generation failed: {}", e);
            *status = MapGenerationStatus::Failed {
                reason: e.to_string(),
            };
        }
    }
}
