use bevy::prelude::*;
use fiefdom::game::config::WorldConfig;
use fiefdom::game::map::GameMap;
use fiefdom::game::mapgen::MapGenerationStatus;
use fiefdom::game::terrain::{TerrainSampler, Uniform};
use fiefdom::game::GamePlugin;

/// Headless app with a fixed config, so the assets file is never read.
fn world_app(config: WorldConfig, terrain: TerrainSampler) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.insert_resource(terrain);
    app.add_plugins(GamePlugin);
    app
}

#[test]
fn test_startup_generates_connected_map() {
    let config = WorldConfig {
        seed: Some(2024),
        ..default()
    };
    let mut app = world_app(config.clone(), TerrainSampler::default());
    app.update();

    let status = app.world().resource::<MapGenerationStatus>();
    assert!(matches!(status, MapGenerationStatus::Ready { attempts: 1 }));

    let map = app.world().resource::<GameMap>();
    assert!(map.graph().all_nodes_connected().unwrap());
    assert!(map.graph().node_count() <= config.settlement_count);
    assert_eq!(map.width(), config.map_width);
    assert_eq!(map.scale(), config.scale);
}

#[test]
fn test_kingdoms_partition_all_settlements() {
    let config = WorldConfig {
        seed: Some(77),
        settlement_count: 30,
        kingdom_count: 5,
        map_width: 40,
        map_height: 30,
        ..default()
    };
    let mut app = world_app(config, TerrainSampler::default());
    app.update();

    let map = app.world().resource::<GameMap>();
    let n = map.graph().node_count();
    assert!(n > 5, "only {} settlements placed", n);

    let mut owner = vec![None; n];
    for (index, kingdom) in map.kingdoms().iter().enumerate() {
        assert!(kingdom.contains(kingdom.center()));
        for &member in kingdom.members() {
            assert!(owner[member].is_none(), "settlement {} in two kingdoms", member);
            owner[member] = Some(index);
        }
    }
    assert!(owner.iter().all(Option::is_some));

    for (node, settlement) in map.graph().node_ids().zip(map.settlements()) {
        assert_eq!(settlement.kingdom, owner[node.index()]);
    }
}

#[test]
fn test_barren_terrain_reports_failure() {
    let config = WorldConfig {
        seed: Some(1),
        max_generation_attempts: 2,
        ..default()
    };
    let mut app = world_app(config, TerrainSampler::new(Uniform(0.0)));
    app.update();

    let status = app.world().resource::<MapGenerationStatus>();
    assert!(matches!(status, MapGenerationStatus::Failed { .. }));
    assert!(app.world().get_resource::<GameMap>().is_none());
}

#[test]
fn test_terrain_sampler_restricts_settlements() {
    // Only the northern half (small y) is habitable.
    let north = |_x: f32, y: f32| if y < 300.0 { 0.9 } else { 0.1 };
    let config = WorldConfig {
        seed: Some(5),
        kingdom_count: 2,
        ..default()
    };
    let mut app = world_app(config, TerrainSampler::new(north));
    app.update();

    let map = app.world().resource::<GameMap>();
    assert!(map.graph().node_count() >= 1);
    for settlement in map.settlements() {
        assert!(settlement.position.y < 300.0, "{} at {}", settlement.name, settlement.position);
    }
}
