use bevy::prelude::*;

use fiefdom::game::error::GameError;
use fiefdom::game::map::{save_map, GameMap};
use fiefdom::game::mapgen::MapGenerationStatus;
use fiefdom::game::terrain::TerrainSampler;
use fiefdom::game::GamePlugin;

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn setup_file_logging() -> Result<String, GameError> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("fiefdom_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,fiefdom=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("fiefdom") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Rolling hills: habitable ridges separated by low, wet valleys.
fn rolling_hills(x: f32, y: f32) -> f64 {
    let ridge = (x / 97.0).sin() * (y / 71.0).cos();
    let swell = ((x + y) / 153.0).sin();
    (0.55 + 0.3 * ridge + 0.15 * swell).clamp(0.0, 1.0) as f64
}

fn main() -> Result<(), GameError> {
    let log_file = setup_file_logging()?;
    println!("fiefdom - logging to {}", log_file);

    // Optional first argument: where to save the generated map.
    let save_path = std::env::args().nth(1);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TerrainSampler::new(rolling_hills))
        .add_plugins(GamePlugin);
    app.update();

    let world = app.world();
    if let Some(MapGenerationStatus::Failed { reason }) = world.get_resource::<MapGenerationStatus>() {
        return Err(GameError::GenerationFailure(reason.clone()));
    }
    let Some(map) = world.get_resource::<GameMap>() else {
        return Err(GameError::NotFound("no map was generated".to_string()));
    };

    info!(
        "Map {}x{} px: {} settlements, {} roads, {} kingdoms",
        map.pixel_size().x,
        map.pixel_size().y,
        map.graph().node_count(),
        map.roads().len(),
        map.kingdoms().len()
    );
    for (index, kingdom) in map.kingdoms().iter().enumerate() {
        let capital = map
            .graph()
            .nodes()
            .get(kingdom.center())
            .map(|n| n.value().name.as_str())
            .unwrap_or("?");
        info!(
            "  Kingdom {} (type {}): {} settlements, capital {}, {} territories",
            index,
            kingdom.kind(),
            kingdom.len(),
            capital,
            map.kingdom_territories(index).len()
        );
    }

    if let Some(path) = save_path {
        save_map(&path, map)?;
        info!("Saved map to {}", path);
    }

    Ok(())
}
