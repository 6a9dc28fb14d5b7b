use bevy::prelude::*;
use rand::Rng;

use crate::game::config::WorldConfig;
use crate::game::error::GameError;
use crate::game::map::Settlement;
use crate::game::terrain::Habitability;

/// Tile grid used to spread settlements over the map.
///
/// The map is cut into `tiles_x * tiles_y` fields of `tile_w * tile_h`
/// pixels; each field holds at most one settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementGrid {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub tile_w: u32,
    pub tile_h: u32,
}

impl PlacementGrid {
    /// Size the grid for `count` settlements on a `width * height` tile map.
    ///
    /// The grid gets about `ceil(sqrt(count))` fields per side, split between
    /// the axes by aspect ratio, plus a margin of five fields per axis.
    pub fn new(width: u32, height: u32, scale: u32, count: usize) -> Result<Self, GameError> {
        let square = (count as f64).sqrt().ceil();
        let length = (width + height) as f64;

        let tiles_x = (((width as f64 / length) + 0.5) * square).max(1.0) as u32 + 5;
        let tiles_y = (((height as f64 / length) + 0.5) * square).max(1.0) as u32 + 5;

        if (tiles_x as usize) * (tiles_y as usize) < count {
            return Err(GameError::InvalidArgument(format!(
                "placement grid {}x{} has fewer fields than {} settlements",
                tiles_x, tiles_y, count
            )));
        }

        let tile_w = width * scale / tiles_x;
        let tile_h = height * scale / tiles_y;
        if tile_w == 0 || tile_h == 0 {
            return Err(GameError::InvalidArgument(format!(
                "map of {}x{} pixels is too small for {} settlements",
                width * scale,
                height * scale,
                count
            )));
        }

        Ok(Self {
            tiles_x,
            tiles_y,
            tile_w,
            tile_h,
        })
    }

    /// Fields eligible for a settlement. The last row and column are left
    /// out so sampling never runs past the map edge.
    pub fn fields(&self) -> Vec<UVec2> {
        let mut fields = Vec::with_capacity((self.tiles_x * self.tiles_y) as usize);
        for x in 0..self.tiles_x.saturating_sub(1) {
            for y in 0..self.tiles_y.saturating_sub(1) {
                fields.push(UVec2::new(x, y));
            }
        }
        fields
    }

    /// Minimum distance between two settlements.
    pub fn spacing(&self) -> f32 {
        self.tile_w.max(self.tile_h) as f32
    }
}

/// Places settlements on habitable land, one per grid field.
pub struct SettlementPlacer<'a> {
    grid: PlacementGrid,
    count: usize,
    threshold: f64,
    names: &'a [String],
    prefixes: &'a [String],
}

impl<'a> SettlementPlacer<'a> {
    /// `width` and `height` are the already clamped map size in tiles.
    pub fn new(config: &'a WorldConfig, width: u32, height: u32) -> Result<Self, GameError> {
        let grid = PlacementGrid::new(width, height, config.scale, config.settlement_count)?;
        Ok(Self {
            grid,
            count: config.settlement_count,
            threshold: config.habitable_threshold,
            names: &config.settlement_names,
            prefixes: &config.name_prefixes,
        })
    }

    pub fn grid(&self) -> &PlacementGrid {
        &self.grid
    }

    /// Place up to `count` settlements.
    ///
    /// Fields are visited in random order. Within a field the offset is
    /// scanned from the field's half size down to zero and the first habitable
    /// spot far enough from every other settlement is taken. Fields without
    /// such a spot are skipped, so fewer settlements than requested may come
    /// back.
    pub fn place<H, R>(&self, terrain: &H, rng: &mut R) -> Vec<Settlement>
    where
        H: Habitability + ?Sized,
        R: Rng + ?Sized,
    {
        let mut fields = self.grid.fields();
        let mut names = self.name_pool(rng);
        let mut placed: Vec<Settlement> = Vec::with_capacity(self.count);

        let tile_w = self.grid.tile_w as f32;
        let tile_h = self.grid.tile_h as f32;
        let spacing = self.grid.spacing();

        while !fields.is_empty() && placed.len() < self.count {
            let field = fields.swap_remove(rng.random_range(0..fields.len()));
            let origin = Vec2::new(
                ((field.x as f32 + 0.5) * tile_w).floor(),
                ((field.y as f32 + 0.5) * tile_h).floor(),
            );

            if let Some(position) = self.find_spot(terrain, origin, &placed, spacing) {
                let name = if names.is_empty() {
                    format!("Settlement {}", placed.len() + 1)
                } else {
                    names.swap_remove(rng.random_range(0..names.len()))
                };
                placed.push(Settlement::new(name, position));
            }
        }

        debug!(
            "[MAPGEN] placed {}/{} settlements on a {}x{} grid",
            placed.len(),
            self.count,
            self.grid.tiles_x,
            self.grid.tiles_y
        );
        placed
    }

    fn find_spot<H>(
        &self,
        terrain: &H,
        origin: Vec2,
        placed: &[Settlement],
        spacing: f32,
    ) -> Option<Vec2>
    where
        H: Habitability + ?Sized,
    {
        let half_w = self.grid.tile_w / 2;
        let half_h = self.grid.tile_h / 2;
        let tile_w = self.grid.tile_w as f32;
        let tile_h = self.grid.tile_h as f32;

        for dx in (0..=half_w).rev() {
            for dy in (0..=half_h).rev() {
                let position = origin + Vec2::new(dx as f32, dy as f32);
                let sample_x = (position.x + 0.5 * tile_w).floor();
                let sample_y = (position.y + 0.5 * tile_h).floor();
                if terrain.habitability(sample_x, sample_y) < self.threshold {
                    continue;
                }
                if placed.iter().all(|s| s.position.distance(position) >= spacing) {
                    return Some(position);
                }
            }
        }
        None
    }

    /// Configured names, each with a random prefix.
    fn name_pool<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        self.names
            .iter()
            .map(|name| {
                if self.prefixes.is_empty() {
                    name.clone()
                } else {
                    let prefix = &self.prefixes[rng.random_range(0..self.prefixes.len())];
                    format!("{} {}", prefix, name)
                }
            })
            .collect()
    }
}
