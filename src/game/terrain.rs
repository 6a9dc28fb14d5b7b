use bevy::prelude::*;

/// Source of habitability values for settlement placement.
///
/// Coordinates are in map pixels (`0..width*scale`, `0..height*scale`).
/// Values are expected in `0.0..=1.0`; higher means more habitable.
pub trait Habitability {
    fn habitability(&self, x: f32, y: f32) -> f64;
}

impl<F> Habitability for F
where
    F: Fn(f32, f32) -> f64,
{
    fn habitability(&self, x: f32, y: f32) -> f64 {
        self(x, y)
    }
}

/// The same value everywhere. Mostly useful for tests and flat maps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniform(pub f64);

impl Habitability for Uniform {
    fn habitability(&self, _x: f32, _y: f32) -> f64 {
        self.0
    }
}

/// Habitability sampler used by map generation.
///
/// Without this resource the map generation plugin treats the whole map as
/// habitable.
#[derive(Resource)]
pub struct TerrainSampler(pub Box<dyn Habitability + Send + Sync>);

impl TerrainSampler {
    pub fn new<H>(sampler: H) -> Self
    where
        H: Habitability + Send + Sync + 'static,
    {
        Self(Box::new(sampler))
    }
}

impl Default for TerrainSampler {
    fn default() -> Self {
        Self::new(Uniform(1.0))
    }
}

impl Habitability for TerrainSampler {
    fn habitability(&self, x: f32, y: f32) -> f64 {
        self.0.habitability(x, y)
    }
}
