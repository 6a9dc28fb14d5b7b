use bevy::prelude::*;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::game::error::GameError;
use crate::game::graph::{Edge, Graph, NodeId};
use crate::game::kingdoms::Kingdom;
use crate::game::math::Located;
use crate::game::search::{ShortestPaths, TravelDistance};

pub const MAP_VERSION: u32 = 1;

/// A placed settlement: the payload of every map graph node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settlement {
    pub name: String,
    /// Position in map pixels.
    pub position: Vec2,
    /// Index into [`GameMap::kingdoms`], `None` on maps without kingdoms.
    pub kingdom: Option<usize>,
}

impl Settlement {
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            kingdom: None,
        }
    }
}

impl Located for Settlement {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// A generated map: settlements, their roads and the kingdoms they belong to.
///
/// The road graph is complete once the map exists; game code only relabels
/// settlements, never topology.
#[derive(Resource, Serialize, Deserialize, Clone, Debug)]
pub struct GameMap {
    width: u32,
    height: u32,
    scale: u32,
    graph: Graph<Settlement>,
    kingdoms: Vec<Kingdom>,
}

impl GameMap {
    pub(crate) fn new(
        width: u32,
        height: u32,
        scale: u32,
        graph: Graph<Settlement>,
        kingdoms: Vec<Kingdom>,
    ) -> Self {
        Self {
            width,
            height,
            scale,
            graph,
            kingdoms,
        }
    }

    /// Width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Size in pixels.
    pub fn pixel_size(&self) -> UVec2 {
        UVec2::new(self.width * self.scale, self.height * self.scale)
    }

    pub fn graph(&self) -> &Graph<Settlement> {
        &self.graph
    }

    pub fn kingdoms(&self) -> &[Kingdom] {
        &self.kingdoms
    }

    pub fn settlements(&self) -> Vec<&Settlement> {
        self.graph.values()
    }

    pub fn settlement(&self, node: NodeId) -> Option<&Settlement> {
        self.graph.value(node)
    }

    pub fn settlement_mut(&mut self, node: NodeId) -> Option<&mut Settlement> {
        self.graph.value_mut(node)
    }

    pub fn roads(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn find_settlement(&self, name: &str) -> Option<NodeId> {
        self.graph
            .nodes()
            .iter()
            .find(|n| n.value().name == name)
            .map(|n| n.id())
    }

    pub fn kingdom_of(&self, node: NodeId) -> Option<&Kingdom> {
        let index = self.settlement(node)?.kingdom?;
        self.kingdoms.get(index)
    }

    /// Settlements of one kingdom, in node order.
    pub fn kingdom_members(&self, kingdom: usize) -> Vec<NodeId> {
        self.graph
            .node_ids()
            .filter(|&id| self.graph.value(id).and_then(|s| s.kingdom) == Some(kingdom))
            .collect()
    }

    /// Connected pieces of a kingdom's land.
    pub fn kingdom_territories(&self, kingdom: usize) -> Vec<Vec<NodeId>> {
        self.graph.territories(|s| s.kingdom == Some(kingdom))
    }

    /// Shortest travel distances from `from` to every settlement.
    pub fn travel_paths(&self, from: NodeId) -> Result<ShortestPaths<'_, Settlement>, GameError> {
        ShortestPaths::run(&self.graph, from, &TravelDistance)
    }

    /// Shortest road route by travel distance, `from` side first.
    pub fn route(&self, from: NodeId, to: NodeId) -> Result<Option<Vec<Edge>>, GameError> {
        if !self.graph.contains(to) {
            return Err(GameError::NotFound(format!("route target {:?}", to)));
        }
        Ok(self.travel_paths(from)?.path_to(to))
    }

    /// Check that the road graph is sound and that kingdoms and settlement
    /// labels only refer to things that exist.
    pub fn validate(&self) -> Result<(), GameError> {
        self.graph.validate()?;

        let node_count = self.graph.node_count();
        for (index, kingdom) in self.kingdoms.iter().enumerate() {
            if kingdom.center() >= node_count || !kingdom.contains(kingdom.center()) {
                return Err(GameError::InvalidArgument(format!(
                    "kingdom {} has invalid center {}",
                    index,
                    kingdom.center()
                )));
            }
            if let Some(&member) = kingdom.members().iter().find(|&&m| m >= node_count) {
                return Err(GameError::InvalidArgument(format!(
                    "kingdom {} lists unknown settlement {}",
                    index, member
                )));
            }
        }

        for settlement in self.settlements() {
            if let Some(kingdom) = settlement.kingdom.filter(|&k| k >= self.kingdoms.len()) {
                return Err(GameError::InvalidArgument(format!(
                    "settlement {} belongs to unknown kingdom {}",
                    settlement.name, kingdom
                )));
            }
        }
        Ok(())
    }
}

/// On-disk envelope of a saved map.
#[derive(Serialize, Deserialize)]
pub struct MapData {
    pub version: u32,
    pub map: GameMap,
}

pub fn save_map(path: impl AsRef<Path>, map: &GameMap) -> Result<(), GameError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    let data = MapData {
        version: MAP_VERSION,
        map: map.clone(),
    };
    bincode::serialize_into(&mut encoder, &data)?;
    encoder.finish()?;
    Ok(())
}

pub fn load_map(path: impl AsRef<Path>) -> Result<GameMap, GameError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let data: MapData = bincode::deserialize_from(&mut decoder)?;
    if data.version != MAP_VERSION {
        return Err(GameError::InvalidArgument(format!(
            "map version {} is not supported (expected {})",
            data.version, MAP_VERSION
        )));
    }
    data.map.validate()?;
    Ok(data.map)
}
