//! Partitioning of placed entities into kingdoms.
//!
//! Kingdoms refer to entities by their index in the slice handed to
//! [`Clustering`]. For the map graph that index is the settlement's node index.

mod clustering;

pub use clustering::{Clustering, ClusteringOutcome, DEFAULT_MAX_ITERATIONS};

use serde::{Deserialize, Serialize};

/// Number of distinct kingdom type tags (used for banners and colours).
pub const KINGDOM_TYPES: u8 = 6;

/// A group of entities around one center entity.
///
/// The center is always one of the members. Members are kept in entity
/// index order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kingdom {
    kind: u8,
    center: usize,
    members: Vec<usize>,
}

impl Kingdom {
    /// A kingdom holding only its center.
    pub fn new(kind: u8, center: usize) -> Self {
        Self {
            kind,
            center,
            members: vec![center],
        }
    }

    /// Type tag in `0..KINGDOM_TYPES`.
    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn center(&self) -> usize {
        self.center
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, entity: usize) -> bool {
        self.members.contains(&entity)
    }

    /// Same kind and center with no members yet.
    pub(crate) fn cleared(&self) -> Self {
        Self {
            kind: self.kind,
            center: self.center,
            members: Vec::new(),
        }
    }
}
