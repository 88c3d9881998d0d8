//! Board structure: tiles, their links, and layout construction.

use crate::types::{Coord, Direction, Links};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What happens when a player lands on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TileKind {
    /// Pays the landing player a stipend.
    #[default]
    Normal,
    /// Charges the landing player a penalty.
    Penalty,
    /// Sells a star to the landing player, if one is on offer.
    Star { has_star: bool },
    /// Charges the landing player an event penalty.
    Event,
    /// Charges every player a penalty.
    GlobalEvent,
    /// Sends the landing player into an external minigame.
    AgilityChallenge,
}

impl TileKind {
    /// Is this a star tile (bearing a star or not)?
    pub const fn is_star(&self) -> bool {
        matches!(self, TileKind::Star { .. })
    }

    /// Is this a star tile whose star has already been taken?
    pub const fn is_spent_star(&self) -> bool {
        matches!(self, TileKind::Star { has_star: false })
    }

    /// Short display name.
    pub const fn name(&self) -> &'static str {
        match self {
            TileKind::Normal => "normal",
            TileKind::Penalty => "penalty",
            TileKind::Star { .. } => "star",
            TileKind::Event => "event",
            TileKind::GlobalEvent => "global event",
            TileKind::AgilityChallenge => "agility challenge",
        }
    }
}

/// A single tile on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the board.
    pub coord: Coord,
    /// Traversable edges.
    pub links: Links,
    /// Landing behavior.
    pub kind: TileKind,
}

impl Tile {
    /// Create a new tile.
    pub fn new(coord: Coord, links: Links, kind: TileKind) -> Self {
        Self { coord, links, kind }
    }

    /// The tile's string identity (`"x,y"`).
    pub fn key(&self) -> String {
        self.coord.to_string()
    }
}

/// Hand-authored description of one tile, as consumed by [`Board::build`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub x: i32,
    pub y: i32,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default)]
    pub kind: TileKind,
}

/// A static board topology.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub tiles: Vec<TileSpec>,
}

impl BoardLayout {
    /// Parse a layout from JSON.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        serde_json::from_str(json).map_err(|e| BoardError::Parse(e.to_string()))
    }

    /// Add a tile to the layout.
    pub fn push(&mut self, coord: Coord, links: Links, kind: TileKind) -> &mut Self {
        self.tiles.push(TileSpec {
            x: coord.x,
            y: coord.y,
            links,
            kind,
        });
        self
    }

    /// A rectangular loop around the perimeter of a `width` x `height` box,
    /// traversable in both directions.
    ///
    /// Kinds repeat along the loop starting from `(0,0)`, which is always
    /// `Normal`. Dimensions below 2 are raised to 2.
    pub fn loop_track(width: u32, height: u32) -> Self {
        const PATTERN: [TileKind; 8] = [
            TileKind::Normal,
            TileKind::Normal,
            TileKind::Penalty,
            TileKind::Normal,
            TileKind::Event,
            TileKind::Normal,
            TileKind::GlobalEvent,
            TileKind::AgilityChallenge,
        ];

        let w = width.max(2) as i32;
        let h = height.max(2) as i32;

        let mut order = Vec::new();
        for x in 0..w {
            order.push(Coord::new(x, 0));
        }
        for y in 1..h {
            order.push(Coord::new(w - 1, y));
        }
        for x in (0..w - 1).rev() {
            order.push(Coord::new(x, h - 1));
        }
        for y in (1..h - 1).rev() {
            order.push(Coord::new(0, y));
        }

        let mut links = vec![Links::default(); order.len()];
        for i in 0..order.len() {
            let j = (i + 1) % order.len();
            if let Some(dir) = direction_between(order[i], order[j]) {
                links[i].set(dir, true);
                links[j].set(dir.opposite(), true);
            }
        }

        let mut layout = BoardLayout::default();
        for (i, (coord, links)) in order.into_iter().zip(links).enumerate() {
            layout.push(coord, links, PATTERN[i % PATTERN.len()]);
        }
        layout
    }

    /// A fully connected `width` x `height` grid of `Normal` tiles.
    pub fn open_grid(width: u32, height: u32) -> Self {
        let mut layout = BoardLayout::default();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let links = Links {
                    north: y + 1 < height as i32,
                    east: x + 1 < width as i32,
                    south: y > 0,
                    west: x > 0,
                };
                layout.push(Coord::new(x, y), links, TileKind::Normal);
            }
        }
        layout
    }
}

/// Direction of a single grid step from `a` to `b`, if they are adjacent.
fn direction_between(a: Coord, b: Coord) -> Option<Direction> {
    Direction::ALL.into_iter().find(|d| a.step(*d) == b)
}

/// The board containing all tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// All tiles indexed by coordinate.
    /// Serialized as a plain list since JSON requires string keys.
    #[serde(with = "tile_list")]
    tiles: BTreeMap<Coord, Tile>,
}

/// Serialize the tile map as a sequence of tiles; each tile carries its key.
mod tile_list {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(map: &BTreeMap<Coord, Tile>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Coord, Tile>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tiles: Vec<Tile> = Deserialize::deserialize(deserializer)?;
        Ok(tiles.into_iter().map(|t| (t.coord, t)).collect())
    }
}

impl Board {
    /// Build a board from a layout, validating its topology.
    pub fn build(layout: &BoardLayout) -> Result<Self, BoardError> {
        if layout.tiles.is_empty() {
            return Err(BoardError::EmptyLayout);
        }

        let mut tiles = BTreeMap::new();
        for spec in &layout.tiles {
            let coord = Coord::new(spec.x, spec.y);
            let tile = Tile::new(coord, spec.links, spec.kind);
            if tiles.insert(coord, tile).is_some() {
                return Err(BoardError::DuplicateTile(coord));
            }
        }

        let board = Self { tiles };
        board.validate()?;
        Ok(board)
    }

    /// Check that every open link points at an existing tile.
    pub fn validate(&self) -> Result<(), BoardError> {
        for tile in self.tiles.values() {
            for dir in tile.links.open() {
                if !self.tiles.contains_key(&tile.coord.step(dir)) {
                    return Err(BoardError::DanglingLink {
                        from: tile.coord,
                        direction: dir,
                    });
                }
            }
        }
        Ok(())
    }

    /// Get a tile at the given coordinate.
    pub fn get(&self, coord: &Coord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// Get a mutable reference to a tile.
    pub fn get_mut(&mut self, coord: &Coord) -> Option<&mut Tile> {
        self.tiles.get_mut(coord)
    }

    /// Look up a tile or fail with [`BoardError::UnknownTile`].
    pub fn tile(&self, coord: &Coord) -> Result<&Tile, BoardError> {
        self.get(coord).ok_or(BoardError::UnknownTile(*coord))
    }

    /// The tile one step away through an open link, if any.
    pub fn neighbor(&self, coord: &Coord, dir: Direction) -> Option<&Tile> {
        let tile = self.get(coord)?;
        if !tile.links.is_open(dir) {
            return None;
        }
        self.get(&coord.step(dir))
    }

    /// Check if a coordinate is on the board.
    pub fn contains(&self, coord: &Coord) -> bool {
        self.tiles.contains_key(coord)
    }

    /// Count total tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// The first tile in row-major order.
    pub fn first_coord(&self) -> Option<Coord> {
        self.tiles.keys().next().copied()
    }

    /// Number of star tiles, whether or not they currently bear a star.
    pub fn star_tile_count(&self) -> usize {
        self.tiles.values().filter(|t| t.kind.is_star()).count()
    }

    /// Number of tiles of exactly the given kind.
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles.values().filter(|t| t.kind == kind).count()
    }

    /// Coordinates of all `Normal` tiles in row-major order.
    pub fn normal_tiles(&self) -> Vec<Coord> {
        self.tiles
            .values()
            .filter(|t| t.kind == TileKind::Normal)
            .map(|t| t.coord)
            .collect()
    }

    /// Change a tile's kind in place, returning the previous kind.
    pub fn reclassify(&mut self, coord: &Coord, kind: TileKind) -> Result<TileKind, BoardError> {
        let tile = self
            .tiles
            .get_mut(coord)
            .ok_or(BoardError::UnknownTile(*coord))?;
        Ok(std::mem::replace(&mut tile.kind, kind))
    }
}

/// Errors from building or querying a board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Board layout has no tiles")]
    EmptyLayout,
    #[error("Tile {0} appears more than once in the layout")]
    DuplicateTile(Coord),
    #[error("Tile {from} links {direction} to a tile that does not exist")]
    DanglingLink { from: Coord, direction: Direction },
    #[error("No tile at {0}")]
    UnknownTile(Coord),
    #[error("Invalid board layout: {0}")]
    Parse(String),
}
