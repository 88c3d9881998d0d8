//! Grid coordinates and directions for the board.
//!
//! Tiles are addressed by integer `(x, y)` coordinates. The canonical string
//! form of a coordinate, `"x,y"`, doubles as the tile's identity when the
//! board crosses into the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Player index into `GameState::players`.
pub type PlayerId = usize;

/// Position of a tile on the board grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Column coordinate.
    pub x: i32,
    /// Row coordinate (north is +y).
    pub y: i32,
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl Coord {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent coordinate in the given direction.
    pub const fn step(&self, dir: Direction) -> Coord {
        let (dx, dy) = dir.offset();
        Coord::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to another coordinate.
    pub fn manhattan(&self, other: &Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error parsing a `"x,y"` tile key.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid tile key {0:?}, expected \"x,y\"")]
pub struct ParseCoordError(pub String);

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| ParseCoordError(s.to_string()))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| ParseCoordError(s.to_string()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| ParseCoordError(s.to_string()))?;
        Ok(Coord::new(x, y))
    }
}

/// One of the four traversal directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Grid offset `(dx, dy)` for a single step.
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// The direction pointing back the way we came.
    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => write!(f, "north"),
            Direction::East => write!(f, "east"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
        }
    }
}

/// Which of a tile's four edges can be traversed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub north: bool,
    #[serde(default)]
    pub east: bool,
    #[serde(default)]
    pub south: bool,
    #[serde(default)]
    pub west: bool,
}

impl Links {
    /// All four edges open.
    pub const fn all() -> Self {
        Self {
            north: true,
            east: true,
            south: true,
            west: true,
        }
    }

    /// Check whether the edge in a direction is open.
    pub const fn is_open(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Open or close the edge in a direction.
    pub fn set(&mut self, dir: Direction, open: bool) {
        match dir {
            Direction::North => self.north = open,
            Direction::East => self.east = open,
            Direction::South => self.south = open,
            Direction::West => self.west = open,
        }
    }

    /// Iterate over the open directions in clockwise order.
    pub fn open(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_open(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_key_roundtrip() {
        let c = Coord::new(-3, 7);
        assert_eq!(c.to_string(), "-3,7");
        assert_eq!("-3,7".parse::<Coord>(), Ok(c));
        assert_eq!(" 4 , 5 ".parse::<Coord>(), Ok(Coord::new(4, 5)));
    }

    #[test]
    fn test_coord_parse_rejects_garbage() {
        assert!("45".parse::<Coord>().is_err());
        assert!("a,1".parse::<Coord>().is_err());
        assert!("1,".parse::<Coord>().is_err());
    }

    #[test]
    fn test_step_and_opposite() {
        let origin = Coord::new(0, 0);
        assert_eq!(origin.step(Direction::North), Coord::new(0, 1));
        assert_eq!(origin.step(Direction::East), Coord::new(1, 0));
        assert_eq!(origin.step(Direction::South), Coord::new(0, -1));
        assert_eq!(origin.step(Direction::West), Coord::new(-1, 0));

        for dir in Direction::ALL {
            assert_eq!(origin.step(dir).step(dir.opposite()), origin);
        }
    }

    #[test]
    fn test_row_major_ordering() {
        let mut coords = vec![Coord::new(1, 1), Coord::new(0, 1), Coord::new(5, 0)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(5, 0), Coord::new(0, 1), Coord::new(1, 1)]
        );
    }

    #[test]
    fn test_links_open_iteration() {
        let links = Links {
            north: true,
            west: true,
            ..Default::default()
        };
        let open: Vec<_> = links.open().collect();
        assert_eq!(open, vec![Direction::North, Direction::West]);
        assert!(!links.is_open(Direction::East));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Coord::new(0, 0).manhattan(&Coord::new(-2, 3)), 5);
    }
}
