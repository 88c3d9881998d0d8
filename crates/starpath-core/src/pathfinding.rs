//! Exact-distance movement on the board.
//!
//! A die roll of `n` moves a player exactly `n` steps along open links. The
//! only restriction per step is that a player may not turn straight back
//! along the link they just used; tiles may still be revisited by another
//! route. Every distinct route is reported, so two paths may end on the same
//! tile.

use crate::board::Board;
use crate::types::{Coord, Direction};

/// An ordered list of tiles, beginning at the start tile.
pub type Path = Vec<Coord>;

/// Enumerate every path of exactly `distance` steps from `start`.
///
/// `exclude_first_step_back_to` forbids the first step onto that tile, which
/// lets a player who just arrived from a tile keep heading the same way on
/// their next roll.
pub fn reachable(
    board: &Board,
    start: Coord,
    distance: u32,
    exclude_first_step_back_to: Option<Coord>,
) -> Result<Vec<Path>, PathError> {
    if !board.contains(&start) {
        return Err(PathError::UnknownTile(start));
    }

    let mut paths = Vec::new();
    let mut current = vec![start];
    walk(
        board,
        &mut current,
        None,
        distance,
        exclude_first_step_back_to,
        &mut paths,
    )?;
    Ok(paths)
}

/// Depth-first expansion of `path`. `arrived` is the direction of the last
/// step taken, whose opposite is forbidden.
fn walk(
    board: &Board,
    path: &mut Path,
    arrived: Option<Direction>,
    remaining: u32,
    exclude_first: Option<Coord>,
    out: &mut Vec<Path>,
) -> Result<(), PathError> {
    if remaining == 0 {
        out.push(path.clone());
        return Ok(());
    }

    let here = match path.last() {
        Some(c) => *c,
        None => return Ok(()),
    };
    let tile = board.get(&here).ok_or(PathError::UnknownTile(here))?;
    let first_step = path.len() == 1;

    for dir in tile.links.open() {
        if arrived.is_some_and(|a| dir == a.opposite()) {
            continue;
        }
        let next = here.step(dir);
        if !board.contains(&next) {
            return Err(PathError::DanglingLink {
                from: here,
                direction: dir,
            });
        }
        if first_step && exclude_first == Some(next) {
            continue;
        }

        path.push(next);
        let result = walk(board, path, Some(dir), remaining - 1, None, out);
        path.pop();
        result?;
    }

    Ok(())
}

/// One-step pseudo-paths from `exclude` to every other tile on the board.
///
/// Used by free-movement items; ignores links and distance entirely.
pub fn all_other_tiles(board: &Board, exclude: Coord) -> Vec<Path> {
    board
        .tiles()
        .filter(|t| t.coord != exclude)
        .map(|t| vec![exclude, t.coord])
        .collect()
}

/// Sorted, deduplicated end tiles of a set of paths.
pub fn destinations(paths: &[Path]) -> Vec<Coord> {
    let mut ends: Vec<Coord> = paths.iter().filter_map(|p| p.last().copied()).collect();
    ends.sort();
    ends.dedup();
    ends
}

/// Check that a path is walkable: consecutive tiles are joined by open links
/// and no step reverses the previous one.
pub fn is_valid_path(board: &Board, path: &[Coord]) -> bool {
    let mut previous: Option<Direction> = None;
    for window in path.windows(2) {
        let (from, to) = (window[0], window[1]);
        let Some(tile) = board.get(&from) else {
            return false;
        };
        let Some(dir) = tile.links.open().find(|d| from.step(*d) == to) else {
            return false;
        };
        if previous.is_some_and(|p| p.opposite() == dir) {
            return false;
        }
        previous = Some(dir);
    }
    path.last().map_or(true, |c| board.contains(c))
}

/// Errors from movement queries. Both indicate a corrupted board or a caller
/// bug rather than a normal game outcome.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("No tile at {0}")]
    UnknownTile(Coord),
    #[error("Tile {from} links {direction} to a tile that does not exist")]
    DanglingLink { from: Coord, direction: Direction },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardLayout, TileKind};
    use crate::types::Links;

    fn scenario_board() -> Board {
        let mut layout = BoardLayout::default();
        layout
            .push(
                Coord::new(0, 0),
                Links {
                    north: true,
                    east: true,
                    ..Default::default()
                },
                TileKind::Normal,
            )
            .push(
                Coord::new(1, 0),
                Links {
                    west: true,
                    ..Default::default()
                },
                TileKind::Normal,
            )
            .push(
                Coord::new(0, 1),
                Links {
                    south: true,
                    ..Default::default()
                },
                TileKind::Normal,
            );
        Board::build(&layout).unwrap()
    }

    #[test]
    fn test_zero_distance_is_trivial_path() {
        let board = scenario_board();
        let start = Coord::new(0, 0);
        assert_eq!(reachable(&board, start, 0, None), Ok(vec![vec![start]]));
    }

    #[test]
    fn test_two_branches_one_step() {
        let board = scenario_board();
        let mut paths = reachable(&board, Coord::new(0, 0), 1, None).unwrap();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                vec![Coord::new(0, 0), Coord::new(1, 0)],
                vec![Coord::new(0, 0), Coord::new(0, 1)],
            ]
        );
    }

    #[test]
    fn test_dead_ends_prune_long_rolls() {
        let board = scenario_board();
        // Each branch dead-ends after one step since reversing is forbidden
        assert!(reachable(&board, Coord::new(0, 0), 2, None)
            .unwrap()
            .is_empty());
        assert!(reachable(&board, Coord::new(0, 0), 6, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_disconnected_start() {
        let mut layout = BoardLayout::default();
        layout.push(Coord::new(0, 0), Links::default(), TileKind::Normal);
        let board = Board::build(&layout).unwrap();
        assert!(reachable(&board, Coord::new(0, 0), 3, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_start_rejected() {
        let board = scenario_board();
        assert_eq!(
            reachable(&board, Coord::new(7, 7), 1, None),
            Err(PathError::UnknownTile(Coord::new(7, 7)))
        );
    }

    #[test]
    fn test_loop_offers_both_ways_round() {
        let board = Board::build(&BoardLayout::loop_track(4, 4)).unwrap();
        let paths = reachable(&board, Coord::new(0, 0), 3, None).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            destinations(&paths),
            vec![Coord::new(3, 0), Coord::new(0, 3)]
        );
    }

    #[test]
    fn test_exclude_first_step() {
        let board = Board::build(&BoardLayout::loop_track(4, 4)).unwrap();
        let paths = reachable(&board, Coord::new(0, 0), 3, Some(Coord::new(0, 1))).unwrap();
        assert_eq!(
            paths,
            vec![vec![
                Coord::new(0, 0),
                Coord::new(1, 0),
                Coord::new(2, 0),
                Coord::new(3, 0),
            ]]
        );
    }

    #[test]
    fn test_grid_allows_revisits_but_not_reversal() {
        let board = Board::build(&BoardLayout::open_grid(2, 2)).unwrap();
        let start = Coord::new(0, 0);
        let paths = reachable(&board, start, 4, None).unwrap();
        // Going round the 2x2 square either way returns to the start
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert_eq!(path.len(), 5);
            assert_eq!(path.last(), Some(&start));
            assert!(is_valid_path(&board, path));
        }
    }

    #[test]
    fn test_paths_have_exact_length_and_respect_links() {
        let board = Board::build(&BoardLayout::open_grid(4, 3)).unwrap();
        for distance in 0..6 {
            let paths = reachable(&board, Coord::new(1, 1), distance, None).unwrap();
            assert!(!paths.is_empty());
            for path in &paths {
                assert_eq!(path.len(), distance as usize + 1);
                assert!(is_valid_path(&board, path));
            }
        }
    }

    #[test]
    fn test_same_destination_via_different_routes() {
        let board = Board::build(&BoardLayout::open_grid(2, 2)).unwrap();
        let paths = reachable(&board, Coord::new(0, 0), 2, None).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(destinations(&paths), vec![Coord::new(1, 1)]);
    }

    #[test]
    fn test_dangling_link_is_an_error() {
        // Bypass Board::build validation by corrupting a built board
        let mut board = scenario_board();
        board.get_mut(&Coord::new(1, 0)).unwrap().links.east = true;
        assert_eq!(
            reachable(&board, Coord::new(0, 0), 2, None),
            Err(PathError::DanglingLink {
                from: Coord::new(1, 0),
                direction: Direction::East,
            })
        );
    }

    #[test]
    fn test_all_other_tiles() {
        let board = scenario_board();
        let start = Coord::new(0, 0);
        let paths = all_other_tiles(&board, start);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 2 && p[0] == start));
        assert!(!destinations(&paths).contains(&start));
    }

    #[test]
    fn test_is_valid_path_rejects_reversal_and_gaps() {
        let board = Board::build(&BoardLayout::open_grid(3, 1)).unwrap();
        let a = Coord::new(0, 0);
        let b = Coord::new(1, 0);
        let c = Coord::new(2, 0);
        assert!(is_valid_path(&board, &[a, b, c]));
        assert!(!is_valid_path(&board, &[a, b, a]));
        assert!(!is_valid_path(&board, &[a, c]));
    }
}
