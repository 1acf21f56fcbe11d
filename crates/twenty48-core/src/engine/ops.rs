use log::trace;
use rand::Rng;

use super::state::{line_coord, Coord, Grid, Move, Score, Spawn, Tile};

/// Result of sliding one line toward its start or end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineShift {
    pub line: Vec<Tile>,
    pub score: Score,
    /// Indices (in the returned line) where a merged tile landed.
    pub merged: Vec<usize>,
}

/// Result of sliding the whole grid in one direction. No randomness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub grid: Grid,
    pub score: Score,
    pub changed: bool,
    pub merged: Vec<Coord>,
}

/// Slide/merge a single line.
///
/// Zeros are dropped, then adjacent equal tiles merge pairwise from the
/// leading edge. A merged tile never merges again in the same call, so
/// `[2, 2, 2, 0]` becomes `[4, 2, 0, 0]`. Two [`Grid::MAX_TILE`] tiles stay
/// apart. When `toward_end` is set the line is processed reversed and flipped
/// back.
///
/// ```
/// use twenty48_core::engine::transform_line;
/// let s = transform_line(&[0, 2, 0, 2], false);
/// assert_eq!(s.line, vec![4, 0, 0, 0]);
/// assert_eq!(s.score, 4);
/// ```
pub fn transform_line(line: &[Tile], toward_end: bool) -> LineShift {
    let len = line.len();
    let tiles: Vec<Tile> = if toward_end {
        line.iter().rev().copied().filter(|&v| v != 0).collect()
    } else {
        line.iter().copied().filter(|&v| v != 0).collect()
    };

    let mut out = Vec::with_capacity(len);
    let mut merged = Vec::new();
    let mut score: Score = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && merges(tiles[i], tiles[i + 1]) {
            let value = tiles[i] * 2;
            score += Score::from(value);
            merged.push(out.len());
            out.push(value);
            i += 2;
        } else {
            out.push(tiles[i]);
            i += 1;
        }
    }
    out.resize(len, 0);

    if toward_end {
        out.reverse();
        for idx in merged.iter_mut() {
            *idx = len - 1 - *idx;
        }
    }
    LineShift {
        line: out,
        score,
        merged,
    }
}

/// Equal tiles merge unless their sum would not fit in a `Tile`.
#[inline]
fn merges(a: Tile, b: Tile) -> bool {
    a == b && a < Grid::MAX_TILE
}

/// Slide/merge every row (Left/Right) or column (Up/Down) of `grid`.
pub fn shift(grid: &Grid, direction: Move) -> Shift {
    let vertical = direction.is_vertical();
    let toward_end = direction.toward_end();
    let mut next = grid.clone();
    let mut score = 0;
    let mut changed = false;
    let mut merged = Vec::new();

    for idx in 0..grid.size() {
        let line = grid.line(vertical, idx);
        let res = transform_line(&line, toward_end);
        if res.line != line {
            changed = true;
            next.set_line(vertical, idx, &res.line);
        }
        score += res.score;
        merged.extend(res.merged.into_iter().map(|k| line_coord(vertical, idx, k)));
    }

    Shift {
        grid: next,
        score,
        changed,
        merged,
    }
}

/// True if `direction` would move or merge at least one tile.
pub fn can_shift(grid: &Grid, direction: Move) -> bool {
    let vertical = direction.is_vertical();
    let toward_end = direction.toward_end();
    (0..grid.size()).any(|idx| {
        let line = grid.line(vertical, idx);
        transform_line(&line, toward_end).line != line
    })
}

pub fn empty_cells(grid: &Grid) -> Vec<Coord> {
    grid.coords().filter(|&at| grid.get(at) == 0).collect()
}

/// Move-availability scan: an empty cell, or a cell that merges with its right or
/// lower neighbor. Each adjacent pair is checked once.
pub fn has_any_mergeable_neighbor(grid: &Grid) -> bool {
    let n = grid.size();
    grid.coords().any(|at| {
        let v = grid.get(at);
        v == 0
            || (at.col + 1 < n && merges(v, grid.get(Coord::new(at.row, at.col + 1))))
            || (at.row + 1 < n && merges(v, grid.get(Coord::new(at.row + 1, at.col))))
    })
}

/// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
pub fn spawn_random<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Option<Spawn> {
    let empty = empty_cells(grid);
    if empty.is_empty() {
        trace!("spawn skipped: grid is full");
        return None;
    }
    let at = empty[rng.gen_range(0..empty.len())];
    let value = generate_random_tile(rng);
    grid.set(at, value);
    trace!("spawned {value} at ({}, {})", at.row, at.col);
    Some(Spawn { at, value })
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

pub(crate) fn format_val(val: Tile) -> String {
    match val {
        0 => String::from("       "),
        x => {
            let mut x = x.to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn grid(rows: &[&[Tile]]) -> Grid {
        Grid::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn it_transform_line_toward_start() {
        assert_eq!(transform_line(&[0, 0, 0, 0], false).line, vec![0, 0, 0, 0]);
        assert_eq!(transform_line(&[2, 4, 2, 4], false).line, vec![2, 4, 2, 4]);
        assert_eq!(transform_line(&[2, 2, 4, 4], false).line, vec![4, 8, 0, 0]);
        assert_eq!(transform_line(&[2, 0, 0, 2], false).line, vec![4, 0, 0, 0]);
        assert_eq!(transform_line(&[2, 2, 2, 0], false).line, vec![4, 2, 0, 0]);
        assert_eq!(transform_line(&[2, 2, 2, 2], false).line, vec![4, 4, 0, 0]);
        assert_eq!(transform_line(&[4, 2, 2, 0], false).line, vec![4, 4, 0, 0]);
    }

    #[test]
    fn it_transform_line_toward_end() {
        assert_eq!(transform_line(&[0, 0, 0, 0], true).line, vec![0, 0, 0, 0]);
        assert_eq!(transform_line(&[2, 4, 2, 4], true).line, vec![2, 4, 2, 4]);
        assert_eq!(transform_line(&[2, 2, 4, 4], true).line, vec![0, 0, 4, 8]);
        assert_eq!(transform_line(&[32, 0, 0, 32], true).line, vec![0, 0, 0, 64]);
        assert_eq!(transform_line(&[0, 4, 4, 4], true).line, vec![0, 0, 4, 8]);
    }

    #[test]
    fn transform_line_scores_and_merge_positions() {
        let s = transform_line(&[2, 2, 4, 4], false);
        assert_eq!(s.score, 12);
        assert_eq!(s.merged, vec![0, 1]);

        let s = transform_line(&[0, 2, 2, 2], true);
        assert_eq!(s.line, vec![0, 0, 2, 4]);
        assert_eq!(s.score, 4);
        assert_eq!(s.merged, vec![3]);

        let s = transform_line(&[2, 4, 8, 16], false);
        assert_eq!(s.score, 0);
        assert!(s.merged.is_empty());
    }

    #[test]
    fn transform_line_other_lengths() {
        assert_eq!(transform_line(&[2, 2], false).line, vec![4, 0]);
        assert_eq!(transform_line(&[0, 8, 8, 8, 8, 8], true).line, vec![0, 0, 0, 8, 16, 16]);
    }

    #[test]
    fn test_move_left() {
        let g = grid(&[&[2, 4, 8, 16], &[2, 8, 8, 4], &[4, 0, 0, 4], &[2, 0, 0, 4]]);
        let s = shift(&g, Move::Left);
        assert!(s.changed);
        assert_eq!(
            s.grid,
            grid(&[&[2, 4, 8, 16], &[2, 16, 4, 0], &[8, 0, 0, 0], &[2, 4, 0, 0]])
        );
        assert_eq!(s.score, 16 + 8);
        assert_eq!(s.merged, vec![Coord::new(1, 1), Coord::new(2, 0)]);
    }

    #[test]
    fn test_move_right() {
        let g = grid(&[&[2, 4, 8, 16], &[2, 8, 8, 4], &[4, 0, 0, 4], &[2, 0, 0, 4]]);
        let s = shift(&g, Move::Right);
        assert_eq!(
            s.grid,
            grid(&[&[2, 4, 8, 16], &[0, 2, 16, 4], &[0, 0, 0, 8], &[0, 0, 2, 4]])
        );
        assert_eq!(s.merged, vec![Coord::new(1, 2), Coord::new(2, 3)]);
    }

    #[test]
    fn test_move_up() {
        let g = grid(&[&[2, 2, 4, 2], &[4, 8, 0, 0], &[8, 8, 0, 0], &[16, 4, 4, 4]]);
        let s = shift(&g, Move::Up);
        assert_eq!(
            s.grid,
            grid(&[&[2, 2, 8, 2], &[4, 16, 0, 4], &[8, 4, 0, 0], &[16, 0, 0, 0]])
        );
        assert_eq!(s.score, 16 + 8);
    }

    #[test]
    fn test_move_down() {
        let g = grid(&[&[2, 2, 4, 2], &[4, 8, 0, 0], &[8, 8, 0, 0], &[16, 4, 4, 4]]);
        let s = shift(&g, Move::Down);
        assert_eq!(
            s.grid,
            grid(&[&[2, 0, 0, 0], &[4, 2, 0, 0], &[8, 16, 0, 2], &[16, 4, 8, 4]])
        );
        assert_eq!(s.merged, vec![Coord::new(2, 1), Coord::new(3, 2)]);
    }

    #[test]
    fn shift_into_wall_is_unchanged() {
        let g = grid(&[&[2, 4, 0], &[8, 0, 0], &[0, 0, 0]]);
        let s = shift(&g, Move::Left);
        assert!(!s.changed);
        assert_eq!(s.grid, g);
        assert_eq!(s.score, 0);
        assert!(!can_shift(&g, Move::Left));
        assert!(!can_shift(&g, Move::Up));
        assert!(can_shift(&g, Move::Right));
        assert!(can_shift(&g, Move::Down));
    }

    #[test]
    fn mergeable_neighbor_scan() {
        assert!(has_any_mergeable_neighbor(&grid(&[&[2, 4], &[4, 0]])));
        assert!(has_any_mergeable_neighbor(&grid(&[&[2, 2], &[4, 8]])));
        assert!(has_any_mergeable_neighbor(&grid(&[&[2, 4], &[2, 8]])));
        assert!(!has_any_mergeable_neighbor(&grid(&[&[2, 4], &[4, 2]])));
        assert!(!has_any_mergeable_neighbor(&grid(&[
            &[2, 4, 2],
            &[4, 2, 4],
            &[2, 4, 2]
        ])));
    }

    #[test]
    fn largest_tiles_do_not_overflow() {
        let top = Grid::MAX_TILE;
        let half = top / 2;

        let s = transform_line(&[half, half, 0, 0], false);
        assert_eq!(s.line, vec![top, 0, 0, 0]);
        assert_eq!(s.score, 1 << 31);
        assert_eq!(s.merged, vec![0]);

        let s = transform_line(&[top, top, 0, 0], false);
        assert_eq!(s.line, vec![top, top, 0, 0]);
        assert_eq!(s.score, 0);
        assert!(s.merged.is_empty());

        let s = transform_line(&[0, top, 0, top], true);
        assert_eq!(s.line, vec![0, 0, top, top]);
        assert_eq!(s.score, 0);

        let g = grid(&[&[top, top], &[top, top]]);
        assert!(!has_any_mergeable_neighbor(&g));
        assert!(Move::ALL.iter().all(|&dir| !can_shift(&g, dir)));
    }

    #[test]
    fn it_spawn_fills_grid() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut g = Grid::new(4).unwrap();
        for _ in 0..16 {
            let spawn = spawn_random(&mut g, &mut rng).unwrap();
            assert!(spawn.value == 2 || spawn.value == 4);
            assert_eq!(g.get(spawn.at), spawn.value);
        }
        assert_eq!(g.count_empty(), 0);
        let before = g.clone();
        assert_eq!(spawn_random(&mut g, &mut rng), None);
        assert_eq!(g, before);
    }

    #[test]
    fn spawn_targets_only_empty_cell() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut g = grid(&[&[2, 4], &[0, 8]]);
        let spawn = spawn_random(&mut g, &mut rng).unwrap();
        assert_eq!(spawn.at, Coord::new(1, 0));
    }

    #[test]
    fn spawn_value_distribution() {
        let mut rng = StdRng::seed_from_u64(2048);
        let fours = (0..10_000)
            .filter(|_| generate_random_tile(&mut rng) == 4)
            .count();
        assert!((800..1200).contains(&fours), "got {fours} fours");
    }

    #[test]
    fn format_val_pads_to_cell_width() {
        assert_eq!(format_val(0), "       ");
        assert_eq!(format_val(2), "   2   ");
        assert_eq!(format_val(2048), "  2048 ");
        assert_eq!(format_val(131072), " 131072");
    }
}
