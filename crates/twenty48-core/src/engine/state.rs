use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ops;
use crate::error::{EngineError, Result};

/// Cell value: 0 for empty, otherwise a power of two >= 2.
pub type Tile = u32;
pub type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in the order used by `legal_moves` masks.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Map `0..=3` to `Up, Down, Left, Right`.
    pub fn from_index(index: u8) -> Result<Move> {
        Move::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| EngineError::InvalidInput(format!("direction index {index} out of range")))
    }

    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }

    /// True for moves that operate on columns.
    #[inline]
    pub(crate) fn is_vertical(self) -> bool {
        matches!(self, Move::Up | Move::Down)
    }

    /// True for moves that compact toward the last index of a line.
    #[inline]
    pub(crate) fn toward_end(self) -> bool {
        matches!(self, Move::Down | Move::Right)
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "arrowup" => Ok(Move::Up),
            "down" | "arrowdown" => Ok(Move::Down),
            "left" | "arrowleft" => Ok(Move::Left),
            "right" | "arrowright" => Ok(Move::Right),
            _ => Err(EngineError::InvalidInput(format!("unknown direction {s:?}"))),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

/// Row/column position on the grid, `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

/// A tile placed by `Grid::spawn_random`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub at: Coord,
    pub value: Tile,
}

/// Square N x N board stored row-major.
///
/// Every cell is 0 or a power of two >= 2. Public constructors validate this;
/// only the engine mutates cells.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Tile>>", into = "Vec<Vec<Tile>>")]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub const DEFAULT_SIZE: usize = 4;
    pub const MIN_SIZE: usize = 2;
    /// Largest representable tile. Two of these never merge.
    pub const MAX_TILE: Tile = 1 << (Tile::BITS - 1);

    /// Empty grid with side length `size`.
    ///
    /// ```
    /// use twenty48_core::engine::Grid;
    /// let g = Grid::new(4).unwrap();
    /// assert_eq!(g.count_empty(), 16);
    /// assert!(Grid::new(1).is_err());
    /// ```
    pub fn new(size: usize) -> Result<Self> {
        if size < Self::MIN_SIZE {
            return Err(EngineError::InvalidConfig(format!(
                "board size must be at least {}, got {size}",
                Self::MIN_SIZE
            )));
        }
        Ok(Grid::empty(size))
    }

    /// Unchecked constructor for sizes already validated by `GameConfig`.
    pub(crate) fn empty(size: usize) -> Self {
        debug_assert!(size >= Self::MIN_SIZE);
        Grid {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build a grid from explicit rows, validating shape and tile values.
    ///
    /// ```
    /// use twenty48_core::engine::{Coord, Grid};
    /// let g = Grid::from_rows(vec![vec![2, 0], vec![0, 4]]).unwrap();
    /// assert_eq!(g.get(Coord::new(1, 1)), 4);
    /// assert!(Grid::from_rows(vec![vec![3, 0], vec![0, 0]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self> {
        let mut grid = Grid::new(rows.len())?;
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != grid.size {
                return Err(EngineError::InvalidConfig(format!(
                    "row {r} has {} cells, expected {}",
                    row.len(),
                    grid.size
                )));
            }
            for (c, value) in row.into_iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(EngineError::InvalidConfig(format!(
                        "cell ({r}, {c}) holds {value}, not 0 or a power of two >= 2"
                    )));
                }
                grid.cells[r * grid.size + c] = value;
            }
        }
        Ok(grid)
    }

    /// Side length N.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tile at `at`, 0 for an empty cell.
    ///
    /// # Panics
    ///
    /// Panics if `at` lies outside the grid. Use [`Grid::try_get`] for
    /// coordinates that have not been checked against [`Grid::size`].
    #[inline]
    pub fn get(&self, at: Coord) -> Tile {
        self.cells[self.index(at)]
    }

    /// Tile at `at`, or `None` if `at` lies outside the grid.
    #[inline]
    pub fn try_get(&self, at: Coord) -> Option<Tile> {
        if at.row < self.size && at.col < self.size {
            Some(self.cells[at.row * self.size + at.col])
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, at: Coord, value: Tile) {
        debug_assert!(is_valid_tile(value));
        let idx = self.index(at);
        self.cells[idx] = value;
    }

    #[inline]
    fn index(&self, at: Coord) -> usize {
        assert!(
            at.row < self.size && at.col < self.size,
            "coordinate {at:?} outside {0}x{0} grid",
            self.size
        );
        at.row * self.size + at.col
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Coordinates of every empty cell in row-major order.
    pub fn empty_cells(&self) -> Vec<Coord> {
        ops::empty_cells(self)
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// True if any cell is empty or equals its right or lower neighbor.
    pub fn has_any_mergeable_neighbor(&self) -> bool {
        ops::has_any_mergeable_neighbor(self)
    }

    /// True if any cell holds exactly `target`.
    pub fn has_value(&self, target: Tile) -> bool {
        self.cells.iter().any(|&v| v == target)
    }

    /// Return the highest tile value on the board (0 when empty).
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Coordinates of tiles whose value is at least `min`.
    ///
    /// Hosts use this to flag large tiles (2048 and above) for display.
    pub fn cells_at_least(&self, min: Tile) -> Vec<Coord> {
        self.coords().filter(|&at| self.get(at) >= min).collect()
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use twenty48_core::engine::{Grid, Move};
    /// let g = Grid::from_rows(vec![vec![2, 2], vec![0, 4]]).unwrap();
    /// let shifted = g.shift(Move::Left);
    /// assert_eq!(shifted.grid.to_rows(), vec![vec![4, 0], vec![4, 0]]);
    /// assert_eq!(shifted.score, 4);
    /// ```
    #[inline]
    pub fn shift(&self, dir: Move) -> ops::Shift {
        ops::shift(self, dir)
    }

    /// True if moving in `dir` would change the board.
    pub fn can_shift(&self, dir: Move) -> bool {
        ops::can_shift(self, dir)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// Returns `None` and leaves the grid untouched when no cell is empty.
    ///
    /// ```
    /// use twenty48_core::engine::Grid;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut g = Grid::new(4).unwrap();
    /// let spawn = g.spawn_random(&mut rng).unwrap();
    /// assert!(spawn.value == 2 || spawn.value == 4);
    /// assert_eq!(g.count_empty(), 15);
    /// ```
    #[inline]
    pub fn spawn_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Spawn> {
        ops::spawn_random(self, rng)
    }

    pub(crate) fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Coord::new(row, col)))
    }

    /// Copy out line `idx`: row `idx` for horizontal moves, column `idx` for vertical ones.
    pub(crate) fn line(&self, vertical: bool, idx: usize) -> Vec<Tile> {
        (0..self.size)
            .map(|k| self.get(line_coord(vertical, idx, k)))
            .collect()
    }

    pub(crate) fn set_line(&mut self, vertical: bool, idx: usize, values: &[Tile]) {
        debug_assert_eq!(values.len(), self.size);
        for (k, &value) in values.iter().enumerate() {
            self.set(line_coord(vertical, idx, k), value);
        }
    }
}

#[inline]
pub(crate) fn line_coord(vertical: bool, idx: usize, k: usize) -> Coord {
    if vertical {
        Coord::new(k, idx)
    } else {
        Coord::new(idx, k)
    }
}

fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value <= Grid::MAX_TILE && value.is_power_of_two())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("size", &self.size)
            .field("rows", &self.to_rows())
            .finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(self.size * 8);
        writeln!(f)?;
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f, "{separator}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<Tile>>> for Grid {
    type Error = EngineError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self> {
        Grid::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<Tile>> {
    fn from(g: Grid) -> Self {
        g.to_rows()
    }
}
