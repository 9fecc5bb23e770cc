//! Static maze description and the pure text renderer.
//!
//! A map is loaded and validated once; afterwards only the collected-points
//! bitmask (owned by the game engine) changes. The order of [`Map::points`] is
//! the canonical bit index used by every bitmask on the wire.

use crate::{Direction, Player, MAX_POINTS};
use std::path::Path;
use thiserror::Error;

pub const CMAN_CHAR: char = 'C';
pub const SPIRIT_CHAR: char = 'S';
pub const POINT_CHAR: char = 'P';
pub const FREE_CHAR: char = 'F';
pub const WALL_CHAR: char = 'W';

/// Maps larger than this in either dimension cannot be addressed with one byte.
const MAX_DIMENSION: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Free,
    Point,
    Start(Player),
}

impl Cell {
    fn from_char(ch: char) -> Option<Cell> {
        match ch {
            WALL_CHAR => Some(Cell::Wall),
            FREE_CHAR => Some(Cell::Free),
            POINT_CHAR => Some(Cell::Point),
            CMAN_CHAR => Some(Cell::Start(Player::Cman)),
            SPIRIT_CHAR => Some(Cell::Start(Player::Spirit)),
            _ => None,
        }
    }

    pub fn is_passable(self) -> bool {
        self != Cell::Wall
    }
}

/// Grid coordinate; both components fit in a single wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Dynamic state drawn on top of the static map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub cman: Coord,
    pub spirit: Coord,
    pub collected: u64,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("map is empty")]
    Empty,
    #[error("invalid char {ch:?} in map at row {row}, col {col}")]
    InvalidChar { ch: char, row: usize, col: usize },
    #[error("Map needs to have a single C-Man starting point, found {0}")]
    CmanStart(usize),
    #[error("Map needs to have a single Spirit starting point, found {0}")]
    SpiritStart(usize),
    #[error("Map needs to have {expected} score points, found {found}")]
    PointCount { expected: usize, found: usize },
    #[error("map is not square: row {row} has width {width}, expected {expected}")]
    NotRectangular {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("map is too tall: {0} rows")]
    TooTall(usize),
    #[error("map is too wide: {0} columns")]
    TooWide(usize),
    #[error("map border is open")]
    OpenBorder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    width: u8,
    height: u8,
    cells: Vec<Cell>,
    cman_start: Coord,
    spirit_start: Coord,
    points: Vec<Coord>,
}

impl Map {
    /// Reads and validates a map file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Map, MapError> {
        let text = std::fs::read_to_string(path)?;
        Map::parse(&text)
    }

    /// Validates a textual map. One trailing newline is allowed.
    pub fn parse(text: &str) -> Result<Map, MapError> {
        let text = text.strip_suffix('\n').unwrap_or(text);
        if text.is_empty() {
            return Err(MapError::Empty);
        }
        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        let mut cman = 0;
        let mut spirit = 0;
        let mut points = 0;
        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                match Cell::from_char(ch) {
                    Some(Cell::Start(Player::Cman)) => cman += 1,
                    Some(Cell::Start(Player::Spirit)) => spirit += 1,
                    Some(Cell::Point) => points += 1,
                    Some(_) => {}
                    None => return Err(MapError::InvalidChar { ch, row, col }),
                }
            }
        }
        if cman != 1 {
            return Err(MapError::CmanStart(cman));
        }
        if spirit != 1 {
            return Err(MapError::SpiritStart(spirit));
        }
        if points != MAX_POINTS {
            return Err(MapError::PointCount {
                expected: MAX_POINTS,
                found: points,
            });
        }

        // All symbols are ASCII from here on, so byte length equals width.
        let expected = lines[0].len();
        if let Some((row, line)) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.len() != expected)
        {
            return Err(MapError::NotRectangular {
                row,
                width: line.len(),
                expected,
            });
        }
        if lines.len() > MAX_DIMENSION {
            return Err(MapError::TooTall(lines.len()));
        }
        if expected > MAX_DIMENSION {
            return Err(MapError::TooWide(expected));
        }

        let is_wall_row = |line: &str| line.chars().all(|ch| ch == WALL_CHAR);
        let sides_closed = lines
            .iter()
            .all(|line| line.starts_with(WALL_CHAR) && line.ends_with(WALL_CHAR));
        if !sides_closed || !is_wall_row(lines[0]) || !is_wall_row(lines[lines.len() - 1]) {
            return Err(MapError::OpenBorder);
        }

        let mut cells = Vec::with_capacity(lines.len() * expected);
        let mut point_coords = Vec::with_capacity(MAX_POINTS);
        let mut cman_start = Coord::default();
        let mut spirit_start = Coord::default();
        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let coord = Coord::new(row as u8, col as u8);
                let cell = Cell::from_char(ch).ok_or(MapError::InvalidChar { ch, row, col })?;
                match cell {
                    Cell::Point => point_coords.push(coord),
                    Cell::Start(Player::Cman) => cman_start = coord,
                    Cell::Start(Player::Spirit) => spirit_start = coord,
                    Cell::Wall | Cell::Free => {}
                }
                cells.push(cell);
            }
        }

        Ok(Map {
            width: expected as u8,
            height: lines.len() as u8,
            cells,
            cman_start,
            spirit_start,
            points: point_coords,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Returns the cell at `coord`, or `None` when it lies outside the grid.
    pub fn cell(&self, coord: Coord) -> Option<Cell> {
        if coord.row >= self.height || coord.col >= self.width {
            return None;
        }
        let index = coord.row as usize * self.width as usize + coord.col as usize;
        self.cells.get(index).copied()
    }

    pub fn start(&self, player: Player) -> Coord {
        match player {
            Player::Cman => self.cman_start,
            Player::Spirit => self.spirit_start,
        }
    }

    /// Point coordinates in row-major scan order; index `i` is bit `i` of a collected mask.
    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn point_index(&self, coord: Coord) -> Option<usize> {
        self.points.iter().position(|point| *point == coord)
    }

    /// Mask with every point bit set.
    pub fn all_points_mask(&self) -> u64 {
        (1u64 << self.points.len()) - 1
    }

    /// The neighbouring coordinate in `direction`, if it is inside the grid.
    pub fn step(&self, from: Coord, direction: Direction) -> Option<Coord> {
        let (d_row, d_col) = direction.delta();
        let row = from.row as i16 + d_row;
        let col = from.col as i16 + d_col;
        if row < 0 || col < 0 || row >= self.height as i16 || col >= self.width as i16 {
            return None;
        }
        Some(Coord::new(row as u8, col as u8))
    }
}

/// Draws the map with the overlay applied. Does not touch the map itself.
pub fn render(map: &Map, overlay: &Overlay) -> Vec<String> {
    (0..map.height())
        .map(|row| {
            (0..map.width())
                .map(|col| {
                    let coord = Coord::new(row, col);
                    if coord == overlay.cman {
                        return CMAN_CHAR;
                    }
                    if coord == overlay.spirit {
                        return SPIRIT_CHAR;
                    }
                    match map.cell(coord) {
                        Some(Cell::Wall) => '█',
                        Some(Cell::Point) => {
                            let collected = map
                                .point_index(coord)
                                .map(|bit| overlay.collected & (1 << bit) != 0)
                                .unwrap_or(false);
                            if collected {
                                ' '
                            } else {
                                '•'
                            }
                        }
                        _ => ' ',
                    }
                })
                .collect()
        })
        .collect()
}
