//! Tile grid: map loading, tile lookup and collision queries.
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Contenido de una celda del mapa.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Hash)]
pub enum Tile {
    #[default]
    Empty,
    Wall,
    Destructible,
    Spawn,
}

impl Tile {
    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Wall),
            2 => Some(Tile::Destructible),
            3 => Some(Tile::Spawn),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Wall => 1,
            Tile::Destructible => 2,
            Tile::Spawn => 3,
        }
    }

    /// Map files use the numeric codes as characters; anything else reads as floor.
    fn from_char(ch: char) -> Tile {
        match ch {
            '1' => Tile::Wall,
            '2' => Tile::Destructible,
            '3' => Tile::Spawn,
            _ => Tile::Empty,
        }
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// Square N×N tile map, row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
    spawn: Option<(usize, usize)>,
}

impl Grid {
    /// Empty grid of `size`×`size` cells.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            tiles: vec![Tile::Empty; size * size],
            spawn: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading map file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing map file {}", path.display()))
    }

    /// Parses one line per row. The row count fixes N; short rows are padded with
    /// empty cells and extra characters are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            bail!("map is empty");
        }

        let size = lines.len();
        let mut grid = Grid::new(size);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().take(size).enumerate() {
                let tile = Tile::from_char(ch);
                if tile == Tile::Spawn && grid.spawn.is_none() {
                    grid.spawn = Some((x, y));
                }
                grid.tiles[y * size + x] = tile;
            }
        }
        Ok(grid)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let n = self.size as i32;
        if x < 0 || y < 0 || x >= n || y >= n {
            return None;
        }
        Some(y as usize * self.size + x as usize)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// `None` outside the grid.
    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    /// Returns false (and leaves the grid untouched) when out of bounds.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Out-of-bounds cells block, as do walls. Destructibles and spawn markers don't.
    #[inline]
    pub fn is_blocking(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_none_or(Tile::is_solid)
    }

    /// Collision test for a continuous position against its containing cell.
    #[inline]
    pub fn is_blocking_at(&self, wx: f32, wy: f32) -> bool {
        self.is_blocking(wx.floor() as i32, wy.floor() as i32)
    }

    /// First spawn marker in row-major order.
    pub fn spawn(&self) -> Option<(usize, usize)> {
        self.spawn
    }

    /// Every cell holding `tile`, row-major.
    pub fn cells_of(&self, tile: Tile) -> impl Iterator<Item = (i32, i32)> + '_ {
        let n = self.size;
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, t)| **t == tile)
            .map(move |(i, _)| ((i % n) as i32, (i / n) as i32))
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}
