//! Tile board: the gameplay truth the cube rolls across.
//!
//! The board is a flat `side * side` array stored row-major by z. Board-space
//! coordinates are centered: with `offset = side / 2`, valid x and z lie in
//! `[-offset, side - offset)`. Lookups outside that range return `None` so
//! callers can skip the dependent effect instead of panicking.

use serde::Deserialize;

/// Largest accepted board side. Keeps `side * side` well inside `i32`.
pub const MAX_BOARD_SIDE: i32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    #[default]
    Empty,
    Ground,
    Dark,
    Light,
}

impl TileType {
    pub const ALL: [TileType; 4] = [
        TileType::Empty,
        TileType::Ground,
        TileType::Dark,
        TileType::Light,
    ];

    /// Character used by the level file grid.
    pub fn to_char(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Ground => '#',
            Self::Dark => 'D',
            Self::Light => 'L',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Empty),
            '#' => Some(Self::Ground),
            'D' => Some(Self::Dark),
            'L' => Some(Self::Light),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Ground => "Ground",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Whether the tile is drawn at all.
    pub fn is_visible(self) -> bool {
        self != Self::Empty
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBoard {
    side: i32,
    tiles: Vec<TileType>,
}

impl TileBoard {
    /// All-empty board. `side` is clamped to `1..=MAX_BOARD_SIDE`.
    pub fn new(side: i32) -> Self {
        debug_assert!(side > 0, "board side must be positive");
        let clamped = side.clamp(1, MAX_BOARD_SIDE);
        if clamped != side {
            log::warn!("Board side {} out of range, using {}", side, clamped);
        }
        let len = clamped as usize * clamped as usize;
        Self {
            side: clamped,
            tiles: vec![TileType::Empty; len],
        }
    }

    /// Wrap an existing tile array. Fails unless it holds exactly `side * side`
    /// tiles.
    pub fn from_tiles(side: i32, tiles: Vec<TileType>) -> Result<Self, String> {
        if side <= 0 {
            return Err(format!(
                "Board validation failed: side must be > 0, got {}",
                side
            ));
        }
        if side > MAX_BOARD_SIDE {
            return Err(format!(
                "Board validation failed: side must be <= {}, got {}",
                MAX_BOARD_SIDE, side
            ));
        }
        let expected = (side as usize)
            .checked_mul(side as usize)
            .ok_or_else(|| format!("Board validation failed: side {} is too large", side))?;
        if tiles.len() != expected {
            return Err(format!(
                "Board validation failed: expected {} tiles for side {}, found {}",
                expected,
                side,
                tiles.len()
            ));
        }
        Ok(Self { side, tiles })
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    pub fn offset(&self) -> i32 {
        self.side / 2
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, x: i32, z: i32) -> bool {
        self.index_of(x, z).is_some()
    }

    /// Flat index of board-space (x, z), or `None` when out of range.
    pub fn index_of(&self, x: i32, z: i32) -> Option<usize> {
        let offset = self.offset();
        let col = x + offset;
        let row = z + offset;
        if col >= 0 && row >= 0 && col < self.side && row < self.side {
            Some((row * self.side + col) as usize)
        } else {
            None
        }
    }

    /// Board-space (x, z) of a flat index.
    pub fn coords_of(&self, index: usize) -> Option<(i32, i32)> {
        if index >= self.tiles.len() {
            return None;
        }
        let index = index as i32;
        let offset = self.offset();
        Some((index % self.side - offset, index / self.side - offset))
    }

    pub fn tile_at(&self, x: i32, z: i32) -> Option<TileType> {
        self.index_of(x, z).map(|i| self.tiles[i])
    }

    pub fn tile(&self, index: usize) -> Option<TileType> {
        self.tiles.get(index).copied()
    }

    /// Set one tile. Returns false (and changes nothing) when out of range.
    pub fn set_tile(&mut self, x: i32, z: i32, tile: TileType) -> bool {
        match self.index_of(x, z) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Set every listed index to `tile`. Out-of-range indices are skipped.
    /// Returns how many tiles were written.
    pub fn set_tiles(&mut self, indices: &[usize], tile: TileType) -> usize {
        let mut written = 0;
        for &index in indices {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
                written += 1;
            }
        }
        written
    }

    /// Replace `from` with `to` at (x, z). Returns true only if a tile changed.
    pub fn flip_tile(&mut self, x: i32, z: i32, from: TileType, to: TileType) -> bool {
        match self.index_of(x, z) {
            Some(i) if self.tiles[i] == from => {
                self.tiles[i] = to;
                true
            }
            _ => false,
        }
    }

    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    /// Rows of tiles from the lowest z upward.
    pub fn rows(&self) -> impl Iterator<Item = &[TileType]> {
        self.tiles.chunks(self.side as usize)
    }

    /// (x, z, tile) for every non-empty tile.
    pub fn visible_tiles(&self) -> impl Iterator<Item = (i32, i32, TileType)> + '_ {
        let offset = self.offset();
        let side = self.side;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_visible())
            .map(move |(i, tile)| {
                let i = i as i32;
                (i % side - offset, i / side - offset, *tile)
            })
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_centers_the_board() {
        let board = TileBoard::new(4);
        assert_eq!(board.offset(), 2);
        assert_eq!(board.index_of(-2, -2), Some(0));
        assert_eq!(board.index_of(1, -2), Some(3));
        assert_eq!(board.index_of(-2, -1), Some(4));
        assert_eq!(board.index_of(1, 1), Some(15));
        assert_eq!(board.index_of(0, 0), Some(10));
    }

    #[test]
    fn index_of_rejects_out_of_range() {
        let board = TileBoard::new(4);
        assert_eq!(board.index_of(2, 0), None);
        assert_eq!(board.index_of(-3, 0), None);
        assert_eq!(board.index_of(0, 2), None);
        assert_eq!(board.index_of(0, -3), None);
        assert_eq!(board.tile_at(5, 5), None);
    }

    #[test]
    fn odd_side_board_has_asymmetric_range() {
        let board = TileBoard::new(5);
        assert_eq!(board.offset(), 2);
        assert!(board.contains(-2, -2));
        assert!(board.contains(2, 2));
        assert!(!board.contains(3, 0));
        assert!(!board.contains(-3, 0));
    }

    #[test]
    fn coords_of_inverts_index_of() {
        let board = TileBoard::new(6);
        for z in -3..3 {
            for x in -3..3 {
                let i = board.index_of(x, z).expect("in range");
                assert_eq!(board.coords_of(i), Some((x, z)));
            }
        }
        assert_eq!(board.coords_of(36), None);
    }

    #[test]
    fn set_tile_out_of_range_is_no_op() {
        let mut board = TileBoard::new(4);
        assert!(!board.set_tile(10, 0, TileType::Dark));
        assert_eq!(board.count(TileType::Empty), 16);
        assert!(board.set_tile(0, 0, TileType::Dark));
        assert_eq!(board.tile_at(0, 0), Some(TileType::Dark));
    }

    #[test]
    fn set_tiles_skips_bad_indices() {
        let mut board = TileBoard::new(2);
        let written = board.set_tiles(&[0, 3, 99], TileType::Ground);
        assert_eq!(written, 2);
        assert_eq!(board.tile(0), Some(TileType::Ground));
        assert_eq!(board.tile(3), Some(TileType::Ground));
        assert_eq!(board.tile(1), Some(TileType::Empty));
    }

    #[test]
    fn flip_tile_only_changes_matching_tile() {
        let mut board = TileBoard::new(4);
        board.set_tile(0, 0, TileType::Ground);
        assert!(!board.flip_tile(0, 0, TileType::Dark, TileType::Light));
        assert_eq!(board.tile_at(0, 0), Some(TileType::Ground));

        board.set_tile(0, 0, TileType::Dark);
        assert!(board.flip_tile(0, 0, TileType::Dark, TileType::Light));
        assert_eq!(board.tile_at(0, 0), Some(TileType::Light));
        assert!(!board.flip_tile(9, 9, TileType::Dark, TileType::Light));
    }

    #[test]
    fn from_tiles_rejects_wrong_length() {
        let err = TileBoard::from_tiles(3, vec![TileType::Empty; 8]).expect_err("short");
        assert!(err.contains("expected 9 tiles"));
        let err = TileBoard::from_tiles(0, Vec::new()).expect_err("zero side");
        assert!(err.contains("side must be > 0"));
    }

    #[test]
    fn oversized_sides_are_rejected_or_clamped() {
        let err = TileBoard::from_tiles(50_000, Vec::new()).expect_err("huge side");
        assert!(err.contains("side must be <= 4096"));
        let err = TileBoard::from_tiles(i32::MAX, Vec::new()).expect_err("max side");
        assert!(err.contains("<= 4096"));

        let board = TileBoard::new(50_000);
        assert_eq!(board.side(), MAX_BOARD_SIDE);
        assert_eq!(board.len(), (MAX_BOARD_SIDE * MAX_BOARD_SIDE) as usize);
    }

    #[test]
    fn visible_tiles_reports_board_coords() {
        let mut board = TileBoard::new(4);
        board.set_tile(-2, 1, TileType::Dark);
        board.set_tile(1, -2, TileType::Ground);
        let visible: Vec<_> = board.visible_tiles().collect();
        assert_eq!(
            visible,
            vec![(1, -2, TileType::Ground), (-2, 1, TileType::Dark)]
        );
    }

    #[test]
    fn tile_chars_round_trip() {
        for tile in TileType::ALL {
            assert_eq!(TileType::from_char(tile.to_char()), Some(tile));
        }
        assert_eq!(TileType::from_char('x'), None);
    }
}
