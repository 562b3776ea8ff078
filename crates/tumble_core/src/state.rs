//! Game state: the single owner of everything a roll changes.
//!
//! `GameState` holds the cube orientation, its board position, the tile board
//! and the model transform the renderer draws. Orientation, position and model
//! only change through the roll controller. Tiles can also be painted, which
//! raises a dirty flag the renderer takes to rebuild the board mesh.

use crate::board::{TileBoard, TileType};
use crate::cube::{Face, Orientation};
use crate::level::LevelState;
use crate::roll::RollDirection;
use glam::{Mat4, Vec3};

/// World offset from a cell's minimum corner to the center of a cube resting
/// on it.
pub const CUBE_CENTER_OFFSET: Vec3 = Vec3::new(0.5, 0.5, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoardPosition {
    pub x: i32,
    pub z: i32,
}

impl BoardPosition {
    pub const ORIGIN: BoardPosition = BoardPosition { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn stepped(self, direction: RollDirection) -> Self {
        let step = direction.step();
        Self {
            x: self.x + step.x,
            z: self.z + step.y,
        }
    }

    /// Minimum corner of the cell in world space.
    pub fn to_world(self) -> Vec3 {
        Vec3::new(self.x as f32, 0.0, self.z as f32)
    }
}

/// Everything the puzzle simulation owns. Passed by reference to the roll
/// controller, renderer and editor; nothing else holds this state.
///
/// Orientation, position and model transform are only written by
/// [`crate::roll_controller::RollController`] (or wholesale on level load).
#[derive(Debug, Clone)]
pub struct GameState {
    orientation: Orientation,
    position: BoardPosition,
    board: TileBoard,
    model: Mat4,
    tiles_dirty: bool,
}

impl GameState {
    pub fn new(board: TileBoard) -> Self {
        Self {
            orientation: Orientation::IDENTITY,
            position: BoardPosition::ORIGIN,
            board,
            model: Mat4::from_translation(CUBE_CENTER_OFFSET),
            tiles_dirty: true,
        }
    }

    /// Seed from a loaded level. The stored position is rounded to the
    /// nearest cell.
    pub fn from_level(level: LevelState) -> Self {
        Self {
            orientation: level.orientation,
            position: BoardPosition::new(
                level.position.x.round() as i32,
                level.position.z.round() as i32,
            ),
            board: level.board,
            model: level.model,
            tiles_dirty: true,
        }
    }

    pub fn to_level(&self) -> LevelState {
        LevelState {
            position: self.position.to_world(),
            orientation: self.orientation,
            model: self.model,
            board: self.board.clone(),
        }
    }

    pub fn current_orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn down_face(&self) -> Face {
        self.orientation.down_face()
    }

    pub fn position(&self) -> BoardPosition {
        self.position
    }

    pub fn board(&self) -> &TileBoard {
        &self.board
    }

    /// Rendered cube transform, including any in-flight roll rotation.
    pub fn current_model_transform(&self) -> Mat4 {
        self.model
    }

    /// Bulk-set tiles by flat index (editor paint). Marks tiles dirty when
    /// anything was written.
    pub fn paint_tiles(&mut self, indices: &[usize], tile: TileType) -> usize {
        let written = self.board.set_tiles(indices, tile);
        if written > 0 {
            self.tiles_dirty = true;
        }
        written
    }

    pub fn set_tile(&mut self, x: i32, z: i32, tile: TileType) -> bool {
        let changed = self.board.set_tile(x, z, tile);
        self.tiles_dirty |= changed;
        changed
    }

    pub fn mark_tiles_dirty(&mut self) {
        self.tiles_dirty = true;
    }

    /// Returns whether the tile mesh needs rebuilding and clears the flag.
    pub fn take_tiles_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.tiles_dirty, false)
    }

    pub fn tiles_dirty(&self) -> bool {
        self.tiles_dirty
    }

    pub(crate) fn set_orientation(&mut self, orientation: Orientation) {
        debug_assert!(orientation.is_valid());
        self.orientation = orientation;
    }

    pub(crate) fn set_position(&mut self, position: BoardPosition) {
        self.position = position;
    }

    pub(crate) fn set_model(&mut self, model: Mat4) {
        self.model = model;
    }

    pub(crate) fn flip_tile_at(&mut self, position: BoardPosition, from: TileType, to: TileType) -> bool {
        let flipped = self.board.flip_tile(position.x, position.z, from, to);
        self.tiles_dirty |= flipped;
        flipped
    }
}
