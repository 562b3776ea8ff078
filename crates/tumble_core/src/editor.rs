//! Tile editor: hover picking, selection and bulk paint.
//!
//! The editor only ever writes tiles. Orientation, position and the cube
//! transform stay owned by the roll controller.

use crate::board::{TileBoard, TileType};
use crate::state::GameState;
use glam::Vec3;

/// Intersect a ray with the ground plane y = 0 and map the hit to a tile
/// index. Rays that are parallel to the ground or heading upward miss.
pub fn pick_tile(origin: Vec3, dir: Vec3, board: &TileBoard) -> Option<usize> {
    let downward = -dir.y;
    if downward <= f32::EPSILON {
        return None;
    }
    let t = origin.y / downward;
    if t < 0.0 || !t.is_finite() {
        return None;
    }
    let hit = origin + dir * t;
    board.index_of(hit.x.floor() as i32, hit.z.floor() as i32)
}

#[derive(Debug, Default)]
pub struct LevelEditor {
    pub enabled: bool,
    casted: Option<usize>,
    selected: Vec<usize>,
    selection_dirty: bool,
}

impl LevelEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        log::info!(
            "Level editor {}",
            if self.enabled { "enabled" } else { "disabled" }
        );
        self.enabled
    }

    /// Tile currently under the cursor.
    pub fn casted(&self) -> Option<usize> {
        self.casted
    }

    pub fn set_casted(&mut self, casted: Option<usize>) {
        self.casted = casted;
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn add_casted_to_selected(&mut self) -> bool {
        let Some(index) = self.casted else {
            return false;
        };
        if self.selected.contains(&index) {
            return false;
        }
        self.selected.push(index);
        self.selection_dirty = true;
        true
    }

    pub fn remove_casted_from_selected(&mut self) -> bool {
        let Some(index) = self.casted else {
            return false;
        };
        let before = self.selected.len();
        self.selected.retain(|&i| i != index);
        let removed = self.selected.len() != before;
        self.selection_dirty |= removed;
        removed
    }

    pub fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.selection_dirty = true;
        }
    }

    /// Write `tile` to every selected index, then clear the selection.
    /// Returns how many tiles were painted; an empty selection is a no-op.
    pub fn paint_selected(&mut self, tile: TileType, state: &mut GameState) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        let painted = state.paint_tiles(&self.selected, tile);
        log::info!("Painted {} tile(s) {}", painted, tile.label());
        self.clear_selection();
        painted
    }

    /// Returns whether the selection overlay needs rebuilding and clears the
    /// flag.
    pub fn take_selection_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.selection_dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Orientation;
    use crate::state::BoardPosition;

    #[test]
    fn pick_tile_floors_the_ground_hit() {
        let board = TileBoard::new(10);
        let origin = Vec3::new(0.25, 10.0, -2.75);
        let index = pick_tile(origin, Vec3::NEG_Y, &board).expect("straight down hits");
        assert_eq!(board.coords_of(index), Some((0, -3)));

        let dir = Vec3::new(1.0, -1.0, 1.0).normalize();
        let index = pick_tile(Vec3::new(0.5, 2.0, 0.5), dir, &board).expect("diagonal hits");
        assert_eq!(board.coords_of(index), Some((2, 2)));
    }

    #[test]
    fn pick_tile_misses_upward_and_off_board_rays() {
        let board = TileBoard::new(4);
        assert_eq!(pick_tile(Vec3::new(0.0, 5.0, 0.0), Vec3::Y, &board), None);
        assert_eq!(pick_tile(Vec3::new(0.0, 5.0, 0.0), Vec3::X, &board), None);
        assert_eq!(
            pick_tile(Vec3::new(50.0, 5.0, 0.0), Vec3::NEG_Y, &board),
            None
        );
        // Below the plane looking further down never reaches it.
        assert_eq!(
            pick_tile(Vec3::new(0.0, -1.0, 0.0), Vec3::NEG_Y, &board),
            None
        );
    }

    #[test]
    fn selection_has_no_duplicates() {
        let mut editor = LevelEditor::new();
        assert!(!editor.add_casted_to_selected());
        editor.set_casted(Some(3));
        assert!(editor.add_casted_to_selected());
        assert!(!editor.add_casted_to_selected());
        editor.set_casted(Some(7));
        editor.add_casted_to_selected();
        assert_eq!(editor.selected(), &[3, 7]);
        assert!(editor.take_selection_dirty());
        assert!(!editor.take_selection_dirty());

        assert!(editor.remove_casted_from_selected());
        assert!(!editor.remove_casted_from_selected());
        assert_eq!(editor.selected(), &[3]);
        assert!(editor.take_selection_dirty());
    }

    #[test]
    fn paint_selected_writes_tiles_and_clears_selection() {
        let mut state = GameState::new(TileBoard::new(4));
        state.take_tiles_dirty();
        let mut editor = LevelEditor::new();
        for index in [0, 5, 15] {
            editor.set_casted(Some(index));
            editor.add_casted_to_selected();
        }

        let painted = editor.paint_selected(TileType::Dark, &mut state);
        assert_eq!(painted, 3);
        assert!(editor.selected().is_empty());
        assert!(state.take_tiles_dirty());
        assert_eq!(state.board().count(TileType::Dark), 3);
        assert_eq!(state.board().tile(5), Some(TileType::Dark));
        assert_eq!(state.position(), BoardPosition::ORIGIN);
        assert_eq!(state.current_orientation(), Orientation::IDENTITY);
    }

    #[test]
    fn paint_with_empty_selection_is_no_op() {
        let mut state = GameState::new(TileBoard::new(4));
        state.take_tiles_dirty();
        let mut editor = LevelEditor::new();
        assert_eq!(editor.paint_selected(TileType::Ground, &mut state), 0);
        assert!(!state.tiles_dirty());
        assert!(!editor.take_selection_dirty());
    }
}
