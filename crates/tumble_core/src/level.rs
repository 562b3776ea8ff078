//! Plain-text level files.
//!
//! Layout, one section per line:
//!
//! ```text
//! (x,y,z)                        player position
//! (u,f,d,b,l,r)                  face ordinal in each slot
//! [[c0],[c1],[c2],[c3]]          cube model matrix, one bracket per column
//! ....##DD..                     tile rows, `side` characters each
//! ```
//!
//! Tile characters are `.` empty, `#` ground, `D` dark and `L` light. Other
//! characters on tile lines are ignored.

use crate::board::{TileBoard, TileType};
use crate::cube::Orientation;
use crate::state::CUBE_CENTER_OFFSET;
use glam::{Mat4, Vec3};
use std::fmt::{Display, Write as _};
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelState {
    pub position: Vec3,
    pub orientation: Orientation,
    pub model: Mat4,
    pub board: TileBoard,
}

impl LevelState {
    /// Empty board with the cube resting on the origin cell.
    pub fn fresh(side: i32) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Orientation::IDENTITY,
            model: Mat4::from_translation(CUBE_CENTER_OFFSET),
            board: TileBoard::new(side),
        }
    }
}

pub fn parse_level(text: &str, side: i32) -> Result<LevelState, String> {
    let mut lines = text.lines();

    let position_line = lines
        .next()
        .ok_or("Level validation failed: missing player position line")?;
    let position: Vec<f32> = parse_list(position_line, "player position")?;
    if position.len() != 3 {
        return Err(format!(
            "Level validation failed: player position needs 3 numbers, found {}",
            position.len()
        ));
    }

    let orientation_line = lines
        .next()
        .ok_or("Level validation failed: missing cube orientation line")?;
    let ordinals: Vec<u8> = parse_list(orientation_line, "cube orientation")?;
    let orientation = Orientation::from_ordinals(&ordinals)?;

    let model_line = lines
        .next()
        .ok_or("Level validation failed: missing model matrix line")?;
    let model: Vec<f32> = parse_list(model_line, "model matrix")?;
    if model.len() != 16 {
        return Err(format!(
            "Level validation failed: model matrix needs 16 numbers, found {}",
            model.len()
        ));
    }
    let mut cols = [0.0f32; 16];
    cols.copy_from_slice(&model);

    let tiles: Vec<TileType> = lines
        .flat_map(|line| line.chars().filter_map(TileType::from_char))
        .collect();
    let board = TileBoard::from_tiles(side, tiles)?;

    Ok(LevelState {
        position: Vec3::new(position[0], position[1], position[2]),
        orientation,
        model: Mat4::from_cols_array(&cols),
        board,
    })
}

pub fn format_level(level: &LevelState) -> String {
    let mut out = String::new();
    let p = level.position;
    let _ = writeln!(out, "({},{},{})", p.x, p.y, p.z);

    let ordinals: Vec<String> = level
        .orientation
        .ordinals()
        .iter()
        .map(|o| o.to_string())
        .collect();
    let _ = writeln!(out, "({})", ordinals.join(","));

    let columns: Vec<String> = level
        .model
        .to_cols_array_2d()
        .iter()
        .map(|col| {
            let values: Vec<String> = col.iter().map(|v| v.to_string()).collect();
            format!("[{}]", values.join(","))
        })
        .collect();
    let _ = writeln!(out, "[{}]", columns.join(","));

    for row in level.board.rows() {
        out.extend(row.iter().map(|tile| tile.to_char()));
        out.push('\n');
    }
    out
}

pub fn load_level_from_path(path: &Path, side: i32) -> Result<LevelState, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    parse_level(&raw, side).map_err(|e| format!("{e} ({})", path.display()))
}

pub fn save_level_to_path(path: &Path, level: &LevelState) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    fs::write(path, format_level(level))
        .map_err(|e| format!("Failed to write level file {}: {e}", path.display()))
}

fn parse_list<T>(line: &str, what: &str) -> Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    line.split(|c: char| matches!(c, '(' | ')' | '[' | ']' | ',') || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<T>().map_err(|e| {
                format!("Level validation failed: bad {what} value '{token}': {e}")
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Face;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tumble_level_test_{}_{}_{}.txt",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const SMALL_LEVEL: &str = "(1,0,-1)\n\
        (3,0,1,2,4,5)\n\
        [[1,0,0,0],[0,1,0,0],[0,0,1,0],[1.5,0.5,-0.5,1]]\n\
        ..#D\n\
        #LD.\n\
        ....\n\
        ####\n";

    #[test]
    fn parse_level_reads_all_sections() {
        let level = parse_level(SMALL_LEVEL, 4).expect("level should parse");
        assert_eq!(level.position, Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(level.orientation.down_face(), Face::Front);
        let center = level.model.transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(1.5, 0.5, -0.5)).length() < 1e-6);
        assert_eq!(level.board.tile_at(-2, -2), Some(TileType::Empty));
        assert_eq!(level.board.tile_at(1, -2), Some(TileType::Dark));
        assert_eq!(level.board.tile_at(-1, -1), Some(TileType::Light));
        assert_eq!(level.board.count(TileType::Ground), 6);
    }

    #[test]
    fn format_then_parse_preserves_level() {
        let original = parse_level(SMALL_LEVEL, 4).expect("level should parse");
        let text = format_level(&original);
        let reparsed = parse_level(&text, 4).expect("formatted level should parse");
        assert_eq!(reparsed, original);
    }

    #[test]
    fn format_level_writes_grid_rows() {
        let mut level = LevelState::fresh(2);
        level.board.set_tile(-1, 0, TileType::Dark);
        let text = format_level(&level);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "(0,0,0)");
        assert_eq!(lines[1], "(0,1,2,3,4,5)");
        assert_eq!(lines[2], "[[1,0,0,0],[0,1,0,0],[0,0,1,0],[0.5,0.5,0.5,1]]");
        assert_eq!(&lines[3..], &["..", "D."]);
    }

    #[test]
    fn parse_level_ignores_unknown_tile_chars() {
        let text = "(0,0,0)\n(0,1,2,3,4,5)\n[[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]]\n. #\nD x L\n";
        let level = parse_level(text, 2).expect("level should parse");
        assert_eq!(level.board.tiles(), &[
            TileType::Empty,
            TileType::Ground,
            TileType::Dark,
            TileType::Light
        ]);
    }

    #[test]
    fn parse_level_rejects_short_position() {
        let text = "(0,0)\n(0,1,2,3,4,5)\n[[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]]\n..\n..\n";
        let err = parse_level(text, 2).expect_err("short position should fail");
        assert!(err.contains("player position needs 3 numbers"));
    }

    #[test]
    fn parse_level_rejects_invalid_orientation() {
        let text = "(0,0,0)\n(0,1,1,3,4,5)\n[[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]]\n..\n..\n";
        let err = parse_level(text, 2).expect_err("duplicate face should fail");
        assert!(err.contains("not a permutation"));
    }

    #[test]
    fn parse_level_rejects_bad_matrix_and_numbers() {
        let text = "(0,0,0)\n(0,1,2,3,4,5)\n[[1,0,0,0],[0,1,0,0]]\n..\n..\n";
        let err = parse_level(text, 2).expect_err("short matrix should fail");
        assert!(err.contains("model matrix needs 16 numbers"));

        let text = "(0,zero,0)\n(0,1,2,3,4,5)\n";
        let err = parse_level(text, 2).expect_err("non-numeric position should fail");
        assert!(err.contains("bad player position value 'zero'"));
    }

    #[test]
    fn parse_level_rejects_wrong_tile_count() {
        let text = "(0,0,0)\n(0,1,2,3,4,5)\n[[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]]\n...\n";
        let err = parse_level(text, 2).expect_err("tile count mismatch should fail");
        assert!(err.contains("expected 4 tiles"));
    }

    #[test]
    fn parse_level_rejects_truncated_file() {
        let err = parse_level("(0,0,0)\n", 2).expect_err("missing sections should fail");
        assert!(err.contains("missing cube orientation"));
    }

    #[test]
    fn save_and_load_level_from_disk() {
        let path = temp_file_path("roundtrip");
        let mut level = LevelState::fresh(4);
        level.board.set_tile(0, 0, TileType::Dark);
        level.position = Vec3::new(-2.0, 0.0, 1.0);

        save_level_to_path(&path, &level).expect("save should succeed");
        let loaded = load_level_from_path(&path, 4).expect("load should succeed");
        assert_eq!(loaded, level);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_level_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_level_from_path(&path, 4).expect_err("missing file should fail");
        assert!(err.contains("Failed to read level file"));
    }
}
