//! CPU-side scene geometry, rebuilt every frame and streamed to the GPU.
//!
//! Triangles are indexed (quads as two triangles). Lines are plain vertex
//! pairs drawn with the line pipeline.

use glam::{Mat4, Vec3};
use tumble_core::{Face, TileBoard, TileType};
use tumble_render::MeshVertex;

const SELECTION_LIFT: f32 = 0.01;
const HOVER_LIFT: f32 = 0.02;
const AXIS_LENGTH: f32 = 5.0;

const GROUND_COLOR: [f32; 4] = [0.55, 0.55, 0.58, 1.0];
const DARK_COLOR: [f32; 4] = [0.12, 0.12, 0.18, 1.0];
const LIGHT_COLOR: [f32; 4] = [0.95, 0.88, 0.55, 1.0];
const SELECTION_COLOR: [f32; 4] = [0.2, 0.6, 1.0, 0.45];
const HOVER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const GRID_COLOR: [f32; 4] = [0.35, 0.35, 0.4, 1.0];
pub const FRONT_FACE_COLOR: [f32; 4] = [0.95, 0.35, 0.2, 1.0];

#[derive(Debug, Default)]
pub struct SceneMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub line_vertices: Vec<MeshVertex>,
}

impl SceneMesh {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.line_vertices.clear();
    }

    /// Corners in winding order.
    pub fn add_quad(&mut self, corners: [Vec3; 4], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.iter().map(|&c| MeshVertex::new(c, color)));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn add_line(&mut self, from: Vec3, to: Vec3, color: [f32; 4]) {
        self.line_vertices.push(MeshVertex::new(from, color));
        self.line_vertices.push(MeshVertex::new(to, color));
    }
}

pub fn tile_color(tile: TileType) -> Option<[f32; 4]> {
    match tile {
        TileType::Empty => None,
        TileType::Ground => Some(GROUND_COLOR),
        TileType::Dark => Some(DARK_COLOR),
        TileType::Light => Some(LIGHT_COLOR),
    }
}

pub fn face_color(face: Face) -> [f32; 4] {
    match face {
        Face::Front => FRONT_FACE_COLOR,
        Face::Up => [0.85, 0.85, 0.85, 1.0],
        Face::Down => [0.45, 0.45, 0.45, 1.0],
        Face::Back => [0.6, 0.6, 0.65, 1.0],
        Face::Left => [0.7, 0.7, 0.75, 1.0],
        Face::Right => [0.75, 0.75, 0.7, 1.0],
    }
}

fn cell_quad(x: i32, z: i32, y: f32) -> [Vec3; 4] {
    let (x, z) = (x as f32, z as f32);
    [
        Vec3::new(x, y, z),
        Vec3::new(x, y, z + 1.0),
        Vec3::new(x + 1.0, y, z + 1.0),
        Vec3::new(x + 1.0, y, z),
    ]
}

/// One quad per non-empty tile, flat on y = 0.
pub fn build_tiles(mesh: &mut SceneMesh, board: &TileBoard) {
    for (x, z, tile) in board.visible_tiles() {
        if let Some(color) = tile_color(tile) {
            mesh.add_quad(cell_quad(x, z, 0.0), color);
        }
    }
}

/// Model-space face corners of a unit cube centered on the origin. Face
/// normals: Up +Y, Down -Y, Front +Z, Back -Z, Left -X, Right +X.
fn cube_face_corners(face: Face) -> [Vec3; 4] {
    let h = 0.5;
    match face {
        Face::Up => [
            Vec3::new(-h, h, -h),
            Vec3::new(-h, h, h),
            Vec3::new(h, h, h),
            Vec3::new(h, h, -h),
        ],
        Face::Down => [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, -h, h),
            Vec3::new(-h, -h, h),
        ],
        Face::Front => [
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ],
        Face::Back => [
            Vec3::new(h, -h, -h),
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(h, h, -h),
        ],
        Face::Left => [
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, h, -h),
        ],
        Face::Right => [
            Vec3::new(h, -h, h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(h, h, h),
        ],
    }
}

/// The cube as 24 vertices (4 per face) transformed by `model`.
pub fn build_cube(mesh: &mut SceneMesh, model: Mat4) {
    for face in Face::ALL {
        let corners = cube_face_corners(face).map(|c| model.transform_point3(c));
        mesh.add_quad(corners, face_color(face));
    }
}

/// Translucent quads over the editor selection.
pub fn build_selection(mesh: &mut SceneMesh, board: &TileBoard, selected: &[usize]) {
    for &index in selected {
        if let Some((x, z)) = board.coords_of(index) {
            mesh.add_quad(cell_quad(x, z, SELECTION_LIFT), SELECTION_COLOR);
        }
    }
}

/// Outline around the tile under the cursor.
pub fn build_hover_outline(mesh: &mut SceneMesh, board: &TileBoard, index: usize) {
    let Some((x, z)) = board.coords_of(index) else {
        return;
    };
    let corners = cell_quad(x, z, HOVER_LIFT);
    for i in 0..corners.len() {
        mesh.add_line(corners[i], corners[(i + 1) % corners.len()], HOVER_COLOR);
    }
}

/// Board grid plus world axes (X red, Y green, Z blue).
pub fn build_grid(mesh: &mut SceneMesh, board: &TileBoard) {
    let min = -board.offset() as f32;
    let max = (board.side() - board.offset()) as f32;
    for i in -board.offset()..=(board.side() - board.offset()) {
        let v = i as f32;
        mesh.add_line(Vec3::new(v, 0.0, min), Vec3::new(v, 0.0, max), GRID_COLOR);
        mesh.add_line(Vec3::new(min, 0.0, v), Vec3::new(max, 0.0, v), GRID_COLOR);
    }

    let lift = Vec3::Y * HOVER_LIFT;
    mesh.add_line(lift, lift + Vec3::X * AXIS_LENGTH, [1.0, 0.2, 0.2, 1.0]);
    mesh.add_line(lift, lift + Vec3::Y * AXIS_LENGTH, [0.2, 1.0, 0.2, 1.0]);
    mesh.add_line(lift, lift + Vec3::Z * AXIS_LENGTH, [0.2, 0.4, 1.0, 1.0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tiles_are_not_drawn() {
        let mut board = TileBoard::new(4);
        board.set_tile(0, 0, TileType::Ground);
        board.set_tile(1, 1, TileType::Dark);
        let mut mesh = SceneMesh::default();
        build_tiles(&mut mesh, &board);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 12);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
        assert_eq!(mesh.vertices[4].color, DARK_COLOR);
    }

    #[test]
    fn tile_quad_covers_its_cell() {
        let mut board = TileBoard::new(4);
        board.set_tile(-2, 1, TileType::Light);
        let mut mesh = SceneMesh::default();
        build_tiles(&mut mesh, &board);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        let zs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[2]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -2.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), -1.0);
        assert_eq!(zs.iter().cloned().fold(f32::MAX, f32::min), 1.0);
        assert_eq!(zs.iter().cloned().fold(f32::MIN, f32::max), 2.0);
    }

    #[test]
    fn cube_has_24_vertices_inside_its_cell() {
        let mut mesh = SceneMesh::default();
        build_cube(&mut mesh, Mat4::from_translation(Vec3::splat(0.5)));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for v in &mesh.vertices {
            for c in v.position {
                assert!((0.0..=1.0).contains(&c), "vertex {:?}", v.position);
            }
        }
    }

    #[test]
    fn front_face_is_colored_and_follows_the_model() {
        let mut mesh = SceneMesh::default();
        let model = Mat4::from_translation(Vec3::splat(0.5))
            * Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2);
        build_cube(&mut mesh, model);
        let front: Vec<&MeshVertex> = mesh
            .vertices
            .iter()
            .filter(|v| v.color == FRONT_FACE_COLOR)
            .collect();
        assert_eq!(front.len(), 4);
        // +Z rotated a quarter turn about X points down: the face is on the ground.
        assert!(front.iter().all(|v| v.position[1].abs() < 1e-5));
    }

    #[test]
    fn selection_and_hover_skip_bad_indices() {
        let board = TileBoard::new(2);
        let mut mesh = SceneMesh::default();
        build_selection(&mut mesh, &board, &[0, 3, 17]);
        assert_eq!(mesh.vertices.len(), 8);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == SELECTION_LIFT));

        build_hover_outline(&mut mesh, &board, 99);
        assert!(mesh.line_vertices.is_empty());
        build_hover_outline(&mut mesh, &board, 1);
        assert_eq!(mesh.line_vertices.len(), 8);
    }

    #[test]
    fn grid_has_side_plus_one_lines_each_way_plus_axes() {
        let board = TileBoard::new(4);
        let mut mesh = SceneMesh::default();
        build_grid(&mut mesh, &board);
        assert_eq!(mesh.line_vertices.len(), (5 * 2 + 3) * 2);
    }

    #[test]
    fn clear_empties_all_buffers() {
        let mut mesh = SceneMesh::default();
        build_cube(&mut mesh, Mat4::IDENTITY);
        build_grid(&mut mesh, &TileBoard::new(2));
        mesh.clear();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.indices.is_empty());
        assert!(mesh.line_vertices.is_empty());
    }
}
