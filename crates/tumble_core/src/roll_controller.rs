//! Roll controller: the Idle/Rolling state machine that drives the cube.
//!
//! A roll request updates the orientation immediately, then a short animation
//! tips the rendered cube over its bottom edge. Board effects wait for the
//! animation: when progress reaches 1.0 the position advances one cell and, if
//! the configured trigger face is now on the ground over an on-board cell, the
//! tile underneath may flip.
//!
//! Progress is driven by explicit per-frame `dt`; there is no cancellation and
//! requests made while a roll is in flight are dropped.

use crate::board::TileType;
use crate::config::GameConfig;
use crate::cube::Face;
use crate::roll::{self, RollDirection};
use crate::state::{BoardPosition, GameState, CUBE_CENTER_OFFSET};
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct RollConfig {
    /// Normalized progress per second; 10.0 finishes a roll in 0.1 s.
    pub rotation_speed: f32,
    pub trigger_face: Face,
    pub flip_from: TileType,
    pub flip_to: TileType,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 10.0,
            trigger_face: Face::Front,
            flip_from: TileType::Dark,
            flip_to: TileType::Light,
        }
    }
}

impl From<&GameConfig> for RollConfig {
    fn from(config: &GameConfig) -> Self {
        Self {
            rotation_speed: config.rotation_speed,
            trigger_face: config.trigger_face,
            flip_from: config.flip_from,
            flip_to: config.flip_to,
        }
    }
}

/// Transient state of one in-flight roll.
#[derive(Debug, Clone, Copy)]
pub struct RollAnimation {
    pub direction: RollDirection,
    /// Cube transform captured when the roll started.
    pub start: Mat4,
    pub axis: Vec3,
    pub target_angle_deg: f32,
    /// World-space point on the bottom edge the cube tips over.
    pub pivot: Vec3,
    progress: f32,
}

impl RollAnimation {
    pub fn new(direction: RollDirection, start: Mat4, position: BoardPosition) -> Self {
        Self {
            direction,
            start,
            axis: direction.axis(),
            target_angle_deg: direction.target_angle_deg(),
            pivot: CUBE_CENTER_OFFSET + position.to_world() - direction.pivot_offset(),
            progress: 0.0,
        }
    }

    /// Advance by `delta` normalized units. Non-finite or negative deltas are
    /// treated as zero so progress never decreases; it clamps at exactly 1.0.
    pub fn advance(&mut self, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.progress = (self.progress + delta).min(1.0);
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn current_angle_deg(&self) -> f32 {
        self.progress * self.target_angle_deg
    }

    pub fn transform(&self) -> Mat4 {
        let angle = self.current_angle_deg().to_radians();
        Mat4::from_translation(self.pivot)
            * Mat4::from_axis_angle(self.axis, angle)
            * Mat4::from_translation(-self.pivot)
            * self.start
    }
}

/// What happened when a roll finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    pub direction: RollDirection,
    pub position: BoardPosition,
    pub down_face: Face,
    pub on_board: bool,
    pub flipped: bool,
}

#[derive(Debug, Clone)]
pub struct RollController {
    pub config: RollConfig,
    animation: Option<RollAnimation>,
}

impl RollController {
    pub fn new(config: RollConfig) -> Self {
        Self {
            config,
            animation: None,
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation(&self) -> Option<&RollAnimation> {
        self.animation.as_ref()
    }

    /// Progress of the in-flight roll, `None` when idle.
    pub fn progress(&self) -> Option<f32> {
        self.animation.as_ref().map(RollAnimation::progress)
    }

    /// Start a roll. Returns false (with no side effects) while another roll
    /// is still in flight.
    pub fn request_roll(&mut self, direction: RollDirection, state: &mut GameState) -> bool {
        if self.animation.is_some() {
            log::trace!("Roll {} ignored: already rolling", direction.label());
            return false;
        }

        self.animation = Some(RollAnimation::new(
            direction,
            state.current_model_transform(),
            state.position(),
        ));
        state.set_orientation(roll::apply(state.current_orientation(), direction));
        log::debug!(
            "Roll {} from ({}, {}), orientation now {}",
            direction.label(),
            state.position().x,
            state.position().z,
            state.current_orientation()
        );
        true
    }

    /// Advance the in-flight roll by `dt` seconds. Returns the outcome on the
    /// frame the roll completes, `None` otherwise.
    pub fn step(&mut self, dt: f32, state: &mut GameState) -> Option<RollOutcome> {
        let animation = self.animation.as_mut()?;
        animation.advance(dt * self.config.rotation_speed);
        if !animation.is_finished() {
            state.set_model(animation.transform());
            return None;
        }
        self.complete(state)
    }

    /// Jump the in-flight roll straight to its end and apply its board
    /// effects. `None` when idle.
    pub fn complete(&mut self, state: &mut GameState) -> Option<RollOutcome> {
        let mut finished = self.animation.take()?;
        finished.advance(1.0);
        state.set_model(snap_to_half_units(finished.transform()));
        Some(self.finish_roll(finished.direction, state))
    }

    fn finish_roll(&self, direction: RollDirection, state: &mut GameState) -> RollOutcome {
        let position = state.position().stepped(direction);
        state.set_position(position);

        let down_face = state.down_face();
        let on_board = state.board().contains(position.x, position.z);
        let flipped = on_board
            && down_face == self.config.trigger_face
            && state.flip_tile_at(position, self.config.flip_from, self.config.flip_to);

        if flipped {
            log::debug!(
                "Tile ({}, {}) flipped {} -> {}",
                position.x,
                position.z,
                self.config.flip_from.label(),
                self.config.flip_to.label()
            );
        } else if !on_board {
            log::debug!("Cube left the board at ({}, {})", position.x, position.z);
        }

        RollOutcome {
            direction,
            position,
            down_face,
            on_board,
            flipped,
        }
    }
}

impl Default for RollController {
    fn default() -> Self {
        Self::new(RollConfig::default())
    }
}

/// A resting cube's transform is a signed permutation plus a translation on
/// the half-unit lattice; rounding there removes float drift between rolls.
fn snap_to_half_units(model: Mat4) -> Mat4 {
    let cols = model.to_cols_array().map(|v| (v * 2.0).round() * 0.5);
    Mat4::from_cols_array(&cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TileBoard;
    use crate::cube::Orientation;

    const DT: f32 = 1.0 / 60.0;

    fn ground_board(side: i32) -> TileBoard {
        let mut board = TileBoard::new(side);
        let all: Vec<usize> = (0..board.len()).collect();
        board.set_tiles(&all, TileType::Ground);
        board
    }

    fn roll_to_completion(
        controller: &mut RollController,
        state: &mut GameState,
        direction: RollDirection,
    ) -> RollOutcome {
        assert!(controller.request_roll(direction, state));
        for _ in 0..1000 {
            if let Some(outcome) = controller.step(DT, state) {
                return outcome;
            }
        }
        panic!("roll {:?} never finished", direction);
    }

    #[test]
    fn orientation_changes_at_request_time() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        controller.request_roll(RollDirection::Down, &mut state);
        assert_eq!(state.down_face(), Face::Front);
        assert_eq!(state.position(), BoardPosition::ORIGIN);
        assert!(controller.is_rolling());
    }

    #[test]
    fn position_updates_only_on_completion() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        controller.request_roll(RollDirection::Right, &mut state);
        assert!(controller.step(0.01, &mut state).is_none());
        assert_eq!(state.position(), BoardPosition::ORIGIN);
        let outcome = controller.step(1.0, &mut state).expect("roll should finish");
        assert_eq!(outcome.position, BoardPosition::new(1, 0));
        assert_eq!(state.position(), BoardPosition::new(1, 0));
        assert!(!controller.is_rolling());
    }

    #[test]
    fn opposite_rolls_return_to_origin() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        roll_to_completion(&mut controller, &mut state, RollDirection::Down);
        roll_to_completion(&mut controller, &mut state, RollDirection::Up);
        assert_eq!(state.position(), BoardPosition::ORIGIN);
        roll_to_completion(&mut controller, &mut state, RollDirection::Right);
        roll_to_completion(&mut controller, &mut state, RollDirection::Left);
        assert_eq!(state.position(), BoardPosition::ORIGIN);
        assert_eq!(state.current_orientation(), Orientation::IDENTITY);
    }

    #[test]
    fn front_face_landing_on_dark_tile_turns_it_light() {
        let mut board = ground_board(8);
        board.set_tile(0, 0, TileType::Dark);
        let mut state = GameState::new(board);
        state.take_tiles_dirty();
        let mut controller = RollController::default();

        let sequence = [
            RollDirection::Down,
            RollDirection::Right,
            RollDirection::Up,
            RollDirection::Left,
        ];
        let mut last = None;
        for direction in sequence {
            last = Some(roll_to_completion(&mut controller, &mut state, direction));
        }

        let last = last.expect("rolled at least once");
        assert_eq!(last.position, BoardPosition::ORIGIN);
        assert_eq!(last.down_face, Face::Front);
        assert!(last.on_board);
        assert!(last.flipped);
        assert_eq!(state.board().tile_at(0, 0), Some(TileType::Light));
        assert_eq!(state.board().count(TileType::Ground), 63);
        assert_eq!(state.board().count(TileType::Dark), 0);
        assert!(state.take_tiles_dirty());
    }

    #[test]
    fn trigger_face_is_configurable() {
        let mut board = ground_board(8);
        board.set_tile(1, 0, TileType::Dark);
        let mut state = GameState::new(board);
        let mut controller = RollController::new(RollConfig {
            trigger_face: Face::Right,
            ..RollConfig::default()
        });

        let outcome = roll_to_completion(&mut controller, &mut state, RollDirection::Right);
        assert_eq!(outcome.down_face, Face::Right);
        assert!(outcome.flipped);
        assert_eq!(state.board().tile_at(1, 0), Some(TileType::Light));
    }

    #[test]
    fn non_trigger_face_leaves_dark_tile() {
        let mut board = ground_board(8);
        board.set_tile(0, 1, TileType::Dark);
        let mut state = GameState::new(board);
        let mut controller = RollController::new(RollConfig {
            trigger_face: Face::Back,
            ..RollConfig::default()
        });

        let outcome = roll_to_completion(&mut controller, &mut state, RollDirection::Down);
        assert_eq!(outcome.down_face, Face::Front);
        assert!(!outcome.flipped);
        assert_eq!(state.board().tile_at(0, 1), Some(TileType::Dark));
    }

    #[test]
    fn rolling_off_the_board_skips_the_flip() {
        // side 2 -> valid range [-1, 1), so x = 1 is off the board.
        let mut board = ground_board(2);
        board.set_tile(0, 0, TileType::Dark);
        let mut state = GameState::new(board.clone());
        state.take_tiles_dirty();
        let mut controller = RollController::new(RollConfig {
            trigger_face: Face::Right,
            ..RollConfig::default()
        });

        let outcome = roll_to_completion(&mut controller, &mut state, RollDirection::Right);
        assert_eq!(outcome.position, BoardPosition::new(1, 0));
        assert_eq!(outcome.down_face, Face::Right);
        assert!(!outcome.on_board);
        assert!(!outcome.flipped);
        assert_eq!(state.board(), &board);
        assert!(!state.take_tiles_dirty());

        // Rolling further out and back in keeps working.
        roll_to_completion(&mut controller, &mut state, RollDirection::Right);
        roll_to_completion(&mut controller, &mut state, RollDirection::Left);
        assert_eq!(state.position(), BoardPosition::new(1, 0));
    }

    #[test]
    fn rolling_off_any_edge_skips_the_flip() {
        // side 2 -> valid range [-1, 1) on both axes.
        let cases: [&[RollDirection]; 3] = [
            &[RollDirection::Up, RollDirection::Up],
            &[RollDirection::Left, RollDirection::Left],
            &[RollDirection::Down],
        ];
        for path in cases {
            let mut board = TileBoard::new(2);
            let all: Vec<usize> = (0..board.len()).collect();
            board.set_tiles(&all, TileType::Dark);

            // Trigger on whichever face lands last, so only the bounds check
            // can stop the flip.
            let last_down = path
                .iter()
                .fold(Orientation::IDENTITY, |o, &d| roll::apply(o, d))
                .down_face();
            let mut state = GameState::new(board.clone());
            state.take_tiles_dirty();
            let mut controller = RollController::new(RollConfig {
                trigger_face: last_down,
                ..RollConfig::default()
            });

            let mut outcome = None;
            for &direction in path {
                outcome = Some(roll_to_completion(&mut controller, &mut state, direction));
            }
            let outcome = outcome.expect("path is not empty");
            assert_eq!(outcome.down_face, last_down, "{:?}", path);
            assert!(!outcome.on_board, "{:?} ended at {:?}", path, outcome.position);
            assert!(!outcome.flipped, "{:?}", path);
            assert_eq!(state.board(), &board, "{:?}", path);
            assert!(!state.take_tiles_dirty(), "{:?}", path);
        }
    }

    #[test]
    fn complete_finishes_a_roll_regardless_of_speed() {
        let mut board = ground_board(8);
        board.set_tile(0, 1, TileType::Dark);
        let mut state = GameState::new(board);
        let mut controller = RollController::new(RollConfig {
            rotation_speed: 1e-12,
            ..RollConfig::default()
        });
        controller.request_roll(RollDirection::Down, &mut state);
        assert!(controller.step(DT, &mut state).is_none());

        let outcome = controller.complete(&mut state).expect("roll in flight");
        assert!(!controller.is_rolling());
        assert_eq!(outcome.position, BoardPosition::new(0, 1));
        assert!(outcome.flipped);
        let center = state.current_model_transform().transform_point3(Vec3::ZERO);
        assert_eq!(center, Vec3::new(0.5, 0.5, 1.5));
        assert!(controller.complete(&mut state).is_none());
    }

    #[test]
    fn second_request_during_roll_is_dropped() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        assert!(controller.request_roll(RollDirection::Down, &mut state));
        controller.step(DT, &mut state);
        assert!(!controller.request_roll(RollDirection::Left, &mut state));

        let expected = roll::apply(Orientation::IDENTITY, RollDirection::Down);
        assert_eq!(state.current_orientation(), expected);

        let mut outcome = None;
        while outcome.is_none() {
            outcome = controller.step(DT, &mut state);
        }
        assert_eq!(state.position(), BoardPosition::new(0, 1));
        assert_eq!(state.current_orientation(), expected);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        controller.request_roll(RollDirection::Left, &mut state);

        let mut last_progress = 0.0;
        let mut last_angle = 0.0f32;
        let mut frames = 0;
        while let Some(animation) = controller.animation().copied() {
            assert!(animation.progress() >= last_progress);
            assert!(animation.current_angle_deg().abs() >= last_angle.abs());
            last_progress = animation.progress();
            last_angle = animation.current_angle_deg();
            controller.step(0.013, &mut state);
            frames += 1;
            assert!(frames < 100);
        }
        assert!(last_progress <= 1.0);
    }

    #[test]
    fn animation_clamps_to_exactly_one() {
        let mut animation =
            RollAnimation::new(RollDirection::Up, Mat4::IDENTITY, BoardPosition::ORIGIN);
        animation.advance(0.7);
        animation.advance(-5.0);
        assert!((animation.progress() - 0.7).abs() < 1e-6);
        animation.advance(f32::NAN);
        assert!((animation.progress() - 0.7).abs() < 1e-6);
        animation.advance(0.7);
        assert_eq!(animation.progress(), 1.0);
        assert!(animation.is_finished());
        assert_eq!(animation.current_angle_deg(), -90.0);
    }

    #[test]
    fn cube_tips_over_its_bottom_edge() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        controller.request_roll(RollDirection::Down, &mut state);

        // Halfway through a Down roll the center sits above the pivot edge.
        controller.step(0.5 / controller.config.rotation_speed, &mut state);
        let center = state.current_model_transform().transform_point3(Vec3::ZERO);
        let expected = Vec3::new(0.5, 0.5_f32.hypot(0.5), 1.0);
        assert!((center - expected).length() < 1e-4, "center was {center}");

        controller.step(1.0, &mut state);
        let center = state.current_model_transform().transform_point3(Vec3::ZERO);
        assert_eq!(center, Vec3::new(0.5, 0.5, 1.5));
    }

    #[test]
    fn model_front_normal_points_down_after_down_roll() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        roll_to_completion(&mut controller, &mut state, RollDirection::Down);
        // The cube mesh's front face points along +Z in model space.
        let normal = state.current_model_transform().transform_vector3(Vec3::Z);
        assert_eq!(normal, Vec3::NEG_Y);
    }

    #[test]
    fn long_walk_keeps_model_on_the_lattice() {
        let mut state = GameState::new(ground_board(8));
        let mut controller = RollController::default();
        for direction in [
            RollDirection::Down,
            RollDirection::Right,
            RollDirection::Right,
            RollDirection::Up,
            RollDirection::Left,
            RollDirection::Down,
        ] {
            roll_to_completion(&mut controller, &mut state, direction);
        }
        let position = state.position();
        let center = state.current_model_transform().transform_point3(Vec3::ZERO);
        assert_eq!(center, CUBE_CENTER_OFFSET + position.to_world());
    }
}
