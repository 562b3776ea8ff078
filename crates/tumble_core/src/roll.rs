//! Roll directions and the orientation transition they cause.
//!
//! Directions are screen-relative: `Down` tips the cube toward +Z (toward the
//! default camera), `Up` toward -Z, `Left` toward -X and `Right` toward +X.
//! Every roll is a single 4-cycle over the slots perpendicular to the roll
//! axis; the two slots on the axis keep their faces.

use crate::cube::{Orientation, Slot};
use glam::{IVec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl RollDirection {
    pub const ALL: [RollDirection; 4] = [
        RollDirection::Up,
        RollDirection::Down,
        RollDirection::Left,
        RollDirection::Right,
    ];

    /// Slot cycle for this roll: `cycle[i]` receives the face of `cycle[i + 1]`
    /// and the last slot receives the old face of the first.
    pub fn cycle(self) -> [Slot; 4] {
        match self {
            Self::Down => [Slot::Up, Slot::Back, Slot::Down, Slot::Front],
            Self::Up => [Slot::Up, Slot::Front, Slot::Down, Slot::Back],
            Self::Left => [Slot::Up, Slot::Right, Slot::Down, Slot::Left],
            Self::Right => [Slot::Up, Slot::Left, Slot::Down, Slot::Right],
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Board step as (dx, dz).
    pub fn step(self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, -1),
            Self::Down => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
            Self::Right => IVec2::new(1, 0),
        }
    }

    /// World axis the cube tips around: X for vertical rolls, Z for horizontal.
    pub fn axis(self) -> Vec3 {
        if self.is_vertical() {
            Vec3::X
        } else {
            Vec3::Z
        }
    }

    /// Signed target angle in degrees around `axis()`.
    pub fn target_angle_deg(self) -> f32 {
        match self {
            Self::Down => 90.0,
            Self::Up => -90.0,
            Self::Left => 90.0,
            Self::Right => -90.0,
        }
    }

    /// Offset from the cube center to subtract to reach the bottom edge the
    /// cube tips over.
    pub fn pivot_offset(self) -> Vec3 {
        match self {
            Self::Down => Vec3::new(0.0, 0.5, -0.5),
            Self::Up => Vec3::new(0.0, 0.5, 0.5),
            Self::Left => Vec3::new(0.5, 0.5, 0.0),
            Self::Right => Vec3::new(-0.5, 0.5, 0.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Orientation after rolling once in `direction`.
pub fn apply(orientation: Orientation, direction: RollDirection) -> Orientation {
    let mut next = orientation;
    next.rotate_cycle(direction.cycle());
    next
}
