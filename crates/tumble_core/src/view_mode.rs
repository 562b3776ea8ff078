//! Camera control mode and projection kind, cycled from the keyboard and the
//! debug overlay.

/// How mouse and keyboard drive the camera.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMode {
    /// Free look: mouse motion turns, WASD moves.
    Fly,
    /// Middle-drag orbits around a target, shift-middle-drag pans.
    #[default]
    Orbit,
}

impl CameraMode {
    pub const ALL: &'static [CameraMode] = &[CameraMode::Fly, CameraMode::Orbit];

    pub fn label(self) -> &'static str {
        match self {
            Self::Fly => "Fly",
            Self::Orbit => "Orbit",
        }
    }

    /// Cycle to the next mode (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Fly => Self::Orbit,
            Self::Orbit => Self::Fly,
        }
    }
}

impl std::fmt::Display for CameraMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionKind {
    pub const ALL: &'static [ProjectionKind] =
        &[ProjectionKind::Perspective, ProjectionKind::Orthographic];

    pub fn label(self) -> &'static str {
        match self {
            Self::Perspective => "Perspective",
            Self::Orthographic => "Orthographic",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }
}

impl std::fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_orbit_perspective() {
        assert_eq!(CameraMode::default(), CameraMode::Orbit);
        assert_eq!(ProjectionKind::default(), ProjectionKind::Perspective);
    }

    #[test]
    fn next_cycles_and_wraps() {
        assert_eq!(CameraMode::Fly.next(), CameraMode::Orbit);
        assert_eq!(CameraMode::Orbit.next(), CameraMode::Fly);
        assert_eq!(ProjectionKind::Perspective.next(), ProjectionKind::Orthographic);
        assert_eq!(ProjectionKind::Orthographic.next(), ProjectionKind::Perspective);
    }

    #[test]
    fn display_matches_label() {
        for &mode in CameraMode::ALL {
            assert_eq!(format!("{}", mode), mode.label());
        }
        for &kind in ProjectionKind::ALL {
            assert_eq!(format!("{}", kind), kind.label());
        }
    }
}
