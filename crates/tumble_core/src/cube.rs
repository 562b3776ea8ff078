//! Cube faces and the orientation that maps physical slots to faces.
//!
//! A `Face` is a logical identity painted on the cube and never changes. A
//! `Slot` is a physical position relative to the world (the slot named `Down`
//! always touches the ground). `Orientation` records which face currently sits
//! in each slot and is always a permutation of the six faces.

use serde::Deserialize;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Face {
    Up = 0,
    Front = 1,
    Down = 2,
    Back = 3,
    Left = 4,
    Right = 5,
}

impl Face {
    /// All faces in ordinal order.
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Front,
        Face::Down,
        Face::Back,
        Face::Left,
        Face::Right,
    ];

    /// Ordinal used by the level file format.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Face> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Single-letter label (`U`, `F`, `D`, `B`, `L`, `R`).
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Up => "U",
            Self::Front => "F",
            Self::Down => "D",
            Self::Back => "B",
            Self::Left => "L",
            Self::Right => "R",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// Physical position on the cube. Slot order matches `Face` ordinals so the
/// identity orientation puts every face in its namesake slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Up,
    Front,
    Down,
    Back,
    Left,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Up,
        Slot::Front,
        Slot::Down,
        Slot::Back,
        Slot::Left,
        Slot::Right,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Front => 1,
            Self::Down => 2,
            Self::Back => 3,
            Self::Left => 4,
            Self::Right => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation {
    faces: [Face; 6],
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation { faces: Face::ALL };

    /// Build an orientation from faces in slot order. Fails unless the six
    /// entries are a permutation of the six faces.
    pub fn from_faces(faces: [Face; 6]) -> Result<Self, String> {
        if !is_permutation(&faces) {
            return Err(format!(
                "Orientation validation failed: {:?} is not a permutation of the six faces",
                faces
            ));
        }
        Ok(Self { faces })
    }

    /// Build an orientation from face ordinals in slot order (the level file
    /// seeding contract).
    pub fn from_ordinals(ordinals: &[u8]) -> Result<Self, String> {
        if ordinals.len() != 6 {
            return Err(format!(
                "Orientation validation failed: expected 6 face ordinals, found {}",
                ordinals.len()
            ));
        }
        let mut faces = [Face::Up; 6];
        for (slot, &ordinal) in ordinals.iter().enumerate() {
            faces[slot] = Face::from_ordinal(ordinal).ok_or_else(|| {
                format!(
                    "Orientation validation failed: face ordinal {} out of range",
                    ordinal
                )
            })?;
        }
        Self::from_faces(faces)
    }

    pub fn face_at(&self, slot: Slot) -> Face {
        self.faces[slot.index()]
    }

    /// The face currently touching the ground.
    pub fn down_face(&self) -> Face {
        self.face_at(Slot::Down)
    }

    /// Slot currently occupied by `face`.
    pub fn slot_of(&self, face: Face) -> Slot {
        let position = self
            .faces
            .iter()
            .position(|&f| f == face)
            .unwrap_or_else(|| unreachable!("orientation lost face {face}"));
        Slot::ALL[position]
    }

    pub fn faces(&self) -> [Face; 6] {
        self.faces
    }

    pub fn ordinals(&self) -> [u8; 6] {
        self.faces.map(Face::ordinal)
    }

    pub fn is_valid(&self) -> bool {
        is_permutation(&self.faces)
    }

    /// Shift faces one step along `cycle`: each listed slot takes the face of
    /// the slot after it, and the last slot takes the first slot's old face.
    pub(crate) fn rotate_cycle(&mut self, cycle: [Slot; 4]) {
        let first = self.faces[cycle[0].index()];
        for pair in cycle.windows(2) {
            self.faces[pair[0].index()] = self.faces[pair[1].index()];
        }
        self.faces[cycle[3].index()] = first;
        debug_assert!(self.is_valid(), "roll broke orientation: {self}");
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<Slot> for Orientation {
    type Output = Face;

    fn index(&self, slot: Slot) -> &Face {
        &self.faces[slot.index()]
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.faces.iter().map(|face| face.short_label()).collect();
        write!(f, "[{}]", labels.join(" "))
    }
}

fn is_permutation(faces: &[Face; 6]) -> bool {
    let mut seen = [false; 6];
    for face in faces {
        let i = face.ordinal() as usize;
        if seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}
