//! Cube move notation.
//!
//! A move token is a face letter with an optional modifier:
//!
//! ```text
//! token    := FACE [MODIFIER]
//! FACE     := U | D | L | R | F | B
//! MODIFIER := '   (anticlockwise quarter turn)
//!           | 2   (half turn)
//! ```
//!
//! A move list is whitespace separated, as printed by cube solvers.

use crate::arm::Rotation;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A face of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    U,
    D,
    L,
    R,
    F,
    B,
}

impl Face {
    /// Face order of a solver state string.
    pub const SOLVER_ORDER: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    pub const fn letter(&self) -> char {
        match self {
            Face::U => 'U',
            Face::D => 'D',
            Face::L => 'L',
            Face::R => 'R',
            Face::F => 'F',
            Face::B => 'B',
        }
    }

    pub const fn from_letter(letter: char) -> Option<Face> {
        match letter {
            'U' => Some(Face::U),
            'D' => Some(Face::D),
            'L' => Some(Face::L),
            'R' => Some(Face::R),
            'F' => Some(Face::F),
            'B' => Some(Face::B),
            _ => None,
        }
    }

    /// Position of this face in [`Face::SOLVER_ORDER`].
    pub const fn solver_index(&self) -> usize {
        match self {
            Face::U => 0,
            Face::R => 1,
            Face::F => 2,
            Face::D => 3,
            Face::L => 4,
            Face::B => 5,
        }
    }

    /// Face that ends up where `self` was named, after the whole cube has
    /// been turned towards the right.
    ///
    /// The front face moves onto the left arm, so a pending `F` becomes `L`,
    /// `R` becomes `F`, `B` becomes `R` and `L` becomes `B`.
    pub const fn after_towards_right(&self) -> Face {
        match self {
            Face::F => Face::L,
            Face::R => Face::F,
            Face::B => Face::R,
            Face::L => Face::B,
            Face::U => Face::U,
            Face::D => Face::D,
        }
    }

    /// Whether compiling this face turns the whole cube first.
    pub const fn needs_reorientation(&self) -> bool {
        matches!(self, Face::F | Face::B)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Modifier following the face letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    /// Clockwise quarter turn.
    #[default]
    None,
    /// `'`: anticlockwise quarter turn.
    Prime,
    /// `2`: half turn.
    Double,
}

/// Number of quarter turns a token asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCount {
    Single,
    Double,
}

/// One move, e.g. `F2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveToken {
    pub face: Face,
    pub modifier: Modifier,
}

impl MoveToken {
    pub const fn new(face: Face, modifier: Modifier) -> Self {
        Self { face, modifier }
    }

    /// Turn count and direction. Half turns run clockwise.
    pub const fn turns(&self) -> (TurnCount, Rotation) {
        match self.modifier {
            Modifier::None => (TurnCount::Single, Rotation::Clockwise),
            Modifier::Prime => (TurnCount::Single, Rotation::Anticlockwise),
            Modifier::Double => (TurnCount::Double, Rotation::Clockwise),
        }
    }

    /// Same modifier on another face.
    pub const fn with_face(&self, face: Face) -> Self {
        Self {
            face,
            modifier: self.modifier,
        }
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.face)?;
        match self.modifier {
            Modifier::None => Ok(()),
            Modifier::Prime => f.write_str("'"),
            Modifier::Double => f.write_str("2"),
        }
    }
}

/// Move notation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("empty move token")]
    Empty,

    #[error("unknown face '{0}'")]
    UnknownFace(char),

    #[error("invalid modifier in move '{0}'")]
    InvalidModifier(String),
}

impl FromStr for MoveToken {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(MoveParseError::Empty)?;
        let face = Face::from_letter(letter).ok_or(MoveParseError::UnknownFace(letter))?;
        let modifier = match chars.as_str() {
            "" => Modifier::None,
            "'" => Modifier::Prime,
            "2" => Modifier::Double,
            _ => return Err(MoveParseError::InvalidModifier(s.to_string())),
        };
        Ok(MoveToken { face, modifier })
    }
}

/// Parse a whitespace separated move list.
pub fn parse_move_list(text: &str) -> Result<Vec<MoveToken>, MoveParseError> {
    text.split_whitespace().map(str::parse).collect()
}

/// Render a move list the way solvers print it.
pub fn format_move_list(moves: &[MoveToken]) -> String {
    moves
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Tests ──────────────────────────────────────────────────────────
