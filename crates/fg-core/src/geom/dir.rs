//! Cardinal directions and axes

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::Loc;

/// Orientation of a side or a hall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Axis4 {
    Horiz,
    Vert,
}

impl Axis4 {
    /// The perpendicular axis
    pub const fn orth(self) -> Axis4 {
        match self {
            Axis4::Horiz => Axis4::Vert,
            Axis4::Vert => Axis4::Horiz,
        }
    }
}

/// The four cardinal directions.
///
/// Declaration order (Down, Left, Up, Right) is the per-side order every
/// algorithm iterates in; randomized choices index into lists built in this
/// order, so changing it changes generated layouts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Dir4 {
    Down = 0,
    Left = 1,
    Up = 2,
    Right = 3,
}

impl Dir4 {
    pub const ALL: [Dir4; 4] = [Dir4::Down, Dir4::Left, Dir4::Up, Dir4::Right];

    /// Index into per-side arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn reverse(self) -> Dir4 {
        match self {
            Dir4::Down => Dir4::Up,
            Dir4::Left => Dir4::Right,
            Dir4::Up => Dir4::Down,
            Dir4::Right => Dir4::Left,
        }
    }

    /// Axis of travel. Down/Up travel vertically.
    pub const fn axis(self) -> Axis4 {
        match self {
            Dir4::Down | Dir4::Up => Axis4::Vert,
            Dir4::Left | Dir4::Right => Axis4::Horiz,
        }
    }

    /// Unit step
    pub const fn to_loc(self) -> Loc {
        match self {
            Dir4::Down => Loc::new(0, 1),
            Dir4::Left => Loc::new(-1, 0),
            Dir4::Up => Loc::new(0, -1),
            Dir4::Right => Loc::new(1, 0),
        }
    }

    /// True when travel increases the coordinate
    pub const fn is_positive(self) -> bool {
        matches!(self, Dir4::Down | Dir4::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_dir_order_matches_all() {
        let iterated: Vec<Dir4> = Dir4::iter().collect();
        assert_eq!(iterated, Dir4::ALL.to_vec());
        for (i, dir) in Dir4::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_reverse_is_involution() {
        for dir in Dir4::ALL {
            assert_eq!(dir.reverse().reverse(), dir);
            assert_eq!(dir.reverse().axis(), dir.axis());
            assert_eq!(dir.to_loc() + dir.reverse().to_loc(), Loc::ZERO);
        }
    }

    #[test]
    fn test_axis() {
        assert_eq!(Dir4::Down.axis(), Axis4::Vert);
        assert_eq!(Dir4::Left.axis(), Axis4::Horiz);
        assert_eq!(Axis4::Vert.orth(), Axis4::Horiz);
    }
}
