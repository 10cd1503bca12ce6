//! 2D integer point

use core::fmt;
use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::Axis4;

/// A point (or a size) on the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Loc {
    pub x: i32,
    pub y: i32,
}

impl Loc {
    pub const ZERO: Loc = Loc { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Same value on both axes
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v }
    }

    /// Component along an axis
    pub const fn scalar(&self, axis: Axis4) -> i32 {
        match axis {
            Axis4::Horiz => self.x,
            Axis4::Vert => self.y,
        }
    }

    /// Copy with the component along `axis` replaced
    pub const fn with_scalar(self, axis: Axis4, value: i32) -> Self {
        match axis {
            Axis4::Horiz => Self { x: value, y: self.y },
            Axis4::Vert => Self { x: self.x, y: value },
        }
    }

    /// Manhattan length
    pub fn dist4(self, other: Loc) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Area when used as a size
    pub const fn area(&self) -> i32 {
        self.x * self.y
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Loc {
    type Output = Loc;
    fn add(self, rhs: Loc) -> Loc {
        Loc::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Loc {
    fn add_assign(&mut self, rhs: Loc) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Loc {
    type Output = Loc;
    fn sub(self, rhs: Loc) -> Loc {
        Loc::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Loc {
    type Output = Loc;
    fn neg(self) -> Loc {
        Loc::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Loc {
    type Output = Loc;
    fn mul(self, rhs: i32) -> Loc {
        Loc::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_arithmetic() {
        let a = Loc::new(3, 4);
        let b = Loc::new(1, -2);
        assert_eq!(a + b, Loc::new(4, 2));
        assert_eq!(a - b, Loc::new(2, 6));
        assert_eq!(-a, Loc::new(-3, -4));
        assert_eq!(b * 3, Loc::new(3, -6));
        assert_eq!(a.dist4(b), 8);
    }

    #[test]
    fn test_loc_scalar() {
        let a = Loc::new(7, 9);
        assert_eq!(a.scalar(Axis4::Horiz), 7);
        assert_eq!(a.scalar(Axis4::Vert), 9);
        assert_eq!(a.with_scalar(Axis4::Vert, 1), Loc::new(7, 1));
    }
}
