/// 2D vector primitives used for positions, sizes and offsets throughout
/// the atlas pipeline.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2i {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2i {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Vec2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2f {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2f {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Truncating conversion, matching integer pixel coordinates.
impl From<Vec2f> for Vec2i {
    fn from(v: Vec2f) -> Self {
        Self::new(v.x as i32, v.y as i32)
    }
}

impl fmt::Display for Vec2f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Parses `"x, y"` (comma-separated, whitespace tolerated).
impl FromStr for Vec2f {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let x = parts.next().map(str::trim).unwrap_or("");
        let y = parts.next().map(str::trim).unwrap_or("");
        if parts.next().is_some() {
            return Err(format!("invalid vector: {s}"));
        }
        let x = x.parse::<f32>().map_err(|_| format!("invalid vector: {s}"))?;
        let y = y.parse::<f32>().map_err(|_| format!("invalid vector: {s}"))?;
        Ok(Self::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2i_add_sub() {
        let a = Vec2i::new(3, 5);
        let b = Vec2i::new(1, -2);
        assert_eq!(a + b, Vec2i::new(4, 3));
        assert_eq!(a - b, Vec2i::new(2, 7));
    }

    #[test]
    fn test_vec2i_equality() {
        assert_eq!(Vec2i::new(2, 2), Vec2i::new(2, 2));
        assert_ne!(Vec2i::new(2, 2), Vec2i::new(2, 3));
        assert_eq!(Vec2i::ZERO, Vec2i::default());
    }

    #[test]
    fn test_vec2f_from_str() {
        assert_eq!("3, 4".parse::<Vec2f>().unwrap(), Vec2f::new(3.0, 4.0));
        assert_eq!("0.5,-2".parse::<Vec2f>().unwrap(), Vec2f::new(0.5, -2.0));
        assert!("3".parse::<Vec2f>().is_err());
        assert!("1, 2, 3".parse::<Vec2f>().is_err());
    }

    #[test]
    fn test_vec2f_truncates_to_vec2i() {
        assert_eq!(Vec2i::from(Vec2f::new(1.9, -1.9)), Vec2i::new(1, -1));
    }
}
