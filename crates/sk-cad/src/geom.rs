//! Geometric value types
//!
//! Points, vectors, directions and axes are plain values. They never live in
//! the kernel's handle table; the kernel only sees them as arguments.

use glam::DVec3;

use crate::kernel::{CadError, CadResult};

/// Magnitude below which a vector cannot be turned into a direction
pub const DIRECTION_EPSILON: f64 = 1e-7;

/// A point in model space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(DVec3);

impl Point {
    /// The origin
    pub const ORIGIN: Self = Self(DVec3::ZERO);

    /// Create a point from its coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Whether every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn to_dvec3(self) -> DVec3 {
        self.0
    }

    /// Distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.0.distance(other.0)
    }
}

impl From<DVec3> for Point {
    fn from(value: DVec3) -> Self {
        Self(value)
    }
}

/// A free vector (displacement) in model space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector(DVec3);

impl Vector {
    /// Create a vector from its components
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.0.length()
    }

    pub fn to_dvec3(self) -> DVec3 {
        self.0
    }
}

impl From<DVec3> for Vector {
    fn from(value: DVec3) -> Self {
        Self(value)
    }
}

/// A unit-length direction
///
/// The only way to obtain one is through normalization, so the magnitude is
/// always 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction(DVec3);

impl Direction {
    /// +X
    pub const X: Self = Self(DVec3::X);
    /// +Y
    pub const Y: Self = Self(DVec3::Y);
    /// +Z
    pub const Z: Self = Self(DVec3::Z);

    /// Create a direction by normalizing `(x, y, z)`
    ///
    /// Fails for non-finite components or a magnitude below
    /// [`DIRECTION_EPSILON`].
    pub fn new(x: f64, y: f64, z: f64) -> CadResult<Self> {
        Self::from_dvec3(DVec3::new(x, y, z))
    }

    /// Normalize an arbitrary vector into a direction
    pub fn from_dvec3(value: DVec3) -> CadResult<Self> {
        if !value.is_finite() {
            return Err(CadError::InvalidArgument(format!(
                "direction components must be finite, got {value}"
            )));
        }
        let length = value.length();
        if length < DIRECTION_EPSILON {
            return Err(CadError::InvalidArgument(format!(
                "direction magnitude {length:e} is too small to normalize"
            )));
        }
        Ok(Self(value / length))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// The opposite direction
    pub fn reversed(&self) -> Self {
        Self(-self.0)
    }

    pub fn to_dvec3(self) -> DVec3 {
        self.0
    }

    /// A unit vector perpendicular to this direction
    ///
    /// Deterministic: crosses with +Z unless the direction is nearly
    /// parallel to it, in which case +X is used.
    pub fn perpendicular(&self) -> DVec3 {
        let up = if self.0.z.abs() < 0.9 {
            DVec3::Z
        } else {
            DVec3::X
        };
        self.0.cross(up).normalize()
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::Z
    }
}

/// An oriented axis: origin plus direction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axis {
    /// Origin point of the axis
    pub origin: Point,
    /// Direction of the axis
    pub direction: Direction,
}

impl Axis {
    /// Create an axis from origin and direction
    pub fn new(origin: Point, direction: Direction) -> Self {
        Self { origin, direction }
    }

    /// X axis at origin
    pub fn x() -> Self {
        Self::new(Point::ORIGIN, Direction::X)
    }

    /// Y axis at origin
    pub fn y() -> Self {
        Self::new(Point::ORIGIN, Direction::Y)
    }

    /// Z axis at origin
    pub fn z() -> Self {
        Self::new(Point::ORIGIN, Direction::Z)
    }
}
