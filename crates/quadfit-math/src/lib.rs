#![warn(missing_docs)]

//! Math types for quadric fitting.
//!
//! Thin wrappers around nalgebra: points, vectors, small matrices,
//! affine transforms for preparing test geometry, and the zero
//! tolerance used by the classifier.

use nalgebra::{Matrix2, Matrix3, Rotation3, Unit, Vector2, Vector3};

/// Point in model space.
pub type Point3 = nalgebra::Point3<f64>;

/// Free vector in model space.
pub type Vec3 = Vector3<f64>;

/// Unit-length axis.
pub type Dir3 = Unit<Vector3<f64>>;

/// Two-component vector, used for restricted forms.
pub type Vec2 = Vector2<f64>;

/// 3x3 matrix (quadratic forms, eigenvectors).
pub type Mat3 = Matrix3<f64>;

/// 2x2 matrix (quadratic forms restricted to a plane).
pub type Mat2 = Matrix2<f64>;

/// Default zero threshold for eigenvalue and residual tests.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Affine map `p ↦ linear · p + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Linear part.
    pub linear: Mat3,
    /// Translation applied after the linear part.
    pub offset: Vec3,
}

impl Transform {
    /// The map that leaves every point in place.
    pub fn identity() -> Self {
        Self {
            linear: Mat3::identity(),
            offset: Vec3::zeros(),
        }
    }

    /// Shift by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            offset: Vec3::new(dx, dy, dz),
            ..Self::identity()
        }
    }

    /// Per-axis scaling about the origin.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            linear: Mat3::from_diagonal(&Vec3::new(sx, sy, sz)),
            ..Self::identity()
        }
    }

    /// Scaling by `s` on every axis.
    pub fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s, s)
    }

    /// Right-handed rotation by `angle` radians about `axis` through the origin.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        Self {
            linear: *Rotation3::from_axis_angle(axis, angle).matrix(),
            ..Self::identity()
        }
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform) -> Self {
        Self {
            linear: next.linear * self.linear,
            offset: next.linear * self.offset + next.offset,
        }
    }

    /// Image of `p`.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.linear * p.coords + self.offset)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Zero threshold for numeric classification.
///
/// A value whose magnitude is at most `zero` counts as zero; the
/// boundary itself is inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Magnitude at or below which a value is treated as zero.
    pub zero: f64,
}

impl Tolerance {
    /// Threshold of [`DEFAULT_TOLERANCE`].
    pub const DEFAULT: Self = Self {
        zero: DEFAULT_TOLERANCE,
    };

    /// Tolerance with the given zero threshold.
    pub fn new(zero: f64) -> Self {
        Self { zero }
    }

    /// Check if `x` is effectively zero.
    pub fn is_zero(&self, x: f64) -> bool {
        x.abs() <= self.zero
    }

    /// Snap `x` to exactly `0.0` when it is effectively zero, else return it unchanged.
    pub fn fuzzy(&self, x: f64) -> f64 {
        if self.is_zero(x) {
            0.0
        } else {
            x
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
