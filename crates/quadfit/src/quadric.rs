//! The implicit quadric and its point queries.

use quadfit_math::{Mat3, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{QuadricError, Result};

/// Number of polynomial coefficients of a quadric.
pub const NUM_COEFFS: usize = 10;

/// Implicit quadric surface `f(p) = 0`.
///
/// Coefficients are ordered `1, x, y, z, x², xy, xz, y², yz, z²`. The
/// value is immutable; every query is computed from the coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; NUM_COEFFS]", into = "[f64; NUM_COEFFS]")]
pub struct Quadric {
    coeffs: [f64; NUM_COEFFS],
}

/// Matrix form `pᵗQp + Pᵗp + R` of a quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixForm {
    /// Symmetric quadratic-form matrix.
    pub q: Mat3,
    /// Linear term.
    pub p: Vec3,
    /// Constant term.
    pub r: f64,
}

/// A scalar field sampled at points, e.g. by an isosurface extractor.
pub trait ScalarField {
    /// Field value at `p`.
    fn value(&self, p: &Point3) -> f64;
}

impl Quadric {
    /// Create a quadric from its ten coefficients.
    ///
    /// Fails if all coefficients are zero or any is not finite.
    pub fn new(coeffs: [f64; NUM_COEFFS]) -> Result<Self> {
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(QuadricError::UndefinedInput(
                "quadric coefficients must be finite".into(),
            ));
        }
        if coeffs.iter().all(|&c| c == 0.0) {
            return Err(QuadricError::UndefinedInput(
                "all quadric coefficients are zero".into(),
            ));
        }
        Ok(Self { coeffs })
    }

    /// Coefficients in `1, x, y, z, x², xy, xz, y², yz, z²` order.
    pub fn coeffs(&self) -> &[f64; NUM_COEFFS] {
        &self.coeffs
    }

    /// Same surface, scaled so the largest coefficient magnitude is 1.
    pub fn normalized(&self) -> Self {
        let max = self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        Self {
            coeffs: self.coeffs.map(|c| c / max),
        }
    }

    /// Split into quadratic-form matrix, linear term and constant.
    pub fn matrix_form(&self) -> MatrixForm {
        let c = &self.coeffs;
        MatrixForm {
            q: Mat3::new(
                c[4],
                c[5] / 2.0,
                c[6] / 2.0,
                c[5] / 2.0,
                c[7],
                c[8] / 2.0,
                c[6] / 2.0,
                c[8] / 2.0,
                c[9],
            ),
            p: Vec3::new(c[1], c[2], c[3]),
            r: c[0],
        }
    }

    /// Polynomial value at `p`.
    pub fn eval(&self, p: &Point3) -> f64 {
        let c = &self.coeffs;
        let (x, y, z) = (p.x, p.y, p.z);
        c[0] + c[1] * x
            + c[2] * y
            + c[3] * z
            + c[4] * x * x
            + c[5] * x * y
            + c[6] * x * z
            + c[7] * y * y
            + c[8] * y * z
            + c[9] * z * z
    }

    /// Analytic gradient at `p`.
    pub fn grad(&self, p: &Point3) -> Vec3 {
        let c = &self.coeffs;
        let (x, y, z) = (p.x, p.y, p.z);
        Vec3::new(
            c[1] + 2.0 * c[4] * x + c[5] * y + c[6] * z,
            c[2] + c[5] * x + 2.0 * c[7] * y + c[8] * z,
            c[3] + c[6] * x + c[8] * y + 2.0 * c[9] * z,
        )
    }

    /// Approximate Euclidean distance from `p` to the surface.
    ///
    /// Taubin's second-order bound: the smallest positive root `δ` of
    /// `a δ² + b δ + c = 0` with `a = -‖second-order part‖`,
    /// `b = -‖∇f(p)‖`, `c = |f(p)|`.
    ///
    /// Fails with [`QuadricError::DistanceDomain`] when the quadric has no
    /// second-order terms (`a = 0`) or the discriminant is negative.
    pub fn distance(&self, p: &Point3) -> Result<f64> {
        let c = &self.coeffs;
        let a = -((c[5] * c[5] + c[6] * c[6] + c[8] * c[8]) / 2.0
            + c[4] * c[4]
            + c[7] * c[7]
            + c[9] * c[9])
            .sqrt();
        if a == 0.0 {
            return Err(QuadricError::DistanceDomain(
                "quadric has no second-order terms".into(),
            ));
        }
        let b = -self.grad(p).norm();
        let c = self.eval(p).abs();
        let disc = b * b - 4.0 * a * c;
        if !(disc >= 0.0) {
            return Err(QuadricError::DistanceDomain(format!(
                "negative discriminant {disc}"
            )));
        }
        let d = (-b - disc.sqrt()) / (2.0 * a);
        if !d.is_finite() {
            return Err(QuadricError::DistanceDomain(format!(
                "non-finite distance at ({}, {}, {})",
                p.x, p.y, p.z
            )));
        }
        Ok(d)
    }
}

impl TryFrom<[f64; NUM_COEFFS]> for Quadric {
    type Error = QuadricError;

    fn try_from(coeffs: [f64; NUM_COEFFS]) -> Result<Self> {
        Self::new(coeffs)
    }
}

impl From<Quadric> for [f64; NUM_COEFFS] {
    fn from(q: Quadric) -> Self {
        q.coeffs
    }
}

impl ScalarField for Quadric {
    fn value(&self, p: &Point3) -> f64 {
        self.eval(p)
    }
}
