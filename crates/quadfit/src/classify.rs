//! Algebraic type of a quadric from the eigenstructure of its quadratic form.
//!
//! The quadratic-form matrix `Q` is eigendecomposed and each eigenvalue is
//! snapped to zero with [`Tolerance::fuzzy`]. The number of zero eigenvalues
//! (the corank of `Q`) selects a branch; inside each branch the linear term
//! and constant, expressed in the eigenbasis, decide the final type.

use std::fmt;

use nalgebra::SymmetricEigen;
use quadfit_math::{Mat2, Mat3, Tolerance, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QuadricError, Result};
use crate::quadric::{MatrixForm, Quadric};

const EIGEN_MAX_ITERATIONS: usize = 1000;

/// Canonical type of a real quadric surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuadricType {
    /// `x² + y² + z² = 1`
    Ellipsoid,
    /// `x² + y² = z`
    EllipticParaboloid,
    /// `x² - y² = z`
    HyperbolicParaboloid,
    /// `x² + y² - z² = 1`
    #[serde(rename = "HYPERBOLOID_1SHEET")]
    Hyperboloid1Sheet,
    /// `x² + y² - z² = -1`
    #[serde(rename = "HYPERBOLOID_2SHEETS")]
    Hyperboloid2Sheets,
    /// `x² + y² = z²`
    EllipticCone,
    /// `x² + y² = 1`
    EllipticCylinder,
    /// `x² - y² = 1`
    HyperbolicCylinder,
    /// `x² = z`
    ParabolicCylinder,
    /// Two distinct real planes, parallel or intersecting.
    TwoPlanes,
    /// A single plane, including a doubled one (`x² = 0`).
    Plane,
    /// No real surface: empty set, or a degenerate point or line.
    NoSurface,
}

impl fmt::Display for QuadricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ellipsoid => "ellipsoid",
            Self::EllipticParaboloid => "elliptic paraboloid",
            Self::HyperbolicParaboloid => "hyperbolic paraboloid",
            Self::Hyperboloid1Sheet => "hyperboloid of one sheet",
            Self::Hyperboloid2Sheets => "hyperboloid of two sheets",
            Self::EllipticCone => "elliptic cone",
            Self::EllipticCylinder => "elliptic cylinder",
            Self::HyperbolicCylinder => "hyperbolic cylinder",
            Self::ParabolicCylinder => "parabolic cylinder",
            Self::TwoPlanes => "two planes",
            Self::Plane => "plane",
            Self::NoSurface => "no surface",
        };
        f.write_str(name)
    }
}

/// Sign analysis of the quadratic-form eigenvalues.
#[derive(Debug, Clone)]
struct Signature {
    /// Indices of non-zero eigenvalues, in decomposition order.
    nonzero: Vec<usize>,
    positive: usize,
    negative: usize,
}

impl Signature {
    fn new(eigenvalues: &Vec3, tol: Tolerance) -> Self {
        let mut sig = Self {
            nonzero: Vec::with_capacity(3),
            positive: 0,
            negative: 0,
        };
        for (i, &lambda) in eigenvalues.iter().enumerate() {
            let lambda = tol.fuzzy(lambda);
            if lambda == 0.0 {
                continue;
            }
            sig.nonzero.push(i);
            if lambda > 0.0 {
                sig.positive += 1;
            } else {
                sig.negative += 1;
            }
        }
        sig
    }

    fn zeros(&self) -> usize {
        3 - self.nonzero.len()
    }
}

impl Quadric {
    /// Classify this quadric, treating magnitudes `<= tolerance` as zero.
    ///
    /// The coefficients are first scaled so the largest magnitude is 1, so
    /// the result does not depend on the overall scale of the polynomial.
    pub fn classify(&self, tolerance: f64) -> Result<QuadricType> {
        classify_form(&self.normalized().matrix_form(), Tolerance::new(tolerance))
    }
}

/// Classify a quadric given in matrix form.
///
/// `tol` is applied to the entries as given, without rescaling.
pub fn classify_form(form: &MatrixForm, tol: Tolerance) -> Result<QuadricType> {
    let eigen = SymmetricEigen::try_new(form.q, f64::EPSILON, EIGEN_MAX_ITERATIONS).ok_or_else(
        || QuadricError::Computation("eigenvalue decomposition did not converge".into()),
    )?;
    let sig = Signature::new(&eigen.eigenvalues, tol);
    let eigenvector = |i: usize| -> Vec3 { eigen.eigenvectors.column(sig.nonzero[i]).into_owned() };

    let result = match sig.zeros() {
        3 => {
            if form.p != Vec3::zeros() {
                QuadricType::Plane
            } else {
                QuadricType::NoSurface
            }
        }
        2 => classify_rank_one(form, &sig, eigenvector(0), tol),
        1 => classify_rank_two(form, &sig, eigenvector(0), eigenvector(1), tol)?,
        _ => classify_full_rank(form, &sig, tol)?,
    };

    debug!(
        eigenvalues = ?eigen.eigenvalues.as_slice(),
        positive = sig.positive,
        negative = sig.negative,
        %result,
        "classified quadric"
    );
    Ok(result)
}

/// Orthonormal pair spanning the plane perpendicular to unit vector `w`.
///
/// Zeroes the larger of the first two components of `w` when building
/// the first vector so the result never degenerates.
fn perpendicular_basis(w: &Vec3) -> (Vec3, Vec3) {
    let w0 = if w.x.abs() > w.y.abs() {
        Vec3::new(-w.z, 0.0, w.x)
    } else {
        Vec3::new(0.0, w.z, -w.y)
    }
    .normalize();
    let w1 = w.cross(&w0);
    (w0, w1)
}

// Single non-zero eigenvalue: parabolic cylinder, or a pair of planes
// perpendicular to w2.
fn classify_rank_one(form: &MatrixForm, sig: &Signature, w2: Vec3, tol: Tolerance) -> QuadricType {
    let (w0, w1) = perpendicular_basis(&w2);
    let d0 = tol.fuzzy(w0.dot(&form.p));
    let d1 = tol.fuzzy(w1.dot(&form.p));
    if d0 != 0.0 || d1 != 0.0 {
        return QuadricType::ParabolicCylinder;
    }

    let e = w2.dot(&(form.q * w2));
    let d = w2.dot(&form.p);
    let r = tol.fuzzy(d * d / (4.0 * e) - form.r);
    let r = if sig.positive == 1 { r } else { -r };
    if r > 0.0 {
        QuadricType::TwoPlanes
    } else if r < 0.0 {
        QuadricType::NoSurface
    } else {
        QuadricType::Plane
    }
}

// Two non-zero eigenvalues: paraboloids when the linear term has a
// component along the null direction, cylinders (or planes) otherwise.
fn classify_rank_two(
    form: &MatrixForm,
    sig: &Signature,
    w1: Vec3,
    w2: Vec3,
    tol: Tolerance,
) -> Result<QuadricType> {
    let w0 = w1.cross(&w2);
    let w2 = w0.cross(&w1);

    if tol.fuzzy(w0.dot(&form.p)) != 0.0 {
        return Ok(if sig.positive == sig.negative {
            QuadricType::HyperbolicParaboloid
        } else {
            QuadricType::EllipticParaboloid
        });
    }

    let qw1 = form.q * w1;
    let qw2 = form.q * w2;
    let e = Mat2::new(w1.dot(&qw1), w1.dot(&qw2), w1.dot(&qw2), w2.dot(&qw2));
    let f = Vec2::new(w1.dot(&form.p), w2.dot(&form.p));
    let e_inv = e.try_inverse().ok_or_else(|| {
        QuadricError::Computation("restricted quadratic form is singular".into())
    })?;
    let r = tol.fuzzy(f.dot(&(e_inv * f)) / 4.0 - form.r);

    Ok(match (sig.positive, sig.negative) {
        (2, _) if r > 0.0 => QuadricType::EllipticCylinder,
        (_, 2) if r < 0.0 => QuadricType::EllipticCylinder,
        (2, _) | (_, 2) => QuadricType::NoSurface,
        _ if r != 0.0 => QuadricType::HyperbolicCylinder,
        _ => QuadricType::TwoPlanes,
    })
}

fn classify_full_rank(form: &MatrixForm, sig: &Signature, tol: Tolerance) -> Result<QuadricType> {
    let q_inv: Mat3 = form.q.try_inverse().ok_or_else(|| {
        QuadricError::Computation("quadratic form is singular".into())
    })?;
    let r = tol.fuzzy(form.p.dot(&(q_inv * form.p)) / 4.0 - form.r);

    Ok(match sig.positive {
        3 if r > 0.0 => QuadricType::Ellipsoid,
        3 => QuadricType::NoSurface,
        2 | 1 => {
            // One positive eigenvalue is the sign-flipped two-positive case.
            let r = if sig.positive == 2 { r } else { -r };
            if r > 0.0 {
                QuadricType::Hyperboloid1Sheet
            } else if r < 0.0 {
                QuadricType::Hyperboloid2Sheets
            } else {
                QuadricType::EllipticCone
            }
        }
        _ if r < 0.0 => QuadricType::Ellipsoid,
        _ => QuadricType::NoSurface,
    })
}
