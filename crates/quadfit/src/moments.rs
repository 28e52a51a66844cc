//! Moment matrices of a triangle mesh over the quadric monomial basis.
//!
//! With basis `b = (1, x, y, z, x², xy, xz, y², yz, z²)`:
//! - `M[i][j] = ∫ bᵢ bⱼ dA` (data moments)
//! - `N[i][j] = ∫ ∇bᵢ · ∇bⱼ dA` (gradient moments, the constraint metric)
//!
//! Both are divided by the total surface area, so they are means over the
//! surface rather than sums.

use std::ops::Add;

use nalgebra::SMatrix;
use quadfit_mesh::{TriMesh, Triangle};
use rayon::prelude::*;
use tracing::warn;

use crate::error::{QuadricError, Result};
use crate::integral::{MonomialIntegrals, Quadrature};
use crate::quadric::NUM_COEFFS;

/// A symmetric 10x10 moment matrix.
pub type MomentMatrix = SMatrix<f64, NUM_COEFFS, NUM_COEFFS>;

/// Exponents `[x, y, z]` of the basis monomials, in coefficient order.
pub const BASIS: [[usize; 3]; NUM_COEFFS] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [2, 0, 0],
    [1, 1, 0],
    [1, 0, 1],
    [0, 2, 0],
    [0, 1, 1],
    [0, 0, 2],
];

/// Total degree of basis monomial `i`.
pub fn basis_degree(i: usize) -> usize {
    BASIS[i].iter().sum()
}

/// Area-normalized moment matrices of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentMatrices {
    /// Data moments `∫ bᵢ bⱼ / A`.
    pub m: MomentMatrix,
    /// Gradient moments `∫ ∇bᵢ · ∇bⱼ / A`.
    pub n: MomentMatrix,
    /// Total surface area `A`.
    pub total_area: f64,
    /// Number of triangles accumulated.
    pub triangle_count: usize,
}

/// Accumulates the moment matrices of a mesh.
///
/// Defaults to the four-point rule, running in parallel.
#[derive(Debug, Clone, Copy)]
pub struct MomentAccumulator {
    /// Integration rule for each triangle.
    pub quadrature: Quadrature,
    /// Sum triangle contributions on the rayon thread pool.
    pub parallel: bool,
}

/// Unnormalized running sums (lower triangles only).
#[derive(Debug, Clone, Copy)]
struct Partial {
    m: MomentMatrix,
    n: MomentMatrix,
    area: f64,
    degenerate: usize,
}

impl Partial {
    fn zero() -> Self {
        Self {
            m: MomentMatrix::zeros(),
            n: MomentMatrix::zeros(),
            area: 0.0,
            degenerate: 0,
        }
    }
}

impl Add for Partial {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            m: self.m + rhs.m,
            n: self.n + rhs.n,
            area: self.area + rhs.area,
            degenerate: self.degenerate + rhs.degenerate,
        }
    }
}

fn add_exponents(a: [usize; 3], b: [usize; 3]) -> [usize; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// `∫ ∂ₐbᵢ ∂ₐbⱼ` summed over the three axes.
///
/// `∂ₐ x^e = e[a] x^(e - unit(a))`, so each axis contributes
/// `e_i[a] e_j[a] ∫ x^(e_i + e_j - 2 unit(a))`.
fn gradient_moment(integrals: &MonomialIntegrals, ei: [usize; 3], ej: [usize; 3]) -> f64 {
    (0..3)
        .filter(|&a| ei[a] > 0 && ej[a] > 0)
        .map(|a| {
            let mut e = add_exponents(ei, ej);
            e[a] -= 2;
            (ei[a] * ej[a]) as f64 * integrals.get(e)
        })
        .sum()
}

impl Default for MomentAccumulator {
    fn default() -> Self {
        Self::new(Quadrature::default())
    }
}

impl MomentAccumulator {
    /// Accumulator with the given rule, running in parallel.
    pub fn new(quadrature: Quadrature) -> Self {
        Self {
            quadrature,
            parallel: true,
        }
    }

    /// Compute the moment matrices of `mesh`.
    ///
    /// Fails with [`QuadricError::UndefinedInput`] when the mesh has no
    /// triangles or zero total area, and with [`QuadricError::Mesh`] when it
    /// references missing or non-finite vertices.
    pub fn accumulate(&self, mesh: &TriMesh) -> Result<MomentMatrices> {
        if mesh.is_empty() {
            return Err(QuadricError::UndefinedInput("mesh has no triangles".into()));
        }
        let triangles = mesh.extract_triangles()?;

        let sum = if self.parallel {
            triangles
                .par_iter()
                .map(|tri| self.triangle_moments(tri))
                .reduce(Partial::zero, Partial::add)
        } else {
            triangles
                .iter()
                .map(|tri| self.triangle_moments(tri))
                .fold(Partial::zero(), Partial::add)
        };

        if sum.degenerate > 0 {
            warn!(
                degenerate = sum.degenerate,
                total = triangles.len(),
                "mesh contains zero-area triangles"
            );
        }
        if !(sum.area > 0.0) {
            return Err(QuadricError::UndefinedInput(
                "mesh has zero total area".into(),
            ));
        }

        let m = MomentMatrix::from_fn(|i, j| sum.m[(i.max(j), i.min(j))]) / sum.area;
        let n = MomentMatrix::from_fn(|i, j| sum.n[(i.max(j), i.min(j))]) / sum.area;

        Ok(MomentMatrices {
            m,
            n,
            total_area: sum.area,
            triangle_count: triangles.len(),
        })
    }

    fn triangle_moments(&self, tri: &Triangle) -> Partial {
        let area = tri.area();
        let mut partial = Partial::zero();
        if area == 0.0 {
            partial.degenerate = 1;
            return partial;
        }

        let integrals = self.quadrature.integrate(tri);
        for (i, &ei) in BASIS.iter().enumerate() {
            for (j, &ej) in BASIS.iter().enumerate().take(i + 1) {
                partial.m[(i, j)] = integrals.get(add_exponents(ei, ej));
                partial.n[(i, j)] = gradient_moment(&integrals, ei, ej);
            }
        }
        partial.area = area;
        partial
    }
}
