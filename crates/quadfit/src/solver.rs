//! Coefficient solvers: moment matrices in, quadric coefficients out.
//!
//! The fit minimizes the mean squared algebraic residual `cᵗMc` subject to
//! the gradient normalization `cᵗNc = 1`, i.e. the generalized eigenproblem
//! `Mc = λNc` for the smallest λ. `N` is only semidefinite (the constant
//! monomial has no gradient), so directions it does not constrain are
//! eliminated before the reduced eigensolve. All decompositions go through
//! the SVD, which stays accurate for repeated eigenvalues.

use nalgebra::{DMatrix, DVector};

use crate::error::{QuadricError, Result};
use crate::moments::MomentMatrix;
use crate::quadric::NUM_COEFFS;

/// Solves for quadric coefficients given accumulated moment matrices.
pub trait CoefficientSolver: Send + Sync {
    /// Coefficients minimizing `cᵗMc` subject to `cᵗNc = 1`.
    ///
    /// Eigenvalues of `N` at or below `tolerance` are treated as zero.
    fn solve(
        &self,
        m: &MomentMatrix,
        n: &MomentMatrix,
        tolerance: f64,
    ) -> Result<[f64; NUM_COEFFS]>;
}

/// Generalized symmetric eigensolver with null-space elimination.
#[derive(Debug, Clone, Copy)]
pub struct GeneralizedEigenSolver {
    /// Iteration cap for each singular value decomposition.
    pub max_iterations: usize,
}

impl Default for GeneralizedEigenSolver {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}

/// Eigenvalues and eigenvectors (as columns) of a symmetric matrix.
struct Decomposition {
    values: DVector<f64>,
    vectors: DMatrix<f64>,
}

// Reduced eigenpairs whose residual exceeds this (relative to the largest
// eigenvalue) are rejected.
const EIGENPAIR_RESIDUAL: f64 = 1e-6;

impl GeneralizedEigenSolver {
    /// Decompose a symmetric positive semidefinite matrix through its SVD.
    ///
    /// For such a matrix the left singular vectors are eigenvectors and the
    /// singular values are the eigenvalues. Unlike `SymmetricEigen`, the
    /// SVD returns an orthonormal eigenbasis even for clustered eigenvalues.
    fn decompose(&self, m: DMatrix<f64>, what: &str) -> Result<Decomposition> {
        let svd = m
            .try_svd(true, false, f64::EPSILON, self.max_iterations)
            .ok_or_else(|| {
                QuadricError::SolverFailure(format!("{what} decomposition did not converge"))
            })?;
        let vectors = svd.u.ok_or_else(|| {
            QuadricError::SolverFailure(format!("{what} decomposition has no singular vectors"))
        })?;
        Ok(Decomposition {
            values: svd.singular_values,
            vectors,
        })
    }

    /// Inverse of a symmetric positive definite matrix via its decomposition.
    ///
    /// Fails if any eigenvalue is at or below `tolerance`.
    fn inverse_spd(&self, m: DMatrix<f64>, tolerance: f64) -> Result<DMatrix<f64>> {
        let d = self.decompose(m, "null-space moment")?;
        if d.values.iter().any(|&l| l <= tolerance) {
            return Err(QuadricError::SolverFailure(
                "data moments are singular on the unconstrained subspace".into(),
            ));
        }
        let scaled = DMatrix::from_fn(d.vectors.nrows(), d.vectors.ncols(), |r, c| {
            d.vectors[(r, c)] / d.values[c]
        });
        Ok(scaled * d.vectors.transpose())
    }
}

impl CoefficientSolver for GeneralizedEigenSolver {
    fn solve(
        &self,
        m: &MomentMatrix,
        n: &MomentMatrix,
        tolerance: f64,
    ) -> Result<[f64; NUM_COEFFS]> {
        let m = DMatrix::from_column_slice(NUM_COEFFS, NUM_COEFFS, m.as_slice());
        let n = DMatrix::from_column_slice(NUM_COEFFS, NUM_COEFFS, n.as_slice());

        let n_eig = self.decompose(n, "constraint")?;
        let (range, null): (Vec<usize>, Vec<usize>) =
            (0..NUM_COEFFS).partition(|&i| n_eig.values[i] > tolerance);
        if range.is_empty() {
            return Err(QuadricError::SolverFailure(
                "constraint matrix has no eigenvalue above tolerance".into(),
            ));
        }

        // Range of N, whitened so that SᵗNS = I.
        let s = DMatrix::from_fn(NUM_COEFFS, range.len(), |r, c| {
            n_eig.vectors[(r, range[c])] / n_eig.values[range[c]].sqrt()
        });

        // c = S y + Z t; for fixed y, cᵗMc is minimized by
        // t = -(ZᵗMZ)⁻¹ ZᵗMS y, which leaves cᵗNc = yᵗy unchanged.
        let basis = if null.is_empty() {
            s
        } else {
            let z = DMatrix::from_fn(NUM_COEFFS, null.len(), |r, c| {
                n_eig.vectors[(r, null[c])]
            });
            let mz = &m * &z;
            let zmz_inv = self.inverse_spd(z.transpose() * &mz, tolerance)?;
            let t = -(zmz_inv * mz.transpose() * &s);
            &s + z * t
        };

        let reduced = basis.transpose() * &m * &basis;
        let reduced = (&reduced + reduced.transpose()) * 0.5;
        let r_eig = self.decompose(reduced.clone(), "reduced moment")?;
        let smallest = r_eig.values.imin();
        let lambda = r_eig.values[smallest];
        let y = r_eig.vectors.column(smallest).into_owned();

        let scale = r_eig.values.max().max(1.0);
        let pair_residual = (&reduced * &y - &y * lambda).norm();
        if pair_residual.is_nan() || pair_residual > EIGENPAIR_RESIDUAL * scale {
            return Err(QuadricError::SolverFailure(format!(
                "smallest reduced eigenpair has residual {pair_residual:e}"
            )));
        }
        let c = &basis * y;

        let mut coeffs = [0.0; NUM_COEFFS];
        coeffs.copy_from_slice(c.as_slice());
        if coeffs.iter().any(|v| !v.is_finite()) || coeffs.iter().all(|&v| v == 0.0) {
            return Err(QuadricError::SolverFailure(
                "solution is degenerate".into(),
            ));
        }

        // Eigenvectors have arbitrary sign; make the dominant coefficient positive.
        let dominant = (0..NUM_COEFFS).fold(0, |best, i| {
            if coeffs[i].abs() > coeffs[best].abs() {
                i
            } else {
                best
            }
        });
        if coeffs[dominant] < 0.0 {
            coeffs.iter_mut().for_each(|v| *v = -*v);
        }
        Ok(coeffs)
    }
}
