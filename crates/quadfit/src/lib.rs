#![warn(missing_docs)]

//! Quadric surface fitting for triangle meshes.
//!
//! This crate fits an implicit quadric `f(x, y, z) = 0` to a triangle mesh
//! by minimizing the mean squared algebraic residual over the surface,
//! names the type of the fitted surface from the eigen-structure of its
//! quadratic form, and approximates the distance from a point to it.
//!
//! # Example
//!
//! ```ignore
//! use quadfit::{fit, FitSettings, QuadricType};
//! use quadfit_mesh::icosphere;
//!
//! let mesh = icosphere(1.0, 3);
//! let quadric = fit(&mesh, &FitSettings::default())?;
//! assert_eq!(quadric.classify(1e-8)?, QuadricType::Ellipsoid);
//! println!("distance: {}", quadric.distance(&[0.0, 0.0, 2.0].into())?);
//! ```

pub mod classify;
pub mod error;
pub mod integral;
pub mod moments;
pub mod quadric;
pub mod solver;

pub use classify::{classify_form, QuadricType};
pub use error::{QuadricError, Result};
pub use integral::{MonomialIntegrals, Quadrature};
pub use moments::{MomentAccumulator, MomentMatrices, MomentMatrix, BASIS};
pub use quadric::{MatrixForm, Quadric, ScalarField, NUM_COEFFS};
pub use solver::{CoefficientSolver, GeneralizedEigenSolver};

use nalgebra::SVector;
use quadfit_math::DEFAULT_TOLERANCE;
use quadfit_mesh::TriMesh;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fitting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    /// Eigenvalues of the gradient moment matrix at or below this are zero.
    pub tolerance: f64,
    /// Per-triangle integration rule.
    pub quadrature: Quadrature,
    /// Accumulate triangle moments in parallel.
    pub parallel: bool,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            quadrature: Quadrature::FourPoint,
            parallel: true,
        }
    }
}

impl FitSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(QuadricError::InvalidSettings(
                "tolerance must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// A fitted quadric together with fit statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// The fitted surface.
    pub quadric: Quadric,
    /// Total mesh area.
    pub total_area: f64,
    /// Number of triangles accumulated.
    pub triangle_count: usize,
    /// Mean squared algebraic residual `cᵗMc` of the fit.
    pub residual: f64,
}

/// Fit a quadric to `mesh`.
pub fn fit(mesh: &TriMesh, settings: &FitSettings) -> Result<Quadric> {
    fit_with_report(mesh, settings, &GeneralizedEigenSolver::default()).map(|r| r.quadric)
}

/// Fit a quadric to `mesh` with a specific solver, reporting fit statistics.
///
/// This is the main entry point for fitting. It:
/// 1. Accumulates the area-normalized moment matrices
/// 2. Solves the constrained minimization for the coefficients
/// 3. Evaluates the residual of the solution
pub fn fit_with_report(
    mesh: &TriMesh,
    settings: &FitSettings,
    solver: &dyn CoefficientSolver,
) -> Result<FitReport> {
    settings.validate()?;

    info!(
        triangles = mesh.num_triangles(),
        quadrature = ?settings.quadrature,
        parallel = settings.parallel,
        "fitting quadric"
    );

    let accumulator = MomentAccumulator {
        quadrature: settings.quadrature,
        parallel: settings.parallel,
    };
    let moments = accumulator.accumulate(mesh)?;

    let coeffs = solver.solve(&moments.m, &moments.n, settings.tolerance)?;
    let quadric = Quadric::new(coeffs)?;

    let c = SVector::<f64, NUM_COEFFS>::from(coeffs);
    let residual = c.dot(&(moments.m * c));

    info!(
        area = moments.total_area,
        triangles = moments.triangle_count,
        residual,
        "fitted quadric"
    );

    Ok(FitReport {
        quadric,
        total_area: moments.total_area,
        triangle_count: moments.triangle_count,
        residual,
    })
}

impl Quadric {
    /// Fit a quadric to `mesh` with default settings.
    pub fn fit(mesh: &TriMesh) -> Result<Self> {
        fit(mesh, &FitSettings::default())
    }
}
