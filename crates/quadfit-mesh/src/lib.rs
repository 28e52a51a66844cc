#![warn(missing_docs)]

//! Triangle mesh container for quadric fitting.
//!
//! The fitter only reads vertex positions and triangle index triples.
//! This crate holds that data, validates it into concrete [`Triangle`]s,
//! and provides a few procedural meshes (see [`primitives`]) that sample
//! known quadrics.

pub mod primitives;

use quadfit_math::{Point3, Transform, Vec3};
use thiserror::Error;

pub use primitives::{height_field, icosphere, open_cylinder};

/// Errors raised while reading a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but mesh has {num_vertices} vertices")]
    IndexOutOfRange {
        /// Triangle index.
        triangle: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        num_vertices: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangles as vertex index triples.
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Create a mesh from vertices and triangles.
    pub fn new(vertices: Vec<Point3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Resolve every index triple into a [`Triangle`].
    ///
    /// Fails on the first out-of-range index or non-finite vertex.
    pub fn extract_triangles(&self) -> Result<Vec<Triangle>> {
        if let Some(i) = self
            .vertices
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex(i));
        }

        let n = self.vertices.len();
        self.triangles
            .iter()
            .enumerate()
            .map(|(t, tri)| -> Result<Triangle> {
                let mut corners = [Point3::origin(); 3];
                for (corner, &index) in corners.iter_mut().zip(tri) {
                    *corner = *self.vertices.get(index as usize).ok_or(
                        MeshError::IndexOutOfRange {
                            triangle: t,
                            index,
                            num_vertices: n,
                        },
                    )?;
                }
                Ok(Triangle::new(corners))
            })
            .collect()
    }

    /// Total surface area (sum of triangle areas).
    ///
    /// Fails like [`TriMesh::extract_triangles`] on invalid input.
    pub fn area(&self) -> Result<f64> {
        Ok(self.extract_triangles()?.iter().map(Triangle::area).sum())
    }

    /// Copy of this mesh with every vertex transformed.
    pub fn transformed(&self, t: &Transform) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| t.apply_point(p)).collect(),
            triangles: self.triangles.clone(),
        }
    }
}

/// A single triangle with resolved corner positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner positions.
    pub corners: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from its three corners.
    pub fn new(corners: [Point3; 3]) -> Self {
        Self { corners }
    }

    /// Unnormalized normal `(b - a) × (c - a)`; its length is twice the area.
    pub fn cross(&self) -> Vec3 {
        let [a, b, c] = self.corners;
        (b - a).cross(&(c - a))
    }

    /// Planar area.
    pub fn area(&self) -> f64 {
        0.5 * self.cross().norm()
    }

    /// Centroid (mass center).
    pub fn centroid(&self) -> Point3 {
        let [a, b, c] = self.corners;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }
}
