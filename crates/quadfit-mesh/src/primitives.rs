//! Procedural meshes that sample known quadrics.
//!
//! Every vertex lies exactly on the analytic surface; only triangle
//! interiors deviate from it.

use std::collections::HashMap;
use std::f64::consts::PI;

use quadfit_math::Point3;

use crate::TriMesh;

/// Icosphere of the given radius centered at the origin.
///
/// Starts from an icosahedron whose mirror planes are the coordinate
/// planes and splits each face into four, `subdivisions` times. Face
/// count is `20 * 4^subdivisions`.
pub fn icosphere(radius: f64, subdivisions: u32) -> TriMesh {
    let phi = 0.5 * (1.0 + 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let ico_verts = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    let ico_faces: [[u32; 3]; 20] = [
        [0, 1, 2],
        [3, 2, 1],
        [3, 4, 5],
        [3, 8, 4],
        [0, 6, 7],
        [0, 9, 6],
        [4, 10, 11],
        [6, 11, 10],
        [2, 5, 9],
        [11, 9, 5],
        [1, 7, 8],
        [10, 8, 7],
        [3, 5, 2],
        [3, 1, 8],
        [0, 2, 9],
        [0, 7, 1],
        [6, 9, 11],
        [6, 10, 7],
        [4, 11, 5],
        [4, 8, 10],
    ];

    let mut mesh = TriMesh::new(
        ico_verts
            .iter()
            .map(|&[x, y, z]| project_to_sphere(Point3::new(x, y, z), radius))
            .collect(),
        ico_faces.to_vec(),
    );

    for _ in 0..subdivisions {
        mesh = subdivide_sphere(&mesh, radius);
    }

    mesh
}

fn project_to_sphere(p: Point3, radius: f64) -> Point3 {
    Point3::from(p.coords * (radius / p.coords.norm()))
}

fn subdivide_sphere(mesh: &TriMesh, radius: f64) -> TriMesh {
    let mut vertices = mesh.vertices.clone();
    let mut triangles = Vec::with_capacity(mesh.triangles.len() * 4);
    let mut edge_midpoints: HashMap<(u32, u32), u32> = HashMap::new();

    for &[v0, v1, v2] in &mesh.triangles {
        let mut midpoint = |a: u32, b: u32| {
            let key = if a < b { (a, b) } else { (b, a) };
            *edge_midpoints.entry(key).or_insert_with(|| {
                let m = (vertices[a as usize].coords + vertices[b as usize].coords) * 0.5;
                vertices.push(project_to_sphere(Point3::from(m), radius));
                (vertices.len() - 1) as u32
            })
        };
        let m01 = midpoint(v0, v1);
        let m12 = midpoint(v1, v2);
        let m20 = midpoint(v2, v0);

        triangles.push([v0, m01, m20]);
        triangles.push([v1, m12, m01]);
        triangles.push([v2, m20, m12]);
        triangles.push([m01, m12, m20]);
    }

    TriMesh::new(vertices, triangles)
}

/// Open cylinder `x² + y² = radius²` spanning `z ∈ [-height/2, height/2]`.
///
/// `segments` vertices around each ring, `rings + 1` rings along the axis.
/// No caps.
pub fn open_cylinder(radius: f64, height: f64, segments: u32, rings: u32) -> TriMesh {
    let segments = segments.max(3);
    let rings = rings.max(1);

    let mut vertices = Vec::with_capacity(((rings + 1) * segments) as usize);
    for j in 0..=rings {
        let z = -0.5 * height + height * j as f64 / rings as f64;
        for i in 0..segments {
            let u = 2.0 * PI * i as f64 / segments as f64;
            vertices.push(Point3::new(radius * u.cos(), radius * u.sin(), z));
        }
    }

    let mut triangles = Vec::with_capacity((2 * rings * segments) as usize);
    for j in 0..rings {
        let row = j * segments;
        let next_row = (j + 1) * segments;
        for i in 0..segments {
            let i_next = (i + 1) % segments;
            triangles.push([row + i, row + i_next, next_row + i_next]);
            triangles.push([row + i, next_row + i_next, next_row + i]);
        }
    }

    TriMesh::new(vertices, triangles)
}

/// Height field `z = f(x, y)` over the square `[-half_extent, half_extent]²`.
///
/// The square is split into `n × n` cells, two triangles each.
pub fn height_field<F>(f: F, half_extent: f64, n: u32) -> TriMesh
where
    F: Fn(f64, f64) -> f64,
{
    let n = n.max(1);
    let step = 2.0 * half_extent / n as f64;

    let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for j in 0..=n {
        let y = -half_extent + step * j as f64;
        for i in 0..=n {
            let x = -half_extent + step * i as f64;
            vertices.push(Point3::new(x, y, f(x, y)));
        }
    }

    let stride = n + 1;
    let mut triangles = Vec::with_capacity((2 * n * n) as usize);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * stride + i;
            let v10 = v00 + 1;
            let v01 = v00 + stride;
            let v11 = v01 + 1;
            triangles.push([v00, v10, v11]);
            triangles.push([v00, v11, v01]);
        }
    }

    TriMesh::new(vertices, triangles)
}
