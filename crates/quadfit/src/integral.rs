//! Surface integrals of monomials over a single triangle.
//!
//! The moment matrices need `∫ x^i y^j z^k dA` for every exponent triple of
//! total degree at most four. Two rules are available: a four-point average
//! (three corners plus the centroid), exact for degree ≤ 1, and the exact
//! closed form obtained by expanding each coordinate in barycentric terms.

use quadfit_mesh::Triangle;
use serde::{Deserialize, Serialize};

/// Highest total degree of the integrated monomials.
pub const MAX_DEGREE: usize = 4;

const N: usize = MAX_DEGREE + 1;

// 0! ..= 6!; the exact rule divides by (degree + 2)!.
const FACTORIAL: [f64; MAX_DEGREE + 3] = [1.0, 1.0, 2.0, 6.0, 24.0, 120.0, 720.0];

/// Integration rule for monomials over a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrature {
    /// Average of the three corners and the centroid, times the area.
    #[default]
    FourPoint,
    /// Closed-form multinomial expansion; exact for polynomials.
    Exact,
}

/// Integrals of all monomials `x^i y^j z^k` with `i + j + k <= 4` over one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonomialIntegrals {
    values: [[[f64; N]; N]; N],
}

impl MonomialIntegrals {
    /// `∫ x^i y^j z^k dA` for `exponents = [i, j, k]`.
    ///
    /// Exponent triples above the supported degree read as zero.
    pub fn get(&self, [i, j, k]: [usize; 3]) -> f64 {
        if i + j + k > MAX_DEGREE {
            return 0.0;
        }
        self.values[i][j][k]
    }
}

impl Quadrature {
    /// Integrate every monomial of degree ≤ 4 over `tri`.
    pub fn integrate(&self, tri: &Triangle) -> MonomialIntegrals {
        match self {
            Self::FourPoint => four_point(tri),
            Self::Exact => exact(tri),
        }
    }
}

/// `powers[axis][e] = coordinate^e` for one point.
fn powers(coords: [f64; 3]) -> [[f64; N]; 3] {
    let mut out = [[1.0; N]; 3];
    for (axis, row) in out.iter_mut().enumerate() {
        for e in 1..N {
            row[e] = row[e - 1] * coords[axis];
        }
    }
    out
}

/// All `[a, b, c]` with `a + b + c == m`.
fn compositions(m: usize) -> impl Iterator<Item = [usize; 3]> {
    (0..=m).flat_map(move |a| (0..=m - a).map(move |b| [a, b, m - a - b]))
}

fn exponents() -> impl Iterator<Item = [usize; 3]> {
    (0..=MAX_DEGREE).flat_map(compositions)
}

fn four_point(tri: &Triangle) -> MonomialIntegrals {
    let centroid = tri.centroid();
    let samples = [tri.corners[0], tri.corners[1], tri.corners[2], centroid]
        .map(|p| powers([p.x, p.y, p.z]));
    let weight = tri.area() / 4.0;

    let mut values = [[[0.0; N]; N]; N];
    for [i, j, k] in exponents() {
        values[i][j][k] = weight
            * samples
                .iter()
                .map(|pw| pw[0][i] * pw[1][j] * pw[2][k])
                .sum::<f64>();
    }
    MonomialIntegrals { values }
}

fn multinomial(m: usize, [a, b, c]: [usize; 3]) -> f64 {
    FACTORIAL[m] / (FACTORIAL[a] * FACTORIAL[b] * FACTORIAL[c])
}

// ∫ x^m y^n z^p = 2A Σ multi(m;i,j,k) multi(n;l,s,t) multi(p;a,b,c)
//                 · x₁^i x₂^j x₃^k · y₁^l y₂^s y₃^t · z₁^a z₂^b z₃^c
//                 · (i+l+a)! (j+s+b)! (k+t+c)! / (m+n+p+2)!
fn exact(tri: &Triangle) -> MonomialIntegrals {
    let corners = tri.corners.map(|p| powers([p.x, p.y, p.z]));
    let twice_area = 2.0 * tri.area();

    // Product of corner powers for one coordinate split across the corners.
    let split = |axis: usize, parts: [usize; 3]| -> f64 {
        (0..3).map(|v| corners[v][axis][parts[v]]).product()
    };

    let mut values = [[[0.0; N]; N]; N];
    for [m, n, p] in exponents() {
        let mut sum = 0.0;
        for xs in compositions(m) {
            let fx = multinomial(m, xs) * split(0, xs);
            for ys in compositions(n) {
                let fy = multinomial(n, ys) * split(1, ys);
                for zs in compositions(p) {
                    let fz = multinomial(p, zs) * split(2, zs);
                    let barycentric = FACTORIAL[xs[0] + ys[0] + zs[0]]
                        * FACTORIAL[xs[1] + ys[1] + zs[1]]
                        * FACTORIAL[xs[2] + ys[2] + zs[2]];
                    sum += fx * fy * fz * barycentric;
                }
            }
        }
        values[m][n][p] = twice_area * sum / FACTORIAL[m + n + p + 2];
    }
    MonomialIntegrals { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quadfit_math::Point3;

    fn unit_right_triangle() -> Triangle {
        Triangle::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    fn skew_triangle() -> Triangle {
        Triangle::new([
            Point3::new(0.3, -1.2, 2.0),
            Point3::new(1.7, 0.4, -0.5),
            Point3::new(-0.8, 2.1, 0.9),
        ])
    }

    #[test]
    fn test_compositions() {
        let all: Vec<_> = compositions(2).collect();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|c| c.iter().sum::<usize>() == 2));
        assert_eq!(exponents().count(), 35);
    }

    #[test]
    fn test_constant_integrates_to_area() {
        let tri = skew_triangle();
        for rule in [Quadrature::FourPoint, Quadrature::Exact] {
            assert_relative_eq!(rule.integrate(&tri).get([0, 0, 0]), tri.area(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rules_agree_for_linear_monomials() {
        let tri = skew_triangle();
        let approx = Quadrature::FourPoint.integrate(&tri);
        let exact = Quadrature::Exact.integrate(&tri);
        for e in [[1, 0, 0], [0, 1, 0], [0, 0, 1]] {
            assert_relative_eq!(approx.get(e), exact.get(e), epsilon = 1e-12);
        }
        let c = tri.centroid();
        assert_relative_eq!(exact.get([0, 1, 0]), tri.area() * c.y, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_quadratic_moments() {
        let exact = Quadrature::Exact.integrate(&unit_right_triangle());
        assert_relative_eq!(exact.get([2, 0, 0]), 1.0 / 12.0, epsilon = 1e-14);
        assert_relative_eq!(exact.get([1, 1, 0]), 1.0 / 24.0, epsilon = 1e-14);
        assert_relative_eq!(exact.get([4, 0, 0]), 1.0 / 30.0, epsilon = 1e-14);
        assert_eq!(exact.get([0, 0, 2]), 0.0);
    }

    #[test]
    fn test_four_point_quadratic_moment() {
        // (0 + 1 + 0 + 1/9) / 4 * 1/2
        let approx = Quadrature::FourPoint.integrate(&unit_right_triangle());
        assert_relative_eq!(approx.get([2, 0, 0]), 5.0 / 36.0, epsilon = 1e-14);
    }

    #[test]
    fn test_exact_is_corner_order_independent() {
        let tri = skew_triangle();
        let [a, b, c] = tri.corners;
        let rotated = Triangle::new([c, a, b]);
        let lhs = Quadrature::Exact.integrate(&tri);
        let rhs = Quadrature::Exact.integrate(&rotated);
        for e in exponents() {
            assert_relative_eq!(lhs.get(e), rhs.get(e), epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_degree_above_four_reads_zero() {
        let exact = Quadrature::Exact.integrate(&skew_triangle());
        assert_eq!(exact.get([3, 2, 0]), 0.0);
    }
}
