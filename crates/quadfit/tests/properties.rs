//! Property-based tests for fitting, classification and point queries.
//!
//! Run with: cargo test -p quadfit --test properties

use std::f64::consts::PI;

use nalgebra::{Rotation3, Unit};
use proptest::prelude::*;
use quadfit::{Quadric, QuadricType};
use quadfit_math::{Mat3, Point3, Transform, Vec3};
use quadfit_mesh::icosphere;

// =============================================================================
// Strategies
// =============================================================================

/// Normal-form quadrics and their types.
const NORMAL_FORMS: [([f64; 10], QuadricType); 12] = [
    ([-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0], QuadricType::Ellipsoid),
    ([-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0], QuadricType::Hyperboloid1Sheet),
    ([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0], QuadricType::Hyperboloid2Sheets),
    ([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0], QuadricType::EllipticCone),
    ([0.0, 0.0, 0.0, -1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0], QuadricType::EllipticParaboloid),
    ([0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, -1.0, 0.0, 0.0], QuadricType::HyperbolicParaboloid),
    ([-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0], QuadricType::EllipticCylinder),
    ([-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 0.0], QuadricType::HyperbolicCylinder),
    ([0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], QuadricType::ParabolicCylinder),
    ([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 0.0], QuadricType::TwoPlanes),
    ([-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], QuadricType::TwoPlanes),
    ([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0], QuadricType::NoSurface),
];

fn arb_coeffs() -> impl Strategy<Value = [f64; 10]> {
    prop::array::uniform10(-3.0..3.0f64)
        .prop_filter("quadratic part must not vanish", |c| {
            [4, 5, 6, 7, 8, 9].iter().any(|&i| c[i].abs() > 1e-3)
        })
}

fn arb_point() -> impl Strategy<Value = Point3> {
    prop::array::uniform3(-2.0..2.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_rotation() -> impl Strategy<Value = Rotation3<f64>> {
    (prop::array::uniform3(-1.0..1.0f64), 0.0..2.0 * PI)
        .prop_filter("axis must be well defined", |(a, _)| {
            Vec3::new(a[0], a[1], a[2]).norm() > 0.1
        })
        .prop_map(|([x, y, z], angle)| {
            Rotation3::from_axis_angle(&Unit::new_normalize(Vec3::new(x, y, z)), angle)
        })
}

/// Non-zero scale factors spanning `1e-9 ..= 1e9` in magnitude, either sign.
fn arb_scale() -> impl Strategy<Value = f64> {
    (-9.0..=9.0f64, any::<bool>()).prop_map(|(e, negative)| {
        let k = 10.0_f64.powf(e);
        if negative {
            -k
        } else {
            k
        }
    })
}

/// Coefficients of the surface `f` moved by `rotation` then `translation`.
fn moved(c: [f64; 10], rotation: &Rotation3<f64>, translation: Vec3) -> [f64; 10] {
    let form = Quadric::new(c).unwrap().matrix_form();
    let r = rotation.matrix();
    let q: Mat3 = r * form.q * r.transpose();
    let p = r * form.p - 2.0 * q * translation;
    let c0 = translation.dot(&(q * translation)) - (r * form.p).dot(&translation) + form.r;
    [
        c0,
        p.x,
        p.y,
        p.z,
        q[(0, 0)],
        2.0 * q[(0, 1)],
        2.0 * q[(0, 2)],
        q[(1, 1)],
        2.0 * q[(1, 2)],
        q[(2, 2)],
    ]
}

// =============================================================================
// Classification
// =============================================================================

proptest! {
    #[test]
    fn classification_is_invariant_under_rigid_motion_and_scaling(
        form in 0..NORMAL_FORMS.len(),
        rotation in arb_rotation(),
        t in prop::array::uniform3(-2.0..2.0f64),
        k in arb_scale(),
    ) {
        let (coeffs, expected) = NORMAL_FORMS[form];
        let c = moved(coeffs, &rotation, Vec3::new(t[0], t[1], t[2])).map(|v| v * k);
        let q = Quadric::new(c).unwrap();
        prop_assert_eq!(q.classify(1e-8).unwrap(), expected);
    }

    #[test]
    fn classification_is_invariant_under_scaling(c in arb_coeffs(), k in arb_scale()) {
        let q = Quadric::new(c).unwrap();
        let scaled = Quadric::new(c.map(|v| v * k)).unwrap();
        prop_assert_eq!(q.classify(1e-8).unwrap(), scaled.classify(1e-8).unwrap());
    }
}

// =============================================================================
// Point queries
// =============================================================================

proptest! {
    #[test]
    fn grad_matches_central_differences(c in arb_coeffs(), p in arb_point()) {
        let q = Quadric::new(c).unwrap();
        let h = 1e-5;
        let g = q.grad(&p);
        for axis in 0..3 {
            let mut step = Vec3::zeros();
            step[axis] = h;
            let numeric = (q.eval(&(p + step)) - q.eval(&(p - step))) / (2.0 * h);
            prop_assert!(
                (numeric - g[axis]).abs() < 1e-6,
                "axis {}: numeric {} vs analytic {}", axis, numeric, g[axis]
            );
        }
    }

    #[test]
    fn distance_is_non_negative_and_bounded(c in arb_coeffs(), p in arb_point()) {
        let q = Quadric::new(c).unwrap();
        let d = q.distance(&p).unwrap();
        prop_assert!(d >= 0.0 && d.is_finite());

        // Never exceeds the first-order estimate |f| / |∇f|
        let g = q.grad(&p).norm();
        if g > 1e-6 {
            prop_assert!(d <= q.eval(&p).abs() / g * (1.0 + 1e-9) + 1e-9);
        }
    }
}

// =============================================================================
// Fitting
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn moved_sphere_fits_an_ellipsoid(
        rotation in arb_rotation(),
        t in prop::array::uniform3(-3.0..3.0f64),
    ) {
        let (axis, angle) = rotation
            .axis_angle()
            .unwrap_or((Vec3::z_axis(), 0.0));
        let motion = Transform::rotation_about_axis(&axis, angle)
            .then(&Transform::translation(t[0], t[1], t[2]));
        let mesh = icosphere(1.0, 1).transformed(&motion);

        let q = Quadric::fit(&mesh).unwrap();
        prop_assert_eq!(q.classify(1e-6).unwrap(), QuadricType::Ellipsoid);

        // Center and a far point lie on opposite sides of the surface
        let center = motion.apply_point(&Point3::origin());
        let outside = center + Vec3::new(3.0, 0.0, 0.0);
        prop_assert!(q.eval(&center) * q.eval(&outside) < 0.0);
    }
}
