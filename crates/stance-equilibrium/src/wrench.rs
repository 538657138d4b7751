//! Contact wrench cone and gravity wrench.
//!
//! Each contact's friction cone is approximated by `g` unit edges. An edge
//! `f` at contact point `p` is mapped into 6D gravito-inertial wrench space
//! by
//!
//! ```text
//! A = [   -I₃  ]
//!     [ [-p]×  ]
//! ```
//!
//! and the lifted edges of every contact form the columns of the generator
//! matrix `G` (6 x c·g). The body is in static equilibrium at CoM `c` iff
//! `G b = D c + d` has a solution `b >= 0`.

use std::f64::consts::TAU;

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX, Matrix6x3, Vector3, Vector6};
use stance_core::error::ValidationError;
use stance_core::math::cross_matrix;
use stance_core::types::{MIN_GENERATORS_PER_CONTACT, NORMAL_TOLERANCE, gravity};

/// Below this norm `n × Y` is degenerate and `n × X` is used instead.
const TANGENT_TOLERANCE: f64 = 1e-5;

// ---------------------------------------------------------------------------
// GravityWrench
// ---------------------------------------------------------------------------

/// Affine map from CoM position to the wrench contacts must provide:
/// `w(c) = D c + d` with `d = [m g; 0]` and `D = [0; [-m g]×]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GravityWrench {
    pub matrix: Matrix6x3<f64>,
    pub offset: Vector6<f64>,
}

impl GravityWrench {
    pub fn new(mass: f64) -> Self {
        let weight = gravity() * mass;
        let mut matrix = Matrix6x3::zeros();
        matrix
            .fixed_view_mut::<3, 3>(3, 0)
            .copy_from(&cross_matrix(&(-weight)));
        let mut offset = Vector6::zeros();
        offset.fixed_rows_mut::<3>(0).copy_from(&weight);
        Self { matrix, offset }
    }

    /// `D c + d`.
    pub fn at(&self, com: &Vector3<f64>) -> Vector6<f64> {
        self.matrix * com + self.offset
    }

    /// `D a`, the rate of change of the required wrench along `a`.
    pub fn along(&self, direction: &Vector3<f64>) -> Vector6<f64> {
        self.matrix * direction
    }
}

// ---------------------------------------------------------------------------
// Friction cone
// ---------------------------------------------------------------------------

/// Orthonormal tangents `(T1, T2)` of a contact normal.
pub fn tangent_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let mut t1 = normal.cross(&Vector3::y());
    if t1.norm() < TANGENT_TOLERANCE {
        t1 = normal.cross(&Vector3::x());
    }
    let t2 = normal.cross(&t1);
    (t1.normalize(), t2.normalize())
}

/// Unit edges of the linearized friction cone, one per column.
///
/// Edge `j` points along `μ sin θ T1 + μ cos θ T2 + n` with `θ = 2πj/g`.
pub fn friction_cone_edges(normal: &Vector3<f64>, mu: f64, count: usize) -> Matrix3xX<f64> {
    let (t1, t2) = tangent_basis(normal);
    let step = TAU / count as f64;
    let mut edges = Matrix3xX::zeros(count);
    for j in 0..count {
        let (s, c) = (step * j as f64).sin_cos();
        let edge = (t1 * (mu * s) + t2 * (mu * c) + normal).normalize();
        edges.set_column(j, &edge);
    }
    edges
}

/// Maps a contact force at `point` to its gravito-inertial wrench.
fn force_to_wrench(point: &Vector3<f64>) -> Matrix6x3<f64> {
    let mut a = Matrix6x3::zeros();
    a.fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(-Matrix3::identity()));
    a.fixed_view_mut::<3, 3>(3, 0)
        .copy_from(&cross_matrix(&(-point)));
    a
}

/// Conversion factor from the uniform generator margin `b0` to the
/// robustness `e_max`: distance between the sum of a contact's edges and the
/// boundary of its friction cone, per unit of `b0`.
fn margin_coefficient(edges: &Matrix3xX<f64>) -> f64 {
    let sum: Vector3<f64> = edges.column_sum();
    sum.cross(&edges.column(0)).norm()
}

// ---------------------------------------------------------------------------
// WrenchCone
// ---------------------------------------------------------------------------

/// Generator matrix of the contact wrench cone.
#[derive(Clone, Debug)]
pub struct WrenchCone {
    generators: DMatrix<f64>,
    generators_per_contact: usize,
    coefficient: f64,
}

impl WrenchCone {
    /// Cone with no contacts (6 x 0 generators).
    pub fn empty(generators_per_contact: usize) -> Self {
        Self {
            generators: DMatrix::zeros(6, 0),
            generators_per_contact,
            coefficient: 0.0,
        }
    }

    /// Build the cone of `points`/`normals` with friction `mu`.
    ///
    /// All contacts share `mu` and `generators_per_contact`, so the margin
    /// coefficient (taken from the last contact) holds for every contact.
    /// Fewer than three generators per contact are raised to three.
    pub fn build(
        points: &[Vector3<f64>],
        normals: &[Vector3<f64>],
        mu: f64,
        generators_per_contact: usize,
    ) -> Result<Self, ValidationError> {
        if points.len() != normals.len() {
            return Err(ValidationError::ContactCountMismatch {
                points: points.len(),
                normals: normals.len(),
            });
        }
        if !mu.is_finite() || mu <= 0.0 {
            return Err(ValidationError::InvalidFriction(mu));
        }
        for (index, normal) in normals.iter().enumerate() {
            let norm = normal.norm();
            if norm.is_nan() || (norm - 1.0).abs() > NORMAL_TOLERANCE {
                return Err(ValidationError::NonUnitNormal { index, norm });
            }
        }

        let g = generators_per_contact.max(MIN_GENERATORS_PER_CONTACT);
        let mut generators = DMatrix::zeros(6, points.len() * g);
        let mut coefficient = 0.0;
        for (i, (point, normal)) in points.iter().zip(normals).enumerate() {
            let edges = friction_cone_edges(normal, mu, g);
            generators
                .view_mut((0, i * g), (6, g))
                .copy_from(&(force_to_wrench(point) * &edges));
            coefficient = margin_coefficient(&edges);
        }

        Ok(Self {
            generators,
            generators_per_contact: g,
            coefficient,
        })
    }

    /// `G`, 6 x (contacts · generators per contact).
    pub fn generators(&self) -> &DMatrix<f64> {
        &self.generators
    }

    pub fn generators_per_contact(&self) -> usize {
        self.generators_per_contact
    }

    pub fn num_generators(&self) -> usize {
        self.generators.ncols()
    }

    pub fn num_contacts(&self) -> usize {
        self.generators.ncols() / self.generators_per_contact.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.generators.ncols() == 0
    }

    /// `G 1`, the wrench of a unit coefficient on every generator.
    pub fn generator_sum(&self) -> DVector<f64> {
        self.generators.column_sum()
    }

    pub fn b0_to_emax_coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn b0_to_emax(&self, b0: f64) -> f64 {
        b0 * self.coefficient
    }

    /// Generator margin `b0` corresponding to robustness `e_max`.
    pub fn emax_to_b0(&self, e_max: f64) -> f64 {
        e_max / self.coefficient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_square() -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
        let points = vec![
            Vector3::new(0.1, 0.1, 0.0),
            Vector3::new(0.1, -0.1, 0.0),
            Vector3::new(-0.1, -0.1, 0.0),
            Vector3::new(-0.1, 0.1, 0.0),
        ];
        (points, vec![Vector3::z(); 4])
    }

    #[test]
    fn gravity_wrench_at_origin_is_weight() {
        let gw = GravityWrench::new(2.0);
        let w = gw.at(&Vector3::zeros());
        assert_relative_eq!(w[2], -19.62, epsilon = 1e-12);
        assert_relative_eq!(w.fixed_rows::<3>(3).norm(), 0.0);
    }

    #[test]
    fn gravity_wrench_moment_is_com_cross_weight() {
        let gw = GravityWrench::new(1.0);
        let com = Vector3::new(0.3, -0.2, 1.0);
        let w = gw.at(&com);
        let expected = com.cross(&(gravity() * 1.0));
        assert_relative_eq!(w.fixed_rows::<3>(3).into_owned(), expected, epsilon = 1e-12);
        assert_relative_eq!(gw.along(&com), w - gw.offset, epsilon = 1e-12);
    }

    #[test]
    fn tangents_are_orthonormal() {
        for normal in [
            Vector3::z(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::new(1.0, 1.0, 1.0).normalize(),
        ] {
            let (t1, t2) = tangent_basis(&normal);
            assert_relative_eq!(t1.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(t2.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(t1.dot(&normal), 0.0, epsilon = 1e-12);
            assert_relative_eq!(t2.dot(&normal), 0.0, epsilon = 1e-12);
            assert_relative_eq!(t1.dot(&t2), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn edges_lie_on_cone_boundary() {
        let normal = Vector3::z();
        let mu = 0.5;
        let edges = friction_cone_edges(&normal, mu, 8);
        assert_eq!(edges.ncols(), 8);
        for edge in edges.column_iter() {
            assert_relative_eq!(edge.norm(), 1.0, epsilon = 1e-12);
            let tangential = (edge - normal * edge.dot(&normal)).norm();
            assert_relative_eq!(tangential / edge.dot(&normal), mu, epsilon = 1e-12);
        }
    }

    #[test]
    fn coefficient_for_flat_contact() {
        let (points, normals) = flat_square();
        let cone = WrenchCone::build(&points, &normals, 0.5, 8).unwrap();
        // 8 edges of norm 1/sqrt(1.25): |sum x f0| = 8/1.25 * 0.5
        assert_relative_eq!(cone.b0_to_emax_coefficient(), 3.2, epsilon = 1e-12);
        assert_relative_eq!(cone.b0_to_emax(cone.emax_to_b0(1.7)), 1.7, epsilon = 1e-12);
    }

    #[test]
    fn generator_shape_and_lifting() {
        let (points, normals) = flat_square();
        let cone = WrenchCone::build(&points, &normals, 0.5, 4).unwrap();
        assert_eq!(cone.generators().shape(), (6, 16));
        assert_eq!(cone.num_contacts(), 4);
        for (k, col) in cone.generators().column_iter().enumerate() {
            let p = points[k / 4];
            let f = -col.fixed_rows::<3>(0).into_owned();
            let moment = col.fixed_rows::<3>(3).into_owned();
            assert_relative_eq!(moment, -p.cross(&f), epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_non_unit_normal() {
        let (points, mut normals) = flat_square();
        normals[2] = Vector3::new(0.0, 0.0, 1.1);
        let err = WrenchCone::build(&points, &normals, 0.5, 4).unwrap_err();
        assert!(matches!(err, ValidationError::NonUnitNormal { index: 2, .. }));
    }

    #[test]
    fn rejects_nan_normal() {
        let (points, mut normals) = flat_square();
        normals[0] = Vector3::new(f64::NAN, 0.0, 1.0);
        let err = WrenchCone::build(&points, &normals, 0.5, 4).unwrap_err();
        assert!(matches!(err, ValidationError::NonUnitNormal { index: 0, .. }));
    }

    #[test]
    fn rejects_count_mismatch() {
        let (points, normals) = flat_square();
        let err = WrenchCone::build(&points, &normals[..3], 0.5, 4).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ContactCountMismatch {
                points: 4,
                normals: 3
            }
        );
    }

    #[test]
    fn rejects_bad_friction() {
        let (points, normals) = flat_square();
        for mu in [0.0, -0.3, f64::INFINITY] {
            assert!(matches!(
                WrenchCone::build(&points, &normals, mu, 4),
                Err(ValidationError::InvalidFriction(_))
            ));
        }
    }

    #[test]
    fn zero_contacts_give_empty_cone() {
        let cone = WrenchCone::build(&[], &[], 0.5, 4).unwrap();
        assert!(cone.is_empty());
        assert_eq!(cone.generators().shape(), (6, 0));
        assert_eq!(cone.generator_sum().len(), 6);
    }
}
