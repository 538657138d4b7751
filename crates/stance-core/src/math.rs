//! Small numeric and geometric helpers shared by the equilibrium crates.

use nalgebra::{Matrix3, Rotation3, Vector3};
use rand::Rng;

/// Cross-product (skew-symmetric) matrix of a 3D vector, `[v]× w = v × w`.
///
/// ```text
/// [v]_× = [ 0   -vz   vy ]
///         [ vz   0   -vx ]
///         [-vy   vx   0  ]
/// ```
pub fn cross_matrix(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0,
    )
}

/// Rotation matrix `Rz(yaw) * Ry(pitch) * Rx(roll)` (static XYZ angles).
pub fn euler_matrix(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    Rotation3::from_euler_angles(roll, pitch, yaw).into_inner()
}

/// Corner contacts of a rectangular patch.
///
/// The patch has half-extents `lx`, `ly` in its local XY plane, is centered
/// at `position` and rotated by `rpy` (roll, pitch, yaw). All four normals are
/// the patch's local +Z axis expressed in world frame.
pub fn generate_rectangle_contacts(
    lx: f64,
    ly: f64,
    position: &Vector3<f64>,
    rpy: &Vector3<f64>,
) -> ([Vector3<f64>; 4], [Vector3<f64>; 4]) {
    let rotation = euler_matrix(rpy.x, rpy.y, rpy.z);
    let local = [
        Vector3::new(lx, ly, 0.0),
        Vector3::new(lx, -ly, 0.0),
        Vector3::new(-lx, -ly, 0.0),
        Vector3::new(-lx, ly, 0.0),
    ];
    let points = local.map(|p| position + rotation * p);
    let normal = rotation * Vector3::z();
    (points, [normal; 4])
}

/// Draw a point uniformly inside the axis-aligned box `[lower, upper)`.
///
/// Degenerate axes (`lower == upper`) return the bound itself.
pub fn sample_uniform<R: Rng + ?Sized>(
    lower: &Vector3<f64>,
    upper: &Vector3<f64>,
    rng: &mut R,
) -> Vector3<f64> {
    Vector3::from_fn(|i, _| {
        let (lo, hi) = (lower[i], upper[i]);
        if hi > lo { rng.gen_range(lo..hi) } else { lo }
    })
}
