//! Canonical contact configurations.

use nalgebra::Vector3;
use stance_core::math::generate_rectangle_contacts;

/// Contact points and normals, ready for `set_new_contacts`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSet {
    pub points: Vec<Vector3<f64>>,
    pub normals: Vec<Vector3<f64>>,
}

impl ContactSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Four contacts at the corners of a flat square of the given half-width,
/// centered at the origin, all normals `+Z`.
pub fn square_contacts(half_width: f64) -> ContactSet {
    let (points, normals) =
        generate_rectangle_contacts(half_width, half_width, &Vector3::zeros(), &Vector3::zeros());
    ContactSet {
        points: points.to_vec(),
        normals: normals.to_vec(),
    }
}

/// One contact at the origin with normal `+Z`.
pub fn single_flat_contact() -> ContactSet {
    ContactSet {
        points: vec![Vector3::zeros()],
        normals: vec![Vector3::z()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_has_four_flat_corners() {
        let set = square_contacts(0.1);
        assert_eq!(set.len(), 4);
        for (p, n) in set.points.iter().zip(&set.normals) {
            assert!((p.x.abs() - 0.1).abs() < 1e-12);
            assert!((p.y.abs() - 0.1).abs() < 1e-12);
            assert!((n - Vector3::z()).norm() < 1e-12);
        }
    }

    #[test]
    fn single_contact_is_at_origin() {
        let set = single_flat_contact();
        assert!(!set.is_empty());
        assert_eq!(set.points[0], Vector3::zeros());
    }
}
