//! The projection capability and its double-description implementation.
//!
//! [`DoubleDescription`] hands the generators to `howzat` in homogeneous
//! row form and translates the inequality rows it returns into
//! [`HalfSpaces`].

use howzat::HowzatError;
use howzat::dd::ConeOptions;
use howzat::matrix::LpMatrixBuilder;
use howzat::num::DynamicEpsilon;
use howzat::polyhedron::PolyhedronOutput;
use howzat::types::{ComputationStatus, Generator};
use nalgebra::DMatrix;
use thiserror::Error;
use tracing::debug;

use crate::global::{DdConstants, ensure_initialized};
use crate::halfspace::HalfSpaces;

/// Ways the conversion can break down numerically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Instability {
    #[error(transparent)]
    Delegate(#[from] HowzatError),

    #[error("non-finite value in generator {column}")]
    NonFinite { column: usize },

    #[error("conversion stopped with status {0:?}")]
    Incomplete(ComputationStatus),

    #[error("expected {expected} output columns, got {actual}")]
    Shape { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("cone projection is ill-conditioned: {0}")]
    IllConditioned(#[from] Instability),

    #[error("cone generators have no columns")]
    NoGenerators,
}

/// Turns cone generators into half-spaces.
pub trait ConeProjector: Send + Sync {
    /// Half-spaces of `{ generators * b : b >= 0 }`. `generators` is `n x m`
    /// with one generator per column.
    fn project(&self, generators: &DMatrix<f64>) -> Result<HalfSpaces, ProjectionError>;
}

/// Projector backed by `howzat`'s double-description method.
#[derive(Debug, Clone, Copy)]
pub struct DoubleDescription {
    constants: DdConstants,
}

impl DoubleDescription {
    /// Uses the process-wide constants, initializing them if needed.
    pub fn new() -> Self {
        Self {
            constants: *ensure_initialized(),
        }
    }

    pub fn constants(&self) -> &DdConstants {
        &self.constants
    }
}

impl Default for DoubleDescription {
    fn default() -> Self {
        Self::new()
    }
}

/// Homogeneous generator rows `[0, g_j]` from the columns of `generators`.
pub fn cone_span_to_rows(generators: &DMatrix<f64>) -> Vec<Vec<f64>> {
    generators
        .column_iter()
        .map(|g| std::iter::once(0.0).chain(g.iter().copied()).collect())
        .collect()
}

impl ConeProjector for DoubleDescription {
    fn project(&self, generators: &DMatrix<f64>) -> Result<HalfSpaces, ProjectionError> {
        if generators.ncols() == 0 {
            return Err(ProjectionError::NoGenerators);
        }
        if let Some(column) = generators
            .column_iter()
            .position(|g| g.iter().any(|v| !v.is_finite()))
        {
            return Err(Instability::NonFinite { column }.into());
        }

        let n = generators.nrows();
        let matrix = LpMatrixBuilder::<f64, Generator>::from_rows(cone_span_to_rows(generators)).build();
        let poly = PolyhedronOutput::<f64, Generator>::builder(matrix)
            .cone_options(ConeOptions::default())
            .run_dd_with_eps(DynamicEpsilon::new(self.constants.zero_tolerance))
            .map_err(Instability::Delegate)?;
        if poly.status() != ComputationStatus::AllFound {
            return Err(Instability::Incomplete(poly.status()).into());
        }

        let output = poly.output();
        if output.col_count() != n + 1 {
            return Err(Instability::Shape {
                expected: n + 1,
                actual: output.col_count(),
            }
            .into());
        }
        let mut rows = DMatrix::from_row_iterator(
            output.row_count(),
            n + 1,
            output.rows().flatten().copied(),
        );
        // Every generator has t = 0, so the offset column carries nothing.
        rows.column_mut(0).fill(0.0);
        let linearity = output.linearity().to_indices();

        let halfspaces =
            HalfSpaces::from_inequality_rows(&rows, &linearity, self.constants.zero_tolerance);
        debug!(
            "projected {} generators in R^{n} onto {} half-spaces ({} equalities)",
            generators.ncols(),
            halfspaces.len(),
            linearity.len()
        );
        Ok(halfspaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DVector, dmatrix};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn project(generators: &DMatrix<f64>) -> HalfSpaces {
        DoubleDescription::new().project(generators).unwrap()
    }

    #[test]
    fn span_rows_have_leading_zero() {
        let g = dmatrix![
            1.0, 2.0;
            3.0, 4.0;
            5.0, 6.0
        ];
        let rows = cone_span_to_rows(&g);
        assert_eq!(rows, vec![vec![0.0, 1.0, 3.0, 5.0], vec![0.0, 2.0, 4.0, 6.0]]);
    }

    #[test]
    fn projects_positive_orthant() {
        let hs = project(&dmatrix![
            1.0, 0.0;
            0.0, 1.0
        ]);
        assert_eq!(hs.dim(), 2);
        assert!(hs.contains(&DVector::from_vec(vec![0.5, 2.0]), 1e-12));
        assert!(!hs.contains(&DVector::from_vec(vec![-0.5, 2.0]), 1e-12));
        assert!(!hs.contains(&DVector::from_vec(vec![0.5, -2.0]), 1e-12));
    }

    #[test]
    fn projects_friction_pyramid() {
        // Four-sided pyramid around +z with slope 0.5.
        let g = dmatrix![
            0.5, -0.5, 0.0, 0.0;
            0.0, 0.0, 0.5, -0.5;
            1.0, 1.0, 1.0, 1.0
        ];
        let hs = project(&g);
        assert_eq!(hs.len(), 4);
        assert!(hs.bound.iter().all(|&b| b == 0.0));
        assert!(hs.contains(&DVector::from_vec(vec![0.1, 0.1, 1.0]), 1e-12));
        assert!(!hs.contains(&DVector::from_vec(vec![0.6, 0.0, 1.0]), 1e-12));
        assert!(!hs.contains(&DVector::from_vec(vec![0.0, 0.0, -1.0]), 1e-12));
    }

    #[test]
    fn planar_cone_gets_equality_pair() {
        // Cone spanned by +x and +y inside R^3: z = 0 must hold both ways.
        let hs = project(&dmatrix![
            1.0, 0.0;
            0.0, 1.0;
            0.0, 0.0
        ]);
        assert!(hs.contains(&DVector::from_vec(vec![1.0, 2.0, 0.0]), 1e-9));
        assert!(!hs.contains(&DVector::from_vec(vec![1.0, 2.0, 0.1]), 1e-9));
        assert!(!hs.contains(&DVector::from_vec(vec![1.0, 2.0, -0.1]), 1e-9));
        assert!(!hs.contains(&DVector::from_vec(vec![-1.0, 2.0, 0.0]), 1e-9));
    }

    #[test]
    fn opposite_generators_span_a_line() {
        let hs = project(&dmatrix![
            1.0, -1.0;
            0.0, 0.0
        ]);
        assert!(hs.contains(&DVector::from_vec(vec![-3.0, 0.0]), 1e-9));
        assert!(hs.contains(&DVector::from_vec(vec![3.0, 0.0]), 1e-9));
        assert!(!hs.contains(&DVector::from_vec(vec![0.0, 1.0]), 1e-9));
    }

    #[test]
    fn random_cone_combinations_are_members() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let g = dmatrix![
            1.0, 0.2, 1.0, 0.0;
            -0.3, 1.0, 1.0, 0.1;
            -1.0, -0.4, 1.0, 0.0;
            0.5, -1.0, 1.0, -0.2;
            0.0, 0.0, 1.0, 1.0
        ]
        .transpose();
        let hs = project(&g);
        assert_eq!(hs.dim(), 4);
        for _ in 0..200 {
            let weights = DVector::from_fn(5, |_, _| rng.gen_range(0.0..1.0));
            let x = &g * weights;
            assert!(hs.contains(&x, 1e-9), "violation {:?}", hs.violation(&x));
        }
        // Negating a strictly interior point leaves the pointed cone.
        let inside = &g * DVector::from_element(5, 1.0);
        assert!(!hs.contains(&(-inside), 1e-9));
    }

    #[test]
    fn non_finite_generators_are_ill_conditioned() {
        let g = dmatrix![1.0, f64::NAN; 1.0, 1.0];
        let err = DoubleDescription::new().project(&g).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::IllConditioned(Instability::NonFinite { column: 1 })
        );
    }

    #[test]
    fn no_generators_is_an_error() {
        let g = DMatrix::<f64>::zeros(3, 0);
        assert_eq!(
            DoubleDescription::new().project(&g).unwrap_err(),
            ProjectionError::NoGenerators
        );
    }

    #[test]
    fn delegate_errors_are_ill_conditioned() {
        let err: ProjectionError = Instability::from(HowzatError::NumericallyInconsistent).into();
        assert!(matches!(
            err,
            ProjectionError::IllConditioned(Instability::Delegate(HowzatError::NumericallyInconsistent))
        ));
        assert!(err.to_string().contains("ill-conditioned"));
    }

    #[test]
    fn uses_global_constants() {
        let projector = DoubleDescription::default();
        assert_eq!(projector.constants(), ensure_initialized());
    }
}
