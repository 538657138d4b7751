//! The static equilibrium engine.

use nalgebra::{DMatrix, Vector3};
use stance_cone::{ConeProjector, DoubleDescription, HalfSpaces, ensure_initialized};
use stance_core::config::EquilibriumConfig;
use stance_core::error::ValidationError;
use stance_core::types::{Algorithm, LpOutcome, LpStatus, MIN_GENERATORS_PER_CONTACT};
use stance_lp::{LpSolver, new_solver};
use tracing::{debug, error, warn};

use crate::error::EquilibriumError;
use crate::strategy::{ProjectedCone, QueryContext, strategy_for};
use crate::wrench::{GravityWrench, WrenchCone};

/// Contact-dependent state, replaced as a whole by
/// [`StaticEquilibrium::set_new_contacts`].
struct ContactState {
    algorithm: Algorithm,
    cone: WrenchCone,
    projection: Option<ProjectedCone>,
}

/// Static equilibrium queries for one rigid body.
///
/// The body's mass and the number of friction-cone edges per contact are
/// fixed at construction. Contacts (and the algorithm used to answer
/// queries) are replaced atomically by [`set_new_contacts`]; until then the
/// contact set is empty and every query reports [`LpStatus::Infeasible`].
///
/// [`set_new_contacts`]: StaticEquilibrium::set_new_contacts
pub struct StaticEquilibrium {
    name: String,
    mass: f64,
    generators_per_contact: usize,
    gravity: GravityWrench,
    solver: Box<dyn LpSolver>,
    projector: Box<dyn ConeProjector>,
    state: ContactState,
}

impl std::fmt::Debug for StaticEquilibrium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticEquilibrium")
            .field("name", &self.name)
            .field("mass", &self.mass)
            .field("generators_per_contact", &self.generators_per_contact)
            .field("algorithm", &self.state.algorithm)
            .field("solver", &self.solver.name())
            .field("generators", &self.state.cone.num_generators())
            .finish_non_exhaustive()
    }
}

impl StaticEquilibrium {
    /// Create an engine with no contacts.
    ///
    /// `generators_per_contact` below 3 is raised to 3. The cone projector
    /// defaults to [`DoubleDescription`].
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        generators_per_contact: usize,
        algorithm: Algorithm,
        mut solver: Box<dyn LpSolver>,
        warm_start: bool,
    ) -> Result<Self, EquilibriumError> {
        ensure_initialized();
        let name = name.into();

        if !mass.is_finite() || mass <= 0.0 {
            return Err(ValidationError::NonPositiveMass(mass).into());
        }
        if !algorithm.is_implemented() {
            error!("{name}: algorithm {algorithm} is not implemented");
            return Err(EquilibriumError::NotImplemented(algorithm.label()));
        }

        let generators_per_contact = if generators_per_contact < MIN_GENERATORS_PER_CONTACT {
            warn!(
                "{name}: equilibrium needs at least {MIN_GENERATORS_PER_CONTACT} generators per contact, got {generators_per_contact}"
            );
            MIN_GENERATORS_PER_CONTACT
        } else {
            generators_per_contact
        };

        solver.set_warm_start(warm_start);
        debug!(
            "{name}: mass={mass}, generators_per_contact={generators_per_contact}, algorithm={algorithm}, solver={}",
            solver.name()
        );

        Ok(Self {
            name,
            mass,
            generators_per_contact,
            gravity: GravityWrench::new(mass),
            solver,
            projector: Box::new(DoubleDescription::new()),
            state: ContactState {
                algorithm,
                cone: WrenchCone::empty(generators_per_contact),
                projection: None,
            },
        })
    }

    /// Create an engine from a validated configuration, with the solver it
    /// names.
    pub fn from_config(config: &EquilibriumConfig) -> Result<Self, EquilibriumError> {
        config.validate()?;
        Self::new(
            config.name.clone(),
            config.mass,
            config.generators_per_contact,
            config.algorithm,
            new_solver(&config.solver),
            config.warm_start,
        )
    }

    /// Replace the cone projector used by [`Algorithm::PolytopeProjection`].
    pub fn with_projector(mut self, projector: Box<dyn ConeProjector>) -> Self {
        self.projector = projector;
        self
    }

    /// Replace the contact set and select the algorithm for later queries.
    ///
    /// On error the previous contacts and algorithm are kept unchanged.
    pub fn set_new_contacts(
        &mut self,
        points: &[Vector3<f64>],
        normals: &[Vector3<f64>],
        friction: f64,
        algorithm: Algorithm,
    ) -> Result<(), EquilibriumError> {
        match self.build_state(points, normals, friction, algorithm) {
            Ok(state) => {
                debug!(
                    "{}: {} contacts, {} generators, algorithm={}",
                    self.name,
                    state.cone.num_contacts(),
                    state.cone.num_generators(),
                    state.algorithm
                );
                self.state = state;
                Ok(())
            }
            Err(err) => {
                error!("{}: rejected contact configuration: {err}", self.name);
                Err(err)
            }
        }
    }

    fn build_state(
        &self,
        points: &[Vector3<f64>],
        normals: &[Vector3<f64>],
        friction: f64,
        algorithm: Algorithm,
    ) -> Result<ContactState, EquilibriumError> {
        if !algorithm.is_implemented() {
            return Err(EquilibriumError::NotImplemented(algorithm.label()));
        }
        let cone = WrenchCone::build(points, normals, friction, self.generators_per_contact)?;

        let projection = if algorithm.requires_half_spaces() && !cone.is_empty() {
            let half_spaces = self.projector.project(cone.generators())?;
            Some(ProjectedCone::new(half_spaces, &self.gravity))
        } else {
            None
        };

        Ok(ContactState {
            algorithm,
            cone,
            projection,
        })
    }

    fn context(&self) -> QueryContext<'_> {
        QueryContext {
            cone: &self.state.cone,
            gravity: &self.gravity,
            projection: self.state.projection.as_ref(),
            solver: self.solver.as_ref(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Robustness of the equilibrium at `com`: the largest `e_max` such that
    /// every contact force keeps at least that distance from its friction
    /// cone boundary. Negative when `com` is not in equilibrium.
    pub fn compute_equilibrium_robustness(
        &self,
        com: &Vector3<f64>,
    ) -> Result<LpOutcome<Option<f64>>, EquilibriumError> {
        if self.state.cone.is_empty() {
            return Ok(LpOutcome::new(LpStatus::Infeasible, None));
        }
        strategy_for(self.state.algorithm).robustness(&self.context(), com)
    }

    /// Membership test against the half-space form of the wrench cone.
    ///
    /// Only `e_max == 0` and [`Algorithm::PolytopeProjection`] are supported.
    #[allow(clippy::float_cmp)]
    pub fn check_robust_equilibrium(
        &self,
        com: &Vector3<f64>,
        e_max: f64,
    ) -> Result<LpOutcome<bool>, EquilibriumError> {
        if self.state.cone.is_empty() {
            return Ok(LpOutcome::new(LpStatus::Infeasible, false));
        }
        if e_max != 0.0 {
            return Err(ValidationError::UnsupportedRobustness(e_max).into());
        }
        strategy_for(self.state.algorithm).check_equilibrium(&self.context(), com)
    }

    /// Extremal CoM on the ray `a0 + a t` (`t` maximal) with robustness at
    /// least `e_max`. The returned CoM is `a0` when the LP fails.
    pub fn find_extremum_over_line(
        &self,
        a: &Vector3<f64>,
        a0: &Vector3<f64>,
        e_max: f64,
    ) -> Result<LpOutcome<Vector3<f64>>, EquilibriumError> {
        if self.state.cone.is_empty() {
            return Ok(LpOutcome::new(LpStatus::Infeasible, *a0));
        }
        let b0 = self.state.cone.emax_to_b0(e_max);
        strategy_for(self.state.algorithm).extremum_over_line(&self.context(), a, a0, b0)
    }

    /// Extremal CoM in a direction. Not implemented for non-empty contacts.
    pub fn find_extremum_in_direction(
        &self,
        _direction: &Vector3<f64>,
        _e_max: f64,
    ) -> Result<LpOutcome<Option<Vector3<f64>>>, EquilibriumError> {
        if self.state.cone.is_empty() {
            return Ok(LpOutcome::new(LpStatus::Infeasible, None));
        }
        error!("{}: find_extremum_in_direction is not implemented", self.name);
        Err(EquilibriumError::NotImplemented("find_extremum_in_direction"))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn algorithm(&self) -> Algorithm {
        self.state.algorithm
    }

    pub fn generators_per_contact(&self) -> usize {
        self.generators_per_contact
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Generator matrix `G` of the current contacts (6 x 0 when empty).
    pub fn generators(&self) -> &DMatrix<f64> {
        self.state.cone.generators()
    }

    /// Half-space form of the wrench cone, when the current algorithm built
    /// one.
    pub fn half_spaces(&self) -> Option<&HalfSpaces> {
        self.state.projection.as_ref().map(|p| &p.half_spaces)
    }

    pub fn b0_to_emax_coefficient(&self) -> f64 {
        self.state.cone.b0_to_emax_coefficient()
    }

    pub fn gravity_wrench(&self) -> &GravityWrench {
        &self.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_lp::ClarabelLp;

    fn engine(algorithm: Algorithm, g: usize) -> StaticEquilibrium {
        StaticEquilibrium::new("test", 1.0, g, algorithm, Box::new(ClarabelLp::default()), false)
            .unwrap()
    }

    #[test]
    fn clamps_generators_per_contact() {
        assert_eq!(engine(Algorithm::PrimalLp, 1).generators_per_contact(), 3);
        assert_eq!(engine(Algorithm::PrimalLp, 6).generators_per_contact(), 6);
    }

    #[test]
    fn initializes_projection_globals() {
        let _ = engine(Algorithm::DualLp, 4);
        assert!(stance_cone::is_initialized());
    }

    #[test]
    fn rejects_bad_mass() {
        for mass in [0.0, -1.0, f64::NAN] {
            let err = StaticEquilibrium::new(
                "m",
                mass,
                4,
                Algorithm::PrimalLp,
                Box::new(ClarabelLp::default()),
                false,
            )
            .unwrap_err();
            assert!(matches!(
                err,
                EquilibriumError::Validation(ValidationError::NonPositiveMass(_))
            ));
        }
    }

    #[test]
    fn rejects_unimplemented_algorithm_at_construction() {
        let err = StaticEquilibrium::new(
            "ip",
            1.0,
            4,
            Algorithm::InteriorPoint,
            Box::new(ClarabelLp::default()),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, EquilibriumError::NotImplemented("interior_point")));
    }

    #[test]
    fn from_config_uses_configured_values() {
        let config = EquilibriumConfig {
            name: "robot".into(),
            mass: 3.0,
            generators_per_contact: 2,
            algorithm: Algorithm::DualLp,
            ..EquilibriumConfig::default()
        };
        let eq = StaticEquilibrium::from_config(&config).unwrap();
        assert_eq!(eq.name(), "robot");
        assert!((eq.mass() - 3.0).abs() < f64::EPSILON);
        assert_eq!(eq.generators_per_contact(), 3);
        assert_eq!(eq.algorithm(), Algorithm::DualLp);
        assert_eq!(eq.solver_name(), "clarabel");
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let config = EquilibriumConfig {
            mass: -2.0,
            ..EquilibriumConfig::default()
        };
        assert!(matches!(
            StaticEquilibrium::from_config(&config),
            Err(EquilibriumError::Config(_))
        ));
    }

    #[test]
    fn gravity_wrench_matches_mass() {
        let eq = engine(Algorithm::PrimalLp, 4);
        assert!((eq.gravity_wrench().offset[2] + 9.81).abs() < 1e-12);
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StaticEquilibrium>();
    }
}
