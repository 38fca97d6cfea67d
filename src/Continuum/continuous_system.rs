//! The `ContinuousSystem` entity: the single persistent value the whole
//! analysis pipeline transforms. Instances are immutable; derived systems are
//! produced functionally through `with_substitutions`, never by mutating the
//! original. The one sanctioned mutation is the explicitly named
//! `set_boundary_conditions`.

use crate::Continuum::boundary::{self, BoundaryCondition};
use crate::Continuum::eigen::{self, EigenvalueSeq, EigenvalueStrategy};
use crate::Continuum::modes::{self, Eigenmode};
use crate::Continuum::separation::{self, Equation, SeparatedEquation, SpatialSolution};
use crate::Continuum::variational;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_matrix::ExprMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// error types of the eigen-analysis pipeline
#[derive(Debug, Error)]
pub enum VibrationError {
    #[error("unsupported governing equation: {0}")]
    UnsupportedGoverningEquation(String),
    #[error(
        "{found} boundary conditions supplied, but the spatial general solution has {expected} integration constants"
    )]
    BoundaryConditionMismatch { expected: usize, found: usize },
    #[error("no eigenvalue solution: {0}")]
    NoEigenvalueSolution(String),
    #[error("parameter `{0}` has no numeric value; substitute it before root extraction")]
    UnresolvedParameter(String),
    #[error("cannot parse boundary condition: {0}")]
    BoundaryConditionParse(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Per-instance numeric knobs of the eigenvalue search and mode composition.
/// Every tolerance that the analysis relies on lives here instead of being
/// hardcoded at the call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EigenSearchConfig {
    /// lower bound of the root scan; keeps the trivial k = 0 root out
    pub k_min: f64,
    /// upper bound of the root scan
    pub k_max: f64,
    /// number of scan intervals between k_min and k_max
    pub scan_points: usize,
    /// bisection convergence tolerance for an individual root
    pub root_tol: f64,
    /// relative tolerance when validating the uniform-spacing extrapolation
    /// against the third located root
    pub spacing_rtol: f64,
    /// threshold below which a trigonometric atom of the fundamental matrix
    /// is treated as structurally zero during mode composition
    pub zero_tol: f64,
    /// how many roots the bracketing strategy tabulates at most
    pub max_roots: usize,
}

impl Default for EigenSearchConfig {
    fn default() -> Self {
        EigenSearchConfig {
            k_min: 1e-6,
            k_max: 100.0,
            scan_points: 20_000,
            root_tol: 1e-12,
            spacing_rtol: 1e-3,
            zero_tol: 1e-3,
            max_roots: 64,
        }
    }
}

/// Naming scheme of the jet variables of a field. A field `q` of time `t`
/// and space `x` has the jets `q`, `q_t`, `q_tt`, `q_x`, `q_xx`, `q_tx`, ...
/// with all time suffixes preceding the spatial ones. Jet bookkeeping
/// requires single-character variable names.
#[derive(Debug, Clone)]
pub struct JetSpace {
    pub base: String,
    pub time: String,
    pub spatial: Vec<String>,
}

impl JetSpace {
    pub fn new(base: &str, time: &str, spatial: &[String]) -> Result<Self, VibrationError> {
        if base.is_empty() {
            return Err(VibrationError::InvalidConfiguration(
                "field variable name must not be empty".to_string(),
            ));
        }
        let mut seen: Vec<&str> = Vec::new();
        for var in std::iter::once(time).chain(spatial.iter().map(|s| s.as_str())) {
            if var.chars().count() != 1 {
                return Err(VibrationError::InvalidConfiguration(format!(
                    "jet bookkeeping requires single-character independent variables, got `{}`",
                    var
                )));
            }
            if seen.contains(&var) {
                return Err(VibrationError::InvalidConfiguration(format!(
                    "independent variable `{}` is declared twice",
                    var
                )));
            }
            seen.push(var);
        }
        Ok(JetSpace {
            base: base.to_string(),
            time: time.to_string(),
            spatial: spatial.to_vec(),
        })
    }

    /// canonical jet name, e.g. name(1, &[2]) -> "q_txx"
    pub fn name(&self, time_order: usize, spatial_orders: &[usize]) -> String {
        if time_order == 0 && spatial_orders.iter().all(|o| *o == 0) {
            return self.base.clone();
        }
        let mut suffix = self.time.repeat(time_order);
        for (var, order) in self.spatial.iter().zip(spatial_orders) {
            suffix.push_str(&var.repeat(*order));
        }
        format!("{}_{}", self.base, suffix)
    }

    /// parse a variable name back into jet orders; None means the variable is
    /// not a jet of this field (an ordinary parameter)
    pub fn decompose(&self, var: &str) -> Option<(usize, Vec<usize>)> {
        let mut orders = vec![0usize; self.spatial.len()];
        if var == self.base {
            return Some((0, orders));
        }
        let prefix = format!("{}_", self.base);
        let suffix = var.strip_prefix(&prefix)?;
        if suffix.is_empty() {
            return None;
        }
        let mut rest = suffix;
        let mut time_order = 0;
        while let Some(r) = rest.strip_prefix(self.time.as_str()) {
            time_order += 1;
            rest = r;
        }
        for (i, spatial_var) in self.spatial.iter().enumerate() {
            while let Some(r) = rest.strip_prefix(spatial_var.as_str()) {
                orders[i] += 1;
                rest = r;
            }
        }
        if rest.is_empty() {
            Some((time_order, orders))
        } else {
            None
        }
    }
}

/// A continuous mechanical system: a field governed by a Lagrangian density
/// together with the boundary conditions of its spatial problem.
///
/// # Usage pattern
/// 1. `new()` - supply the Lagrangian density, the field name and the
///    boundary conditions
/// 2. `with_*()` - adjust derivative order, variables, label, search config
/// 3. `check_task()` - validate the configuration
/// 4. `governing_equation()` / `eigenvalues()` / `eigenmodes()` - analyse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousSystem {
    /// kinetic minus potential energy per unit length, expressed in the jet
    /// variables of the field plus free parameter symbols
    pub lagrangian_density: Expr,
    /// name of the field variable, e.g. "q"
    pub field_variable: String,
    /// name of the time variable
    pub time_var: String,
    /// ordered spatial variables; the separation machinery requires exactly one
    pub spatial_vars: Vec<String>,
    /// highest spatial derivative order taken in the variational sum
    pub derivative_order: usize,
    /// ordered boundary conditions of the spatial problem
    pub boundary_conditions: Vec<BoundaryCondition>,
    /// symbol bound to the separated ratio; reported eigenvalues are the
    /// wavenumbers carried by this symbol
    pub separation_constant_symbol: String,
    /// display name
    pub label: String,
    /// numeric knobs of root search and mode composition
    pub config: EigenSearchConfig,
}

impl fmt::Display for ContinuousSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl ContinuousSystem {
    pub fn new(
        lagrangian_density: Expr,
        field_variable: &str,
        boundary_conditions: Vec<BoundaryCondition>,
    ) -> Self {
        ContinuousSystem {
            lagrangian_density,
            field_variable: field_variable.to_string(),
            time_var: "t".to_string(),
            spatial_vars: vec!["x".to_string()],
            derivative_order: 2,
            boundary_conditions,
            separation_constant_symbol: "k".to_string(),
            label: format!("ContinuousSystem on {}", field_variable),
            config: EigenSearchConfig::default(),
        }
    }

    pub fn with_derivative_order(mut self, derivative_order: usize) -> Self {
        self.derivative_order = derivative_order;
        self
    }

    pub fn with_time_var(mut self, time_var: &str) -> Self {
        self.time_var = time_var.to_string();
        self
    }

    pub fn with_spatial_vars(mut self, spatial_vars: Vec<String>) -> Self {
        self.spatial_vars = spatial_vars;
        self
    }

    pub fn with_separation_symbol(mut self, symbol: &str) -> Self {
        self.separation_constant_symbol = symbol.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_config(mut self, config: EigenSearchConfig) -> Self {
        self.config = config;
        self
    }

    /// the jet bookkeeping of this system's field
    pub fn jet_space(&self) -> Result<JetSpace, VibrationError> {
        JetSpace::new(&self.field_variable, &self.time_var, &self.spatial_vars)
    }

    /// Validates the configuration before analysis: the derivative order must
    /// cover every spatial jet the Lagrangian actually contains, time jets
    /// beyond the first derivative and mixed time-space jets are rejected.
    /// The governing-equation builder itself silently truncates at
    /// `derivative_order`; this is the explicit guard against that.
    pub fn check_task(&self) -> Result<(), VibrationError> {
        if self.derivative_order == 0 {
            return Err(VibrationError::InvalidConfiguration(
                "derivative_order must be at least 1".to_string(),
            ));
        }
        if self.spatial_vars.is_empty() {
            return Err(VibrationError::InvalidConfiguration(
                "at least one spatial variable is required".to_string(),
            ));
        }
        let jet = self.jet_space()?;
        for var in self.lagrangian_density.extract_variables() {
            if let Some((time_order, spatial_orders)) = jet.decompose(&var) {
                if time_order > 1 {
                    return Err(VibrationError::InvalidConfiguration(format!(
                        "Lagrangian contains `{}`: only the first time derivative may appear",
                        var
                    )));
                }
                let total_spatial: usize = spatial_orders.iter().sum();
                if time_order > 0 && total_spatial > 0 {
                    return Err(VibrationError::InvalidConfiguration(format!(
                        "Lagrangian contains the mixed jet `{}`",
                        var
                    )));
                }
                if total_spatial > self.derivative_order {
                    return Err(VibrationError::InvalidConfiguration(format!(
                        "Lagrangian contains `{}` above derivative_order = {}; the variational sum would silently truncate it",
                        var, self.derivative_order
                    )));
                }
            }
        }
        Ok(())
    }

    /// the explicitly named rebind of the stored boundary conditions; every
    /// analysis entry point otherwise treats them as read-only
    pub fn set_boundary_conditions(&mut self, boundary_conditions: Vec<BoundaryCondition>) {
        self.boundary_conditions = boundary_conditions;
    }

    /// Functional update: returns a new system with the substitution map
    /// applied to the Lagrangian density and to every boundary condition.
    /// Applying two calls with disjoint maps is equivalent to one call with
    /// the merged map.
    pub fn with_substitutions(&self, substitutions: &HashMap<String, Expr>) -> ContinuousSystem {
        let mut derived = self.clone();
        derived.lagrangian_density = self
            .lagrangian_density
            .substitute_from_map(substitutions)
            .symplify();
        derived.boundary_conditions = self
            .boundary_conditions
            .iter()
            .map(|bc| BoundaryCondition {
                order: bc.order,
                location: bc.location.substitute_from_map(substitutions).symplify(),
                value: bc.value.substitute_from_map(substitutions).symplify(),
            })
            .collect();
        derived
    }

    /// convenience wrapper over `with_substitutions` for plain numbers
    pub fn with_numeric_values(&self, values: &HashMap<String, f64>) -> ContinuousSystem {
        let substitutions: HashMap<String, Expr> = values
            .iter()
            .map(|(name, value)| (name.clone(), Expr::Const(*value)))
            .collect();
        self.with_substitutions(&substitutions)
    }

    //////////////////////// ANALYSIS FACADE ////////////////////////

    /// Euler-Lagrange equation of the field, equal to zero at a solution
    pub fn governing_equation(&self) -> Result<Expr, VibrationError> {
        variational::governing_equation(self)
    }

    /// governing equation under the product ansatz q = T(t) * X(x)
    pub fn apply_separation(&self) -> Result<Expr, VibrationError> {
        separation::apply_separation(self)
    }

    /// separated equation: temporal ratio = spatial ratio
    pub fn separated_vars_eqn(&self) -> Result<SeparatedEquation, VibrationError> {
        separation::separated_vars_eqn(self)
    }

    /// spatial ratio bound to the separation constant
    pub fn spatial_eqn(&self) -> Result<Equation, VibrationError> {
        separation::spatial_eqn(self)
    }

    /// temporal ratio bound to the separation constant
    pub fn time_eqn(&self) -> Result<Equation, VibrationError> {
        separation::time_eqn(self)
    }

    /// closed-form general solution of the spatial equation
    pub fn spatial_general_solution(&self) -> Result<SpatialSolution, VibrationError> {
        separation::spatial_general_solution(self)
    }

    /// Jacobian of the boundary-condition residuals with respect to the
    /// integration constants, as a function of the separation constant
    pub fn fundamental_matrix(&self) -> Result<ExprMatrix, VibrationError> {
        let solution = separation::spatial_general_solution(self)?;
        boundary::fundamental_matrix(&self.spatial_vars[0], &self.boundary_conditions, &solution)
    }

    /// determinant of the fundamental matrix, simplified
    pub fn characteristic_equation(&self) -> Result<Expr, VibrationError> {
        eigen::characteristic_equation(self)
    }

    /// eigenvalue sequence under the default uniform-spacing strategy
    pub fn eigenvalues(&self) -> Result<EigenvalueSeq, VibrationError> {
        eigen::eigenvalues(self, &EigenvalueStrategy::default())
    }

    /// eigenvalue sequence under an explicit root-location strategy
    pub fn eigenvalues_with(
        &self,
        strategy: &EigenvalueStrategy,
    ) -> Result<EigenvalueSeq, VibrationError> {
        eigen::eigenvalues(self, strategy)
    }

    /// eigenmode of the requested mode index under the default strategy
    pub fn eigenmodes(&self, mode_no: usize) -> Result<Eigenmode, VibrationError> {
        modes::eigenmodes(self, &EigenvalueStrategy::default(), mode_no)
    }

    /// eigenmode of the requested mode index under an explicit strategy
    pub fn eigenmodes_with(
        &self,
        strategy: &EigenvalueStrategy,
        mode_no: usize,
    ) -> Result<Eigenmode, VibrationError> {
        modes::eigenmodes(self, strategy, mode_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned_string() -> ContinuousSystem {
        let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2");
        let bcs = vec![
            BoundaryCondition::parse_line("X(0) = 0").unwrap(),
            BoundaryCondition::parse_line("X(L) = 0").unwrap(),
        ];
        ContinuousSystem::new(lagrangian, "q", bcs).with_derivative_order(1)
    }

    #[test]
    fn test_jet_space_names() {
        let jet = JetSpace::new("q", "t", &["x".to_string()]).unwrap();
        assert_eq!(jet.name(0, &[0]), "q");
        assert_eq!(jet.name(1, &[0]), "q_t");
        assert_eq!(jet.name(0, &[4]), "q_xxxx");
        assert_eq!(jet.name(1, &[2]), "q_txx");
    }

    #[test]
    fn test_jet_space_decompose() {
        let jet = JetSpace::new("q", "t", &["x".to_string()]).unwrap();
        assert_eq!(jet.decompose("q"), Some((0, vec![0])));
        assert_eq!(jet.decompose("q_tt"), Some((2, vec![0])));
        assert_eq!(jet.decompose("q_xx"), Some((0, vec![2])));
        assert_eq!(jet.decompose("q_txx"), Some((1, vec![2])));
        assert_eq!(jet.decompose("rho"), None);
        assert_eq!(jet.decompose("q_weird"), None);
        // spatial suffix before the time suffix is not canonical
        assert_eq!(jet.decompose("q_xt"), None);
    }

    #[test]
    fn test_jet_space_rejects_long_names() {
        assert!(JetSpace::new("q", "tau", &["x".to_string()]).is_err());
        assert!(JetSpace::new("q", "t", &["xi".to_string()]).is_err());
        assert!(JetSpace::new("q", "t", &["t".to_string()]).is_err());
    }

    #[test]
    fn test_check_task_flags_excess_derivatives() {
        // beam Lagrangian declared with string-level derivative order
        let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - EI/2 * q_xx^2");
        let system = ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(1);
        assert!(matches!(
            system.check_task(),
            Err(VibrationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_check_task_accepts_consistent_system() {
        let system = pinned_string();
        assert!(system.check_task().is_ok());
    }

    #[test]
    fn test_with_substitutions_is_pure() {
        let system = pinned_string();
        let before = system.lagrangian_density.clone();
        let substitutions = HashMap::from([("rho".to_string(), Expr::Const(2.0))]);
        let derived = system.with_substitutions(&substitutions);
        assert_eq!(system.lagrangian_density, before);
        assert!(!derived.lagrangian_density.contains_var("rho"));
    }

    #[test]
    fn test_with_substitutions_composability() {
        let system = pinned_string();
        let first = HashMap::from([("rho".to_string(), Expr::Const(1.0))]);
        let second = HashMap::from([
            ("T0".to_string(), Expr::Const(4.0)),
            ("L".to_string(), Expr::Const(2.0)),
        ]);
        let merged: HashMap<String, Expr> =
            first.clone().into_iter().chain(second.clone()).collect();
        let chained = system.with_substitutions(&first).with_substitutions(&second);
        let at_once = system.with_substitutions(&merged);
        assert_eq!(chained.lagrangian_density, at_once.lagrangian_density);
        assert_eq!(chained.boundary_conditions, at_once.boundary_conditions);
    }

    #[test]
    fn test_label_default_and_override() {
        let system = pinned_string();
        assert_eq!(format!("{}", system), "ContinuousSystem on q");
        let labeled = system.with_label("taut string");
        assert_eq!(format!("{}", labeled), "taut string");
    }
}
