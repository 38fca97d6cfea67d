//! Separation of variables.
//!
//! The product ansatz `q(t, x) = T(t) * X(x)` turns every jet of the field
//! into a product of factor jets, `q_{t^a x^b} -> T_{t^a} * X_{x^b}`. For a
//! linear governing equation the substituted expression splits into two
//! additive groups, one proportional to the bare spatial factor and one to
//! the bare temporal factor, giving
//!
//! ```text
//! (temporal group) / T  =  - (spatial group) / X  =  s
//! ```
//!
//! with `s` the separation constant. The spatial side is then reduced to the
//! normal form `a_m X^(m) + a_0 X = s X` and solved with the oscillatory
//! wavenumber parameterization `s = a_0 + a_m (-1)^(m/2) k^m`, so that the
//! eigenvalues reported downstream are the wavenumbers `k_n` of the spatial
//! basis. Static terms with no factor derivative (elastic-foundation terms)
//! are counted with the spatial operator.

use crate::Continuum::continuous_system::{ContinuousSystem, VibrationError};
use crate::Continuum::variational;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_ode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// name of the temporal factor of the product ansatz
pub const TIME_FACTOR: &str = "T";
/// name of the spatial factor of the product ansatz
pub const SPATIAL_FACTOR: &str = "X";

/// an equation `lhs = rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// the two sides of the separated equation, `time_side = spatial_side`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatedEquation {
    /// temporal group divided by T
    pub time_side: Expr,
    /// negated spatial group divided by X
    pub spatial_side: Expr,
}

impl fmt::Display for SeparatedEquation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.time_side, self.spatial_side)
    }
}

/// closed-form general solution of the spatial equation together with the
/// dispersion expression `s(k)` relating the separated ratio to the
/// wavenumber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialSolution {
    pub expr: Expr,
    pub constants: Vec<String>,
    pub order: usize,
    pub dispersion: Expr,
}

fn factor_jet_name(base: &str, axis_char: &str, order: usize) -> String {
    if order == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, axis_char.repeat(order))
    }
}

/// order of a factor jet variable, e.g. ("X_xx", "X", "x") -> Some(2),
/// ("X", "X", "x") -> Some(0); None if the variable is unrelated
fn factor_jet_order(var: &str, base: &str, axis_char: &str) -> Option<usize> {
    if var == base {
        return Some(0);
    }
    let prefix = format!("{}_", base);
    let suffix = var.strip_prefix(&prefix)?;
    if suffix.is_empty() {
        return None;
    }
    let mut rest = suffix;
    let mut order = 0;
    while let Some(r) = rest.strip_prefix(axis_char) {
        order += 1;
        rest = r;
    }
    if rest.is_empty() { Some(order) } else { None }
}

/// Flatten an expression into additive terms, distributing products and
/// quotients over sums on the way down. `a * (b + c)` yields the terms
/// `a * b` and `a * c`, which is what the group classification needs.
fn expand_terms(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(lhs, rhs) => {
            let mut terms = expand_terms(lhs);
            terms.extend(expand_terms(rhs));
            terms
        }
        Expr::Sub(lhs, rhs) => {
            let mut terms = expand_terms(lhs);
            terms.extend(
                expand_terms(rhs)
                    .into_iter()
                    .map(|t| Expr::Const(-1.0) * t),
            );
            terms
        }
        Expr::Mul(lhs, rhs) => {
            let left = expand_terms(lhs);
            let right = expand_terms(rhs);
            if left.len() == 1 && right.len() == 1 {
                vec![expr.clone()]
            } else {
                let mut terms = Vec::with_capacity(left.len() * right.len());
                for l in &left {
                    for r in &right {
                        terms.push(l.clone() * r.clone());
                    }
                }
                terms
            }
        }
        Expr::Div(lhs, rhs) => {
            let left = expand_terms(lhs);
            if left.len() == 1 {
                vec![expr.clone()]
            } else {
                left.into_iter().map(|t| t / (**rhs).clone()).collect()
            }
        }
        _ => vec![expr.clone()],
    }
}

/// substitute the product ansatz into the governing equation
pub fn apply_separation(system: &ContinuousSystem) -> Result<Expr, VibrationError> {
    apply_separation_with(system, TIME_FACTOR, SPATIAL_FACTOR)
}

/// same as [`apply_separation`] with caller-chosen factor names
pub fn apply_separation_with(
    system: &ContinuousSystem,
    time_factor: &str,
    spatial_factor: &str,
) -> Result<Expr, VibrationError> {
    if system.spatial_vars.len() != 1 {
        return Err(VibrationError::UnsupportedGoverningEquation(
            "separation of variables requires exactly one spatial variable".to_string(),
        ));
    }
    let governing = variational::governing_equation(system)?;
    let jet = system.jet_space()?;
    let time_char = system.time_var.clone();
    let spatial_char = system.spatial_vars[0].clone();
    let vars = governing.extract_variables();
    for var in &vars {
        if jet.decompose(var).is_none()
            && (factor_jet_order(var, time_factor, &time_char).is_some()
                || factor_jet_order(var, spatial_factor, &spatial_char).is_some())
        {
            return Err(VibrationError::UnsupportedGoverningEquation(format!(
                "factor name collides with the symbol `{}` of the governing equation",
                var
            )));
        }
    }
    let mut ansatz: HashMap<String, Expr> = HashMap::new();
    for var in &vars {
        if let Some((time_order, spatial_orders)) = jet.decompose(var) {
            let t_part = Expr::Var(factor_jet_name(time_factor, &time_char, time_order));
            let x_part = Expr::Var(factor_jet_name(
                spatial_factor,
                &spatial_char,
                spatial_orders[0],
            ));
            ansatz.insert(var.clone(), t_part * x_part);
        }
    }
    Ok(governing.substitute_from_map(&ansatz).symplify())
}

/// split the separated governing equation into the temporal group (terms
/// carrying the bare spatial factor) and the spatial group (the rest)
fn separated_groups(system: &ContinuousSystem) -> Result<(Expr, Expr), VibrationError> {
    let equation = apply_separation(system)?;
    let time_char = system.time_var.clone();
    let spatial_char = system.spatial_vars[0].clone();
    let mut time_terms = Expr::Const(0.0);
    let mut spatial_terms = Expr::Const(0.0);
    for term in expand_terms(&equation) {
        let mut t_max: Option<usize> = None;
        let mut x_max: Option<usize> = None;
        for var in term.extract_variables() {
            if let Some(order) = factor_jet_order(&var, TIME_FACTOR, &time_char) {
                t_max = Some(t_max.map_or(order, |m| m.max(order)));
            }
            if let Some(order) = factor_jet_order(&var, SPATIAL_FACTOR, &spatial_char) {
                x_max = Some(x_max.map_or(order, |m| m.max(order)));
            }
        }
        match (t_max, x_max) {
            (Some(a), Some(0)) if a >= 1 => {
                let stripped = term.strip_factor(SPATIAL_FACTOR).ok_or_else(|| {
                    VibrationError::UnsupportedGoverningEquation(format!(
                        "term `{}` is not linear in the spatial factor",
                        term
                    ))
                })?;
                if stripped.contains_var(SPATIAL_FACTOR) || stripped.contains_var(TIME_FACTOR) {
                    return Err(VibrationError::UnsupportedGoverningEquation(format!(
                        "term `{}` is not linear in the separation factors",
                        term
                    )));
                }
                time_terms = time_terms + stripped;
            }
            (Some(0), Some(b)) if b >= 1 => {
                let stripped = strip_bare_time(&term)?;
                spatial_terms = spatial_terms + stripped;
            }
            (Some(0), Some(0)) => {
                // a static term: counted with the spatial operator
                let stripped = strip_bare_time(&term)?;
                spatial_terms = spatial_terms + stripped;
            }
            _ => {
                return Err(VibrationError::UnsupportedGoverningEquation(format!(
                    "term `{}` does not separate into a temporal and a spatial group",
                    term
                )));
            }
        }
    }
    Ok((time_terms.symplify(), spatial_terms.symplify()))
}

fn strip_bare_time(term: &Expr) -> Result<Expr, VibrationError> {
    let stripped = term.strip_factor(TIME_FACTOR).ok_or_else(|| {
        VibrationError::UnsupportedGoverningEquation(format!(
            "term `{}` is not linear in the temporal factor",
            term
        ))
    })?;
    if stripped.contains_var(TIME_FACTOR) {
        return Err(VibrationError::UnsupportedGoverningEquation(format!(
            "term `{}` is not linear in the temporal factor",
            term
        )));
    }
    Ok(stripped)
}

/// the separated equation `time_side = spatial_side`
pub fn separated_vars_eqn(system: &ContinuousSystem) -> Result<SeparatedEquation, VibrationError> {
    let (time_terms, spatial_terms) = separated_groups(system)?;
    let time_side = (time_terms / Expr::Var(TIME_FACTOR.to_string())).symplify();
    let spatial_side = ((Expr::Const(-1.0) * spatial_terms)
        / Expr::Var(SPATIAL_FACTOR.to_string()))
    .symplify();
    Ok(SeparatedEquation {
        time_side,
        spatial_side,
    })
}

/// spatial ratio bound to the separation constant
pub fn spatial_eqn(system: &ContinuousSystem) -> Result<Equation, VibrationError> {
    spatial_eqn_with(system, None)
}

pub fn spatial_eqn_with(
    system: &ContinuousSystem,
    sep_expr: Option<Expr>,
) -> Result<Equation, VibrationError> {
    let rhs =
        sep_expr.unwrap_or_else(|| Expr::Var(system.separation_constant_symbol.clone()));
    Ok(Equation {
        lhs: separated_vars_eqn(system)?.spatial_side,
        rhs,
    })
}

/// temporal ratio bound to the separation constant
pub fn time_eqn(system: &ContinuousSystem) -> Result<Equation, VibrationError> {
    time_eqn_with(system, None)
}

pub fn time_eqn_with(
    system: &ContinuousSystem,
    sep_expr: Option<Expr>,
) -> Result<Equation, VibrationError> {
    let rhs =
        sep_expr.unwrap_or_else(|| Expr::Var(system.separation_constant_symbol.clone()));
    Ok(Equation {
        lhs: separated_vars_eqn(system)?.time_side,
        rhs,
    })
}

struct SpatialOperator {
    order: usize,
    leading: Expr,
    zeroth: Expr,
}

/// reduce the spatial group to the normal form `a_m X^(m) + a_0 X`
fn spatial_operator(system: &ContinuousSystem) -> Result<SpatialOperator, VibrationError> {
    let (_, spatial_terms) = separated_groups(system)?;
    let spatial_char = system.spatial_vars[0].clone();
    let jet = system.jet_space()?;
    let mut coefficients: HashMap<usize, Expr> = HashMap::new();
    // the spatial side is the negated spatial group over X
    for term in expand_terms(&spatial_terms) {
        let term = (Expr::Const(-1.0) * term).symplify();
        let mut jet_factor: Option<(String, usize)> = None;
        for var in term.extract_variables() {
            if let Some(order) = factor_jet_order(&var, SPATIAL_FACTOR, &spatial_char) {
                if let Some((ref seen, _)) = jet_factor {
                    if *seen != var {
                        return Err(VibrationError::UnsupportedGoverningEquation(format!(
                            "spatial term `{}` mixes several factor derivatives",
                            term
                        )));
                    }
                } else {
                    jet_factor = Some((var, order));
                }
            }
        }
        let (jet_var, order) = jet_factor.ok_or_else(|| {
            VibrationError::UnsupportedGoverningEquation(format!(
                "spatial term `{}` carries no spatial factor",
                term
            ))
        })?;
        let coeff = term.strip_factor(&jet_var).ok_or_else(|| {
            VibrationError::UnsupportedGoverningEquation(format!(
                "spatial term `{}` is not linear in `{}`",
                term, jet_var
            ))
        })?;
        for coeff_var in coeff.extract_variables() {
            let is_constant = coeff_var != spatial_char
                && coeff_var != system.time_var
                && jet.decompose(&coeff_var).is_none()
                && factor_jet_order(&coeff_var, TIME_FACTOR, &system.time_var).is_none()
                && factor_jet_order(&coeff_var, SPATIAL_FACTOR, &spatial_char).is_none();
            if !is_constant {
                return Err(VibrationError::UnsupportedGoverningEquation(format!(
                    "coefficient of `{}` is not constant: depends on `{}`",
                    jet_var, coeff_var
                )));
            }
        }
        coefficients
            .entry(order)
            .and_modify(|c| *c = (c.clone() + coeff.clone()).symplify())
            .or_insert(coeff);
    }
    let order = *coefficients.keys().max().ok_or_else(|| {
        VibrationError::UnsupportedGoverningEquation(
            "the spatial group of the separated equation is empty".to_string(),
        )
    })?;
    if order < 2 {
        return Err(VibrationError::UnsupportedGoverningEquation(
            "the spatial equation is of order below two".to_string(),
        ));
    }
    if coefficients.keys().any(|o| *o != 0 && *o != order) {
        return Err(VibrationError::UnsupportedGoverningEquation(
            "intermediate spatial derivative orders are outside the closed-form family"
                .to_string(),
        ));
    }
    let leading = coefficients.remove(&order).unwrap_or(Expr::Const(0.0));
    let zeroth = coefficients.remove(&0).unwrap_or(Expr::Const(0.0));
    Ok(SpatialOperator {
        order,
        leading,
        zeroth,
    })
}

/// closed-form general solution of the spatial equation, with the dispersion
/// expression `s(k) = a_0 + a_m (-1)^(m/2) k^m`
pub fn spatial_general_solution(
    system: &ContinuousSystem,
) -> Result<SpatialSolution, VibrationError> {
    let operator = spatial_operator(system)?;
    let general = symbolic_ode::oscillatory_general_solution(
        operator.order,
        &system.separation_constant_symbol,
        &system.spatial_vars[0],
    )
    .map_err(VibrationError::UnsupportedGoverningEquation)?;
    let sign = if (operator.order / 2) % 2 == 0 { 1.0 } else { -1.0 };
    let k = Expr::Var(system.separation_constant_symbol.clone());
    let dispersion = (operator.zeroth
        + operator.leading * Expr::Const(sign) * k.pow(Expr::Const(operator.order as f64)))
    .symplify();
    log::info!(
        "spatial general solution of `{}`: {} (order {})",
        system.label,
        general.expr,
        general.order
    );
    Ok(SpatialSolution {
        expr: general.expr,
        constants: general.constants,
        order: general.order,
        dispersion,
    })
}

/// coefficient of T'' in the temporal group; a natural frequency exists only
/// for an undamped second-order temporal equation
fn temporal_inertia(system: &ContinuousSystem) -> Result<Expr, VibrationError> {
    let (time_terms, _) = separated_groups(system)?;
    let time_char = system.time_var.clone();
    let mut inertia = Expr::Const(0.0);
    let mut found = false;
    for term in expand_terms(&time_terms) {
        let mut jet_factor: Option<(String, usize)> = None;
        for var in term.extract_variables() {
            if let Some(order) = factor_jet_order(&var, TIME_FACTOR, &time_char) {
                jet_factor = Some((var, order));
            }
        }
        let (jet_var, order) = jet_factor.ok_or_else(|| {
            VibrationError::UnsupportedGoverningEquation(format!(
                "temporal term `{}` carries no temporal factor",
                term
            ))
        })?;
        if order != 2 {
            return Err(VibrationError::UnsupportedGoverningEquation(
                "the temporal equation is not undamped second order".to_string(),
            ));
        }
        let coeff = term.strip_factor(&jet_var).ok_or_else(|| {
            VibrationError::UnsupportedGoverningEquation(format!(
                "temporal term `{}` is not linear in `{}`",
                term, jet_var
            ))
        })?;
        inertia = (inertia + coeff).symplify();
        found = true;
    }
    if !found {
        return Err(VibrationError::UnsupportedGoverningEquation(
            "the separated equation has no inertial term".to_string(),
        ));
    }
    Ok(inertia)
}

/// Natural circular frequency of the mode at the given wavenumber, from the
/// temporal equation `b2 T'' = s(k) T`. Returns None (with a logged warning)
/// when the frequency cannot be evaluated numerically.
pub fn natural_frequency(
    system: &ContinuousSystem,
    dispersion: &Expr,
    k_value: f64,
) -> Option<f64> {
    let inertia = match temporal_inertia(system) {
        Ok(expr) => expr,
        Err(e) => {
            log::warn!("natural frequency unavailable: {}", e);
            return None;
        }
    };
    if !inertia.extract_variables().is_empty() {
        log::warn!(
            "natural frequency unavailable: temporal inertia `{}` is not numeric",
            inertia
        );
        return None;
    }
    let k = system.separation_constant_symbol.as_str();
    if dispersion.extract_variables().iter().any(|v| v.as_str() != k) {
        log::warn!(
            "natural frequency unavailable: dispersion `{}` has unresolved parameters",
            dispersion
        );
        return None;
    }
    let b2 = inertia.eval_expression(vec![], &[]);
    let s = dispersion.eval_expression(vec![k], &[k_value]);
    let omega_squared = -s / b2;
    if !omega_squared.is_finite() || omega_squared < 0.0 {
        log::warn!(
            "natural frequency unavailable: omega^2 = {} at k = {}",
            omega_squared,
            k_value
        );
        return None;
    }
    Some(omega_squared.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn string_system() -> ContinuousSystem {
        let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2");
        ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(1)
    }

    fn beam_system() -> ContinuousSystem {
        let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - EI/2 * q_xx^2");
        ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(4)
    }

    fn eval(expr: &Expr, bindings: &[(&str, f64)]) -> f64 {
        let vars: Vec<&str> = bindings.iter().map(|(v, _)| *v).collect();
        let values: Vec<f64> = bindings.iter().map(|(_, v)| *v).collect();
        expr.eval_expression(vars, &values)
    }

    #[test]
    fn test_apply_separation_wave_equation() {
        let separated = apply_separation(&string_system()).unwrap();
        // rho*T''*X - T0*T*X'' at chosen jet values
        let value = eval(
            &separated,
            &[
                ("rho", 2.0),
                ("T0", 3.0),
                ("T", 0.5),
                ("T_tt", 1.5),
                ("X", 0.25),
                ("X_xx", 2.0),
            ],
        );
        assert_relative_eq!(value, 2.0 * 1.5 * 0.25 - 3.0 * 0.5 * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_separated_sides_balance() {
        // for X = sin(k x), T arbitrary: spatial side must equal -T0*k^2
        let sep = separated_vars_eqn(&string_system()).unwrap();
        let k: f64 = 2.0;
        let spatial = eval(
            &sep.spatial_side,
            &[("T0", 3.0), ("X", 1.0), ("X_xx", -k * k)],
        );
        assert_relative_eq!(spatial, -3.0 * k * k, epsilon = 1e-12);
        // temporal side of rho*T'' / T with T'' = -w^2 T
        let time = eval(&sep.time_side, &[("rho", 2.0), ("T", 0.7), ("T_tt", -0.7)]);
        assert_relative_eq!(time, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spatial_solution_orders() {
        let string_sol = spatial_general_solution(&string_system()).unwrap();
        assert_eq!(string_sol.order, 2);
        assert_eq!(string_sol.constants, vec!["C1", "C2"]);
        let beam_sol = spatial_general_solution(&beam_system()).unwrap();
        assert_eq!(beam_sol.order, 4);
        assert_eq!(beam_sol.constants.len(), 4);
    }

    #[test]
    fn test_string_dispersion() {
        let sol = spatial_general_solution(&string_system()).unwrap();
        // s(k) = -T0 * k^2
        let s = eval(&sol.dispersion, &[("T0", 3.0), ("k", 2.0)]);
        assert_relative_eq!(s, -12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_beam_dispersion_sign() {
        let sol = spatial_general_solution(&beam_system()).unwrap();
        // s(k) = -EI * k^4
        let s = eval(&sol.dispersion, &[("EI", 2.0), ("k", 1.5)]);
        assert_relative_eq!(s, -2.0 * 1.5f64.powi(4), epsilon = 1e-12);
    }

    #[test]
    fn test_foundation_shifts_dispersion() {
        let lagrangian =
            Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2 - kappa/2 * q^2");
        let system = ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(1);
        let sol = spatial_general_solution(&system).unwrap();
        // s(k) = -kappa - T0 * k^2
        let s = eval(&sol.dispersion, &[("T0", 1.0), ("kappa", 4.0), ("k", 3.0)]);
        assert_relative_eq!(s, -4.0 - 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_natural_frequency_of_string() {
        let system = string_system().with_numeric_values(&std::collections::HashMap::from([
            ("rho".to_string(), 4.0),
            ("T0".to_string(), 1.0),
        ]));
        let sol = spatial_general_solution(&system).unwrap();
        // omega = k * sqrt(T0 / rho) = k / 2
        let omega = natural_frequency(&system, &sol.dispersion, 3.0).unwrap();
        assert_relative_eq!(omega, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_term_is_rejected() {
        // L with a q_t * q_x coupling produces a mixed jet in the governing
        // equation, which does not separate
        let lagrangian =
            Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2 + g * q_t * q_x");
        let system = ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(1);
        assert!(matches!(
            separated_vars_eqn(&system),
            Err(VibrationError::UnsupportedGoverningEquation(_))
        ));
    }

    #[test]
    fn test_factor_name_collision_is_rejected() {
        // the Lagrangian already uses the symbol X
        let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - X/2 * q_x^2");
        let system = ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(1);
        assert!(matches!(
            apply_separation(&system),
            Err(VibrationError::UnsupportedGoverningEquation(_))
        ));
    }
}
