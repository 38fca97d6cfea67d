//! Derivation of the governing equation from the Lagrangian density via the
//! Euler-Lagrange identity:
//!
//! ```text
//! d/dt(dL/dq_t) + SUM_x SUM_{j=1..order} (-1)^(j+1) d^j/dx^j (dL/dq_{x^j}) - dL/dq = 0
//! ```
//!
//! The alternating sign comes from repeated integration by parts in the
//! variational principle. Derivatives of the field beyond `derivative_order`
//! do not enter the sum; `ContinuousSystem::check_task` is the explicit guard
//! against a Lagrangian that carries such terms.

use crate::Continuum::continuous_system::{ContinuousSystem, JetSpace, VibrationError};
use crate::symbolic::symbolic_engine::Expr;

/// differentiation axis of the jet space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    Time,
    Spatial(usize),
}

/// Total derivative along one independent variable: the explicit dependence
/// plus the chain rule over every jet variable of the field. Taking the total
/// x-derivative of an expression in `q_x` produces a term in `q_xx`, and so
/// on up the jet ladder.
pub fn total_derivative(expr: &Expr, jet: &JetSpace, axis: Axis) -> Expr {
    let independent = match axis {
        Axis::Time => jet.time.clone(),
        Axis::Spatial(i) => jet.spatial[i].clone(),
    };
    let mut out = expr.diff(&independent);
    for var in expr.extract_variables() {
        if let Some((time_order, mut spatial_orders)) = jet.decompose(&var) {
            let bumped = match axis {
                Axis::Time => jet.name(time_order + 1, &spatial_orders),
                Axis::Spatial(i) => {
                    spatial_orders[i] += 1;
                    jet.name(time_order, &spatial_orders)
                }
            };
            out = out + expr.diff(&var) * Expr::Var(bumped);
        }
    }
    out.symplify()
}

/// d/dt(dL/d(dq/dt))
pub fn inertia_term(system: &ContinuousSystem) -> Result<Expr, VibrationError> {
    let jet = system.jet_space()?;
    let zeros = vec![0usize; system.spatial_vars.len()];
    let q_t = jet.name(1, &zeros);
    let momentum = system.lagrangian_density.diff(&q_t).symplify();
    Ok(total_derivative(&momentum, &jet, Axis::Time))
}

/// the spatial part of the variational derivative, including -dL/dq
pub fn restoring_term(system: &ContinuousSystem) -> Result<Expr, VibrationError> {
    let jet = system.jet_space()?;
    let zeros = vec![0usize; system.spatial_vars.len()];
    let mut acc =
        Expr::Const(-1.0) * system.lagrangian_density.diff(&jet.name(0, &zeros));
    for axis in 0..system.spatial_vars.len() {
        for order in 1..=system.derivative_order {
            let mut orders = zeros.clone();
            orders[axis] = order;
            let mut term = system
                .lagrangian_density
                .diff(&jet.name(0, &orders))
                .symplify();
            if term.is_zero() {
                continue;
            }
            for _ in 0..order {
                term = total_derivative(&term, &jet, Axis::Spatial(axis));
            }
            // (-1)^(order+1): odd orders enter with +, even with -
            let sign = if order % 2 == 1 { 1.0 } else { -1.0 };
            acc = acc + Expr::Const(sign) * term;
        }
    }
    Ok(acc.symplify())
}

/// the full Euler-Lagrange expression, required to equal zero at a solution
pub fn governing_equation(system: &ContinuousSystem) -> Result<Expr, VibrationError> {
    let equation = (inertia_term(system)? + restoring_term(system)?).symplify();
    log::info!(
        "governing equation of `{}` derived: {}",
        system.label,
        equation
    );
    Ok(equation)
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

    /// evaluate an expression at a single unit jet with given parameter values
    fn coefficient_of(expr: &Expr, jet_var: &str, params: &[(&str, f64)]) -> f64 {
        let all_vars = expr.extract_variables();
        let names: Vec<&str> = all_vars.iter().map(|s| s.as_str()).collect();
        let values: Vec<f64> = all_vars
            .iter()
            .map(|name| {
                if name.as_str() == jet_var {
                    1.0
                } else if let Some((_, v)) = params.iter().find(|(p, _)| *p == name.as_str()) {
                    *v
                } else {
                    0.0
                }
            })
            .collect();
        expr.eval_expression(names, &values)
    }

    #[test]
    fn test_string_governing_equation() {
        let system = string_system();
        let equation = governing_equation(&system).unwrap();
        // rho*q_tt - T0*q_xx, checked through unit-jet evaluation
        let params = [("rho", 2.0), ("T0", 3.0)];
        assert_relative_eq!(coefficient_of(&equation, "q_tt", &params), 2.0, epsilon = 1e-12);
        assert_relative_eq!(coefficient_of(&equation, "q_xx", &params), -3.0, epsilon = 1e-12);
        // no fourth-derivative stiffness in a first-order variational sum
        assert!(!equation.contains_var("q_xxxx"));
    }

    #[test]
    fn test_beam_governing_equation() {
        let system = beam_system();
        let equation = governing_equation(&system).unwrap();
        let params = [("rho", 1.0), ("EI", 5.0)];
        assert_relative_eq!(coefficient_of(&equation, "q_tt", &params), 1.0, epsilon = 1e-12);
        // the fourth-derivative stiffness term carries a positive sign
        assert_relative_eq!(
            coefficient_of(&equation, "q_xxxx", &params),
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_beam_order_two_matches_order_four() {
        // orders above the highest jet actually present contribute nothing
        let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - EI/2 * q_xx^2");
        let two = ContinuousSystem::new(lagrangian.clone(), "q", vec![]).with_derivative_order(2);
        let four = ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(4);
        let params = [("rho", 1.0), ("EI", 5.0)];
        let eq2 = governing_equation(&two).unwrap();
        let eq4 = governing_equation(&four).unwrap();
        assert_relative_eq!(
            coefficient_of(&eq2, "q_xxxx", &params),
            coefficient_of(&eq4, "q_xxxx", &params),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_foundation_term_enters_with_plus() {
        // L = rho/2 q_t^2 - T0/2 q_x^2 - kappa/2 q^2  =>  ... + kappa*q
        let lagrangian =
            Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2 - kappa/2 * q^2");
        let system = ContinuousSystem::new(lagrangian, "q", vec![]).with_derivative_order(1);
        let equation = governing_equation(&system).unwrap();
        let params = [("rho", 1.0), ("T0", 1.0), ("kappa", 7.0)];
        assert_relative_eq!(coefficient_of(&equation, "q", &params), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_total_derivative_ladder() {
        let jet = JetSpace::new("q", "t", &["x".to_string()]).unwrap();
        let expr = Expr::Var("a".to_string()) * Expr::Var("q_x".to_string());
        let bumped = total_derivative(&expr, &jet, Axis::Spatial(0));
        assert!(bumped.contains_var("q_xx"));
        assert!(!bumped.contains_var("q_xxx"));
    }
}
