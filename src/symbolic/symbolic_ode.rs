//! Closed-form general solutions of the separated spatial equation.
//!
//! The separation step reduces every supported system to the constant
//! coefficient family
//! ```text
//! X^(m) = (-1)^(m/2) * k^m * X,    m even
//! ```
//! parameterized by the wavenumber `k`. For m = 2 the real solution basis is
//! oscillatory, for m = 4 it is the classic mixed trigonometric/hyperbolic
//! beam basis. Integration constants are named `C1..Cm`.

use crate::symbolic::symbolic_engine::Expr;
use serde::{Deserialize, Serialize};

/// general solution of the separated spatial equation, parameterized by the
/// wavenumber symbol and the integration constants `C1..Cm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSolution {
    pub expr: Expr,
    pub constants: Vec<String>,
    pub order: usize,
}

/// build the general solution of `X^(m) = (-1)^(m/2) k^m X` in the spatial
/// variable. Orders outside the closed-form family are rejected.
pub fn oscillatory_general_solution(
    order: usize,
    wavenumber: &str,
    spatial_var: &str,
) -> Result<GeneralSolution, String> {
    let k = Expr::Var(wavenumber.to_string());
    let x = Expr::Var(spatial_var.to_string());
    let arg = k * x;
    match order {
        2 => {
            let expr = Expr::Var("C1".to_string()) * arg.clone().sin()
                + Expr::Var("C2".to_string()) * arg.cos();
            Ok(GeneralSolution {
                expr,
                constants: vec!["C1".to_string(), "C2".to_string()],
                order,
            })
        }
        4 => {
            let expr = Expr::Var("C1".to_string()) * arg.clone().sin()
                + Expr::Var("C2".to_string()) * arg.clone().cos()
                + Expr::Var("C3".to_string()) * arg.clone().sinh()
                + Expr::Var("C4".to_string()) * arg.cosh();
            Ok(GeneralSolution {
                expr,
                constants: vec![
                    "C1".to_string(),
                    "C2".to_string(),
                    "C3".to_string(),
                    "C4".to_string(),
                ],
                order,
            })
        }
        _ => Err(format!(
            "no closed-form solution is implemented for a spatial equation of order {}",
            order
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_second_order_solution_satisfies_ode() {
        let sol = oscillatory_general_solution(2, "k", "x").unwrap();
        assert_eq!(sol.constants, vec!["C1", "C2"]);
        // X'' + k^2 X must vanish for any constants
        let xpp = sol.expr.diff("x").diff("x").symplify();
        let k = 1.7;
        let residual = |x: f64| {
            let vars = vec!["k", "x", "C1", "C2"];
            let values = [k, x, 0.8, -0.3];
            xpp.eval_expression(vars.clone(), &values)
                + k * k * sol.expr.eval_expression(vars, &values)
        };
        assert_relative_eq!(residual(0.3), 0.0, epsilon = 1e-10);
        assert_relative_eq!(residual(1.1), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_fourth_order_solution_satisfies_ode() {
        let sol = oscillatory_general_solution(4, "k", "x").unwrap();
        assert_eq!(sol.constants.len(), 4);
        // X'''' - k^4 X must vanish for any constants
        let x4 = sol
            .expr
            .diff("x")
            .diff("x")
            .diff("x")
            .diff("x")
            .symplify();
        let k = 1.3;
        let vars = vec!["k", "x", "C1", "C2", "C3", "C4"];
        let values = [k, 0.6, 1.0, -0.5, 0.25, 2.0];
        let residual = x4.eval_expression(vars.clone(), &values)
            - k.powi(4) * sol.expr.eval_expression(vars, &values);
        assert_relative_eq!(residual, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unsupported_order() {
        assert!(oscillatory_general_solution(3, "k", "x").is_err());
        assert!(oscillatory_general_solution(6, "k", "x").is_err());
    }
}
