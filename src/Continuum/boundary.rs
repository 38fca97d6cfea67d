//! Boundary conditions of the spatial problem and the fundamental matrix.
//!
//! A boundary condition prescribes the value of the spatial factor or one of
//! its derivatives at a fixed coordinate, e.g. `X(0) = 0` or `X''(L) = 0`.
//! The textual format is the prime notation: the factor name, zero or more
//! primes, and the location in parentheses.
//!
//! The fundamental matrix is the Jacobian of the stacked boundary residuals
//! with respect to the integration constants of the spatial general
//! solution; it depends on the separation constant alone once every other
//! parameter is substituted. The computation is pure: rebinding the
//! conditions stored on a system goes through the explicitly named
//! `ContinuousSystem::set_boundary_conditions`.

use crate::Continuum::continuous_system::VibrationError;
use crate::Continuum::separation::SpatialSolution;
use crate::symbolic::parse_expr::try_parse_expression;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_matrix::ExprMatrix;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// one prescribed boundary value: `d^order X / dx^order (location) = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub order: usize,
    pub location: Expr,
    pub value: Expr,
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "X{}({}) = {}", "'".repeat(self.order), self.location, self.value)
    }
}

impl BoundaryCondition {
    pub fn new(order: usize, location: Expr, value: Expr) -> Self {
        BoundaryCondition {
            order,
            location,
            value,
        }
    }

    /// parse the left-hand side of a condition, e.g. `X''(L)`
    pub fn parse(notation: &str, value: Expr) -> Result<Self, VibrationError> {
        let pattern = Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*('*)\s*\(([^()]+)\)\s*$")
            .map_err(|e| VibrationError::BoundaryConditionParse(e.to_string()))?;
        let captures = pattern
            .captures(notation)
            .ok_or_else(|| VibrationError::BoundaryConditionParse(notation.to_string()))?;
        let order = captures[2].len();
        let location = try_parse_expression(&captures[3])
            .map_err(|e| VibrationError::BoundaryConditionParse(format!("{}: {}", notation, e)))?;
        Ok(BoundaryCondition::new(order, location, value))
    }

    /// parse a full condition line, e.g. `X''(L) = 0`
    pub fn parse_line(line: &str) -> Result<Self, VibrationError> {
        let (lhs, rhs) = line
            .split_once('=')
            .ok_or_else(|| VibrationError::BoundaryConditionParse(line.to_string()))?;
        let value = try_parse_expression(rhs)
            .map_err(|e| VibrationError::BoundaryConditionParse(format!("{}: {}", line, e)))?;
        BoundaryCondition::parse(lhs, value)
    }
}

/// Evaluate the spatial general solution at every boundary condition and take
/// the Jacobian of the residual vector with respect to the integration
/// constants. The condition count must match the constant count.
pub fn fundamental_matrix(
    spatial_var: &str,
    boundary_conditions: &[BoundaryCondition],
    solution: &SpatialSolution,
) -> Result<ExprMatrix, VibrationError> {
    if boundary_conditions.len() != solution.constants.len() {
        return Err(VibrationError::BoundaryConditionMismatch {
            expected: solution.constants.len(),
            found: boundary_conditions.len(),
        });
    }
    let residuals: Vec<Expr> = boundary_conditions
        .iter()
        .map(|bc| {
            let mut derivative = solution.expr.clone();
            for _ in 0..bc.order {
                derivative = derivative.diff(spatial_var);
            }
            (derivative.substitute(spatial_var, &bc.location) - bc.value.clone()).symplify()
        })
        .collect();
    ExprMatrix::jacobian(&residuals, &solution.constants)
        .map_err(VibrationError::InvalidConfiguration)
}
