//! Eigenmode composition.
//!
//! At a located wavenumber the fundamental matrix is singular with a
//! one-parameter null space. The constants are resolved the way the
//! classical hand computation goes: trigonometric atoms that numerically
//! vanish at the wavenumber are treated as structurally zero, the last
//! (redundant) residual equation is dropped, `C1` is set to one and the
//! remaining constants are solved from the reduced linear system. Mode
//! shapes are therefore defined up to the arbitrary `C1` scale.
//!
//! The zero-snap threshold lives in `EigenSearchConfig::zero_tol`. A snap
//! that matches no atom or every atom leaves the reduction ambiguous; the
//! composition still proceeds but the degeneracy is surfaced as a
//! [`ModeNormalizationWarning`] and in the log.

use crate::Continuum::boundary;
use crate::Continuum::continuous_system::{ContinuousSystem, VibrationError};
use crate::Continuum::eigen::{self, EigenvalueStrategy};
use crate::Continuum::separation;
use crate::symbolic::symbolic_engine::Expr;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// non-fatal degeneracies of the constant-resolution heuristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModeNormalizationWarning {
    /// no trigonometric atom vanished at the wavenumber
    NoAtomsVanish,
    /// every trigonometric atom vanished at the wavenumber
    AllAtomsVanish,
    /// the reduced linear system was singular; a least-squares solution was used
    SingularReducedSystem,
}

impl fmt::Display for ModeNormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModeNormalizationWarning::NoAtomsVanish => {
                write!(f, "no trigonometric atom vanished at the eigenvalue")
            }
            ModeNormalizationWarning::AllAtomsVanish => {
                write!(f, "every trigonometric atom vanished at the eigenvalue")
            }
            ModeNormalizationWarning::SingularReducedSystem => {
                write!(f, "reduced boundary system is singular")
            }
        }
    }
}

/// one normalized eigenmode of a continuous system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eigenmode {
    pub mode_index: usize,
    /// wavenumber k_n
    pub wavenumber: f64,
    /// natural circular frequency, when the temporal equation yields one
    pub natural_frequency: Option<f64>,
    /// resolved integration constants C1..Cm, C1 = 1
    pub constants: Vec<f64>,
    /// mode shape with values displayed to two significant digits
    pub shape: Expr,
    /// mode shape at full precision, used for numeric evaluation
    pub shape_exact: Expr,
    pub warning: Option<ModeNormalizationWarning>,
}

impl fmt::Display for Eigenmode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "mode {}: {}", self.mode_index, self.shape)
    }
}

impl Eigenmode {
    /// mode shape as a plain numeric function of the spatial coordinate
    pub fn shape_fn(&self) -> Box<dyn Fn(f64) -> f64> {
        self.shape_exact.lambdify1D()
    }
}

fn round_sig(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - magnitude);
    (value * factor).round() / factor
}

/// compose the eigenmode of the requested mode index
pub fn eigenmodes(
    system: &ContinuousSystem,
    strategy: &EigenvalueStrategy,
    mode_no: usize,
) -> Result<Eigenmode, VibrationError> {
    let solution = separation::spatial_general_solution(system)?;
    let matrix = boundary::fundamental_matrix(
        &system.spatial_vars[0],
        &system.boundary_conditions,
        &solution,
    )?;
    let k_symbol = system.separation_constant_symbol.clone();
    let leftover: Vec<String> = matrix
        .extract_variables()
        .into_iter()
        .filter(|v| *v != k_symbol)
        .collect();
    if !leftover.is_empty() {
        return Err(VibrationError::UnresolvedParameter(leftover.join(", ")));
    }
    let sequence = eigen::eigenvalues(system, strategy)?;
    let wavenumber = sequence.nth(mode_no).ok_or_else(|| {
        VibrationError::NoEigenvalueSolution(format!(
            "mode index {} is beyond the located roots",
            mode_no
        ))
    })?;

    // treat trigonometric atoms that numerically vanish at k_n as exact zeros
    let atoms = matrix.collect_atoms(&|e| {
        matches!(
            e,
            Expr::Sin(_) | Expr::Cos(_) | Expr::Sinh(_) | Expr::Cosh(_)
        )
    });
    let mut snapped = 0usize;
    let mut reduced_matrix = matrix.clone();
    for atom in &atoms {
        let value = atom.eval_expression(vec![k_symbol.as_str()], &[wavenumber]);
        if value.abs() < system.config.zero_tol {
            reduced_matrix =
                reduced_matrix.map(&|e| e.substitute_expr(atom, &Expr::Const(0.0)).symplify());
            snapped += 1;
        }
    }
    let mut warning = if atoms.is_empty() || snapped == 0 {
        Some(ModeNormalizationWarning::NoAtomsVanish)
    } else if snapped == atoms.len() {
        Some(ModeNormalizationWarning::AllAtomsVanish)
    } else {
        None
    };

    // drop the last (redundant) equation, pin C1 = 1 and solve for the rest
    let size = reduced_matrix.ncols();
    let numeric: DMatrix<f64> =
        reduced_matrix.evaluate(vec![k_symbol.as_str()], &[wavenumber]);
    let mut constants = vec![1.0];
    if size > 1 {
        let reduced = DMatrix::from_fn(size - 1, size - 1, |i, j| numeric[(i, j + 1)]);
        let rhs = DVector::from_fn(size - 1, |i, _| -numeric[(i, 0)]);
        match reduced.clone().lu().solve(&rhs) {
            Some(tail) => constants.extend(tail.iter()),
            None => {
                warning = Some(ModeNormalizationWarning::SingularReducedSystem);
                let tail = reduced
                    .svd(true, true)
                    .solve(&rhs, 1e-12)
                    .map_err(|e| VibrationError::NoEigenvalueSolution(e.to_string()))?;
                constants.extend(tail.iter());
            }
        }
    }
    if let Some(w) = warning {
        log::warn!(
            "mode {} of `{}` composed with a degenerate reduction: {}",
            mode_no,
            system.label,
            w
        );
    }

    let natural_frequency = separation::natural_frequency(system, &solution.dispersion, wavenumber);

    let mut shape_exact = solution.expr.substitute(&k_symbol, &Expr::Const(wavenumber));
    let mut shape = solution
        .expr
        .substitute(&k_symbol, &Expr::Const(round_sig(wavenumber, 2)));
    for (name, value) in solution.constants.iter().zip(&constants) {
        shape_exact = shape_exact.substitute(name, &Expr::Const(*value));
        shape = shape.substitute(name, &Expr::Const(round_sig(*value, 2)));
    }
    Ok(Eigenmode {
        mode_index: mode_no,
        wavenumber,
        natural_frequency,
        constants,
        shape: shape.symplify(),
        shape_exact: shape_exact.symplify(),
        warning,
    })
}

/// inner product of two mode shapes over the spatial interval
pub fn inner_product(a: &Eigenmode, b: &Eigenmode, x_start: f64, x_end: f64) -> f64 {
    let fa = a.shape_fn();
    let fb = b.shape_fn();
    crate::Utils::quadrature::simpson(&|x| fa(x) * fb(x), x_start, x_end, 2000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_sig() {
        assert_eq!(round_sig(3.14159, 2), 3.1);
        assert_eq!(round_sig(6.28318, 2), 6.3);
        assert_eq!(round_sig(0.0123456, 2), 0.012);
        assert_eq!(round_sig(-271.8, 2), -270.0);
        assert_eq!(round_sig(0.0, 2), 0.0);
    }
}
