//! Dense symbolic matrices.
//!
//! The two operations the boundary-value machinery needs are the Jacobian of
//! a residual vector with respect to a list of symbols, and the determinant
//! of the resulting square matrix. Numeric evaluation bridges into
//! `nalgebra::DMatrix` for the linear-algebra side.

use crate::symbolic::symbolic_engine::Expr;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprMatrix {
    rows: Vec<Vec<Expr>>,
}

impl fmt::Display for ExprMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            let rendered: Vec<String> = row.iter().map(|e| format!("{}", e)).collect();
            writeln!(f, "[ {} ]", rendered.join(", "))?;
        }
        Ok(())
    }
}

impl ExprMatrix {
    pub fn new(rows: Vec<Vec<Expr>>) -> Result<Self, String> {
        if rows.is_empty() {
            return Err("matrix must have at least one row".to_string());
        }
        let ncols = rows[0].len();
        if rows.iter().any(|r| r.len() != ncols) {
            return Err("matrix rows have unequal lengths".to_string());
        }
        Ok(ExprMatrix { rows })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.rows[0].len()
    }

    pub fn entry(&self, i: usize, j: usize) -> &Expr {
        &self.rows[i][j]
    }

    pub fn rows(&self) -> &[Vec<Expr>] {
        &self.rows
    }

    /// Jacobian of a residual vector with respect to the given symbols:
    /// entry (i, j) = d residual_i / d symbol_j, simplified
    pub fn jacobian(residuals: &[Expr], symbols: &[String]) -> Result<Self, String> {
        if residuals.is_empty() || symbols.is_empty() {
            return Err("jacobian needs at least one residual and one symbol".to_string());
        }
        let rows = residuals
            .iter()
            .map(|res| symbols.iter().map(|s| res.diff(s).symplify()).collect())
            .collect();
        ExprMatrix::new(rows)
    }

    /// apply a function to every entry
    pub fn map(&self, f: &dyn Fn(&Expr) -> Expr) -> Self {
        ExprMatrix {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|e| f(e)).collect())
                .collect(),
        }
    }

    /// matrix times a symbolic column vector
    pub fn mul_vector(&self, vector: &[Expr]) -> Result<Vec<Expr>, String> {
        if vector.len() != self.ncols() {
            return Err(format!(
                "vector length {} does not match {} columns",
                vector.len(),
                self.ncols()
            ));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| {
                let mut acc = Expr::Const(0.0);
                for (entry, v) in row.iter().zip(vector) {
                    acc = acc + entry.clone() * v.clone();
                }
                acc.symplify()
            })
            .collect())
    }

    /// determinant by recursive Laplace expansion along the first row
    pub fn det(&self) -> Result<Expr, String> {
        if self.nrows() != self.ncols() {
            return Err(format!(
                "determinant of a non-square {}x{} matrix",
                self.nrows(),
                self.ncols()
            ));
        }
        Ok(det_recursive(&self.rows))
    }

    /// collect all distinct subexpressions matching a predicate over all entries
    pub fn collect_atoms(&self, pred: &dyn Fn(&Expr) -> bool) -> Vec<Expr> {
        let mut atoms: Vec<Expr> = Vec::new();
        for row in &self.rows {
            for entry in row {
                for atom in entry.collect_atoms(pred) {
                    if !atoms.contains(&atom) {
                        atoms.push(atom);
                    }
                }
            }
        }
        atoms
    }

    /// sorted list of all variable names over all entries
    pub fn extract_variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for row in &self.rows {
            for entry in row {
                for v in entry.extract_variables() {
                    if !vars.contains(&v) {
                        vars.push(v);
                    }
                }
            }
        }
        vars.sort();
        vars
    }

    /// evaluate every entry at the given variable values
    pub fn evaluate(&self, vars: Vec<&str>, values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_fn(self.nrows(), self.ncols(), |i, j| {
            self.rows[i][j].eval_expression(vars.clone(), values)
        })
    }
}

fn det_recursive(rows: &[Vec<Expr>]) -> Expr {
    let n = rows.len();
    if n == 1 {
        return rows[0][0].clone();
    }
    let mut acc = Expr::Const(0.0);
    for (j, pivot) in rows[0].iter().enumerate() {
        if pivot.is_zero() {
            continue;
        }
        let minor: Vec<Vec<Expr>> = rows[1..]
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(col, _)| *col != j)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .collect();
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        let cofactor = Expr::Const(sign) * pivot.clone() * det_recursive(&minor);
        acc = (acc + cofactor).symplify();
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    #[test]
    fn test_jacobian_of_linear_residuals() {
        // r0 = C1 + 2*C2, r1 = 3*C1 - C2
        let residuals = vec![
            var("C1") + Expr::Const(2.0) * var("C2"),
            Expr::Const(3.0) * var("C1") - var("C2"),
        ];
        let symbols = vec!["C1".to_string(), "C2".to_string()];
        let jac = ExprMatrix::jacobian(&residuals, &symbols).unwrap();
        let numeric = jac.evaluate(vec![], &[]);
        assert_relative_eq!(numeric[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(numeric[(0, 1)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(numeric[(1, 0)], 3.0, epsilon = 1e-12);
        assert_relative_eq!(numeric[(1, 1)], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_det_2x2_symbolic() {
        // [[0, 1], [sin(k), cos(k)]] -> det = -sin(k)
        let m = ExprMatrix::new(vec![
            vec![Expr::Const(0.0), Expr::Const(1.0)],
            vec![var("k").sin(), var("k").cos()],
        ])
        .unwrap();
        let det = m.det().unwrap().symplify();
        let value = det.eval_expression(vec!["k"], &[0.7]);
        assert_relative_eq!(value, -(0.7f64).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_det_3x3_numeric() {
        let m = ExprMatrix::new(vec![
            vec![Expr::Const(2.0), Expr::Const(0.0), Expr::Const(1.0)],
            vec![Expr::Const(1.0), Expr::Const(3.0), Expr::Const(2.0)],
            vec![Expr::Const(1.0), Expr::Const(1.0), Expr::Const(1.0)],
        ])
        .unwrap();
        let det = m.det().unwrap();
        let value = det.eval_expression(vec![], &[]);
        assert_relative_eq!(value, 2.0 * (3.0 - 2.0) + 1.0 * (1.0 - 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_det_rejects_rectangular() {
        let m = ExprMatrix::new(vec![vec![Expr::Const(1.0), Expr::Const(2.0)]]).unwrap();
        assert!(m.det().is_err());
    }

    #[test]
    fn test_mul_vector() {
        let m = ExprMatrix::new(vec![
            vec![Expr::Const(1.0), Expr::Const(2.0)],
            vec![Expr::Const(0.0), Expr::Const(1.0)],
        ])
        .unwrap();
        let product = m.mul_vector(&[var("C1"), var("C2")]).unwrap();
        let first = product[0].eval_expression(vec!["C1", "C2"], &[1.0, 2.0]);
        assert_relative_eq!(first, 5.0, epsilon = 1e-12);
    }
}
