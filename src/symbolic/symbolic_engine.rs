#![allow(non_snake_case)]

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// Define an enum to represent different types of symbolic expressions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Var(String),
    Const(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Sinh(Box<Expr>),
    Cosh(Box<Expr>),
}

// Implement Display for pretty printing
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::Sin(expr) => write!(f, "sin({})", expr),
            Expr::Cos(expr) => write!(f, "cos({})", expr),
            Expr::Sinh(expr) => write!(f, "sinh({})", expr),
            Expr::Cosh(expr) => write!(f, "cosh({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = Expr::Add(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Expr::Sub(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Expr::Mul(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// create new variables from a comma-separated string
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    // just shortcut for box
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    // implementing different functions that are not part of std
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }
    pub fn sin(self) -> Expr {
        Expr::Sin(self.boxed())
    }
    pub fn cos(self) -> Expr {
        Expr::Cos(self.boxed())
    }
    pub fn sinh(self) -> Expr {
        Expr::Sinh(self.boxed())
    }
    pub fn cosh(self) -> Expr {
        Expr::Cosh(self.boxed())
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Const(val) => val == &0.0,
            _ => false,
        }
    }

    /// rebuild the tree, replacing every node for which the rule returns Some.
    /// The rule is applied top-down, so the largest matching subtree wins.
    pub fn transform(&self, rule: &dyn Fn(&Expr) -> Option<Expr>) -> Expr {
        if let Some(replaced) = rule(self) {
            return replaced;
        }
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                Expr::Add(lhs.transform(rule).boxed(), rhs.transform(rule).boxed())
            }
            Expr::Sub(lhs, rhs) => {
                Expr::Sub(lhs.transform(rule).boxed(), rhs.transform(rule).boxed())
            }
            Expr::Mul(lhs, rhs) => {
                Expr::Mul(lhs.transform(rule).boxed(), rhs.transform(rule).boxed())
            }
            Expr::Div(lhs, rhs) => {
                Expr::Div(lhs.transform(rule).boxed(), rhs.transform(rule).boxed())
            }
            Expr::Pow(base, exp) => {
                Expr::Pow(base.transform(rule).boxed(), exp.transform(rule).boxed())
            }
            Expr::Exp(expr) => Expr::Exp(expr.transform(rule).boxed()),
            Expr::Ln(expr) => Expr::Ln(expr.transform(rule).boxed()),
            Expr::Sin(expr) => Expr::Sin(expr.transform(rule).boxed()),
            Expr::Cos(expr) => Expr::Cos(expr.transform(rule).boxed()),
            Expr::Sinh(expr) => Expr::Sinh(expr.transform(rule).boxed()),
            Expr::Cosh(expr) => Expr::Cosh(expr.transform(rule).boxed()),
        }
    }

    /// change a variable to a constant
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.transform(&|e| match e {
            Expr::Var(name) if name == var => Some(Expr::Const(value)),
            _ => None,
        })
    }

    /// change variables to constants from a map
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, f64>) -> Expr {
        self.transform(&|e| match e {
            Expr::Var(name) => var_map.get(name).map(|v| Expr::Const(*v)),
            _ => None,
        })
    }

    /// rename variable
    pub fn rename_variable(&self, old_var: &str, new_var: &str) -> Expr {
        self.transform(&|e| match e {
            Expr::Var(name) if name == old_var => Some(Expr::Var(new_var.to_string())),
            _ => None,
        })
    }

    /// rename variables from a map
    pub fn rename_variables(&self, var_map: &HashMap<String, String>) -> Expr {
        self.transform(&|e| match e {
            Expr::Var(name) => var_map.get(name).map(|v| Expr::Var(v.clone())),
            _ => None,
        })
    }

    /// replace a variable by an arbitrary expression
    pub fn substitute(&self, var: &str, replacement: &Expr) -> Expr {
        self.transform(&|e| match e {
            Expr::Var(name) if name == var => Some(replacement.clone()),
            _ => None,
        })
    }

    /// simultaneous substitution of several variables by expressions
    pub fn substitute_from_map(&self, var_map: &HashMap<String, Expr>) -> Expr {
        self.transform(&|e| match e {
            Expr::Var(name) => var_map.get(name).cloned(),
            _ => None,
        })
    }

    /// replace every occurrence of a whole subexpression by another expression
    pub fn substitute_expr(&self, target: &Expr, replacement: &Expr) -> Expr {
        self.transform(&|e| {
            if e == target {
                Some(replacement.clone())
            } else {
                None
            }
        })
    }

    ///__________________________________DIFFERENTIATION____________________________________

    /// partial derivative with respect to a named variable
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => lhs.diff(var) + rhs.diff(var),
            Expr::Sub(lhs, rhs) => lhs.diff(var) - rhs.diff(var),
            Expr::Mul(lhs, rhs) => {
                lhs.diff(var) * (**rhs).clone() + (**lhs).clone() * rhs.diff(var)
            }
            Expr::Div(lhs, rhs) => Expr::Div(
                (lhs.diff(var) * (**rhs).clone() - (**lhs).clone() * rhs.diff(var)).boxed(),
                Expr::Pow((**rhs).clone().boxed(), Expr::Const(2.0).boxed()).boxed(),
            ),
            Expr::Pow(base, exp) => {
                if exp.extract_variables().is_empty() {
                    // d/dx b^c = c * b^(c-1) * b'
                    (**exp).clone()
                        * Expr::Pow(
                            (**base).clone().boxed(),
                            ((**exp).clone() - Expr::Const(1.0)).boxed(),
                        )
                        * base.diff(var)
                } else {
                    // general case: b^e * (e' * ln b + e * b' / b)
                    Expr::Pow((**base).clone().boxed(), (**exp).clone().boxed())
                        * (exp.diff(var) * Expr::Ln((**base).clone().boxed())
                            + (**exp).clone() * base.diff(var) / (**base).clone())
                }
            }
            Expr::Exp(expr) => Expr::Exp((**expr).clone().boxed()) * expr.diff(var),
            Expr::Ln(expr) => expr.diff(var) / (**expr).clone(),
            Expr::Sin(expr) => Expr::Cos((**expr).clone().boxed()) * expr.diff(var),
            Expr::Cos(expr) => {
                Expr::Const(-1.0) * Expr::Sin((**expr).clone().boxed()) * expr.diff(var)
            }
            Expr::Sinh(expr) => Expr::Cosh((**expr).clone().boxed()) * expr.diff(var),
            Expr::Cosh(expr) => Expr::Sinh((**expr).clone().boxed()) * expr.diff(var),
        }
    }

    ///___________________________________SIMPLIFICATION____________________________________

    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) => self.clone(),
            Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b), // (a) + (b) = (a + b)
                    (Expr::Const(c), _) if *c == 0.0 => rhs, // 0 + x = x
                    (_, Expr::Const(c)) if *c == 0.0 => lhs, // x + 0 = x
                    _ => Expr::Add(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b), // (a) - (b) = (a - b)
                    (_, Expr::Const(c)) if *c == 0.0 => lhs, // x - 0 = x
                    (Expr::Const(c), _) if *c == 0.0 => {
                        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(rhs)) // 0 - x = -x
                    }
                    _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b), // (a) * (b) = (a * b)
                    (Expr::Const(c), _) | (_, Expr::Const(c)) if *c == 0.0 => Expr::Const(0.0),
                    (Expr::Const(c), _) if *c == 1.0 => rhs, // 1 * x = x
                    (_, Expr::Const(c)) if *c == 1.0 => lhs, // x * 1 = x
                    // pull nested numeric factors together
                    (Expr::Const(a), Expr::Mul(inner_l, inner_r)) => {
                        if let Expr::Const(b) = **inner_l {
                            Expr::Mul(Box::new(Expr::Const(a * b)), inner_r.clone())
                        } else {
                            Expr::Mul(Box::new(lhs.clone()), Box::new(rhs.clone()))
                        }
                    }
                    (Expr::Mul(inner_l, inner_r), Expr::Const(b)) => {
                        if let Expr::Const(a) = **inner_l {
                            Expr::Mul(Box::new(Expr::Const(a * b)), inner_r.clone())
                        } else {
                            Expr::Mul(Box::new(lhs.clone()), Box::new(rhs.clone()))
                        }
                    }
                    _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b),
                    (Expr::Const(c), _) if *c == 0.0 => Expr::Const(0.0), // 0 / x = 0
                    (_, Expr::Const(c)) if *c == 1.0 => lhs,              // x / 1 = x
                    _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Pow(base, exp) => {
                let base = base.simplify_();
                let exp = exp.simplify_();
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a.powf(*b)),
                    (_, Expr::Const(c)) if *c == 0.0 => Expr::Const(1.0), // x ^ 0 = 1
                    (_, Expr::Const(c)) if *c == 1.0 => base,             // x ^ 1 = x
                    (Expr::Const(c), _) if *c == 0.0 => Expr::Const(0.0), // 0 ^ x = 0
                    (Expr::Const(c), _) if *c == 1.0 => Expr::Const(1.0), // 1 ^ x = 1
                    _ => Expr::Pow(Box::new(base), Box::new(exp)),
                }
            }
            Expr::Exp(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.exp()),
                    Expr::Ln(inner) => (**inner).clone(), // exp(ln(x)) = x
                    _ => Expr::Exp(Box::new(expr)),
                }
            }
            Expr::Ln(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) if *a > 0.0 => Expr::Const(a.ln()),
                    Expr::Exp(inner) => (**inner).clone(), // ln(exp(x)) = x
                    _ => Expr::Ln(Box::new(expr)),
                }
            }
            Expr::Sin(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.sin()),
                    _ => Expr::Sin(Box::new(expr)),
                }
            }
            Expr::Cos(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.cos()),
                    _ => Expr::Cos(Box::new(expr)),
                }
            }
            Expr::Sinh(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.sinh()),
                    _ => Expr::Sinh(Box::new(expr)),
                }
            }
            Expr::Cosh(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.cosh()),
                    _ => Expr::Cosh(Box::new(expr)),
                }
            }
        }
    }

    pub fn symplify(&self) -> Expr {
        let mut current = self.clone();
        for _ in 0..6 {
            let next = current.simplify_();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    ///___________________________________INSPECTION____________________________________

    fn collect_vars(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                out.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::Sin(expr)
            | Expr::Cos(expr)
            | Expr::Sinh(expr)
            | Expr::Cosh(expr) => expr.collect_vars(out),
        }
    }

    /// sorted list of all variable names in the expression
    pub fn extract_variables(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        self.collect_vars(&mut set);
        set.into_iter().collect()
    }

    pub fn contains_var(&self, var: &str) -> bool {
        let mut set = BTreeSet::new();
        self.collect_vars(&mut set);
        set.contains(var)
    }

    /// collect all distinct subexpressions matching a predicate
    pub fn collect_atoms(&self, pred: &dyn Fn(&Expr) -> bool) -> Vec<Expr> {
        let mut atoms: Vec<Expr> = Vec::new();
        self.walk(&mut |e| {
            if pred(e) && !atoms.contains(e) {
                atoms.push(e.clone());
            }
        });
        atoms
    }

    fn walk(&self, visit: &mut dyn FnMut(&Expr)) {
        visit(self);
        match self {
            Expr::Var(_) | Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::Sin(expr)
            | Expr::Cos(expr)
            | Expr::Sinh(expr)
            | Expr::Cosh(expr) => expr.walk(visit),
        }
    }

    /// flatten the top-level additive structure into a list of terms,
    /// folding subtraction into (-1) * term
    pub fn as_terms(&self) -> Vec<Expr> {
        match self {
            Expr::Add(lhs, rhs) => {
                let mut terms = lhs.as_terms();
                terms.extend(rhs.as_terms());
                terms
            }
            Expr::Sub(lhs, rhs) => {
                let mut terms = lhs.as_terms();
                terms.extend(
                    rhs.as_terms()
                        .into_iter()
                        .map(|t| Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(t))),
                );
                terms
            }
            _ => vec![self.clone()],
        }
    }

    /// divide a product term by one occurrence of a variable factor.
    /// Returns None if the term does not contain the factor linearly.
    pub fn strip_factor(&self, var: &str) -> Option<Expr> {
        match self {
            Expr::Var(name) if name == var => Some(Expr::Const(1.0)),
            Expr::Mul(lhs, rhs) => lhs
                .strip_factor(var)
                .map(|l| l * (**rhs).clone())
                .or_else(|| rhs.strip_factor(var).map(|r| (**lhs).clone() * r)),
            Expr::Div(lhs, rhs) => lhs.strip_factor(var).map(|l| l / (**rhs).clone()),
            _ => None,
        }
    }

    ///___________________________________EVALUATION____________________________________

    /// evaluate the expression at given variable values
    pub fn eval_expression(&self, vars: Vec<&str>, values: &[f64]) -> f64 {
        match self {
            Expr::Var(name) => {
                let idx = vars
                    .iter()
                    .position(|v| *v == name.as_str())
                    .unwrap_or_else(|| panic!("variable {} has no value in eval_expression", name));
                values[idx]
            }
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => {
                lhs.eval_expression(vars.clone(), values) + rhs.eval_expression(vars, values)
            }
            Expr::Sub(lhs, rhs) => {
                lhs.eval_expression(vars.clone(), values) - rhs.eval_expression(vars, values)
            }
            Expr::Mul(lhs, rhs) => {
                lhs.eval_expression(vars.clone(), values) * rhs.eval_expression(vars, values)
            }
            Expr::Div(lhs, rhs) => {
                lhs.eval_expression(vars.clone(), values) / rhs.eval_expression(vars, values)
            }
            Expr::Pow(base, exp) => base
                .eval_expression(vars.clone(), values)
                .powf(exp.eval_expression(vars, values)),
            Expr::Exp(expr) => expr.eval_expression(vars, values).exp(),
            Expr::Ln(expr) => expr.eval_expression(vars, values).ln(),
            Expr::Sin(expr) => expr.eval_expression(vars, values).sin(),
            Expr::Cos(expr) => expr.eval_expression(vars, values).cos(),
            Expr::Sinh(expr) => expr.eval_expression(vars, values).sinh(),
            Expr::Cosh(expr) => expr.eval_expression(vars, values).cosh(),
        }
    }

    /// turn a one-variable expression into a Rust closure
    pub fn lambdify1D(&self) -> Box<dyn Fn(f64) -> f64> {
        match self {
            Expr::Var(_) => Box::new(|x| x),
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.lambdify1D();
                let rhs = rhs.lambdify1D();
                Box::new(move |x| lhs(x) + rhs(x))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.lambdify1D();
                let rhs = rhs.lambdify1D();
                Box::new(move |x| lhs(x) - rhs(x))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = lhs.lambdify1D();
                let rhs = rhs.lambdify1D();
                Box::new(move |x| lhs(x) * rhs(x))
            }
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.lambdify1D();
                let rhs = rhs.lambdify1D();
                Box::new(move |x| lhs(x) / rhs(x))
            }
            Expr::Pow(base, exp) => {
                let base = base.lambdify1D();
                let exp = exp.lambdify1D();
                Box::new(move |x| base(x).powf(exp(x)))
            }
            Expr::Exp(expr) => {
                let expr = expr.lambdify1D();
                Box::new(move |x| expr(x).exp())
            }
            Expr::Ln(expr) => {
                let expr = expr.lambdify1D();
                Box::new(move |x| expr(x).ln())
            }
            Expr::Sin(expr) => {
                let expr = expr.lambdify1D();
                Box::new(move |x| expr(x).sin())
            }
            Expr::Cos(expr) => {
                let expr = expr.lambdify1D();
                Box::new(move |x| expr(x).cos())
            }
            Expr::Sinh(expr) => {
                let expr = expr.lambdify1D();
                Box::new(move |x| expr(x).sinh())
            }
            Expr::Cosh(expr) => {
                let expr = expr.lambdify1D();
                Box::new(move |x| expr(x).cosh())
            }
        }
    }

    /// turn an expression of several variables into a Rust closure
    pub fn lambdify(&self, vars: Vec<&str>) -> Box<dyn Fn(Vec<f64>) -> f64> {
        let owned: Vec<String> = vars.iter().map(|s| s.to_string()).collect();
        let expr = self.clone();
        Box::new(move |values: Vec<f64>| {
            let borrowed: Vec<&str> = owned.iter().map(|s| s.as_str()).collect();
            expr.eval_expression(borrowed, &values)
        })
    }
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diff_power() {
        let x = Expr::Var("x".to_string());
        let f = Expr::Pow(Box::new(x.clone()), Box::new(Expr::Const(2.0)));
        let df_dx = f.diff("x").symplify();
        // 2 * x^1 * 1 -> 2 * x
        let value = df_dx.eval_expression(vec!["x"], &[3.0]);
        assert_relative_eq!(value, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diff_trig() {
        let k = Expr::Var("k".to_string());
        let x = Expr::Var("x".to_string());
        let f = Expr::Sin(Box::new(k.clone() * x.clone()));
        let df_dx = f.diff("x").symplify();
        // d/dx sin(k x) = k cos(k x)
        let value = df_dx.eval_expression(vec!["k", "x"], &[2.0, 0.3]);
        assert_relative_eq!(value, 2.0 * (0.6f64).cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_diff_hyperbolic() {
        let x = Expr::Var("x".to_string());
        let f = Expr::Sinh(Box::new(x.clone()));
        let df = f.diff("x").symplify();
        let value = df.eval_expression(vec!["x"], &[0.7]);
        assert_relative_eq!(value, (0.7f64).cosh(), epsilon = 1e-12);
    }

    #[test]
    fn test_symplify_zero_mul() {
        let expr = Expr::Mul(
            Box::new(Expr::Var("x".to_string())),
            Box::new(Expr::Const(0.0)),
        );
        assert_eq!(expr.symplify(), Expr::Const(0.0));
    }

    #[test]
    fn test_symplify_trig_const() {
        let expr = Expr::Sin(Box::new(Expr::Mul(
            Box::new(Expr::Var("k".to_string())),
            Box::new(Expr::Const(0.0)),
        )));
        assert_eq!(expr.symplify(), Expr::Const(0.0));
    }

    #[test]
    fn test_set_variable() {
        let x = Expr::Var("x".to_string());
        let f = x.clone() + Expr::Const(2.0);
        let f_with_value = f.set_variable("x", 1.0).symplify();
        assert_eq!(f_with_value, Expr::Const(3.0));
    }

    #[test]
    fn test_substitute_expr() {
        let k = Expr::Var("k".to_string());
        let l = Expr::Var("L".to_string());
        let atom = Expr::Sin(Box::new(k.clone() * l.clone()));
        let expr = atom.clone() * Expr::Var("C1".to_string()) + Expr::Var("C2".to_string());
        let snapped = expr.substitute_expr(&atom, &Expr::Const(0.0)).symplify();
        assert_eq!(snapped, Expr::Var("C2".to_string()));
    }

    #[test]
    fn test_as_terms_signs() {
        let a = Expr::Var("a".to_string());
        let b = Expr::Var("b".to_string());
        let c = Expr::Var("c".to_string());
        let expr = a.clone() + b.clone() - c.clone();
        let terms = expr.as_terms();
        assert_eq!(terms.len(), 3);
        let last = terms[2].clone().symplify();
        let value = last.eval_expression(vec!["c"], &[2.0]);
        assert_relative_eq!(value, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_strip_factor() {
        let rho = Expr::Var("rho".to_string());
        let t_tt = Expr::Var("T_tt".to_string());
        let x0 = Expr::Var("X".to_string());
        let term = rho.clone() * t_tt.clone() * x0.clone();
        let stripped = term.strip_factor("X").unwrap().symplify();
        let value = stripped.eval_expression(vec!["rho", "T_tt"], &[2.0, 3.0]);
        assert_relative_eq!(value, 6.0, epsilon = 1e-12);
        assert!(term.strip_factor("missing").is_none());
    }

    #[test]
    fn test_lambdify1D() {
        let x = Expr::Var("x".to_string());
        let f = Expr::Pow(Box::new(x.clone()), Box::new(Expr::Const(2.0)));
        let fn_closure = f.lambdify1D();
        assert_eq!(fn_closure(2.0), 4.0);
    }

    #[test]
    fn test_lambdify_multi() {
        let expr = Expr::Var("x".to_string()) * Expr::Var("y".to_string());
        let f = expr.lambdify(vec!["x", "y"]);
        assert_relative_eq!(f(vec![2.0, 3.0]), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extract_variables() {
        let expr = Expr::Var("b".to_string()) + Expr::Var("a".to_string()).sin();
        assert_eq!(expr.extract_variables(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_collect_atoms() {
        let k = Expr::Var("k".to_string());
        let l = Expr::Var("L".to_string());
        let expr = Expr::Sin(Box::new(k.clone() * l.clone()))
            + Expr::Cos(Box::new(k.clone() * l.clone()))
            + Expr::Sin(Box::new(k * l));
        let atoms = expr.collect_atoms(&|e| matches!(e, Expr::Sin(_) | Expr::Cos(_)));
        assert_eq!(atoms.len(), 2);
    }
}
