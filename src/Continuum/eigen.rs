//! Characteristic equation and eigenvalue extraction.
//!
//! The characteristic function is the determinant of the fundamental matrix;
//! its positive zeros are the admissible wavenumbers. Root location is an
//! explicit strategy object:
//!
//! - [`UniformSpacing`] reproduces the classic equal-spacing construction:
//!   the leading roots fix an arithmetic sequence `k_n = r0 + (n - 1) * d`.
//!   Valid for the periodic trigonometric spectra of symmetric boundary
//!   conditions (pinned-pinned strings and beams); a located third root that
//!   contradicts the extrapolation is reported in the log.
//! - [`NumericBracketing`] tabulates the leading roots one by one and makes
//!   no spacing assumption, which is what cantilever-type transcendental
//!   spectra require.
//!
//! Root extraction needs a numerically closed characteristic function: every
//! symbol except the separation constant must have been substituted away.

use crate::Continuum::boundary;
use crate::Continuum::continuous_system::{ContinuousSystem, EigenSearchConfig, VibrationError};
use crate::Continuum::separation;
use crate::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// determinant of the fundamental matrix, simplified
pub fn characteristic_equation(system: &ContinuousSystem) -> Result<Expr, VibrationError> {
    let solution = separation::spatial_general_solution(system)?;
    let matrix = boundary::fundamental_matrix(
        &system.spatial_vars[0],
        &system.boundary_conditions,
        &solution,
    )?;
    let determinant = matrix
        .det()
        .map_err(VibrationError::UnsupportedGoverningEquation)?
        .symplify();
    log::info!(
        "characteristic equation of `{}`: {} = 0",
        system.label,
        determinant
    );
    Ok(determinant)
}

/// the infinite ordered eigenvalue sequence; mode indices start at 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EigenvalueSeq {
    /// `k_n = first + (n - 1) * spacing`, restartable and lazy
    Arithmetic { first: f64, spacing: f64 },
    /// individually located roots, `k_n = roots[n - 1]`
    Tabulated { roots: Vec<f64> },
}

impl EigenvalueSeq {
    pub fn nth(&self, index: usize) -> Option<f64> {
        match self {
            EigenvalueSeq::Arithmetic { first, spacing } => {
                Some(first + (index as f64 - 1.0) * spacing)
            }
            EigenvalueSeq::Tabulated { roots } => {
                if index == 0 {
                    None
                } else {
                    roots.get(index - 1).copied()
                }
            }
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            EigenvalueSeq::Arithmetic { first, spacing } => {
                let (first, spacing) = (*first, *spacing);
                Box::new((1usize..).map(move |n| first + (n as f64 - 1.0) * spacing))
            }
            EigenvalueSeq::Tabulated { roots } => Box::new(roots.iter().copied()),
        }
    }
}

/// refine a bracketed sign change down to the configured tolerance
fn bisect(f: &dyn Fn(f64) -> f64, mut lo: f64, mut hi: f64, tol: f64) -> f64 {
    let mut f_lo = f(lo);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if hi - lo < tol {
            return mid;
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return mid;
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
    0.5 * (lo + hi)
}

/// scan the configured range for sign changes and bisect each bracket
fn scan_roots(f: &dyn Fn(f64) -> f64, config: &EigenSearchConfig, want: usize) -> Vec<f64> {
    let mut roots: Vec<f64> = Vec::new();
    let step = (config.k_max - config.k_min) / config.scan_points as f64;
    let mut prev_k = config.k_min;
    let mut prev_v = f(prev_k);
    for i in 1..=config.scan_points {
        if roots.len() >= want {
            break;
        }
        let k = config.k_min + step * i as f64;
        let v = f(k);
        if prev_v.is_finite() && v.is_finite() {
            let root = if v == 0.0 {
                Some(k)
            } else if prev_v * v < 0.0 {
                Some(bisect(f, prev_k, k, config.root_tol))
            } else {
                None
            };
            if let Some(r) = root {
                if roots.last().map_or(true, |last| r - last > 0.5 * step) {
                    roots.push(r);
                }
            }
        }
        prev_k = k;
        prev_v = v;
    }
    roots
}

#[enum_dispatch]
pub trait EigenvalueStrategyTrait {
    /// locate the admissible roots of the characteristic function and build
    /// the eigenvalue sequence
    fn sequence(
        &self,
        char_fn: &dyn Fn(f64) -> f64,
        config: &EigenSearchConfig,
    ) -> Result<EigenvalueSeq, VibrationError>;
}

/// equal-spacing extrapolation from the leading roots
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UniformSpacing;

impl EigenvalueStrategyTrait for UniformSpacing {
    fn sequence(
        &self,
        char_fn: &dyn Fn(f64) -> f64,
        config: &EigenSearchConfig,
    ) -> Result<EigenvalueSeq, VibrationError> {
        let roots = scan_roots(char_fn, config, 3);
        if roots.is_empty() {
            return Err(VibrationError::NoEigenvalueSolution(format!(
                "no characteristic roots in ({}, {}]",
                config.k_min, config.k_max
            )));
        }
        let first = roots[0];
        let spacing = if roots.len() == 1 {
            first
        } else {
            roots[1] - roots[0]
        };
        if roots.len() >= 3 {
            let extrapolated = first + 2.0 * spacing;
            if (roots[2] - extrapolated).abs() > config.spacing_rtol * spacing.abs() {
                log::warn!(
                    "characteristic roots are not uniformly spaced (third root {} vs extrapolated {}); consider the NumericBracketing strategy",
                    roots[2],
                    extrapolated
                );
            }
        }
        Ok(EigenvalueSeq::Arithmetic { first, spacing })
    }
}

/// individual root tabulation without a spacing assumption
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericBracketing;

impl EigenvalueStrategyTrait for NumericBracketing {
    fn sequence(
        &self,
        char_fn: &dyn Fn(f64) -> f64,
        config: &EigenSearchConfig,
    ) -> Result<EigenvalueSeq, VibrationError> {
        let roots = scan_roots(char_fn, config, config.max_roots);
        if roots.is_empty() {
            return Err(VibrationError::NoEigenvalueSolution(format!(
                "no characteristic roots in ({}, {}]",
                config.k_min, config.k_max
            )));
        }
        Ok(EigenvalueSeq::Tabulated { roots })
    }
}

/// root-location policy of the eigenvalue extractor
#[enum_dispatch(EigenvalueStrategyTrait)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EigenvalueStrategy {
    UniformSpacing(UniformSpacing),
    NumericBracketing(NumericBracketing),
}

impl Default for EigenvalueStrategy {
    fn default() -> Self {
        EigenvalueStrategy::UniformSpacing(UniformSpacing)
    }
}

/// eigenvalue sequence of a system under the given strategy
pub fn eigenvalues(
    system: &ContinuousSystem,
    strategy: &EigenvalueStrategy,
) -> Result<EigenvalueSeq, VibrationError> {
    let characteristic = characteristic_equation(system)?;
    let k = system.separation_constant_symbol.clone();
    let leftover: Vec<String> = characteristic
        .extract_variables()
        .into_iter()
        .filter(|v| *v != k)
        .collect();
    if !leftover.is_empty() {
        return Err(VibrationError::UnresolvedParameter(leftover.join(", ")));
    }
    let char_fn = characteristic.lambdify1D();
    let sequence = strategy.sequence(&*char_fn, &system.config)?;
    log::info!("eigenvalue sequence of `{}`: {:?}", system.label, sequence);
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_scan_roots_of_sine() {
        let f = |k: f64| (k).sin();
        let config = EigenSearchConfig {
            k_max: 20.0,
            ..Default::default()
        };
        let roots = scan_roots(&f, &config, 3);
        assert_eq!(roots.len(), 3);
        assert_relative_eq!(roots[0], PI, epsilon = 1e-9);
        assert_relative_eq!(roots[1], 2.0 * PI, epsilon = 1e-9);
        assert_relative_eq!(roots[2], 3.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_spacing_sequence() {
        let f = |k: f64| (k).sin();
        let seq = UniformSpacing
            .sequence(&f, &EigenSearchConfig::default())
            .unwrap();
        assert_relative_eq!(seq.nth(1).unwrap(), PI, epsilon = 1e-9);
        assert_relative_eq!(seq.nth(5).unwrap(), 5.0 * PI, epsilon = 1e-8);
    }

    #[test]
    fn test_bracketing_handles_transcendental_spectrum() {
        // cantilever characteristic function: 1 + cos(k) cosh(k)
        let f = |k: f64| 1.0 + k.cos() * k.cosh();
        let config = EigenSearchConfig {
            k_max: 15.0,
            ..Default::default()
        };
        let seq = NumericBracketing.sequence(&f, &config).unwrap();
        assert_relative_eq!(seq.nth(1).unwrap(), 1.8751, epsilon = 1e-3);
        assert_relative_eq!(seq.nth(2).unwrap(), 4.6941, epsilon = 1e-3);
        assert_relative_eq!(seq.nth(3).unwrap(), 7.8548, epsilon = 1e-3);
    }

    #[test]
    fn test_no_roots_is_an_error() {
        let f = |_k: f64| 1.0;
        let result = UniformSpacing.sequence(&f, &EigenSearchConfig::default());
        assert!(matches!(
            result,
            Err(VibrationError::NoEigenvalueSolution(_))
        ));
    }

    #[test]
    fn test_sequence_iter_is_restartable() {
        let seq = EigenvalueSeq::Arithmetic {
            first: PI,
            spacing: PI,
        };
        let first_pass: Vec<f64> = seq.iter().take(3).collect();
        let second_pass: Vec<f64> = seq.iter().take(3).collect();
        assert_eq!(first_pass, second_pass);
    }
}
