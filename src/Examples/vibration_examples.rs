//! Runnable demonstrations of the eigen-analysis pipeline on the classic
//! boundary-condition families.

use crate::Continuum::boundary::BoundaryCondition;
use crate::Continuum::continuous_system::ContinuousSystem;
use crate::Continuum::eigen::{EigenvalueStrategy, NumericBracketing};
use crate::Continuum::modes;
use crate::Utils::output::{eigen_report, pretty_print_report, save_report_json};
use crate::symbolic::symbolic_engine::Expr;
use approx::assert_relative_eq;
use std::collections::HashMap;
use std::f64::consts::PI;

/// uniform taut string pinned at both ends
pub fn taut_string() -> ContinuousSystem {
    let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2");
    let bcs = vec![
        BoundaryCondition::parse_line("X(0) = 0").unwrap(),
        BoundaryCondition::parse_line("X(L) = 0").unwrap(),
    ];
    ContinuousSystem::new(lagrangian, "q", bcs)
        .with_derivative_order(1)
        .with_label("taut string")
}

/// Euler-Bernoulli beam pinned at both ends
pub fn pinned_beam() -> ContinuousSystem {
    let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - EI/2 * q_xx^2");
    let bcs = vec![
        BoundaryCondition::parse_line("X(0) = 0").unwrap(),
        BoundaryCondition::parse_line("X''(0) = 0").unwrap(),
        BoundaryCondition::parse_line("X(L) = 0").unwrap(),
        BoundaryCondition::parse_line("X''(L) = 0").unwrap(),
    ];
    ContinuousSystem::new(lagrangian, "q", bcs)
        .with_derivative_order(4)
        .with_label("pinned-pinned beam")
}

/// Euler-Bernoulli beam clamped at x = 0, free at x = L
pub fn cantilever_beam() -> ContinuousSystem {
    let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - EI/2 * q_xx^2");
    let bcs = vec![
        BoundaryCondition::parse_line("X(0) = 0").unwrap(),
        BoundaryCondition::parse_line("X'(0) = 0").unwrap(),
        BoundaryCondition::parse_line("X''(L) = 0").unwrap(),
        BoundaryCondition::parse_line("X'''(L) = 0").unwrap(),
    ];
    ContinuousSystem::new(lagrangian, "q", bcs)
        .with_derivative_order(4)
        .with_label("cantilever beam")
}

/// longitudinal rod fixed at x = 0 with a free end at x = L
pub fn longitudinal_rod() -> ContinuousSystem {
    let lagrangian = Expr::parse_expression("rho*A/2 * u_t^2 - E*A/2 * u_x^2");
    let bcs = vec![
        BoundaryCondition::parse_line("X(0) = 0").unwrap(),
        BoundaryCondition::parse_line("X'(L) = 0").unwrap(),
    ];
    ContinuousSystem::new(lagrangian, "u", bcs)
        .with_derivative_order(1)
        .with_label("longitudinal rod")
}

fn unit_parameters(names: &[&str]) -> HashMap<String, f64> {
    names.iter().map(|n| (n.to_string(), 1.0)).collect()
}

pub fn vibration_examples(task: usize) {
    match task {
        0 => {
            // full walkthrough on the unit string
            let system = taut_string().with_numeric_values(&unit_parameters(&[
                "rho", "T0", "L",
            ]));
            println!("system: {}", system);
            println!("governing equation: {}", system.governing_equation().unwrap());
            println!("separated: {}", system.separated_vars_eqn().unwrap());
            println!("spatial eqn: {}", system.spatial_eqn().unwrap());
            println!("time eqn: {}", system.time_eqn().unwrap());
            let solution = system.spatial_general_solution().unwrap();
            println!("general solution: {}", solution.expr);
            println!("fundamental matrix:\n{}", system.fundamental_matrix().unwrap());
            println!(
                "characteristic equation: {} = 0",
                system.characteristic_equation().unwrap()
            );
            let eigenvalues = system.eigenvalues().unwrap();
            assert_relative_eq!(eigenvalues.nth(1).unwrap(), PI, epsilon = 1e-6);
            let report = eigen_report(&system, &EigenvalueStrategy::default(), 3).unwrap();
            pretty_print_report(&report);
        }
        1 => {
            // pinned-pinned beam: wavenumbers coincide with the string's
            let system =
                pinned_beam().with_numeric_values(&unit_parameters(&["rho", "EI", "L"]));
            let eigenvalues = system.eigenvalues().unwrap();
            assert_relative_eq!(eigenvalues.nth(2).unwrap(), 2.0 * PI, epsilon = 1e-6);
            let report = eigen_report(&system, &EigenvalueStrategy::default(), 3).unwrap();
            pretty_print_report(&report);
        }
        2 => {
            // cantilever beam: a transcendental spectrum, bracketed root by root
            let system =
                cantilever_beam().with_numeric_values(&unit_parameters(&["rho", "EI", "L"]));
            let strategy = EigenvalueStrategy::NumericBracketing(NumericBracketing);
            let eigenvalues = system.eigenvalues_with(&strategy).unwrap();
            assert_relative_eq!(eigenvalues.nth(1).unwrap(), 1.8751, epsilon = 1e-3);
            let mode = system.eigenmodes_with(&strategy, 1).unwrap();
            println!("first cantilever mode: {}", mode);
            let report = eigen_report(&system, &strategy, 3).unwrap();
            pretty_print_report(&report);
        }
        3 => {
            // rod with substitutions, orthogonality check and JSON export
            let system = longitudinal_rod().with_numeric_values(&unit_parameters(&[
                "rho", "E", "A", "L",
            ]));
            let eigenvalues = system.eigenvalues().unwrap();
            assert_relative_eq!(eigenvalues.nth(1).unwrap(), PI / 2.0, epsilon = 1e-6);
            let first = system.eigenmodes(1).unwrap();
            let second = system.eigenmodes(2).unwrap();
            let overlap = modes::inner_product(&first, &second, 0.0, 1.0);
            assert_relative_eq!(overlap, 0.0, epsilon = 1e-6);
            let report = eigen_report(&system, &EigenvalueStrategy::default(), 4).unwrap();
            pretty_print_report(&report);
            save_report_json(&report, "rod_modes.json").unwrap();
            println!("report saved to rod_modes.json");
        }
        _ => {
            println!("unknown task {}", task);
        }
    }
}
