//! # Continuous-system eigen-analysis
//!
//! The module takes a continuous mechanical system described by a Lagrangian
//! density and a set of boundary conditions and produces its modal data:
//! 1) the governing partial differential equation via the calculus of
//!    variations (Euler-Lagrange identity)
//! 2) the separated spatial and temporal ordinary differential equations
//!    linked by a separation constant
//! 3) the fundamental matrix of the boundary-value problem and its
//!    characteristic equation
//! 4) the sequence of eigenvalues (wavenumbers) and the corresponding
//!    normalized eigenmodes with natural frequencies
//!
//! The pipeline is strictly one-directional: variational -> separation ->
//! boundary -> eigen -> modes. Every step is a pure transformation over the
//! [`continuous_system::ContinuousSystem`] value and its own arguments.
//!
//! # Example
//! ```rust, ignore
//! use VibroThe::Continuum::continuous_system::ContinuousSystem;
//! use VibroThe::Continuum::boundary::BoundaryCondition;
//! use VibroThe::symbolic::symbolic_engine::Expr;
//! use std::collections::HashMap;
//!
//! // taut string: L = rho/2 * q_t^2 - T0/2 * q_x^2, pinned at both ends
//! let lagrangian = Expr::parse_expression("rho/2 * q_t^2 - T0/2 * q_x^2");
//! let bcs = vec![
//!     BoundaryCondition::parse_line("X(0) = 0").unwrap(),
//!     BoundaryCondition::parse_line("X(L) = 0").unwrap(),
//! ];
//! let system = ContinuousSystem::new(lagrangian, "q", bcs)
//!     .with_derivative_order(1)
//!     .with_numeric_values(&HashMap::from([
//!         ("rho".to_string(), 1.0),
//!         ("T0".to_string(), 1.0),
//!         ("L".to_string(), 1.0),
//!     ]));
//! let eigenvalues = system.eigenvalues().unwrap();
//! // k_n = n*pi for the unit pinned-pinned string
//! assert!((eigenvalues.nth(1).unwrap() - std::f64::consts::PI).abs() < 1e-6);
//! ```

/// boundary conditions of the spatial boundary-value problem and the
/// fundamental matrix built from them
pub mod boundary;
/// the `ContinuousSystem` entity, its configuration and the error taxonomy
pub mod continuous_system;
/// characteristic equation, root-location strategies and eigenvalue sequences
pub mod eigen;
/// eigenmode composition: resolving integration constants at one eigenvalue
pub mod modes;
/// separation of variables: product ansatz, separated equations, spatial
/// general solution and the dispersion relation
pub mod separation;
/// derivation of the governing equation from the Lagrangian density
pub mod variational;
