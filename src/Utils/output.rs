//! Mode-summary reports: console tables and JSON export.

use crate::Continuum::continuous_system::{ContinuousSystem, VibrationError};
use crate::Continuum::eigen::EigenvalueStrategy;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::fs;

/// one row of a modal report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EigenReportRow {
    pub mode: usize,
    pub wavenumber: f64,
    pub frequency: Option<f64>,
    pub shape: String,
}

/// modal summary of a continuous system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EigenReport {
    pub label: String,
    pub modes: Vec<EigenReportRow>,
}

/// compose the leading modes of a system into a report
pub fn eigen_report(
    system: &ContinuousSystem,
    strategy: &EigenvalueStrategy,
    n_modes: usize,
) -> Result<EigenReport, VibrationError> {
    let mut modes = Vec::with_capacity(n_modes);
    for mode_no in 1..=n_modes {
        let mode = system.eigenmodes_with(strategy, mode_no)?;
        modes.push(EigenReportRow {
            mode: mode_no,
            wavenumber: mode.wavenumber,
            frequency: mode.natural_frequency,
            shape: format!("{}", mode.shape),
        });
    }
    Ok(EigenReport {
        label: system.label.clone(),
        modes,
    })
}

/// Prints the modal data of the system to the console
pub fn pretty_print_report(report: &EigenReport) {
    println!("__________modal summary of {}__________", report.label);
    let mut table = Table::new();
    table.add_row(row!["mode", "wavenumber k_n", "frequency w_n", "shape"]);
    for entry in &report.modes {
        let frequency = match entry.frequency {
            Some(w) => format!("{:.6}", w),
            None => "-".to_string(),
        };
        table.add_row(row![
            entry.mode,
            format!("{:.6}", entry.wavenumber),
            frequency,
            entry.shape
        ]);
    }
    table.printstd();
    println!("_____________________________________________________________");
}

/// save a report as pretty-printed JSON
pub fn save_report_json(report: &EigenReport, path: &str) -> Result<(), String> {
    let serialized = serde_json::to_string_pretty(report)
        .map_err(|e| format!("failed to serialize report: {}", e))?;
    fs::write(path, serialized).map_err(|e| format!("failed to write {}: {}", path, e))
}

/// load a report back from JSON
pub fn load_report_json(path: &str) -> Result<EigenReport, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path, e))?;
    serde_json::from_str(&content).map_err(|e| format!("failed to parse {}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_report() -> EigenReport {
        EigenReport {
            label: "taut string".to_string(),
            modes: vec![
                EigenReportRow {
                    mode: 1,
                    wavenumber: 3.14159,
                    frequency: Some(3.14159),
                    shape: "(1 * sin((3.1 * x)))".to_string(),
                },
                EigenReportRow {
                    mode: 2,
                    wavenumber: 6.28318,
                    frequency: None,
                    shape: "(1 * sin((6.3 * x)))".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_report_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let path = path.to_str().unwrap();
        let report = sample_report();
        save_report_json(&report, path).unwrap();
        let loaded = load_report_json(path).unwrap();
        assert_eq!(loaded.label, report.label);
        assert_eq!(loaded.modes.len(), 2);
        assert_relative_eq!(loaded.modes[0].wavenumber, 3.14159, epsilon = 1e-12);
        assert!(loaded.modes[1].frequency.is_none());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(load_report_json("/nonexistent/report.json").is_err());
    }

    #[test]
    fn test_pretty_print_does_not_panic() {
        pretty_print_report(&sample_report());
    }
}
