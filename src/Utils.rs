/// logging bootstrap for binaries and examples
pub mod logger;
/// mode-summary tables and JSON export of modal reports
pub mod output;
/// numeric quadrature used by the orthogonality checks
pub mod quadrature;
