#[allow(non_snake_case)]
pub mod Continuum;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Utils;
pub mod symbolic;
