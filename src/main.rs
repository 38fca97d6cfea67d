#[allow(non_snake_case)]
pub mod Continuum;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Utils;
pub mod symbolic;

use Examples::vibration_examples::vibration_examples;
use Utils::logger::init_logger;
use simplelog::LevelFilter;

pub fn main() {
    init_logger(LevelFilter::Info);
    //
    let task: usize = 0;
    vibration_examples(task);
}
