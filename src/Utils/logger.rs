use simplelog::{ColorChoice, Config, LevelFilter, SimpleLogger, TermLogger, TerminalMode};

/// Initialize terminal logging at the given level. Falls back to the plain
/// logger when no terminal is attached; repeated initialization is ignored so
/// examples and tests may call this freely.
pub fn init_logger(level: LevelFilter) {
    if TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        let _ = SimpleLogger::init(level, Config::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        init_logger(LevelFilter::Info);
        init_logger(LevelFilter::Debug);
        log::info!("logger initialized twice without panicking");
    }
}
