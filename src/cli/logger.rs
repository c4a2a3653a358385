//! Logging setup for the binary
//!
//! Filters come from `HOLLOW_LOG` in `env_logger` syntax (`debug`,
//! `edens_hollow::engine=trace`, ...); the default is `warn`.

use env_logger::Builder;

pub const LOG_ENV: &str = "HOLLOW_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Logger builder for the given filter directives
pub fn builder(filters: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    builder.parse_filters(filters.unwrap_or(DEFAULT_FILTER));
    builder
}

/// Install the logger; later calls are ignored
pub fn init() {
    let filters = std::env::var(LOG_ENV).ok();
    let _ = builder(filters.as_deref()).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn defaults_to_warn() {
        assert_eq!(builder(None).build().filter(), LevelFilter::Warn);
    }

    #[test]
    fn accepts_levels_and_module_directives() {
        assert_eq!(builder(Some("debug")).build().filter(), LevelFilter::Debug);
        assert_eq!(
            builder(Some("warn,edens_hollow::engine=trace")).build().filter(),
            LevelFilter::Trace
        );
        assert_eq!(builder(Some("off")).build().filter(), LevelFilter::Off);
    }
}
