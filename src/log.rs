//! Logging configuration.
//!
//! The crate logs through the `log` facade: site draws at `trace`, scenario and parameter
//! registration at `debug`, inference summaries at `info`. Nothing is printed by default.
//! Enable output with [`set_log_level`] and narrow it per module path with
//! [`set_module_filter`]:
//!
//! ```rust
//! use infection_models::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! set_module_filter("infection_models::trace", LevelFilter::Off);
//! ```
//!
//! With the `logging` feature (on by default) messages go to a `log4rs` console appender.
//! Without it only `log::max_level` is adjusted, so the macros stay cheap.
pub use log::{debug, error, info, trace, warn, LevelFilter};

use std::sync::{LazyLock, Mutex, MutexGuard};

use indexmap::IndexMap;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

#[cfg(feature = "logging")]
// ISO 8601 timestamp, color coded level, module path
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {M} - {m}{n}";

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

#[derive(Debug)]
struct LogConfiguration {
    global_level: LevelFilter,
    /// Level filters keyed by module path, e.g. `"infection_models::models"`.
    module_levels: IndexMap<String, LevelFilter>,
    #[cfg(feature = "logging")]
    handle: Option<log4rs::Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        LogConfiguration {
            global_level: DEFAULT_LOG_LEVEL,
            module_levels: IndexMap::new(),
            #[cfg(feature = "logging")]
            handle: None,
        }
    }
}

impl LogConfiguration {
    #[cfg(feature = "logging")]
    fn apply(&mut self) {
        use log4rs::append::console::ConsoleAppender;
        use log4rs::config::{Appender, Logger, Root};
        use log4rs::encode::pattern::PatternEncoder;
        use log4rs::Config;

        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        let mut builder =
            Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
        for (module, level) in &self.module_levels {
            builder = builder.logger(Logger::builder().build(module.clone(), *level));
        }
        let root = Root::builder().appender("stdout").build(self.global_level);
        let config = match builder.build(root) {
            Ok(config) => config,
            Err(e) => panic!("failed to build log config: {e}"),
        };

        match self.handle {
            Some(ref handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.handle = Some(handle),
                // Another logger was installed by the host application; leave it alone.
                Err(e) => log::warn!("logging not installed: {e}"),
            },
        }
    }

    #[cfg(not(feature = "logging"))]
    fn apply(&mut self) {
        let max = self
            .module_levels
            .values()
            .copied()
            .fold(self.global_level, Ord::max);
        log::set_max_level(max);
    }
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

/// Enables every log message. Equivalent to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the level for modules without a filter of their own.
pub fn set_log_level(level: LevelFilter) {
    let mut configuration = get_log_configuration();
    configuration.global_level = level;
    configuration.apply();
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    let mut configuration = get_log_configuration();
    if configuration.module_levels.get(module_path) == Some(&level) {
        return;
    }
    configuration
        .module_levels
        .insert(module_path.to_string(), level);
    configuration.apply();
}

/// Removes the filter for the given module path so the global level applies to it again.
pub fn remove_module_filter(module_path: &str) {
    let mut configuration = get_log_configuration();
    if configuration.module_levels.shift_remove(module_path).is_some() {
        configuration.apply();
    }
}
