// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap-Phase Logging Configuration
//!
//! This crate stops at "parse and validate the CLI" - it does not own the
//! application's real configuration (database URL, retry policy, blob store
//! root, and so on), which lives behind `docforge::infrastructure::config::AppConfig`
//! and is loaded by the composition root once this crate's job is done. The
//! one piece of configuration the bootstrap phase itself needs before any of
//! that exists is the tracing filter level for the `--verbose`/`--quiet`
//! flags, which this module provides.

/// Verbosity level controlling the tracing-subscriber filter installed
/// before the rest of the application starts up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Number of `-v` flags maps onto a verbosity step above the default.
    pub fn from_verbosity(verbose_count: u8, quiet: bool) -> Self {
        if quiet {
            return LogLevel::Error;
        }
        match verbose_count {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(LogLevel::from_verbosity(3, true), LogLevel::Error);
    }

    #[test]
    fn verbosity_steps_up_from_info() {
        assert_eq!(LogLevel::from_verbosity(0, false), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(1, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(5, false), LogLevel::Trace);
    }

    #[test]
    fn default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
