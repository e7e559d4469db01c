//! Verbosity-gated logging for validation, mining and session edits.
//!
//! Events go through `tracing` under the `alloc_prep` target; the host installs
//! the subscriber. The verbosity level on each config decides which macros fire:
//! - 0: SILENT
//! - 1: CHANGES (pass summaries, emitted recommendations, session mutations)
//! - 2: CHECKS (skipped records, per-row decisions)
//! - 3: DEBUG (threshold arithmetic)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// True when `verbosity` reaches `level`.
#[inline]
pub const fn enabled(verbosity: u8, level: u8) -> bool {
    verbosity >= level
}

/// Emitted as `info` when verbosity >= CHANGES.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $crate::logging::VERBOSITY_CHANGES) {
            ::tracing::info!(target: "alloc_prep", $($arg)*);
        }
    };
}

/// Emitted as `debug` when verbosity >= CHECKS.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $crate::logging::VERBOSITY_CHECKS) {
            ::tracing::debug!(target: "alloc_prep", $($arg)*);
        }
    };
}

/// Emitted as `trace` when verbosity >= DEBUG.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $crate::logging::VERBOSITY_DEBUG) {
            ::tracing::trace!(target: "alloc_prep", $($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_ladder() {
        assert!(!enabled(VERBOSITY_SILENT, VERBOSITY_CHANGES));
        assert!(enabled(VERBOSITY_CHANGES, VERBOSITY_CHANGES));
        assert!(!enabled(VERBOSITY_CHANGES, VERBOSITY_CHECKS));
        assert!(enabled(VERBOSITY_DEBUG, VERBOSITY_CHECKS));
    }

    #[test]
    fn test_macros_expand_without_subscriber() {
        for verbosity in [VERBOSITY_SILENT, VERBOSITY_DEBUG] {
            log_changes!(verbosity, "rows={}", 1);
            log_checks!(verbosity, rule = "co-run", "checked {}", 2);
            log_debug!(verbosity, "threshold {}", 3.5);
        }
    }
}
