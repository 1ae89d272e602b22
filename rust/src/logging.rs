//! Verbosity-gated logging macros for the shift optimizer.
//!
//! Everything goes to stderr and costs a single comparison when disabled.
//! Levels:
//! - 0: SILENT (nothing)
//! - 1: PHASES (pipeline phases, retry attempts, commit)
//! - 2: MOVES (flattening transfers, search summaries)
//! - 3: DEBUG (score breakdowns and other internals)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_PHASES: u8 = 1;
pub const VERBOSITY_MOVES: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at PHASES level (verbosity >= 1).
#[macro_export]
macro_rules! log_phases {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PHASES {
            eprintln!("[shiftplan] {}", format_args!($($arg)*));
        }
    };
}

/// Log at MOVES level (verbosity >= 2).
///
/// Used for: flattening transfers, per-phase search statistics.
#[macro_export]
macro_rules! log_moves {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_MOVES {
            eprintln!("[shiftplan]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[shiftplan]     {}", format_args!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_PHASES);
        assert!(VERBOSITY_PHASES < VERBOSITY_MOVES);
        assert!(VERBOSITY_MOVES < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_silent_macros_do_not_evaluate_output() {
        let verbosity = VERBOSITY_SILENT;
        log_phases!(verbosity, "attempt {}", 1);
        log_moves!(verbosity, "moved {} -> {}", "a", "b");
        log_debug!(verbosity, "score {:.1}", 10.0);
    }
}
