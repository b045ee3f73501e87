//! Progress, ETA, and log channels for an assembly run.

use tracing::{debug, info};

/// Receiver for the assembler's user-facing channels.
///
/// `log` gets one human-readable line per major step; `progress` and `eta`
/// are pushed together after every file attempt. Implementations decide
/// how to surface them (progress bar, scrolling log, test recorder).
pub trait Reporter {
    /// One human-readable status line.
    fn log(&mut self, line: &str);

    /// Completion percentage, 0-100.
    fn progress(&mut self, percent: u8);

    /// Estimated remaining time, formatted `H:MM`.
    fn eta(&mut self, eta: &str);
}

/// Reporter that forwards everything to the tracing log channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn log(&mut self, line: &str) {
        info!("{line}");
    }

    fn progress(&mut self, percent: u8) {
        debug!(percent, "progress");
    }

    fn eta(&mut self, eta: &str) {
        debug!(eta, "estimated remaining time");
    }
}

/// Formats a remaining-seconds estimate as `H:MM`.
///
/// Hours are floored, minutes are rounded up and zero-padded. A remainder
/// just under a full hour therefore renders as `0:60`, matching the
/// display consumers already expect.
#[must_use]
pub fn format_eta(remaining_secs: u64) -> String {
    let hours = remaining_secs / 3600;
    let minutes = (remaining_secs - hours * 3600).div_ceil(60);
    format!("{hours}:{minutes:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_eta_zero_is_flat() {
        assert_eq!(format_eta(0), "0:00");
    }

    #[test]
    fn format_eta_rounds_minutes_up() {
        assert_eq!(format_eta(1), "0:01");
        assert_eq!(format_eta(61), "0:02");
        assert_eq!(format_eta(120), "0:02");
    }

    #[test]
    fn format_eta_splits_hours() {
        assert_eq!(format_eta(3600), "1:00");
        assert_eq!(format_eta(3661), "1:02");
        assert_eq!(format_eta(7200), "2:00");
    }

    #[test]
    fn format_eta_keeps_the_sixty_minute_quirk() {
        assert_eq!(format_eta(3599), "0:60");
    }
}
