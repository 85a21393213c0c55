//! Output mode and duration formatting.

use std::str::FromStr;
use std::time::Duration;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Stream command output as it happens.
    Verbose,
    /// Spinners and per-step status.
    #[default]
    Normal,
    /// Errors, warnings and the final summary only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Pick the mode from the `--verbose` / `--quiet` flags. Quiet wins.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if this mode lets command output through to the terminal.
    pub fn shows_command_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Check if this mode shows progress spinners.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Check if this mode shows per-step status messages.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

/// Format a duration for display: `250ms`, `4.2s`, `3m 5s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_from_str() {
        assert_eq!("verbose".parse::<OutputMode>(), Ok(OutputMode::Verbose));
        assert_eq!("QUIET".parse::<OutputMode>(), Ok(OutputMode::Quiet));
        assert!("silent".parse::<OutputMode>().is_err());
    }

    #[test]
    fn quiet_flag_wins() {
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Quiet);
        assert_eq!(OutputMode::from_flags(true, false), OutputMode::Verbose);
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Normal);
    }

    #[test]
    fn spinners_only_in_normal_mode() {
        assert!(OutputMode::Normal.shows_spinners());
        assert!(!OutputMode::Verbose.shows_spinners());
        assert!(!OutputMode::Quiet.shows_spinners());
    }

    #[test]
    fn quiet_hides_status() {
        assert!(OutputMode::Verbose.shows_status());
        assert!(!OutputMode::Quiet.shows_status());
        assert!(OutputMode::Verbose.shows_command_output());
        assert!(!OutputMode::Normal.shows_command_output());
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(4_250)), "4.2s");
        assert_eq!(format_duration(Duration::from_secs(185)), "3m 5s");
    }
}
