//! Visual theme and styling.

use console::Style;

/// Terminal styles used for provisioning output.
#[derive(Debug, Clone)]
pub struct WorkstationTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for running elements (cyan).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for step titles (bold).
    pub step_title: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for step counters (dim).
    pub step_number: Style,
    /// Style for commands shown in output (dim italic).
    pub command: Style,
    /// Style for box-drawing borders (dim).
    pub border: Style,
    /// Style for remedies and hints (cyan dim).
    pub hint: Style,
}

impl Default for WorkstationTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkstationTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            step_title: Style::new().bold(),
            header: Style::new().bold().cyan(),
            step_number: Style::new().dim(),
            command: Style::new().dim().italic(),
            border: Style::new().dim(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY, `NO_COLOR` or `--no-color`).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            step_title: Style::new(),
            header: Style::new(),
            step_number: Style::new(),
            command: Style::new(),
            border: Style::new(),
            hint: Style::new(),
        }
    }

    /// Colored theme when colors are enabled, plain otherwise.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a success message.
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message.
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message.
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("⊘ {}", msg)))
    }

    /// Format a step line: `[3/10] Install Homebrew`.
    pub fn format_step(&self, index: usize, total: usize, title: &str) -> String {
        format!(
            "{} {}",
            self.step_number.apply_to(format!("[{}/{}]", index, total)),
            self.step_title.apply_to(title)
        )
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("▸"), self.highlight.apply_to(title))
    }
}

/// Check if colors should be enabled.
///
/// Honors `NO_COLOR` and `--no-color` (which turns off `console` colors).
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::colors_enabled() && console::Term::stdout().is_term()
}
