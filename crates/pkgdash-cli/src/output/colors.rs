//! Color palette for charts and alert summaries.

use owo_colors::{OwoColorize, Style};

/// Predefined color styles for consistent output
#[derive(Debug, Clone, Copy)]
pub struct Colors;

impl Colors {
    /// Style for one chart series, by its position in chart order.
    pub fn series(index: usize) -> Style {
        match index % 6 {
            0 => Style::new().cyan(),
            1 => Style::new().magenta(),
            2 => Style::new().yellow(),
            3 => Style::new().green(),
            4 => Style::new().bright_yellow().bold(),
            _ => Style::new().blue(),
        }
    }

    /// Style for numbers/counts
    pub fn number() -> Style {
        Style::new().bright_white().bold()
    }

    /// Style for a finding that needs attention
    pub fn critical() -> Style {
        Style::new().bright_red().bold()
    }

    /// Style for a finding worth a look
    pub fn medium() -> Style {
        Style::new().yellow()
    }

    /// Style for a clean result
    pub fn ok() -> Style {
        Style::new().green()
    }

    /// Style for a license-compatibility ratio in `0.0..=1.0`.
    pub fn ratio(value: f64) -> Style {
        if value >= 0.9 {
            Self::ok()
        } else if value >= 0.5 {
            Self::medium()
        } else {
            Self::critical()
        }
    }
}

/// Apply a style conditionally based on colors being enabled
pub fn styled<T: std::fmt::Display>(value: T, style: Style, colors_enabled: bool) -> String {
    if colors_enabled {
        format!("{}", value.style(style))
    } else {
        value.to_string()
    }
}
