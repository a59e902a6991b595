//! Styling utilities for terminal output.

use owo_colors::OwoColorize;
use std::fmt;

/// Output mode for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-friendly tables and charts
    #[default]
    Normal,
    /// Only command output and errors
    Quiet,
    /// Extra detail in tables
    Verbose,
    /// Raw payloads as pretty JSON
    Json,
}

impl OutputMode {
    pub const fn is_verbose(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// Whether a loading spinner may be drawn.
    pub const fn shows_progress(&self) -> bool {
        matches!(self, Self::Normal | Self::Verbose)
    }
}

/// Unicode/ASCII icons for terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Bullet,
    Package,
    Security,
    Star,
}

impl Icon {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Error => "✖",
            Self::Warning => "⚠",
            Self::Bullet => "•",
            Self::Package => "📦",
            Self::Security => "🛡",
            Self::Star => "★",
        }
    }

    pub const fn ascii(&self) -> &'static str {
        match self {
            Self::Success => "[v]",
            Self::Error => "[x]",
            Self::Warning => "[!]",
            Self::Bullet => "*",
            Self::Package => "[PKG]",
            Self::Security => "[SEC]",
            Self::Star => "[*]",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = if crate::output::unicode_enabled() {
            self.as_str()
        } else {
            self.ascii()
        };
        f.write_str(glyph)
    }
}

/// Theme for consistent styling
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub colors_enabled: bool,
    pub unicode_enabled: bool,
}

impl Theme {
    pub const fn new(colors_enabled: bool, unicode_enabled: bool) -> Self {
        Self {
            colors_enabled,
            unicode_enabled,
        }
    }

    /// Create a theme from current settings
    pub fn from_env() -> Self {
        Self::new(
            crate::output::colors_enabled(),
            crate::output::unicode_enabled(),
        )
    }

    pub const fn icon(&self, icon: Icon) -> &'static str {
        if self.unicode_enabled {
            icon.as_str()
        } else {
            icon.ascii()
        }
    }

    /// Format a package name or purl
    pub fn package(&self, name: &str) -> String {
        if self.colors_enabled {
            name.green().bold().to_string()
        } else {
            name.to_string()
        }
    }

    pub fn version(&self, version: &str) -> String {
        if self.colors_enabled {
            version.yellow().to_string()
        } else {
            version.to_string()
        }
    }

    pub fn url(&self, url: &str) -> String {
        if self.colors_enabled {
            url.blue().underline().to_string()
        } else {
            url.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.colors_enabled {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        if self.colors_enabled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Format dim/secondary text
    pub fn dim(&self, text: &str) -> String {
        if self.colors_enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn header(&self, text: &str) -> String {
        if self.colors_enabled {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_env()
    }
}
