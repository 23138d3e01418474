use owo_colors::Style;
use std::sync::OnceLock;

static STDOUT_THEME: OnceLock<Theme> = OnceLock::new();
static STDERR_THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for one output stream
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub heading: Style,
    pub good: Style,
    pub caution: Style,
    pub label: Style,
}

impl Theme {
    pub fn new(color: bool) -> Self {
        if !color {
            let plain = Style::new();
            return Self { heading: plain, good: plain, caution: plain, label: plain };
        }
        Self {
            heading: Style::new().cyan().bold(),
            good: Style::new().green().bold(),
            caution: Style::new().yellow().bold(),
            label: Style::new().dimmed(),
        }
    }
}

/// Theme for stdout. `console` turns color off for pipes and under `NO_COLOR`.
pub fn theme() -> &'static Theme {
    STDOUT_THEME.get_or_init(|| Theme::new(console::colors_enabled()))
}

/// Theme for stderr, where warnings go
pub fn stderr_theme() -> &'static Theme {
    STDERR_THEME.get_or_init(|| Theme::new(console::colors_enabled_stderr()))
}
