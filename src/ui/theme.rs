use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for CLI output: class headings, topic titles, field labels,
/// confirmations, warnings and empty-state hints
#[derive(Debug, Clone)]
pub struct Theme {
    pub class_heading: Style,
    pub topic: Style,
    pub label: Style,
    pub saved: Style,
    pub warn: Style,
    pub hint: Style,
}

impl Theme {
    /// Plain styles when stdout is not a terminal (pipes, `--json` redirects)
    pub fn for_stdout() -> Self {
        Self::new(console::Term::stdout().is_term())
    }

    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            class_heading: pick(Style::new().cyan().bold().underline()),
            topic: pick(Style::new().magenta().bold()),
            label: pick(Style::new().bright_black()),
            saved: pick(Style::new().green().bold()),
            warn: pick(Style::new().yellow()),
            hint: pick(Style::new().bright_black().italic()),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::for_stdout)
}
