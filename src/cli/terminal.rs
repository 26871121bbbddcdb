//! Colouring of report output.

use backend_lint::Severity;
use owo_colors::{OwoColorize, Style, colors::css};

/// Whether stdout accepts ANSI colours.
fn color_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn paint(text: &str, style: Style) -> String {
    if color_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

const fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Error => Style::new().red().bold(),
        Severity::Warning => Style::new().fg::<css::Orange>(),
        Severity::Notice => Style::new().blue(),
    }
}

/// Paints `text` in the colour of `severity`.
pub fn severity(text: &str, severity: Severity) -> String {
    paint(text, severity_style(severity))
}

/// Paints `text` as a passing result.
pub fn success(text: &str) -> String {
    paint(text, Style::new().green())
}

/// Paints secondary text, such as rule names and links.
pub fn dim(text: &str) -> String {
    paint(text, Style::new().dimmed())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Severity::Error)]
    #[test_case(Severity::Warning)]
    #[test_case(Severity::Notice)]
    fn painted_text_keeps_its_content(level: Severity) {
        let painted = severity("label", level);
        assert!(painted.contains("label"));
    }

    #[test]
    fn severities_have_distinct_styles() {
        assert_ne!(
            severity_style(Severity::Error),
            severity_style(Severity::Warning)
        );
        assert_ne!(
            severity_style(Severity::Warning),
            severity_style(Severity::Notice)
        );
    }
}
