//! Style constants and clap help styling.

use anstyle::{AnsiColor, Color, Effects, Style};

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

/// Green: success messages and created documents.
pub(crate) const SUCCESS: Style = fg(AnsiColor::Green);

/// Red: errors and hard failures.
pub(crate) const ERROR: Style = fg(AnsiColor::Red);

/// Yellow: warnings, ambiguous statuses and abandoned writes.
pub(crate) const WARNING: Style = fg(AnsiColor::Yellow);

/// Bold: section headers and labels.
pub(crate) const HEADER: Style = Style::new().effects(Effects::BOLD);
pub(crate) const LABEL: Style = Style::new().effects(Effects::BOLD);

/// Dimmed: secondary information.
pub(crate) const DIM: Style = Style::new().effects(Effects::DIMMED);

/// Cyan: bucket names in plans and tables.
pub(crate) const BUCKET: Style = fg(AnsiColor::Cyan);

/// Help output palette, matching the rest of the CLI.
pub(crate) fn clap_styles() -> clap::builder::Styles {
    let heading = fg(AnsiColor::Green).effects(Effects::BOLD);
    clap::builder::Styles::styled()
        .header(heading)
        .usage(heading)
        .literal(fg(AnsiColor::Cyan))
        .placeholder(fg(AnsiColor::Cyan))
        .error(fg(AnsiColor::Red).effects(Effects::BOLD))
        .valid(fg(AnsiColor::Green))
        .invalid(fg(AnsiColor::Yellow))
}
