//! Styled terminal output for `reqbatch-ctl`.
//!
//! Styles come from `anstyle`; `anstream` strips them when stdout is piped or
//! the terminal has no color support. Errors go to stderr, everything else to
//! stdout.

mod styles;

use std::fmt::Display;
use std::io::Write;

pub(crate) use styles::clap_styles;

use styles::{BUCKET, DIM, ERROR, HEADER, LABEL, SUCCESS, WARNING};

pub(crate) fn success(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{SUCCESS}✓ {msg}{SUCCESS:#}").ok();
}

/// Print an error message to stderr.
pub(crate) fn error(msg: impl Display) {
    let mut out = anstream::stderr().lock();
    writeln!(out, "{ERROR}✗ {msg}{ERROR:#}").ok();
}

pub(crate) fn warning(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{WARNING}! {msg}{WARNING:#}").ok();
}

pub(crate) fn header(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{HEADER}{msg}{HEADER:#}").ok();
}

/// Print `  Label: value` with the label bolded.
pub(crate) fn label(name: impl Display, value: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "  {LABEL}{name}:{LABEL:#} {value}").ok();
}

pub(crate) fn dim(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{DIM}{msg}{DIM:#}").ok();
}

/// Print a count that is colored only when non-zero.
pub(crate) fn count(name: impl Display, value: usize, tone: Tone) {
    let style = match (value, tone) {
        (0, _) | (_, Tone::Neutral) => anstyle::Style::new(),
        (_, Tone::Good) => SUCCESS,
        (_, Tone::Bad) => ERROR,
        (_, Tone::Doubtful) => WARNING,
    };
    let mut out = anstream::stdout().lock();
    writeln!(out, "  {LABEL}{name}:{LABEL:#} {style}{value}{style:#}").ok();
}

/// How a non-zero count should read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Neutral,
    Good,
    Bad,
    Doubtful,
}

/// Print a bucket line: the name highlighted, followed by its detail.
pub(crate) fn bucket(name: impl Display, detail: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "  {BUCKET}{name:<16}{BUCKET:#} {detail}").ok();
}

pub(crate) fn item(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "    • {msg}").ok();
}

pub(crate) fn blank() {
    let mut out = anstream::stdout().lock();
    writeln!(out).ok();
}

/// Unstyled stdout line, used for machine-readable output.
pub(crate) fn plain(msg: impl Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{msg}").ok();
}
